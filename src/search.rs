use reqwest::multipart::Form;
use reqwest::Method;

use crate::client::{file_part, text_opt, Client};
use crate::errors::{Result, TwelveLabsError};
use crate::models::{SearchRequest, SearchResponse};

impl Client {
    /// Search an index with text, an image URL, or a local image file.
    ///
    /// The query is sent as multipart. Use [`SearchResponse::next_page_token`]
    /// with [`search_page`](Self::search_page) for further pages.
    ///
    /// # Errors
    ///
    /// - [`TwelveLabsError::Validation`] if `index_id` is empty or no query is given.
    /// - [`TwelveLabsError::Io`] if `query_media_file` cannot be read.
    pub async fn search(&self, req: &SearchRequest) -> Result<SearchResponse> {
        if req.index_id.is_empty() {
            return Err(TwelveLabsError::Validation("index_id is required".into()));
        }
        if req.query_text.is_none() && req.query_media_url.is_none() && req.query_media_file.is_none()
        {
            return Err(TwelveLabsError::Validation(
                "one of query_text, query_media_url or query_media_file is required".into(),
            ));
        }

        let mut form = Form::new().text("index_id", req.index_id.clone());
        form = text_opt(form, "query_text", req.query_text.as_ref());
        form = text_opt(form, "query_media_type", req.query_media_type.as_ref());
        form = text_opt(form, "query_media_url", req.query_media_url.as_ref());
        if let Some(ref path) = req.query_media_file {
            form = form.part("query_media_file", file_part(path).await?);
        }
        for option in &req.search_options {
            form = form.text("search_options", option.clone());
        }
        form = text_opt(form, "filter", req.filter.as_ref());
        form = text_opt(form, "threshold", req.threshold.as_ref());
        form = text_opt(form, "sort_option", req.sort_option.as_ref());
        form = text_opt(form, "group_by", req.group_by.as_ref());
        form = text_opt(form, "page_limit", req.page_limit);

        self.request_multipart(&["search"], form).await
    }

    /// Fetch another page of an earlier search.
    pub async fn search_page(&self, page_token: &str) -> Result<SearchResponse> {
        self.request(Method::GET, &["search", page_token], &[], None).await
    }
}
