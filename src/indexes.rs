use reqwest::Method;

use crate::client::Client;
use crate::errors::{Result, TwelveLabsError};
use crate::models::{
    CreateIndexRequest, CreatedResource, Index, Page, UpdateIndexRequest, UpdateVideoRequest,
    Video,
};

impl Client {
    /// Create an index and return its identifier.
    ///
    /// Returns [`TwelveLabsError::Validation`] without sending anything if the
    /// name is empty or no model is given.
    pub async fn create_index(&self, req: &CreateIndexRequest) -> Result<CreatedResource> {
        if req.index_name.is_empty() {
            return Err(TwelveLabsError::Validation("index_name is required".into()));
        }
        if req.models.is_empty() {
            return Err(TwelveLabsError::Validation(
                "at least one model is required".into(),
            ));
        }

        let body = serde_json::to_value(req)?;
        self.request(Method::POST, &["indexes"], &[], Some(body)).await
    }

    pub async fn retrieve_index(&self, index_id: &str) -> Result<Index> {
        self.request(Method::GET, &["indexes", index_id], &[], None).await
    }

    /// List indexes. Filters are passed through as query parameters,
    /// e.g. `("index_name", name)` or `("page_limit", "50")`.
    pub async fn list_indexes(&self, filters: &[(&str, String)]) -> Result<Page<Index>> {
        self.request(Method::GET, &["indexes"], filters, None).await
    }

    /// Rename an index.
    pub async fn update_index(&self, index_id: &str, req: &UpdateIndexRequest) -> Result<()> {
        let body = serde_json::to_value(req)?;
        self.request_empty(Method::PUT, &["indexes", index_id], Some(body)).await
    }

    pub async fn delete_index(&self, index_id: &str) -> Result<()> {
        self.request_empty(Method::DELETE, &["indexes", index_id], None).await
    }

    // -----------------------------------------------------------------------
    // Videos within an index
    // -----------------------------------------------------------------------

    pub async fn list_videos(
        &self,
        index_id: &str,
        filters: &[(&str, String)],
    ) -> Result<Page<Video>> {
        self.request(
            Method::GET,
            &["indexes", index_id, "videos"],
            filters,
            None,
        )
        .await
    }

    pub async fn retrieve_video(&self, index_id: &str, video_id: &str) -> Result<Video> {
        self.request(
            Method::GET,
            &["indexes", index_id, "videos", video_id],
            &[],
            None,
        )
        .await
    }

    /// Update a video's title or user metadata.
    pub async fn update_video(
        &self,
        index_id: &str,
        video_id: &str,
        req: &UpdateVideoRequest,
    ) -> Result<()> {
        let body = serde_json::to_value(req)?;
        self.request_empty(
            Method::PUT,
            &["indexes", index_id, "videos", video_id],
            Some(body),
        )
        .await
    }

    pub async fn delete_video(&self, index_id: &str, video_id: &str) -> Result<()> {
        self.request_empty(
            Method::DELETE,
            &["indexes", index_id, "videos", video_id],
            None,
        )
        .await
    }
}
