use std::fmt;
use std::path::PathBuf;

use reqwest::multipart::Form;
use reqwest::Method;
use serde_json::json;

use crate::client::{file_part, text_opt, Client};
use crate::errors::{Result, TwelveLabsError};
use crate::models::{CreateBulkRequest, CreateTaskRequest, Page, Task};
use crate::poll::{poll_until_terminal, WaitOptions};

/// Where one video of a bulk request comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    File(PathBuf),
    Url(String),
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file {}", path.display()),
            Self::Url(url) => write!(f, "url {url}"),
        }
    }
}

/// A bulk item whose task could not be created.
#[derive(Debug)]
pub struct BulkFailure {
    /// Zero-based position in submission order (files first, then URLs).
    pub position: usize,
    pub source: VideoSource,
    pub error: TwelveLabsError,
}

/// Result of `create_tasks_bulk`. One failed item never stops the others.
#[derive(Debug, Default)]
pub struct BulkOutcome {
    /// Created tasks, in submission order.
    pub tasks: Vec<Task>,
    pub failures: Vec<BulkFailure>,
}

impl BulkOutcome {
    /// Number of sources that were submitted.
    pub fn requested(&self) -> usize {
        self.tasks.len() + self.failures.len()
    }

    /// `true` if at least one item failed.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl Client {
    /// Create an indexing task for one video.
    ///
    /// A local `video_file` is uploaded as multipart; a `video_url` is sent as
    /// JSON and downloaded by the service.
    ///
    /// # Errors
    ///
    /// - [`TwelveLabsError::Validation`] if `index_id` is empty or the request
    ///   does not name exactly one video source. Nothing is sent.
    /// - [`TwelveLabsError::Io`] if the file cannot be read.
    pub async fn create_task(&self, req: &CreateTaskRequest) -> Result<Task> {
        if req.index_id.is_empty() {
            return Err(TwelveLabsError::Validation("index_id is required".into()));
        }

        match (&req.video_file, &req.video_url) {
            (Some(path), None) => {
                let metadata = req
                    .user_metadata
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?;

                let form = Form::new()
                    .text("index_id", req.index_id.clone())
                    .part("video_file", file_part(path).await?);
                let form = text_opt(form, "user_metadata", metadata);
                let form = if req.enable_video_stream {
                    form.text("enable_video_stream", "true")
                } else {
                    form
                };

                self.request_multipart(&["tasks"], form).await
            }
            (None, Some(url)) => {
                let mut body = json!({
                    "index_id": req.index_id,
                    "video_url": url,
                    "enable_video_stream": req.enable_video_stream,
                });
                if let Some(ref metadata) = req.user_metadata {
                    body["user_metadata"] = json!(metadata);
                }

                self.request(Method::POST, &["tasks"], &[], Some(body)).await
            }
            _ => Err(TwelveLabsError::Validation(
                "exactly one of video_file or video_url must be set".into(),
            )),
        }
    }

    /// Fetch the current state of a task by its identifier.
    pub async fn retrieve_task(&self, task_id: &str) -> Result<Task> {
        self.request(Method::GET, &["tasks", task_id], &[], None).await
    }

    /// List tasks, filtered by any query parameters the API accepts
    /// (e.g. `("index_id", id)`, `("status", "ready")`, `("page", "2")`).
    pub async fn list_tasks(&self, filters: &[(&str, String)]) -> Result<Page<Task>> {
        self.request(Method::GET, &["tasks"], filters, None).await
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<()> {
        self.request_empty(Method::DELETE, &["tasks", task_id], None).await
    }

    /// Poll a task until it reaches a terminal status (`ready`, `failed`,
    /// `error`, or anything added to [`WaitOptions::terminal_statuses`]).
    ///
    /// The terminal task is returned whatever its status; check
    /// [`Task::is_ready`]. See [`poll_until_terminal`] for the error contract.
    pub async fn wait_for_task(&self, task_id: &str, opts: Option<WaitOptions>) -> Result<Task> {
        poll_until_terminal(
            task_id,
            || self.retrieve_task(task_id),
            opts.unwrap_or_default(),
        )
        .await
    }

    /// Create one task per file and per URL of `req`, files first, in input order.
    ///
    /// Items are submitted one after another. A failed item is logged and
    /// recorded in [`BulkOutcome::failures`]; the remaining items still run.
    ///
    /// # Errors
    ///
    /// Only [`TwelveLabsError::Validation`], when `index_id` is empty or there
    /// is nothing to submit. Nothing is sent in that case.
    pub async fn create_tasks_bulk(&self, req: &CreateBulkRequest) -> Result<BulkOutcome> {
        if req.index_id.is_empty() {
            return Err(TwelveLabsError::Validation("index_id is required".into()));
        }
        if req.video_files.is_empty() && req.video_urls.is_empty() {
            return Err(TwelveLabsError::Validation(
                "either video_files or video_urls must be provided".into(),
            ));
        }

        let sources = req
            .video_files
            .iter()
            .cloned()
            .map(VideoSource::File)
            .chain(req.video_urls.iter().cloned().map(VideoSource::Url));

        let mut outcome = BulkOutcome::default();
        for (position, source) in sources.enumerate() {
            let item = CreateTaskRequest {
                index_id: req.index_id.clone(),
                video_file: match &source {
                    VideoSource::File(path) => Some(path.clone()),
                    VideoSource::Url(_) => None,
                },
                video_url: match &source {
                    VideoSource::Url(url) => Some(url.clone()),
                    VideoSource::File(_) => None,
                },
                enable_video_stream: req.enable_video_stream,
                user_metadata: req.user_metadata.clone(),
            };

            match self.create_task(&item).await {
                Ok(task) => outcome.tasks.push(task),
                Err(error) => {
                    tracing::warn!(position, source = %source, error = %error, "bulk item failed");
                    outcome.failures.push(BulkFailure {
                        position,
                        source,
                        error,
                    });
                }
            }
        }

        tracing::debug!(
            created = outcome.tasks.len(),
            failed = outcome.failures.len(),
            "bulk submission finished"
        );
        Ok(outcome)
    }
}
