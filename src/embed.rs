use std::time::Duration;

use reqwest::multipart::Form;
use reqwest::Method;

use crate::client::{file_part, text_opt, Client};
use crate::errors::{Result, TwelveLabsError};
use crate::models::{CreatedResource, EmbedRequest, EmbedResponse, EmbeddingTask, TaskStatus};
use crate::poll::{poll_until_terminal, WaitOptions};

const EMBED_TASK_POLL_INTERVAL: Duration = Duration::from_secs(10);

impl Client {
    /// Create embeddings for text, an image, audio, or a video.
    ///
    /// Text, image and audio are embedded synchronously. A video source starts
    /// an embedding task that is polled every 10 seconds until it finishes;
    /// use [`create_embedding_task`](Self::create_embedding_task) and
    /// [`wait_for_embedding_task`](Self::wait_for_embedding_task) for control
    /// over that wait.
    ///
    /// # Errors
    ///
    /// - [`TwelveLabsError::Validation`] if no model or no source is given.
    /// - [`TwelveLabsError::TaskFailed`] if a video embedding task fails.
    pub async fn create_embedding(&self, req: &EmbedRequest) -> Result<EmbedResponse> {
        if req.has_video() {
            let task = self.create_embedding_task(req).await?;
            let opts = WaitOptions::default().poll_interval(EMBED_TASK_POLL_INTERVAL);
            return self.wait_for_embedding_task(&task.id, Some(opts)).await;
        }

        let form = embed_form(req).await?;
        self.request_multipart(&["embed"], form).await
    }

    /// Start an asynchronous video embedding task.
    pub async fn create_embedding_task(&self, req: &EmbedRequest) -> Result<CreatedResource> {
        if !req.has_video() {
            return Err(TwelveLabsError::Validation(
                "embedding tasks need video_url or video_file".into(),
            ));
        }

        let form = embed_form(req).await?;
        self.request_multipart(&["embed", "tasks"], form).await
    }

    pub async fn embedding_task_status(&self, task_id: &str) -> Result<EmbeddingTask> {
        self.request(Method::GET, &["embed", "tasks", task_id, "status"], &[], None)
            .await
    }

    /// Embeddings of a finished video embedding task.
    pub async fn retrieve_embedding_task(&self, task_id: &str) -> Result<EmbedResponse> {
        self.request(Method::GET, &["embed", "tasks", task_id], &[], None).await
    }

    /// Poll an embedding task until it is terminal, then fetch its embeddings.
    ///
    /// Returns [`TwelveLabsError::TaskFailed`] if the task ends in any status
    /// other than `ready`.
    pub async fn wait_for_embedding_task(
        &self,
        task_id: &str,
        opts: Option<WaitOptions<EmbeddingTask>>,
    ) -> Result<EmbedResponse> {
        let task = poll_until_terminal(
            task_id,
            || self.embedding_task_status(task_id),
            opts.unwrap_or_default(),
        )
        .await?;

        if task.status != TaskStatus::Ready {
            return Err(TwelveLabsError::TaskFailed {
                id: task.id,
                status: task.status.to_string(),
            });
        }

        self.retrieve_embedding_task(task_id).await
    }
}

async fn embed_form(req: &EmbedRequest) -> Result<Form> {
    if req.model_name.is_empty() {
        return Err(TwelveLabsError::Validation("model_name is required".into()));
    }
    if !req.has_source() {
        return Err(TwelveLabsError::Validation(
            "one of text, image, audio or video input is required".into(),
        ));
    }

    let mut form = Form::new().text("model_name", req.model_name.clone());
    form = text_opt(form, "text", req.text.as_ref());
    form = text_opt(form, "text_truncate", req.text_truncate.as_ref());
    form = text_opt(form, "image_url", req.image_url.as_ref());
    form = text_opt(form, "audio_url", req.audio_url.as_ref());
    form = text_opt(form, "video_url", req.video_url.as_ref());
    form = text_opt(form, "video_start_offset_sec", req.video_start_offset_sec);
    form = text_opt(form, "video_end_offset_sec", req.video_end_offset_sec);
    form = text_opt(form, "video_clip_length", req.video_clip_length);
    for scope in &req.video_embedding_scope {
        form = form.text("video_embedding_scope", scope.clone());
    }

    if let Some(ref path) = req.image_file {
        form = form.part("image_file", file_part(path).await?);
    }
    if let Some(ref path) = req.audio_file {
        form = form.part("audio_file", file_part(path).await?);
    }
    if let Some(ref path) = req.video_file {
        form = form.part("video_file", file_part(path).await?);
    }

    Ok(form)
}
