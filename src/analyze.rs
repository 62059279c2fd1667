use futures::TryStreamExt;
use reqwest::Method;
use tokio_util::io::StreamReader;

use crate::client::Client;
use crate::errors::{Result, TwelveLabsError};
use crate::models::{
    AnalyzeRequest, AnalyzeResponse, GistRequest, GistResponse, StreamEvent, SummarizeRequest,
    SummarizeResponse,
};
use crate::poll::ObserverResult;
use crate::stream::decode_events;

impl Client {
    /// Ask an open-ended question about a video and wait for the full answer.
    pub async fn analyze(&self, req: &AnalyzeRequest) -> Result<AnalyzeResponse> {
        validate(req)?;
        let mut body = serde_json::to_value(req)?;
        body["stream"] = false.into();
        self.request(Method::POST, &["analyze"], &[], Some(body)).await
    }

    /// Like [`analyze`](Self::analyze), but the answer is delivered
    /// incrementally to `on_event` as it is generated.
    ///
    /// Returns once a `stream_end` event arrives or the body ends, with the
    /// number of events delivered. Dropping the returned future closes the
    /// connection.
    ///
    /// # Errors
    ///
    /// - [`TwelveLabsError::Validation`] if `video_id` or `prompt` is empty.
    /// - [`TwelveLabsError::Stream`] if the connection fails mid-stream.
    /// - [`TwelveLabsError::Callback`] if `on_event` returns an error.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use twelvelabs::{AnalyzeRequest, Client, StreamEventType};
    ///
    /// # async fn example(client: Client) -> twelvelabs::Result<()> {
    /// let req = AnalyzeRequest {
    ///     video_id: "6659a1c0e5f3".into(),
    ///     prompt: "Describe what happens step by step".into(),
    ///     ..Default::default()
    /// };
    /// client
    ///     .analyze_stream(&req, |event| {
    ///         if event.event_type == StreamEventType::TextGeneration {
    ///             print!("{}", event.text.as_deref().unwrap_or_default());
    ///         }
    ///         Ok(())
    ///     })
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn analyze_stream<F>(&self, req: &AnalyzeRequest, on_event: F) -> Result<usize>
    where
        F: FnMut(&StreamEvent) -> ObserverResult,
    {
        validate(req)?;
        let mut body = serde_json::to_value(req)?;
        body["stream"] = true.into();

        let response = self.open_stream(&["analyze"], body).await?;
        let body = Box::pin(response.bytes_stream().map_err(std::io::Error::other));
        let reader = StreamReader::new(body);

        decode_events(reader, on_event).await
    }

    /// Generate a title, topics, and/or hashtags for a video.
    pub async fn generate_gist(&self, req: &GistRequest) -> Result<GistResponse> {
        if req.video_id.is_empty() || req.types.is_empty() {
            return Err(TwelveLabsError::Validation(
                "video_id and at least one gist type are required".into(),
            ));
        }
        let body = serde_json::to_value(req)?;
        self.request(Method::POST, &["gist"], &[], Some(body)).await
    }

    /// Generate a summary, chapters, or highlights for a video.
    pub async fn summarize(&self, req: &SummarizeRequest) -> Result<SummarizeResponse> {
        if req.video_id.is_empty() || req.kind.is_empty() {
            return Err(TwelveLabsError::Validation(
                "video_id and type are required".into(),
            ));
        }
        let body = serde_json::to_value(req)?;
        self.request(Method::POST, &["summarize"], &[], Some(body)).await
    }
}

fn validate(req: &AnalyzeRequest) -> Result<()> {
    if req.video_id.is_empty() {
        return Err(TwelveLabsError::Validation("video_id is required".into()));
    }
    if req.prompt.is_empty() {
        return Err(TwelveLabsError::Validation("prompt is required".into()));
    }
    Ok(())
}
