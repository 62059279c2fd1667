use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Status reported by the service for an indexing or embedding task.
///
/// The service may add intermediate statuses at any time, so anything not
/// listed here is kept verbatim in [`TaskStatus::Other`] and treated as
/// still in progress.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Pending,
    Validating,
    Queued,
    Indexing,
    Processing,
    Ready,
    Failed,
    Error,
    Other(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Validating => "validating",
            Self::Queued => "queued",
            Self::Indexing => "indexing",
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Failed => "failed",
            Self::Error => "error",
            Self::Other(s) => s,
        }
    }

    /// Terminal = won't change anymore (ready, failed, or error).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed | Self::Error)
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => Self::Pending,
            "validating" => Self::Validating,
            "queued" => Self::Queued,
            "indexing" => Self::Indexing,
            "processing" => Self::Processing,
            "ready" => Self::Ready,
            "failed" => Self::Failed,
            "error" => Self::Error,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for TaskStatus {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A video indexing task. Created by `create_task`, mutated only by the service.
///
/// Modelled fields are `Some` only when the service sent a non-null value.
/// Keys that were `null` stay in [`Task::extra`], so a task re-serializes to
/// exactly the payload it was read from.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "JsonMap", into = "JsonMap")]
pub struct Task {
    pub id: String,
    /// `None` for creation responses, which carry no status.
    pub status: Option<TaskStatus>,
    pub video_id: Option<String>,
    pub index_id: Option<String>,
    pub system_metadata: Option<serde_json::Value>,
    /// ISO 8601.
    pub created_at: Option<String>,
    /// ISO 8601.
    pub updated_at: Option<String>,
    /// Fields this client does not model, plus modelled keys sent as `null`.
    pub extra: JsonMap,
}

type JsonMap = serde_json::Map<String, serde_json::Value>;

impl Task {
    /// The reported status as sent by the service, or `""` if there was none.
    pub fn status_str(&self) -> &str {
        self.status.as_ref().map_or("", TaskStatus::as_str)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.as_ref().is_some_and(TaskStatus::is_terminal)
    }

    pub fn is_ready(&self) -> bool {
        self.status == Some(TaskStatus::Ready)
    }

    /// Status is `failed` or `error`.
    pub fn is_failed(&self) -> bool {
        matches!(self.status, Some(TaskStatus::Failed | TaskStatus::Error))
    }
}

impl TryFrom<JsonMap> for Task {
    type Error = String;

    fn try_from(mut extra: JsonMap) -> Result<Self, Self::Error> {
        let id = match extra.remove("_id") {
            Some(serde_json::Value::String(id)) => id,
            _ => return Err("task has no string `_id`".into()),
        };

        Ok(Self {
            id,
            status: take_field(&mut extra, "status")?,
            video_id: take_field(&mut extra, "video_id")?,
            index_id: take_field(&mut extra, "index_id")?,
            system_metadata: take_field(&mut extra, "system_metadata")?,
            created_at: take_field(&mut extra, "created_at")?,
            updated_at: take_field(&mut extra, "updated_at")?,
            extra,
        })
    }
}

impl From<Task> for JsonMap {
    fn from(task: Task) -> Self {
        let mut map = task.extra;
        map.insert("_id".into(), task.id.into());
        put_field(&mut map, "status", task.status.map(String::from));
        put_field(&mut map, "video_id", task.video_id);
        put_field(&mut map, "index_id", task.index_id);
        put_field(&mut map, "system_metadata", task.system_metadata);
        put_field(&mut map, "created_at", task.created_at);
        put_field(&mut map, "updated_at", task.updated_at);
        map
    }
}

/// Remove and decode `key`. An explicit `null` is left in the map.
fn take_field<T: serde::de::DeserializeOwned>(
    map: &mut JsonMap,
    key: &str,
) -> Result<Option<T>, String> {
    match map.remove(key) {
        None => Ok(None),
        Some(serde_json::Value::Null) => {
            map.insert(key.to_string(), serde_json::Value::Null);
            Ok(None)
        }
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| format!("invalid task field `{key}`: {e}")),
    }
}

fn put_field(map: &mut JsonMap, key: &str, value: Option<impl Into<serde_json::Value>>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.into());
    }
}

/// Input for `create_task`. Set exactly one of `video_file` or `video_url`.
#[derive(Debug, Clone, Default)]
pub struct CreateTaskRequest {
    pub index_id: String,
    /// Local file, uploaded as multipart.
    pub video_file: Option<PathBuf>,
    /// Publicly reachable URL the service downloads itself.
    pub video_url: Option<String>,
    pub enable_video_stream: bool,
    pub user_metadata: Option<HashMap<String, serde_json::Value>>,
}

/// Input for `create_tasks_bulk`: one task is created per file and per URL.
#[derive(Debug, Clone, Default)]
pub struct CreateBulkRequest {
    pub index_id: String,
    pub video_files: Vec<PathBuf>,
    pub video_urls: Vec<String>,
    pub enable_video_stream: bool,
    pub user_metadata: Option<HashMap<String, serde_json::Value>>,
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PageInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_per_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u64>,
    /// ISO 8601. Search page tokens stop working after this time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_expires_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_page_token: Option<String>,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub page_info: Option<PageInfo>,
}

impl<T> Page<T> {
    /// `true` if the service reports pages after this one.
    pub fn has_more(&self) -> bool {
        match &self.page_info {
            Some(PageInfo {
                page: Some(page),
                total_page: Some(total),
                ..
            }) => page < total,
            Some(info) => info.next_page_token.is_some(),
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Indexes and videos
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IndexModel {
    pub model_name: String,
    /// e.g. "visual", "audio".
    #[serde(default)]
    pub model_options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Index {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub index_name: String,
    #[serde(default)]
    pub models: Vec<IndexModel>,
    #[serde(default)]
    pub addons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_count: Option<u64>,
    /// Seconds of indexed video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateIndexRequest {
    pub index_name: String,
    pub models: Vec<IndexModel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub addons: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateIndexRequest {
    pub index_name: String,
}

/// POST /indexes only answers with the new identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedResource {
    #[serde(rename = "_id")]
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct VideoSystemMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Video {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub system_metadata: VideoSystemMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<HashMap<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateVideoRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<HashMap<String, serde_json::Value>>,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Input for `search`. At least one of `query_text`, `query_media_url` or
/// `query_media_file` must be set.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub index_id: String,
    pub query_text: Option<String>,
    /// "image" when searching with media.
    pub query_media_type: Option<String>,
    pub query_media_url: Option<String>,
    pub query_media_file: Option<PathBuf>,
    /// e.g. "visual", "audio".
    pub search_options: Vec<String>,
    /// JSON-encoded metadata filter.
    pub filter: Option<String>,
    /// "high", "medium", "low" or "none".
    pub threshold: Option<String>,
    /// "score" or "clip_count".
    pub sort_option: Option<String>,
    /// "clip" or "video".
    pub group_by: Option<String>,
    pub page_limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchResult {
    #[serde(default)]
    pub video_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Seconds from video start.
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
    /// Present when results are grouped by video.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clips: Vec<SearchResult>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchPool {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub total_duration: f64,
    #[serde(default)]
    pub index_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub search_pool: Option<SearchPool>,
    #[serde(default)]
    pub data: Vec<SearchResult>,
    #[serde(default)]
    pub page_info: Option<PageInfo>,
}

impl SearchResponse {
    /// Pass to `search_page` for the next page. `None` means no more results.
    pub fn next_page_token(&self) -> Option<&str> {
        self.page_info.as_ref()?.next_page_token.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Embeddings
// ---------------------------------------------------------------------------

/// Input for `create_embedding`. Provide text, or one image, audio, or video
/// source. Any video source turns the call into an asynchronous embedding task.
#[derive(Debug, Clone, Default)]
pub struct EmbedRequest {
    /// e.g. "Marengo-retrieval-2.7".
    pub model_name: String,
    pub text: Option<String>,
    /// "start", "end" or "none".
    pub text_truncate: Option<String>,
    pub image_url: Option<String>,
    pub image_file: Option<PathBuf>,
    pub audio_url: Option<String>,
    pub audio_file: Option<PathBuf>,
    pub video_url: Option<String>,
    pub video_file: Option<PathBuf>,
    pub video_start_offset_sec: Option<f64>,
    pub video_end_offset_sec: Option<f64>,
    pub video_clip_length: Option<f64>,
    /// "clip" and/or "video".
    pub video_embedding_scope: Vec<String>,
}

impl EmbedRequest {
    pub(crate) fn has_video(&self) -> bool {
        self.video_url.is_some() || self.video_file.is_some()
    }

    pub(crate) fn has_source(&self) -> bool {
        self.has_video()
            || self.text.is_some()
            || self.image_url.is_some()
            || self.image_file.is_some()
            || self.audio_url.is_some()
            || self.audio_file.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EmbeddingSegment {
    #[serde(rename = "float", default)]
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_offset_sec: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_offset_sec: Option<f64>,
    /// "clip" or "video".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_scope: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EmbeddingResult {
    #[serde(default)]
    pub segments: Vec<EmbeddingSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EmbedResponse {
    #[serde(default)]
    pub model_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_embedding: Option<EmbeddingResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_embedding: Option<EmbeddingResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_embedding: Option<EmbeddingResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_embedding: Option<EmbeddingResult>,
}

impl EmbedResponse {
    /// First vector of whichever modality was embedded, checked in the order
    /// text, image, video, audio.
    pub fn first_embedding(&self) -> Option<&[f64]> {
        [
            &self.text_embedding,
            &self.image_embedding,
            &self.video_embedding,
            &self.audio_embedding,
        ]
        .into_iter()
        .flatten()
        .find_map(|r| r.segments.first())
        .map(|s| s.values.as_slice())
    }

    pub fn video_segments(&self) -> &[EmbeddingSegment] {
        segments(&self.video_embedding)
    }

    pub fn audio_segments(&self) -> &[EmbeddingSegment] {
        segments(&self.audio_embedding)
    }

    pub fn text_segments(&self) -> &[EmbeddingSegment] {
        segments(&self.text_embedding)
    }

    pub fn image_segments(&self) -> &[EmbeddingSegment] {
        segments(&self.image_embedding)
    }
}

fn segments(result: &Option<EmbeddingResult>) -> &[EmbeddingSegment] {
    result.as_ref().map(|r| r.segments.as_slice()).unwrap_or(&[])
}

/// Status of a video embedding task (GET /embed/tasks/{id}/status).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EmbeddingTask {
    #[serde(rename = "_id")]
    pub id: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyzeRequest {
    pub video_id: String,
    pub prompt: String,
    /// 0.0 - 1.0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Forced on by `analyze_stream` and off by `analyze`.
    pub stream: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Usage {
    #[serde(default)]
    pub output_tokens: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GistRequest {
    pub video_id: String,
    /// Any of "title", "topic", "hashtag".
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GistResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SummarizeRequest {
    pub video_id: String,
    /// "summary", "chapter" or "highlight".
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chapter {
    #[serde(default)]
    pub chapter_number: u32,
    #[serde(default)]
    pub chapter_title: String,
    #[serde(default)]
    pub chapter_summary: String,
    #[serde(default, rename = "start_sec")]
    pub start: f64,
    #[serde(default, rename = "end_sec")]
    pub end: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Highlight {
    #[serde(default)]
    pub highlight: String,
    #[serde(default)]
    pub highlight_summary: String,
    #[serde(default, rename = "start_sec")]
    pub start: f64,
    #[serde(default, rename = "end_sec")]
    pub end: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizeResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub summarize_type: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Kind of a streamed analysis event. Unrecognised kinds map to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamEventType {
    StreamStart,
    TextGeneration,
    StreamEnd,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StreamMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// One line of a streaming analysis response.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StreamEvent {
    pub event_type: StreamEventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<StreamMetadata>,
}

impl StreamEvent {
    /// `stream_end`: nothing after this event is read.
    pub fn is_end(&self) -> bool {
        self.event_type == StreamEventType::StreamEnd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn terminal_task_round_trips() {
        let payload = json!({
            "_id": "6659",
            "status": "ready",
            "video_id": "v1",
            "index_id": "i1",
            "system_metadata": {"filename": "a.mp4", "duration": 12.5},
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:05:00Z",
            "hls": {"status": "COMPLETE"}
        });

        let task: Task = serde_json::from_value(payload.clone()).unwrap();
        assert!(task.is_ready());
        assert!(task.is_terminal());
        assert_eq!(serde_json::to_value(&task).unwrap(), payload);
    }

    #[test]
    fn null_and_missing_fields_round_trip() {
        let payload = json!({
            "_id": "t",
            "status": "ready",
            "video_id": null,
            "index_id": "i",
            "created_at": "x"
        });

        let task: Task = serde_json::from_value(payload.clone()).unwrap();
        assert_eq!(task.video_id, None);
        assert_eq!(task.index_id.as_deref(), Some("i"));
        assert_eq!(serde_json::to_value(&task).unwrap(), payload);

        let created: Task =
            serde_json::from_value(json!({"_id": "t9", "video_id": "v9"})).unwrap();
        assert_eq!(created.status, None);
        assert!(!created.is_terminal());
        assert_eq!(
            serde_json::to_value(&created).unwrap(),
            json!({"_id": "t9", "video_id": "v9"})
        );
    }

    #[test]
    fn task_without_id_is_rejected() {
        let err = serde_json::from_value::<Task>(json!({"status": "ready"})).unwrap_err();
        assert!(err.to_string().contains("_id"));
    }

    #[test]
    fn unknown_status_is_kept_and_not_terminal() {
        let task: Task =
            serde_json::from_value(json!({"_id": "t", "status": "transcoding"})).unwrap();
        assert_eq!(task.status, Some(TaskStatus::Other("transcoding".into())));
        assert!(!task.is_terminal());
        assert_eq!(serde_json::to_value(&task).unwrap()["status"], "transcoding");
    }

    #[test]
    fn error_status_counts_as_failed() {
        let status = TaskStatus::from("error");
        assert!(status.is_terminal());
        assert_eq!(status.to_string(), "error");
    }

    #[test]
    fn stream_event_types() {
        let ev: StreamEvent =
            serde_json::from_str(r#"{"event_type":"text_generation","text":"a"}"#).unwrap();
        assert_eq!(ev.event_type, StreamEventType::TextGeneration);
        assert_eq!(ev.text.as_deref(), Some("a"));

        let ev: StreamEvent = serde_json::from_str(
            r#"{"event_type":"stream_end","metadata":{"generation_id":"g","usage":{"output_tokens":7}}}"#,
        )
        .unwrap();
        assert!(ev.is_end());
        let meta = ev.metadata.unwrap();
        assert_eq!(meta.generation_id.as_deref(), Some("g"));
        assert_eq!(meta.usage.unwrap().output_tokens, 7);

        let ev: StreamEvent = serde_json::from_str(r#"{"event_type":"heartbeat"}"#).unwrap();
        assert_eq!(ev.event_type, StreamEventType::Unknown);
    }

    #[test]
    fn first_embedding_prefers_text() {
        let resp: EmbedResponse = serde_json::from_value(json!({
            "model_name": "Marengo-retrieval-2.7",
            "video_embedding": {"segments": [{"float": [0.5]}]},
            "text_embedding": {"segments": [{"float": [0.1, 0.2]}]}
        }))
        .unwrap();
        assert_eq!(resp.first_embedding(), Some(&[0.1, 0.2][..]));
        assert_eq!(resp.video_segments().len(), 1);
        assert!(resp.audio_segments().is_empty());
    }

    #[test]
    fn page_has_more() {
        let page: Page<Index> = serde_json::from_value(json!({
            "data": [],
            "page_info": {"page": 1, "total_page": 3}
        }))
        .unwrap();
        assert!(page.has_more());

        let page: Page<Index> = serde_json::from_value(json!({"data": []})).unwrap();
        assert!(!page.has_more());
    }
}
