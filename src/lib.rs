//! # Twelve Labs client for Rust
//!
//! Async client for the [Twelve Labs](https://twelvelabs.io) video
//! understanding API. Index videos, wait for indexing to finish, search,
//! create embeddings, and analyze videos with streamed answers.
//!
//! ## Quick start
//!
//! ```no_run
//! use twelvelabs::{Client, CreateTaskRequest, Task, WaitOptions};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> twelvelabs::Result<()> {
//!     let client = Client::new("tlk_your_api_key")?;
//!
//!     let task = client
//!         .create_task(&CreateTaskRequest {
//!             index_id: "your_index_id".into(),
//!             video_url: Some("https://example.com/video.mp4".into()),
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     let opts = WaitOptions::default()
//!         .poll_interval(Duration::from_secs(10))
//!         .timeout(Duration::from_secs(30 * 60))
//!         .on_status(|task: &Task| {
//!             println!("  status: {}", task.status_str());
//!             Ok(())
//!         });
//!     let task = client.wait_for_task(&task.id, Some(opts)).await?;
//!
//!     println!("{} finished as {}", task.id, task.status_str());
//!     Ok(())
//! }
//! ```
//!
//! ## Builder pattern
//!
//! ```no_run
//! use twelvelabs::ClientBuilder;
//! use std::time::Duration;
//!
//! # fn example() -> twelvelabs::Result<()> {
//! let client = ClientBuilder::new()
//!     .api_key("tlk_your_api_key")
//!     .base_url("https://custom.example.com/v1.3")
//!     .max_retries(3)
//!     .timeout(Duration::from_secs(120))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod analyze;
mod client;
mod embed;
mod errors;
mod indexes;
mod models;
pub mod poll;
mod search;
pub mod stream;
mod tasks;

pub use client::{Client, ClientBuilder};
pub use errors::{classify, BoxError, Result, TwelveLabsError};
pub use models::{
    AnalyzeRequest, AnalyzeResponse, Chapter, CreateBulkRequest, CreateIndexRequest,
    CreateTaskRequest, CreatedResource, EmbedRequest, EmbedResponse, EmbeddingResult,
    EmbeddingSegment, EmbeddingTask, GistRequest, GistResponse, Highlight, Index, IndexModel,
    Page, PageInfo, SearchPool, SearchRequest, SearchResponse, SearchResult, StreamEvent,
    StreamEventType, StreamMetadata, SummarizeRequest, SummarizeResponse, Task, TaskStatus,
    UpdateIndexRequest, UpdateVideoRequest, Usage, Video, VideoSystemMetadata,
};
pub use poll::{ObserverResult, RetrievalErrorPolicy, WaitOptions};
pub use tasks::{BulkFailure, BulkOutcome, VideoSource};
pub use tokio_util::sync::CancellationToken;
