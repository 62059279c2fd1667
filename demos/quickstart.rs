//! Quick tour of the Twelve Labs Rust client.
//!
//! Run with:
//!   TWELVELABS_API_KEY=tlk_... cargo run --example quickstart -- clip1.mp4 clip2.mp4
//!
//! Set `RUST_LOG=twelvelabs=debug` to see requests and poll observations.

use std::path::PathBuf;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use twelvelabs::{
    AnalyzeRequest, CancellationToken, ClientBuilder, CreateBulkRequest, CreateIndexRequest,
    CreateTaskRequest, EmbedRequest, IndexModel, SearchRequest, StreamEventType, Task,
    WaitOptions,
};

#[tokio::main]
async fn main() -> twelvelabs::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Reads TWELVELABS_API_KEY (and TWELVELABS_BASE_URL, if set).
    let client = ClientBuilder::new()
        .max_retries(2)
        .timeout(Duration::from_secs(120))
        .build()?;

    // -----------------------------------------------------------------------
    // 1. An index to put videos in
    // -----------------------------------------------------------------------
    let index = client
        .create_index(&CreateIndexRequest {
            index_name: "quickstart".into(),
            models: vec![
                IndexModel {
                    model_name: "marengo2.7".into(),
                    model_options: vec!["visual".into(), "audio".into()],
                },
                IndexModel {
                    model_name: "pegasus1.2".into(),
                    model_options: vec!["visual".into(), "audio".into()],
                },
            ],
            ..Default::default()
        })
        .await?;
    println!("Index: {}", index.id);

    // -----------------------------------------------------------------------
    // 2. Index one video by URL and wait for it, Ctrl-C aborts the wait
    // -----------------------------------------------------------------------
    let task = client
        .create_task(&CreateTaskRequest {
            index_id: index.id.clone(),
            video_url: Some("https://example.com/sample.mp4".into()),
            ..Default::default()
        })
        .await?;

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let opts = WaitOptions::default()
        .poll_interval(Duration::from_secs(5))
        .timeout(Duration::from_secs(30 * 60))
        .cancel(cancel)
        .on_status(|task: &Task| {
            println!("  {} is {}", task.id, task.status_str());
            Ok(())
        });
    let task = client.wait_for_task(&task.id, Some(opts)).await?;
    if task.is_failed() {
        println!("Indexing failed: {}", task.status_str());
        return Ok(());
    }
    let video_id = task.video_id.clone().unwrap_or_default();
    println!("Indexed video {video_id}");

    // -----------------------------------------------------------------------
    // 3. Bulk upload of local files from the command line
    // -----------------------------------------------------------------------
    let files: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if !files.is_empty() {
        let outcome = client
            .create_tasks_bulk(&CreateBulkRequest {
                index_id: index.id.clone(),
                video_files: files,
                ..Default::default()
            })
            .await?;
        println!(
            "Bulk: {} of {} tasks created",
            outcome.tasks.len(),
            outcome.requested()
        );
        for failure in &outcome.failures {
            println!("  #{} {}: {}", failure.position, failure.source, failure.error);
        }
    }

    // -----------------------------------------------------------------------
    // 4. Search the index
    // -----------------------------------------------------------------------
    let results = client
        .search(&SearchRequest {
            index_id: index.id.clone(),
            query_text: Some("a person walking a dog".into()),
            search_options: vec!["visual".into()],
            page_limit: Some(5),
            ..Default::default()
        })
        .await?;
    for hit in &results.data {
        println!(
            "  {} [{:.1}s - {:.1}s] {}",
            hit.video_id,
            hit.start,
            hit.end,
            hit.confidence.as_deref().unwrap_or("-")
        );
    }

    // -----------------------------------------------------------------------
    // 5. Stream an answer about the video
    // -----------------------------------------------------------------------
    let req = AnalyzeRequest {
        video_id,
        prompt: "Summarize this video in three sentences.".into(),
        ..Default::default()
    };
    client
        .analyze_stream(&req, |event| {
            match event.event_type {
                StreamEventType::TextGeneration => {
                    print!("{}", event.text.as_deref().unwrap_or_default());
                }
                StreamEventType::StreamEnd => println!(),
                _ => {}
            }
            Ok(())
        })
        .await?;

    // -----------------------------------------------------------------------
    // 6. Text embedding
    // -----------------------------------------------------------------------
    let embedding = client
        .create_embedding(&EmbedRequest {
            model_name: "Marengo-retrieval-2.7".into(),
            text: Some("a person walking a dog".into()),
            ..Default::default()
        })
        .await?;
    if let Some(vector) = embedding.first_embedding() {
        println!("Embedding with {} dimensions", vector.len());
    }

    Ok(())
}
