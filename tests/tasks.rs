mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use twelvelabs::{
    CreateBulkRequest, CreateTaskRequest, Task, TaskStatus, TwelveLabsError, VideoSource,
    WaitOptions,
};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn task_body(id: &str, status: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "status": status,
        "index_id": "idx1",
        "created_at": "2024-05-01T10:00:00Z"
    })
}

#[tokio::test]
async fn retrieve_task_sends_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/t1"))
        .and(header("x-api-key", common::API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_body("t1", "indexing")))
        .expect(1)
        .mount(&server)
        .await;

    let task = common::client(&server).retrieve_task("t1").await.unwrap();

    assert_eq!(task.id, "t1");
    assert_eq!(task.status, Some(TaskStatus::Indexing));
    assert_eq!(task.index_id.as_deref(), Some("idx1"));
}

#[tokio::test]
async fn create_task_from_url_sends_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(body_partial_json(json!({
            "index_id": "idx1",
            "video_url": "https://example.com/v.mp4"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": "t9", "video_id": "v9"})))
        .expect(1)
        .mount(&server)
        .await;

    let task = common::client(&server)
        .create_task(&CreateTaskRequest {
            index_id: "idx1".into(),
            video_url: Some("https://example.com/v.mp4".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(task.id, "t9");
    assert_eq!(task.status, None);
    assert_eq!(task.video_id.as_deref(), Some("v9"));
}

#[tokio::test]
async fn create_task_from_file_uploads_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(header("x-api-key", common::API_KEY))
        .and(body_string_contains("name=\"video_file\"; filename=\"clip.mp4\""))
        .and(body_string_contains("not really a video"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": "t1"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("clip.mp4");
    std::fs::write(&file, "not really a video").unwrap();

    let task = common::client(&server)
        .create_task(&CreateTaskRequest {
            index_id: "idx1".into(),
            video_file: Some(file),
            enable_video_stream: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(task.id, "t1");
}

#[tokio::test]
async fn create_task_rejects_ambiguous_source_without_sending() {
    let server = MockServer::start().await;
    let client = common::client(&server);

    let both = CreateTaskRequest {
        index_id: "idx1".into(),
        video_file: Some("a.mp4".into()),
        video_url: Some("https://example.com/a.mp4".into()),
        ..Default::default()
    };
    let neither = CreateTaskRequest {
        index_id: "idx1".into(),
        ..Default::default()
    };

    for req in [both, neither] {
        let err = client.create_task(&req).await.unwrap_err();
        assert!(matches!(err, TwelveLabsError::Validation(_)));
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let server = MockServer::start().await;

    let err = common::client(&server)
        .create_task(&CreateTaskRequest {
            index_id: "idx1".into(),
            video_file: Some("/definitely/not/here.mp4".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, TwelveLabsError::Io(_)));
}

#[tokio::test]
async fn list_tasks_passes_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(query_param("index_id", "idx1"))
        .and(query_param("status", "ready"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [task_body("t1", "ready"), task_body("t2", "ready")],
            "page_info": {"page": 1, "limit_per_page": 10, "total_page": 1, "total_results": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = common::client(&server)
        .list_tasks(&[("index_id", "idx1".into()), ("status", "ready".into())])
        .await
        .unwrap();

    assert_eq!(page.data.len(), 2);
    assert!(!page.has_more());
}

#[tokio::test]
async fn delete_task_accepts_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/tasks/t1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    common::client(&server).delete_task("t1").await.unwrap();
}

#[tokio::test]
async fn wait_for_task_polls_until_ready() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_body("t1", "pending")))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_body("t1", "ready")))
        .with_priority(2)
        .expect(1)
        .mount(&server)
        .await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    let opts = WaitOptions::default()
        .poll_interval(Duration::from_millis(10))
        .on_status(move |task: &Task| {
            log.lock().unwrap().push(task.status.clone());
            Ok(())
        });

    let task = common::client(&server)
        .wait_for_task("t1", Some(opts))
        .await
        .unwrap();

    assert!(task.is_ready());
    assert_eq!(
        *seen.lock().unwrap(),
        [Some(TaskStatus::Pending), Some(TaskStatus::Ready)]
    );
}

#[tokio::test]
async fn wait_for_task_fails_fast_on_initial_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "task not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let err = common::client(&server)
        .wait_for_task("missing", None)
        .await
        .unwrap_err();

    match err {
        TwelveLabsError::NotFound { message } => assert_eq!(message, "task not found"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn bulk_keeps_going_after_a_failed_item() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(body_string_contains("bad.mp4"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "video_url unreachable"})))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(body_string_contains("filename=\"a.mp4\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": "task-a"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(body_string_contains("filename=\"b.mp4\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": "task-b"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.mp4");
    let b = dir.path().join("b.mp4");
    std::fs::write(&a, "aaaa").unwrap();
    std::fs::write(&b, "bbbb").unwrap();

    let outcome = common::client(&server)
        .create_tasks_bulk(&CreateBulkRequest {
            index_id: "idx1".into(),
            video_files: vec![a, b],
            video_urls: vec!["https://example.com/bad.mp4".into()],
            ..Default::default()
        })
        .await
        .unwrap();

    let ids: Vec<_> = outcome.tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["task-a", "task-b"]);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.requested(), 3);
    assert!(outcome.is_partial());

    let failure = &outcome.failures[0];
    assert_eq!(failure.position, 2);
    assert_eq!(
        failure.source,
        VideoSource::Url("https://example.com/bad.mp4".into())
    );
    assert!(matches!(failure.error, TwelveLabsError::BadRequest { .. }));
}

#[tokio::test]
async fn bulk_with_no_sources_is_rejected_before_any_request() {
    let server = MockServer::start().await;

    let err = common::client(&server)
        .create_tasks_bulk(&CreateBulkRequest {
            index_id: "idx1".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, TwelveLabsError::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn bulk_without_index_is_one_validation_error() {
    let server = MockServer::start().await;

    let err = common::client(&server)
        .create_tasks_bulk(&CreateBulkRequest {
            index_id: String::new(),
            video_urls: vec![
                "https://example.com/a.mp4".into(),
                "https://example.com/b.mp4".into(),
            ],
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, TwelveLabsError::Validation(ref m) if m.contains("index_id")));
    assert!(server.received_requests().await.unwrap().is_empty());
}
