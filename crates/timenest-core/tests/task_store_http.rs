//! HTTP task store against a mocked REST API.

use std::sync::Arc;
use std::time::Duration;

use mockito::Matcher;
use serde_json::json;
use timenest_core::credentials::StaticTokenProvider;
use timenest_core::tasks::{HttpTaskStore, NewTask, Priority, TaskStore, TaskUpdate};
use timenest_core::TaskStoreError;

fn store(server: &mockito::Server, token: Option<&str>) -> HttpTaskStore {
    HttpTaskStore::new(
        &format!("{}/api", server.url()),
        Duration::from_secs(5),
        Arc::new(StaticTokenProvider(token.map(String::from))),
    )
    .unwrap()
}

#[tokio::test]
async fn list_sends_bearer_token_and_reads_items() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/tasks/")
        .match_header("authorization", "Bearer secret")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "items": [
                    { "id": "1", "title": "Pay rent", "priority": "high",
                      "due_date": "2025-01-12", "due_time": "14:30", "completed": false },
                    { "id": "2", "title": "Call mom", "completed": true }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let tasks = store(&server, Some("secret")).list().await.unwrap();
    mock.assert_async().await;

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].priority(), Some(Priority::High));
    assert!(tasks[0].is_reminder_eligible());
    assert!(tasks[1].completed);
}

#[tokio::test]
async fn list_without_token_never_hits_the_server() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/tasks/")
        .expect(0)
        .create_async()
        .await;

    let err = store(&server, None).list().await.unwrap_err();
    assert!(matches!(err, TaskStoreError::NotAuthenticated));
    mock.assert_async().await;
}

#[tokio::test]
async fn create_posts_payload_and_returns_item() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/tasks/")
        .match_body(Matcher::Json(json!({
            "title": "Write report",
            "priority": "medium",
            "due_date": "2025-01-12",
            "due_time": "09:00"
        })))
        .with_status(201)
        .with_body(
            json!({ "item": { "id": "abc", "title": "Write report", "priority": "medium",
                              "due_date": "2025-01-12", "due_time": "09:00", "completed": false } })
            .to_string(),
        )
        .create_async()
        .await;

    let mut task = NewTask::new("Write report");
    task.priority = Some(Priority::Medium);
    task.due_date = Some("2025-01-12".into());
    task.due_time = Some("09:00".into());

    let created = store(&server, Some("secret")).create(&task).await.unwrap();
    mock.assert_async().await;
    assert_eq!(created.id, "abc");
}

#[tokio::test]
async fn blank_title_is_rejected_locally() {
    let server = mockito::Server::new_async().await;
    let err = store(&server, Some("secret"))
        .create(&NewTask::new("  "))
        .await
        .unwrap_err();
    assert!(matches!(err, TaskStoreError::InvalidRequest(_)));
}

#[tokio::test]
async fn update_surfaces_server_error_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("PUT", "/api/tasks/missing")
        .with_status(404)
        .with_body(json!({ "error": "Task not found" }).to_string())
        .create_async()
        .await;

    let err = store(&server, Some("secret"))
        .update("missing", &TaskUpdate::completed(true))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "Task not found");
}

#[tokio::test]
async fn delete_without_error_body_uses_fallback_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/api/tasks/abc")
        .with_status(500)
        .with_body("internal")
        .create_async()
        .await;

    let err = store(&server, Some("secret")).delete("abc").await.unwrap_err();
    assert_eq!(err.to_string(), "Delete failed (500)");
}

#[tokio::test]
async fn delete_succeeds() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", "/api/tasks/abc")
        .with_status(200)
        .with_body(json!({ "status": "deleted", "id": "abc" }).to_string())
        .create_async()
        .await;

    store(&server, Some("secret")).delete("abc").await.unwrap();
    mock.assert_async().await;
}
