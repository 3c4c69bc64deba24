mod support;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use support::{locations_path, ScriptedClient};
use tower::ServiceExt;
use wayfarer_api::build_app_with;
use wayfarer_storage::Store;

fn app_with(client: Arc<ScriptedClient>) -> Router {
    let store = Store::from_json_file(locations_path()).expect("sample locations load");
    build_app_with(store, client, 1024)
}

async fn post_chat(app: Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_ok_and_model() {
    let app = app_with(Arc::new(ScriptedClient::replying("unused")));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "scripted");
    assert_eq!(body["metrics"]["requests_total"], 0);
}

#[tokio::test]
async fn blank_message_is_a_bad_request() {
    let client = Arc::new(ScriptedClient::replying("unused"));

    let (status, body) = post_chat(app_with(client.clone()), json!({ "message": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Empty message" }));

    let (status, body) = post_chat(app_with(client.clone()), json!({ "location": "Paris" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Empty message");

    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn small_talk_is_redirected_without_completion() {
    let client = Arc::new(ScriptedClient::replying("unused"));

    let (status, body) = post_chat(
        app_with(client.clone()),
        json!({ "message": "thanks!", "location": "Paris" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["response"],
        "You're welcome! Feel free to ask me anything else about your Paris trip."
    );
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn travel_question_returns_completion_text() {
    let client = Arc::new(ScriptedClient::replying("Day 1: Colosseum"));

    let (status, body) = post_chat(
        app_with(client.clone()),
        json!({
            "message": "Plan a 2 day trip please",
            "location": "rome",
            "history": ["We love history", "and pasta"]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "response": "Day 1: Colosseum" }));

    let requests = client.requests.lock();
    assert_eq!(requests.len(), 1);
    let contents = requests[0]
        .messages
        .iter()
        .map(|message| message.content.as_str())
        .collect::<Vec<_>>();
    assert!(contents[0].contains("Colosseum"));
    assert_eq!(&contents[1..], ["We love history", "and pasta", "Plan a 2 day trip please"]);
    assert_eq!(requests[0].max_tokens, 1024);
}

#[tokio::test]
async fn completion_failure_is_still_a_success_response() {
    let client = Arc::new(ScriptedClient::failing("upstream timed out"));

    let (status, body) = post_chat(
        app_with(client),
        json!({ "message": "What should I eat in Bangkok?", "location": "Bangkok" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let text = body["response"].as_str().unwrap();
    assert!(text.starts_with("Error: "));
    assert!(text.contains("upstream timed out"));
}

#[tokio::test]
async fn lists_sample_locations_sorted() {
    let app = app_with(Arc::new(ScriptedClient::replying("unused")));

    let response = app
        .oneshot(Request::builder().uri("/api/locations").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let names: Vec<String> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        names,
        ["Bangkok", "Barcelona", "New York", "Paris", "Rome", "Tokyo"]
    );
}
