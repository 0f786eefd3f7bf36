//! API endpoint integration tests

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use parley_gateway::api::ApiServerBuilder;
use parley_gateway::{Role, Tutor, shared_session};
use tower::ServiceExt;

mod common;
use common::{
    BOUNDARY, BrokenSynthesizer, CannedGenerator, ScriptedTranscriber, build_test_router,
    fake_tutor, multipart_body,
};

const FULL_REPLY: &str = "AI_RESPONSE: What did you watch?\n[CORRECTION]\nOriginal: I watch movie yesterday\nCorrected: I watched a movie yesterday\nExplanation: 過去の話なので過去形にします";

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_audio(field: &str, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, data)))
        .unwrap()
}

fn hex_decode(value: &serde_json::Value) -> Vec<u8> {
    hex::decode(value.as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_test_router(fake_tutor("", ""));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_start_returns_greeting_and_audio() {
    let app = build_test_router(fake_tutor("", ""));

    let response = app.oneshot(post_empty("/start")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    let text = json["text"].as_str().unwrap();
    assert!(text.starts_with("Hi there!"));
    assert_eq!(hex_decode(&json["audio_content"]), text.as_bytes());
}

#[tokio::test]
async fn test_chat_round_trip() {
    let app = build_test_router(fake_tutor("I watch movie yesterday", FULL_REPLY));

    app.clone().oneshot(post_empty("/start")).await.unwrap();
    let response = app
        .clone()
        .oneshot(post_audio("audio", b"\x1a\x45\xdf\xa3webm"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["user_text"], "I watch movie yesterday");
    assert_eq!(json["ai_text"], "What did you watch?");
    assert_eq!(json["correction"]["original"], "I watch movie yesterday");
    assert_eq!(json["correction"]["corrected"], "I watched a movie yesterday");
    assert_eq!(json["correction"]["explanation"], "過去の話なので過去形にします");
    assert_eq!(hex_decode(&json["audio_content"]), b"What did you watch?");

    let status = json_body(
        app.oneshot(
            Request::builder()
                .uri("/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap(),
    )
    .await;
    assert_eq!(status["turns"], 3);
    assert_eq!(status["tts_voice"], "en-US-Standard-C");
}

#[tokio::test]
async fn test_chat_without_correction_block() {
    let app = build_test_router(fake_tutor("hello", "AI_RESPONSE: Hello there"));

    let response = app.oneshot(post_audio("audio", b"webm")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["ai_text"], "Hello there");
    assert_eq!(json["correction"]["original"], "");
    assert_eq!(json["correction"]["corrected"], "");
    assert_eq!(json["correction"]["explanation"], "");
}

#[tokio::test]
async fn test_chat_empty_transcript_is_bad_request() {
    let session = shared_session();
    let tutor = Tutor::new(
        session.clone(),
        Arc::new(ScriptedTranscriber(String::new())),
        Arc::new(common::EchoSynthesizer),
        Arc::new(CannedGenerator(FULL_REPLY.to_string())),
    );
    let app = build_test_router(tutor);

    app.clone().oneshot(post_empty("/start")).await.unwrap();
    let before = session.lock().await.len();

    let response = app.oneshot(post_audio("audio", b"silence")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error"]["message"], "Could not understand audio");
    assert_eq!(session.lock().await.len(), before);
}

#[tokio::test]
async fn test_chat_missing_audio_field() {
    let app = build_test_router(fake_tutor("hello", FULL_REPLY));

    let response = app.oneshot(post_audio("file", b"webm")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_synthesis_failure_is_bad_gateway() {
    let tutor = Tutor::new(
        shared_session(),
        Arc::new(ScriptedTranscriber("hello".to_string())),
        Arc::new(BrokenSynthesizer),
        Arc::new(CannedGenerator(FULL_REPLY.to_string())),
    );
    let app = build_test_router(tutor);

    let response = app.oneshot(post_empty("/start")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "synthesis_failed");
}

#[tokio::test]
async fn test_start_twice_keeps_only_new_greeting() {
    let session = shared_session();
    let tutor = Tutor::new(
        session.clone(),
        Arc::new(ScriptedTranscriber("I like dogs".to_string())),
        Arc::new(common::EchoSynthesizer),
        Arc::new(CannedGenerator(FULL_REPLY.to_string())),
    );
    let app = build_test_router(tutor);

    app.clone().oneshot(post_empty("/start")).await.unwrap();
    app.clone()
        .oneshot(post_audio("audio", b"webm"))
        .await
        .unwrap();
    assert_eq!(session.lock().await.len(), 3);

    let json = json_body(app.oneshot(post_empty("/start")).await.unwrap()).await;

    let guard = session.lock().await;
    let turns = guard.snapshot();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].role, Role::Model);
    assert_eq!(turns[0].text, json["text"].as_str().unwrap());
}

#[tokio::test]
async fn test_status_answers_while_session_busy() {
    let session = shared_session();
    let tutor = Tutor::new(
        session.clone(),
        Arc::new(ScriptedTranscriber("hello".to_string())),
        Arc::new(common::EchoSynthesizer),
        Arc::new(CannedGenerator(FULL_REPLY.to_string())),
    );
    let app = build_test_router(tutor);
    app.clone().oneshot(post_empty("/start")).await.unwrap();

    // Stand-in for a chat cycle holding the session
    let _busy = session.lock().await;

    let response = tokio::time::timeout(
        Duration::from_secs(5),
        app.oneshot(
            Request::builder()
                .uri("/status")
                .body(Body::empty())
                .unwrap(),
        ),
    )
    .await
    .expect("/status must not wait on the session lock")
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["turns"], 1);
}

#[tokio::test]
async fn test_translate() {
    let app = build_test_router(fake_tutor(
        "",
        "Formal: I would like some coffee.\nCasual: Coffee, please!",
    ));

    let response = app
        .oneshot(post_json("/translate", r#"{"jp_text": "コーヒーください"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    let en_text = json["en_text"].as_str().unwrap();
    assert!(en_text.lines().any(|line| !line.trim().is_empty()));
}

#[tokio::test]
async fn test_translate_empty_input() {
    let app = build_test_router(fake_tutor("", "unused"));

    for body in [r#"{"jp_text": ""}"#, "{}"] {
        let response = app.clone().oneshot(post_json("/translate", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_translate_malformed_json() {
    let app = build_test_router(fake_tutor("", "unused"));

    let response = app
        .oneshot(post_json("/translate", "{not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_static_index_served() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>practice</h1>").unwrap();

    let app = ApiServerBuilder::new(fake_tutor("", ""), 0)
        .static_dir(Some(dir.path().to_path_buf()))
        .build()
        .router();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"<h1>practice</h1>");
}
