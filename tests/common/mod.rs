//! Shared test utilities

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use parley_gateway::api::ApiServerBuilder;
use parley_gateway::{Error, Generator, Result, Synthesizer, Transcriber, Tutor, shared_session};

/// Transcriber that always hears the same words
pub struct ScriptedTranscriber(pub String);

#[async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn transcribe(&self, _audio: &[u8]) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Synthesizer that "speaks" by returning the text bytes
pub struct EchoSynthesizer;

#[async_trait]
impl Synthesizer for EchoSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        Ok(text.as_bytes().to_vec())
    }
}

/// Synthesizer whose backend is down
pub struct BrokenSynthesizer;

#[async_trait]
impl Synthesizer for BrokenSynthesizer {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
        Err(Error::Tts("Text-to-Speech API error 503".to_string()))
    }
}

/// Generator that always answers with the same text
pub struct CannedGenerator(pub String);

#[async_trait]
impl Generator for CannedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Tutor backed by fakes
#[must_use]
pub fn fake_tutor(heard: &str, reply: &str) -> Tutor {
    Tutor::new(
        shared_session(),
        Arc::new(ScriptedTranscriber(heard.to_string())),
        Arc::new(EchoSynthesizer),
        Arc::new(CannedGenerator(reply.to_string())),
    )
}

/// Router over a fake tutor, without static files
#[must_use]
pub fn build_test_router(tutor: Tutor) -> Router {
    ApiServerBuilder::new(tutor, 0)
        .tts_voice("en-US-Standard-C".to_string())
        .build()
        .router()
}

pub const BOUNDARY: &str = "parley-test-boundary";

/// Encode a single-field multipart body
#[must_use]
pub fn multipart_body(field: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"blob\"\r\nContent-Type: audio/webm\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Serve a router on an ephemeral local port and return its base URL
pub async fn serve_fake(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}")
}
