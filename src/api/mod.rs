//! HTTP API server for the Parley gateway

pub mod health;
pub mod practice;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::tutor::Tutor;

/// Shared state for API handlers
pub struct ApiState {
    pub tutor: Tutor,
    pub llm_model: String,
    pub tts_voice: String,
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    tutor: Tutor,
    host: String,
    port: u16,
    llm_model: String,
    tts_voice: String,
    static_dir: Option<PathBuf>,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(tutor: Tutor, port: u16) -> Self {
        Self {
            tutor,
            host: "127.0.0.1".to_string(),
            port,
            llm_model: crate::llm::DEFAULT_MODEL.to_string(),
            tts_voice: String::new(),
            static_dir: None,
        }
    }

    /// Set the bind address
    #[must_use]
    pub fn host(mut self, host: String) -> Self {
        self.host = host;
        self
    }

    /// Set the LLM model identifier reported by `/status`
    #[must_use]
    pub fn llm_model(mut self, model: String) -> Self {
        self.llm_model = model;
        self
    }

    /// Set the TTS voice reported by `/status`
    #[must_use]
    pub fn tts_voice(mut self, voice: String) -> Self {
        self.tts_voice = voice;
        self
    }

    /// Set the static files directory for serving the web page
    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let state = Arc::new(ApiState {
            tutor: self.tutor,
            llm_model: self.llm_model,
            tts_voice: self.tts_voice,
        });

        ApiServer {
            state,
            host: self.host,
            port: self.port,
            static_dir: self.static_dir,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    host: String,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Build the router with all routes
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .merge(practice::router(self.state.clone()))
            .merge(health::router())
            .merge(health::status_router(self.state.clone()));

        // Serve static files if configured
        if let Some(static_dir) = &self.static_dir {
            let index_file = static_dir.join("index.html");
            let serve_dir = ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

            router = router.fallback_service(serve_dir);
            tracing::info!(path = %static_dir.display(), "serving static files");
        }

        // CORS layer for cross-origin requests from frontend
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(addr = %addr, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}
