//! content-ops HTTP server binary.
//!
//! Starts an axum HTTP server exposing the capability gateway.
//!
//! # Environment Variables
//!
//! - `CONTENT_OPS_CONFIG` - Optional YAML config file
//! - `GOOGLE_API_KEY` / `GEMINI_API_KEY` - Gemini API key
//! - `CONTENT_OPS_MODEL` - Model id (default: gemini-2.0-flash)
//! - `CONTENT_OPS_CAPABILITIES_DIR` - Extra capability YAML files
//! - `PORT` - HTTP port (default: 8080)
//! - `RUST_LOG` - Tracing filter (default: "info,content_ops=debug")
//!
//! # Usage
//!
//! ```bash
//! GOOGLE_API_KEY=... cargo run --bin content-ops-server
//! ```

use anyhow::Context;

use content_ops::capabilities::CapabilityRegistry;
use content_ops::config::AppConfig;
use content_ops::llms::create_model;
use content_ops::server::{app_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; `log` records from the library are forwarded too.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,content_ops=debug".into()),
        )
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    if config.model.api_key.is_none() {
        tracing::warn!("No GOOGLE_API_KEY or GEMINI_API_KEY set; model calls will fail");
    }

    let model = create_model(&config.model).context("failed to create model client")?;

    let mut registry = CapabilityRegistry::builtin();
    if let Some(dir) = &config.capabilities_dir {
        let loaded = registry
            .load_directory(dir)
            .with_context(|| format!("failed to load capabilities from {}", dir.display()))?;
        tracing::info!("Loaded {} capabilities from {}", loaded, dir.display());
    }

    let keys = registry.keys().join(", ");
    let app = app_router(AppState::new(registry, model));
    let bind_addr = config.server.bind_addr();

    tracing::info!("content-ops server starting on {}", bind_addr);
    tracing::info!("Capabilities: {}", keys);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health              - liveness probe");
    tracing::info!("  GET  /capabilities        - capability listing");
    tracing::info!("  POST /actions/:capability - run a capability");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
