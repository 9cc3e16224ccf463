//! Serve command handler.
//!
//! Runs the HTTP server exposing the ask operation.

use clap::Args;
use ragchat_core::{AppConfig, AppResult};

use crate::commands::build_state;
use crate::server::router;

/// Serve the question-answering HTTP API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (overrides RAGCHAT_BIND)
    #[arg(short, long)]
    pub bind: Option<String>,
}

impl ServeCommand {
    /// Execute the serve command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let bind = self.bind.as_deref().unwrap_or(&config.bind);
        let state = build_state(config)?;

        tracing::info!(
            "Relevance threshold {:.2}, top_k {}, topic gate {}",
            config.retrieval.min_score,
            config.retrieval.top_k,
            if config.retrieval.topic_keywords.is_empty() {
                "disabled".to_string()
            } else {
                format!("{} keywords", config.retrieval.topic_keywords.len())
            }
        );

        let listener = tokio::net::TcpListener::bind(bind).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Serving ask API on http://{}/api/main", local_addr);

        axum::serve(listener, router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
