//! Serve command - exposes the saved model over HTTP.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use ml_model::Predictor;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::server::{AppState, router};

/// Runs the serve command until Ctrl-C or SIGTERM.
///
/// The model is loaded once before binding; a missing artifact aborts startup.
///
/// # Errors
///
/// Returns an error if the model cannot be loaded or the address cannot be bound.
pub async fn run(model_path: &Path, addr: SocketAddr) -> Result<()> {
    let predictor = Predictor::load(model_path)?;
    info!(
        model_path = %model_path.display(),
        test_accuracy = predictor.manifest().report.accuracy,
        "Model loaded"
    );

    let state = AppState {
        predictor: Arc::new(predictor),
    };

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
