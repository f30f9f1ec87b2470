//! HTTP API
//!
//! JSON over HTTP/1.1. Decoding and presence checks happen here; everything
//! else is forwarded to the [`VendingService`].

mod error;
mod handlers;

pub use error::{ApiError, ErrorResponse};
pub use handlers::*;

use crate::application::service::VendingService;
use crate::error::{Result, VendingError};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<VendingService>,
}

impl AppState {
    pub fn new(service: Arc<VendingService>) -> Self {
        Self { service }
    }
}

/// Serves `app` until `shutdown` resolves.
///
/// After the signal, in-flight requests get `grace` to finish before the
/// remaining connections are dropped.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F, grace: Duration) -> Result<()>
where
    F: Future<Output = ()> + Send,
{
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = stop_rx.await;
    });
    let mut handle = tokio::spawn(async move { server.await });

    tokio::select! {
        joined = &mut handle => return flatten(joined),
        () = shutdown => {}
    }

    tracing::info!(grace_seconds = grace.as_secs(), "shutting down http server");
    let _ = stop_tx.send(());

    match tokio::time::timeout(grace, &mut handle).await {
        Ok(joined) => flatten(joined),
        Err(_) => {
            tracing::warn!("graceful shutdown timed out, dropping open connections");
            handle.abort();
            Ok(())
        }
    }
}

fn flatten(joined: std::result::Result<std::io::Result<()>, tokio::task::JoinError>) -> Result<()> {
    match joined {
        Ok(result) => result.map_err(VendingError::from),
        Err(err) => Err(VendingError::Io(std::io::Error::other(err))),
    }
}
