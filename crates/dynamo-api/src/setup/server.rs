//! Server startup and graceful shutdown

use crate::setup::{routes::setup_routes, storage::setup_storage};
use crate::state::AppState;
use anyhow::{anyhow, Context, Result};
use dynamo_core::{ConfigError, Settings};
use dynamo_storage::Storage;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct Server;

impl Server {
    /// Bind `server.host:server.http_port` and start serving.
    pub async fn start(settings: Settings) -> Result<RunningServer> {
        let port = settings
            .server
            .http_port
            .ok_or(ConfigError::MissingHttpPort)?;
        let addr = format!("{}:{}", settings.server.host, port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        Self::start_with_listener(settings, listener).await
    }

    /// Start serving on an already bound listener.
    ///
    /// The storage backend is selected once here; a configuration or
    /// backend error aborts startup before any request is accepted.
    pub async fn start_with_listener(
        settings: Settings,
        listener: TcpListener,
    ) -> Result<RunningServer> {
        settings
            .validate()
            .context("Configuration validation failed")?;
        let storage = setup_storage(&settings).await?;
        Self::serve(Arc::new(AppState::new(settings, storage)), listener)
    }

    /// Serve prepared state on `listener`.
    pub fn serve(state: Arc<AppState>, listener: TcpListener) -> Result<RunningServer> {
        let local_addr = listener.local_addr()?;
        let router = setup_routes(state.clone());
        let shutdown = CancellationToken::new();

        let graceful = shutdown.clone().cancelled_owned();
        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(graceful)
                .await
        });

        tracing::info!(
            addr = %local_addr,
            max_size_mb = state.policy.max_size_mb(),
            allowed_types = %state.policy.allowed_types_display(),
            backend = %state.storage.backend_type(),
            "Server ready and accepting connections"
        );

        Ok(RunningServer {
            local_addr,
            state,
            shutdown,
            task,
        })
    }
}

/// A server accepting connections. Dropping it leaves the server running;
/// call [`RunningServer::stop`] to drain and release storage.
pub struct RunningServer {
    local_addr: SocketAddr,
    state: Arc<AppState>,
    shutdown: CancellationToken,
    task: JoinHandle<std::io::Result<()>>,
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Drain in-flight requests for at most `drain_timeout`, then close storage.
    ///
    /// New requests get 503 as soon as this is called. If the window
    /// elapses the accept loop is aborted and an error is returned; requests
    /// still running on their connections are not cancelled and fail with
    /// `StorageError::Closed` if they reach storage afterwards. Storage is
    /// closed in every case, exactly once, since `stop` consumes the server.
    pub async fn stop(self, drain_timeout: Duration) -> Result<()> {
        let RunningServer {
            state,
            shutdown,
            mut task,
            ..
        } = self;

        tracing::info!(
            in_flight = state.in_flight(),
            drain_timeout_secs = drain_timeout.as_secs_f64(),
            "Draining server"
        );
        state.begin_drain();
        shutdown.cancel();

        let http_result = match tokio::time::timeout(drain_timeout, &mut task).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(e))) => Err(anyhow::Error::new(e).context("HTTP server failed")),
            Ok(Err(e)) => Err(anyhow!("HTTP server task failed: {}", e)),
            Err(_) => {
                task.abort();
                tracing::warn!(
                    in_flight = state.in_flight(),
                    "Drain timeout elapsed, closing storage under remaining requests"
                );
                Err(anyhow!("drain timed out after {:?}", drain_timeout))
            }
        };

        let close_result = state.storage.close().await;
        if let Err(e) = &close_result {
            tracing::error!(error = %e, "Failed to close storage backend");
        }

        match (http_result, close_result) {
            (Ok(()), Ok(())) => {
                tracing::info!("Server stopped");
                Ok(())
            }
            (Err(e), Ok(())) => {
                tracing::error!(error = %e, "Server stopped with errors");
                Err(e)
            }
            (Ok(()), Err(close)) => {
                Err(anyhow::Error::new(close).context("Failed to close storage backend"))
            }
            (Err(e), Err(close)) => {
                tracing::error!(error = %e, "Server stopped with errors");
                Err(e.context(format!("storage close also failed: {}", close)))
            }
        }
    }
}

/// Resolves on Ctrl+C (SIGINT) or SIGTERM.
///
/// If a handler cannot be installed that signal is logged and ignored.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
