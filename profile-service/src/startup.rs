//! Application startup and lifecycle management.
//!
//! The public listener serves `GET /me` and a JSON 404 for everything else.
//! Health and metrics live on an optional second listener so they never
//! widen the public surface.

use crate::config::ProfileServiceConfig;
use crate::handlers::{get_profile, health_check, metrics, not_found};
use crate::services::{FactProvider, HttpFactProvider};
use axum::{middleware::from_fn, routing::get, Router};
use reqwest::Client;
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::future::IntoFuture;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProfileServiceConfig>,
    pub fact_provider: Arc<dyn FactProvider>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/me", get(get_profile).fallback(not_found))
        .fallback(not_found)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

fn ops_router() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

async fn bind(host: &str, port: u16) -> Result<TcpListener, AppError> {
    let ip: IpAddr = host.parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("invalid listen host {:?}: {}", host, e))
    })?;
    let addr = SocketAddr::new(ip, port);

    TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("Failed to bind listener to {}: {}", addr, e);
        AppError::from(e)
    })
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    http_listener: TcpListener,
    ops_listener: Option<TcpListener>,
    ops_port: Option<u16>,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    ///
    /// Port `0` binds a random free port, which tests rely on.
    pub async fn build(config: ProfileServiceConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("HTTP client: {}", e)))?;

        match &config.fact_source.url {
            Some(url) => tracing::info!(
                url = %url,
                timeout_secs = config.fact_source.timeout.as_secs_f64(),
                "Fact source configured"
            ),
            None => tracing::warn!("CAT_FACT_API_URL is not set, /me will serve the fallback fact"),
        }

        let fact_provider: Arc<dyn FactProvider> = Arc::new(HttpFactProvider::new(
            client,
            config.fact_source.clone(),
        ));

        Self::build_with_provider(config, fact_provider).await
    }

    /// Build with a caller-supplied fact provider.
    pub async fn build_with_provider(
        config: ProfileServiceConfig,
        fact_provider: Arc<dyn FactProvider>,
    ) -> Result<Self, AppError> {
        let http_listener = bind(&config.common.host, config.common.port).await?;
        let http_port = http_listener.local_addr()?.port();

        let ops_listener = match config.common.ops_port {
            Some(port) => Some(bind(&config.common.host, port).await?),
            None => None,
        };
        let ops_port = match &ops_listener {
            Some(listener) => Some(listener.local_addr()?.port()),
            None => None,
        };

        tracing::info!(http_port, ?ops_port, "Profile service listeners bound");

        Ok(Self {
            http_port,
            http_listener,
            ops_listener,
            ops_port,
            state: AppState {
                config: Arc::new(config),
                fact_provider,
            },
        })
    }

    /// Get the HTTP port the public API is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Get the port serving `/health` and `/metrics`, if enabled.
    pub fn ops_port(&self) -> Option<u16> {
        self.ops_port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let http_server = axum::serve(self.http_listener, build_router(self.state))
            .with_graceful_shutdown(shutdown_signal());

        let Some(ops_listener) = self.ops_listener else {
            return http_server.await.map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            });
        };

        let ops_server =
            axum::serve(ops_listener, ops_router()).with_graceful_shutdown(shutdown_signal());

        tokio::select! {
            result = http_server.into_future() => {
                if let Err(e) = result {
                    tracing::error!("HTTP server error: {}", e);
                    return Err(e);
                }
            }
            result = ops_server.into_future() => {
                if let Err(e) = result {
                    tracing::error!("Ops server error: {}", e);
                    return Err(e);
                }
            }
        }

        Ok(())
    }
}
