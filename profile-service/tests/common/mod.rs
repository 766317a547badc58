#![allow(dead_code)]

use axum::{http::StatusCode, routing::get, Router};
use profile_service::config::{FactSourceConfig, ProfileConfig, ProfileServiceConfig};
use profile_service::startup::Application;
use service_core::config::Config as CoreConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

pub const EMAIL: &str = "ada@example.com";
pub const NAME: &str = "Ada Lovelace";
pub const STACK: &str = "Rust/axum";

/// Canned reply from the stub fact source.
#[derive(Clone)]
pub struct StubReply {
    pub status: StatusCode,
    pub body: String,
    pub delay: Duration,
}

impl StubReply {
    pub fn json(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            body: r#"{"fact":"served with an error status"}"#.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A local stand-in for the third-party fact API.
pub struct StubFactSource {
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl StubFactSource {
    pub async fn spawn(reply: StubReply) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        let router = Router::new().route(
            "/fact",
            get(move || {
                let reply = reply.clone();
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(reply.delay).await;
                    (
                        reply.status,
                        [("content-type", "application/json")],
                        reply.body,
                    )
                }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub fact source");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Self {
            url: format!("http://127.0.0.1:{}/fact", port),
            hits,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// A URL nothing is listening on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/fact", port)
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub ops_address: Option<String>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn(fact_url: Option<String>) -> Self {
        Self::spawn_with(fact_url, Duration::from_secs(5), false).await
    }

    pub async fn spawn_with(fact_url: Option<String>, timeout: Duration, ops: bool) -> Self {
        let config = ProfileServiceConfig {
            common: CoreConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                ops_port: ops.then_some(0),
            },
            profile: ProfileConfig {
                email: Some(EMAIL.to_string()),
                name: Some(NAME.to_string()),
                stack: Some(STACK.to_string()),
            },
            fact_source: FactSourceConfig {
                url: fact_url,
                timeout,
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.http_port();
        let ops_address = app
            .ops_port()
            .map(|p| format!("http://127.0.0.1:{}", p));

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            port,
            ops_address,
            client: reqwest::Client::new(),
        }
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .expect("Failed to send request")
    }

    /// `GET /me`, returning the status, the content type and the raw body.
    pub async fn get_me(&self) -> (reqwest::StatusCode, String, String) {
        let response = self.get("/me").await;
        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await.expect("Failed to read body");
        (status, content_type, body)
    }

    /// The `fact` field of a fresh `GET /me`.
    pub async fn fact(&self) -> String {
        let (status, _, body) = self.get_me().await;
        assert_eq!(status, reqwest::StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).expect("body is not JSON");
        json["fact"].as_str().expect("fact is not a string").to_string()
    }
}
