//! HTTP server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::Result;
use crate::ratelimit::RateLimiter;

/// Request payload for the admission endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsRequest {
    /// Destination phone number. A missing field is treated like an empty
    /// number and rejected by the engine.
    #[serde(default)]
    pub phone_number: String,
}

/// Response payload for the admission endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsResponse {
    pub can_send: bool,
}

/// Build the API router around a shared rate limiter.
pub fn router(rate_limiter: Arc<RateLimiter>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/sms/can-send", post(can_send))
        .with_state(rate_limiter)
}

async fn can_send(
    State(rate_limiter): State<Arc<RateLimiter>>,
    Json(request): Json<SmsRequest>,
) -> Json<SmsResponse> {
    Json(SmsResponse {
        can_send: rate_limiter.can_send(&request.phone_number),
    })
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// HTTP server for the admission API.
pub struct HttpServer {
    /// Address to bind to
    addr: SocketAddr,
    /// The rate limiter instance
    rate_limiter: Arc<RateLimiter>,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(addr: SocketAddr, rate_limiter: Arc<RateLimiter>) -> Self {
        Self { addr, rate_limiter }
    }

    /// Start the HTTP server.
    ///
    /// This method will block until the server is shut down.
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        info!(addr = %self.addr, "Starting HTTP server");

        axum::serve(listener, router(self.rate_limiter))
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP server failed");
                e.into()
            })
    }

    /// Start the HTTP server with graceful shutdown.
    ///
    /// The server will shut down when the provided signal resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        info!(addr = %self.addr, "Starting HTTP server with graceful shutdown");

        axum::serve(listener, router(self.rate_limiter))
            .with_graceful_shutdown(signal)
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP server failed");
                e.into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let limiter = Arc::new(RateLimiter::new(3, 5, Duration::from_secs(300)));
        router(limiter)
    }

    async fn post_can_send(app: Router, body: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/sms/can-send")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_owned()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_can_send_allows_first_message() {
        let (status, body) = post_can_send(test_router(), r#"{"phoneNumber": "+1234567890"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["canSend"], true);
    }

    #[tokio::test]
    async fn test_can_send_blocks_over_limit() {
        let app = test_router();

        for _ in 0..3 {
            let (_, body) =
                post_can_send(app.clone(), r#"{"phoneNumber": "+1234567890"}"#).await;
            assert_eq!(body["canSend"], true);
        }

        let (status, body) = post_can_send(app, r#"{"phoneNumber": "+1234567890"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["canSend"], false);
    }

    #[tokio::test]
    async fn test_missing_phone_number_is_rejected() {
        let (status, body) = post_can_send(test_router(), r#"{}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["canSend"], false);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = test_router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_server_creation() {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let rate_limiter = Arc::new(RateLimiter::new(3, 5, Duration::from_secs(300)));
        let _server = HttpServer::new(addr, rate_limiter);
    }
}
