//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the handler table (an Axum `Router`) from explicit state
//! - Wire up middleware (tracing, request ID, timeout, body limit, metrics)
//! - Serve on a bound listener, plain or TLS, until shutdown is signalled

use std::io;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::LimitsConfig;
use crate::http::handlers;
use crate::lifecycle::ShutdownListener;
use crate::observability::metrics;
use crate::workload::{DataManager, UploadTracker};

/// State injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub tracker: UploadTracker,
    pub dataset: DataManager,
    pub limits: LimitsConfig,
}

/// Build the handler table with all middleware layers.
///
/// Pure: the router owns clones of the state handles and nothing else.
#[allow(deprecated)]
pub fn build_handlers(state: AppState) -> Router {
    let max_body_size = state.limits.max_body_size;
    let request_timeout = Duration::from_secs(state.limits.request_timeout_secs);

    Router::new()
        .route("/hello", get(handlers::hello))
        .route("/data", get(handlers::data))
        .route("/prdata", get(handlers::prdata))
        .route("/echo", post(handlers::echo))
        .route("/uploadhandler", post(handlers::upload))
        .route("/uploadtest", get(handlers::upload_test))
        .route("/downloadtest", get(handlers::download_test))
        .route_layer(middleware::from_fn(metrics::track_request))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// The harness HTTP server.
pub struct HarnessServer {
    router: Router,
    tls: Option<RustlsConfig>,
    drain_timeout: Duration,
}

impl HarnessServer {
    pub fn new(state: AppState, tls: Option<RustlsConfig>, drain_timeout: Duration) -> Self {
        Self {
            router: build_handlers(state),
            tls,
            drain_timeout,
        }
    }

    /// Serve until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownListener) -> io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            tls = self.tls.is_some(),
            "HTTP server starting"
        );

        match self.tls {
            None => {
                axum::serve(listener, self.router.into_make_service())
                    .with_graceful_shutdown(shutdown.wait())
                    .await?;
            }
            Some(tls) => {
                let handle = axum_server::Handle::new();
                let drain = handle.clone();
                let drain_timeout = self.drain_timeout;
                tokio::spawn(async move {
                    shutdown.wait().await;
                    drain.graceful_shutdown(Some(drain_timeout));
                });

                axum_server::from_tcp_rustls(listener.into_std()?, tls)
                    .handle(handle)
                    .serve(self.router.into_make_service())
                    .await?;
            }
        }

        tracing::info!(address = %addr, "HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::generate;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState {
            tracker: UploadTracker::new(),
            dataset: DataManager::new(),
            limits: LimitsConfig::default(),
        }
    }

    async fn call(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::post(uri).body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn hello() {
        let (status, body) = call(build_handlers(state()), get("/hello")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"Hello, World!\n");
    }

    #[tokio::test]
    async fn prdata_streams_sequence() {
        let mut state = state();
        state.limits.prdata_chunk_size = 7;
        let (status, body) = call(build_handlers(state), get("/prdata?len=100")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, generate(100));
    }

    #[tokio::test]
    async fn prdata_requires_len() {
        let router = build_handlers(state());
        let (status, _) = call(router.clone(), get("/prdata")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, body) = call(router, get("/prdata?len=ten")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8(body).unwrap().contains("`len`"));
    }

    #[tokio::test]
    async fn upload_counts_only_verified_bodies() {
        let state = state();
        let tracker = state.tracker.clone();
        let router = build_handlers(state);

        let (status, _) = call(router.clone(), post("/uploadhandler?len=5000", generate(5000))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(tracker.read(), 1);

        let mut corrupted = generate(5000);
        corrupted[4999] = corrupted[4999].wrapping_add(1);
        let (status, body) = call(router.clone(), post("/uploadhandler?len=5000", corrupted)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(String::from_utf8(body).unwrap().contains("at byte 4999"));
        assert_eq!(tracker.read(), 1);
        assert_eq!(tracker.failures(), 1);

        let (status, _) = call(router, post("/uploadhandler?len=5000", generate(4999))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(tracker.read(), 1);
        assert_eq!(tracker.failures(), 2);
    }

    #[tokio::test]
    async fn echo_rejects_oversized_body() {
        let mut state = state();
        state.limits.max_body_size = 1024;
        let router = build_handlers(state);

        let (status, body) = call(router.clone(), post("/echo", vec![7; 1024])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, vec![7; 1024]);

        let (status, _) = call(router, post("/echo", vec![7; 1025])).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn data_requires_loaded_dataset() {
        let state = state();
        let dataset = state.dataset.clone();
        let router = build_handlers(state);

        let (status, _) = call(router.clone(), get("/data")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        dataset.set_data(4096);
        let (status, body) = call(router, get("/data")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, dataset.get_data().unwrap().to_vec());
    }

    #[tokio::test]
    async fn wrong_method_and_unknown_path() {
        let router = build_handlers(state());
        let (status, _) = call(router.clone(), get("/echo")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        let (status, _) = call(router, get("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn request_id_is_propagated() {
        let response = build_handlers(state()).oneshot(get("/hello")).await.unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }
}
