//! The harness request handlers.
//!
//! | Path             | Method | Behaviour                                   |
//! |------------------|--------|---------------------------------------------|
//! | `/hello`         | GET    | fixed greeting                              |
//! | `/data`          | GET    | currently loaded dataset                    |
//! | `/prdata`        | GET    | `generate(len)`, streamed                   |
//! | `/echo`          | POST   | request body, unchanged                     |
//! | `/uploadhandler` | POST   | verify body against `generate(len)`, count  |
//! | `/uploadtest`    | GET    | upload fan-out page                         |
//! | `/downloadtest`  | GET    | download fan-out page                       |

use axum::{
    body::{Body, Bytes},
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use futures_util::StreamExt;

use crate::http::error::HandlerError;
use crate::http::pages;
use crate::http::params::ScenarioQuery;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::workload::{generator, SequenceVerifier};

pub const HELLO_BODY: &str = "Hello, World!\n";

pub async fn hello() -> &'static str {
    HELLO_BODY
}

pub async fn data(State(state): State<AppState>) -> Result<Response, HandlerError> {
    let data = state.dataset.get_data().ok_or(HandlerError::NoDataset)?;
    metrics::record_bytes_served("/data", data.len());
    Ok(octet_stream(data.len(), Body::from(data)))
}

pub async fn prdata(
    State(state): State<AppState>,
    Query(query): Query<ScenarioQuery>,
) -> Result<Response, HandlerError> {
    let len = query.len()?;
    tracing::debug!(len, "Serving pseudo-random data");
    metrics::record_bytes_served("/prdata", len);

    let chunks = generator::chunk_stream(len, state.limits.prdata_chunk_size);
    Ok(octet_stream(len, Body::from_stream(chunks)))
}

/// Oversized bodies are rejected with 413 by the router's body limit.
pub async fn echo(body: Bytes) -> Bytes {
    tracing::debug!(len = body.len(), "Echoing request body");
    metrics::record_bytes_served("/echo", body.len());
    body
}

/// Verify an uploaded body while it streams in.
///
/// The body is always drained completely so the client sees the verdict
/// instead of a reset connection.
pub async fn upload(
    State(state): State<AppState>,
    Query(query): Query<ScenarioQuery>,
    body: Body,
) -> Result<StatusCode, HandlerError> {
    let len = query.len()?;
    let mut verifier = SequenceVerifier::new(len);
    let mut stream = body.into_data_stream();

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => verifier.update(&chunk),
            Err(e) => {
                state.tracker.record_failure();
                metrics::record_upload(false);
                return Err(HandlerError::BodyRead(e));
            }
        }
    }

    match verifier.finish() {
        Ok(received) => {
            state.tracker.increment();
            metrics::record_upload(true);
            tracing::debug!(len = received, total = state.tracker.read(), "Upload verified");
            Ok(StatusCode::OK)
        }
        Err(mismatch) => {
            state.tracker.record_failure();
            metrics::record_upload(false);
            Err(mismatch.into())
        }
    }
}

pub async fn upload_test(Query(query): Query<ScenarioQuery>) -> Result<Html<String>, HandlerError> {
    let (len, num) = (query.len()?, query.num()?);
    tracing::debug!(len, num, "Serving upload test page");
    Ok(Html(pages::upload_page(len, num)))
}

pub async fn download_test(
    Query(query): Query<ScenarioQuery>,
) -> Result<Html<String>, HandlerError> {
    let (len, num) = (query.len()?, query.num()?);
    tracing::debug!(len, num, "Serving download test page");
    Ok(Html(pages::download_page(len, num)))
}

fn octet_stream(len: usize, body: Body) -> Response {
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream")),
            (header::CONTENT_LENGTH, HeaderValue::from(len)),
        ],
        body,
    )
        .into_response()
}
