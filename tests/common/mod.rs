//! Shared utilities for the harness integration tests.

use transfer_harness::{Harness, HarnessConfig};

/// Start a harness on an ephemeral loopback port and begin a scenario.
#[allow(dead_code)]
pub async fn start_harness() -> Harness {
    start_harness_with(HarnessConfig::default()).await
}

#[allow(dead_code)]
pub async fn start_harness_with(config: HarnessConfig) -> Harness {
    let harness = Harness::start(config).await.expect("harness should start");
    harness.begin_scenario().expect("scenario should begin");
    harness
}

/// A client that never routes loopback traffic through a proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("client should build")
}
