//! Concurrent upload and download scenarios.

use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use reqwest::StatusCode;
use transfer_harness::generate;

mod common;

// Bounded so client and server sockets stay well under the fd limit.
const IN_FLIGHT: usize = 64;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn thousand_concurrent_uploads_are_all_counted() {
    let harness = common::start_harness().await;
    let client = common::client();
    let url = harness.url("/uploadhandler?len=2048");
    let payload = generate(2048);
    let uploads = 1000;

    let statuses: Vec<StatusCode> = stream::iter(0..uploads)
        .map(|_| {
            let request = client.post(&url).body(payload.clone());
            async move { request.send().await.unwrap().status() }
        })
        .buffer_unordered(IN_FLIGHT)
        .collect()
        .await;

    assert!(statuses.iter().all(|s| *s == StatusCode::OK));
    assert!(harness.tracker().wait_for(uploads, Duration::from_secs(5)).await);
    assert_eq!(harness.tracker().read(), uploads);
    assert_eq!(harness.tracker().failures(), 0);

    harness.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn mixed_good_and_bad_uploads_are_accounted_separately() {
    let harness = common::start_harness().await;
    let client = common::client();
    let url = harness.url("/uploadhandler?len=512");

    let mut bad = generate(512);
    bad[100] ^= 0x55;
    let good = generate(512);

    let statuses: Vec<StatusCode> = stream::iter(0..200)
        .map(|i| {
            let body = if i % 4 == 0 { bad.clone() } else { good.clone() };
            let request = client.post(&url).body(body);
            async move { request.send().await.unwrap().status() }
        })
        .buffer_unordered(IN_FLIGHT)
        .collect()
        .await;

    let ok = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    assert_eq!(ok, 150);
    assert_eq!(harness.tracker().read(), 150);
    assert_eq!(harness.tracker().failures(), 50);

    harness.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_downloads_all_verify() {
    let harness = common::start_harness().await;
    let client = common::client();
    let len = 256 * 1024;
    let url = harness.url(&format!("/prdata?len={len}"));
    let expected = generate(len);

    let bodies: Vec<_> = stream::iter(0..50)
        .map(|_| {
            let request = client.get(&url);
            async move { request.send().await.unwrap().bytes().await.unwrap() }
        })
        .buffer_unordered(IN_FLIGHT)
        .collect()
        .await;

    assert_eq!(bodies.len(), 50);
    assert!(bodies.iter().all(|body| body[..] == expected[..]));

    harness.close().await.unwrap();
}

#[tokio::test]
async fn scenario_reset_between_runs() {
    let harness = common::start_harness().await;
    let client = common::client();
    let url = harness.url("/uploadhandler?len=10");

    for _ in 0..3 {
        client.post(&url).body(generate(10)).send().await.unwrap();
    }
    assert_eq!(harness.tracker().read(), 3);
    harness.end_scenario().unwrap();

    harness.begin_scenario().unwrap();
    assert_eq!(harness.tracker().read(), 0);

    client.post(&url).body(generate(10)).send().await.unwrap();
    assert_eq!(harness.tracker().read(), 1);

    harness.close().await.unwrap();
}

#[tokio::test]
async fn harnesses_do_not_share_trackers() {
    let first = common::start_harness().await;
    let second = common::start_harness().await;
    assert_ne!(first.port(), second.port());

    common::client()
        .post(first.url("/uploadhandler?len=32"))
        .body(generate(32))
        .send()
        .await
        .unwrap();

    assert_eq!(first.tracker().read(), 1);
    assert_eq!(second.tracker().read(), 0);

    first.close().await.unwrap();
    second.close().await.unwrap();
}
