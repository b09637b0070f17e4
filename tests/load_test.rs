//! Admission control under concurrent load.

use std::time::Duration;

use tokio::task::JoinSet;

mod common;
use common::{chat_completion, client, post, proxy_config, start_mock_upstream, start_proxy};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_burst_admits_exactly_limit() {
    let (upstream, recorder) = start_mock_upstream(|| async { chat_completion() }).await;
    let limit = 10;
    let extra = 15;
    let mut config = proxy_config(upstream);
    config.rate_limit.max_requests = limit;
    let (proxy, shutdown) = start_proxy(config).await;

    let client = client();
    let mut tasks = JoinSet::new();
    for _ in 0..(limit + extra) {
        let client = client.clone();
        tasks.spawn(async move {
            post(&client, proxy, r#"{"model":"gpt-4"}"#)
                .send()
                .await
                .map(|res| res.status().as_u16())
        });
    }

    let mut ok = 0;
    let mut limited = 0;
    while let Some(result) = tasks.join_next().await {
        match result.unwrap().expect("Proxy unreachable") {
            200 => ok += 1,
            429 => limited += 1,
            other => panic!("unexpected status {other}"),
        }
    }

    assert_eq!(ok, limit);
    assert_eq!(limited, extra);
    assert_eq!(recorder.count(), limit as usize);

    shutdown.trigger();
}

#[tokio::test]
async fn test_window_elapse_readmits_client() {
    let (upstream, _) = start_mock_upstream(|| async { chat_completion() }).await;
    let mut config = proxy_config(upstream);
    config.rate_limit.max_requests = 2;
    config.rate_limit.window_ms = 500;
    let (proxy, shutdown) = start_proxy(config).await;
    let client = client();

    for _ in 0..2 {
        let res = post(&client, proxy, r#"{"model":"gpt-4"}"#).send().await.unwrap();
        assert_eq!(res.status(), 200);
    }
    let res = post(&client, proxy, r#"{"model":"gpt-4"}"#).send().await.unwrap();
    assert_eq!(res.status(), 429);
    assert_eq!(res.text().await.unwrap(), "Too many requests");

    tokio::time::sleep(Duration::from_millis(600)).await;

    let res = post(&client, proxy, r#"{"model":"gpt-4"}"#).send().await.unwrap();
    assert_eq!(res.status(), 200);

    shutdown.trigger();
}

#[tokio::test]
async fn test_disabled_rate_limit_admits_everything() {
    let (upstream, recorder) = start_mock_upstream(|| async { chat_completion() }).await;
    let mut config = proxy_config(upstream);
    config.rate_limit.enabled = false;
    config.rate_limit.max_requests = 1;
    let (proxy, shutdown) = start_proxy(config).await;
    let client = client();

    for _ in 0..5 {
        let res = post(&client, proxy, r#"{"model":"gpt-4"}"#).send().await.unwrap();
        assert_eq!(res.status(), 200);
    }
    assert_eq!(recorder.count(), 5);

    shutdown.trigger();
}
