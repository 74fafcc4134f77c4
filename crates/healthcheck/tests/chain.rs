mod common;

use common::init_tracing;
use healthcheck::{
    Chain, HealthCheckError, HealthChecker, NoHealthCheck, Payload, TcpHealthCheck, TcpOptions,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

fn tcp(alt_port: Option<u16>) -> Arc<dyn HealthChecker> {
    Arc::new(TcpHealthCheck::new(TcpOptions {
        alt_port,
        timeout: Duration::from_secs(1),
        ..Default::default()
    }))
}

fn noop() -> Arc<dyn HealthChecker> {
    Arc::new(NoHealthCheck)
}

#[tokio::test]
async fn test_serial_require_all_reports_first_failure() {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    let closed = closed_port().await;

    let chain = Chain::new(false, true, vec![noop(), tcp(Some(closed)), tcp(None)]);
    let err = chain.check(&host).await.unwrap_err();

    assert!(matches!(err, HealthCheckError::CheckFailed { .. }));
    assert!(
        err.to_string()
            .starts_with(&format!("error on healthcheck 'TcpHealthCheck' for host '{}': ", host)),
        "{}",
        err
    );
}

#[tokio::test]
async fn test_serial_one_succeed() {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    let closed = closed_port().await;

    let chain = Chain::new(false, false, vec![tcp(Some(closed)), tcp(None)]);
    chain.check(&host).await.unwrap();

    let chain = Chain::new(false, false, vec![tcp(Some(closed)), tcp(Some(closed))]);
    let err = chain.check(&host).await.unwrap_err();
    assert_eq!(err.failures().len(), 2);
    assert!(err
        .to_string()
        .starts_with(&format!("errors on healthchecks for host '{}':\n", host)));
}

#[tokio::test]
async fn test_parallel_require_all() {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    let closed = closed_port().await;

    let chain = Chain::new(true, true, vec![tcp(None), noop(), tcp(None)]);
    chain.check(&host).await.unwrap();

    let chain = Chain::new(true, true, vec![tcp(None), tcp(Some(closed)), noop()]);
    let err = chain.check(&host).await.unwrap_err();
    assert_eq!(err.failures().len(), 1);
    assert_eq!(err.failures()[0].name, "TcpHealthCheck");
}

#[tokio::test]
async fn test_parallel_one_succeed() {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    let closed = closed_port().await;

    let chain = Chain::new(true, false, vec![tcp(Some(closed)), noop()]);
    chain.check(&host).await.unwrap();

    let chain = Chain::new(true, false, vec![tcp(Some(closed)), tcp(Some(closed))]);
    let err = chain.check(&host).await.unwrap_err();
    assert_eq!(err.failures().len(), 2);
}

#[tokio::test]
async fn test_nested_chain_with_payload_check() {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        use tokio::io::AsyncWriteExt;
        while let Ok((mut stream, _)) = listener.accept().await {
            let _ = stream.write_all(b"hello").await;
        }
    });

    let greeting: Arc<dyn HealthChecker> = Arc::new(TcpHealthCheck::new(TcpOptions {
        receive: vec![Payload::text("hello")],
        ..Default::default()
    }));
    let inner: Arc<dyn HealthChecker> = Arc::new(Chain::new(true, true, vec![greeting, noop()]));
    let outer = Chain::new(false, true, vec![noop(), inner]);

    outer.check(&host).await.unwrap();
}

#[tokio::test]
async fn test_empty_chain_succeeds() {
    for (parallel, require_all) in [(false, false), (false, true), (true, false), (true, true)] {
        Chain::new(parallel, require_all, Vec::new())
            .check("unused:1")
            .await
            .unwrap();
    }
}
