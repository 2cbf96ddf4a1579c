use driftwatch::domain::report::GaugeValues;
use driftwatch::infrastructure::{DriftMetrics, MetricsServer, endpoint_stopped};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::task::JoinHandle;

async fn start(metrics: DriftMetrics) -> SocketAddr {
    let server = MetricsServer::bind("127.0.0.1:0".parse().unwrap(), metrics)
        .await
        .expect("bind metrics endpoint");
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.serve());
    addr
}

#[tokio::test]
async fn test_metrics_served_before_first_cycle() {
    let addr = start(DriftMetrics::new().unwrap()).await;

    let response = reqwest::get(format!("http://{}/metrics", addr)).await.unwrap();
    assert!(response.status().is_success());
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    let body = response.text().await.unwrap();
    for line in [
        "ml_drifted_columns 0",
        "ml_share_drifted 0",
        "ml_dataset_drift 0",
        "ml_drifted_column_example 0",
        "ml_drift_monitor_healthy 0",
    ] {
        assert!(body.contains(line), "missing '{}' in:\n{}", line, body);
    }
}

#[tokio::test]
async fn test_published_values_are_scraped() {
    let metrics = DriftMetrics::new().unwrap();
    let addr = start(metrics.clone()).await;

    metrics.publish(&GaugeValues {
        drifted_columns: 4.0,
        share_drifted: 0.25,
        dataset_drift: 0.0,
        drifted_column_example: 42.0,
    });
    metrics.record_success(Duration::from_millis(120));

    let body = reqwest::get(format!("http://{}/metrics", addr))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("ml_drifted_columns 4"));
    assert!(body.contains("ml_share_drifted 0.25"));
    assert!(body.contains("ml_drifted_column_example 42"));
    assert!(body.contains("ml_drift_monitor_healthy 1"));
    assert!(body.contains("ml_drift_cycles_total{outcome=\"success\"} 1"));
}

#[tokio::test]
async fn test_health_reports_monitor_state() {
    let metrics = DriftMetrics::new().unwrap();
    let addr = start(metrics.clone()).await;
    let url = format!("http://{}/health", addr);

    let health: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
    assert_eq!(health["status"], "alive");
    assert_eq!(health["monitor_healthy"], false);

    metrics.record_success(Duration::from_millis(5));
    let health: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
    assert_eq!(health["monitor_healthy"], true);
}

#[tokio::test]
async fn test_bind_conflict_is_an_error() {
    let first = MetricsServer::bind("127.0.0.1:0".parse().unwrap(), DriftMetrics::new().unwrap())
        .await
        .unwrap();
    let taken = first.local_addr().unwrap();

    let second = MetricsServer::bind(taken, DriftMetrics::new().unwrap()).await;
    assert!(second.is_err());
}

#[tokio::test]
async fn test_endpoint_exit_is_an_error() {
    let failed: JoinHandle<anyhow::Result<()>> =
        tokio::spawn(async { Err(anyhow::anyhow!("listener closed")) });
    let err = endpoint_stopped(failed).await;
    assert!(format!("{:#}", err).contains("listener closed"));

    let panicked: JoinHandle<anyhow::Result<()>> = tokio::spawn(async { panic!("handler bug") });
    let err = endpoint_stopped(panicked).await;
    assert!(err.to_string().contains("panicked"));

    let finished: JoinHandle<anyhow::Result<()>> = tokio::spawn(async { Ok(()) });
    let err = endpoint_stopped(finished).await;
    assert!(err.to_string().contains("stopped serving"));
}
