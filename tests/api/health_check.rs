//! tests/api/health_check.rs

use crate::helpers::{spawn_app, spawn_app_with_rest_store};

#[tokio::test]
async fn health_check_reports_a_ready_store() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let status = app.wait_for_store().await;
    let response = app.get_health_check().await;

    // Assert
    assert_eq!(status, "ready");
    assert!(response.status().is_success());
    let report: serde_json::Value = response.json().await.unwrap();
    assert_eq!(report, serde_json::json!({ "store": "ready" }));
}

#[tokio::test]
async fn health_check_reports_an_unreachable_store_as_failed() {
    // Arrange
    let app = spawn_app_with_rest_store(false).await;

    // Act
    let status = app.wait_for_store().await;
    let response = app.get_health_check().await;

    // Assert
    assert_eq!(status, "failed");
    assert_eq!(response.status().as_u16(), 503);
}
