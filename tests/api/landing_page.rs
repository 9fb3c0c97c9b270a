//! tests/api/landing_page.rs

use crate::helpers::{spawn_app, spawn_app_with};
use scraper::{Html, Selector};

#[tokio::test]
async fn landing_page_renders_all_sections() {
    // Arrange
    let app = spawn_app().await;
    app.wait_for_store().await;

    // Act
    let response = app.get_home().await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let html = response.text().await.unwrap();
    let document = Html::parse_document(&html);
    let count = |s: &str| document.select(&Selector::parse(s).unwrap()).count();
    assert_eq!(count("#hero h1"), 1);
    assert_eq!(count("#gallery img"), 4);
    assert_eq!(count("#value .card"), 3);
    assert_eq!(count("#closing a.cta"), 1);
    assert!(html.contains("ACQUIRED TASTE"));
}

#[tokio::test]
async fn a_new_visitor_sees_an_empty_enabled_form() {
    // Arrange
    let app = spawn_app().await;
    app.wait_for_store().await;

    // Act
    let section = app.get_signup_section().await;

    // Assert
    assert!(section.has_form);
    assert!(!section.submitted);
    assert!(!section.submit_disabled);
    assert_eq!(section.form_action.as_deref(), Some("/signups"));
    assert_eq!(section.first_name.as_deref(), Some(""));
    assert_eq!(section.email.as_deref(), Some(""));
    assert!(section.errors.is_empty());
}

#[tokio::test]
async fn gallery_images_are_served_from_the_assets_url() {
    // Arrange
    let app = spawn_app_with(|c| c.application.assets_url = "https://cdn.example.com/".into()).await;

    // Act
    let html = app.get_home_html().await;

    // Assert
    let document = Html::parse_document(&html);
    let selector = Selector::parse("#gallery img").unwrap();
    for image in document.select(&selector) {
        let src = image.value().attr("src").unwrap();
        assert!(src.starts_with("https://cdn.example.com/img/"), "{}", src);
        assert!(image.value().attr("alt").is_some());
    }
}

#[tokio::test]
async fn the_site_is_served_under_the_configured_path_prefix() {
    // Arrange
    let app = spawn_app_with(|c| c.application.path_prefix = "/acquiredtaste".into()).await;
    app.wait_for_store().await;

    // Act
    let section = app.get_signup_section().await;
    let outside = app
        .api_client
        .get(format!("{}/", app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert!(section.has_form);
    assert_eq!(section.form_action.as_deref(), Some("/acquiredtaste/signups"));
    assert_eq!(outside.status().as_u16(), 404);
}
