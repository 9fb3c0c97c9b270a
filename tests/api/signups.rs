//! tests/api/signups.rs

use crate::helpers::{
    ada, assert_is_redirect_to, spawn_app, spawn_app_with, spawn_app_with_rest_store,
    PIXEL_ID, REQUESTS_PER_SIGNUP,
};
use sqlx::{Executor, Row};
use waitlist::routes::SignupFormData;
use waitlist::signup::{DUPLICATE_SIGNUP_MESSAGE, GENERIC_FAILURE_MESSAGE};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn signup_persists_the_record_and_shows_the_success_panel() {
    // Arrange
    let app = spawn_app().await;
    app.wait_for_store().await;
    app.mount_analytics(1).await;

    // Act - Part 1 - Submit the form
    let response = app.post_signups(&ada()).await;
    assert_is_redirect_to(&response, "/");

    // Act - Part 2 - Follow the redirect
    let section = app.get_signup_section().await;

    // Assert
    assert!(section.submitted);
    assert!(!section.has_form);
    assert!(section.errors.is_empty());

    let saved = sqlx::query("SELECT first_name, email FROM signups")
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to fetch saved signup.");
    assert_eq!(saved.get::<String, _>("first_name"), "Ada");
    assert_eq!(saved.get::<String, _>("email"), "ada@example.com");
    let requests = app.wait_for_analytics(REQUESTS_PER_SIGNUP).await;
    let conversion = requests
        .iter()
        .find(|r| r.url.path() == format!("/{}/events", PIXEL_ID))
        .expect("No conversion was sent.");
    let body: serde_json::Value = serde_json::from_slice(&conversion.body).unwrap();
    let hashed = body["data"][0]["user_data"]["em"][0].as_str().unwrap();
    assert_eq!(hashed.len(), 64);
    assert!(!body.to_string().contains("ada@example.com"));
    // Mock asserts on drop
}

#[tokio::test]
async fn signup_stores_the_values_as_typed() {
    // Arrange
    let app = spawn_app().await;
    app.wait_for_store().await;
    app.mount_analytics(1).await;

    // Act
    app.post_signups(&SignupFormData {
        first_name: " Ada ".into(),
        email: "ada@example.com".into(),
    })
    .await;

    // Assert
    let saved = sqlx::query("SELECT first_name FROM signups")
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to fetch saved signup.");
    assert_eq!(saved.get::<String, _>("first_name"), " Ada ");
    app.wait_for_analytics(REQUESTS_PER_SIGNUP).await;
}

#[tokio::test]
async fn invalid_signups_are_ignored_silently() {
    // Arrange
    let app = spawn_app().await;
    app.wait_for_store().await;
    app.mount_analytics(0).await;
    let test_cases = vec![
        ("first_name=Ada", "missing the email"),
        ("email=ada%40example.com", "missing the first name"),
        ("first_name=&email=ada%40example.com", "empty first name"),
        ("first_name=Ada&email=", "empty email"),
        ("first_name=Ada&email=ada.example.com", "email without @"),
        ("", "missing both first name and email"),
    ];

    for (body, description) in test_cases {
        // Act
        let response = app.post_signups_raw(body).await;
        let section = app.get_signup_section().await;

        // Assert
        assert_is_redirect_to(&response, "/");
        assert!(
            section.has_form,
            "The form disappeared when the payload was {}.",
            description
        );
        assert!(
            section.errors.is_empty(),
            "An error was shown when the payload was {}.",
            description
        );
    }
    assert_eq!(app.signup_count().await, 0);
}

#[tokio::test]
async fn invalid_signups_keep_what_the_visitor_typed() {
    // Arrange
    let app = spawn_app().await;
    app.wait_for_store().await;

    // Act
    app.post_signups_raw("first_name=Ada&email=ada.example.com")
        .await;
    let section = app.get_signup_section().await;

    // Assert
    assert_eq!(section.first_name.as_deref(), Some("Ada"));
    assert_eq!(section.email.as_deref(), Some("ada.example.com"));
}

#[tokio::test]
async fn a_duplicate_email_shows_the_friendly_message() {
    // Arrange
    let app = spawn_app().await;
    app.wait_for_store().await;
    app.mount_analytics(1).await;
    app.post_signups(&ada()).await;
    let other_visitor = app.new_visitor();

    // Act
    let response = app.post_signups_as(&other_visitor, &ada()).await;
    let section = app.get_signup_section_as(&other_visitor).await;

    // Assert
    assert_is_redirect_to(&response, "/");
    assert!(section.has_form);
    assert!(!section.submitted);
    assert_eq!(section.errors, vec![DUPLICATE_SIGNUP_MESSAGE.to_string()]);
    assert_eq!(section.email.as_deref(), Some("ada@example.com"));
    assert_eq!(app.signup_count().await, 1);
    app.wait_for_analytics(REQUESTS_PER_SIGNUP).await;
}

#[tokio::test]
async fn a_store_error_is_shown_with_its_raw_message() {
    // Arrange
    let app = spawn_app().await;
    app.wait_for_store().await;
    app.mount_analytics(0).await;
    // Sabotage the database
    app.db_pool
        .execute("ALTER TABLE signups DROP COLUMN email;")
        .await
        .unwrap();

    // Act
    let response = app.post_signups(&ada()).await;
    let section = app.get_signup_section().await;

    // Assert
    assert_is_redirect_to(&response, "/");
    assert!(section.has_form);
    assert_eq!(section.errors.len(), 1);
    let error = &section.errors[0];
    assert!(error.starts_with(GENERIC_FAILURE_MESSAGE), "{}", error);
    assert!(error.contains("email"), "{}", error);
}

#[tokio::test]
async fn the_error_is_shown_only_once() {
    // Arrange
    let app = spawn_app().await;
    app.wait_for_store().await;
    app.db_pool
        .execute("ALTER TABLE signups DROP COLUMN email;")
        .await
        .unwrap();

    // Act - Part 1 - Fail a signup
    app.post_signups(&ada()).await;
    let first = app.get_signup_section().await;

    // Act - Part 2 - Reload the page
    let second = app.get_signup_section().await;

    // Assert
    assert_eq!(first.errors.len(), 1);
    assert!(second.errors.is_empty());
    assert!(second.has_form);
}

#[tokio::test]
async fn failures_are_reported_when_enabled() {
    // Arrange
    let app = spawn_app_with(|c| c.analytics.report_failures = true).await;
    app.wait_for_store().await;
    app.db_pool
        .execute("ALTER TABLE signups DROP COLUMN email;")
        .await
        .unwrap();
    Mock::given(path("/mp/collect"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.analytics_server)
        .await;

    // Act
    app.post_signups(&ada()).await;

    // Assert
    let requests = app.wait_for_analytics(1).await;
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["events"][0]["name"], "form_supabase_fail");
    assert_eq!(body["events"][0]["params"]["event_category"], "Error");
    assert_eq!(body["events"][0]["params"]["value"], 0);
}

#[tokio::test]
async fn a_submitted_visitor_cannot_sign_up_again() {
    // Arrange
    let app = spawn_app().await;
    app.wait_for_store().await;
    app.mount_analytics(1).await;
    app.post_signups(&ada()).await;

    // Act
    let response = app
        .post_signups(&SignupFormData {
            first_name: "Grace".into(),
            email: "grace@example.com".into(),
        })
        .await;
    let section = app.get_signup_section().await;

    // Assert
    assert_is_redirect_to(&response, "/");
    assert!(section.submitted);
    assert!(section.errors.is_empty());
    assert_eq!(app.signup_count().await, 1);
    app.wait_for_analytics(REQUESTS_PER_SIGNUP).await;
}

#[tokio::test]
async fn a_visitor_can_retry_after_a_failure() {
    // Arrange
    let app = spawn_app().await;
    app.wait_for_store().await;
    app.mount_analytics(2).await;
    app.post_signups(&ada()).await;
    let other_visitor = app.new_visitor();
    app.post_signups_as(&other_visitor, &ada()).await;

    // Act
    app.post_signups_as(
        &other_visitor,
        &SignupFormData {
            first_name: "Ada".into(),
            email: "ada.lovelace@example.com".into(),
        },
    )
    .await;
    let section = app.get_signup_section_as(&other_visitor).await;

    // Assert
    assert!(section.submitted);
    assert_eq!(app.signup_count().await, 2);
    app.wait_for_analytics(2 * REQUESTS_PER_SIGNUP).await;
}

#[tokio::test]
async fn signup_is_sent_to_the_rest_row_store() {
    // Arrange
    let app = spawn_app_with_rest_store(true).await;
    assert_eq!(app.wait_for_store().await, "ready");
    app.mount_analytics(1).await;
    Mock::given(path("/rest/v1/signups"))
        .and(method("POST"))
        .and(header("apikey", "anon-key"))
        .and(header("Prefer", "return=minimal"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&app.store_server)
        .await;

    // Act
    let response = app.post_signups(&ada()).await;
    let section = app.get_signup_section().await;

    // Assert
    assert_is_redirect_to(&response, "/");
    assert!(section.submitted);
    let inserts: Vec<_> = app
        .store_server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/rest/v1/signups")
        .collect();
    let body: serde_json::Value = serde_json::from_slice(&inserts[0].body).unwrap();
    assert_eq!(
        body,
        serde_json::json!([{ "first_name": "Ada", "email": "ada@example.com" }])
    );
    app.wait_for_analytics(REQUESTS_PER_SIGNUP).await;
}

#[tokio::test]
async fn a_failed_bootstrap_turns_every_signup_into_an_error() {
    // Arrange
    let app = spawn_app_with_rest_store(false).await;
    assert_eq!(app.wait_for_store().await, "failed");
    app.mount_analytics(0).await;

    // Act
    let response = app.post_signups(&ada()).await;
    let section = app.get_signup_section().await;

    // Assert
    assert_is_redirect_to(&response, "/");
    assert!(section.has_form);
    assert_eq!(section.errors.len(), 1);
    assert!(section.errors[0].starts_with(GENERIC_FAILURE_MESSAGE));
}

#[tokio::test]
async fn signups_work_under_the_path_prefix() {
    // Arrange
    let app = spawn_app_with(|c| c.application.path_prefix = "/acquiredtaste".into()).await;
    app.wait_for_store().await;
    app.mount_analytics(1).await;

    // Act
    let response = app.post_signups(&ada()).await;
    let section = app.get_signup_section().await;

    // Assert
    assert_is_redirect_to(&response, "/acquiredtaste/");
    assert!(section.submitted);
    assert_eq!(app.signup_count().await, 1);
    app.wait_for_analytics(REQUESTS_PER_SIGNUP).await;
}
