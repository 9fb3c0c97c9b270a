//! src/routes/health_check.rs

use crate::signup::{BootstrapStatus, SignupService};
use actix_web::{web, HttpResponse};

#[derive(serde::Serialize)]
struct HealthReport {
    store: &'static str,
}

/// Healthy once the remote store is ready to take signups.
pub async fn health_check(service: web::Data<SignupService>) -> HttpResponse {
    match service.bootstrap().status() {
        BootstrapStatus::Ready => HttpResponse::Ok().json(HealthReport { store: "ready" }),
        BootstrapStatus::Loading => {
            HttpResponse::ServiceUnavailable().json(HealthReport { store: "loading" })
        }
        BootstrapStatus::Failed(_) => {
            HttpResponse::ServiceUnavailable().json(HealthReport { store: "failed" })
        }
    }
}
