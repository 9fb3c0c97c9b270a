//! src/routes/home/mod.rs

use crate::session_state::TypedSession;
use crate::signup::{SignupController, SignupService};
use crate::startup::{ApplicationAssetsUrl, ApplicationPathPrefix};
use crate::utils::{e500, prefixed};
use actix_web::{web, Responder};
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use askama_actix::Template;
use chrono::{Datelike, Utc};

struct GalleryImage {
    src: String,
    alt: &'static str,
}

const GALLERY: [(&str, &str); 4] = [
    ("img/hero-palau.png", "Palau Island Food Discovery"),
    ("img/screen-passport.png", "Digital passport with country stamps"),
    ("img/screen-carousel.png", "Cultural carousel of upcoming holidays"),
    ("img/screen-journal.png", "Food journal entry with a memory"),
];

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    signup_action: String,
    first_name: String,
    email: String,
    submitted: bool,
    submit_enabled: bool,
    error_messages: Vec<String>,
    info_messages: Vec<String>,
    gallery: Vec<GalleryImage>,
    year: i32,
}

pub async fn home(
    flash_messages: IncomingFlashMessages,
    session: TypedSession,
    service: web::Data<SignupService>,
    path_prefix: web::Data<ApplicationPathPrefix>,
    assets_url: web::Data<ApplicationAssetsUrl>,
) -> Result<impl Responder, actix_web::Error> {
    let view = session.get_signup_view().map_err(e500)?.unwrap_or_default();
    let controller = SignupController::from_view(view);
    let submit_enabled = controller.is_submit_enabled(&service.bootstrap().status());

    let mut error_messages = vec![];
    let mut info_messages = vec![];
    for m in flash_messages.iter() {
        match m.level() {
            Level::Error | Level::Warning => error_messages.push(m.content().to_string()),
            _ => info_messages.push(m.content().to_string()),
        }
    }

    let gallery = GALLERY
        .iter()
        .map(|&(path, alt)| GalleryImage {
            src: format!("{}/{}", assets_url.0.trim_end_matches('/'), path),
            alt,
        })
        .collect();

    let view = controller.into_view();
    Ok(HomeTemplate {
        signup_action: prefixed(&path_prefix.0, "/signups"),
        submitted: view.is_submitted(),
        first_name: view.first_name,
        email: view.email,
        submit_enabled,
        error_messages,
        info_messages,
        gallery,
        year: Utc::now().year(),
    })
}
