//! src/routes/signups/post.rs

use crate::session_state::TypedSession;
use crate::signup::{IgnoreReason, SignupController, SignupService, SubmitOutcome};
use crate::startup::ApplicationPathPrefix;
use crate::utils::{e500, prefixed, see_other};
use actix_web::{web, HttpResponse};
use actix_web_flash_messages::FlashMessage;

/// Missing fields count as empty, they are silently ignored like any other
/// incomplete form.
#[derive(serde::Deserialize, serde::Serialize)]
pub struct SignupFormData {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub email: String,
}

#[tracing::instrument(
    name = "Adding a new signup.",
    skip(form, service, session, path_prefix),
    fields(
        signup_email = %form.email,
        signup_first_name = %form.first_name
    )
)]
pub async fn signup(
    form: web::Form<SignupFormData>,
    service: web::Data<SignupService>,
    session: TypedSession,
    path_prefix: web::Data<ApplicationPathPrefix>,
) -> Result<HttpResponse, actix_web::Error> {
    let view = session.get_signup_view().map_err(e500)?.unwrap_or_default();
    let mut controller = SignupController::from_view(view);
    let SignupFormData { first_name, email } = form.0;
    controller.set_first_name(first_name);
    controller.set_email(email);

    match controller.submit(&service).await {
        SubmitOutcome::Submitted => tracing::info!("New signup added to the waitlist."),
        SubmitOutcome::Failed { .. } => tracing::info!("Signup was refused by the store."),
        SubmitOutcome::Ignored(IgnoreReason::InFlight) => {
            FlashMessage::info("Hang tight, your signup is already on its way.").send()
        }
        SubmitOutcome::Ignored(reason) => tracing::debug!("Signup ignored: {:?}", reason),
    }

    // The error is shown once through the flash, the session keeps the fields.
    let mut view = controller.into_view();
    if let Some(message) = view.take_error() {
        FlashMessage::error(message).send();
    }
    session.insert_signup_view(view).map_err(e500)?;
    Ok(see_other(&prefixed(&path_prefix.0, "/")))
}
