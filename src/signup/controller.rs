//! src/signup/controller.rs

use crate::analytics::AnalyticsDispatcher;
use crate::domain::{SignupRecord, ValidationError};
use crate::signup::{BootstrapStatus, SignupService};
use crate::store::StoreError;

pub const DUPLICATE_SIGNUP_MESSAGE: &str = "You're already on the waitlist! We'll be in touch soon 🍽️";
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Your culinary compass lost its signal! Please try again.";

/// Message shown to the visitor for a failed insert.
pub fn user_message(error: &StoreError) -> String {
    if error.is_duplicate_key() {
        DUPLICATE_SIGNUP_MESSAGE.to_string()
    } else {
        format!("{} ({})", GENERIC_FAILURE_MESSAGE, error.message)
    }
}

/// Where a visitor's signup currently stands.
///
/// `Idle -> Submitting -> Submitted` on success,
/// `Idle -> Submitting -> Idle { error }` on failure.
/// `Submitted` is final.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SignupState {
    Idle { error: Option<String> },
    Submitting,
    Submitted,
}

impl Default for SignupState {
    fn default() -> Self {
        Self::Idle { error: None }
    }
}

/// Snapshot of a controller, small enough to keep in the visitor's session.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupView {
    pub first_name: String,
    pub email: String,
    pub state: SignupState,
}

impl SignupView {
    pub fn is_submitted(&self) -> bool {
        self.state == SignupState::Submitted
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SignupState::Idle { error } => error.as_deref(),
            _ => None,
        }
    }

    /// Hand out the pending error once, leaving a clean `Idle`.
    pub fn take_error(&mut self) -> Option<String> {
        match &mut self.state {
            SignupState::Idle { error } => error.take(),
            _ => None,
        }
    }
}

/// Why a submit did not reach the store.
#[derive(Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    Invalid(ValidationError),
    InFlight,
    AlreadySubmitted,
    NotReady,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Ignored(IgnoreReason),
    Submitted,
    Failed { message: String },
}

/// Immutable record handed out by [`SignupController::begin_submit`].
#[derive(Debug)]
pub struct Submission {
    record: SignupRecord,
}

impl Submission {
    pub fn record(&self) -> &SignupRecord {
        &self.record
    }
}

/// Drives one visitor's signup form.
#[derive(Debug, Default)]
pub struct SignupController {
    view: SignupView,
}

impl SignupController {
    pub fn new() -> Self {
        Self::default()
    }

    /// A persisted `Submitting` belongs to a request that never finished,
    /// it is restored as `Idle` so the form can be used again.
    pub fn from_view(mut view: SignupView) -> Self {
        if view.state == SignupState::Submitting {
            view.state = SignupState::default();
        }
        Self { view }
    }

    pub fn view(&self) -> &SignupView {
        &self.view
    }

    pub fn into_view(self) -> SignupView {
        self.view
    }

    pub fn state(&self) -> &SignupState {
        &self.view.state
    }

    pub fn set_first_name(&mut self, first_name: String) {
        if !self.view.is_submitted() {
            self.view.first_name = first_name;
        }
    }

    pub fn set_email(&mut self, email: String) {
        if !self.view.is_submitted() {
            self.view.email = email;
        }
    }

    pub fn is_submit_enabled(&self, bootstrap: &BootstrapStatus) -> bool {
        matches!(self.view.state, SignupState::Idle { .. }) && *bootstrap != BootstrapStatus::Loading
    }

    /// Validate the form and move to `Submitting`.
    ///
    /// Invalid input is refused without touching the state, so no error is
    /// shown for it.
    pub fn begin_submit(&mut self) -> Result<Submission, IgnoreReason> {
        match self.view.state {
            SignupState::Submitted => return Err(IgnoreReason::AlreadySubmitted),
            SignupState::Submitting => return Err(IgnoreReason::InFlight),
            SignupState::Idle { .. } => {}
        }
        let record = SignupRecord::parse(self.view.first_name.clone(), self.view.email.clone())
            .map_err(IgnoreReason::Invalid)?;
        self.view.state = SignupState::Submitting;
        Ok(Submission { record })
    }

    /// Return to `Idle` without an insert having been made.
    fn abort_submit(&mut self, _submission: Submission) {
        self.view.state = SignupState::default();
    }

    /// Apply the result of the insert made for `submission`.
    ///
    /// Analytics are dispatched in the background and never delay the outcome.
    pub fn finish_submit(
        &mut self,
        submission: Submission,
        result: Result<(), StoreError>,
        analytics: &AnalyticsDispatcher,
    ) -> SubmitOutcome {
        match result {
            Ok(()) => {
                analytics.spawn_signup_succeeded(&submission.record);
                self.view = SignupView {
                    first_name: String::new(),
                    email: String::new(),
                    state: SignupState::Submitted,
                };
                SubmitOutcome::Submitted
            }
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Signup error"
                );
                analytics.spawn_signup_failed(&e);
                let message = user_message(&e);
                self.view.state = SignupState::Idle {
                    error: Some(message.clone()),
                };
                SubmitOutcome::Failed { message }
            }
        }
    }

    /// Run the whole signup workflow against the shared collaborators.
    #[tracing::instrument(
        name = "Submitting a signup",
        skip(self, service),
        fields(
            signup_email = %self.view.email,
            signup_first_name = %self.view.first_name
        )
    )]
    pub async fn submit(&mut self, service: &SignupService) -> SubmitOutcome {
        let bootstrap = service.bootstrap().status();
        if bootstrap == BootstrapStatus::Loading {
            return SubmitOutcome::Ignored(IgnoreReason::NotReady);
        }
        let submission = match self.begin_submit() {
            Ok(submission) => submission,
            Err(reason) => {
                tracing::debug!("Signup ignored: {:?}", reason);
                return SubmitOutcome::Ignored(reason);
            }
        };
        if let BootstrapStatus::Failed(message) = bootstrap {
            return self.finish_submit(
                submission,
                Err(StoreError::new(message)),
                service.analytics(),
            );
        }
        let result = {
            let _guard = match service.in_flight().try_acquire(submission.record().email()) {
                Some(guard) => guard,
                None => {
                    self.abort_submit(submission);
                    return SubmitOutcome::Ignored(IgnoreReason::InFlight);
                }
            };
            service
                .store()
                .insert(service.table(), submission.record())
                .await
        };
        self.finish_submit(submission, result, service.analytics())
    }
}
