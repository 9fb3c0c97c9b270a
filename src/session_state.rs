//! src/session_state.rs

use crate::error::{error_chain_fmt, Error, WaitlistResult};
use crate::signup::SignupView;
use actix_session::{Session, SessionExt};
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use std::future::{ready, Ready};

#[derive(thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    SessionInsertError(#[from] actix_session::SessionInsertError),
    #[error(transparent)]
    SessionGetError(#[from] actix_session::SessionGetError),
}

impl std::fmt::Debug for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// The visitor's session, holding the state of their signup form.
pub struct TypedSession(Session);

impl TypedSession {
    const SIGNUP_KEY: &'static str = "signup";

    pub fn insert_signup_view(&self, view: SignupView) -> WaitlistResult<()> {
        self.0
            .insert(Self::SIGNUP_KEY, view)
            .map_err(SessionError::from)
            .map_err(Error::from)
    }

    pub fn get_signup_view(&self) -> WaitlistResult<Option<SignupView>> {
        self.0
            .get(Self::SIGNUP_KEY)
            .map_err(SessionError::from)
            .map_err(Error::from)
    }
}

impl FromRequest for TypedSession {
    // Same error as the `FromRequest` implementation of `Session`.
    type Error = <Session as FromRequest>::Error;
    // Nothing to await here, the session is already attached to the request.
    type Future = Ready<Result<TypedSession, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(TypedSession(req.get_session())))
    }
}
