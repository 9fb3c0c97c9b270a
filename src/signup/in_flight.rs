//! src/signup/in_flight.rs

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Emails whose insert is currently on its way to the store.
///
/// Keys are the emails exactly as they are inserted, matching the
/// case-sensitive unique constraint of the `signups` table.
#[derive(Clone, Debug, Default)]
pub struct InFlightSubmissions {
    emails: Arc<Mutex<HashSet<String>>>,
}

/// Holds an email in [`InFlightSubmissions`] until dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    emails: Arc<Mutex<HashSet<String>>>,
    email: String,
}

impl InFlightSubmissions {
    /// `None` if a submission for the same email is already in flight.
    pub fn try_acquire(&self, email: &str) -> Option<InFlightGuard> {
        let email = email.to_string();
        let mut emails = self.emails.lock().unwrap_or_else(PoisonError::into_inner);
        if !emails.insert(email.clone()) {
            return None;
        }
        Some(InFlightGuard {
            emails: Arc::clone(&self.emails),
            email,
        })
    }

    pub fn is_in_flight(&self, email: &str) -> bool {
        self.emails
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(email)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.emails
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.email);
    }
}
