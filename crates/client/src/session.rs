//! Session Store: the persisted bearer token.
//!
//! Absence of a token is a valid state, not an error. Callers that need a
//! session check [`SessionStore::get_token`] and react to `None` themselves.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{instrument, warn};

use crate::error::AppError;
use crate::store::{SlotStore, StoreError, keys};

/// Owner of the `token` slot.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn SlotStore>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self { store }
    }

    /// Read the persisted token.
    ///
    /// Empty values and unreadable slots count as "not logged in".
    #[must_use]
    pub fn get_token(&self) -> Option<SecretString> {
        match self.store.read(keys::TOKEN) {
            Ok(Some(raw)) if !raw.trim().is_empty() => Some(SecretString::from(raw.trim())),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Token slot unreadable, treating session as absent");
                None
            }
        }
    }

    /// Persist a token received from a successful login.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` for an empty token and
    /// `AppError::Storage` if the slot cannot be written.
    #[instrument(skip_all)]
    pub fn set_token(&self, token: &SecretString) -> Result<(), AppError> {
        let raw = token.expose_secret().trim();
        if raw.is_empty() {
            return Err(AppError::InvalidInput("empty session token".to_string()));
        }
        self.store.write(keys::TOKEN, raw)?;
        Ok(())
    }

    /// Forget the session.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the slot cannot be removed.
    #[instrument(skip_all)]
    pub fn clear_token(&self) -> Result<(), StoreError> {
        self.store.remove(keys::TOKEN)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.get_token().is_some()
    }
}
