//! Remote catalog, auth and order service.
//!
//! # Architecture
//!
//! - [`StoreApi`] is the seam the engine talks through; tests substitute a
//!   recording fake.
//! - [`HttpApi`] is the real client: JSON over `reqwest`, product reads
//!   cached in memory via `moka`.
//!
//! # Endpoints
//!
//! - `GET  /products` and `GET /products/{id}`
//! - `POST /auth/login` and `POST /auth/register`
//! - `POST /orders` with a bearer token

mod cache;
mod client;
pub mod types;

pub use client::HttpApi;
pub use types::*;

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use shopfront_core::{Email, ProductId};

/// Errors that can occur when talking to the remote service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("status {status}: {}", message.as_deref().unwrap_or("(no message)"))]
    Remote {
        status: u16,
        message: Option<String>,
    },

    /// The service answered 2xx with a body we cannot interpret.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The configured base URL cannot carry request paths.
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// Whether the failure happened before a response was received.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::InvalidBaseUrl(_))
    }

    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            Self::Remote { status, .. } => format!("The store returned an error ({status})"),
            Self::Malformed(_) => "Unexpected response from the store".to_string(),
            Self::Transport(_) | Self::InvalidBaseUrl(_) => {
                "Could not reach the store".to_string()
            }
        }
    }
}

/// Operations offered by the remote service.
#[async_trait]
pub trait StoreApi: Send + Sync {
    /// Fetch the whole catalog.
    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;

    /// Fetch a single product.
    async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError>;

    /// Exchange credentials for a bearer token.
    async fn login(&self, email: &Email, password: &SecretString)
    -> Result<SecretString, ApiError>;

    /// Create an account. Returns the service's confirmation message.
    async fn register(
        &self,
        username: &str,
        email: &Email,
        password: &SecretString,
    ) -> Result<String, ApiError>;

    /// Submit an order. Returns the service's confirmation message.
    async fn create_order(&self, token: &SecretString, order: &Order) -> Result<String, ApiError>;
}
