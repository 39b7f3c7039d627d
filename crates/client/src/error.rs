//! Unified error handling with Sentry integration.
//!
//! Every operation of the engine handles its errors at its own boundary:
//! the error is logged, reported to Sentry when it points at infrastructure,
//! and turned into a user-visible [`Notice`]. Nothing propagates to a global
//! handler and nothing is retried.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::CartError;
use crate::notice::Notice;
use crate::store::StoreError;

/// Application-level error taxonomy.
#[derive(Debug, Error)]
pub enum AppError {
    /// The remote service could not be reached.
    #[error("Transport error: {0}")]
    Transport(#[source] ApiError),

    /// The remote service answered with an error or an unrecognised body.
    #[error("Remote error: {0}")]
    Remote(#[source] ApiError),

    /// An operation that needs a session was attempted without one.
    #[error("Authentication required")]
    AuthRequired,

    /// Checkout was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A persisted slot held data that could not be parsed.
    ///
    /// Never surfaced to the user: readers substitute defaults and log it.
    #[error("Corrupt persisted state in slot '{slot}': {reason}")]
    CorruptPersistedState { slot: &'static str, reason: String },

    /// Navigation to a section that does not exist.
    #[error("Unknown section: {0}")]
    UnknownSection(String),

    /// A persisted slot could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// A cart mutation was refused or could not be persisted.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// User input failed validation before any remote call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// "Add to cart" with no product on display.
    #[error("No product selected")]
    NoProductSelected,
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        if err.is_transport() {
            Self::Transport(err)
        } else {
            Self::Remote(err)
        }
    }
}

impl AppError {
    /// Text shown to the user for this error.
    ///
    /// Infrastructure details stay in the logs.
    #[must_use]
    pub fn notice_message(&self) -> String {
        match self {
            Self::Transport(_) => "Could not reach the store, please try again".to_string(),
            Self::Remote(err) => err.user_message(),
            Self::AuthRequired => "Please login first".to_string(),
            Self::EmptyCart => "Cart is empty!".to_string(),
            Self::Cart(CartError::TotalOverflow) => "Cart total is too large".to_string(),
            Self::Storage(_)
            | Self::Cart(CartError::Encode(_) | CartError::Storage(_))
            | Self::CorruptPersistedState { .. } => "Could not save your changes".to_string(),
            Self::UnknownSection(id) => format!("Unknown page: {id}"),
            Self::InvalidInput(msg) => msg.clone(),
            Self::NoProductSelected => "Select a product first".to_string(),
        }
    }

    /// Log the error and build the notice to surface.
    ///
    /// Transport and storage failures are also captured to Sentry.
    #[must_use]
    pub fn report(&self, operation: &str) -> Notice {
        if matches!(
            self,
            Self::Transport(_)
                | Self::Storage(_)
                | Self::Cart(CartError::Encode(_) | CartError::Storage(_))
        ) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                operation,
                error = %self,
                sentry_event_id = %event_id,
                "Operation failed"
            );
        } else {
            tracing::warn!(operation, error = %self, "Operation failed");
        }
        Notice::error(self.notice_message())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "65f1c0")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
