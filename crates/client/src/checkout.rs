//! Checkout Orchestrator.
//!
//! One attempt walks the state machine
//!
//! ```text
//! Idle -> AuthCheck -> Submitting -> Succeeded
//!             |            |
//!             +------------+-------> Failed
//! ```
//!
//! `Succeeded` and `Failed` are terminal for the attempt; the next call to
//! [`Storefront::checkout`] starts again from `Idle`. At most one order call
//! is made per attempt and none is ever retried.

use std::fmt;

use secrecy::SecretString;
use tracing::{debug, info, instrument};

use crate::api::{Order, OrderLine, StoreApi};
use crate::app::Storefront;
use crate::cart::Cart;
use crate::error::{AppError, add_breadcrumb};
use crate::notice::Notice;
use crate::router::Section;

/// States of a single checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    Idle,
    AuthCheck,
    Submitting,
    Succeeded,
    Failed,
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AuthCheck => "auth_check",
            Self::Submitting => "submitting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Why an attempt ended in [`CheckoutState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutFailure {
    /// No session; the login section is shown.
    NotAuthenticated,
    /// Nothing to order; no remote call was made.
    EmptyCart,
    /// The order call failed at the transport level.
    Transport(String),
    /// The order service refused the order or answered unrecognisably.
    Remote(String),
}

/// Result of one checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    pub state: CheckoutState,
    pub failure: Option<CheckoutFailure>,
    /// Confirmation message from the order service.
    pub confirmation: Option<String>,
    /// False when the order was placed but the persisted cart still holds it.
    pub cart_cleared: bool,
}

impl CheckoutOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.state, CheckoutState::Succeeded)
    }
}

impl From<&Cart> for Order {
    fn from(cart: &Cart) -> Self {
        Self {
            products: cart
                .items()
                .iter()
                .map(|item| OrderLine {
                    product: item.product_ref().to_string(),
                    quantity: item.quantity.get(),
                })
                .collect(),
            total: cart.total().amount(),
        }
    }
}

/// Tracks the state of one attempt and traces each transition.
struct Attempt {
    state: CheckoutState,
}

impl Attempt {
    const fn new() -> Self {
        Self {
            state: CheckoutState::Idle,
        }
    }

    fn advance(&mut self, next: CheckoutState) {
        debug!(from = %self.state, to = %next, "Checkout transition");
        self.state = next;
    }

    fn fail(mut self, failure: CheckoutFailure) -> CheckoutOutcome {
        self.advance(CheckoutState::Failed);
        CheckoutOutcome {
            state: self.state,
            failure: Some(failure),
            confirmation: None,
            cart_cleared: false,
        }
    }

    fn succeed(mut self, confirmation: String, cart_cleared: bool) -> CheckoutOutcome {
        self.advance(CheckoutState::Succeeded);
        CheckoutOutcome {
            state: self.state,
            failure: None,
            confirmation: Some(confirmation),
            cart_cleared,
        }
    }
}

impl<A: StoreApi> Storefront<A> {
    /// Submit the cart as an order.
    ///
    /// - No session: shows the login section, cart untouched.
    /// - Empty cart: nothing is sent.
    /// - Order accepted: cart cleared, home shown, then success notice. If
    ///   the cart cannot be cleared the attempt still succeeds, with
    ///   `cart_cleared` false and an error notice after the success notice.
    /// - Order rejected or unreachable: failure notice, cart and session kept.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> CheckoutOutcome {
        let mut attempt = Attempt::new();
        add_breadcrumb("checkout", "Checkout requested", None);

        attempt.advance(CheckoutState::AuthCheck);
        let Some(token) = self.session().get_token() else {
            self.notify(AppError::AuthRequired.report("checkout"));
            self.router().show(Section::Login);
            return attempt.fail(CheckoutFailure::NotAuthenticated);
        };

        let cart = self.cart().load();
        if cart.is_empty() {
            self.notify(AppError::EmptyCart.report("checkout"));
            return attempt.fail(CheckoutFailure::EmptyCart);
        }

        attempt.advance(CheckoutState::Submitting);
        let order = Order::from(&cart);
        match self.submit(&token, &order).await {
            Ok(confirmation) => {
                let cleared = self.cart().clear().map_err(AppError::from);
                self.router().show(Section::Home);
                self.notify(Notice::info("Order placed successfully!"));
                info!(lines = order.products.len(), total = %order.total, "Order placed");

                let cart_cleared = match cleared {
                    Ok(()) => true,
                    Err(e) => {
                        // Logged and captured; the user gets a specific notice.
                        let _ = e.report("checkout");
                        self.notify(Notice::error(
                            "Order placed, but the cart could not be emptied",
                        ));
                        false
                    }
                };
                attempt.succeed(confirmation, cart_cleared)
            }
            Err(e) => {
                let reason = e.report("checkout").message;
                self.notify(Notice::error(format!("Error placing order: {reason}")));
                let failure = match e {
                    AppError::Transport(_) => CheckoutFailure::Transport(reason),
                    _ => CheckoutFailure::Remote(reason),
                };
                attempt.fail(failure)
            }
        }
    }

    async fn submit(&self, token: &SecretString, order: &Order) -> Result<String, AppError> {
        Ok(self.api().create_order(token, order).await?)
    }
}
