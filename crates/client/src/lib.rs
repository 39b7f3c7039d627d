//! Shopfront client library.
//!
//! The session/cart/navigation state engine behind the storefront page:
//! a persistent cart, an auth token lifecycle, a single-active-view router
//! and the checkout protocol that reconciles the cart with the order service.
//!
//! Rendering is not done here. The engine exposes view models
//! ([`cart::CartView`], [`router::Section`]) and a queue of
//! [`notice::Notice`]s for whatever presentation layer sits on top.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod app;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod notice;
pub mod router;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use app::Storefront;
pub use error::{AppError, Result};
