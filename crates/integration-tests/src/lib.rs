//! Integration tests for the Shopfront client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! Each test starts an in-process `axum` backend on `127.0.0.1:0` that
//! speaks the store service's JSON contract, then drives a real
//! `HttpApi` + `Storefront` against it. No external services are needed.
//!
//! # Test Categories
//!
//! - `checkout_flow` - browse, cart, login and checkout end to end
//! - `auth_flow` - login and registration against the auth endpoints
