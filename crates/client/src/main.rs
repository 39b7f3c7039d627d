//! Shopfront headless client.
//!
//! Boots the storefront engine against the configured store service and
//! reports what the page would show on load.
//!
//! # Architecture
//!
//! - `HttpApi` talks JSON to the store service
//! - `FileStore` keeps the `cart` and `token` slots under the data directory
//! - Sentry receives transport and storage failures when `SENTRY_DSN` is set

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopfront_client::Storefront;
use shopfront_client::api::HttpApi;
use shopfront_client::config::ShopfrontConfig;
use shopfront_client::notice::NoticeLevel;
use shopfront_client::store::FileStore;

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ShopfrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront_client=info,shopfront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let config = match ShopfrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let api = match HttpApi::new(&config.api) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build API client");
            std::process::exit(1);
        }
    };
    tracing::info!(base_url = %api.base_url(), "API client ready");

    let store = FileStore::new(&config.data_dir);
    tracing::info!(data_dir = %store.dir().display(), "Using slot directory");

    let app = Storefront::new(api, Arc::new(store));
    let cart = app.boot().await;

    for notice in app.take_notices() {
        match notice.level {
            NoticeLevel::Info => tracing::info!(message = %notice.message, "Notice"),
            NoticeLevel::Error => tracing::warn!(message = %notice.message, "Notice"),
        }
    }

    for product in app.products() {
        tracing::info!(id = %product.id, name = %product.name, price = %product.price, "Product");
    }

    tracing::info!(
        section = %app.active_section(),
        cart_items = cart.item_count,
        cart_total = %cart.total,
        "Page ready"
    );
}
