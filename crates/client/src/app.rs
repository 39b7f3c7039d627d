//! The storefront engine: every component wired together.
//!
//! Control flow is single-threaded and event driven. Each user action runs to
//! completion except at network calls, where it suspends. Nothing serializes
//! overlapping actions: two concurrent "add to cart" calls each do their own
//! read-modify-write of the cart slot and the last write wins.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::api::StoreApi;
use crate::cart::{Cart, CartStore, CartView};
use crate::catalog::Catalog;
use crate::error::{AppError, add_breadcrumb};
use crate::notice::{Notice, Notices};
use crate::router::{Section, ViewRouter};
use crate::session::SessionStore;
use crate::store::SlotStore;

/// Storefront engine shared across event handlers.
///
/// This struct is cheaply cloneable via `Arc`; clones observe the same
/// router, catalog, notice queue and persisted slots.
pub struct Storefront<A> {
    inner: Arc<StorefrontInner<A>>,
}

impl<A> Clone for Storefront<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct StorefrontInner<A> {
    api: A,
    session: SessionStore,
    cart: CartStore,
    router: ViewRouter,
    catalog: Catalog,
    notices: Notices,
}

impl<A: StoreApi> Storefront<A> {
    /// Create an engine over a remote API and a slot store.
    ///
    /// The router starts on [`Section::Home`]; the cart and session are
    /// whatever the store already holds.
    #[must_use]
    pub fn new(api: A, store: Arc<dyn SlotStore>) -> Self {
        Self {
            inner: Arc::new(StorefrontInner {
                api,
                session: SessionStore::new(Arc::clone(&store)),
                cart: CartStore::new(store),
                router: ViewRouter::new(),
                catalog: Catalog::default(),
                notices: Notices::default(),
            }),
        }
    }

    /// Page-load sequence: show home, fetch the catalog, read the cart.
    #[instrument(skip(self))]
    pub async fn boot(&self) -> CartView {
        self.inner.router.show(Section::Home);
        self.list_products().await;
        let view = self.cart_view();
        info!(
            products = self.products().len(),
            cart_items = view.item_count,
            authenticated = self.session().is_authenticated(),
            "Storefront ready"
        );
        view
    }

    /// Put one unit of the product on display into the cart.
    ///
    /// The product identifier shown on the details page is carried into the
    /// line item. On success the cart section is shown.
    #[instrument(skip(self))]
    pub fn add_to_cart(&self) -> Option<Cart> {
        let result = self
            .current_product()
            .ok_or(AppError::NoProductSelected)
            .and_then(|product| {
                add_breadcrumb(
                    "cart",
                    "Added item",
                    Some(&[("product_id", product.id.as_str())][..]),
                );
                self.inner
                    .cart
                    .add_item(product.id, &product.name, product.price)
                    .map_err(AppError::from)
            });

        match result {
            Ok(cart) => {
                self.notify(Notice::info("Added to cart!"));
                self.inner.router.show(Section::Cart);
                Some(cart)
            }
            Err(e) => {
                self.notify(e.report("add_to_cart"));
                None
            }
        }
    }

    /// Show the cart section and return what it displays.
    pub fn show_cart(&self) -> CartView {
        self.inner.router.show(Section::Cart);
        self.cart_view()
    }

    /// Empty the cart without ordering.
    #[instrument(skip(self))]
    pub fn clear_cart(&self) {
        if let Err(e) = self.inner.cart.clear() {
            self.notify(AppError::from(e).report("clear_cart"));
        }
    }

    /// Current cart contents as display data.
    #[must_use]
    pub fn cart_view(&self) -> CartView {
        CartView::from(&self.inner.cart.load())
    }

    /// Navigate by section identifier, e.g. from a link.
    ///
    /// Unknown identifiers are logged and surfaced; the view does not change.
    pub fn navigate(&self, section_id: &str) -> Option<Section> {
        match self.inner.router.activate(section_id) {
            Ok(section) => Some(section),
            Err(e) => {
                self.notify(e.report("navigate"));
                None
            }
        }
    }

    /// The section currently shown.
    #[must_use]
    pub fn active_section(&self) -> Section {
        self.inner.router.active()
    }

    #[must_use]
    pub fn router(&self) -> &ViewRouter {
        &self.inner.router
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.inner.api
    }

    /// Take all pending notices, oldest first.
    pub fn take_notices(&self) -> Vec<Notice> {
        self.inner.notices.drain()
    }

    pub(crate) fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    pub(crate) fn notify(&self, notice: Notice) {
        self.inner.notices.push(notice);
    }
}
