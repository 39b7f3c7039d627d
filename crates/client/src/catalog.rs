//! Product browsing.
//!
//! Both operations make one read-only remote call. On failure the error is
//! logged and surfaced and the user stays on the current section.

use std::sync::{Mutex, PoisonError};

use tracing::{info, instrument};

use shopfront_core::ProductId;

use crate::api::{Product, StoreApi};
use crate::app::Storefront;
use crate::error::AppError;
use crate::router::Section;

/// Last catalog listing and the product on the details page.
#[derive(Debug, Default)]
pub(crate) struct Catalog {
    products: Mutex<Vec<Product>>,
    current: Mutex<Option<Product>>,
}

impl Catalog {
    fn set_products(&self, products: Vec<Product>) {
        *self.products.lock().unwrap_or_else(PoisonError::into_inner) = products;
    }

    fn set_current(&self, product: Product) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(product);
    }

    fn products(&self) -> Vec<Product> {
        self.products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn current(&self) -> Option<Product> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<A: StoreApi> Storefront<A> {
    /// Fetch the catalog and show it on the home section.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> bool {
        match self.api().list_products().await {
            Ok(products) => {
                info!(count = products.len(), "Catalog loaded");
                self.catalog().set_products(products);
                self.router().show(Section::Home);
                true
            }
            Err(e) => {
                self.notify(AppError::from(e).report("list_products"));
                false
            }
        }
    }

    /// Fetch one product and show its details.
    ///
    /// The product becomes the one "add to cart" refers to.
    #[instrument(skip(self))]
    pub async fn view_product(&self, id: &str) -> Option<Product> {
        let result = match ProductId::parse(id) {
            Ok(id) => self.api().get_product(&id).await.map_err(AppError::from),
            Err(e) => Err(AppError::InvalidInput(e.to_string())),
        };

        match result {
            Ok(product) => {
                self.catalog().set_current(product.clone());
                self.router().show(Section::ProductDetails);
                Some(product)
            }
            Err(e) => {
                self.notify(e.report("view_product"));
                None
            }
        }
    }

    /// Products from the last successful listing.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.catalog().products()
    }

    /// Product on the details page, if one has been viewed.
    #[must_use]
    pub fn current_product(&self) -> Option<Product> {
        self.catalog().current()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::{Call, FakeApi, product};

    fn app(api: FakeApi) -> Storefront<FakeApi> {
        Storefront::new(api, Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_list_products_stores_listing() {
        let app = app(FakeApi::with_products(vec![
            product("w1", "Widget", "9.99"),
            product("g1", "Gadget", "5"),
        ]));
        app.navigate("cart");

        assert!(app.list_products().await);
        assert_eq!(app.products().len(), 2);
        assert_eq!(app.active_section(), Section::Home);
        assert_eq!(app.api().calls(), vec![Call::ListProducts]);
    }

    #[tokio::test]
    async fn test_list_products_failure_keeps_view() {
        let app = app(FakeApi::default().failing_catalog());
        app.navigate("login");

        assert!(!app.list_products().await);
        assert_eq!(app.active_section(), Section::Login);
        assert!(app.products().is_empty());
        assert_eq!(app.take_notices().len(), 1);
    }

    #[tokio::test]
    async fn test_view_product_shows_details() {
        let app = app(FakeApi::with_products(vec![product("w1", "Widget", "9.99")]));

        let shown = app.view_product("w1").await.unwrap();
        assert_eq!(shown.name, "Widget");
        assert_eq!(app.current_product(), Some(shown));
        assert_eq!(app.active_section(), Section::ProductDetails);
    }

    #[tokio::test]
    async fn test_view_unknown_product_keeps_view() {
        let app = app(FakeApi::with_products(vec![product("w1", "Widget", "9.99")]));
        app.view_product("w1").await.unwrap();
        app.navigate("cart");

        assert!(app.view_product("missing").await.is_none());
        assert_eq!(app.active_section(), Section::Cart);
        assert_eq!(app.current_product().unwrap().id.as_str(), "w1");
        assert_eq!(app.take_notices().len(), 1);
    }

    #[tokio::test]
    async fn test_view_blank_id_makes_no_call() {
        let app = app(FakeApi::default());
        assert!(app.view_product("  ").await.is_none());
        assert!(app.api().calls().is_empty());
    }
}
