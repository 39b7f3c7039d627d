//! Cart Aggregate.
//!
//! The cart lives in the `cart` slot as a JSON array of line items, in
//! insertion order. Every mutation is a full read, mutate, full write.
//!
//! Line items carry the product identifier captured when "add to cart" was
//! pressed, so an order can reference the real product. Carts written by
//! older clients (`{"name": .., "price": ..}` with no identifier and no
//! quantity) still load: the quantity defaults to 1 and the product is then
//! referenced by its display name.

use std::num::NonZeroU32;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use shopfront_core::{Price, ProductId};

use crate::error::AppError;
use crate::store::{SlotStore, StoreError, keys};

const ONE: NonZeroU32 = NonZeroU32::MIN;

const fn default_quantity() -> NonZeroU32 {
    ONE
}

/// Errors from cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// A line or the cart total would exceed the largest representable amount.
    #[error("cart total exceeds the largest representable amount")]
    TotalOverflow,

    /// The cart could not be encoded for storage.
    #[error("failed to encode cart: {0}")]
    Encode(#[from] serde_json::Error),

    /// The encoded cart could not be written.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// One entry of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Identifier of the product, absent for legacy entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    /// Display name at the time the item was added.
    pub name: String,
    /// Unit price at the time the item was added.
    #[serde(rename = "price")]
    pub unit_price: Price,
    #[serde(default = "default_quantity")]
    pub quantity: NonZeroU32,
}

impl CartLineItem {
    /// A single unit of a product.
    #[must_use]
    pub fn new(product_id: ProductId, name: impl Into<String>, unit_price: Price) -> Self {
        Self {
            product_id: Some(product_id),
            name: name.into(),
            unit_price,
            quantity: ONE,
        }
    }

    /// How the order service should identify this product: its identifier
    /// when known, otherwise its display name.
    #[must_use]
    pub fn product_ref(&self) -> &str {
        self.product_id
            .as_ref()
            .map_or(self.name.as_str(), ProductId::as_str)
    }

    /// Unit price times quantity, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<Price> {
        self.unit_price.checked_times(self.quantity.get())
    }
}

/// Ordered sequence of line items.
///
/// The total is computed when the cart is built, so a cart whose total
/// cannot be represented never exists. Deserialization enforces the same.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartLineItem>", into = "Vec<CartLineItem>")]
pub struct Cart {
    items: Vec<CartLineItem>,
    total: Price,
}

impl Cart {
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of unit price times quantity over every line.
    #[must_use]
    pub const fn total(&self) -> Price {
        self.total
    }

    /// Total number of units.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |n, item| n.saturating_add(item.quantity.get()))
    }

    /// Append a line. Adding a product already in the cart yields a second line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::TotalOverflow` if the new total cannot be
    /// represented; the cart is left unchanged.
    pub fn push(&mut self, item: CartLineItem) -> Result<(), CartError> {
        self.total = item
            .line_total()
            .and_then(|line| self.total.checked_add(line))
            .ok_or(CartError::TotalOverflow)?;
        self.items.push(item);
        Ok(())
    }
}

impl TryFrom<Vec<CartLineItem>> for Cart {
    type Error = CartError;

    fn try_from(items: Vec<CartLineItem>) -> Result<Self, Self::Error> {
        let mut cart = Self::default();
        for item in items {
            cart.push(item)?;
        }
        Ok(cart)
    }
}

impl From<Cart> for Vec<CartLineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

/// Owner of the `cart` slot.
#[derive(Clone)]
pub struct CartStore {
    store: Arc<dyn SlotStore>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore").finish_non_exhaustive()
    }
}

impl CartStore {
    #[must_use]
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self { store }
    }

    /// Read the persisted cart.
    ///
    /// An absent, unreadable or unparsable slot yields an empty cart. The
    /// corrupt value is left in place and overwritten by the next mutation.
    #[must_use]
    pub fn load(&self) -> Cart {
        let raw = match self.store.read(keys::CART) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Cart::default(),
            Err(e) => {
                warn!(error = %e, "Cart slot unreadable, starting with an empty cart");
                return Cart::default();
            }
        };

        // Older clients wrote `null` after clearing.
        match serde_json::from_str::<Option<Cart>>(&raw) {
            Ok(cart) => cart.unwrap_or_default(),
            Err(e) => {
                let err = AppError::CorruptPersistedState {
                    slot: keys::CART,
                    reason: e.to_string(),
                };
                warn!(error = %err, "Discarding persisted cart");
                Cart::default()
            }
        }
    }

    /// Append one unit of a product and persist.
    ///
    /// # Errors
    ///
    /// Returns `CartError::TotalOverflow` if the new total cannot be
    /// represented, `CartError::Encode` if the cart cannot be encoded, or
    /// `CartError::Storage` if it cannot be written back. The persisted cart
    /// is unchanged in every case.
    #[instrument(skip(self, name), fields(product_id = %product_id))]
    pub fn add_item(
        &self,
        product_id: ProductId,
        name: &str,
        unit_price: Price,
    ) -> Result<Cart, CartError> {
        let mut cart = self.load();
        cart.push(CartLineItem::new(product_id, name, unit_price))?;
        self.save(&cart)?;
        debug!(lines = cart.items().len(), total = %cart.total(), "Cart updated");
        Ok(cart)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the slot cannot be removed.
    #[instrument(skip(self))]
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(keys::CART)
    }

    fn save(&self, cart: &Cart) -> Result<(), CartError> {
        let raw = serde_json::to_string(cart)?;
        self.store.write(keys::CART, &raw)?;
        Ok(())
    }
}

// =============================================================================
// View Models
// =============================================================================

/// Cart line display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart view.
    #[must_use]
    pub fn empty() -> Self {
        Self::from(&Cart::default())
    }
}

impl From<&CartLineItem> for CartItemView {
    fn from(item: &CartLineItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity.get(),
            price: item.unit_price.to_string(),
            // Lines of a built `Cart` always have a representable total.
            line_price: item
                .line_total()
                .map(|line| line.to_string())
                .unwrap_or_default(),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            total: cart.total().to_string(),
            item_count: cart.item_count(),
        }
    }
}
