//! Durable key-value slots.
//!
//! The engine persists exactly two slots, [`keys::CART`] and
//! [`keys::TOKEN`]. Each is owned by one component ([`crate::cart::CartStore`]
//! and [`crate::session::SessionStore`] respectively); nothing else writes to
//! them. Components receive the store by injection, never through a global.
//!
//! Every operation is a whole-value read or write. There is no
//! compare-and-swap, so two overlapping read-modify-write cycles resolve as
//! last write wins.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Slot keys.
pub mod keys {
    /// Serialized cart (JSON array of line items).
    pub const CART: &str = "cart";

    /// Raw bearer token.
    pub const TOKEN: &str = "token";
}

/// Errors raised by a [`SlotStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading, writing or removing a slot failed at the I/O layer.
    #[error("slot '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A slot key that cannot be mapped onto the backend.
    #[error("invalid slot key: {0:?}")]
    InvalidKey(String),
}

/// A named, durable key-value storage location surviving restarts.
pub trait SlotStore: Send + Sync {
    /// Read a slot. An absent slot is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the whole value of a slot.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a slot. Removing an absent slot succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be modified.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
