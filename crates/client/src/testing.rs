//! Recording fake of the remote service for unit tests.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use shopfront_core::{Email, Price, ProductId};

use crate::api::{ApiError, Order, Product, StoreApi};

/// Canned answer for one kind of call.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Success carrying a token or confirmation message.
    Ok(String),
    /// Non-success status with a message body.
    Remote(u16, &'static str),
    /// 2xx with a body that cannot be interpreted.
    Malformed,
    /// No response at all; see [`unreachable_error`].
    Unreachable,
}

impl Reply {
    fn resolve(&self) -> Result<String, ApiError> {
        match self {
            Self::Ok(value) => Ok(value.clone()),
            Self::Remote(status, message) => Err(ApiError::Remote {
                status: *status,
                message: Some((*message).to_string()),
            }),
            Self::Malformed => Err(ApiError::Malformed("unexpected body".to_string())),
            Self::Unreachable => Err(unreachable_error()),
        }
    }
}

/// A call observed by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListProducts,
    GetProduct(String),
    Login(String),
    Register(String),
    CreateOrder { token: String, order: Order },
}

#[derive(Debug)]
pub struct FakeApi {
    products: Vec<Product>,
    catalog_fails: bool,
    login: Reply,
    register: Reply,
    order: Reply,
    calls: Mutex<Vec<Call>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            catalog_fails: false,
            login: Reply::Ok("token".to_string()),
            register: Reply::Ok("User registered".to_string()),
            order: Reply::Ok("Order placed".to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeApi {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products,
            ..Self::default()
        }
    }

    pub fn failing_catalog(mut self) -> Self {
        self.catalog_fails = true;
        self
    }

    pub fn login_reply(mut self, reply: Reply) -> Self {
        self.login = reply;
        self
    }

    pub fn register_reply(mut self, reply: Reply) -> Self {
        self.register = reply;
        self
    }

    pub fn order_reply(mut self, reply: Reply) -> Self {
        self.order = reply;
        self
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: Call) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

/// Stand-in for a failed connection.
///
/// `reqwest::Error` has no public constructor, so the fake uses the other
/// error that `ApiError::is_transport` classifies as never reaching the
/// service. Tests of a real refused connection live in the integration tests.
fn unreachable_error() -> ApiError {
    ApiError::InvalidBaseUrl("connection refused".to_string())
}

#[async_trait]
impl StoreApi for FakeApi {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.record(Call::ListProducts);
        if self.catalog_fails {
            return Err(unreachable_error());
        }
        Ok(self.products.clone())
    }

    async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        self.record(Call::GetProduct(id.to_string()));
        if self.catalog_fails {
            return Err(unreachable_error());
        }
        self.products
            .iter()
            .find(|p| p.id == *id)
            .cloned()
            .ok_or_else(|| ApiError::Remote {
                status: 404,
                message: Some("Product not found".to_string()),
            })
    }

    async fn login(
        &self,
        email: &Email,
        _password: &SecretString,
    ) -> Result<SecretString, ApiError> {
        self.record(Call::Login(email.to_string()));
        self.login.resolve().map(SecretString::from)
    }

    async fn register(
        &self,
        _username: &str,
        email: &Email,
        _password: &SecretString,
    ) -> Result<String, ApiError> {
        self.record(Call::Register(email.to_string()));
        self.register.resolve()
    }

    async fn create_order(&self, token: &SecretString, order: &Order) -> Result<String, ApiError> {
        self.record(Call::CreateOrder {
            token: token.expose_secret().to_string(),
            order: order.clone(),
        });
        self.order.resolve()
    }
}

/// Build a catalog product.
///
/// # Panics
///
/// Panics on an invalid id or price.
#[allow(clippy::unwrap_used)]
pub fn product(id: &str, name: &str, price: &str) -> Product {
    Product {
        id: ProductId::parse(id).unwrap(),
        name: name.to_string(),
        description: String::new(),
        price: Price::new(price.parse().unwrap()).unwrap(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_unreachable_reply_is_a_transport_error() {
        let err = Reply::Unreachable.resolve().unwrap_err();
        assert!(err.is_transport());
        assert!(matches!(AppError::from(err), AppError::Transport(_)));
    }
}
