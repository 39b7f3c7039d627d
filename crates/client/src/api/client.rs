//! HTTP implementation of [`StoreApi`].
//!
//! Uses `reqwest` for HTTP and caches catalog reads using `moka`.
//! Auth and order calls are never cached.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use shopfront_core::{Email, ProductId};

use super::cache::{CacheKey, CacheValue};
use super::types::{
    LoginRequest, LoginResponse, MessageResponse, Order, Product, RegisterRequest,
};
use super::{ApiError, StoreApi};
use crate::config::ApiConfig;

/// Longest slice of a response body copied into logs.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// HttpApi
// =============================================================================

/// Client for the storefront's REST service.
///
/// Cheaply cloneable; clones share the connection pool and the cache.
#[derive(Clone)]
pub struct HttpApi {
    inner: Arc<HttpApiInner>,
}

struct HttpApiInner {
    client: reqwest::Client,
    base: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for HttpApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApi")
            .field("base", &self.inner.base.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpApi {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidBaseUrl` if the base URL cannot take path
    /// segments, or `ApiError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        if config.base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.base_url.to_string()));
        }

        let mut builder = reqwest::Client::builder();
        // No timeout unless configured: a hung call stays pending.
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(HttpApiInner {
                client: builder.build()?,
                base: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// Base URL all endpoints hang off.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base
    }

    /// Drop every cached catalog response.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base.clone();
        // Checked in `new`: the base can always take segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a request and classify the response.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode(status, &body)
    }
}

/// Interpret a response body according to its status.
fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    if !status.is_success() {
        let message = serde_json::from_str::<MessageResponse>(body)
            .ok()
            .and_then(|b| b.message);
        tracing::warn!(
            status = %status,
            body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
            "Store API returned non-success status"
        );
        return Err(ApiError::Remote {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
            "Failed to parse Store API response"
        );
        ApiError::Malformed(e.to_string())
    })
}

/// Pull a non-empty message out of a 2xx body.
fn confirmation(body: MessageResponse) -> Result<String, ApiError> {
    body.message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ApiError::Malformed("response has no confirmation message".to_string()))
}

#[async_trait]
impl StoreApi for HttpApi {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let request = self.inner.client.get(self.endpoint(&["products"]));
        let products: Vec<Product> = self.execute(request).await?;
        debug!(count = products.len(), "Fetched product list");

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let request = self
            .inner
            .client
            .get(self.endpoint(&["products", id.as_str()]));
        let product: Product = self.execute(request).await?;

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<SecretString, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint(&["auth", "login"]))
            .json(&LoginRequest {
                email: email.as_str(),
                password: password.expose_secret(),
            });
        let response: LoginResponse = self.execute(request).await?;

        match response.token.filter(|t| !t.trim().is_empty()) {
            Some(token) => Ok(SecretString::from(token)),
            // A 2xx without a token is a refusal carrying the reason.
            None => Err(ApiError::Remote {
                status: StatusCode::OK.as_u16(),
                message: response.message,
            }),
        }
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn register(
        &self,
        username: &str,
        email: &Email,
        password: &SecretString,
    ) -> Result<String, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint(&["auth", "register"]))
            .json(&RegisterRequest {
                username,
                email: email.as_str(),
                password: password.expose_secret(),
            });
        confirmation(self.execute(request).await?)
    }

    #[instrument(skip(self, token, order), fields(lines = order.products.len(), total = %order.total))]
    async fn create_order(&self, token: &SecretString, order: &Order) -> Result<String, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint(&["orders"]))
            .bearer_auth(token.expose_secret())
            .json(order);
        confirmation(self.execute(request).await?)
    }
}
