//! In-process fake of the store service.
//!
//! Serves the catalog, auth and order endpoints under `/api` and records
//! every order it receives.

#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use shopfront_client::Storefront;
use shopfront_client::api::HttpApi;
use shopfront_client::config::ShopfrontConfig;
use shopfront_client::store::SlotStore;

pub const EMAIL: &str = "shopper@example.com";
pub const PASSWORD: &str = "hunter22";
pub const TOKEN: &str = "abc123";

/// An order as the backend saw it.
#[derive(Debug, Clone)]
pub struct ReceivedOrder {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
pub struct Backend {
    inner: Arc<BackendInner>,
}

struct BackendInner {
    orders: Mutex<Vec<ReceivedOrder>>,
    catalog_fetches: AtomicUsize,
    order_reply: Mutex<(StatusCode, Value)>,
}

impl Backend {
    fn new() -> Self {
        Self {
            inner: Arc::new(BackendInner {
                orders: Mutex::new(Vec::new()),
                catalog_fetches: AtomicUsize::new(0),
                order_reply: Mutex::new((
                    StatusCode::CREATED,
                    json!({ "message": "Order created" }),
                )),
            }),
        }
    }

    pub fn orders(&self) -> Vec<ReceivedOrder> {
        self.inner.orders.lock().unwrap().clone()
    }

    pub fn catalog_fetches(&self) -> usize {
        self.inner.catalog_fetches.load(Ordering::SeqCst)
    }

    /// Answer every later order with `status` and `body`.
    pub fn reply_to_orders(&self, status: StatusCode, body: Value) {
        *self.inner.order_reply.lock().unwrap() = (status, body);
    }
}

fn catalog() -> Value {
    json!([
        { "_id": "w1", "name": "Widget", "description": "A widget", "price": 9.99 },
        { "_id": "g1", "name": "Gadget", "description": "A gadget", "price": "5.00" }
    ])
}

async fn list_products(State(backend): State<Backend>) -> Json<Value> {
    backend.inner.catalog_fetches.fetch_add(1, Ordering::SeqCst);
    Json(catalog())
}

async fn get_product(Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    let found = catalog()
        .as_array()
        .and_then(|products| products.iter().find(|p| p["_id"] == id.as_str()).cloned());
    match found {
        Some(product) => (StatusCode::OK, Json(product)),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Product not found" })),
        ),
    }
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"] == EMAIL && body["password"] == PASSWORD {
        (StatusCode::OK, Json(json!({ "token": TOKEN })))
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Invalid credentials" })),
        )
    }
}

async fn register(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"] == "taken@example.com" {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "User already exists" })),
        )
    } else {
        (
            StatusCode::CREATED,
            Json(json!({ "message": "User registered successfully" })),
        )
    }
}

async fn create_order(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let expected = format!("Bearer {TOKEN}");
    let authorized = authorization.as_deref() == Some(expected.as_str());

    backend.inner.orders.lock().unwrap().push(ReceivedOrder {
        authorization,
        body,
    });

    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid token" })),
        );
    }
    let (status, body) = backend.inner.order_reply.lock().unwrap().clone();
    (status, Json(body))
}

static BYPASS_PROXY: Once = Once::new();

fn bypass_proxy() {
    BYPASS_PROXY.call_once(|| {
        // SAFETY: every test calls this before building an HTTP client, and
        // `Once` blocks them until the variable is set.
        #[allow(unsafe_code)]
        unsafe {
            std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        }
    });
}

/// Start the fake service; returns its API base URL.
pub async fn spawn_backend() -> (String, Backend) {
    bypass_proxy();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let backend = Backend::new();
    let app = Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/orders", post(create_order))
        .with_state(backend.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}/api"), backend)
}

/// A base URL on which nothing listens.
pub async fn dead_base_url() -> String {
    bypass_proxy();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

/// Engine wired to `base_url` through the real HTTP client.
pub fn storefront(base_url: &str, store: Arc<dyn SlotStore>) -> Storefront<HttpApi> {
    let config = ShopfrontConfig::from_lookup(|key| {
        (key == "SHOPFRONT_API_BASE").then(|| base_url.to_string())
    })
    .unwrap();
    Storefront::new(HttpApi::new(&config.api).unwrap(), store)
}
