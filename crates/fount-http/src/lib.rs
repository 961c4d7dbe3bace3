//! HTTP primitives for the Fount data layer.
//!
//! This crate provides:
//! - `Fetcher` - The injected fetch primitive (the only transport seam)
//! - `Request` / `Response` - Plain value types crossing that seam
//! - `decode` - The shared rule classifying responses into payload or failure
//! - `FetchError` - Tagged failure taxonomy (transport / decode / API)
//! - `ApiClient` - Thin consumer-facing GET/POST helper
//!
//! The crate never constructs a transport; hosting applications implement
//! [`Fetcher`] and hand it in.
//!
//! # Example
//!
//! ```rust,ignore
//! use fount_http::{ApiClient, Fetcher};
//! use std::sync::Arc;
//!
//! let client = ApiClient::new(my_fetcher);
//!
//! // GET with JSON decoding
//! let user = client.get("https://api.example.com/users/1").await?;
//!
//! // POST with JSON content negotiation
//! let created = client
//!     .post("https://api.example.com/users", &serde_json::json!({"name": "Ada"}))
//!     .await?;
//! ```

mod decode;
mod error;
mod request;
mod response;

pub use decode::decode;
pub use error::FetchError;
pub use request::{Method, Request};
pub use response::Response;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// The injected fetch primitive.
///
/// Implementations own every transport-level concern (TLS, proxies, retries,
/// timeouts); the data layer only sees a [`Request`] in and a [`Response`]
/// (or a transport failure) out.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Send a request and return the raw response.
    async fn send(&self, request: Request) -> Result<Response, FetchError>;
}

/// Thin client over a [`Fetcher`] applying the shared decode rule.
///
/// This is glue for callers that want a one-off request outside the cache;
/// cached reads go through `fount-cache` instead.
pub struct ApiClient {
    fetcher: Arc<dyn Fetcher>,
    base_url: Option<String>,
}

impl ApiClient {
    /// Create a new client over the given fetch primitive.
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            base_url: None,
        }
    }

    /// Set a base URL that will be prepended to relative request targets.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Send a GET request and decode the response.
    pub async fn get(&self, url: impl Into<String>) -> Result<Value, FetchError> {
        self.send(Request::get(self.full_url(url)).accept("application/json"))
            .await
    }

    /// Send a POST request with a JSON body and decode the response.
    pub async fn post<T: Serialize>(
        &self,
        url: impl Into<String>,
        body: &T,
    ) -> Result<Value, FetchError> {
        self.send(Request::post(self.full_url(url)).json(body)?)
            .await
    }

    /// Send an arbitrary request and decode the response.
    pub async fn send(&self, request: Request) -> Result<Value, FetchError> {
        let response = self.fetcher.send(request).await?;
        decode(&response)
    }

    fn full_url(&self, url: impl Into<String>) -> String {
        let url = url.into();
        match &self.base_url {
            Some(base) if !url.starts_with("http://") && !url.starts_with("https://") => {
                format!("{}{}", base.trim_end_matches('/'), url)
            }
            _ => url,
        }
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{decode, ApiClient, FetchError, Fetcher, Method, Request, Response};
}
