//! HTTP implementation of [`ProductsApi`] against a dummyjson-compatible service.

use crate::api::normalize::{self, RawAuthResponse, RawCategory};
use crate::api::{AuthTokens, ProductsApi, TokenSource};
use crate::domain::error::{CatalogError, Result};
use crate::domain::{Category, Product, ProductPage};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{self, HeaderValue};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const PRODUCTS: &[&str] = &["products"];
const PRODUCTS_SEARCH: &[&str] = &["products", "search"];
const PRODUCTS_CATEGORIES: &[&str] = &["products", "categories"];
const AUTH_REFRESH: &[&str] = &["auth", "refresh"];

/// Blocking HTTP client for the remote catalog.
///
/// Requests carry a bearer token when a [`TokenSource`] is attached. An HTTP 401 is
/// answered by one refresh through `/auth/refresh` and a single retry; if the refresh
/// is impossible or fails, the original 401 surfaces as
/// [`CatalogError::Unauthorized`].
pub struct HttpProductsApi {
    client: Client,
    base_url: Url,
    tokens: Option<Arc<dyn TokenSource>>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

impl HttpProductsApi {
    /// Creates a client for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `base_url` is not an absolute http(s) URL,
    /// or if the underlying HTTP client cannot be built (for example when no TLS
    /// backend is available).
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let raw = base_url.as_ref();
        let base_url = Url::parse(raw)
            .map_err(|e| CatalogError::Config(format!("invalid api_base_url {raw:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::Config(format!(
                "api_base_url {raw:?} cannot hold a path"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            tokens: None,
        })
    }

    /// Attaches the credential capability used for bearer auth and refresh.
    #[must_use]
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Appends `segments` to the base URL path, percent-encoding each one, so a
    /// slug can never address a different endpoint.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let Some(token) = self.tokens.as_ref().and_then(|t| t.access_token()) else {
            return request;
        };

        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(value) => request.header(header::AUTHORIZATION, value),
            Err(_) => {
                tracing::warn!("access token is not a valid header value; sending without auth");
                request
            }
        }
    }

    fn get<T: DeserializeOwned>(&self, segments: &[&str], query: &[(&str, String)]) -> Result<T> {
        let url = self.url(segments);
        let _span = tracing::debug_span!("http_get", path = %url.path()).entered();

        let send = || {
            let request = self
                .client
                .get(url.clone())
                .header(header::ACCEPT, "application/json")
                .query(query);
            self.authorize(request).send().map_err(transport_error)
        };

        let mut response = send()?;
        if response.status() == StatusCode::UNAUTHORIZED && self.refresh() {
            tracing::debug!("retrying after token refresh");
            response = send()?;
        }

        tracing::debug!(status = response.status().as_u16(), "response received");
        decode(response)
    }

    /// Exchanges the refresh token for new credentials. Returns whether the retry is
    /// worth attempting.
    fn refresh(&self) -> bool {
        let Some(tokens) = self.tokens.as_ref() else {
            return false;
        };
        let Some(refresh_token) = tokens.refresh_token() else {
            tracing::debug!("401 without a refresh token");
            return false;
        };

        match self.request_new_tokens(&refresh_token) {
            Ok(new_tokens) => {
                tokens.store(new_tokens);
                tracing::info!("access token refreshed");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed");
                false
            }
        }
    }

    fn request_new_tokens(&self, refresh_token: &str) -> Result<AuthTokens> {
        let response = self
            .client
            .post(self.url(AUTH_REFRESH))
            .json(&RefreshRequest { refresh_token })
            .send()
            .map_err(transport_error)?;

        normalize::auth_tokens(decode::<RawAuthResponse>(response)?)
    }

    fn page(&self, segments: &[&str], limit: u32, skip: u32) -> Result<ProductPage> {
        self.get(segments, &[("limit", limit.to_string()), ("skip", skip.to_string())])
    }
}

fn transport_error(e: reqwest::Error) -> CatalogError {
    if e.is_timeout() {
        CatalogError::Network("Request timed out.".to_string())
    } else if e.is_connect() {
        CatalogError::Network("Network error. Please check your connection.".to_string())
    } else {
        CatalogError::Network(e.to_string())
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .map_err(|e| CatalogError::Network(format!("Invalid response from server: {e}")));
    }

    let message = response.json::<ErrorBody>().ok().and_then(|b| b.message);
    tracing::debug!(status = status.as_u16(), message = ?message, "request failed");
    Err(CatalogError::from_status(status.as_u16(), message))
}

impl ProductsApi for HttpProductsApi {
    fn list(&self, limit: u32, skip: u32) -> Result<ProductPage> {
        self.page(PRODUCTS, limit, skip)
    }

    fn by_category(&self, slug: &str, limit: u32, skip: u32) -> Result<ProductPage> {
        self.page(&["products", "category", slug], limit, skip)
    }

    fn search(&self, query: &str, limit: u32, skip: u32) -> Result<ProductPage> {
        self.get(
            PRODUCTS_SEARCH,
            &[
                ("q", query.to_string()),
                ("limit", limit.to_string()),
                ("skip", skip.to_string()),
            ],
        )
    }

    fn categories(&self) -> Result<Vec<Category>> {
        let raw: Vec<RawCategory> = self.get(PRODUCTS_CATEGORIES, &[])?;
        Ok(normalize::categories(raw))
    }

    fn product(&self, id: u64) -> Result<Product> {
        let id = id.to_string();
        self.get(&["products", id.as_str()], &[])
    }
}
