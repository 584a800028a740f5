//! HTTP client for the Open Food Facts read API.
//!
//! Two operations are exposed: exact lookup by barcode and free-text search.
//! Both return [`OffProduct`] values; a barcode the database does not know is
//! `Ok(None)`, not an error.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::OpenFoodError;
use crate::normalize::{normalize_product, OffProduct};
use crate::retry::RetryPolicy;
use crate::types::{ProductResponse, SearchResponse};

const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org/";

/// Fields requested from the API; keeps payloads small.
const FIELDS: &str = "code,product_name,product_name_en,generic_name,brands,image_url,\
image_front_url,nutriscore_grade,nutrition_grades,categories";

/// Upper bound on search page size accepted by this client.
const MAX_PAGE_SIZE: usize = 50;

/// Client for the Open Food Facts API.
///
/// Use [`OpenFoodClient::new`] for production or
/// [`OpenFoodClient::with_base_url`] to point at a mock server in tests.
pub struct OpenFoodClient {
    client: Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl OpenFoodClient {
    /// Creates a client pointed at `world.openfoodfacts.org`, with retries disabled.
    ///
    /// # Errors
    ///
    /// Returns [`OpenFoodError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, OpenFoodError> {
        Self::with_base_url(timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (mirrors, staging, wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`OpenFoodError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`OpenFoodError::InvalidBaseUrl`] if `base_url` does
    /// not parse.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, OpenFoodError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends to the base path
        // instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| OpenFoodError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: parsed,
            retry: RetryPolicy::default(),
        })
    }

    /// Enables retries of transient failures (timeouts, 5xx, 429).
    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.retry = RetryPolicy {
            max_retries,
            backoff_base_ms,
        };
        self
    }

    /// Looks up a single product by exact barcode.
    ///
    /// Returns `Ok(None)` when the API answers 404 or reports `status: 0`.
    ///
    /// # Errors
    ///
    /// - [`OpenFoodError::InvalidBarcode`] if `barcode` is not a digit string.
    /// - [`OpenFoodError::Http`] / [`OpenFoodError::UnexpectedStatus`] on
    ///   network failure or non-2xx status after retries.
    /// - [`OpenFoodError::Deserialize`] if the body is not the expected shape.
    pub async fn get_product(&self, barcode: &str) -> Result<Option<OffProduct>, OpenFoodError> {
        let barcode = barcode.trim();
        if barcode.is_empty() || !barcode.chars().all(|c| c.is_ascii_digit()) {
            return Err(OpenFoodError::InvalidBarcode(barcode.to_owned()));
        }

        let url = self.build_url(&format!("api/v2/product/{barcode}.json"), &[("fields", FIELDS)])?;
        let body = match self.request_json(&url).await {
            Ok(body) => body,
            Err(OpenFoodError::NotFound { .. }) => {
                tracing::debug!(barcode, "barcode not found in Open Food Facts");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let envelope: ProductResponse =
            serde_json::from_value(body).map_err(|e| OpenFoodError::Deserialize {
                context: format!("product(barcode={barcode})"),
                source: e,
            })?;

        if envelope.status != 1 {
            return Ok(None);
        }
        let fallback = envelope.code.as_deref().unwrap_or(barcode);
        Ok(envelope
            .product
            .and_then(|raw| normalize_product(raw, Some(fallback))))
    }

    /// Searches products by free text, returning at most `page_size` hits.
    ///
    /// Records without a barcode are skipped. A blank query returns an empty
    /// list without issuing a request.
    ///
    /// # Errors
    ///
    /// - [`OpenFoodError::Http`] / [`OpenFoodError::UnexpectedStatus`] on
    ///   network failure or non-2xx status after retries.
    /// - [`OpenFoodError::Deserialize`] if the body is not the expected shape.
    pub async fn search(
        &self,
        query: &str,
        page_size: usize,
    ) -> Result<Vec<OffProduct>, OpenFoodError> {
        let query = query.trim();
        if query.is_empty() || page_size == 0 {
            return Ok(Vec::new());
        }
        let page_size = page_size.min(MAX_PAGE_SIZE);
        let page_size_param = page_size.to_string();

        let url = self.build_url(
            "cgi/search.pl",
            &[
                ("search_terms", query),
                ("search_simple", "1"),
                ("action", "process"),
                ("json", "1"),
                ("page_size", &page_size_param),
                ("fields", FIELDS),
            ],
        )?;
        let body = self.request_json(&url).await?;

        let envelope: SearchResponse =
            serde_json::from_value(body).map_err(|e| OpenFoodError::Deserialize {
                context: format!("search(query={query})"),
                source: e,
            })?;

        Ok(envelope
            .products
            .into_iter()
            .filter_map(|raw| normalize_product(raw, None))
            .take(page_size)
            .collect())
    }

    /// Joins `path` onto the base URL and appends percent-encoded query pairs.
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, OpenFoodError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| OpenFoodError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET request with retries and parses the response body as JSON.
    ///
    /// # Errors
    ///
    /// [`OpenFoodError::NotFound`] on 404, [`OpenFoodError::UnexpectedStatus`]
    /// on any other non-2xx, [`OpenFoodError::Http`] on network failure, and
    /// [`OpenFoodError::Deserialize`] if the body is not JSON.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, OpenFoodError> {
        self.retry.run(|| async move {
            let response = self
                .client
                .get(url.clone())
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Err(OpenFoodError::NotFound {
                    url: url.to_string(),
                });
            }
            if !status.is_success() {
                return Err(OpenFoodError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| OpenFoodError::Deserialize {
                context: url.to_string(),
                source: e,
            })
        })
        .await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
