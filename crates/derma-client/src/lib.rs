//! HTTP client for the skincare backend's `/api/v1` surface.
//!
//! Every call maps one request to one response: no retries, no caching.
//! Failures carry the backend's `detail` text when it sends one.

use async_trait::async_trait;
use derma_core::admin::AdminResource;
use derma_core::api::*;
use derma_core::config::AppConfig;
use derma_core::error::ApiError;
use derma_core::order::{NewOrder, Order};
use derma_core::product::{Prediction, Product};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub struct ApiClient {
    client: Client,
    api_root: String,
}

#[derive(Deserialize)]
struct ProductList {
    #[serde(default)]
    products: Vec<Product>,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_root: config.api_root(),
        }
    }

    /// Client rooted at an explicit API prefix such as `http://host/api/v1`.
    pub fn with_root(api_root: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_root: api_root.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_root, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let resp = request
            .send()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        let message = error_detail(&text).unwrap_or_else(|| {
            if text.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                text
            }
        });
        tracing::debug!(status = status.as_u16(), %message, "backend returned an error");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    // ---- server-side cart (bearer) ----

    pub async fn cart(&self, token: &str) -> Result<ServerCart, ApiError> {
        self.send_json(self.client.get(self.url("/cart")).bearer_auth(token))
            .await
    }

    pub async fn add_to_cart(
        &self,
        token: &str,
        product_id: &str,
        quantity: u32,
    ) -> Result<Ack, ApiError> {
        let body = serde_json::json!({ "product_id": product_id, "quantity": quantity });
        self.send_json(
            self.client
                .post(self.url("/cart/add"))
                .bearer_auth(token)
                .json(&body),
        )
        .await
    }

    /// Sets an absolute quantity; the backend drops the line at zero.
    pub async fn update_cart(
        &self,
        token: &str,
        product_id: &str,
        quantity: u32,
    ) -> Result<Ack, ApiError> {
        let body = serde_json::json!({ "product_id": product_id, "quantity": quantity });
        self.send_json(
            self.client
                .put(self.url("/cart/update"))
                .bearer_auth(token)
                .json(&body),
        )
        .await
    }

    pub async fn clear_cart(&self, token: &str) -> Result<Ack, ApiError> {
        self.send_json(self.client.delete(self.url("/cart/clear")).bearer_auth(token))
            .await
    }

    pub async fn checkout(&self, token: &str) -> Result<CheckoutReceipt, ApiError> {
        self.send_json(self.client.post(self.url("/checkout")).bearer_auth(token))
            .await
    }
}

/// FastAPI puts the message in `detail`, either a string or a list of
/// validation errors with `msg` fields.
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|i| i.get("msg").and_then(|m| m.as_str()))
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        _ => None,
    }
}

#[async_trait]
impl SkinApi for ApiClient {
    async fn predict(&self, image: ImageUpload) -> Result<Prediction, ApiError> {
        tracing::debug!(file = %image.file_name, bytes = image.bytes.len(), "uploading image");
        let part = reqwest::multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.mime)
            .map_err(|e| ApiError::Http(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp: PredictResponse = self
            .send_json(self.client.post(self.url("/predict")).multipart(form))
            .await?;
        Prediction::try_from(resp)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.send_json(self.client.post(self.url("/chat")).json(request))
            .await
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let form = [("username", username), ("password", password)];
        self.send_json(self.client.post(self.url("/auth/login")).form(&form))
            .await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Ack, ApiError> {
        self.send_json(self.client.post(self.url("/auth/register")).json(request))
            .await
    }

    async fn products(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<Product>, ApiError> {
        let mut query = Vec::new();
        if let Some(c) = category {
            query.push(("category", c));
        }
        if let Some(s) = search {
            query.push(("search", s));
        }
        let list: ProductList = self
            .send_json(self.client.get(self.url("/products")).query(&query))
            .await?;
        Ok(list.products)
    }

    async fn create_order(&self, token: &str, order: &NewOrder) -> Result<Order, ApiError> {
        self.send_json(
            self.client
                .post(self.url("/orders"))
                .bearer_auth(token)
                .json(order),
        )
        .await
    }

    async fn user_orders(&self, token: &str, user_id: i64) -> Result<Vec<Order>, ApiError> {
        self.send_json(
            self.client
                .get(self.url(&format!("/orders/user/{user_id}")))
                .bearer_auth(token),
        )
        .await
    }

    async fn admin_debug(
        &self,
        token: &str,
        resource: AdminResource,
    ) -> Result<serde_json::Value, ApiError> {
        self.send_json(
            self.client
                .get(self.url(&format!("/admin/debug/{resource}")))
                .bearer_auth(token),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::error_detail;

    #[test]
    fn test_error_detail_string() {
        assert_eq!(
            error_detail(r#"{"detail": "Username atau password salah"}"#).as_deref(),
            Some("Username atau password salah")
        );
    }

    #[test]
    fn test_error_detail_validation_list() {
        let body = r#"{"detail": [{"loc": ["body", "email"], "msg": "field required"}]}"#;
        assert_eq!(error_detail(body).as_deref(), Some("field required"));
    }

    #[test]
    fn test_error_detail_absent() {
        assert!(error_detail("Internal Server Error").is_none());
        assert!(error_detail(r#"{"error": "x"}"#).is_none());
    }
}
