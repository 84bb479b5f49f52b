use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::admin::AdminResource;
use crate::error::ApiError;
use crate::order::{NewOrder, Order};
use crate::product::{Prediction, Product};
use crate::user::User;

/// An image ready for upload to `/predict`.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoredLabel {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionScores {
    pub best: ScoredLabel,
    #[serde(default)]
    pub topk: Vec<ScoredLabel>,
}

/// Raw `/predict` body.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    pub predictions: PredictionScores,
}

impl TryFrom<PredictResponse> for Prediction {
    type Error = ApiError;

    fn try_from(resp: PredictResponse) -> Result<Self, Self::Error> {
        if resp.success == Some(false) {
            return Err(ApiError::Decode(
                resp.error.unwrap_or_else(|| "prediction failed".into()),
            ));
        }
        Ok(Prediction {
            label: resp.predictions.best.label,
            confidence: resp.predictions.best.score,
            top_k: resp
                .predictions
                .topk
                .into_iter()
                .map(|s| (s.label, s.score))
                .collect(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub disease_info: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Generic `{success, message}` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerCartLine {
    #[serde(deserialize_with = "crate::product::string_or_number")]
    pub product_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub item_total: f64,
}

/// Server-side cart as returned by `GET /cart`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerCart {
    #[serde(default)]
    pub items: Vec<ServerCartLine>,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub total_price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutReceipt {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub total_price: f64,
    pub order_id: String,
}

/// The skincare backend as seen by the client.
#[async_trait]
pub trait SkinApi: Send + Sync {
    async fn predict(&self, image: ImageUpload) -> Result<Prediction, ApiError>;

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError>;

    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError>;

    async fn register(&self, request: &RegisterRequest) -> Result<Ack, ApiError>;

    async fn products(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<Product>, ApiError>;

    async fn create_order(&self, token: &str, order: &NewOrder) -> Result<Order, ApiError>;

    async fn user_orders(&self, token: &str, user_id: i64) -> Result<Vec<Order>, ApiError>;

    async fn admin_debug(
        &self,
        token: &str,
        resource: AdminResource,
    ) -> Result<serde_json::Value, ApiError>;
}
