use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "price")]
    pub price: u64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub for_conditions: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub usage: String,
}

/// Skin-condition prediction reduced from the backend's
/// `predictions.best` / `predictions.topk` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
    /// Ranked candidates, best first.
    pub top_k: Vec<(String, f64)>,
}

impl Prediction {
    /// Disease context sent along with chat messages.
    pub fn as_disease_info(&self) -> serde_json::Value {
        serde_json::json!({
            "disease": self.label,
            "confidence": self.confidence,
        })
    }
}

/// Ids arrive as `"1"` from the product catalogue and as `1` from older
/// payloads; both are kept as strings.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Int(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Str(s) => s,
        Id::Int(n) => n.to_string(),
    })
}

/// Prices are whole Rupiah but some endpoints serialize them as floats.
pub(crate) fn price<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.is_sign_negative() || !value.is_finite() {
        return Err(serde::de::Error::custom(format!("invalid price {value}")));
    }
    Ok(value.round() as u64)
}
