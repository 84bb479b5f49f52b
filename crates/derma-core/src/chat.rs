use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::product::Product;

pub const DEFAULT_CHAT_TITLE: &str = "New chat";

/// Titles longer than this many characters are cut and get `...` appended.
pub const MAX_TITLE_CHARS: usize = 40;

/// Metadata entry in the per-user session list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub message_count: u64,
}

impl ChatSession {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: format!("chat_{}", now.timestamp_millis()),
            title: DEFAULT_CHAT_TITLE.into(),
            created_at: now,
            last_updated: now,
            message_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub text: String,
    pub is_bot: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<Product>,
}

impl ChatMessage {
    pub fn user(id: i64, text: String) -> Self {
        Self {
            id,
            text,
            is_bot: false,
            timestamp: Utc::now(),
            products: Vec::new(),
        }
    }

    pub fn bot(id: i64, text: String, products: Vec<Product>) -> Self {
        Self {
            id,
            text,
            is_bot: true,
            timestamp: Utc::now(),
            products,
        }
    }
}

/// Stored body of one session: its messages in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatLog {
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Millisecond id for a new message, strictly greater than every existing id.
pub fn next_message_id(existing: &[ChatMessage]) -> i64 {
    let now = Utc::now().timestamp_millis();
    match existing.iter().map(|m| m.id).max() {
        Some(last) if last >= now => last + 1,
        _ => now,
    }
}

/// Title of a session: the first user message, cut to [`MAX_TITLE_CHARS`].
pub fn generate_title(messages: &[ChatMessage]) -> String {
    let Some(first) = messages.iter().find(|m| !m.is_bot) else {
        return DEFAULT_CHAT_TITLE.into();
    };

    let truncated: String = first.text.chars().take(MAX_TITLE_CHARS).collect();
    if first.text.chars().count() > MAX_TITLE_CHARS {
        format!("{truncated}...")
    } else {
        truncated
    }
}

/// Short age label for session lists: `just now`, `5m`, `3h`, `2d`, else `12 Mar`.
pub fn relative_label(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(then);
    let mins = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();

    if mins < 1 {
        "just now".into()
    } else if mins < 60 {
        format!("{mins}m")
    } else if hours < 24 {
        format!("{hours}h")
    } else if days < 7 {
        format!("{days}d")
    } else {
        then.format("%-d %b").to_string()
    }
}
