//! Durable storage key layout, shared with the web client.

pub const TOKEN: &str = "token";
pub const USER: &str = "user";

pub fn cart(user_id: i64) -> String {
    format!("cart_{user_id}")
}

pub fn chat_sessions(user_id: i64) -> String {
    format!("user_{user_id}_chats")
}

pub fn chat_messages(user_id: i64, chat_id: &str) -> String {
    format!("user_{user_id}_chat_{chat_id}")
}
