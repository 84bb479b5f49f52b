use chrono::{Duration, Utc};
use derma_core::chat::{generate_title, ChatLog, ChatMessage, ChatSession};
use derma_core::error::StorageError;
use std::sync::Arc;

use crate::keys;
use crate::kv::{read_json, KeyValueStore, WriteOp};

/// Per-user chat history: a metadata list under `user_{id}_chats` and one
/// message log per session under `user_{id}_chat_{chatId}`.
///
/// Writes that touch both keys go through a single batch.
#[derive(Clone)]
pub struct ChatStore {
    store: Arc<dyn KeyValueStore>,
}

impl ChatStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Sessions, most recently updated first.
    pub async fn list_sessions(&self, user_id: i64) -> Result<Vec<ChatSession>, StorageError> {
        let mut sessions: Vec<ChatSession> =
            read_json(self.store.as_ref(), &keys::chat_sessions(user_id))
                .await?
                .unwrap_or_default();
        sessions.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Ok(sessions)
    }

    pub async fn get_session(
        &self,
        user_id: i64,
        session_id: &str,
    ) -> Result<Option<ChatSession>, StorageError> {
        Ok(self
            .list_sessions(user_id)
            .await?
            .into_iter()
            .find(|s| s.id == session_id))
    }

    pub async fn create_session(&self, user_id: i64) -> Result<ChatSession, StorageError> {
        let mut sessions = self.list_sessions(user_id).await?;

        // Two sessions created within the same millisecond would share an id
        let mut now = Utc::now();
        let mut session = ChatSession::new(now);
        while sessions.iter().any(|s| s.id == session.id) {
            now += Duration::milliseconds(1);
            session = ChatSession::new(now);
        }

        sessions.insert(0, session.clone());
        self.store
            .write_batch(vec![WriteOp::set_json(keys::chat_sessions(user_id), &sessions)?])
            .await?;
        tracing::debug!(user_id, session_id = %session.id, "chat session created");
        Ok(session)
    }

    /// The newest session, or a freshly created one when the user has none.
    pub async fn latest_or_create(&self, user_id: i64) -> Result<ChatSession, StorageError> {
        match self.list_sessions(user_id).await?.into_iter().next() {
            Some(session) => Ok(session),
            None => self.create_session(user_id).await,
        }
    }

    pub async fn load_messages(
        &self,
        user_id: i64,
        session_id: &str,
    ) -> Result<Vec<ChatMessage>, StorageError> {
        let log: Option<ChatLog> =
            read_json(self.store.as_ref(), &keys::chat_messages(user_id, session_id)).await?;
        Ok(log.map(|l| l.messages).unwrap_or_default())
    }

    /// Appends `new_messages` to the session's log, refreshes its title,
    /// `lastUpdated` and `messageCount`, and stores both in one batch.
    /// Returns the full message list.
    pub async fn append_and_persist(
        &self,
        user_id: i64,
        session_id: &str,
        new_messages: Vec<ChatMessage>,
    ) -> Result<Vec<ChatMessage>, StorageError> {
        let mut messages = self.load_messages(user_id, session_id).await?;
        if new_messages.is_empty() {
            return Ok(messages);
        }
        messages.extend(new_messages);

        let now = Utc::now();
        let mut sessions = self.list_sessions(user_id).await?;
        let index = match sessions.iter().position(|s| s.id == session_id) {
            Some(i) => i,
            None => {
                // Log without metadata: recreate the entry so both keys agree
                tracing::warn!(user_id, session_id, "restoring missing chat session entry");
                sessions.push(ChatSession {
                    id: session_id.to_string(),
                    ..ChatSession::new(now)
                });
                sessions.len() - 1
            }
        };
        if let Some(session) = sessions.get_mut(index) {
            session.title = generate_title(&messages);
            session.last_updated = now;
            session.message_count = messages.len() as u64;
        }
        sessions.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));

        let log = ChatLog {
            messages,
            last_updated: Some(now),
        };
        self.store
            .write_batch(vec![
                WriteOp::set_json(keys::chat_messages(user_id, session_id), &log)?,
                WriteOp::set_json(keys::chat_sessions(user_id), &sessions)?,
            ])
            .await?;
        Ok(log.messages)
    }

    /// Removes the session's message log and its metadata entry.
    pub async fn delete_session(&self, user_id: i64, session_id: &str) -> Result<(), StorageError> {
        let mut sessions = self.list_sessions(user_id).await?;
        sessions.retain(|s| s.id != session_id);

        self.store
            .write_batch(vec![
                WriteOp::remove(keys::chat_messages(user_id, session_id)),
                WriteOp::set_json(keys::chat_sessions(user_id), &sessions)?,
            ])
            .await?;
        tracing::debug!(user_id, session_id, "chat session deleted");
        Ok(())
    }
}
