use derma_core::error::StorageError;
use derma_core::user::User;
use std::sync::Arc;

use crate::keys;
use crate::kv::{read_json, KeyValueStore, WriteOp};

/// The logged-in user and their bearer token.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The saved user, if any. A corrupt entry is removed and reads as logged out.
    pub async fn load(&self) -> Result<Option<User>, StorageError> {
        read_json(self.store.as_ref(), keys::USER).await
    }

    pub async fn token(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .store
            .get(keys::TOKEN)
            .await?
            .filter(|t| !t.is_empty()))
    }

    pub async fn save(&self, user: &User, token: &str) -> Result<(), StorageError> {
        self.store
            .write_batch(vec![
                WriteOp::set(keys::TOKEN, token),
                WriteOp::set_json(keys::USER, user)?,
            ])
            .await?;
        tracing::debug!(user_id = user.id, "session saved");
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), StorageError> {
        self.store
            .write_batch(vec![WriteOp::remove(keys::TOKEN), WriteOp::remove(keys::USER)])
            .await
    }
}
