use derma_core::cart::CartItem;
use derma_core::error::StorageError;
use std::sync::Arc;

use crate::keys;
use crate::kv::{read_json, KeyValueStore, WriteOp};

/// Per-user cart kept in durable storage under `cart_{userId}`.
///
/// Every operation is a read-modify-write of the whole list and returns
/// the list as stored afterwards.
#[derive(Clone)]
pub struct CartStore {
    store: Arc<dyn KeyValueStore>,
}

impl CartStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self, user_id: i64) -> Result<Vec<CartItem>, StorageError> {
        Ok(read_json(self.store.as_ref(), &keys::cart(user_id))
            .await?
            .unwrap_or_default())
    }

    /// Adds one unit of `item`; an existing line with the same id is incremented.
    pub async fn add(&self, user_id: i64, item: CartItem) -> Result<Vec<CartItem>, StorageError> {
        let mut items = self.load(user_id).await?;
        match items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(1),
            None => items.push(CartItem { quantity: 1, ..item }),
        }
        self.save(user_id, &items).await?;
        Ok(items)
    }

    /// Changes a line's quantity by `delta`, never going below 1.
    pub async fn update_quantity(
        &self,
        user_id: i64,
        item_id: &str,
        delta: i64,
    ) -> Result<Vec<CartItem>, StorageError> {
        let mut items = self.load(user_id).await?;
        if let Some(item) = items.iter_mut().find(|i| i.id == item_id) {
            let next = i64::from(item.quantity)
                .saturating_add(delta)
                .clamp(1, i64::from(u32::MAX));
            item.quantity = next as u32;
        }
        self.save(user_id, &items).await?;
        Ok(items)
    }

    pub async fn remove(&self, user_id: i64, item_id: &str) -> Result<Vec<CartItem>, StorageError> {
        let mut items = self.load(user_id).await?;
        items.retain(|i| i.id != item_id);
        self.save(user_id, &items).await?;
        Ok(items)
    }

    pub async fn clear(&self, user_id: i64) -> Result<(), StorageError> {
        self.store.remove(&keys::cart(user_id)).await
    }

    async fn save(&self, user_id: i64, items: &[CartItem]) -> Result<(), StorageError> {
        self.store
            .write_batch(vec![WriteOp::set_json(keys::cart(user_id), items)?])
            .await
    }
}
