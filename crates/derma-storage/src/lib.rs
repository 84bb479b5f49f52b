mod cart_store;
mod chat_store;
mod database;
pub mod keys;
mod kv;
mod session_store;


pub use cart_store::CartStore;
pub use chat_store::ChatStore;
pub use database::Database;
pub use kv::{KeyValueStore, MemoryStore, WriteOp};
pub use session_store::SessionStore;

use std::sync::Arc;

/// Handle to the durable store with accessors for each typed store.
#[derive(Clone)]
pub struct Storage {
    store: Arc<dyn KeyValueStore>,
}

impl Storage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn session(&self) -> SessionStore {
        SessionStore::new(self.store.clone())
    }

    pub fn carts(&self) -> CartStore {
        CartStore::new(self.store.clone())
    }

    pub fn chats(&self) -> ChatStore {
        ChatStore::new(self.store.clone())
    }
}
