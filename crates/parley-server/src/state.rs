//! Application state shared across handlers.

use parley_chat::Conversations;
use parley_store::SqliteStore;

#[derive(Clone)]
pub struct AppState {
    /// Model registry plus live conversations.
    pub chat: Conversations,
    /// Catalog and ratings.
    pub store: SqliteStore,
}

impl AppState {
    pub fn new(chat: Conversations, store: SqliteStore) -> Self {
        Self { chat, store }
    }
}
