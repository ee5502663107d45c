//! # parley-server
//!
//! HTTP API over [`parley_chat::Conversations`] and [`parley_store::SqliteStore`].
//!
//! Routes:
//! - `GET /generate` runs one conversational turn
//! - `GET /get_models` lists loaded models
//! - `POST /submit_rating` and `GET /get_ratings` store and read feedback
//! - `GET /health`

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod server;
pub mod state;

pub use config::ServerArgs;
pub use error::ServerError;
pub use server::{create_router, run_server};
pub use state::AppState;
