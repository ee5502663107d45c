//! HTTP request handlers for API endpoints.

pub mod catalog;
pub mod generate;
pub mod health;
pub mod ratings;

pub use catalog::handle_get_models;
pub use generate::handle_generate;
pub use health::handle_health;
pub use ratings::{handle_get_ratings, handle_submit_rating};
