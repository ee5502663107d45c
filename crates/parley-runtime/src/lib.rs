//! # parley-runtime
//!
//! Concrete [`ChatModel`](parley_engine::ChatModel) implementations and the
//! loader that turns catalog records into them.
//!
//! - [`MockModel`]: deterministic canned replies, for tests and demos
//! - [`TinyChatModel`]: word-level tokenizer plus seeded pseudo-logits, driven
//!   through the real sampler so every sampling parameter has an effect
//! - [`BuiltinLoader`]: builds a `TinyChatModel` from a vocabulary file and a
//!   weights file already present on disk

pub mod loader;
pub mod mock;
pub mod tiny;

pub use loader::BuiltinLoader;
pub use mock::MockModel;
pub use tiny::TinyChatModel;
