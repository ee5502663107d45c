//! # parley-chat
//!
//! The generation orchestrator. [`Conversations::converse`] turns one query
//! plus whatever context the session store holds into exactly one model
//! invocation and at most one session-store write.

pub mod error;
pub mod orchestrator;

pub use error::{ChatError, Result};
pub use orchestrator::{Conversations, TurnReply, TurnRequest};
