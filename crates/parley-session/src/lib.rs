//! # parley-session
//!
//! Conversation state for multi-turn inference.
//!
//! - [`ConversationWindow`]: the last [`WINDOW_CAPACITY`] segments of a conversation
//! - [`SessionStore`]: token → entry map with one idle deadline per token
//! - [`Clock`]: time source, swappable for [`ManualClock`] in tests

pub mod clock;
pub mod store;
pub mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{SessionEntry, SessionStore, SessionToken, DEFAULT_IDLE_TIMEOUT};
pub use window::{ConversationWindow, WINDOW_CAPACITY};
