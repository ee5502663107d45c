//! One conversational turn, end to end.
//!
//! The session store is read once before generation and written once after
//! it; no store lock is held while the model runs. Generation itself runs on
//! tokio's blocking pool since a model call can take arbitrarily long.

use std::collections::BTreeMap;
use std::sync::Arc;

use parley_engine::{ModelId, ModelRegistry, SamplingParams, Segment};
use parley_session::{ConversationWindow, SessionEntry, SessionStore, SessionToken};
use serde::Serialize;

use crate::error::{ChatError, Result};

/// Everything needed for one turn.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub model_id: ModelId,
    /// Token from a previous reply; `None` starts a new conversation.
    pub token: Option<String>,
    pub query: String,
    pub params: SamplingParams,
}

/// The outcome of one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnReply {
    #[serde(rename = "response")]
    pub reply: String,
    pub chat_round: u64,
    pub parameters: SamplingParams,
    /// Set only when this turn started a new conversation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<SessionToken>,
}

/// Drives turns against a model registry and a session store.
#[derive(Clone)]
pub struct Conversations {
    registry: ModelRegistry,
    sessions: Arc<SessionStore>,
}

impl Conversations {
    pub fn new(registry: ModelRegistry, sessions: Arc<SessionStore>) -> Self {
        Self { registry, sessions }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Model id → display name.
    pub fn list_models(&self) -> BTreeMap<ModelId, String> {
        self.registry.list()
    }

    /// Run one turn.
    ///
    /// An unknown or expired token is not an error: the turn simply starts a
    /// new conversation and the reply carries the new token. Nothing is
    /// written to the session store unless generation and decoding succeed.
    pub async fn converse(&self, request: TurnRequest) -> Result<TurnReply> {
        let TurnRequest {
            model_id,
            token,
            query,
            params,
        } = request;

        let entry = self
            .registry
            .lookup(model_id)
            .ok_or(ChatError::ModelNotFound(model_id))?;
        params.validate()?;
        let model = Arc::clone(&entry.model);

        let query_segment = model.encode(&query)?;

        let existing = match token {
            Some(token) => self
                .sessions
                .get(&token)
                .await
                .map(|session| (token, session)),
            None => None,
        };

        let (mut window, turn_count, live_token, input) = match existing {
            Some((token, session)) => {
                let mut window = session.window;
                window.append(query_segment.clone());
                let input = window.concat().unwrap_or(query_segment);
                (window, session.turn_count, Some(token), input)
            }
            None => {
                let mut window = ConversationWindow::new();
                window.append(query_segment.clone());
                (window, 0, None, query_segment)
            }
        };

        tracing::debug!(
            model_id,
            continuation = live_token.is_some(),
            input_len = input.len(),
            "running generation"
        );

        let outcome = tokio::task::spawn_blocking(move || {
            let raw = model.generate(&input, &params)?;
            // Models echo their input ahead of the new tokens.
            let reply_segment: Segment = raw.suffix_from(input.len());
            let reply = model.decode(&reply_segment)?;
            Ok::<_, ChatError>((reply_segment, reply))
        })
        .await
        .unwrap_or_else(|e| Err(ChatError::Generation(format!("generation task failed: {e}"))));

        let (reply_segment, reply) = match outcome {
            Ok(done) => done,
            Err(err) => {
                tracing::error!(model_id, error = %err, "generation failed");
                return Err(err);
            }
        };

        window.append(reply_segment);
        let next = SessionEntry {
            window,
            turn_count: turn_count + 1,
        };

        let new_token = match live_token {
            Some(token) => {
                if !self.sessions.update(&token, next).await {
                    tracing::warn!(
                        token = %token,
                        "session expired during generation; turn not retained"
                    );
                }
                None
            }
            None => Some(self.sessions.create_with(next).await),
        };

        Ok(TurnReply {
            reply,
            chat_round: turn_count + 1,
            parameters: params,
            token: new_token,
        })
    }
}
