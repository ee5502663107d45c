//! Built-in model loader.

use std::path::Path;
use std::sync::Arc;

use parley_engine::{ChatModel, EngineError, ModelLoader, ModelRecord, Result};
use parley_tokenizer::WhitespaceTokenizer;

use crate::tiny::{mix, TinyChatModel, DEFAULT_MAX_NEW_TOKENS};

/// Builds a [`TinyChatModel`] per catalog record.
///
/// `tokenizer_path` names a vocabulary file (one token per line);
/// `model_path` names a weights file whose bytes seed the model. Both must
/// already exist locally.
#[derive(Debug, Clone)]
pub struct BuiltinLoader {
    pub max_new_tokens: usize,
}

impl Default for BuiltinLoader {
    fn default() -> Self {
        Self {
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
        }
    }
}

impl ModelLoader for BuiltinLoader {
    fn load(&self, record: &ModelRecord) -> Result<Arc<dyn ChatModel>> {
        if let Some(url) = &record.download_url {
            tracing::debug!(model_id = record.id, %url, "artifacts expected on disk; not downloading");
        }

        let tokenizer = WhitespaceTokenizer::from_vocab_file(Path::new(&record.tokenizer_path))
            .map_err(|e| EngineError::ModelLoad(format!("model {}: {e}", record.id)))?;

        let weights = std::fs::read(&record.model_path).map_err(|e| {
            EngineError::ModelLoad(format!(
                "model {}: cannot read {}: {e}",
                record.id, record.model_path
            ))
        })?;
        let seed = weights
            .iter()
            .fold(mix(record.id as u64), |acc, &b| mix(acc ^ b as u64));

        let model = TinyChatModel::new(tokenizer, seed).with_max_new_tokens(self.max_new_tokens);
        Ok(Arc::new(model))
    }
}
