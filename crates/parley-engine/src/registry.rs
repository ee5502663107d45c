//! Read-only model registry.
//!
//! Populated once at startup, either from catalog records through a
//! [`ModelLoader`] or directly through a [`RegistryBuilder`]. After that it is
//! an immutable map shared by every request, so lookups need no locking.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::{ChatModel, EngineError, Result};

/// Numeric model identifier, as stored in the catalog.
pub type ModelId = i64;

/// One catalog row describing where a model's artifacts live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRecord {
    pub id: ModelId,
    pub name: String,
    /// Where the artifacts were published. Fetching is done out of band.
    pub download_url: Option<String>,
    pub tokenizer_path: String,
    pub model_path: String,
}

/// Turns a catalog record into a live model.
pub trait ModelLoader: Send + Sync {
    fn load(&self, record: &ModelRecord) -> Result<Arc<dyn ChatModel>>;
}

/// A registered model: display name plus its capability bundle.
#[derive(Clone)]
pub struct ModelEntry {
    pub id: ModelId,
    pub name: String,
    pub model: Arc<dyn ChatModel>,
}

impl fmt::Debug for ModelEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelEntry")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Immutable id → model mapping.
#[derive(Clone, Default, Debug)]
pub struct ModelRegistry {
    entries: Arc<BTreeMap<ModelId, ModelEntry>>,
}

impl ModelRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Load every catalog record. The first failure aborts the whole bootstrap.
    pub fn bootstrap(records: &[ModelRecord], loader: &dyn ModelLoader) -> Result<Self> {
        let mut builder = Self::builder();
        for record in records {
            if builder.entries.contains_key(&record.id) {
                return Err(EngineError::ModelLoad(format!(
                    "duplicate model id {} in catalog",
                    record.id
                )));
            }
            let model = loader.load(record)?;
            tracing::info!(model_id = record.id, name = %record.name, "model loaded");
            builder = builder.register(record.id, record.name.clone(), model);
        }
        Ok(builder.build())
    }

    pub fn lookup(&self, id: ModelId) -> Option<&ModelEntry> {
        self.entries.get(&id)
    }

    /// Display names only; capability bundles never leave the registry this way.
    pub fn list(&self) -> BTreeMap<ModelId, String> {
        self.entries
            .iter()
            .map(|(id, entry)| (*id, entry.name.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collects models before freezing them into a [`ModelRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    entries: BTreeMap<ModelId, ModelEntry>,
}

impl RegistryBuilder {
    /// Register a model. A later registration under the same id replaces the earlier one.
    pub fn register(
        mut self,
        id: ModelId,
        name: impl Into<String>,
        model: Arc<dyn ChatModel>,
    ) -> Self {
        let name = name.into();
        self.entries.insert(id, ModelEntry { id, name, model });
        self
    }

    pub fn build(self) -> ModelRegistry {
        ModelRegistry {
            entries: Arc::new(self.entries),
        }
    }
}
