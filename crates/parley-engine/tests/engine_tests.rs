//! Integration tests for parley-engine core trait and types.
//!
//! Validates:
//! - ChatModel can be implemented by mock backends and used as a trait object
//! - Error types display correctly and carry context
//! - Registry lookup, listing and bootstrap behave as a read-only map
//! - Core types satisfy required trait bounds (Send, Sync, Clone)

use parley_engine::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Mock Backends
// ---------------------------------------------------------------------------

/// Maps a fixed vocabulary; generation echoes the input and appends "llama".
struct VocabModel {
    vocab: Vec<&'static str>,
}

impl VocabModel {
    fn new() -> Self {
        Self {
            vocab: vec!["hello", "world", "the", "llama"],
        }
    }
}

impl ChatModel for VocabModel {
    fn encode(&self, text: &str) -> Result<Segment> {
        let tokens = text
            .split_whitespace()
            .map(|word| {
                self.vocab
                    .iter()
                    .position(|w| *w == word)
                    .map(|i| i as TokenId)
                    .ok_or_else(|| EngineError::Tokenization(format!("unknown word {word}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Segment::new(tokens))
    }

    fn generate(&self, input: &Segment, _params: &SamplingParams) -> Result<Segment> {
        if input.is_empty() {
            return Err(EngineError::Generation("empty prompt".to_string()));
        }
        let mut out = input.tokens().to_vec();
        out.push(3);
        Ok(Segment::new(out))
    }

    fn decode(&self, segment: &Segment) -> Result<String> {
        let words = segment
            .tokens()
            .iter()
            .map(|&id| {
                self.vocab
                    .get(id as usize)
                    .copied()
                    .ok_or_else(|| EngineError::Tokenization(format!("invalid id {id}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(words.join(" "))
    }
}

/// Always fails.
struct FailingModel;

impl ChatModel for FailingModel {
    fn encode(&self, _text: &str) -> Result<Segment> {
        Err(EngineError::Tokenization("no tokenizer loaded".to_string()))
    }

    fn generate(&self, _input: &Segment, _params: &SamplingParams) -> Result<Segment> {
        Err(EngineError::Generation("no model loaded".to_string()))
    }

    fn decode(&self, _segment: &Segment) -> Result<String> {
        Err(EngineError::Tokenization("no tokenizer loaded".to_string()))
    }
}

/// Loader that counts calls and rejects records with an empty model path.
#[derive(Default)]
struct CountingLoader {
    calls: AtomicUsize,
}

impl ModelLoader for CountingLoader {
    fn load(&self, record: &ModelRecord) -> Result<Arc<dyn ChatModel>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if record.model_path.is_empty() {
            return Err(EngineError::ModelLoad(format!(
                "model {} has no weights path",
                record.id
            )));
        }
        Ok(Arc::new(VocabModel::new()))
    }
}

fn record(id: ModelId, name: &str, model_path: &str) -> ModelRecord {
    ModelRecord {
        id,
        name: name.to_string(),
        download_url: None,
        tokenizer_path: format!("/models/{name}/tokenizer"),
        model_path: model_path.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Trait Implementation Tests
// ---------------------------------------------------------------------------

#[test]
fn vocab_model_roundtrip() {
    let model = VocabModel::new();
    let seg = model.encode("hello world").unwrap();
    assert_eq!(seg.tokens(), &[0, 1]);
    assert_eq!(model.decode(&seg).unwrap(), "hello world");
}

#[test]
fn vocab_model_unknown_word_errors() {
    let model = VocabModel::new();
    let err = model.encode("hello unknown").unwrap_err();
    assert!(matches!(err, EngineError::Tokenization(_)));
}

#[test]
fn generation_echo_can_be_trimmed() {
    let model = VocabModel::new();
    let input = model.encode("the world").unwrap();
    let raw = model
        .generate(&input, &SamplingParams::default())
        .unwrap();
    let reply = raw.suffix_from(input.len());
    assert_eq!(model.decode(&reply).unwrap(), "llama");
}

#[test]
fn trait_object_dispatch() {
    let models: Vec<Box<dyn ChatModel>> = vec![Box::new(VocabModel::new()), Box::new(FailingModel)];
    assert!(models[0].encode("hello").is_ok());
    assert!(models[1].encode("hello").is_err());
}

#[test]
fn failing_model_reports_generation_error() {
    let err = FailingModel
        .generate(&Segment::new(vec![1]), &SamplingParams::default())
        .unwrap_err();
    assert!(matches!(err, EngineError::Generation(_)));
}

// ---------------------------------------------------------------------------
// Error Display
// ---------------------------------------------------------------------------

#[test]
fn error_display_carries_context() {
    let cases = [
        (EngineError::ModelLoad("bad path".into()), "Model loading failed: bad path"),
        (EngineError::Tokenization("oops".into()), "Tokenization failed: oops"),
        (EngineError::Generation("oom".into()), "Generation failed: oom"),
        (
            EngineError::InvalidParams("top_p".into()),
            "Invalid sampling parameters: top_p",
        ),
    ];
    for (err, expected) in cases {
        assert_eq!(err.to_string(), expected);
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[test]
fn list_models_returns_names_only() {
    let registry = ModelRegistry::builder()
        .register(1, "Alpha", Arc::new(VocabModel::new()))
        .register(2, "Beta", Arc::new(FailingModel))
        .build();

    let listed = registry.list();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[&1], "Alpha");
    assert_eq!(listed[&2], "Beta");
}

#[test]
fn lookup_unknown_id_is_none() {
    let registry = ModelRegistry::builder()
        .register(1, "Alpha", Arc::new(VocabModel::new()))
        .build();
    assert!(registry.lookup(999).is_none());
    assert_eq!(registry.lookup(1).unwrap().name, "Alpha");
}

#[test]
fn bootstrap_loads_every_record() {
    let loader = CountingLoader::default();
    let records = vec![record(1, "Alpha", "/w/a"), record(2, "Beta", "/w/b")];
    let registry = ModelRegistry::bootstrap(&records, &loader).unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn bootstrap_failure_is_fatal() {
    let loader = CountingLoader::default();
    let records = vec![record(1, "Alpha", ""), record(2, "Beta", "/w/b")];
    let err = ModelRegistry::bootstrap(&records, &loader).unwrap_err();
    assert!(matches!(err, EngineError::ModelLoad(_)));
    assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn bootstrap_rejects_duplicate_ids() {
    let loader = CountingLoader::default();
    let records = vec![record(1, "Alpha", "/w/a"), record(1, "Again", "/w/b")];
    let err = ModelRegistry::bootstrap(&records, &loader).unwrap_err();
    assert!(err.to_string().contains("duplicate model id 1"));
}

#[test]
fn empty_registry() {
    let registry = ModelRegistry::default();
    assert!(registry.is_empty());
    assert!(registry.list().is_empty());
}

// ---------------------------------------------------------------------------
// Trait Bounds
// ---------------------------------------------------------------------------

fn assert_send_sync<T: Send + Sync>() {}
fn assert_clone<T: Clone>() {}

#[test]
fn core_types_are_shareable() {
    assert_send_sync::<ModelRegistry>();
    assert_send_sync::<ModelEntry>();
    assert_send_sync::<Segment>();
    assert_send_sync::<SamplingParams>();
    assert_clone::<ModelRegistry>();
    assert_clone::<Segment>();
}

#[test]
fn sampling_params_serialize_with_snake_case_names() {
    let json = serde_json::to_value(SamplingParams::default()).unwrap();
    assert_eq!(json["max_length"], 1000);
    assert_eq!(json["do_sample"], false);
    assert_eq!(json["top_k"], 50);
    assert_eq!(json["top_p"], 1.0);
    assert_eq!(json["repetition_penalty"], 1.0);
}
