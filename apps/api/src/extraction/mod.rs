//! Skill extraction: pluggable, trait-based collaborator that turns free text
//! into raw skill tokens.
//!
//! Default: `DictionarySkillExtractor` (deterministic vocabulary scan).
//! With `GEMINI_API_KEY` set: `LlmSkillExtractor`, which falls back to the
//! dictionary scan whenever the model call fails.
//!
//! `AppState` holds an `Arc<dyn SkillExtractor>`, chosen at startup.

pub mod dictionary;
pub mod document;
pub mod llm;
mod prompts;

use async_trait::async_trait;
use serde_json::Value;

pub use dictionary::DictionarySkillExtractor;
pub use document::{load_document, Document, DocumentKind};
pub use llm::LlmSkillExtractor;

/// The skill extractor trait. Implement this to swap backends without
/// touching the handlers.
///
/// Output is loosely typed: tokens that are not strings are legal here and
/// are dropped by the normalizer.
#[async_trait]
pub trait SkillExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Vec<Value>;

    /// Backend name for logs ("dictionary" | "llm").
    fn backend(&self) -> &'static str;
}
