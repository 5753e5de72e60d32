use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::extraction::dictionary::DictionarySkillExtractor;
use crate::extraction::prompts::{EXTRACT_SKILLS_PROMPT, MAX_INPUT_CHARS};
use crate::extraction::SkillExtractor;
use crate::llm_client::prompts::{fill, truncate_chars};
use crate::llm_client::{strip_json_fences, LlmClient, LlmError, DEFAULT_MAX_OUTPUT_TOKENS};

/// Gemini-backed extractor. Any model failure falls back to the
/// dictionary scan so extraction never fails a request.
pub struct LlmSkillExtractor {
    llm: LlmClient,
    fallback: Arc<DictionarySkillExtractor>,
}

impl LlmSkillExtractor {
    pub fn new(llm: LlmClient, fallback: Arc<DictionarySkillExtractor>) -> Self {
        Self { llm, fallback }
    }

    async fn ask(&self, text: &str) -> Result<Vec<Value>, LlmError> {
        let prompt = fill(
            EXTRACT_SKILLS_PROMPT,
            &[("text", truncate_chars(text, MAX_INPUT_CHARS))],
        );
        let raw = self.llm.call(&prompt, None, DEFAULT_MAX_OUTPUT_TOKENS).await?;
        debug!(response = %truncate_chars(&raw, 300), "Raw skills response");
        Ok(parse_skill_list(&raw))
    }
}

#[async_trait]
impl SkillExtractor for LlmSkillExtractor {
    async fn extract(&self, text: &str) -> Vec<Value> {
        match self.ask(text).await {
            Ok(skills) => skills,
            Err(e) => {
                warn!("LLM skill extraction failed, using dictionary scan: {e}");
                self.fallback.extract(text).await
            }
        }
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

/// Reads the model's answer as a JSON array, or failing that as a
/// comma/newline separated list.
pub fn parse_skill_list(raw: &str) -> Vec<Value> {
    let raw = strip_json_fences(raw);

    if raw.starts_with('[') && raw.ends_with(']') {
        if let Ok(items) = serde_json::from_str::<Vec<Value>>(raw) {
            return items;
        }
        return split_list(&raw[1..raw.len() - 1]);
    }
    split_list(raw)
}

fn split_list(raw: &str) -> Vec<Value> {
    raw.split([',', '\n'])
        .map(|item| item.trim().trim_matches(|c: char| c == '"' || c == '\'').trim())
        .filter(|item| !item.is_empty())
        .map(|item| Value::String(item.to_string()))
        .collect()
}
