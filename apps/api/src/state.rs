use std::sync::Arc;

use crate::config::Config;
use crate::engine::ScoringEngine;
use crate::explain::{Explainer, LlmExplainer, TemplateExplainer};
use crate::extraction::{DictionarySkillExtractor, LlmSkillExtractor, SkillExtractor};
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub engine: Arc<ScoringEngine>,
    /// Pluggable skill extractor. Dictionary scan by default, Gemini when configured.
    pub extractor: Arc<dyn SkillExtractor>,
    /// Used when the configured extractor overruns its time box.
    pub fallback_extractor: Arc<DictionarySkillExtractor>,
    pub explainer: Arc<dyn Explainer>,
}

impl AppState {
    /// Wires the collaborators: LLM-backed when a client is given,
    /// deterministic otherwise.
    pub fn new(config: Config, engine: ScoringEngine, llm: Option<LlmClient>) -> Self {
        let dictionary = Arc::new(DictionarySkillExtractor::new(engine.config()));

        let extractor: Arc<dyn SkillExtractor>;
        let explainer: Arc<dyn Explainer>;
        match llm {
            Some(llm) => {
                extractor = Arc::new(LlmSkillExtractor::new(llm.clone(), dictionary.clone()));
                explainer = Arc::new(LlmExplainer(llm));
            }
            None => {
                extractor = dictionary.clone();
                explainer = Arc::new(TemplateExplainer);
            }
        }

        Self {
            config,
            engine: Arc::new(engine),
            extractor,
            fallback_extractor: dictionary,
            explainer,
        }
    }
}
