// Skill Matching & ATS Scoring Engine.
// Pure, synchronous and stateless between calls: every operation is a function
// of its explicit inputs plus the configuration loaded once at startup.
// All I/O (document loading, LLM collaborators) happens in the callers.

pub mod config;
pub mod grading;
pub mod impact;
pub mod matcher;
pub mod normalize;
pub mod report;
pub mod resume;
pub mod sections;
pub mod text;

use serde_json::Value;
use thiserror::Error;

use crate::engine::config::EngineConfig;
use crate::engine::grading::aggregate;
use crate::engine::matcher::{evaluate_against_ground_truth, match_skills, EvaluationReport, MatchResult};
use crate::engine::normalize::{normalize_values, SkillSet};
use crate::engine::report::{assemble_ats_report, AtsReport};
use crate::engine::resume::ResumeProfile;
use crate::engine::sections::score_all_sections;

/// Engine-level errors. These are configuration contract violations and are
/// only raised while loading configuration at startup.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Section weights must be finite and non-negative (got {key} = {value})")]
    NegativeWeight { key: &'static str, value: f64 },

    #[error("Section weights must sum to 1 (got {0})")]
    WeightSum(f64),

    #[error("Synonym table contains a cycle through '{0}'")]
    SynonymCycle(String),

    #[error("Failed to read scoring configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid scoring configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The engine entry point held by the HTTP layer.
/// Cheap to share: it owns only immutable configuration.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: EngineConfig,
}

impl ScoringEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[cfg(test)]
    pub fn normalize<I, S>(&self, raw: I) -> SkillSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        normalize::normalize(raw, &self.config.synonyms)
    }

    pub fn normalize_values(&self, raw: &[Value]) -> SkillSet {
        normalize_values(raw, &self.config.synonyms)
    }

    pub fn match_skills(&self, resume_skills: &SkillSet, job_skills: &SkillSet) -> MatchResult {
        match_skills(resume_skills, job_skills, self.config.headline_policy)
    }

    pub fn score_resume(&self, resume: &ResumeProfile) -> AtsReport {
        let sections = score_all_sections(resume, &self.config);
        let (overall_score, grade) = aggregate(&sections, &self.config.section_weights);
        assemble_ats_report(resume, sections, overall_score, grade, &self.config)
    }

    pub fn evaluate(&self, predicted: &SkillSet, ground_truth: &SkillSet) -> EvaluationReport {
        evaluate_against_ground_truth(predicted, ground_truth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::grading::Grade;

    fn engine() -> ScoringEngine {
        ScoringEngine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ScoringEngine::new(EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_scenario_partial_overlap() {
        let e = engine();
        let resume = e.normalize(["Python", "SQL", "Git"]);
        let job = e.normalize(["python", "sql", "docker"]);
        let result = e.match_skills(&resume, &job);
        assert_eq!(result.matched.display_names(), vec!["python", "sql"]);
        assert_eq!(result.missing.display_names(), vec!["docker"]);
        assert!((result.recall - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(result.score, 67);
    }

    #[test]
    fn test_scenario_empty_resume() {
        let e = engine();
        let resume = e.normalize(Vec::<String>::new());
        let job = e.normalize(["java"]);
        let result = e.match_skills(&resume, &job);
        assert!(result.matched.is_empty());
        assert_eq!(result.missing.canonical_names(), vec!["java"]);
        assert_eq!(result.score, 0);
        assert_eq!(result.precision, 0.0);
    }

    #[test]
    fn test_score_resume_always_reports_six_sections() {
        let report = engine().score_resume(&ResumeProfile::default());
        assert_eq!(report.sections.len(), 6);
        assert!(report.overall_score <= 100);
        assert_eq!(report.grade, Grade::F);
    }
}
