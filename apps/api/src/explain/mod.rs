//! Match explanation: pluggable collaborator producing human-readable text
//! for a computed match. It only ever adds text; scores are never touched.
//!
//! Default: `TemplateExplainer`. With `GEMINI_API_KEY` set: `LlmExplainer`.
//! Handlers degrade any failure to an empty explanation.

mod prompts;

use async_trait::async_trait;

use crate::engine::matcher::MatchResult;
use crate::engine::normalize::SkillSet;
use crate::engine::report::Explanation;
use crate::explain::prompts::EXPLAIN_MATCH_PROMPT;
use crate::llm_client::prompts::{fill, JSON_ONLY_SYSTEM};
use crate::llm_client::{strip_json_fences, LlmClient, DEFAULT_MAX_OUTPUT_TOKENS};

/// Reasons listed by the deterministic explainer.
const MAX_REASONS: usize = 3;
/// Skills named inline before the list is shortened.
const MAX_NAMED: usize = 5;

#[async_trait]
pub trait Explainer: Send + Sync {
    async fn explain(
        &self,
        resume_skills: &SkillSet,
        job_skills: &SkillSet,
        result: &MatchResult,
    ) -> anyhow::Result<Explanation>;

    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// TemplateExplainer
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic explanation built from the match numbers.
pub struct TemplateExplainer;

#[async_trait]
impl Explainer for TemplateExplainer {
    async fn explain(
        &self,
        resume_skills: &SkillSet,
        job_skills: &SkillSet,
        result: &MatchResult,
    ) -> anyhow::Result<Explanation> {
        Ok(template_explanation(resume_skills, job_skills, result))
    }

    fn backend(&self) -> &'static str {
        "template"
    }
}

fn template_explanation(
    resume_skills: &SkillSet,
    job_skills: &SkillSet,
    result: &MatchResult,
) -> Explanation {
    if job_skills.is_empty() {
        return Explanation {
            explanation: "No required skills were identified in the job description, so the match cannot be assessed."
                .to_string(),
            reasons: Vec::new(),
        };
    }

    let explanation = format!(
        "The résumé covers {} of {} required skills ({}%), a {}.",
        result.matched.len(),
        result.job_count,
        result.score,
        result.verdict().label().to_lowercase()
    );

    let mut reasons = Vec::new();
    if !result.matched.is_empty() {
        reasons.push(format!("Has {}", name_list(&result.matched)));
    }
    if !result.missing.is_empty() {
        reasons.push(format!("Missing {}", name_list(&result.missing)));
    }
    let extras = resume_skills.difference(job_skills);
    if !extras.is_empty() {
        reasons.push(format!(
            "Brings {} additional skill{} not requested: {}",
            extras.len(),
            if extras.len() == 1 { "" } else { "s" },
            name_list(&extras)
        ));
    }
    if resume_skills.is_empty() {
        reasons.push("No skills could be identified in the résumé".to_string());
    }
    reasons.truncate(MAX_REASONS);

    Explanation {
        explanation,
        reasons,
    }
}

fn name_list(skills: &SkillSet) -> String {
    let names = skills.display_names();
    if names.len() <= MAX_NAMED {
        return names.join(", ");
    }
    format!(
        "{} and {} more",
        names[..MAX_NAMED].join(", "),
        names.len() - MAX_NAMED
    )
}

// ────────────────────────────────────────────────────────────────────────────
// LlmExplainer
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmExplainer(pub LlmClient);

#[async_trait]
impl Explainer for LlmExplainer {
    async fn explain(
        &self,
        resume_skills: &SkillSet,
        job_skills: &SkillSet,
        result: &MatchResult,
    ) -> anyhow::Result<Explanation> {
        let score = result.score.to_string();
        let prompt = fill(
            EXPLAIN_MATCH_PROMPT,
            &[
                ("resume_skills", &resume_skills.display_names().join(", ")),
                ("job_skills", &job_skills.display_names().join(", ")),
                ("matched", &result.matched.display_names().join(", ")),
                ("missing", &result.missing.display_names().join(", ")),
                ("score", &score),
            ],
        );
        let raw = self
            .0
            .call(&prompt, Some(JSON_ONLY_SYSTEM), DEFAULT_MAX_OUTPUT_TOKENS)
            .await?;
        parse_explanation(&raw)
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

/// A JSON object is read as `{explanation, reasons}`; any other answer is
/// taken verbatim as the explanation.
pub fn parse_explanation(raw: &str) -> anyhow::Result<Explanation> {
    let raw = strip_json_fences(raw);
    if raw.starts_with('{') {
        return Ok(serde_json::from_str(raw)?);
    }
    Ok(Explanation {
        explanation: raw.to_string(),
        reasons: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::matcher::{match_skills, HeadlinePolicy};
    use crate::engine::normalize::{normalize, SynonymTable};

    fn set(items: &[&str]) -> SkillSet {
        normalize(items, &SynonymTable::default())
    }

    #[tokio::test]
    async fn test_template_explanation_names_matched_and_missing() {
        let resume = set(&["Python", "SQL", "Git"]);
        let job = set(&["python", "sql", "docker"]);
        let result = match_skills(&resume, &job, HeadlinePolicy::Recall);

        let e = TemplateExplainer.explain(&resume, &job, &result).await.unwrap();
        assert_eq!(
            e.explanation,
            "The résumé covers 2 of 3 required skills (67%), a good match."
        );
        assert_eq!(
            e.reasons,
            vec![
                "Has python, sql",
                "Missing docker",
                "Brings 1 additional skill not requested: Git"
            ]
        );
    }

    #[tokio::test]
    async fn test_template_explanation_for_empty_job() {
        let resume = set(&["rust"]);
        let job = SkillSet::new();
        let result = match_skills(&resume, &job, HeadlinePolicy::Recall);
        let e = TemplateExplainer.explain(&resume, &job, &result).await.unwrap();
        assert!(e.explanation.contains("No required skills"));
        assert!(e.reasons.is_empty());
    }

    #[tokio::test]
    async fn test_template_explanation_for_empty_resume() {
        let resume = SkillSet::new();
        let job = set(&["java"]);
        let result = match_skills(&resume, &job, HeadlinePolicy::Recall);
        let e = TemplateExplainer.explain(&resume, &job, &result).await.unwrap();
        assert!(e.explanation.contains("0 of 1"));
        assert_eq!(e.reasons.len(), 2);
    }

    #[test]
    fn test_name_list_shortens_long_lists() {
        let skills = set(&["a1", "a2", "a3", "a4", "a5", "a6", "a7"]);
        assert_eq!(name_list(&skills), "a1, a2, a3, a4, a5 and 2 more");
    }

    #[test]
    fn test_parse_explanation_json_and_text() {
        let e = parse_explanation("```json\n{\"explanation\": \"Fit.\", \"reasons\": [\"a\"]}\n```")
            .unwrap();
        assert_eq!(e.explanation, "Fit.");
        assert_eq!(e.reasons, vec!["a"]);

        let e = parse_explanation("Strong backend overlap.").unwrap();
        assert_eq!(e.explanation, "Strong backend overlap.");
        assert!(e.reasons.is_empty());
    }

    #[test]
    fn test_parse_explanation_rejects_broken_json() {
        assert!(parse_explanation("{\"explanation\": ").is_err());
    }
}
