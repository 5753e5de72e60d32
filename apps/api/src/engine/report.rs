//! Report Assembler: shapes engine output into the response envelopes.
//!
//! Numeric fields are authoritative and always populated. Textual enrichment
//! from the explanation collaborator is merged in as-is and degrades to
//! empty values when unavailable; it never alters a computed score.

use serde::{Deserialize, Serialize};

use crate::engine::config::EngineConfig;
use crate::engine::grading::{improvements, Grade};
use crate::engine::matcher::{MatchResult, MatchVerdict};
use crate::engine::normalize::SkillSet;
use crate::engine::resume::ResumeProfile;
use crate::engine::sections::{keyword_coverage, SectionKey, SectionScores};

// ────────────────────────────────────────────────────────────────────────────
// Job match envelope
// ────────────────────────────────────────────────────────────────────────────

/// Explanation text from the explanation collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchPayload {
    pub matched_skills: SkillSet,
    pub missing_skills: SkillSet,
    pub score: u32,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub resume_count: usize,
    pub job_count: usize,
    pub verdict: MatchVerdict,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchEnvelope {
    pub resume_skills: SkillSet,
    pub job_skills: SkillSet,
    #[serde(rename = "match")]
    pub match_: MatchPayload,
    pub explain: Explanation,
}

/// Builds the `/match-job/` response. A missing explanation becomes an
/// empty one.
pub fn assemble_match(
    resume_skills: SkillSet,
    job_skills: SkillSet,
    result: MatchResult,
    explanation: Option<Explanation>,
) -> MatchEnvelope {
    let verdict = result.verdict();
    MatchEnvelope {
        resume_skills,
        job_skills,
        match_: MatchPayload {
            matched_skills: result.matched,
            missing_skills: result.missing,
            score: result.score,
            precision: result.precision,
            recall: result.recall,
            f1: result.f1,
            resume_count: result.resume_count,
            job_count: result.job_count,
            verdict,
        },
        explain: explanation.unwrap_or_default(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ATS report
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct AtsReport {
    pub overall_score: u32,
    pub grade: Grade,
    pub summary: String,
    pub sections: SectionScores,
    pub improvements: Vec<String>,
    pub keywords_found: Vec<String>,
    pub keywords_missing: Vec<String>,
}

pub fn assemble_ats_report(
    resume: &ResumeProfile,
    sections: SectionScores,
    overall_score: u32,
    grade: Grade,
    config: &EngineConfig,
) -> AtsReport {
    let coverage = keyword_coverage(resume, config);
    AtsReport {
        summary: build_summary(overall_score, grade, &sections),
        improvements: improvements(&sections, config),
        overall_score,
        grade,
        sections,
        keywords_found: coverage.found,
        keywords_missing: coverage.missing,
    }
}

/// One-paragraph summary naming the grade and the strongest/weakest sections.
/// Ties resolve to the earlier section in enumeration order.
fn build_summary(overall_score: u32, grade: Grade, sections: &SectionScores) -> String {
    let verdict = match grade {
        Grade::A => "Excellent ATS compatibility",
        Grade::B => "Good ATS compatibility",
        Grade::C => "Fair ATS compatibility",
        Grade::D => "Weak ATS compatibility",
        Grade::F => "Poor ATS compatibility",
    };

    let mut strongest: Option<(SectionKey, u32)> = None;
    let mut weakest: Option<(SectionKey, u32)> = None;
    for (&key, section) in sections {
        if strongest.map_or(true, |(_, s)| section.score > s) {
            strongest = Some((key, section.score));
        }
        if weakest.map_or(true, |(_, s)| section.score < s) {
            weakest = Some((key, section.score));
        }
    }

    match (strongest, weakest) {
        (Some((best, best_score)), Some((worst, worst_score))) if best_score != worst_score => {
            format!(
                "{verdict} ({overall_score}/100, grade {grade}). Strongest section: {} ({best_score}); weakest: {} ({worst_score}).",
                best.label(),
                worst.label()
            )
        }
        _ => format!("{verdict} ({overall_score}/100, grade {grade})."),
    }
}
