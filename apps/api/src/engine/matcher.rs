//! Set Matcher: compares normalized résumé skills against job skills.
//!
//! Algorithm:
//! 1. matched   = job ∩ résumé (canonical forms, job order, job display)
//! 2. missing   = job − matched
//! 3. precision = |matched| / |résumé|, recall = |matched| / |job|, F1
//! 4. score     = round(headline × 100), headline being recall by default
//!
//! Degenerate inputs (either side empty) produce a well-formed zero result.

use serde::{Deserialize, Serialize};

use crate::engine::normalize::SkillSet;

/// Which metric drives the headline `score`. Recall answers "do I have what
/// this job needs"; F1 additionally penalises unrelated résumé skills.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadlinePolicy {
    #[default]
    Recall,
    F1,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub matched: SkillSet,
    pub missing: SkillSet,
    /// 0 – 100
    pub score: u32,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub resume_count: usize,
    pub job_count: usize,
}

impl MatchResult {
    pub fn verdict(&self) -> MatchVerdict {
        MatchVerdict::from_score(self.score)
    }
}

/// Coarse label shown next to a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchVerdict {
    #[serde(rename = "Excellent Match")]
    Excellent,
    #[serde(rename = "Good Match")]
    Good,
    #[serde(rename = "Fair Match")]
    Fair,
    #[serde(rename = "Poor Match")]
    Poor,
}

impl MatchVerdict {
    pub fn from_score(score: u32) -> Self {
        if score >= 80 {
            MatchVerdict::Excellent
        } else if score >= 60 {
            MatchVerdict::Good
        } else if score >= 40 {
            MatchVerdict::Fair
        } else {
            MatchVerdict::Poor
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchVerdict::Excellent => "Excellent Match",
            MatchVerdict::Good => "Good Match",
            MatchVerdict::Fair => "Fair Match",
            MatchVerdict::Poor => "Poor Match",
        }
    }
}

pub fn match_skills(
    resume_skills: &SkillSet,
    job_skills: &SkillSet,
    policy: HeadlinePolicy,
) -> MatchResult {
    let matched = job_skills.intersection(resume_skills);
    let missing = job_skills.difference(&matched);

    let precision = ratio(matched.len(), resume_skills.len());
    let recall = ratio(matched.len(), job_skills.len());
    let f1 = harmonic_mean(precision, recall);

    let headline = match policy {
        HeadlinePolicy::Recall => recall,
        HeadlinePolicy::F1 => f1,
    };

    MatchResult {
        score: to_percent(headline),
        matched,
        missing,
        precision,
        recall,
        f1,
        resume_count: resume_skills.len(),
        job_count: job_skills.len(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Offline evaluation against a labelled skill set
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub predicted_matched: SkillSet,
    pub ground_truth: SkillSet,
    pub tp: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Scores a predicted matched set against the labelled ground truth.
pub fn evaluate_against_ground_truth(
    predicted: &SkillSet,
    ground_truth: &SkillSet,
) -> EvaluationReport {
    let tp = predicted.intersection(ground_truth).len();
    let fp = predicted.len() - tp;
    let fn_ = ground_truth.len() - tp;

    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);

    EvaluationReport {
        predicted_matched: predicted.clone(),
        ground_truth: ground_truth.clone(),
        tp,
        fp,
        fn_,
        precision,
        recall,
        f1: harmonic_mean(precision, recall),
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn harmonic_mean(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

fn to_percent(fraction: f64) -> u32 {
    (fraction * 100.0).round().clamp(0.0, 100.0) as u32
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
