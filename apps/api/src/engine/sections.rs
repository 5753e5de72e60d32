//! Section Scorer: heuristic ATS rubric per résumé section.
//!
//! Every section yields an integer score in [0, 100] plus one non-empty
//! feedback sentence. Rubric constants live in `EngineConfig::rubric`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::engine::config::EngineConfig;
use crate::engine::impact::{check_impact, quantified_ratio};
use crate::engine::resume::{EducationEntry, ResumeProfile};
use crate::engine::text::{find_term, fold_text};

/// The fixed enumeration of scored sections. Declaration order is the
/// order of the report and of improvement suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    ContactInfo,
    WorkExperience,
    Education,
    Skills,
    Keywords,
    Formatting,
}

impl SectionKey {
    pub const ALL: [SectionKey; 6] = [
        SectionKey::ContactInfo,
        SectionKey::WorkExperience,
        SectionKey::Education,
        SectionKey::Skills,
        SectionKey::Keywords,
        SectionKey::Formatting,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKey::ContactInfo => "contact_info",
            SectionKey::WorkExperience => "work_experience",
            SectionKey::Education => "education",
            SectionKey::Skills => "skills",
            SectionKey::Keywords => "keywords",
            SectionKey::Formatting => "formatting",
        }
    }

    /// Human-readable label, as shown by the presentation layer.
    pub fn label(self) -> &'static str {
        match self {
            SectionKey::ContactInfo => "Contact Info",
            SectionKey::WorkExperience => "Work Experience",
            SectionKey::Education => "Education",
            SectionKey::Skills => "Skills",
            SectionKey::Keywords => "Keywords",
            SectionKey::Formatting => "Formatting",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionScore {
    pub score: u32,
    pub feedback: String,
}

impl SectionScore {
    fn new(raw: f64, feedback: impl Into<String>) -> Self {
        Self {
            score: clamp_score(raw),
            feedback: feedback.into(),
        }
    }
}

/// All six section scores, keyed in `SectionKey::ALL` order.
pub type SectionScores = IndexMap<SectionKey, SectionScore>;

pub fn score_all_sections(resume: &ResumeProfile, config: &EngineConfig) -> SectionScores {
    SectionKey::ALL
        .into_iter()
        .map(|key| (key, score_section(key, resume, config)))
        .collect()
}

pub fn score_section(key: SectionKey, resume: &ResumeProfile, config: &EngineConfig) -> SectionScore {
    match key {
        SectionKey::ContactInfo => score_contact(resume),
        SectionKey::WorkExperience => score_experience(resume, config),
        SectionKey::Education => score_education(resume, config),
        SectionKey::Skills => score_skills(resume, config),
        SectionKey::Keywords => score_keywords(resume, config),
        SectionKey::Formatting => score_formatting(resume, config),
    }
}

fn clamp_score(raw: f64) -> u32 {
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, 100.0).round() as u32
}

// ────────────────────────────────────────────────────────────────────────────
// contact_info: fraction of {name, email, phone, location} present
// ────────────────────────────────────────────────────────────────────────────

fn score_contact(resume: &ResumeProfile) -> SectionScore {
    let fields = resume.contact.fields();
    let present = fields.iter().filter(|(_, ok)| *ok).count();
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, ok)| !*ok)
        .map(|(name, _)| *name)
        .collect();

    let feedback = if missing.is_empty() {
        "All key contact details (name, email, phone, location) are present.".to_string()
    } else if present == 0 {
        "No contact details were found; add your name, email, phone and location.".to_string()
    } else {
        format!("Missing contact details: {}.", missing.join(", "))
    };

    SectionScore::new(present as f64 / fields.len() as f64 * 100.0, feedback)
}

// ────────────────────────────────────────────────────────────────────────────
// work_experience: dated entries, action-verb density, quantified bullets
// ────────────────────────────────────────────────────────────────────────────

fn score_experience(resume: &ResumeProfile, config: &EngineConfig) -> SectionScore {
    let rubric = &config.rubric.experience;
    let entries = &resume.experience;

    if entries.is_empty() {
        return SectionScore::new(
            0.0,
            "No work experience section was detected; add your roles with dates and achievements.",
        );
    }

    let dated = entries.iter().filter(|e| e.dates.is_some()).count() as f64 / entries.len() as f64;

    let bullets: Vec<String> = entries.iter().flat_map(|e| e.bullets.iter().cloned()).collect();
    let verb_ratio = if bullets.is_empty() {
        0.0
    } else {
        bullets
            .iter()
            .filter(|b| starts_with_action_verb(b, &rubric.action_verbs))
            .count() as f64
            / bullets.len() as f64
    };
    let quant_ratio = quantified_ratio(&bullets);

    let raw = dated * rubric.dated_points
        + verb_ratio * rubric.action_verb_points
        + quant_ratio * rubric.quantified_points;

    let mut issues = Vec::new();
    if dated < 1.0 {
        issues.push("add a date range to every role".to_string());
    }
    if bullets.is_empty() {
        issues.push("describe each role with achievement bullets".to_string());
    } else {
        if verb_ratio < 0.6 {
            issues.push("start more bullets with strong action verbs".to_string());
        }
        if quant_ratio < 0.5 {
            let vague = bullets
                .iter()
                .flat_map(|b| check_impact(b).vague_terms)
                .next();
            issues.push(match vague {
                Some(word) => format!("replace vague wording like '{word}' with measurable results"),
                None => "quantify more achievements with numbers or percentages".to_string(),
            });
        }
    }

    let feedback = if issues.is_empty() {
        format!(
            "Strong experience section: {} dated role(s) with action-driven, quantified bullets.",
            entries.len()
        )
    } else {
        format!("To strengthen your experience section, {}.", issues.join("; "))
    };

    SectionScore::new(raw, feedback)
}

fn starts_with_action_verb(bullet: &str, verbs: &[String]) -> bool {
    bullet
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphabetic()))
        .find(|w| !w.is_empty())
        .map(str::to_lowercase)
        .is_some_and(|first| verbs.iter().any(|v| *v == first))
}

// ────────────────────────────────────────────────────────────────────────────
// education: degree / institution / date of the most complete entry
// ────────────────────────────────────────────────────────────────────────────

fn score_education(resume: &ResumeProfile, config: &EngineConfig) -> SectionScore {
    let rubric = &config.rubric.education;
    let entry_score = |e: &EducationEntry| {
        let mut points = 0.0;
        if e.degree.is_some() {
            points += rubric.degree_points;
        }
        if e.institution.is_some() {
            points += rubric.institution_points;
        }
        if e.date.is_some() {
            points += rubric.date_points;
        }
        points
    };

    let Some(best) = resume
        .education
        .iter()
        .max_by(|a, b| entry_score(a).total_cmp(&entry_score(b)))
    else {
        return SectionScore::new(
            0.0,
            "No education section was detected; list your degree, institution and graduation date.",
        );
    };

    let missing: Vec<&str> = [
        ("degree", best.degree.is_some()),
        ("institution", best.institution.is_some()),
        ("graduation date", best.date.is_some()),
    ]
    .into_iter()
    .filter(|(_, ok)| !*ok)
    .map(|(name, _)| name)
    .collect();

    let feedback = if missing.is_empty() {
        "Education entry lists degree, institution and date clearly.".to_string()
    } else {
        format!("Education entry is missing: {}.", missing.join(", "))
    };

    SectionScore::new(entry_score(best), feedback)
}

// ────────────────────────────────────────────────────────────────────────────
// skills: count against a minimum plus category diversity
// ────────────────────────────────────────────────────────────────────────────

fn score_skills(resume: &ResumeProfile, config: &EngineConfig) -> SectionScore {
    let rubric = &config.rubric.skills;
    let count = resume.skills.len();

    let mut categories: Vec<&str> = resume
        .skills
        .iter()
        .filter_map(|s| config.category_of(s.canonical()))
        .collect();
    categories.sort_unstable();
    categories.dedup();

    let count_part = saturating_ratio(count, rubric.min_skills);
    let diversity_part = saturating_ratio(categories.len(), rubric.target_categories);
    let raw = count_part * rubric.count_points + diversity_part * rubric.diversity_points;

    let feedback = if count == 0 {
        "No skills were detected; add a dedicated Skills section listing your tools and technologies."
            .to_string()
    } else if count < rubric.min_skills {
        format!(
            "Only {count} skill(s) detected; aim for at least {} relevant skills.",
            rubric.min_skills
        )
    } else if categories.len() < rubric.target_categories {
        format!(
            "{count} skills found, but they cover only {} categor{}; broaden across languages, frameworks and tools.",
            categories.len(),
            if categories.len() == 1 { "y" } else { "ies" }
        )
    } else {
        format!(
            "Well-stocked skills section: {count} skills across {} categories.",
            categories.len()
        )
    };

    SectionScore::new(raw, feedback)
}

/// `value / target`, capped at 1. A zero target counts as satisfied.
fn saturating_ratio(value: usize, target: usize) -> f64 {
    if target == 0 {
        return 1.0;
    }
    (value as f64 / target as f64).min(1.0)
}

// ────────────────────────────────────────────────────────────────────────────
// keywords: generic ATS keyword coverage (not job-specific)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordCoverage {
    pub found: Vec<String>,
    pub missing: Vec<String>,
}

/// Splits the configured ATS keyword list into found / missing, in list order.
pub fn keyword_coverage(resume: &ResumeProfile, config: &EngineConfig) -> KeywordCoverage {
    let folded = fold_text(&resume.body);
    let mut coverage = KeywordCoverage::default();
    for keyword in &config.ats_keywords {
        let term = fold_text(keyword);
        if term.is_empty() {
            continue;
        }
        if find_term(&folded, &term).is_some() {
            coverage.found.push(keyword.clone());
        } else {
            coverage.missing.push(keyword.clone());
        }
    }
    coverage
}

fn score_keywords(resume: &ResumeProfile, config: &EngineConfig) -> SectionScore {
    let coverage = keyword_coverage(resume, config);
    let target = config.rubric.keywords.target_hits;
    let raw = saturating_ratio(coverage.found.len(), target) * 100.0;

    let feedback = if coverage.found.len() >= target {
        format!(
            "Good keyword coverage: {} common ATS keywords found.",
            coverage.found.len()
        )
    } else if coverage.found.is_empty() {
        "None of the common ATS keywords were found; weave terms like collaboration or leadership into your bullets."
            .to_string()
    } else {
        let examples: Vec<&str> = coverage.missing.iter().take(3).map(String::as_str).collect();
        format!(
            "Only {} of {target} target ATS keywords found; consider adding: {}.",
            coverage.found.len(),
            examples.join(", ")
        )
    };

    SectionScore::new(raw, feedback)
}

// ────────────────────────────────────────────────────────────────────────────
// formatting: deductions for structures that break ATS parsers
// ────────────────────────────────────────────────────────────────────────────

fn score_formatting(resume: &ResumeProfile, config: &EngineConfig) -> SectionScore {
    let rubric = &config.rubric.formatting;
    let meta = &resume.formatting;
    let mut raw = 100.0;
    let mut issues = Vec::new();

    let missing_headings = meta.missing_required_headings();
    if !missing_headings.is_empty() {
        raw -= rubric.missing_header_penalty * missing_headings.len() as f64;
        let labels: Vec<&str> = missing_headings.iter().map(|h| h.label()).collect();
        issues.push(format!("missing standard headers ({})", labels.join(", ")));
    }
    if meta.has_tables {
        raw -= rubric.table_penalty;
        issues.push("tables detected".to_string());
    }
    if meta.has_images {
        raw -= rubric.image_penalty;
        issues.push("embedded images detected".to_string());
    }
    if meta.has_multi_column {
        raw -= rubric.column_penalty;
        issues.push("multi-column layout detected".to_string());
    }
    if meta.nonstandard_glyphs > 0 {
        raw -= rubric.glyph_penalty;
        issues.push("icon or symbol characters that parsers may garble".to_string());
    }
    if meta.date_formats.len() > 1 {
        raw -= rubric.date_format_penalty;
        issues.push("inconsistent date formats".to_string());
    }
    if meta.word_count < rubric.min_words {
        raw -= rubric.length_penalty;
        issues.push(format!("too little text ({} words)", meta.word_count));
    } else if meta.word_count > rubric.max_words {
        raw -= rubric.length_penalty;
        issues.push(format!("overly long ({} words)", meta.word_count));
    }

    let feedback = if issues.is_empty() {
        "Clean, ATS-friendly structure with standard headers and consistent dates.".to_string()
    } else {
        format!("Formatting issues: {}.", issues.join("; "))
    };

    SectionScore::new(raw, feedback)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
