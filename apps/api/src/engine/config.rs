//! Engine configuration: synonym table, weights, rubric constants and
//! keyword lists, represented as data and loaded once at startup.
//!
//! Every field has a default, so a JSON override file only needs the keys it
//! changes. `EngineConfig::validate` enforces the weight contract.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::engine::matcher::HeadlinePolicy;
use crate::engine::normalize::SynonymTable;
use crate::engine::sections::SectionKey;
use crate::engine::EngineError;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub synonyms: SynonymTable,
    pub headline_policy: HeadlinePolicy,
    pub section_weights: SectionWeights,
    pub rubric: RubricConfig,
    /// Generic ATS keyword list for the `keywords` section. Not job-specific.
    pub ats_keywords: Vec<String>,
    /// Known skills by category. Drives dictionary extraction and the
    /// diversity part of the `skills` rubric.
    pub skill_vocabulary: IndexMap<String, Vec<String>>,
    /// Sections scoring below this produce an improvement suggestion.
    pub improvement_threshold: u32,
    pub improvement_templates: SectionTexts,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            synonyms: default_synonyms(),
            headline_policy: HeadlinePolicy::default(),
            section_weights: SectionWeights::default(),
            rubric: RubricConfig::default(),
            ats_keywords: to_strings(DEFAULT_ATS_KEYWORDS),
            skill_vocabulary: DEFAULT_VOCABULARY
                .iter()
                .map(|(category, skills)| (category.to_string(), to_strings(skills)))
                .collect(),
            improvement_threshold: 70,
            improvement_templates: SectionTexts::default_improvements(),
        }
    }
}

impl EngineConfig {
    /// Reads a JSON override file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.section_weights.validate()
    }

    /// Category a canonical skill belongs to, if it is in the vocabulary.
    pub fn category_of(&self, canonical: &str) -> Option<&str> {
        self.skill_vocabulary
            .iter()
            .find(|(_, skills)| skills.iter().any(|s| s == canonical))
            .map(|(category, _)| category.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Section weights
// ────────────────────────────────────────────────────────────────────────────

/// Weight per section for the overall ATS score. Must be non-negative and
/// sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionWeights {
    pub contact_info: f64,
    pub work_experience: f64,
    pub education: f64,
    pub skills: f64,
    pub keywords: f64,
    pub formatting: f64,
}

impl Default for SectionWeights {
    fn default() -> Self {
        Self {
            contact_info: 0.05,
            work_experience: 0.30,
            education: 0.15,
            skills: 0.25,
            keywords: 0.15,
            formatting: 0.10,
        }
    }
}

impl SectionWeights {
    #[cfg(test)]
    pub fn equal() -> Self {
        let w = 1.0 / 6.0;
        Self {
            contact_info: w,
            work_experience: w,
            education: w,
            skills: w,
            keywords: w,
            formatting: w,
        }
    }

    pub fn get(&self, key: SectionKey) -> f64 {
        match key {
            SectionKey::ContactInfo => self.contact_info,
            SectionKey::WorkExperience => self.work_experience,
            SectionKey::Education => self.education,
            SectionKey::Skills => self.skills,
            SectionKey::Keywords => self.keywords,
            SectionKey::Formatting => self.formatting,
        }
    }

    pub fn total(&self) -> f64 {
        SectionKey::ALL.iter().map(|&k| self.get(k)).sum()
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        for key in SectionKey::ALL {
            let value = self.get(key);
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::NegativeWeight {
                    key: key.as_str(),
                    value,
                });
            }
        }
        let total = self.total();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(EngineError::WeightSum(total));
        }
        Ok(())
    }
}

/// One string per section, e.g. improvement templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionTexts {
    pub contact_info: String,
    pub work_experience: String,
    pub education: String,
    pub skills: String,
    pub keywords: String,
    pub formatting: String,
}

impl SectionTexts {
    fn default_improvements() -> Self {
        Self {
            contact_info: "Add complete contact details (name, email, phone and city) at the top of your résumé.".into(),
            work_experience: "Give every role a date range and start bullets with action verbs backed by numbers (%, $, time saved).".into(),
            education: "List your degree, institution and graduation date in a clearly labelled Education section.".into(),
            skills: "Expand your Skills section with specific tools, languages and frameworks across several categories.".into(),
            keywords: "Work common ATS keywords (e.g. collaboration, leadership, testing) naturally into your experience bullets.".into(),
            formatting: "Use standard section headers and a single-column layout without tables, images or mixed date formats.".into(),
        }
    }

    pub fn get(&self, key: SectionKey) -> &str {
        match key {
            SectionKey::ContactInfo => &self.contact_info,
            SectionKey::WorkExperience => &self.work_experience,
            SectionKey::Education => &self.education,
            SectionKey::Skills => &self.skills,
            SectionKey::Keywords => &self.keywords,
            SectionKey::Formatting => &self.formatting,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rubric constants
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RubricConfig {
    pub experience: ExperienceRubric,
    pub education: EducationRubric,
    pub skills: SkillsRubric,
    pub keywords: KeywordsRubric,
    pub formatting: FormattingRubric,
}

/// Points (out of 100) for the work experience section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceRubric {
    pub dated_points: f64,
    pub action_verb_points: f64,
    pub quantified_points: f64,
    pub action_verbs: Vec<String>,
}

impl Default for ExperienceRubric {
    fn default() -> Self {
        Self {
            dated_points: 40.0,
            action_verb_points: 30.0,
            quantified_points: 30.0,
            action_verbs: to_strings(DEFAULT_ACTION_VERBS),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationRubric {
    pub degree_points: f64,
    pub institution_points: f64,
    pub date_points: f64,
}

impl Default for EducationRubric {
    fn default() -> Self {
        Self {
            degree_points: 40.0,
            institution_points: 40.0,
            date_points: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsRubric {
    /// Skill count at which the count component is saturated.
    pub min_skills: usize,
    pub count_points: f64,
    /// Distinct vocabulary categories needed for full diversity credit.
    pub target_categories: usize,
    pub diversity_points: f64,
}

impl Default for SkillsRubric {
    fn default() -> Self {
        Self {
            min_skills: 10,
            count_points: 80.0,
            target_categories: 3,
            diversity_points: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordsRubric {
    /// Keyword hits needed for a full score.
    pub target_hits: usize,
}

impl Default for KeywordsRubric {
    fn default() -> Self {
        Self { target_hits: 8 }
    }
}

/// Deductions from a perfect 100 for structural problems.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingRubric {
    pub missing_header_penalty: f64,
    pub table_penalty: f64,
    pub image_penalty: f64,
    pub column_penalty: f64,
    pub glyph_penalty: f64,
    pub date_format_penalty: f64,
    pub length_penalty: f64,
    pub min_words: usize,
    pub max_words: usize,
}

impl Default for FormattingRubric {
    fn default() -> Self {
        Self {
            missing_header_penalty: 10.0,
            table_penalty: 20.0,
            image_penalty: 15.0,
            column_penalty: 15.0,
            glyph_penalty: 5.0,
            date_format_penalty: 10.0,
            length_penalty: 10.0,
            min_words: 150,
            max_words: 1200,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Default tables
// ────────────────────────────────────────────────────────────────────────────

const DEFAULT_SYNONYMS: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("ts", "typescript"),
    ("py", "python"),
    ("python3", "python"),
    ("golang", "go"),
    ("cpp", "c++"),
    ("c sharp", "c#"),
    ("dotnet", ".net"),
    ("node", "node.js"),
    ("nodejs", "node.js"),
    ("node js", "node.js"),
    ("reactjs", "react"),
    ("react.js", "react"),
    ("vuejs", "vue"),
    ("vue.js", "vue"),
    ("angularjs", "angular"),
    ("nextjs", "next.js"),
    ("expressjs", "express"),
    ("express.js", "express"),
    ("postgres", "postgresql"),
    ("psql", "postgresql"),
    ("mongo", "mongodb"),
    ("mssql", "sql server"),
    ("ms sql", "sql server"),
    ("k8s", "kubernetes"),
    ("amazon web services", "aws"),
    ("gcp", "google cloud"),
    ("google cloud platform", "google cloud"),
    ("ms azure", "azure"),
    ("microsoft azure", "azure"),
    ("ci cd", "ci/cd"),
    ("cicd", "ci/cd"),
    ("restful", "rest api"),
    ("restful api", "rest api"),
    ("rest apis", "rest api"),
    ("ml", "machine learning"),
    ("nlp", "natural language processing"),
    ("sklearn", "scikit-learn"),
    ("scikit learn", "scikit-learn"),
    ("html5", "html"),
    ("css3", "css"),
    ("powerbi", "power bi"),
    ("gh actions", "github actions"),
];

const DEFAULT_VOCABULARY: &[(&str, &[&str])] = &[
    (
        "languages",
        &[
            "python", "javascript", "typescript", "java", "c++", "c#", "go", "rust", "ruby",
            "php", "swift", "kotlin", "scala", "sql", "bash", "html", "css",
        ],
    ),
    (
        "frameworks",
        &[
            "react", "angular", "vue", "next.js", "node.js", "express", "django", "flask",
            "fastapi", "spring", "rails", ".net", "pytorch", "tensorflow", "scikit-learn",
            "pandas", "numpy",
        ],
    ),
    (
        "databases",
        &[
            "postgresql", "mysql", "mongodb", "redis", "sqlite", "sql server", "elasticsearch",
            "dynamodb", "cassandra",
        ],
    ),
    (
        "cloud_devops",
        &[
            "aws", "azure", "google cloud", "docker", "kubernetes", "terraform", "ansible",
            "jenkins", "ci/cd", "github actions", "linux", "git",
        ],
    ),
    (
        "data_ml",
        &[
            "machine learning", "deep learning", "natural language processing",
            "computer vision", "data analysis", "spark", "hadoop", "tableau", "power bi",
        ],
    ),
    (
        "practices",
        &["rest api", "graphql", "microservices", "unit testing", "tdd", "devops"],
    ),
];

const DEFAULT_ATS_KEYWORDS: &[&str] = &[
    "leadership",
    "communication",
    "collaboration",
    "problem solving",
    "project management",
    "agile",
    "teamwork",
    "stakeholder",
    "cross-functional",
    "mentoring",
    "optimization",
    "scalable",
    "testing",
    "documentation",
    "deployment",
    "architecture",
    "analytics",
    "strategy",
];

const DEFAULT_ACTION_VERBS: &[&str] = &[
    "led", "built", "designed", "developed", "implemented", "created", "managed", "launched",
    "reduced", "increased", "architected", "delivered", "automated", "optimized", "migrated",
    "owned", "mentored", "shipped", "spearheaded", "streamlined", "analyzed", "deployed",
    "engineered", "established", "drove", "achieved", "coordinated", "negotiated", "resolved",
    "refactored", "scaled", "integrated", "trained", "published",
];

fn default_synonyms() -> SynonymTable {
    // The built-in table has no chains or cycles; `new` cannot fail on it.
    SynonymTable::new(DEFAULT_SYNONYMS.iter().copied()).unwrap_or_default()
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
