//! Structured résumé input consumed by the Section Scorer.
//! Built per request by `profile::build_profile`; read-only inside the engine.

use serde::Serialize;

use crate::engine::normalize::SkillSet;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResumeProfile {
    pub skills: SkillSet,
    pub contact: ContactInfo,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub formatting: FormattingMeta,
    /// Full document text, searched for generic ATS keyword occurrences.
    pub body: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub links: Vec<String>,
}

impl ContactInfo {
    /// (label, present) for each scored contact field, in display order.
    pub fn fields(&self) -> [(&'static str, bool); 4] {
        [
            ("name", self.name.is_some()),
            ("email", self.email.is_some()),
            ("phone", self.phone.is_some()),
            ("location", self.location.is_some()),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExperienceEntry {
    /// Title / organisation line.
    pub heading: String,
    pub dates: Option<String>,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EducationEntry {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub date: Option<String>,
}

/// Section headers an ATS parser looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeHeading {
    Summary,
    Contact,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
}

impl ResumeHeading {
    /// Headers whose absence the formatting rubric penalises.
    pub const REQUIRED: [ResumeHeading; 3] = [
        ResumeHeading::Experience,
        ResumeHeading::Education,
        ResumeHeading::Skills,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ResumeHeading::Summary => "Summary",
            ResumeHeading::Contact => "Contact",
            ResumeHeading::Experience => "Experience",
            ResumeHeading::Education => "Education",
            ResumeHeading::Skills => "Skills",
            ResumeHeading::Projects => "Projects",
            ResumeHeading::Certifications => "Certifications",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// "Jan 2020", "January 2020"
    MonthName,
    /// "01/2020"
    NumericSlash,
    /// "2020-01"
    Iso,
    /// "2020"
    YearOnly,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FormattingMeta {
    pub headings: Vec<ResumeHeading>,
    pub has_tables: bool,
    pub has_images: bool,
    pub has_multi_column: bool,
    /// Icon / private-use glyphs that ATS parsers tend to mangle.
    pub nonstandard_glyphs: usize,
    /// Distinct date formats used across entries, in first-seen order.
    pub date_formats: Vec<DateFormat>,
    pub word_count: usize,
}

impl FormattingMeta {
    pub fn missing_required_headings(&self) -> Vec<ResumeHeading> {
        ResumeHeading::REQUIRED
            .into_iter()
            .filter(|h| !self.headings.contains(h))
            .collect()
    }
}
