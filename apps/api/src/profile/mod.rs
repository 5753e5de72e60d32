//! Résumé profile builder: turns extracted document text into the
//! structured `ResumeProfile` the Section Scorer reads.
//!
//! Heuristic and line-oriented: split on recognised section headers, then
//! pull contact fields, experience entries, education entries and the
//! formatting signals an ATS parser is sensitive to.

pub mod dates;

use std::sync::OnceLock;

use regex::Regex;

use crate::engine::normalize::SkillSet;
use crate::engine::resume::{
    ContactInfo, DateFormat, EducationEntry, ExperienceEntry, FormattingMeta, ResumeHeading,
    ResumeProfile,
};
use crate::engine::text::{find_term, fold_text};
use crate::extraction::document::Document;
use crate::profile::dates::find_dates;

const HEADING_ALIASES: &[(ResumeHeading, &[&str])] = &[
    (
        ResumeHeading::Summary,
        &["summary", "professional summary", "profile", "objective", "career objective", "about me"],
    ),
    (
        ResumeHeading::Contact,
        &["contact", "contact information", "contact info", "contact details", "personal details"],
    ),
    (
        ResumeHeading::Experience,
        &[
            "experience",
            "work experience",
            "professional experience",
            "employment",
            "employment history",
            "work history",
            "career history",
            "relevant experience",
        ],
    ),
    (
        ResumeHeading::Education,
        &["education", "academic background", "education and training", "academics", "qualifications"],
    ),
    (
        ResumeHeading::Skills,
        &["skills", "technical skills", "key skills", "core competencies", "technologies", "skills and tools"],
    ),
    (
        ResumeHeading::Projects,
        &["projects", "personal projects", "key projects", "selected projects"],
    ),
    (
        ResumeHeading::Certifications,
        &["certifications", "certificates", "licenses and certifications", "courses"],
    ),
];

const DEGREE_TERMS: &[&str] = &[
    "bachelor", "bachelors", "bachelor's", "master", "masters", "master's", "phd", "ph.d",
    "doctorate", "mba", "b.s", "b.sc", "bsc", "b.a", "b.tech", "btech", "b.e", "m.s", "m.sc",
    "msc", "m.tech", "mtech", "m.a", "associate", "diploma", "degree",
];

const INSTITUTION_TERMS: &[&str] = &[
    "university", "college", "institute", "school", "academy", "polytechnic",
];

const BULLET_GLYPHS: &[char] = &['•', '●', '▪', '◦', '‣', '∙', '·', '-', '*', '–', '➤', '►'];

/// Lines from the top of the document searched for contact details when
/// there is no explicit contact section.
const PREAMBLE_LINES: usize = 8;

/// Internal run of spaces treated as a column gap.
const COLUMN_GAP: &str = "     ";

pub fn build_profile(document: &Document, skills: SkillSet) -> ResumeProfile {
    let text = &document.text;
    let blocks = split_sections(text);

    let experience = blocks
        .iter()
        .filter(|b| b.heading == Some(ResumeHeading::Experience))
        .flat_map(|b| parse_experience(&b.lines))
        .collect::<Vec<_>>();

    let education = blocks
        .iter()
        .filter(|b| b.heading == Some(ResumeHeading::Education))
        .flat_map(|b| parse_education(&b.lines))
        .collect::<Vec<_>>();

    let formatting = analyze_formatting(text, &blocks, &experience, document.has_images);

    ResumeProfile {
        skills,
        contact: parse_contact(text, &blocks),
        experience,
        education,
        formatting,
        body: text.clone(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

/// Lines under one heading. The preamble before the first heading has none.
#[derive(Debug)]
struct SectionBlock<'a> {
    heading: Option<ResumeHeading>,
    lines: Vec<&'a str>,
}

fn split_sections(text: &str) -> Vec<SectionBlock<'_>> {
    let mut blocks = vec![SectionBlock {
        heading: None,
        lines: Vec::new(),
    }];

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match detect_heading(trimmed) {
            Some(heading) => blocks.push(SectionBlock {
                heading: Some(heading),
                lines: Vec::new(),
            }),
            None => {
                if let Some(block) = blocks.last_mut() {
                    block.lines.push(trimmed);
                }
            }
        }
    }
    blocks
}

/// A short line that, minus decoration, is a known section title.
fn detect_heading(line: &str) -> Option<ResumeHeading> {
    if line.split_whitespace().count() > 4 {
        return None;
    }
    let title = line
        .trim_matches(|c: char| !c.is_alphanumeric())
        .replace('&', "and")
        .to_lowercase();
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");

    HEADING_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&title.as_str()))
        .map(|(heading, _)| *heading)
}

// ────────────────────────────────────────────────────────────────────────────
// Contact
// ────────────────────────────────────────────────────────────────────────────

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email pattern is valid")
    })
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\+?\(?\d[\d\s().-]{7,}\d").expect("phone pattern is valid"))
}

fn location_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[A-Z][a-zA-Z]+(?: [A-Z][a-zA-Z]+)*,\s*(?:[A-Z]{2}|[A-Z][a-z]+(?: [A-Z][a-z]+)*)\b")
            .expect("location pattern is valid")
    })
}

fn link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:https?://\S+|www\.\S+|(?:linkedin|github)\.com/\S+)")
            .expect("link pattern is valid")
    })
}

fn parse_contact(text: &str, blocks: &[SectionBlock<'_>]) -> ContactInfo {
    // Contact details live in the preamble or an explicit contact section.
    let header_lines: Vec<&str> = blocks
        .iter()
        .filter(|b| b.heading.is_none() || b.heading == Some(ResumeHeading::Contact))
        .flat_map(|b| b.lines.iter().take(PREAMBLE_LINES).copied())
        .collect();

    let email = email_regex().find(text).map(|m| m.as_str().to_string());

    let phone = phone_regex()
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .find(|candidate| {
            let digits = candidate.chars().filter(char::is_ascii_digit).count();
            (10..=15).contains(&digits)
        })
        .map(String::from);

    let location = header_lines.iter().find_map(|line| {
        location_regex()
            .find(line)
            .map(|m| m.as_str().to_string())
    });

    let name = blocks
        .first()
        .and_then(|preamble| preamble.lines.first())
        .filter(|line| looks_like_name(line))
        .map(|line| line.to_string());

    let links = link_regex()
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ')']).to_string())
        .collect();

    ContactInfo {
        name,
        email,
        phone,
        location,
        links,
    }
}

/// Two to four capitalised words, no digits or contact punctuation.
fn looks_like_name(line: &str) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    (2..=4).contains(&words.len())
        && words.iter().all(|w| {
            w.chars().next().is_some_and(char::is_uppercase)
                && w.chars().all(|c| c.is_alphabetic() || matches!(c, '.' | '-' | '\''))
        })
}

// ────────────────────────────────────────────────────────────────────────────
// Experience
// ────────────────────────────────────────────────────────────────────────────

fn strip_bullet(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(BULLET_GLYPHS)?;
    Some(rest.trim_start())
}

fn parse_experience(lines: &[&str]) -> Vec<ExperienceEntry> {
    let mut entries: Vec<ExperienceEntry> = Vec::new();

    for &line in lines {
        if let Some(bullet) = strip_bullet(line) {
            if bullet.is_empty() {
                continue;
            }
            match entries.last_mut() {
                Some(entry) => entry.bullets.push(bullet.to_string()),
                None => entries.push(ExperienceEntry {
                    bullets: vec![bullet.to_string()],
                    ..ExperienceEntry::default()
                }),
            }
            continue;
        }

        let dates = find_dates(line);
        match entries.last_mut() {
            // Wrapped bullet text. A dated line is a new role even when lowercase.
            Some(entry)
                if !entry.bullets.is_empty()
                    && dates.is_none()
                    && line.starts_with(|c: char| c.is_lowercase()) =>
            {
                if let Some(last) = entry.bullets.last_mut() {
                    last.push(' ');
                    last.push_str(line);
                }
            }
            // Second heading line (dates or organisation) until the role is dated.
            Some(entry) if entry.bullets.is_empty() && entry.dates.is_none() => {
                entry.dates = dates.map(|d| d.text);
                append_heading(&mut entry.heading, line);
            }
            _ => entries.push(ExperienceEntry {
                heading: line.to_string(),
                dates: dates.map(|d| d.text),
                bullets: Vec::new(),
            }),
        }
    }

    entries
}

fn append_heading(heading: &mut String, line: &str) {
    if !heading.is_empty() {
        heading.push_str(" | ");
    }
    heading.push_str(line);
}

// ────────────────────────────────────────────────────────────────────────────
// Education
// ────────────────────────────────────────────────────────────────────────────

fn contains_any(folded: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| find_term(folded, t).is_some())
}

fn parse_education(lines: &[&str]) -> Vec<EducationEntry> {
    let mut entries = Vec::new();
    let mut current = EducationEntry::default();

    for &line in lines {
        let line = strip_bullet(line).unwrap_or(line);
        let folded = fold_text(line);
        let has_degree = contains_any(&folded, DEGREE_TERMS);
        let has_institution = contains_any(&folded, INSTITUTION_TERMS);
        let date = find_dates(line).map(|d| d.text);

        let conflicts = (has_degree && current.degree.is_some())
            || (has_institution && current.institution.is_some());
        if conflicts {
            entries.push(std::mem::take(&mut current));
        }

        if has_degree {
            current.degree = Some(line.to_string());
        }
        if has_institution {
            current.institution = Some(line.to_string());
        }
        if current.date.is_none() {
            current.date = date;
        }
    }

    if current.degree.is_some() || current.institution.is_some() {
        entries.push(current);
    }
    entries
}

// ────────────────────────────────────────────────────────────────────────────
// Formatting
// ────────────────────────────────────────────────────────────────────────────

fn analyze_formatting(
    text: &str,
    blocks: &[SectionBlock<'_>],
    experience: &[ExperienceEntry],
    has_images: bool,
) -> FormattingMeta {
    let mut headings = Vec::new();
    for heading in blocks.iter().filter_map(|b| b.heading) {
        if !headings.contains(&heading) {
            headings.push(heading);
        }
    }

    let non_empty: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();

    // Pipe-separated contact lines are common; only fenced rows count.
    let table_rows = non_empty
        .iter()
        .map(|l| l.trim())
        .filter(|l| (l.starts_with('|') && l.ends_with('|')) || l.matches('\t').count() >= 2)
        .count();
    let has_box_drawing = text.chars().any(|c| ('\u{2500}'..='\u{257F}').contains(&c));

    let gapped = non_empty
        .iter()
        .filter(|l| l.trim().contains(COLUMN_GAP))
        .count();
    let has_multi_column = gapped >= 3 && gapped * 100 >= non_empty.len() * 15;

    let mut date_formats: Vec<DateFormat> = Vec::new();
    for format in experience
        .iter()
        .filter_map(|e| e.dates.as_deref())
        .filter_map(find_dates)
        .flat_map(|span| span.formats)
    {
        if !date_formats.contains(&format) {
            date_formats.push(format);
        }
    }

    FormattingMeta {
        headings,
        has_tables: table_rows >= 2 || has_box_drawing,
        has_images,
        has_multi_column,
        nonstandard_glyphs: text.chars().filter(|&c| is_nonstandard_glyph(c)).count(),
        date_formats,
        word_count: text.split_whitespace().count(),
    }
}

/// Private-use icon fonts, pictographs, dingbats and replacement characters.
fn is_nonstandard_glyph(c: char) -> bool {
    matches!(c as u32,
        0xE000..=0xF8FF
        | 0x1F300..=0x1FAFF
        | 0x2600..=0x27BF
        | 0xFFFD)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
