//! Skill Normalizer: canonicalizes raw skill tokens into a comparable form.
//!
//! Canonical form: trimmed, lower-cased, surrounding punctuation stripped,
//! internal whitespace collapsed, then folded through the synonym table.
//! Two skills are equal iff their canonical forms are equal.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::engine::EngineError;

// ────────────────────────────────────────────────────────────────────────────
// Skill
// ────────────────────────────────────────────────────────────────────────────

/// A canonical skill plus the display form of its first occurrence and the
/// alias spellings that were folded into it.
#[derive(Debug, Clone)]
pub struct Skill {
    canonical: String,
    display: String,
    aliases: Vec<String>,
}

impl Skill {
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    #[cfg(test)]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

impl PartialEq for Skill {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Skill {}

impl Hash for Skill {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SkillSet
// ────────────────────────────────────────────────────────────────────────────

/// Duplicate-free set of skills keyed by canonical form.
/// Iteration follows insertion order so responses are stable for the UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillSet {
    skills: IndexMap<String, Skill>,
}

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a skill unless its canonical form is already present.
    /// Returns `true` if the skill was new.
    pub fn insert(&mut self, skill: Skill) -> bool {
        match self.skills.get_mut(&skill.canonical) {
            Some(existing) => {
                for alias in skill.aliases {
                    if !existing.aliases.contains(&alias) {
                        existing.aliases.push(alias);
                    }
                }
                false
            }
            None => {
                self.skills.insert(skill.canonical.clone(), skill);
                true
            }
        }
    }

    pub fn contains(&self, canonical: &str) -> bool {
        self.skills.contains_key(canonical)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.skills.values()
    }

    #[cfg(test)]
    pub fn canonical_names(&self) -> Vec<String> {
        self.skills.keys().cloned().collect()
    }

    pub fn display_names(&self) -> Vec<String> {
        self.skills.values().map(|s| s.display.clone()).collect()
    }

    /// Skills of `self` whose canonical form is also in `other`, in `self` order.
    pub fn intersection(&self, other: &SkillSet) -> SkillSet {
        self.iter()
            .filter(|s| other.contains(&s.canonical))
            .cloned()
            .collect()
    }

    /// Skills of `self` whose canonical form is not in `other`, in `self` order.
    pub fn difference(&self, other: &SkillSet) -> SkillSet {
        self.iter()
            .filter(|s| !other.contains(&s.canonical))
            .cloned()
            .collect()
    }
}

impl FromIterator<Skill> for SkillSet {
    fn from_iter<T: IntoIterator<Item = Skill>>(iter: T) -> Self {
        let mut set = SkillSet::new();
        for skill in iter {
            set.insert(skill);
        }
        set
    }
}

/// Serialized as the ordered list of display names.
impl Serialize for SkillSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.skills.values().map(|s| s.display.as_str()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Synonym table
// ────────────────────────────────────────────────────────────────────────────

/// alias → canonical mapping. Keys and values are stored in canonical
/// (pre-synonym) form and chains are resolved at construction, so a
/// canonical target is never itself an alias.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "HashMap<String, String>", into = "HashMap<String, String>")]
pub struct SynonymTable {
    entries: HashMap<String, String>,
}

impl SynonymTable {
    pub fn new<I, A, C>(pairs: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = (A, C)>,
        A: AsRef<str>,
        C: AsRef<str>,
    {
        let raw: HashMap<String, String> = pairs
            .into_iter()
            .filter_map(|(alias, canonical)| {
                let alias = clean_token(alias.as_ref())?;
                let canonical = clean_token(canonical.as_ref())?;
                (alias != canonical).then_some((alias, canonical))
            })
            .collect();

        let mut entries = HashMap::with_capacity(raw.len());
        for alias in raw.keys() {
            let mut target = &raw[alias];
            let mut hops = 0;
            while let Some(next) = raw.get(target) {
                hops += 1;
                if hops > raw.len() || next == alias {
                    return Err(EngineError::SynonymCycle(alias.clone()));
                }
                target = next;
            }
            entries.insert(alias.clone(), target.clone());
        }

        Ok(Self { entries })
    }

    pub fn resolve<'a>(&'a self, cleaned: &'a str) -> &'a str {
        self.entries.get(cleaned).map(String::as_str).unwrap_or(cleaned)
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(a, c)| (a.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<HashMap<String, String>> for SynonymTable {
    type Error = EngineError;

    fn try_from(map: HashMap<String, String>) -> Result<Self, Self::Error> {
        SynonymTable::new(map)
    }
}

impl From<SynonymTable> for HashMap<String, String> {
    fn from(table: SynonymTable) -> Self {
        table.entries
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Normalization
// ────────────────────────────────────────────────────────────────────────────

/// Normalizes a sequence of raw skill strings into a `SkillSet`.
/// Empty tokens are dropped; the first occurrence wins for display.
pub fn normalize<I, S>(raw: I, synonyms: &SynonymTable) -> SkillSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|token| normalize_token(token.as_ref(), synonyms))
        .collect()
}

/// Like [`normalize`] but over loosely-typed JSON tokens, as returned by the
/// extraction collaborator. Non-string entries are silently discarded.
pub fn normalize_values(raw: &[Value], synonyms: &SynonymTable) -> SkillSet {
    normalize(raw.iter().filter_map(Value::as_str), synonyms)
}

/// Normalizes a single token, or `None` if nothing is left after cleaning.
pub fn normalize_token(raw: &str, synonyms: &SynonymTable) -> Option<Skill> {
    let cleaned = clean_token(raw)?;
    let canonical = synonyms.resolve(&cleaned).to_string();
    let aliases = if canonical != cleaned {
        vec![cleaned]
    } else {
        Vec::new()
    };
    Some(Skill {
        display: display_form(raw),
        canonical,
        aliases,
    })
}

/// Canonical form before synonym folding.
pub fn clean_token(raw: &str) -> Option<String> {
    let cleaned = display_form(&raw.to_lowercase());
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Trimmed, punctuation-stripped, whitespace-collapsed; casing preserved.
fn display_form(raw: &str) -> String {
    let trimmed = raw.trim();
    let keep_leading_dot = trimmed.starts_with('.')
        && trimmed[1..].chars().next().is_some_and(char::is_alphanumeric);

    let core = trimmed
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .trim_end_matches(is_trailing_punctuation);
    let collapsed = core.split_whitespace().collect::<Vec<_>>().join(" ");

    if keep_leading_dot && !collapsed.is_empty() {
        format!(".{collapsed}")
    } else {
        collapsed
    }
}

/// Punctuation stripped from the end of a token. `+` and `#` survive so that
/// `c++` and `c#` keep their identity; at the start they are stripped.
fn is_trailing_punctuation(c: char) -> bool {
    !c.is_alphanumeric() && c != '+' && c != '#'
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table() -> SynonymTable {
        SynonymTable::new([
            ("js", "javascript"),
            ("node", "node.js"),
            ("nodejs", "node.js"),
            ("k8s", "kubernetes"),
        ])
        .unwrap()
    }

    #[test]
    fn test_trims_lowercases_and_collapses_whitespace() {
        let set = normalize(["  Machine   Learning  "], &table());
        assert_eq!(set.canonical_names(), vec!["machine learning"]);
        assert_eq!(set.display_names(), vec!["Machine Learning"]);
    }

    #[test]
    fn test_strips_surrounding_punctuation() {
        let set = normalize(["\"Python\",", "(SQL)", "Docker."], &table());
        assert_eq!(set.canonical_names(), vec!["python", "sql", "docker"]);
    }

    #[test]
    fn test_keeps_plus_hash_and_leading_dot() {
        let set = normalize(["C++", "C#", ".NET", "node.js"], &table());
        assert_eq!(set.canonical_names(), vec!["c++", "c#", ".net", "node.js"]);
    }

    #[test]
    fn test_leading_plus_and_hash_are_stripped() {
        let set = normalize(["#Python", "+SQL", "C#"], &table());
        assert_eq!(set.canonical_names(), vec!["python", "sql", "c#"]);
        assert_eq!(set.display_names(), vec!["Python", "SQL", "C#"]);
        assert!(set.contains("python"));
    }

    #[test]
    fn test_folds_synonyms() {
        let js = normalize(["JS"], &table());
        let full = normalize(["JavaScript"], &table());
        assert_eq!(js.canonical_names(), full.canonical_names());
        assert_eq!(js.iter().next().unwrap().aliases(), ["js"]);
    }

    #[test]
    fn test_first_occurrence_casing_wins() {
        let set = normalize(["JavaScript", "js", "javascript"], &table());
        assert_eq!(set.len(), 1);
        assert_eq!(set.display_names(), vec!["JavaScript"]);
    }

    #[test]
    fn test_drops_empty_tokens() {
        let set = normalize(["", "   ", "--", "rust"], &table());
        assert_eq!(set.canonical_names(), vec!["rust"]);
    }

    #[test]
    fn test_unknown_tokens_pass_through() {
        let set = normalize(["Terraform"], &table());
        assert_eq!(set.canonical_names(), vec!["terraform"]);
    }

    #[test]
    fn test_preserves_insertion_order() {
        let set = normalize(["Go", "Rust", "Python", "rust"], &table());
        assert_eq!(set.canonical_names(), vec!["go", "rust", "python"]);
    }

    #[test]
    fn test_normalize_values_drops_non_strings() {
        let raw = serde_json::json!(["Python", 42, null, {"skill": "x"}, ["sql"], "SQL"]);
        let set = normalize_values(raw.as_array().unwrap(), &table());
        assert_eq!(set.canonical_names(), vec!["python", "sql"]);
    }

    #[test]
    fn test_synonym_chains_are_resolved() {
        let t = SynonymTable::new([("a", "b"), ("b", "c")]).unwrap();
        assert_eq!(t.resolve("a"), "c");
        assert_eq!(t.resolve("b"), "c");
    }

    #[test]
    fn test_synonym_cycle_is_rejected() {
        let err = SynonymTable::new([("a", "b"), ("b", "a")]).unwrap_err();
        assert!(matches!(err, EngineError::SynonymCycle(_)));
    }

    #[test]
    fn test_synonym_table_keys_are_canonicalized() {
        let t = SynonymTable::new([(" JS ", "JavaScript")]).unwrap();
        assert_eq!(t.resolve("js"), "javascript");
    }

    #[test]
    fn test_synonym_table_deserializes_from_json_map() {
        let t: SynonymTable = serde_json::from_str(r#"{"golang": "go"}"#).unwrap();
        assert_eq!(t.resolve("golang"), "go");
    }

    #[test]
    fn test_set_operations_follow_receiver_order() {
        let a = normalize(["sql", "python", "git"], &table());
        let b = normalize(["python", "docker", "sql"], &table());
        assert_eq!(a.intersection(&b).canonical_names(), vec!["sql", "python"]);
        assert_eq!(b.difference(&a).canonical_names(), vec!["docker"]);
    }

    #[test]
    fn test_serializes_as_display_list() {
        let set = normalize(["Python", "SQL"], &table());
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["Python","SQL"]"#);
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(raw in prop::collection::vec("\\PC{0,24}", 0..16)) {
            let t = table();
            let once = normalize(&raw, &t);
            let twice = normalize(once.canonical_names(), &t);
            prop_assert_eq!(once.canonical_names(), twice.canonical_names());
        }

        #[test]
        fn normalized_sets_have_no_duplicates(raw in prop::collection::vec("[a-zA-Z ]{0,8}", 0..24)) {
            let set = normalize(&raw, &table());
            let mut names = set.canonical_names();
            let before = names.len();
            names.sort();
            names.dedup();
            prop_assert_eq!(before, names.len());
        }
    }
}
