use async_trait::async_trait;
use indexmap::IndexSet;
use serde_json::Value;

use crate::engine::config::EngineConfig;
use crate::engine::text::{fold_text, term_positions};
use crate::extraction::SkillExtractor;

/// Scans text for every known skill term and synonym alias.
///
/// A term found only inside a longer matched term is not reported
/// ("react" inside "react native"). Results are ordered by first position.
#[derive(Debug, Clone)]
pub struct DictionarySkillExtractor {
    terms: Vec<String>,
}

impl DictionarySkillExtractor {
    pub fn new(config: &EngineConfig) -> Self {
        let terms: IndexSet<String> = config
            .skill_vocabulary
            .values()
            .flatten()
            .map(|term| term.to_lowercase())
            .chain(config.synonyms.aliases().map(|(alias, _)| alias.to_string()))
            .filter(|term| !term.trim().is_empty())
            .collect();
        Self {
            terms: terms.into_iter().collect(),
        }
    }

    pub fn scan(&self, text: &str) -> Vec<String> {
        let folded = fold_text(text);

        // (start, end, term index)
        let mut hits: Vec<(usize, usize, usize)> = self
            .terms
            .iter()
            .enumerate()
            .flat_map(|(idx, term)| {
                term_positions(&folded, term).map(move |start| (start, start + term.len(), idx))
            })
            .collect();
        // Earliest first; at equal start the longest term wins.
        hits.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        let mut found: IndexSet<usize> = IndexSet::new();
        let mut covered_until = 0;
        for (start, end, idx) in hits {
            if start < covered_until {
                continue;
            }
            covered_until = end;
            found.insert(idx);
        }

        found.into_iter().map(|idx| self.terms[idx].clone()).collect()
    }
}

#[async_trait]
impl SkillExtractor for DictionarySkillExtractor {
    async fn extract(&self, text: &str) -> Vec<Value> {
        self.scan(text).into_iter().map(Value::String).collect()
    }

    fn backend(&self) -> &'static str {
        "dictionary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::normalize::SynonymTable;
    use indexmap::IndexMap;

    fn extractor(vocabulary: &[&str], synonyms: &[(&str, &str)]) -> DictionarySkillExtractor {
        let mut skill_vocabulary = IndexMap::new();
        skill_vocabulary.insert(
            "all".to_string(),
            vocabulary.iter().map(|s| s.to_string()).collect(),
        );
        DictionarySkillExtractor::new(&EngineConfig {
            skill_vocabulary,
            synonyms: SynonymTable::new(synonyms.iter().copied()).unwrap(),
            ..EngineConfig::default()
        })
    }

    #[test]
    fn test_scan_orders_by_first_appearance() {
        let ex = extractor(&["python", "docker", "sql"], &[]);
        let found = ex.scan("Docker and SQL daily; Python since 2015. More Docker.");
        assert_eq!(found, vec!["docker", "sql", "python"]);
    }

    #[test]
    fn test_scan_reports_aliases_for_the_normalizer() {
        let ex = extractor(&["javascript", "kubernetes"], &[("js", "javascript"), ("k8s", "kubernetes")]);
        assert_eq!(ex.scan("Deployed JS apps on k8s"), vec!["js", "k8s"]);
    }

    #[test]
    fn test_scan_prefers_longest_overlapping_term() {
        let ex = extractor(&["react", "react native", "machine learning"], &[]);
        assert_eq!(
            ex.scan("React Native apps with machine\nlearning"),
            vec!["react native", "machine learning"]
        );
        assert_eq!(
            ex.scan("React Native first, then plain React"),
            vec!["react native", "react"]
        );
    }

    #[test]
    fn test_scan_respects_word_boundaries() {
        let ex = extractor(&["java", "c++", "go"], &[]);
        assert_eq!(ex.scan("JavaScript, C++ and Golang"), vec!["c++"]);
    }

    #[test]
    fn test_scan_with_default_vocabulary() {
        let ex = DictionarySkillExtractor::new(&EngineConfig::default());
        let found = ex.scan("Python, PostgreSQL and Docker on AWS");
        for skill in ["python", "postgresql", "docker", "aws"] {
            assert!(found.iter().any(|f| f == skill), "missing {skill} in {found:?}");
        }
    }

    #[tokio::test]
    async fn test_extract_returns_string_values() {
        let ex = extractor(&["rust"], &[]);
        assert_eq!(ex.extract("Rust").await, vec![Value::String("rust".into())]);
        assert_eq!(ex.backend(), "dictionary");
    }
}
