//! Aggregator & Grader: weighted overall score, letter grade, improvements.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::engine::config::{EngineConfig, SectionWeights};
use crate::engine::sections::{SectionKey, SectionScores};

/// Coarse letter bucket for an overall ATS score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// ≥90 A, 80–89 B, 70–79 C, 60–69 D, <60 F.
    pub fn from_score(score: u32) -> Self {
        if score >= 90 {
            Grade::A
        } else if score >= 80 {
            Grade::B
        } else if score >= 70 {
            Grade::C
        } else if score >= 60 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Weighted mean of the section scores, rounded, plus its grade.
/// A section absent from `sections` contributes 0.
pub fn aggregate(sections: &SectionScores, weights: &SectionWeights) -> (u32, Grade) {
    let total_weight = weights.total();
    if total_weight <= 0.0 {
        return (0, Grade::F);
    }

    let weighted: f64 = SectionKey::ALL
        .iter()
        .map(|&key| {
            let score = sections.get(&key).map(|s| s.score).unwrap_or(0);
            score as f64 * weights.get(key)
        })
        .sum();

    let overall = (weighted / total_weight).round().clamp(0.0, 100.0) as u32;
    (overall, Grade::from_score(overall))
}

/// One templated suggestion per section below the threshold, in section
/// enumeration order.
pub fn improvements(sections: &SectionScores, config: &EngineConfig) -> Vec<String> {
    SectionKey::ALL
        .iter()
        .filter(|key| {
            sections
                .get(*key)
                .is_some_and(|s| s.score < config.improvement_threshold)
        })
        .map(|&key| config.improvement_templates.get(key).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::sections::SectionScore;
    use proptest::prelude::*;

    fn scores(values: [u32; 6]) -> SectionScores {
        SectionKey::ALL
            .into_iter()
            .zip(values)
            .map(|(key, score)| {
                (
                    key,
                    SectionScore {
                        score,
                        feedback: format!("{} feedback", key.label()),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_grade_boundaries_are_exact() {
        assert_eq!(Grade::from_score(100), Grade::A);
        assert_eq!(Grade::from_score(90), Grade::A);
        assert_eq!(Grade::from_score(89), Grade::B);
        assert_eq!(Grade::from_score(80), Grade::B);
        assert_eq!(Grade::from_score(79), Grade::C);
        assert_eq!(Grade::from_score(70), Grade::C);
        assert_eq!(Grade::from_score(69), Grade::D);
        assert_eq!(Grade::from_score(60), Grade::D);
        assert_eq!(Grade::from_score(59), Grade::F);
        assert_eq!(Grade::from_score(0), Grade::F);
    }

    #[test]
    fn test_grade_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Grade::C).unwrap(), r#""C""#);
        assert_eq!(Grade::B.to_string(), "B");
    }

    #[test]
    fn test_equal_weights_mean() {
        let sections = scores([100, 60, 80, 70, 50, 90]);
        let (overall, grade) = aggregate(&sections, &SectionWeights::equal());
        assert_eq!(overall, 75);
        assert_eq!(grade, Grade::C);
    }

    #[test]
    fn test_default_weights() {
        let sections = scores([100, 60, 80, 70, 50, 90]);
        // 5 + 18 + 12 + 17.5 + 7.5 + 9 = 69
        let (overall, grade) = aggregate(&sections, &SectionWeights::default());
        assert_eq!(overall, 69);
        assert_eq!(grade, Grade::D);
    }

    #[test]
    fn test_missing_section_counts_as_zero() {
        let mut sections = scores([100; 6]);
        sections.shift_remove(&SectionKey::Formatting);
        let (overall, _) = aggregate(&sections, &SectionWeights::default());
        assert_eq!(overall, 90);
    }

    #[test]
    fn test_improvements_follow_enumeration_order() {
        let config = EngineConfig::default();
        let sections = scores([40, 90, 65, 95, 10, 100]);
        let tips = improvements(&sections, &config);
        assert_eq!(
            tips,
            vec![
                config.improvement_templates.contact_info.clone(),
                config.improvement_templates.education.clone(),
                config.improvement_templates.keywords.clone(),
            ]
        );
    }

    #[test]
    fn test_no_improvements_when_all_above_threshold() {
        let config = EngineConfig::default();
        assert!(improvements(&scores([70; 6]), &config).is_empty());
    }

    proptest! {
        #[test]
        fn aggregate_is_monotonic(
            values in prop::array::uniform6(0u32..=100),
            index in 0usize..6,
            bump in 1u32..=100,
        ) {
            let weights = SectionWeights::default();
            let (before, _) = aggregate(&scores(values), &weights);

            let mut raised = values;
            raised[index] = (raised[index] + bump).min(100);
            let (after, _) = aggregate(&scores(raised), &weights);

            prop_assert!(after >= before);
            prop_assert!(after <= 100);
        }

        #[test]
        fn grade_is_a_function_of_overall(values in prop::array::uniform6(0u32..=100)) {
            let (overall, grade) = aggregate(&scores(values), &SectionWeights::equal());
            prop_assert_eq!(grade, Grade::from_score(overall));
        }
    }
}
