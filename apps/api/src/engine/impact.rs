//! Impact checks for experience bullets: is the outcome quantified, and does
//! the bullet lean on vague wording instead of numbers.

/// Verbs that describe activity rather than outcome.
const VAGUE_VERBS: &[&str] = &[
    "improved",
    "enhanced",
    "helped",
    "worked on",
    "assisted",
    "supported",
    "participated",
    "involved",
    "responsible for",
];

/// Scale words that stand in for a number.
const VAGUE_SCALE_WORDS: &[&str] = &[
    "significant",
    "major",
    "large",
    "huge",
    "massive",
    "substantial",
    "considerable",
    "many",
    "numerous",
    "various",
    "several",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ImpactCheck {
    pub quantified: bool,
    /// First vague verb and first vague scale word found, if the bullet is
    /// not quantified.
    pub vague_terms: Vec<&'static str>,
}

/// Quantified if the bullet carries a digit, a percentage or a currency sign.
pub fn check_impact(text: &str) -> ImpactCheck {
    let has_digit = text.chars().any(|c| c.is_ascii_digit());
    let has_percent = text.contains('%');
    let has_currency = text.contains(['$', '€', '£', '₹']);

    if has_digit || has_percent || has_currency {
        return ImpactCheck {
            quantified: true,
            vague_terms: vec![],
        };
    }

    let lower = text.to_lowercase();
    let vague_terms = [VAGUE_VERBS, VAGUE_SCALE_WORDS]
        .iter()
        .filter_map(|list| list.iter().find(|&&w| lower.contains(w)).copied())
        .collect();

    ImpactCheck {
        quantified: false,
        vague_terms,
    }
}

/// Share of bullets with a quantified outcome. 0 for no bullets.
pub fn quantified_ratio(bullets: &[String]) -> f64 {
    if bullets.is_empty() {
        return 0.0;
    }
    let quantified = bullets.iter().filter(|b| check_impact(b).quantified).count();
    quantified as f64 / bullets.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_is_quantified() {
        assert!(check_impact("Reduced latency by 40% through caching").quantified);
    }

    #[test]
    fn test_currency_is_quantified() {
        assert!(check_impact("Saved $50,000 annually by optimizing queries").quantified);
        assert!(check_impact("Generated €200k in new revenue").quantified);
    }

    #[test]
    fn test_count_is_quantified() {
        assert!(check_impact("Trained 15 engineers on the deployment process").quantified);
    }

    #[test]
    fn test_tilde_estimate_is_quantified() {
        assert!(check_impact("Cut deployment time by ~2 hours").quantified);
    }

    #[test]
    fn test_vague_verb_is_reported() {
        let check = check_impact("Improved the user experience");
        assert!(!check.quantified);
        assert_eq!(check.vague_terms, vec!["improved"]);
    }

    #[test]
    fn test_vague_verb_and_scale_word_are_both_reported() {
        let check = check_impact("Helped deliver significant performance gains");
        assert_eq!(check.vague_terms, vec!["helped", "significant"]);
    }

    #[test]
    fn test_plain_unquantified_bullet() {
        let check = check_impact("Architected the authentication system");
        assert!(!check.quantified);
        assert!(check.vague_terms.is_empty());
    }

    #[test]
    fn test_quantified_ratio() {
        let bullets = vec![
            "Reduced latency by 40%".to_string(),
            "Improved the user experience".to_string(),
            "Shipped 3 services".to_string(),
            "Led the migration".to_string(),
        ];
        assert!((quantified_ratio(&bullets) - 0.5).abs() < f64::EPSILON);
        assert_eq!(quantified_ratio(&[]), 0.0);
    }
}
