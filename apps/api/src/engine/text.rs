//! Boundary-aware term search over free text.
//!
//! Terms are matched against a lower-cased, whitespace-collapsed haystack so
//! multi-word terms survive line breaks. A match must not be glued to a
//! neighbouring word: `js` does not match inside `node.js`, `java` does not
//! match inside `javascript`.

/// Lower-cases and collapses all whitespace runs to a single space.
pub fn fold_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Byte offset of the first boundary-respecting occurrence of `term` in an
/// already folded haystack.
pub fn find_term(folded: &str, term: &str) -> Option<usize> {
    term_positions(folded, term).next()
}

/// Byte offsets of every boundary-respecting occurrence of `term`.
pub fn term_positions<'a>(folded: &'a str, term: &'a str) -> impl Iterator<Item = usize> + 'a {
    folded
        .match_indices(term)
        .map(|(start, _)| start)
        .filter(move |&start| !term.is_empty() && has_boundaries(folded, start, start + term.len()))
}

fn has_boundaries(haystack: &str, start: usize, end: usize) -> bool {
    let before = haystack[..start].chars().next_back();
    let mut after = haystack[end..].chars();

    let left_ok = match before {
        None => true,
        Some(c) => !is_word_char(c) && c != '.',
    };
    let right_ok = match after.next() {
        None => true,
        Some('.') => !after.next().is_some_and(char::is_alphanumeric),
        Some(c) => !is_word_char(c),
    };
    left_ok && right_ok
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '+' || c == '#'
}
