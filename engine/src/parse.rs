/// Normalise a raw query: trim surrounding whitespace and lowercase it the
/// same way field text is lowercased
pub fn normalize_query(query: &str) -> String {
    field_chars(query.trim()).into_iter().collect()
}

/// An empty normalised query means "show the unfiltered catalogue"
pub fn is_blank(query: &str) -> bool {
    query.trim().is_empty()
}

/// Whitespace-delimited token count, used for field-length normalisation
pub fn token_count(text: &str) -> usize {
    text.split_whitespace().count().max(1)
}

/// Lowercased chars of a field, one per original char so offsets line up
pub fn field_chars(text: &str) -> Vec<char> {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}
