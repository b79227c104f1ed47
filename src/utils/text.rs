/// Case-insensitive substring match that also folds Cyrillic.
///
/// SQLite's `LOWER()` only folds ASCII, so searches are matched here.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// True when `needle` is empty or any of the fields contain it
pub fn matches_search<'a, I>(fields: I, needle: &str) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = needle.trim();
    if needle.is_empty() {
        return true;
    }
    fields.into_iter().any(|field| contains_ci(field, needle))
}

/// Truncate to `max` characters, appending an ellipsis when cut
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push('…');
    out
}
