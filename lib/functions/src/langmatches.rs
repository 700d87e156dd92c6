/// RFC 4647 basic filtering, case-insensitive (§4.2 `LANGMATCHES`). A range of `"*"`
/// matches any non-empty tag; otherwise the range must match the tag exactly, or
/// match a leading subtag of it followed by `-`.
pub fn lang_matches(tag: &str, range: &str) -> bool {
    if range == "*" {
        return !tag.is_empty();
    }
    let tag_lower = tag.to_ascii_lowercase();
    let range_lower = range.to_ascii_lowercase();
    if tag_lower == range_lower {
        return true;
    }
    match tag_lower.strip_prefix(range_lower.as_str()) {
        Some(rest) => rest.starts_with('-'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::lang_matches;

    #[test]
    fn star_matches_any_nonempty_tag() {
        assert!(lang_matches("en-US", "*"));
        assert!(!lang_matches("", "*"));
    }

    #[test]
    fn exact_and_prefix_subtag_match() {
        assert!(lang_matches("en-US", "en"));
        assert!(lang_matches("en", "en"));
        assert!(!lang_matches("en", "en-US"));
    }

    #[test]
    fn case_insensitive() {
        assert!(lang_matches("EN-us", "en"));
    }

    #[test]
    fn rejects_subtag_without_separator() {
        assert!(!lang_matches("english", "en"));
    }
}
