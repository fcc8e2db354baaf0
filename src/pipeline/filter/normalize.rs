/// Normalize one extracted fragment.
/// Trims both ends and collapses every internal whitespace run (tabs and
/// newlines included) to a single space. Other characters pass through.
pub fn normalize_fragment(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_collapses() {
        assert_eq!(normalize_fragment("  Hello  "), "Hello");
        assert_eq!(normalize_fragment("a\t\tb\n c"), "a b c");
        assert_eq!(normalize_fragment("\u{00A0}wide\u{2003}space\u{00A0}"), "wide space");
    }

    #[test]
    fn non_whitespace_controls_are_kept() {
        assert_eq!(normalize_fragment(" a\x07b "), "a\x07b");
        assert_ne!(normalize_fragment("a\x07b"), normalize_fragment("ab"));
    }

    #[test]
    fn whitespace_only_becomes_empty() {
        assert_eq!(normalize_fragment(" \n\t "), "");
        assert_eq!(normalize_fragment(""), "");
    }

    #[test]
    fn is_idempotent() {
        for raw in ["  x  y ", "a\nb", "\x07bell", "plain"] {
            let once = normalize_fragment(raw);
            assert_eq!(normalize_fragment(&once), once);
        }
    }
}
