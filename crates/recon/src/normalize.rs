//! Part identifier normalization.

/// Shortest identifier accepted as well-formed.
pub const MIN_PART_NUMBER_LEN: usize = 2;

/// Keep ASCII letters and digits only, in order.
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Format check with the default minimum length.
pub fn is_valid_format(normalized: &str) -> bool {
    is_valid_format_with(normalized, MIN_PART_NUMBER_LEN)
}

/// Format check with an explicit minimum length (in characters).
///
/// The alphanumeric test is redundant after [`normalize`] but still guards
/// values that never went through it.
pub fn is_valid_format_with(normalized: &str, min_len: usize) -> bool {
    let s = normalized.trim();
    if s.is_empty() || s.chars().count() < min_len {
        return false;
    }
    s.chars().any(|c| c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_separators_and_spaces() {
        assert_eq!(normalize("AB-12 "), "AB12");
        assert_eq!(normalize(" pn_001/a "), "pn001a");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("--- "), "");
    }

    #[test]
    fn non_ascii_letters_are_dropped() {
        assert_eq!(normalize("Réf42"), "Rf42");
    }

    #[test]
    fn format_rules() {
        assert!(!is_valid_format(""));
        assert!(!is_valid_format("A"));
        assert!(is_valid_format("A1"));
        assert!(!is_valid_format("--"));
        assert!(!is_valid_format_with("ABC", 4));
        assert!(is_valid_format_with("ABCD", 4));
    }

    proptest! {
        #[test]
        fn normalized_is_ascii_alphanumeric(raw in ".*") {
            let n = normalize(&raw);
            prop_assert!(n.chars().all(|c| c.is_ascii_alphanumeric()));
        }

        #[test]
        fn normalize_is_idempotent(raw in ".*") {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once.clone());
        }

        #[test]
        fn valid_iff_long_enough_after_normalize(raw in "[A-Za-z0-9 _-]{0,8}") {
            let n = normalize(&raw);
            prop_assert_eq!(is_valid_format(&n), n.len() >= MIN_PART_NUMBER_LEN);
        }
    }
}
