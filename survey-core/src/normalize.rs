//! Canonical forms for free-text identity fields.
//!
//! Every system, body and reporter name has a comparison key (`normalize`):
//! trimmed and upper-cased, used for filtering, uniqueness checks and audit
//! deduplication. Stored values use a display form instead: `display_name`
//! title-cases reporter names, `tidy` only trims.
//!
//! Absence is a valid state: a missing value normalizes to the empty key.

/// Canonical comparison key for a text value.
pub fn normalize(text: &str) -> String {
    text.trim().to_uppercase()
}

/// Canonical comparison key for an optional text value.
///
/// `None` and blank strings both map to `""`.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

/// Whether two values name the same identity once normalized.
pub fn same_identity(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Display form for storage: `"  marlon   BLAKE "` becomes `"Marlon Blake"`.
///
/// Returns `None` when the input is blank.
pub fn display_name(text: &str) -> Option<String> {
    let words: Vec<String> = text.split_whitespace().map(title_case_word).collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Trimmed form, case and inner spacing untouched.
///
/// Used for system and body designations, where letter case carries meaning
/// (`HIP 12345 AB`). Inner spacing is kept so the stored value has the same
/// comparison key as the submitted one. Returns `None` when the input is blank.
pub fn tidy(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_upcases() {
        assert_eq!(normalize("  Sol "), "SOL");
        assert_eq!(normalize("sol"), "SOL");
        assert_eq!(normalize("SOL"), "SOL");
    }

    #[test]
    fn test_normalize_absent_is_empty_key() {
        assert_eq!(normalize_opt(None), "");
        assert_eq!(normalize_opt(Some("")), "");
        assert_eq!(normalize_opt(Some("   ")), "");
    }

    #[test]
    fn test_display_name_title_cases_words() {
        assert_eq!(display_name("  DommAARRAA ").as_deref(), Some("Dommaarraa"));
        assert_eq!(display_name("marlon   blake").as_deref(), Some("Marlon Blake"));
        assert_eq!(display_name("   "), None);
    }

    #[test]
    fn test_tidy_preserves_case() {
        assert_eq!(tidy("  HIP 12345 AB ").as_deref(), Some("HIP 12345 AB"));
        assert_eq!(tidy("Sol  A").as_deref(), Some("Sol  A"));
        assert_eq!(tidy(" \t"), None);
    }

    #[test]
    fn test_tidy_keeps_comparison_key() {
        for raw in ["  Sol  A ", "hip 12345", "\tLHS 3447 b"] {
            assert_eq!(normalize_opt(tidy(raw).as_deref()), normalize(raw));
        }
    }

    #[test]
    fn test_display_name_keeps_identity() {
        let stored = display_name(" hip 12345 ").unwrap_or_default();
        assert!(same_identity(&stored, "HIP 12345"));
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn whitespace() -> impl Strategy<Value = String> {
        "[ \t]{0,4}"
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Values differing only by surrounding whitespace or letter case share a key.
        #[test]
        fn prop_normalize_ignores_padding_and_case(
            core in "[A-Za-z0-9][A-Za-z0-9 -]{0,20}[A-Za-z0-9]",
            left in whitespace(),
            right in whitespace(),
            upper in any::<bool>(),
        ) {
            let cased = if upper { core.to_uppercase() } else { core.to_lowercase() };
            let padded = format!("{}{}{}", left, cased, right);
            prop_assert_eq!(normalize(&padded), normalize(&core));
        }

        /// Normalization is idempotent.
        #[test]
        fn prop_normalize_idempotent(text in ".{0,32}") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once.clone());
        }
    }
}
