//! Fuzzy brand matching
//!
//! Matching is containment of normalized forms, not token or edit-distance
//! similarity. Short brand names therefore match inside unrelated words
//! ("AI" matches "detail"); callers accept that in exchange for recall.

use super::normalizer::normalize;

/// Whether `brand_name` occurs in `haystack` after normalization.
///
/// False when either argument is empty, or when the brand normalizes to
/// nothing (a name made only of suffixes or punctuation).
pub fn is_match(haystack: &str, brand_name: &str) -> bool {
    if haystack.is_empty() || brand_name.is_empty() {
        return false;
    }

    let needle = normalize(brand_name);
    if needle.is_empty() {
        return false;
    }

    normalize(haystack).contains(&needle)
}

/// Bidirectional containment used to flag a list mention as the tracked brand.
///
/// Accepts both expansions ("Writesonic AI" vs "Writesonic") and
/// abbreviations ("Acme" vs "Acme Robotics").
pub fn is_same_brand(mention_name: &str, brand_name: &str) -> bool {
    let mention = normalize(mention_name);
    let brand = normalize(brand_name);

    if mention.is_empty() || brand.is_empty() {
        return false;
    }

    mention.contains(&brand) || brand.contains(&mention)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflexive_for_non_empty() {
        for name in ["Acme", "HubSpot", "Copy.ai", "Adobe XD"] {
            assert!(is_match(name, name));
            assert!(is_same_brand(name, name));
        }
    }

    #[test]
    fn test_empty_arguments() {
        assert!(!is_match("", "Acme"));
        assert!(!is_match("Acme is great", ""));
        assert!(!is_match("", ""));
        assert!(!is_same_brand("", "Acme"));
        assert!(!is_same_brand("Acme", ""));
    }

    #[test]
    fn test_suffix_only_brand_never_matches() {
        assert!(!is_match("any text at all", "Inc."));
        assert!(!is_same_brand("Acme", "Co"));
    }

    #[test]
    fn test_match_ignores_case_suffix_and_punctuation() {
        assert!(is_match("We recommend ACME, Inc. for teams", "Acme Inc"));
        assert!(is_match("Try copy.ai today", "Copy.ai"));
        assert!(!is_match("Nothing relevant here", "Zyx"));
    }

    #[test]
    fn test_match_is_asymmetric() {
        assert!(is_match("Writesonic Inc is popular", "Writesonic"));
        assert!(!is_match("Writesonic", "Writesonic Pro Suite"));
    }

    #[test]
    fn test_same_brand_is_bidirectional() {
        assert!(is_same_brand("Writesonic Inc", "Writesonic"));
        assert!(is_same_brand("Acme", "Acme Robotics"));
        assert!(is_same_brand("Acme Robotics", "Acme"));
        assert!(!is_same_brand("Beta", "Acme"));
    }

    // Precision risk kept on purpose: short names match inside other words.
    #[test]
    fn test_short_names_overmatch() {
        assert!(is_match("A long answer about project management", "A"));
        assert!(is_match("Email marketing in detail", "AI"));
        assert!(is_same_brand("Notion", "No"));
        assert!(is_same_brand("A", "Salesforce"));
    }
}
