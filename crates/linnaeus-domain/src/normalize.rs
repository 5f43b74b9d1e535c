//! Surface-form normalization for cross-strategy comparison keys
//!
//! Different strategies surface the same concept with different casing,
//! spacing, and inflection ("Neural Networks" vs "neural network"). The
//! comparison key folds those differences so the merge step can group
//! candidates without an external lemmatizer: lowercase, whitespace
//! collapse, punctuation-edge trimming, and rule-based plural folding
//! per token.

/// Compute the normalized comparison key for a surface form
///
/// # Examples
///
/// ```
/// use linnaeus_domain::comparison_key;
///
/// assert_eq!(comparison_key("Neural  Networks"), "neural network");
/// assert_eq!(comparison_key("case studies"), "case study");
/// assert_eq!(comparison_key("  AI security. "), "ai security");
/// ```
pub fn comparison_key(surface: &str) -> String {
    surface
        .split_whitespace()
        .map(|token| {
            let trimmed: String = token
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            singularize(&trimmed)
        })
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fold common English plural suffixes
///
/// Rules, in order: "ies" -> "y" (studies -> study), "sses" -> "ss"
/// (classes -> class), trailing "s" dropped unless the token ends in
/// "ss", "us", or "is" (networks -> network, analysis stays analysis).
/// Deliberately conservative; the embedding-similarity merge path covers
/// inflections these rules miss.
fn singularize(token: &str) -> String {
    if token.len() > 4 && token.ends_with("ies") {
        let stem = &token[..token.len() - 3];
        return format!("{}y", stem);
    }
    if token.len() > 4 && token.ends_with("sses") {
        return token[..token.len() - 2].to_string();
    }
    if token.len() > 3
        && token.ends_with('s')
        && !token.ends_with("ss")
        && !token.ends_with("us")
        && !token.ends_with("is")
    {
        return token[..token.len() - 1].to_string();
    }
    token.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_collapse() {
        assert_eq!(comparison_key("Deep   Neural Network"), "deep neural network");
    }

    #[test]
    fn test_plural_folding() {
        assert_eq!(comparison_key("neural networks"), "neural network");
        assert_eq!(comparison_key("case studies"), "case study");
        assert_eq!(comparison_key("classes"), "class");
    }

    #[test]
    fn test_protected_suffixes() {
        assert_eq!(comparison_key("analysis"), "analysis");
        assert_eq!(comparison_key("corpus"), "corpus");
        assert_eq!(comparison_key("loss"), "loss");
    }

    #[test]
    fn test_punctuation_edges() {
        assert_eq!(comparison_key("(neural networks),"), "neural network");
        assert_eq!(comparison_key("TF-IDF"), "tf-idf");
    }

    #[test]
    fn test_empty() {
        assert_eq!(comparison_key(""), "");
        assert_eq!(comparison_key("  ,, "), "");
    }

    #[test]
    fn test_idempotent() {
        let once = comparison_key("Convolutional Neural Networks");
        let twice = comparison_key(&once);
        assert_eq!(once, twice);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: keys are idempotent under re-normalization
        #[test]
        fn test_key_idempotent(s in "[a-zA-Z ()-]{0,40}") {
            let once = comparison_key(&s);
            prop_assert_eq!(comparison_key(&once), once);
        }

        /// Property: keys contain no uppercase and no doubled spaces
        #[test]
        fn test_key_canonical_form(s in ".{0,60}") {
            let key = comparison_key(&s);
            prop_assert!(!key.chars().any(|c| c.is_uppercase()));
            prop_assert!(!key.contains("  "));
            prop_assert_eq!(key.trim(), key.as_str());
        }
    }
}
