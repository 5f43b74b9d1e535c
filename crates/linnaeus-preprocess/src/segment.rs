//! Abbreviation-aware sentence segmentation

/// A sentence span: byte offset of its start in the source text plus the
/// whitespace-normalized sentence text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SentenceSpan {
    pub offset: usize,
    pub text: String,
}

/// Split text into sentence spans.
///
/// Terminators are '.', '!' and '?' followed by whitespace-then-uppercase
/// (or end of text). A period is not a terminator when the preceding token
/// is a known abbreviation ("et al.", "e.g.") or a single letter
/// (middle initials), or when it sits inside a number ("3.14").
pub(crate) fn split_sentences(text: &str, abbreviations: &[String]) -> Vec<SentenceSpan> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut start = 0usize;

    let mut i = 0usize;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c == '.' || c == '!' || c == '?' {
            if c == '.' && !is_sentence_period(text, i, abbreviations) {
                i += 1;
                continue;
            }
            // Look ahead: terminator only if followed by whitespace then
            // an uppercase letter/digit, or nothing at all
            let rest = &text[i + 1..];
            let after_ws = rest.trim_start();
            let boundary = after_ws.is_empty()
                || (rest.len() != after_ws.len()
                    && after_ws
                        .chars()
                        .next()
                        .map(|ch| ch.is_uppercase() || ch.is_ascii_digit() || ch == '(')
                        .unwrap_or(false));
            if boundary {
                push_span(&mut spans, text, start, i + 1);
                start = i + 1 + (rest.len() - after_ws.len());
                i = start;
                continue;
            }
        }
        i += 1;
    }
    push_span(&mut spans, text, start, text.len());
    spans
}

fn push_span(spans: &mut Vec<SentenceSpan>, text: &str, start: usize, end: usize) {
    if start >= end {
        return;
    }
    let raw = &text[start..end];
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return;
    }
    // Re-anchor the offset to the first non-whitespace byte
    let leading_ws = raw.len() - raw.trim_start().len();
    spans.push(SentenceSpan {
        offset: start + leading_ws,
        text: normalized,
    });
}

// Decide whether the period at byte `i` actually ends a sentence.
fn is_sentence_period(text: &str, i: usize, abbreviations: &[String]) -> bool {
    let before = &text[..i];

    // Decimal point: digit on both sides
    let prev = before.chars().last();
    let next = text[i + 1..].chars().next();
    if prev.map(|c| c.is_ascii_digit()).unwrap_or(false)
        && next.map(|c| c.is_ascii_digit()).unwrap_or(false)
    {
        return false;
    }

    // Last token before the period, lowercased and stripped of leading
    // punctuation, e.g. "(e.g" -> "e.g"
    let token = before
        .rsplit(|c: char| c.is_whitespace())
        .next()
        .unwrap_or("")
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();

    if token.chars().count() == 1 {
        return false; // middle initial "J."
    }

    for abbr in abbreviations {
        let abbr = abbr.to_lowercase();
        if token == abbr {
            return false;
        }
        // "et al" spans two tokens
        if abbr.contains(' ') && before.to_lowercase().ends_with(&abbr) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abbrs() -> Vec<String> {
        crate::PreprocessConfig::default().abbreviations
    }

    #[test]
    fn test_basic_split() {
        let spans = split_sentences("First sentence. Second sentence. Third one.", &abbrs());
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].text, "First sentence.");
        assert_eq!(spans[1].text, "Second sentence.");
    }

    #[test]
    fn test_abbreviation_not_a_boundary() {
        let spans = split_sentences(
            "Transformers, e.g. BERT, dominate. A second sentence follows.",
            &abbrs(),
        );
        assert_eq!(spans.len(), 2);
        assert!(spans[0].text.contains("e.g. BERT"));
    }

    #[test]
    fn test_et_al_not_a_boundary() {
        let spans = split_sentences(
            "Vaswani et al. Attention is all you need. Results were strong.",
            &abbrs(),
        );
        // "et al." is glued to the following sentence
        assert_eq!(spans.len(), 2);
        assert!(spans[0].text.starts_with("Vaswani et al."));
    }

    #[test]
    fn test_decimal_points_kept() {
        let spans = split_sentences("Accuracy reached 99.2 percent. Error fell.", &abbrs());
        assert_eq!(spans.len(), 2);
        assert!(spans[0].text.contains("99.2"));
    }

    #[test]
    fn test_question_and_exclamation() {
        let spans = split_sentences("Does it converge? Yes! Training was stable.", &abbrs());
        assert_eq!(spans.len(), 3);
    }

    #[test]
    fn test_offsets_anchor_into_source() {
        let text = "Alpha beta.  Gamma delta.";
        let spans = split_sentences(text, &abbrs());
        assert_eq!(spans.len(), 2);
        assert_eq!(&text[spans[1].offset..spans[1].offset + 5], "Gamma");
    }

    #[test]
    fn test_whitespace_normalized() {
        let spans = split_sentences("Spread\n  across\tlines. Next.", &abbrs());
        assert_eq!(spans[0].text, "Spread across lines.");
    }

    #[test]
    fn test_no_terminator_tail() {
        let spans = split_sentences("Trailing fragment without a period", &abbrs());
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_sentences("", &abbrs()).is_empty());
        assert!(split_sentences("   \n\t ", &abbrs()).is_empty());
    }
}
