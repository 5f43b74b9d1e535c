//! Shared term utilities: tokenization, stopwords, phrase chunking
//!
//! All three strategies tokenize the same way so their candidates line up
//! at merge time.

use std::collections::HashSet;

/// Build the English stopword set
pub fn stopword_set() -> HashSet<String> {
    let stopwords_list = vec![
        "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not",
        "on", "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from",
        "they", "we", "say", "her", "she", "or", "an", "will", "my", "one", "all", "would",
        "there", "their", "what", "so", "up", "out", "if", "about", "who", "get", "which",
        "go", "me", "when", "make", "can", "like", "time", "no", "just", "him", "know",
        "take", "people", "into", "year", "your", "good", "some", "could", "them", "see",
        "other", "than", "then", "now", "look", "only", "come", "its", "over", "think",
        "also", "back", "after", "use", "two", "how", "our", "work", "first", "well",
        "way", "even", "new", "want", "because", "any", "these", "give", "day", "most",
        "us", "is", "was", "are", "been", "has", "had", "were", "said", "did", "such",
        "each", "both", "more", "very", "between", "may", "where", "much", "many", "those",
        "while", "however", "thus", "therefore", "using", "based", "shown", "show",
        "against", "through", "during", "without", "within", "further", "several",
        "every", "either", "neither", "another", "being", "having",
    ];

    stopwords_list.into_iter().map(|s| s.to_string()).collect()
}

/// Split text into words, trimming punctuation from the edges of each
/// while keeping internal hyphens ("state-of-the-art" stays whole)
pub fn words(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .collect()
}

/// Lowercased content tokens: length > 2, not a stopword, not a number
pub fn content_tokens(text: &str, stopwords: &HashSet<String>) -> Vec<String> {
    words(text)
        .into_iter()
        .map(|w| w.to_lowercase())
        .filter(|w| {
            w.len() > 2 && !stopwords.contains(w) && !w.chars().all(|c| c.is_numeric())
        })
        .collect()
}

/// Whether a word participates in phrase chunks: alphabetic (hyphen
/// allowed), longer than two characters, not a stopword
fn is_content_word(word: &str, stopwords: &HashSet<String>) -> bool {
    word.chars().count() > 2
        && word.chars().all(|c| c.is_alphabetic() || c == '-')
        && !stopwords.contains(&word.to_lowercase())
}

/// Maximal runs of consecutive content words, in original casing
///
/// Only runs of `min_words..=max_words` are returned; a run longer than
/// `max_words` is truncated rather than dropped.
pub fn phrase_spans(
    text: &str,
    stopwords: &HashSet<String>,
    min_words: usize,
    max_words: usize,
) -> Vec<String> {
    let mut phrases = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    let mut flush = |run: &mut Vec<&str>, phrases: &mut Vec<String>| {
        if run.len() >= min_words {
            let take = run.len().min(max_words);
            phrases.push(run[..take].join(" "));
        }
        run.clear();
    };

    for word in words(text) {
        if is_content_word(word, stopwords) {
            run.push(word);
        } else {
            flush(&mut run, &mut phrases);
        }
    }
    flush(&mut run, &mut phrases);

    phrases
}

/// Trailing content-word run of a span (the noun phrase a hierarchical
/// pattern's left side usually ends with)
pub fn trailing_phrase(span: &str, stopwords: &HashSet<String>, max_words: usize) -> Option<String> {
    let all = words(span);
    let run: Vec<&str> = all
        .iter()
        .rev()
        .take_while(|w| is_content_word(w, stopwords))
        .copied()
        .collect();
    if run.is_empty() {
        return None;
    }
    let mut run: Vec<&str> = run.into_iter().rev().collect();
    if run.len() > max_words {
        run = run.split_off(run.len() - max_words);
    }
    Some(run.join(" "))
}

/// Leading content-word run of a span (the right side of a pattern
/// usually starts with its noun phrase)
pub fn leading_phrase(span: &str, stopwords: &HashSet<String>, max_words: usize) -> Option<String> {
    let run: Vec<&str> = words(span)
        .into_iter()
        .take_while(|w| is_content_word(w, stopwords))
        .take(max_words)
        .collect();
    if run.is_empty() {
        None
    } else {
        Some(run.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_trims_punctuation() {
        assert_eq!(words("(neural networks),"), vec!["neural", "networks"]);
        assert_eq!(words("state-of-the-art."), vec!["state-of-the-art"]);
    }

    #[test]
    fn test_content_tokens_filters() {
        let stopwords = stopword_set();
        let tokens = content_tokens("The networks are trained on 100 samples", &stopwords);
        assert_eq!(tokens, vec!["networks", "trained", "samples"]);
    }

    #[test]
    fn test_phrase_spans_maximal_runs() {
        let stopwords = stopword_set();
        let phrases = phrase_spans(
            "Convolutional neural networks are a type of deep neural network.",
            &stopwords,
            2,
            6,
        );
        assert!(phrases.contains(&"Convolutional neural networks".to_string()));
        assert!(phrases.contains(&"deep neural network".to_string()));
    }

    #[test]
    fn test_phrase_spans_min_words() {
        let stopwords = stopword_set();
        // "type" is a lone content word between stopwords; excluded at min 2
        let phrases = phrase_spans("a type of thing", &stopwords, 2, 6);
        assert!(phrases.is_empty());
    }

    #[test]
    fn test_trailing_phrase() {
        let stopwords = stopword_set();
        let phrase = trailing_phrase("a type of convolutional neural networks", &stopwords, 4);
        assert_eq!(phrase.as_deref(), Some("convolutional neural networks"));
    }

    #[test]
    fn test_trailing_phrase_caps_length() {
        let stopwords = stopword_set();
        let phrase = trailing_phrase("very deep convolutional neural networks", &stopwords, 3);
        assert_eq!(phrase.as_deref(), Some("convolutional neural networks"));
    }

    #[test]
    fn test_leading_phrase() {
        let stopwords = stopword_set();
        let phrase = leading_phrase("deep neural network, which generalizes", &stopwords, 4);
        assert_eq!(phrase.as_deref(), Some("deep neural network"));
    }

    #[test]
    fn test_leading_phrase_none_on_stopword_start() {
        let stopwords = stopword_set();
        assert_eq!(leading_phrase("the networks", &stopwords, 4), None);
    }
}
