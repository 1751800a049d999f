// ============================================================
// Layer 4 — Text Normalizer
// ============================================================
// Cleans a raw tweet before tokenisation.
//
// Cleaning steps (applied in order, none reversible):
//   1. Drop every character that is not an ASCII letter or whitespace
//      (digits, punctuation, emoji, URLs' slashes and dots ...)
//   2. Lowercase
//   3. Collapse whitespace runs to one space and trim the ends
//   4. Split into word tokens, breaking up the Treebank
//      contractions (cannot → can not, gonna → gon na, ...)
//   5. Drop English stopwords
//   6. Re-join the survivors with single spaces
//
// Example:
//   "Forest fire near La Ronge Sask. Canada!!"
//   → "forest fire near la ronge sask canada"
//
// The result may be empty (e.g. "@ 123 !!" or "to be or not").
// That is not an error; it simply encodes to padding later on.
//
// Reference: Rust Book §8 (Strings in Rust)
//            Rust Book §13 (Iterators)

use std::collections::HashSet;

/// The NLTK English stopword list (179 words).
pub const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're",
    "you've", "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he",
    "him", "his", "himself", "she", "she's", "her", "hers", "herself", "it", "it's",
    "its", "itself", "they", "them", "their", "theirs", "themselves", "what",
    "which", "who", "whom", "this", "that", "that'll", "these", "those", "am", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "having",
    "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about",
    "against", "between", "into", "through", "during", "before", "after", "above",
    "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some",
    "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very",
    "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn",
    "couldn't", "didn", "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn",
    "hasn't", "haven", "haven't", "isn", "isn't", "ma", "mightn", "mightn't",
    "mustn", "mustn't", "needn", "needn't", "shan", "shan't", "shouldn",
    "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// Single words the Penn Treebank tokenizer splits in two.
/// Apostrophe forms ('tis, d'ye) cannot survive step 1 and are left out.
const TREEBANK_SPLITS: &[(&str, &str, &str)] = &[
    ("cannot", "can", "not"),
    ("gimme",  "gim", "me"),
    ("gonna",  "gon", "na"),
    ("gotta",  "got", "ta"),
    ("lemme",  "lem", "me"),
    ("wanna",  "wan", "na"),
];

/// Word tokens of already-cleaned text.
fn word_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace().flat_map(|word| {
        match TREEBANK_SPLITS.iter().find(|(whole, _, _)| *whole == word) {
            Some(&(_, head, tail)) => vec![head, tail],
            None => vec![word],
        }
    })
}

/// Stateless apart from the stopword set built once in `new`.
pub struct TextNormalizer {
    stopwords: HashSet<&'static str>,
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self { stopwords: STOPWORDS.iter().copied().collect() }
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Clean a raw string into lowercase, stopword-free words.
    pub fn clean(&self, text: &str) -> String {
        // ── Steps 1 + 2: keep letters and whitespace, lowercase ───────────────
        // Only ASCII letters survive, so ASCII lowercasing is complete.
        let letters: String = text
            .chars()
            .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        // ── Steps 3–6: split into words, filter, re-join ──────────────────────
        // split_whitespace already collapses runs and ignores the ends.
        word_tokens(&letters)
            .filter(|word| !self.is_stopword(word))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn is_clean(s: &str) -> bool {
        !s.starts_with(' ')
            && !s.ends_with(' ')
            && !s.contains("  ")
            && s.chars().all(|c| c.is_ascii_lowercase() || c == ' ')
    }

    #[test]
    fn test_strips_punctuation_digits_and_stopwords() {
        let n = TextNormalizer::new();
        assert_eq!(
            n.clean("Forest fire near La Ronge Sask. Canada!!"),
            "forest fire near la ronge sask canada"
        );
        assert_eq!(
            n.clean("13,000 people receive #wildfires evacuation orders in California"),
            "people receive wildfires evacuation orders california"
        );
    }

    #[test]
    fn test_collapses_whitespace() {
        let n = TextNormalizer::new();
        assert_eq!(n.clean("  flood \t\n  warning   issued "), "flood warning issued");
    }

    #[test]
    fn test_apostrophes_are_removed_before_stopword_check() {
        // "Don't" becomes "dont", which is not in the list
        let n = TextNormalizer::new();
        assert_eq!(n.clean("Don't panic"), "dont panic");
    }

    #[test]
    fn test_treebank_contractions_are_split() {
        let n = TextNormalizer::new();
        assert_eq!(n.clean("I cannot stop"), "stop");
        assert_eq!(n.clean("gimme shelter"), "gim shelter");
        assert_eq!(n.clean("Gonna be fine"), "gon na fine");
        assert_eq!(n.clean("lemme know, gotta run"), "lem know got ta run");
        assert_eq!(n.clean("wanna"), "wan na");
        // Only whole words split
        assert_eq!(n.clean("cannoteer gonnam"), "cannoteer gonnam");
    }

    #[test]
    fn test_non_ascii_letters_are_dropped() {
        let n = TextNormalizer::new();
        assert_eq!(n.clean("Café déjà vu"), "caf dj vu");
    }

    #[test]
    fn test_empty_and_all_stopword_inputs() {
        let n = TextNormalizer::new();
        assert_eq!(n.clean(""), "");
        assert_eq!(n.clean("To be or not to be"), "");
        assert_eq!(n.clean("@@ 123 !!"), "");
    }

    #[test]
    fn test_output_only_lowercase_words_and_single_spaces() {
        let n = TextNormalizer::new();
        let inputs = [
            "Just happened a terrible car crash",
            "http://t.co/abc123 RT @user: ABLAZE!!! #fire",
            "\u{00A0}Heard about #earthquake\u{00A0}is different cities, stay safe everyone.",
            "9/11 ... 2,000 ;-) \r\n",
            "MiXeD   CaSe\t\ttabs",
        ];
        for input in inputs {
            let out = n.clean(input);
            assert!(is_clean(&out), "not clean: {out:?} (from {input:?})");
        }
    }

    #[test]
    fn test_stopword_list_size() {
        assert_eq!(STOPWORDS.len(), 179);
        assert!(TextNormalizer::new().is_stopword("the"));
    }
}
