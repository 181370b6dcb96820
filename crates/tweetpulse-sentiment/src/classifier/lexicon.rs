//! In-process three-class backend driven by a word lexicon.

use crate::types::{ClassificationResult, SentimentLabel};

/// Word weights.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative. The summed score is clamped to `[-1.0, 1.0]`.
const LEXICON: &[(&str, f32)] = &[
    // Positive
    ("amazing", 0.5),
    ("awesome", 0.5),
    ("best", 0.5),
    ("better", 0.3),
    ("brilliant", 0.5),
    ("excellent", 0.5),
    ("excited", 0.4),
    ("fantastic", 0.5),
    ("fun", 0.3),
    ("glad", 0.3),
    ("good", 0.3),
    ("great", 0.4),
    ("happy", 0.4),
    ("impressive", 0.4),
    ("love", 0.5),
    ("loved", 0.5),
    ("nice", 0.3),
    ("perfect", 0.5),
    ("recommend", 0.4),
    ("thanks", 0.2),
    ("win", 0.4),
    ("wonderful", 0.5),
    // Negative
    ("angry", -0.5),
    ("annoying", -0.4),
    ("awful", -0.6),
    ("bad", -0.4),
    ("boring", -0.3),
    ("broken", -0.4),
    ("disappointed", -0.5),
    ("disappointing", -0.5),
    ("fail", -0.4),
    ("failed", -0.4),
    ("hate", -0.6),
    ("horrible", -0.6),
    ("poor", -0.4),
    ("problem", -0.3),
    ("sad", -0.4),
    ("scam", -0.7),
    ("terrible", -0.6),
    ("ugly", -0.4),
    ("useless", -0.5),
    ("worse", -0.4),
    ("worst", -0.6),
];

/// Scores closer to zero than this are neutral.
const NEUTRAL_BAND: f32 = 0.1;

/// Score a text string using the lexicon.
///
/// Splits text into lowercase words, sums matching weights, and clamps
/// the result to `[-1.0, 1.0]`. Returns `0.0` for empty or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let mut score = 0.0_f32;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        if let Some(&(_, weight)) = LEXICON.iter().find(|(lex_word, _)| *lex_word == w) {
            score += weight;
        }
    }
    score.clamp(-1.0, 1.0)
}

/// Lexicon-backed classifier.
///
/// Scores inside the neutral band map to `NEUTRAL` with confidence
/// `1 - |score|`. Outside it the sign picks `POSITIVE` or `NEGATIVE` with
/// confidence `0.5 + |score| / 2`, so weak single-word hits stay below the
/// default 0.60 cutoff.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    #[must_use]
    pub fn classify(self, text: &str) -> ClassificationResult {
        let score = lexicon_score(text);
        let magnitude = f64::from(score.abs());

        if score.abs() < NEUTRAL_BAND {
            ClassificationResult::new(SentimentLabel::Neutral, 1.0 - magnitude)
        } else if score > 0.0 {
            ClassificationResult::new(SentimentLabel::Positive, 0.5 + magnitude / 2.0)
        } else {
            ClassificationResult::new(SentimentLabel::Negative, 0.5 + magnitude / 2.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_returns_zero() {
        assert_eq!(lexicon_score(""), 0.0);
    }

    #[test]
    fn unknown_text_returns_zero() {
        assert_eq!(lexicon_score("the quick brown fox"), 0.0);
    }

    #[test]
    fn punctuation_stripped_from_words() {
        let score = lexicon_score("great!");
        assert!(score > 0.0, "expected positive score for 'great!', got {score}");
    }

    #[test]
    fn score_clamps_to_positive_one() {
        let text = "amazing awesome best brilliant excellent";
        assert_eq!(lexicon_score(text), 1.0);
    }

    #[test]
    fn score_clamps_to_negative_one() {
        let text = "awful hate horrible scam terrible worst";
        assert_eq!(lexicon_score(text), -1.0);
    }

    #[test]
    fn unknown_text_is_confidently_neutral() {
        let result = LexiconClassifier.classify("the quick brown fox");
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert!((result.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn strong_positive_text_clears_default_threshold() {
        let result = LexiconClassifier.classify("I love this, it's amazing");
        assert_eq!(result.label, SentimentLabel::Positive);
        assert!(result.confidence > 0.6, "got {}", result.confidence);
    }

    #[test]
    fn single_negative_word_maps_to_negative() {
        // problem (-0.3) -> 0.5 + 0.15
        let result = LexiconClassifier.classify("a small problem");
        assert_eq!(result.label, SentimentLabel::Negative);
        assert!((result.confidence - 0.65).abs() < 1e-6);
    }

    #[test]
    fn mixed_words_that_cancel_are_neutral() {
        // good (+0.3) + problem (-0.3)
        let result = LexiconClassifier.classify("good phone, one problem");
        assert_eq!(result.label, SentimentLabel::Neutral);
    }
}
