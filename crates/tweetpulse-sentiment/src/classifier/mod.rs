//! Sentiment backends behind a single classification interface.
//!
//! Each backend fixes its own label set and whether a confidence cutoff
//! applies. The four-class Comprehend backend reports labels as certain; the
//! remote and lexicon backends report scores that the aggregator compares
//! against the configured threshold.

mod comprehend;
mod lexicon;
mod remote;
mod sigv4;

use futures::stream::{self, StreamExt, TryStreamExt};
use tweetpulse_core::{AppConfig, ClassifierKind};

use crate::error::SentimentError;
use crate::types::{ClassificationResult, LabelSet};

pub use comprehend::ComprehendClient;
pub use lexicon::{lexicon_score, LexiconClassifier};
pub use remote::RemoteClassifier;

/// Progress is logged once per this many classified items.
const PROGRESS_EVERY: usize = 50;

#[derive(Debug)]
pub enum Classifier {
    /// Four labels, no confidence cutoff.
    Comprehend(ComprehendClient),
    /// Two or three labels, cut off at `threshold`.
    Remote {
        client: RemoteClassifier,
        threshold: f64,
    },
    /// Three labels, cut off at `threshold`.
    Lexicon {
        classifier: LexiconClassifier,
        threshold: f64,
    },
}

impl Classifier {
    /// Selects and builds the backend named by `config.classifier`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Config`] when the backend's credentials or
    /// URL are missing, or its HTTP client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, SentimentError> {
        match config.classifier {
            ClassifierKind::Comprehend => {
                let (Some(key_id), Some(secret)) =
                    (&config.aws_access_key_id, &config.aws_secret_access_key)
                else {
                    return Err(SentimentError::Config(
                        "comprehend classifier needs AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY"
                            .to_string(),
                    ));
                };
                let client = ComprehendClient::new(
                    key_id,
                    secret,
                    &config.aws_region,
                    &config.language_code,
                    config.request_timeout_secs,
                    config.comprehend_endpoint.as_deref(),
                )?;
                Ok(Classifier::Comprehend(client))
            }
            ClassifierKind::Remote => {
                let url = config.classifier_url.as_deref().ok_or_else(|| {
                    SentimentError::Config(
                        "remote classifier needs TWEETPULSE_CLASSIFIER_URL".to_string(),
                    )
                })?;
                let label_set =
                    LabelSet::from_class_count(config.classifier_classes).ok_or_else(|| {
                        SentimentError::Config(format!(
                            "unsupported class count {}",
                            config.classifier_classes
                        ))
                    })?;
                let client = RemoteClassifier::new(
                    url,
                    config.classifier_token.as_deref(),
                    label_set,
                    config.request_timeout_secs,
                )?;
                Ok(Classifier::Remote {
                    client,
                    threshold: config.confidence_threshold,
                })
            }
            ClassifierKind::Lexicon => Ok(Classifier::Lexicon {
                classifier: LexiconClassifier,
                threshold: config.confidence_threshold,
            }),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ClassifierKind {
        match self {
            Classifier::Comprehend(_) => ClassifierKind::Comprehend,
            Classifier::Remote { .. } => ClassifierKind::Remote,
            Classifier::Lexicon { .. } => ClassifierKind::Lexicon,
        }
    }

    #[must_use]
    pub fn label_set(&self) -> LabelSet {
        match self {
            Classifier::Comprehend(_) => LabelSet::FourClass,
            Classifier::Remote { client, .. } => client.label_set(),
            Classifier::Lexicon { .. } => LabelSet::ThreeClass,
        }
    }

    /// Cutoff the aggregator applies to this backend's results.
    #[must_use]
    pub fn confidence_threshold(&self) -> Option<f64> {
        match self {
            Classifier::Comprehend(_) => None,
            Classifier::Remote { threshold, .. } | Classifier::Lexicon { threshold, .. } => {
                Some(*threshold)
            }
        }
    }

    /// Classifies a single text.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::ClassificationUnavailable`] if the backend
    /// cannot be reached or answers with an error.
    pub async fn classify(&self, text: &str) -> Result<ClassificationResult, SentimentError> {
        match self {
            Classifier::Comprehend(client) => client.detect_sentiment(text).await,
            Classifier::Remote { client, .. } => {
                let mut results = client.classify_batch(&[text.to_owned()]).await?;
                results.pop().ok_or_else(|| {
                    SentimentError::ClassificationUnavailable(
                        "classifier returned no result".to_string(),
                    )
                })
            }
            Classifier::Lexicon { classifier, .. } => Ok(classifier.classify(text)),
        }
    }

    /// Classifies every text, returning results in input order.
    ///
    /// Comprehend calls run on a pool of at most `concurrency` in-flight
    /// requests; the remote backend is called in batches. The first failure
    /// aborts the whole run and no partial results are returned.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::ClassificationUnavailable`] on any backend
    /// failure.
    pub async fn classify_all(
        &self,
        texts: &[String],
        concurrency: usize,
    ) -> Result<Vec<ClassificationResult>, SentimentError> {
        let total = texts.len();
        tracing::info!(
            backend = %self.kind(),
            total,
            "classifying corpus"
        );

        let results = match self {
            Classifier::Comprehend(client) => {
                let requests: Vec<_> = texts
                    .iter()
                    .enumerate()
                    .map(|(idx, text)| async move {
                        if idx % PROGRESS_EVERY == 0 {
                            tracing::debug!(done = idx, total, "classification progress");
                        }
                        client.detect_sentiment(text).await
                    })
                    .collect();
                stream::iter(requests)
                    .buffered(concurrency.max(1))
                    .try_collect::<Vec<_>>()
                    .await?
            }
            Classifier::Remote { client, .. } => client.classify_batch(texts).await?,
            Classifier::Lexicon { classifier, .. } => {
                texts.iter().map(|text| classifier.classify(text)).collect()
            }
        };

        tracing::info!(backend = %self.kind(), total, "classification finished");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SentimentLabel;

    fn lexicon() -> Classifier {
        Classifier::Lexicon {
            classifier: LexiconClassifier,
            threshold: 0.6,
        }
    }

    #[test]
    fn lexicon_backend_is_three_class_with_threshold() {
        let classifier = lexicon();
        assert_eq!(classifier.kind(), ClassifierKind::Lexicon);
        assert_eq!(classifier.label_set(), LabelSet::ThreeClass);
        assert_eq!(classifier.confidence_threshold(), Some(0.6));
    }

    #[test]
    fn comprehend_backend_has_no_threshold() {
        let client =
            ComprehendClient::new("id", "secret", "us-east-1", "en", 5, None).unwrap();
        let classifier = Classifier::Comprehend(client);
        assert_eq!(classifier.label_set(), LabelSet::FourClass);
        assert_eq!(classifier.confidence_threshold(), None);
    }

    #[tokio::test]
    async fn classify_all_preserves_input_order() {
        let texts = vec![
            "this is awful".to_string(),
            "nothing to see".to_string(),
            "I love it, amazing".to_string(),
        ];
        let results = lexicon().classify_all(&texts, 4).await.unwrap();
        let labels: Vec<SentimentLabel> = results.iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            vec![
                SentimentLabel::Negative,
                SentimentLabel::Neutral,
                SentimentLabel::Positive
            ]
        );
    }

    #[tokio::test]
    async fn classify_matches_classify_all() {
        let classifier = lexicon();
        let single = classifier.classify("great phone").await.unwrap();
        let all = classifier
            .classify_all(&["great phone".to_string()], 1)
            .await
            .unwrap();
        assert_eq!(all, vec![single]);
    }
}
