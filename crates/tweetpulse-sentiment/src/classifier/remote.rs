//! HTTP text-classification backend with label/score output.
//!
//! Speaks the request/response shape of hosted text-classification
//! pipelines: `POST {"inputs": [...]}` returns, per input, either the best
//! `{label, score}` or a ranked list of them.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::SentimentError;
use crate::types::{ClassificationResult, LabelSet, SentimentLabel};

/// Maximum number of texts per request.
pub(crate) const BATCH_SIZE: usize = 32;

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a [String],
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Prediction {
    Ranked(Vec<LabelScore>),
    Best(LabelScore),
}

/// Two- or three-class backend reached over HTTP.
pub struct RemoteClassifier {
    client: Client,
    url: String,
    token: Option<String>,
    label_set: LabelSet,
}

impl std::fmt::Debug for RemoteClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClassifier")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .field("label_set", &self.label_set)
            .finish_non_exhaustive()
    }
}

impl RemoteClassifier {
    /// Creates a client posting to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Config`] if `label_set` is four-class or the
    /// HTTP client cannot be built.
    pub fn new(
        url: &str,
        token: Option<&str>,
        label_set: LabelSet,
        timeout_secs: u64,
    ) -> Result<Self, SentimentError> {
        if label_set == LabelSet::FourClass {
            return Err(SentimentError::Config(
                "remote classifier supports two or three classes".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SentimentError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.to_owned(),
            token: token.map(ToOwned::to_owned),
            label_set,
        })
    }

    #[must_use]
    pub fn label_set(&self) -> LabelSet {
        self.label_set
    }

    /// Classifies `texts` in batches of [`BATCH_SIZE`], preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::ClassificationUnavailable`] if any request
    /// fails, the response count does not match the batch, or a label is
    /// outside this backend's label set.
    pub async fn classify_batch(
        &self,
        texts: &[String],
    ) -> Result<Vec<ClassificationResult>, SentimentError> {
        let mut results = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let mut request = self
                .client
                .post(&self.url)
                .json(&ClassifyRequest { inputs: chunk });
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }

            let response = request.send().await.map_err(|e| {
                SentimentError::ClassificationUnavailable(format!("classifier request failed: {e}"))
            })?;

            if !response.status().is_success() {
                return Err(SentimentError::ClassificationUnavailable(format!(
                    "classifier returned status {}",
                    response.status()
                )));
            }

            let predictions: Vec<Prediction> = response.json().await.map_err(|e| {
                SentimentError::ClassificationUnavailable(format!(
                    "classifier response parse error: {e}"
                ))
            })?;

            if predictions.len() != chunk.len() {
                return Err(SentimentError::ClassificationUnavailable(format!(
                    "classifier returned {} predictions for {} inputs",
                    predictions.len(),
                    chunk.len()
                )));
            }

            for prediction in &predictions {
                results.push(self.to_result(prediction)?);
            }
        }

        Ok(results)
    }

    fn to_result(&self, prediction: &Prediction) -> Result<ClassificationResult, SentimentError> {
        let best = match prediction {
            Prediction::Best(best) => Some(best),
            Prediction::Ranked(ranked) => ranked.iter().max_by(|a, b| a.score.total_cmp(&b.score)),
        }
        .ok_or_else(|| {
            SentimentError::ClassificationUnavailable("classifier returned no labels".to_string())
        })?;

        let label = parse_label(&best.label, self.label_set).ok_or_else(|| {
            SentimentError::ClassificationUnavailable(format!(
                "unrecognized label '{}' for {:?} classifier",
                best.label, self.label_set
            ))
        })?;

        Ok(ClassificationResult::new(label, best.score))
    }
}

/// Maps a backend label name onto the label set.
///
/// Accepts `positive`/`pos`, `negative`/`neg`, `neutral`/`neu` in any case,
/// and positional `LABEL_n` names (two classes: 0 negative, 1 positive;
/// three classes: 0 negative, 1 neutral, 2 positive).
fn parse_label(raw: &str, label_set: LabelSet) -> Option<SentimentLabel> {
    let lowered = raw.trim().to_ascii_lowercase();
    let label = match lowered.as_str() {
        "positive" | "pos" => SentimentLabel::Positive,
        "negative" | "neg" => SentimentLabel::Negative,
        "neutral" | "neu" => SentimentLabel::Neutral,
        other => {
            let index = other.strip_prefix("label_")?.parse::<usize>().ok()?;
            match (label_set, index) {
                (_, 0) => SentimentLabel::Negative,
                (LabelSet::TwoClass, 1) | (LabelSet::ThreeClass, 2) => SentimentLabel::Positive,
                (LabelSet::ThreeClass, 1) => SentimentLabel::Neutral,
                _ => return None,
            }
        }
    };
    label_set.contains(label).then_some(label)
}
