//! Amazon Comprehend `DetectSentiment` client.

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use super::sigv4::{amz_date, authorization_header, AwsCredentials, SignableRequest};
use crate::error::SentimentError;
use crate::types::{ClassificationResult, SentimentLabel};

const SERVICE: &str = "comprehend";
const TARGET: &str = "Comprehend_20171127.DetectSentiment";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DetectSentimentRequest<'a> {
    text: &'a str,
    language_code: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DetectSentimentResponse {
    sentiment: SentimentLabel,
    sentiment_score: Option<SentimentScore>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SentimentScore {
    positive: f64,
    negative: f64,
    neutral: f64,
    mixed: f64,
}

/// Four-class sentiment backend.
#[derive(Debug)]
pub struct ComprehendClient {
    client: Client,
    credentials: AwsCredentials,
    region: String,
    language_code: String,
    endpoint: Url,
    host: String,
}

impl ComprehendClient {
    /// Creates a client for `region`. `endpoint` overrides the regional
    /// `https://comprehend.{region}.amazonaws.com/` URL (used by tests).
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Config`] if the HTTP client cannot be built
    /// or the endpoint is not a valid URL.
    pub fn new(
        access_key_id: &str,
        secret_access_key: &str,
        region: &str,
        language_code: &str,
        timeout_secs: u64,
        endpoint: Option<&str>,
    ) -> Result<Self, SentimentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SentimentError::Config(format!("failed to build HTTP client: {e}")))?;

        let raw_endpoint = endpoint.map_or_else(
            || format!("https://comprehend.{region}.amazonaws.com/"),
            ToOwned::to_owned,
        );
        let endpoint = Url::parse(&raw_endpoint).map_err(|e| {
            SentimentError::Config(format!("invalid Comprehend endpoint '{raw_endpoint}': {e}"))
        })?;
        let host = match (endpoint.host_str(), endpoint.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_owned(),
            (None, _) => {
                return Err(SentimentError::Config(format!(
                    "Comprehend endpoint '{raw_endpoint}' has no host"
                )))
            }
        };

        Ok(Self {
            client,
            credentials: AwsCredentials {
                access_key_id: access_key_id.to_owned(),
                secret_access_key: secret_access_key.to_owned(),
            },
            region: region.to_owned(),
            language_code: language_code.to_owned(),
            endpoint,
            host,
        })
    }

    /// Classifies one text.
    ///
    /// Comprehend rejects empty documents, so blank text is reported as
    /// `NEUTRAL` without a network call.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::ClassificationUnavailable`] on transport
    /// failure, timeout, a non-2xx status or an unreadable response.
    pub async fn detect_sentiment(
        &self,
        text: &str,
    ) -> Result<ClassificationResult, SentimentError> {
        if text.trim().is_empty() {
            return Ok(ClassificationResult::new(SentimentLabel::Neutral, 1.0));
        }

        let payload = serde_json::to_vec(&DetectSentimentRequest {
            text,
            language_code: &self.language_code,
        })
        .map_err(|e| SentimentError::ClassificationUnavailable(format!("encode request: {e}")))?;

        let now = Utc::now();
        let date = amz_date(now);
        let headers = [
            ("content-type", CONTENT_TYPE),
            ("host", self.host.as_str()),
            ("x-amz-date", date.as_str()),
            ("x-amz-target", TARGET),
        ];
        let authorization = authorization_header(
            &self.credentials,
            &self.region,
            SERVICE,
            now,
            &SignableRequest {
                method: "POST",
                path: self.endpoint.path(),
                headers: &headers,
                payload: &payload,
            },
        )
        .map_err(|e| SentimentError::ClassificationUnavailable(format!("sign request: {e}")))?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("content-type", CONTENT_TYPE)
            .header("x-amz-date", &date)
            .header("x-amz-target", TARGET)
            .header("authorization", authorization)
            .body(payload)
            .send()
            .await
            .map_err(|e| SentimentError::ClassificationUnavailable(format!("Comprehend request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SentimentError::ClassificationUnavailable(format!(
                "Comprehend returned status {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: DetectSentimentResponse = response.json().await.map_err(|e| {
            SentimentError::ClassificationUnavailable(format!("Comprehend response parse error: {e}"))
        })?;

        Ok(to_result(&parsed))
    }
}

fn to_result(response: &DetectSentimentResponse) -> ClassificationResult {
    let confidence = response.sentiment_score.as_ref().map_or(1.0, |score| {
        match response.sentiment {
            SentimentLabel::Positive => score.positive,
            SentimentLabel::Negative => score.negative,
            SentimentLabel::Neutral => score.neutral,
            SentimentLabel::Mixed => score.mixed,
        }
    });
    ClassificationResult::new(response.sentiment, confidence)
}
