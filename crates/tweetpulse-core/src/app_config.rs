use std::collections::BTreeSet;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which sentiment backend classifies the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    /// Amazon Comprehend `DetectSentiment`: four labels, no confidence cutoff.
    Comprehend,
    /// HTTP text-classification endpoint returning label/score pairs.
    Remote,
    /// In-process word lexicon.
    Lexicon,
}

impl std::fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifierKind::Comprehend => write!(f, "comprehend"),
            ClassifierKind::Remote => write!(f, "remote"),
            ClassifierKind::Lexicon => write!(f, "lexicon"),
        }
    }
}

/// Post categories removed from search results via negated operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchFilter {
    Retweets,
    Replies,
    Quotes,
}

impl SearchFilter {
    /// The search operator that excludes this category.
    #[must_use]
    pub fn operator(self) -> &'static str {
        match self {
            SearchFilter::Retweets => "-is:retweet",
            SearchFilter::Replies => "-is:reply",
            SearchFilter::Quotes => "-is:quote",
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub twitter_bearer_token: String,
    pub twitter_api_base_url: String,
    pub search_page_size: u8,
    pub search_page_count: u32,
    pub search_exclusions: BTreeSet<SearchFilter>,
    pub request_timeout_secs: u64,
    pub classifier: ClassifierKind,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub aws_region: String,
    pub comprehend_endpoint: Option<String>,
    pub language_code: String,
    pub classifier_url: Option<String>,
    pub classifier_token: Option<String>,
    pub classifier_classes: u8,
    pub confidence_threshold: f64,
    pub classify_concurrency: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("twitter_bearer_token", &"[redacted]")
            .field("twitter_api_base_url", &self.twitter_api_base_url)
            .field("search_page_size", &self.search_page_size)
            .field("search_page_count", &self.search_page_count)
            .field("search_exclusions", &self.search_exclusions)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("classifier", &self.classifier)
            .field(
                "aws_access_key_id",
                &self.aws_access_key_id.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "aws_secret_access_key",
                &self.aws_secret_access_key.as_ref().map(|_| "[redacted]"),
            )
            .field("aws_region", &self.aws_region)
            .field("comprehend_endpoint", &self.comprehend_endpoint)
            .field("language_code", &self.language_code)
            .field("classifier_url", &self.classifier_url)
            .field(
                "classifier_token",
                &self.classifier_token.as_ref().map(|_| "[redacted]"),
            )
            .field("classifier_classes", &self.classifier_classes)
            .field("confidence_threshold", &self.confidence_threshold)
            .field("classify_concurrency", &self.classify_concurrency)
            .finish()
    }
}
