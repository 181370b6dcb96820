use std::collections::BTreeSet;

use crate::app_config::{AppConfig, ClassifierKind, Environment, SearchFilter};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Pure over `lookup` so tests can drive it from a `HashMap` without touching
/// the process environment.
#[allow(clippy::too_many_lines)]
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let twitter_bearer_token = require("TWITTER_BEARER_TOKEN").or_else(|missing| {
        optional("BEARER_TOKEN").ok_or(missing)
    })?;

    let env = parse_environment(&or_default("TWEETPULSE_ENV", "development"));

    let bind_addr = or_default("TWEETPULSE_BIND_ADDR", "0.0.0.0:8080")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("TWEETPULSE_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("TWEETPULSE_LOG_LEVEL", "info");
    let twitter_api_base_url = or_default(
        "TWEETPULSE_TWITTER_API_BASE_URL",
        "https://api.twitter.com/2/",
    );

    let search_page_size = or_default("TWEETPULSE_SEARCH_PAGE_SIZE", "100")
        .parse::<u8>()
        .map_err(|e| invalid("TWEETPULSE_SEARCH_PAGE_SIZE", e.to_string()))?;
    if !(10..=100).contains(&search_page_size) {
        return Err(invalid(
            "TWEETPULSE_SEARCH_PAGE_SIZE",
            format!("{search_page_size} is outside 10..=100"),
        ));
    }

    let search_page_count = or_default("TWEETPULSE_SEARCH_PAGE_COUNT", "2")
        .parse::<u32>()
        .map_err(|e| invalid("TWEETPULSE_SEARCH_PAGE_COUNT", e.to_string()))?;
    if search_page_count == 0 {
        return Err(invalid(
            "TWEETPULSE_SEARCH_PAGE_COUNT",
            "must be at least 1".to_string(),
        ));
    }

    let search_exclusions = parse_search_filters(&or_default("TWEETPULSE_SEARCH_EXCLUDE", "retweets"))
        .map_err(|reason| invalid("TWEETPULSE_SEARCH_EXCLUDE", reason))?;

    let request_timeout_secs = parse_u64("TWEETPULSE_REQUEST_TIMEOUT_SECS", "30")?;

    let classifier = parse_classifier_kind(&or_default("TWEETPULSE_CLASSIFIER", "comprehend"))
        .ok_or_else(|| {
            invalid(
                "TWEETPULSE_CLASSIFIER",
                "expected one of: comprehend, remote, lexicon".to_string(),
            )
        })?;

    let (aws_access_key_id, aws_secret_access_key) = if classifier == ClassifierKind::Comprehend {
        (
            Some(require("AWS_ACCESS_KEY_ID")?),
            Some(require("AWS_SECRET_ACCESS_KEY")?),
        )
    } else {
        (optional("AWS_ACCESS_KEY_ID"), optional("AWS_SECRET_ACCESS_KEY"))
    };
    let aws_region = or_default("AWS_REGION", "us-east-1");
    let comprehend_endpoint = optional("TWEETPULSE_COMPREHEND_ENDPOINT");
    let language_code = or_default("TWEETPULSE_LANGUAGE_CODE", "en");

    let classifier_url = if classifier == ClassifierKind::Remote {
        Some(require("TWEETPULSE_CLASSIFIER_URL")?)
    } else {
        optional("TWEETPULSE_CLASSIFIER_URL")
    };
    let classifier_token = optional("TWEETPULSE_CLASSIFIER_TOKEN");

    let classifier_classes = or_default("TWEETPULSE_CLASSIFIER_CLASSES", "3")
        .parse::<u8>()
        .map_err(|e| invalid("TWEETPULSE_CLASSIFIER_CLASSES", e.to_string()))?;
    if !matches!(classifier_classes, 2 | 3) {
        return Err(invalid(
            "TWEETPULSE_CLASSIFIER_CLASSES",
            format!("{classifier_classes} is not 2 or 3"),
        ));
    }

    let confidence_threshold = or_default("TWEETPULSE_CONFIDENCE_THRESHOLD", "0.60")
        .parse::<f64>()
        .map_err(|e| invalid("TWEETPULSE_CONFIDENCE_THRESHOLD", e.to_string()))?;
    if !(0.0..=1.0).contains(&confidence_threshold) {
        return Err(invalid(
            "TWEETPULSE_CONFIDENCE_THRESHOLD",
            format!("{confidence_threshold} is outside [0, 1]"),
        ));
    }

    let classify_concurrency = parse_usize("TWEETPULSE_CLASSIFY_CONCURRENCY", "8")?;
    if classify_concurrency == 0 {
        return Err(invalid(
            "TWEETPULSE_CLASSIFY_CONCURRENCY",
            "must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        twitter_bearer_token,
        twitter_api_base_url,
        search_page_size,
        search_page_count,
        search_exclusions,
        request_timeout_secs,
        classifier,
        aws_access_key_id,
        aws_secret_access_key,
        aws_region,
        comprehend_endpoint,
        language_code,
        classifier_url,
        classifier_token,
        classifier_classes,
        confidence_threshold,
        classify_concurrency,
    })
}

/// Parse a comma-separated exclusion list such as `retweets,replies`.
///
/// Blank input yields an empty set.
///
/// # Errors
///
/// Returns a message naming the first unrecognized entry.
pub fn parse_search_filters(raw: &str) -> Result<BTreeSet<SearchFilter>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.to_ascii_lowercase().as_str() {
            "retweets" | "retweet" => Ok(SearchFilter::Retweets),
            "replies" | "reply" => Ok(SearchFilter::Replies),
            "quotes" | "quote" => Ok(SearchFilter::Quotes),
            other => Err(format!("unknown search filter '{other}'")),
        })
        .collect()
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

fn parse_classifier_kind(s: &str) -> Option<ClassifierKind> {
    match s.trim().to_ascii_lowercase().as_str() {
        "comprehend" => Some(ClassifierKind::Comprehend),
        "remote" => Some(ClassifierKind::Remote),
        "lexicon" => Some(ClassifierKind::Lexicon),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    /// Returns a map with all required env vars populated with valid defaults.
    fn full_env<'a>() -> HashMap<&'a str, &'a str> {
        let mut m = HashMap::new();
        m.insert("TWITTER_BEARER_TOKEN", "test-bearer");
        m.insert("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE");
        m.insert("AWS_SECRET_ACCESS_KEY", "secret");
        m
    }

    #[test]
    fn parse_environment_production() {
        assert_eq!(parse_environment("production"), Environment::Production);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("unknown"), Environment::Development);
    }

    #[test]
    fn build_app_config_fails_without_bearer_token() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "TWITTER_BEARER_TOKEN"),
            "expected MissingEnvVar(TWITTER_BEARER_TOKEN), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_accepts_legacy_bearer_token_name() {
        let mut map = full_env();
        map.remove("TWITTER_BEARER_TOKEN");
        map.insert("BEARER_TOKEN", "legacy-bearer");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.twitter_bearer_token, "legacy-bearer");
    }

    #[test]
    fn build_app_config_succeeds_with_all_required_vars() {
        let map = full_env();
        let result = build_app_config(lookup_from_map(&map));
        assert!(result.is_ok(), "expected Ok, got: {result:?}");
        let cfg = result.unwrap();
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.twitter_api_base_url, "https://api.twitter.com/2/");
        assert_eq!(cfg.search_page_size, 100);
        assert_eq!(cfg.search_page_count, 2);
        assert_eq!(
            cfg.search_exclusions.iter().copied().collect::<Vec<_>>(),
            vec![SearchFilter::Retweets]
        );
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.classifier, ClassifierKind::Comprehend);
        assert_eq!(cfg.aws_region, "us-east-1");
        assert_eq!(cfg.language_code, "en");
        assert_eq!(cfg.classifier_classes, 3);
        assert!((cfg.confidence_threshold - 0.60).abs() < f64::EPSILON);
        assert_eq!(cfg.classify_concurrency, 8);
    }

    #[test]
    fn comprehend_requires_aws_credentials() {
        let mut map = full_env();
        map.remove("AWS_SECRET_ACCESS_KEY");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "AWS_SECRET_ACCESS_KEY"),
            "got: {result:?}"
        );
    }

    #[test]
    fn lexicon_classifier_needs_no_aws_credentials() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("TWITTER_BEARER_TOKEN", "test-bearer");
        map.insert("TWEETPULSE_CLASSIFIER", "lexicon");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.classifier, ClassifierKind::Lexicon);
        assert!(cfg.aws_access_key_id.is_none());
    }

    #[test]
    fn remote_classifier_requires_url() {
        let mut map = full_env();
        map.insert("TWEETPULSE_CLASSIFIER", "remote");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "TWEETPULSE_CLASSIFIER_URL"),
            "got: {result:?}"
        );
    }

    #[test]
    fn unknown_classifier_is_rejected() {
        let mut map = full_env();
        map.insert("TWEETPULSE_CLASSIFIER", "vibes");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TWEETPULSE_CLASSIFIER"),
            "got: {result:?}"
        );
    }

    #[test]
    fn page_size_above_api_maximum_is_rejected() {
        let mut map = full_env();
        map.insert("TWEETPULSE_SEARCH_PAGE_SIZE", "150");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TWEETPULSE_SEARCH_PAGE_SIZE"),
            "got: {result:?}"
        );
    }

    #[test]
    fn threshold_outside_unit_interval_is_rejected() {
        let mut map = full_env();
        map.insert("TWEETPULSE_CONFIDENCE_THRESHOLD", "1.5");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TWEETPULSE_CONFIDENCE_THRESHOLD"),
            "got: {result:?}"
        );
    }

    #[test]
    fn classifier_classes_must_be_two_or_three() {
        let mut map = full_env();
        map.insert("TWEETPULSE_CLASSIFIER_CLASSES", "4");
        assert!(build_app_config(lookup_from_map(&map)).is_err());
    }

    #[test]
    fn invalid_bind_addr_is_rejected() {
        let mut map = full_env();
        map.insert("TWEETPULSE_BIND_ADDR", "not-a-socket-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TWEETPULSE_BIND_ADDR"),
            "got: {result:?}"
        );
    }

    #[test]
    fn search_filters_parse_and_dedupe() {
        let filters = parse_search_filters(" replies, retweets ,reply").unwrap();
        assert_eq!(
            filters.into_iter().collect::<Vec<_>>(),
            vec![SearchFilter::Retweets, SearchFilter::Replies]
        );
    }

    #[test]
    fn blank_search_filters_yield_empty_set() {
        assert!(parse_search_filters("").unwrap().is_empty());
    }

    #[test]
    fn unknown_search_filter_is_an_error() {
        let err = parse_search_filters("retweets,links").unwrap_err();
        assert!(err.contains("links"), "got: {err}");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let map = full_env();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("test-bearer"));
        assert!(!rendered.contains("AKIDEXAMPLE"));
        assert!(rendered.contains("[redacted]"));
    }
}
