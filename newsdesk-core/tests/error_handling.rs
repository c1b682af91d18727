use newsdesk_core::{
    ArtifactError, ConfigError, CoreError, ErrorExt, ErrorReporter, LlmError, RedditApiError,
    StorageError,
};

#[test]
fn test_error_codes() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    assert_eq!(reddit_error.error_code(), "REDDIT_API");

    let storage_error = CoreError::Storage(StorageError::ObjectNotFound {
        bucket: "news-headlines-csvs".to_string(),
        key: "mlb_weather/mlb_weather_2025-05-01.csv".to_string(),
    });
    assert_eq!(storage_error.error_code(), "STORAGE");

    let llm_error = CoreError::Llm(LlmError::InvalidApiKey {
        provider: "openai".to_string(),
    });
    assert_eq!(llm_error.error_code(), "LLM");

    let artifact_error = CoreError::Artifact(ArtifactError::Missing {
        key: "mlb_rosters".to_string(),
        reason: "object not found".to_string(),
    });
    assert_eq!(artifact_error.error_code(), "ARTIFACT");

    let config_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "OPENAI_API_KEY".to_string(),
    });
    assert_eq!(config_error.error_code(), "CONFIG");
}

#[test]
fn test_nested_error_codes() {
    assert_eq!(
        RedditApiError::MissingAuthorizationCode.error_code(),
        "REDDIT_MISSING_CODE"
    );
    assert_eq!(
        ConfigError::UnknownJob {
            name: "x".to_string()
        }
        .error_code(),
        "CONFIG_UNKNOWN_JOB"
    );
}

#[test]
fn test_from_conversions() {
    let error: CoreError = RedditApiError::RequestTimeout.into();
    assert!(matches!(
        error,
        CoreError::RedditApi(RedditApiError::RequestTimeout)
    ));

    let error: CoreError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert_eq!(error.error_code(), "IO");
}

#[test]
fn test_user_friendly_messages() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    let message = reddit_error.user_friendly_message();
    assert!(message.contains("authentication token is invalid"));

    let config_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "S3_BUCKET_NAME".to_string(),
    });
    let message = config_error.user_friendly_message();
    assert!(message.contains("S3_BUCKET_NAME"));

    let missing = CoreError::Artifact(ArtifactError::Missing {
        key: "mlb_boxscores".to_string(),
        reason: "No records in tmp/mlb_boxscores_2025-06-01.csv".to_string(),
    });
    let message = missing.user_friendly_message();
    assert!(message.contains("mlb_boxscores"));
    assert!(message.contains("No records in"));
}

#[test]
fn test_rate_limit_without_retry_after() {
    let known = RedditApiError::RateLimitExceeded {
        retry_after: Some(30),
    };
    assert_eq!(known.to_string(), "Rate limit exceeded. Retry after 30 seconds");
    assert!(known.user_friendly_message().contains("30 seconds"));

    let unknown = RedditApiError::RateLimitExceeded { retry_after: None };
    assert_eq!(unknown.to_string(), "Rate limit exceeded");
    assert!(!unknown.user_friendly_message().contains("seconds"));

    let llm = LlmError::RateLimitExceeded {
        provider: "openai".to_string(),
        retry_after: None,
    };
    assert_eq!(llm.to_string(), "Rate limit exceeded for openai");
}

#[test]
fn test_error_reporter() {
    let reporter = ErrorReporter::new();
    let error = CoreError::RedditApi(RedditApiError::InvalidToken);

    assert_eq!(
        reporter.summary(&error),
        "[REDDIT_API] Reddit authentication token is invalid. Please re-authenticate."
    );
    reporter.report_error(&error);
    reporter.report_warning(&error);
}
