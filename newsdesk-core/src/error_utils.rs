use crate::error::*;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("❌ {}", self);
        match self {
            CoreError::RedditApi(e) => {
                error!("Reddit API error details: {:?}", e);
            }
            CoreError::Storage(e) => {
                error!("Storage error details: {:?}", e);
            }
            CoreError::Artifact(e) => {
                error!("Artifact error details: {:?}", e);
            }
            CoreError::Llm(e) => {
                error!("LLM error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("⚠️ {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.user_friendly_message(),
            CoreError::Storage(e) => e.user_friendly_message(),
            CoreError::Artifact(e) => e.user_friendly_message(),
            CoreError::Llm(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Io(e) => format!("File system error: {}", e),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::InvalidInput { message } => format!("Invalid input: {}", message),
            _ => "An unexpected error occurred.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::RedditApi(_) => "REDDIT_API".to_string(),
            CoreError::Storage(_) => "STORAGE".to_string(),
            CoreError::Artifact(_) => "ARTIFACT".to_string(),
            CoreError::Llm(_) => "LLM".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }
}

impl ErrorExt for RedditApiError {
    fn log_error(&self) -> &Self {
        error!("RedditApiError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("RedditApiError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { reason } => format!(
                "Reddit authorization failed ({}). Please check your app credentials.",
                reason
            ),
            RedditApiError::MissingAuthorizationCode => {
                "Reddit redirected back without an authorization code. Please run the authorization again.".to_string()
            }
            RedditApiError::CallbackFailed { reason } => format!(
                "Could not receive the Reddit redirect: {}. Is the redirect port free?",
                reason
            ),
            RedditApiError::RateLimitExceeded {
                retry_after: Some(seconds),
            } => format!("Too many requests. Reddit asked to wait {} seconds.", seconds),
            RedditApiError::RateLimitExceeded { retry_after: None } => {
                "Too many requests to Reddit. Please wait before trying again.".to_string()
            }
            RedditApiError::Forbidden { resource } => format!(
                "Access denied to {}. You may not have permission to view this content.",
                resource
            ),
            RedditApiError::NotFound { resource } => {
                format!("Reddit resource '{}' not found or is private.", resource)
            }
            RedditApiError::InvalidToken => {
                "Reddit authentication token is invalid. Please re-authenticate.".to_string()
            }
            RedditApiError::RequestTimeout => "Request to Reddit timed out.".to_string(),
            _ => "Reddit API error occurred.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => "REDDIT_AUTH_FAILED".to_string(),
            RedditApiError::MissingAuthorizationCode => "REDDIT_MISSING_CODE".to_string(),
            RedditApiError::CallbackFailed { .. } => "REDDIT_CALLBACK_FAILED".to_string(),
            RedditApiError::RateLimitExceeded { .. } => "REDDIT_RATE_LIMIT".to_string(),
            RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN".to_string(),
            RedditApiError::NotFound { .. } => "REDDIT_NOT_FOUND".to_string(),
            RedditApiError::InvalidToken => "REDDIT_INVALID_TOKEN".to_string(),
            RedditApiError::RequestTimeout => "REDDIT_TIMEOUT".to_string(),
            RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE".to_string(),
            RedditApiError::ServerError { .. } => "REDDIT_SERVER_ERROR".to_string(),
        }
    }
}

impl ErrorExt for StorageError {
    fn log_error(&self) -> &Self {
        error!("StorageError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("StorageError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            StorageError::UploadFailed { bucket, key, .. } => format!(
                "Could not upload to s3://{}/{}. Check the AWS credentials and bucket name.",
                bucket, key
            ),
            StorageError::DownloadFailed { bucket, key, .. } => format!(
                "Could not download s3://{}/{}. Check the AWS credentials and bucket name.",
                bucket, key
            ),
            StorageError::ObjectNotFound { bucket, key } => {
                format!("s3://{}/{} does not exist yet.", bucket, key)
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            StorageError::UploadFailed { .. } => "STORAGE_UPLOAD_FAILED".to_string(),
            StorageError::DownloadFailed { .. } => "STORAGE_DOWNLOAD_FAILED".to_string(),
            StorageError::ObjectNotFound { .. } => "STORAGE_NOT_FOUND".to_string(),
        }
    }
}

impl ErrorExt for ArtifactError {
    fn log_error(&self) -> &Self {
        error!("ArtifactError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ArtifactError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ArtifactError::Missing { key, reason } => format!(
                "Required input '{}' could not be used ({}). Check that its scrape job ran today.",
                key, reason
            ),
            ArtifactError::Malformed { path, .. } => {
                format!("File {} could not be parsed.", path)
            }
            ArtifactError::Empty { path } => format!("File {} has no records.", path),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ArtifactError::Missing { .. } => "ARTIFACT_MISSING".to_string(),
            ArtifactError::Malformed { .. } => "ARTIFACT_MALFORMED".to_string(),
            ArtifactError::Empty { .. } => "ARTIFACT_EMPTY".to_string(),
        }
    }
}

impl ErrorExt for LlmError {
    fn log_error(&self) -> &Self {
        error!("LlmError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("LlmError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            LlmError::InvalidApiKey { provider } => format!(
                "Invalid API key for {}. Please update OPENAI_API_KEY.",
                provider
            ),
            LlmError::RateLimitExceeded {
                provider,
                retry_after: Some(seconds),
            } => format!(
                "Rate limit exceeded for {}. Please wait {} seconds.",
                provider, seconds
            ),
            LlmError::RateLimitExceeded {
                provider,
                retry_after: None,
            } => format!(
                "Rate limit exceeded for {}. Please wait before trying again.",
                provider
            ),
            LlmError::ModelNotAvailable { model } => format!(
                "Model '{}' is not available. Please try a different model.",
                model
            ),
            LlmError::ServiceUnavailable { provider } => format!(
                "{} service is temporarily unavailable. Please try again later.",
                provider
            ),
            LlmError::EmptyCompletion { provider } => {
                format!("{} returned an empty article.", provider)
            }
            _ => "AI service error occurred.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            LlmError::InvalidApiKey { .. } => "LLM_INVALID_API_KEY".to_string(),
            LlmError::RateLimitExceeded { .. } => "LLM_RATE_LIMIT".to_string(),
            LlmError::ModelNotAvailable { .. } => "LLM_MODEL_NOT_AVAILABLE".to_string(),
            LlmError::InvalidRequest { .. } => "LLM_INVALID_REQUEST".to_string(),
            LlmError::ServiceUnavailable { .. } => "LLM_SERVICE_UNAVAILABLE".to_string(),
            LlmError::RequestTimeout { .. } => "LLM_TIMEOUT".to_string(),
            LlmError::InvalidResponseFormat { .. } => "LLM_INVALID_RESPONSE".to_string(),
            LlmError::EmptyCompletion { .. } => "LLM_EMPTY_COMPLETION".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::MissingEnvironmentVariable { var_name } => format!(
                "Environment variable '{}' is required but not set.",
                var_name
            ),
            ConfigError::UnknownJob { name } => format!(
                "No scrape job named '{}'. Run `newsdesk jobs` to list them.",
                name
            ),
            _ => "Configuration error occurred. Please check your settings.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::MissingEnvironmentVariable { .. } => "CONFIG_MISSING_ENV_VAR".to_string(),
            ConfigError::UnknownJob { .. } => "CONFIG_UNKNOWN_JOB".to_string(),
            ConfigError::ValidationFailed { .. } => "CONFIG_VALIDATION_FAILED".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

/// Logs a failure for the operator along with its code and a plain hint.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    /// `[CODE] hint`, the line shown after the raw error.
    pub fn summary(&self, error: &CoreError) -> String {
        format!("[{}] {}", error.error_code(), error.user_friendly_message())
    }

    pub fn report_error(&self, error: &CoreError) {
        error.log_error();
        info!("{}", self.summary(error));
    }

    pub fn report_warning(&self, error: &CoreError) {
        error.log_warn();
        info!("{}", self.summary(error));
    }
}
