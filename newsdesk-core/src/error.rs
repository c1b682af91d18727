use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Reddit API error: {0}")]
    RedditApi(#[from] RedditApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

#[derive(Error, Debug, Clone)]
pub enum RedditApiError {
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Redirect did not carry an authorization code")]
    MissingAuthorizationCode,

    #[error("Redirect listener failed: {reason}")]
    CallbackFailed { reason: String },

    #[error("Rate limit exceeded{}", retry_hint(.retry_after))]
    RateLimitExceeded { retry_after: Option<u64> },

    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Invalid OAuth token")]
    InvalidToken,

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("Upload of {local_path} to s3://{bucket}/{key} failed: {reason}")]
    UploadFailed {
        local_path: String,
        bucket: String,
        key: String,
        reason: String,
    },

    #[error("Download of s3://{bucket}/{key} failed: {reason}")]
    DownloadFailed {
        bucket: String,
        key: String,
        reason: String,
    },

    #[error("Object not found: s3://{bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },
}

#[derive(Error, Debug, Clone)]
pub enum ArtifactError {
    #[error("Required artifact unavailable: {key} ({reason})")]
    Missing { key: String, reason: String },

    #[error("Malformed artifact {path}: {details}")]
    Malformed { path: String, details: String },

    #[error("No records in {path}")]
    Empty { path: String },
}

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API key invalid or missing for {provider}")]
    InvalidApiKey { provider: String },

    #[error("Rate limit exceeded for {provider}{}", retry_hint(.retry_after))]
    RateLimitExceeded {
        provider: String,
        retry_after: Option<u64>,
    },

    #[error("Model not available: {model}")]
    ModelNotAvailable { model: String },

    #[error("Invalid request to {provider}: {reason}")]
    InvalidRequest { provider: String, reason: String },

    #[error("Provider service unavailable: {provider}")]
    ServiceUnavailable { provider: String },

    #[error("Request timeout for {provider}")]
    RequestTimeout { provider: String },

    #[error("Invalid response format from {provider}")]
    InvalidResponseFormat { provider: String },

    #[error("Empty completion returned by {provider}")]
    EmptyCompletion { provider: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Environment variable not set: {var_name}")]
    MissingEnvironmentVariable { var_name: String },

    #[error("Unknown scrape job: {name}")]
    UnknownJob { name: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Only servers that send `Retry-After` get a wait time in the message.
fn retry_hint(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(seconds) => format!(". Retry after {} seconds", seconds),
        None => String::new(),
    }
}
