//! Configuration for the newsdesk tasks.
//!
//! Secrets come from the process environment (optionally seeded from a
//! `.env` file); everything that differs between scrape jobs or article runs
//! lives in [`JobsConfig`], which is either read from a TOML file or built
//! from the presets below.

use crate::{ArtifactFormat, ConfigError, DatedArtifact};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const REDDIT_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
pub const REDDIT_CLIENT_SECRET: &str = "REDDIT_CLIENT_SECRET";
pub const REDDIT_REDIRECT_URI: &str = "REDDIT_REDIRECT_URI";
pub const REDDIT_USER_AGENT: &str = "REDDIT_USER_AGENT";
pub const REDDIT_REFRESH_TOKEN: &str = "REDDIT_REFRESH_TOKEN";
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_REGION: &str = "AWS_REGION";
pub const S3_BUCKET_NAME: &str = "S3_BUCKET_NAME";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";

/// Loads `.env` from the working directory (or a parent) if one exists.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }
}

/// Reads a variable from the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required<F>(lookup: &F, name: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or_else(|| ConfigError::MissingEnvironmentVariable {
        var_name: name.to_string(),
    })
}

#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub user_agent: String,
    pub refresh_token: Option<String>,
}

impl RedditCredentials {
    /// Credentials for the authorization-code handshake. Installed apps have
    /// no secret, so only the id, redirect URI and user agent are required.
    pub fn for_authorization<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            client_id: required(&lookup, REDDIT_CLIENT_ID)?,
            client_secret: optional(&lookup, REDDIT_CLIENT_SECRET),
            redirect_uri: Some(required(&lookup, REDDIT_REDIRECT_URI)?),
            user_agent: required(&lookup, REDDIT_USER_AGENT)?,
            refresh_token: None,
        })
    }

    /// Credentials for reading listings.
    pub fn for_api<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            client_id: required(&lookup, REDDIT_CLIENT_ID)?,
            client_secret: Some(required(&lookup, REDDIT_CLIENT_SECRET)?),
            redirect_uri: optional(&lookup, REDDIT_REDIRECT_URI),
            user_agent: required(&lookup, REDDIT_USER_AGENT)?,
            refresh_token: optional(&lookup, REDDIT_REFRESH_TOKEN),
        })
    }
}

#[derive(Debug, Clone)]
pub struct StorageCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

impl StorageCredentials {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            access_key_id: required(&lookup, AWS_ACCESS_KEY_ID)?,
            secret_access_key: required(&lookup, AWS_SECRET_ACCESS_KEY)?,
            region: required(&lookup, AWS_REGION)?,
        })
    }
}

/// Bucket the scrape jobs upload into.
pub fn upload_bucket<F>(lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    required(&lookup, S3_BUCKET_NAME)
}

#[derive(Debug, Clone)]
pub struct OpenAiCredentials {
    pub api_key: String,
    pub base_url: Option<String>,
}

impl OpenAiCredentials {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            api_key: required(&lookup, OPENAI_API_KEY)?,
            base_url: optional(&lookup, OPENAI_BASE_URL),
        })
    }
}

fn default_limit() -> u32 {
    5
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_permalink_base() -> String {
    "https://reddit.com".to_string()
}

/// One hot-post scrape: which forums, how many posts, where the file goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeJob {
    pub name: String,
    pub forums: Vec<String>,
    /// Non-stickied posts kept per forum.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Cap applied after all forums are merged.
    #[serde(default)]
    pub max_total: Option<usize>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub name_prefix: Option<String>,
    #[serde(default)]
    pub format: ArtifactFormat,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_permalink_base")]
    pub permalink_base: String,
    #[serde(default)]
    pub remove_after_upload: bool,
}

impl ScrapeJob {
    pub fn new(name: impl Into<String>, forums: &[&str]) -> Self {
        Self {
            name: name.into(),
            forums: forums.iter().map(|f| f.to_string()).collect(),
            limit: default_limit(),
            max_total: None,
            category: None,
            name_prefix: None,
            format: ArtifactFormat::Csv,
            output_dir: default_output_dir(),
            permalink_base: default_permalink_base(),
            remove_after_upload: false,
        }
    }

    /// Bucket folder; defaults to the job name.
    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(&self.name)
    }

    /// File name prefix; defaults to the category.
    pub fn name_prefix(&self) -> &str {
        self.name_prefix.as_deref().unwrap_or_else(|| self.category())
    }

    pub fn artifact(&self, date: NaiveDate) -> DatedArtifact {
        DatedArtifact::new(self.category(), self.name_prefix(), date, self.format)
    }

    pub fn local_path(&self, date: NaiveDate) -> PathBuf {
        self.output_dir.join(self.artifact(date).file_name())
    }
}

/// A dated artifact the article generator pulls in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub category: String,
    #[serde(default)]
    pub name_prefix: Option<String>,
    #[serde(default)]
    pub format: ArtifactFormat,
    /// A missing required source aborts the run; a missing optional one is
    /// replaced with a placeholder.
    #[serde(default)]
    pub required: bool,
}

impl ArticleSource {
    pub fn optional(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            name_prefix: None,
            format: ArtifactFormat::Csv,
            required: false,
        }
    }

    pub fn artifact(&self, date: NaiveDate) -> DatedArtifact {
        let prefix = self.name_prefix.as_deref().unwrap_or(&self.category);
        DatedArtifact::new(self.category.clone(), prefix, date, self.format)
    }
}

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a fantasy baseball expert helping users build their daily DFS lineups.

You will be given:
- Box scores from the previous day
- Today's starting pitchers and weather
- Team rosters with injury statuses
- ESPN hitter picks
- Reddit fantasy baseball discussion
- Vegas odds (totals, spreads, moneylines)

Write a single DFS article with:
1. Pitchers to target (explain why)
2. Pitchers to fade (explain why)
3. Top hitter picks by position (1B, 2B, 3B, SS, OF, C, UTIL)
4. Suggested stacks by team
5. Weather impact (skip domes)
6. Value plays (compare to expected salary)

Tone: helpful, sharp, insightful. Don't list full lineups. Prioritize context and reasoning behind each pick.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleConfig {
    pub bucket: String,
    pub sources: Vec<ArticleSource>,
    pub system_prompt: String,
    pub model: String,
    pub temperature: f32,
    pub preview_rows: usize,
    pub download_dir: PathBuf,
    pub output_dir: PathBuf,
    pub output_prefix: String,
}

impl Default for ArticleConfig {
    fn default() -> Self {
        let sources = [
            "mlb_boxscores",
            "mlb_espn_articles",
            "mlb_rosters",
            "mlb_weather",
            "mlb_probable_starters",
            "mlb_betting_odds",
            "reddit_fantasy_baseball",
        ]
        .into_iter()
        .map(ArticleSource::optional)
        .collect();

        Self {
            bucket: "news-headlines-csvs".to_string(),
            sources,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            preview_rows: 10,
            download_dir: PathBuf::from("shared/tmp"),
            output_dir: PathBuf::from("shared/generated_dfs_articles"),
            output_prefix: "dfs_article".to_string(),
        }
    }
}

impl ArticleConfig {
    pub fn output_path(&self, date: NaiveDate) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}.txt",
            self.output_prefix,
            date.format(crate::DATE_FORMAT)
        ))
    }
}

fn default_scrape_jobs() -> Vec<ScrapeJob> {
    let entertainment = ScrapeJob::new(
        "reddit_entertainment_news",
        &["entertainment", "movies", "television"],
    );

    let gamer = ScrapeJob::new("reddit_gamer_news", &["gamernews"]);

    let mut fantasy = ScrapeJob::new("reddit_fantasy_baseball", &["fantasybaseball"]);
    fantasy.limit = 15;
    fantasy.max_total = Some(10);
    fantasy.output_dir = std::env::temp_dir();
    fantasy.permalink_base = "https://www.reddit.com".to_string();
    fantasy.remove_after_upload = true;

    vec![entertainment, gamer, fantasy]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobsConfig {
    #[serde(default = "default_scrape_jobs")]
    pub scrape: Vec<ScrapeJob>,
    #[serde(default)]
    pub article: ArticleConfig,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            scrape: default_scrape_jobs(),
            article: ArticleConfig::default(),
        }
    }
}

impl JobsConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let config = Self::from_toml(&raw)?;
        debug!(
            "Loaded {} scrape jobs from {}",
            config.scrape.len(),
            path.display()
        );
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: JobsConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for job in &self.scrape {
            if !names.insert(job.name.as_str()) {
                return Err(ConfigError::ValidationFailed {
                    reason: format!("scrape job '{}' is defined twice", job.name),
                });
            }
            if job.forums.is_empty() {
                return Err(ConfigError::ValidationFailed {
                    reason: format!("scrape job '{}' lists no forums", job.name),
                });
            }
            if job.limit == 0 {
                return Err(ConfigError::InvalidValue {
                    field: format!("scrape.{}.limit", job.name),
                    value: job.limit.to_string(),
                });
            }
            if job.max_total == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field: format!("scrape.{}.max_total", job.name),
                    value: "0".to_string(),
                });
            }
        }

        if !(0.0..=2.0).contains(&self.article.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "article.temperature".to_string(),
                value: self.article.temperature.to_string(),
            });
        }
        if self.article.preview_rows == 0 {
            return Err(ConfigError::InvalidValue {
                field: "article.preview_rows".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }

    pub fn scrape_job(&self, name: &str) -> Result<&ScrapeJob, ConfigError> {
        self.scrape
            .iter()
            .find(|job| job.name == name)
            .ok_or_else(|| ConfigError::UnknownJob {
                name: name.to_string(),
            })
    }
}
