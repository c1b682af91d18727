//! Daily article generation from the dated artifacts in the object store.

use artifact_store::{download_artifact, preview, ObjectStore};
use chrono::NaiveDate;
use llm_interface::TextGenerator;
use newsdesk_core::{
    ArticleConfig, ArticleSource, ArtifactError, CoreError, ErrorExt, ErrorReporter,
};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Stands in for an optional source that could not be read.
pub const MISSING_SOURCE_PLACEHOLDER: &str = "(no data available)";

const MESSAGE_HEADER: &str = "Here are today's files:\n\n";

/// One section of the user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSection {
    pub category: String,
    pub body: String,
}

/// `"Here are today's files:"` followed by one `=== CATEGORY ===` block per
/// section, trimmed.
pub fn render_user_message(sections: &[SourceSection]) -> String {
    let mut message = String::from(MESSAGE_HEADER);
    for section in sections {
        message.push_str(&format!(
            "\n\n=== {} ===\n{}",
            section.category.to_uppercase(),
            section.body
        ));
    }
    message.trim().to_string()
}

pub struct ArticleGenerator<S, G> {
    store: S,
    generator: G,
    config: ArticleConfig,
}

impl<S: ObjectStore, G: TextGenerator> ArticleGenerator<S, G> {
    pub fn new(store: S, generator: G, config: ArticleConfig) -> Self {
        Self {
            store,
            generator,
            config,
        }
    }

    pub fn config(&self) -> &ArticleConfig {
        &self.config
    }

    /// Downloads and previews one source for `today`.
    async fn acquire(&self, source: &ArticleSource, today: NaiveDate) -> Result<String, CoreError> {
        let artifact = source.artifact(today);
        let local_path = self.config.download_dir.join(artifact.file_name());

        download_artifact(&self.store, &self.config.bucket, &artifact, &local_path).await?;
        preview(&local_path, artifact.format, self.config.preview_rows)
    }

    /// Collects every configured source in order. Optional sources that fail
    /// become placeholders; a failing required source stops the run.
    pub async fn gather_sections(&self, today: NaiveDate) -> Result<Vec<SourceSection>, CoreError> {
        let mut sections = Vec::with_capacity(self.config.sources.len());

        for source in &self.config.sources {
            let body = match self.acquire(source, today).await {
                Ok(body) => body,
                Err(e) if source.required => {
                    e.log_error();
                    return Err(ArtifactError::Missing {
                        key: source.artifact(today).object_key(),
                        reason: e.to_string(),
                    }
                    .into());
                }
                Err(e) => {
                    ErrorReporter::new().report_warning(&e);
                    warn!("Source {} unavailable, using placeholder", source.category);
                    MISSING_SOURCE_PLACEHOLDER.to_string()
                }
            };

            sections.push(SourceSection {
                category: source.category.clone(),
                body,
            });
        }

        Ok(sections)
    }

    /// Builds the article for `today` and returns where it was written.
    pub async fn run(&self, today: NaiveDate) -> Result<PathBuf, CoreError> {
        tokio::fs::create_dir_all(&self.config.download_dir).await?;

        let sections = self.gather_sections(today).await?;
        let available = sections
            .iter()
            .filter(|section| section.body != MISSING_SOURCE_PLACEHOLDER)
            .count();
        info!(
            "Loaded {} of {} sources for {}",
            available,
            sections.len(),
            today
        );

        let user_message = render_user_message(&sections);

        info!("🧠 Generating article with {}...", self.config.model);
        let article = match self
            .generator
            .generate(self.config.system_prompt.trim(), &user_message)
            .await
        {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                error!("❌ Article generation failed: {}", e);
                return Err(e);
            }
        };

        let output_path = self.config.output_path(today);
        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        tokio::fs::write(&output_path, article.as_bytes()).await?;

        info!("✅ Article saved to {}", output_path.display());
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artifact_store::{write_posts, FsObjectStore};
    use newsdesk_core::{ArtifactFormat, ForumPost, LlmError};
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Captures the prompt it was given and answers with a canned article.
    struct CannedGenerator {
        reply: Result<String, ()>,
        seen: Mutex<Option<(String, String)>>,
    }

    impl CannedGenerator {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                seen: Mutex::new(None),
            }
        }
    }

    impl TextGenerator for CannedGenerator {
        async fn generate(
            &self,
            system_prompt: &str,
            user_message: &str,
        ) -> Result<String, CoreError> {
            *self.seen.lock().unwrap() =
                Some((system_prompt.to_string(), user_message.to_string()));
            self.reply.clone().map_err(|_| {
                LlmError::ServiceUnavailable {
                    provider: "canned".to_string(),
                }
                .into()
            })
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn put_object(root: &Path, bucket: &str, key: &str, contents: &str) {
        let path = root.join(bucket).join(key);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn test_config(work: &Path, sources: Vec<ArticleSource>) -> ArticleConfig {
        ArticleConfig {
            bucket: "news-headlines-csvs".to_string(),
            sources,
            download_dir: work.join("tmp"),
            output_dir: work.join("articles"),
            preview_rows: 2,
            ..ArticleConfig::default()
        }
    }

    #[test]
    fn test_render_user_message() {
        let message = render_user_message(&[
            SourceSection {
                category: "mlb_weather".to_string(),
                body: "team,temp\nNYY,71\n".to_string(),
            },
            SourceSection {
                category: "mlb_rosters".to_string(),
                body: MISSING_SOURCE_PLACEHOLDER.to_string(),
            },
        ]);

        assert_eq!(
            message,
            "Here are today's files:\n\n\n\n=== MLB_WEATHER ===\nteam,temp\nNYY,71\n\n\n=== MLB_ROSTERS ===\n(no data available)"
        );
        assert_eq!(render_user_message(&[]), "Here are today's files:");
    }

    #[tokio::test]
    async fn test_run_with_missing_optional_source() {
        let store_root = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        put_object(
            store_root.path(),
            "news-headlines-csvs",
            "mlb_weather/mlb_weather_2025-06-01.csv",
            "team,temp,wind\nNYY,71,5 out\nBOS,64,12 in\nCHC,55,20 out\n",
        );

        let config = test_config(
            work.path(),
            vec![
                ArticleSource::optional("mlb_weather"),
                ArticleSource::optional("mlb_rosters"),
            ],
        );
        let generator = ArticleGenerator::new(
            FsObjectStore::new(store_root.path()),
            CannedGenerator::replying("\n  Stack the Yankees.  \n"),
            config,
        );

        let output = generator.run(date()).await.unwrap();
        assert_eq!(output, work.path().join("articles/dfs_article_2025-06-01.txt"));
        assert_eq!(fs::read_to_string(&output).unwrap(), "Stack the Yankees.");

        let (system_prompt, user_message) = generator.generator.seen.lock().unwrap().clone().unwrap();
        assert!(system_prompt.starts_with("You are a fantasy baseball expert"));
        assert!(user_message.starts_with("Here are today's files:"));
        assert!(user_message.contains("=== MLB_WEATHER ===\nteam,temp,wind\nNYY,71,5 out\nBOS,64,12 in\n"));
        assert!(!user_message.contains("CHC"));
        assert!(user_message.ends_with("=== MLB_ROSTERS ===\n(no data available)"));
    }

    #[tokio::test]
    async fn test_missing_required_source_aborts() {
        let store_root = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();

        let mut required = ArticleSource::optional("mlb_probable_starters");
        required.required = true;
        let config = test_config(work.path(), vec![required]);
        let generator = ArticleGenerator::new(
            FsObjectStore::new(store_root.path()),
            CannedGenerator::replying("unused"),
            config,
        );

        match generator.run(date()).await {
            Err(CoreError::Artifact(ArtifactError::Missing { key, reason })) => {
                assert_eq!(key, "mlb_probable_starters/mlb_probable_starters_2025-06-01.csv");
                assert!(reason.contains("not found"), "reason was {}", reason);
            }
            other => panic!("Expected missing artifact, got {:?}", other),
        }
        assert!(generator.generator.seen.lock().unwrap().is_none());
        assert!(!work.path().join("articles").exists());
    }

    #[tokio::test]
    async fn test_empty_required_source_reports_cause() {
        let store_root = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        put_object(
            store_root.path(),
            "news-headlines-csvs",
            "mlb_weather/mlb_weather_2025-06-01.csv",
            "",
        );

        let mut required = ArticleSource::optional("mlb_weather");
        required.required = true;
        let config = test_config(work.path(), vec![required]);
        let generator = ArticleGenerator::new(
            FsObjectStore::new(store_root.path()),
            CannedGenerator::replying("unused"),
            config,
        );

        match generator.gather_sections(date()).await {
            Err(CoreError::Artifact(ArtifactError::Missing { key, reason })) => {
                assert_eq!(key, "mlb_weather/mlb_weather_2025-06-01.csv");
                assert!(reason.contains("No records in"), "reason was {}", reason);
            }
            other => panic!("Expected missing artifact, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_optional_file_becomes_placeholder() {
        let store_root = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        put_object(
            store_root.path(),
            "news-headlines-csvs",
            "mlb_betting_odds/mlb_betting_odds_2025-06-01.csv",
            "",
        );

        let config = test_config(work.path(), vec![ArticleSource::optional("mlb_betting_odds")]);
        let generator = ArticleGenerator::new(
            FsObjectStore::new(store_root.path()),
            CannedGenerator::replying("ok"),
            config,
        );

        let sections = generator.gather_sections(date()).await.unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body, MISSING_SOURCE_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_reads_scraped_reddit_artifact() {
        let store_root = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();

        let scraped = work.path().join("scrape.csv");
        let posts = vec![ForumPost {
            title: "Judge day-to-day".to_string(),
            url: "https://example.com/judge".to_string(),
            permalink: "https://www.reddit.com/r/fantasybaseball/comments/x/".to_string(),
            score: 87,
            subreddit: "fantasybaseball".to_string(),
        }];
        write_posts(&posts, &scraped, ArtifactFormat::Csv).unwrap();
        let bucket_dir = store_root
            .path()
            .join("news-headlines-csvs/reddit_fantasy_baseball");
        fs::create_dir_all(&bucket_dir).unwrap();
        fs::copy(&scraped, bucket_dir.join("reddit_fantasy_baseball_2025-06-01.csv")).unwrap();

        let config = test_config(
            work.path(),
            vec![ArticleSource::optional("reddit_fantasy_baseball")],
        );
        let generator = ArticleGenerator::new(
            FsObjectStore::new(store_root.path()),
            CannedGenerator::replying("ok"),
            config,
        );

        let sections = generator.gather_sections(date()).await.unwrap();
        assert!(sections[0].body.starts_with("title,url,permalink,score,subreddit\n"));
        assert!(sections[0].body.contains("Judge day-to-day"));
    }

    #[tokio::test]
    async fn test_generation_failure_writes_nothing() {
        let store_root = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let config = test_config(work.path(), vec![ArticleSource::optional("mlb_rosters")]);
        let generator = ArticleGenerator::new(
            FsObjectStore::new(store_root.path()),
            CannedGenerator::failing(),
            config,
        );

        assert!(matches!(
            generator.run(date()).await,
            Err(CoreError::Llm(LlmError::ServiceUnavailable { .. }))
        ));
        assert!(!generator.config().output_path(date()).exists());
    }
}
