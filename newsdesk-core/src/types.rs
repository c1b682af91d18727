use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date layout embedded in every artifact name.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One hot post as written to the scrape artifacts.
///
/// Field order is the column order of the CSV files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumPost {
    pub title: String,
    pub url: String,
    pub permalink: String,
    pub score: i64,
    pub subreddit: String,
}

impl ForumPost {
    pub const FIELDS: [&'static str; 5] = ["title", "url", "permalink", "score", "subreddit"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    #[default]
    Csv,
    Json,
}

impl ArtifactFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Csv => "csv",
            ArtifactFormat::Json => "json",
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A file whose name carries the day it was produced.
///
/// Producers and consumers agree on `{category}/{name_prefix}_{YYYY-MM-DD}.{ext}`
/// and nothing else, so both sides build keys through this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedArtifact {
    pub category: String,
    pub name_prefix: String,
    pub date: NaiveDate,
    pub format: ArtifactFormat,
}

impl DatedArtifact {
    pub fn new(
        category: impl Into<String>,
        name_prefix: impl Into<String>,
        date: NaiveDate,
        format: ArtifactFormat,
    ) -> Self {
        Self {
            category: category.into(),
            name_prefix: name_prefix.into(),
            date,
            format,
        }
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}_{}.{}",
            self.name_prefix,
            self.date.format(DATE_FORMAT),
            self.format.extension()
        )
    }

    pub fn object_key(&self) -> String {
        format!("{}/{}", self.category, self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dated_artifact_names() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 7).unwrap();
        let artifact =
            DatedArtifact::new("reddit_gamer_news", "reddit_gamer_news", date, ArtifactFormat::Csv);

        assert_eq!(artifact.file_name(), "reddit_gamer_news_2025-04-07.csv");
        assert_eq!(
            artifact.object_key(),
            "reddit_gamer_news/reddit_gamer_news_2025-04-07.csv"
        );
    }

    #[test]
    fn test_json_artifact_extension() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let artifact = DatedArtifact::new("weird_news", "weird", date, ArtifactFormat::Json);
        assert_eq!(artifact.object_key(), "weird_news/weird_2024-12-31.json");
    }
}
