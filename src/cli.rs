//! Command-line interface for newsdesk.
//!
//! Secrets are read from the environment (or `.env`); flags only select what
//! to run and where files go.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use newsdesk_core::DATE_FORMAT;
use reddit_client::TokenDuration;
use std::path::PathBuf;

/// Scrapes hot forum posts into dated files and turns the day's files into an
/// article.
///
/// # Examples
///
/// ```sh
/// # Obtain a refresh token once
/// newsdesk authorize
///
/// # Daily jobs
/// newsdesk scrape reddit_fantasy_baseball
/// newsdesk article
///
/// # Offline run against a directory instead of S3
/// newsdesk scrape reddit_gamer_news --local-store ./bucket
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a jobs TOML file; built-in presets are used otherwise
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the authorization-code handshake and print the refresh token
    Authorize {
        /// Scopes to request; repeat the flag for several
        #[arg(long = "scope", default_values_t = ["identity".to_string(), "read".to_string()])]
        scopes: Vec<String>,

        /// State echoed back by the redirect; random when omitted
        #[arg(long)]
        state: Option<String>,

        /// Token lifetime: temporary or permanent
        #[arg(long, default_value_t = TokenDuration::Permanent)]
        duration: TokenDuration,

        /// Only print the authorization URL
        #[arg(long)]
        print_only: bool,

        /// Do not try to open a browser
        #[arg(long)]
        no_browser: bool,

        /// Paste the redirect URL from the browser instead of listening for it
        #[arg(long, conflicts_with = "print_only")]
        paste: bool,
    },

    /// Fetch hot posts for a job, write the dated file and upload it
    Scrape {
        /// Job name, see `newsdesk jobs`
        job: String,

        /// Use this directory as the object store instead of S3
        #[arg(long, value_name = "DIR")]
        local_store: Option<PathBuf>,

        /// Write the local file only
        #[arg(long)]
        skip_upload: bool,
    },

    /// Build the daily article from the dated files in the bucket
    Article {
        /// Use this directory as the object store instead of S3
        #[arg(long, value_name = "DIR")]
        local_store: Option<PathBuf>,

        /// Day to build the article for (YYYY-MM-DD); defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// List the configured scrape jobs and article sources
    Jobs,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| format!("expected YYYY-MM-DD, got '{}': {}", value, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_defaults() {
        let cli = Cli::parse_from(["newsdesk", "authorize"]);

        match cli.command {
            Command::Authorize {
                scopes,
                state,
                duration,
                print_only,
                no_browser,
                paste,
            } => {
                assert_eq!(scopes, vec!["identity", "read"]);
                assert_eq!(state, None);
                assert_eq!(duration, TokenDuration::Permanent);
                assert!(!print_only);
                assert!(!no_browser);
                assert!(!paste);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_authorize_flags() {
        let cli = Cli::parse_from([
            "newsdesk",
            "authorize",
            "--scope",
            "mysubreddits",
            "--scope",
            "read",
            "--state",
            "UNIQUE_STATE",
            "--duration",
            "temporary",
            "--print-only",
        ]);

        match cli.command {
            Command::Authorize {
                scopes,
                state,
                duration,
                print_only,
                ..
            } => {
                assert_eq!(scopes, vec!["mysubreddits", "read"]);
                assert_eq!(state.as_deref(), Some("UNIQUE_STATE"));
                assert_eq!(duration, TokenDuration::Temporary);
                assert!(print_only);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_authorize_paste() {
        let cli = Cli::parse_from(["newsdesk", "authorize", "--paste", "--no-browser"]);
        match cli.command {
            Command::Authorize {
                paste, no_browser, ..
            } => {
                assert!(paste);
                assert!(no_browser);
            }
            other => panic!("unexpected command {:?}", other),
        }

        assert!(
            Cli::try_parse_from(["newsdesk", "authorize", "--paste", "--print-only"]).is_err()
        );
    }

    #[test]
    fn test_scrape_parsing() {
        let cli = Cli::parse_from([
            "newsdesk",
            "scrape",
            "reddit_gamer_news",
            "--local-store",
            "/tmp/bucket",
            "--config",
            "jobs.toml",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("jobs.toml")));
        match cli.command {
            Command::Scrape {
                job,
                local_store,
                skip_upload,
            } => {
                assert_eq!(job, "reddit_gamer_news");
                assert_eq!(local_store, Some(PathBuf::from("/tmp/bucket")));
                assert!(!skip_upload);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_article_date() {
        let cli = Cli::parse_from(["newsdesk", "article", "--date", "2025-06-01"]);
        match cli.command {
            Command::Article { date, local_store } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 6, 1));
                assert!(local_store.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }

        assert!(Cli::try_parse_from(["newsdesk", "article", "--date", "06/01/2025"]).is_err());
        assert!(Cli::try_parse_from(["newsdesk", "scrape"]).is_err());
        assert!(Cli::try_parse_from(["newsdesk", "authorize", "--duration", "forever"]).is_err());
    }
}
