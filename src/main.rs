mod cli;

use article_service::ArticleGenerator;
use artifact_store::{
    upload_artifact, write_posts, FsObjectStore, S3ObjectStore, StoreBackend,
};
use chrono::{Local, NaiveDate};
use clap::Parser;
use cli::{Cli, Command};
use llm_interface::OpenAiProvider;
use newsdesk_core::{
    load_dotenv, process_env, upload_bucket, CoreError, ErrorReporter, JobsConfig,
    OpenAiCredentials, RedditCredentials, ScrapeJob, StorageCredentials,
};
use reddit_client::{
    complete_pasted_redirect, run_handshake, AuthUrlPresenter, AuthorizationRequest,
    AuthorizedListings, CallbackListener, ConsolePresenter, ForumFetcher, RedditApiClient,
    RedditClient, RedditOAuth2Config, TokenDuration,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "newsdesk=info,newsdesk_core=info,reddit_client=info,\
llm_interface=info,artifact_store=info,article_service=info";

#[tokio::main]
async fn main() -> ExitCode {
    load_dotenv();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ErrorReporter::new().report_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CoreError> {
    let jobs = match &cli.config {
        Some(path) => JobsConfig::load(path)?,
        None => JobsConfig::default(),
    };

    match cli.command {
        Command::Authorize {
            scopes,
            state,
            duration,
            print_only,
            no_browser,
            paste,
        } => {
            let mode = if print_only {
                RedirectMode::PrintOnly
            } else if paste {
                RedirectMode::Paste
            } else {
                RedirectMode::Listen
            };
            authorize(scopes, state, duration, mode, no_browser).await
        }
        Command::Scrape {
            job,
            local_store,
            skip_upload,
        } => {
            let job = jobs.scrape_job(&job)?.clone();
            scrape(&job, local_store, skip_upload).await
        }
        Command::Article { local_store, date } => {
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            article(jobs, local_store, today).await
        }
        Command::Jobs => {
            list_jobs(&jobs);
            Ok(())
        }
    }
}

/// How `authorize` gets the redirect back.
enum RedirectMode {
    Listen,
    Paste,
    PrintOnly,
}

fn read_pasted_url() -> Result<String, CoreError> {
    print!("Paste the full URL your browser was redirected to: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}

async fn authorize(
    scopes: Vec<String>,
    state: Option<String>,
    duration: TokenDuration,
    mode: RedirectMode,
    no_browser: bool,
) -> Result<(), CoreError> {
    let credentials = RedditCredentials::for_authorization(process_env)?;
    let config = RedditOAuth2Config::from_credentials(&credentials);
    let mut client = RedditClient::new(config)?;

    let request = match state {
        Some(state) => AuthorizationRequest::new(scopes, state, duration),
        None => AuthorizationRequest::with_random_state(scopes, duration),
    };

    let presenter = ConsolePresenter::new(!no_browser);
    let token = match mode {
        RedirectMode::PrintOnly => {
            let url = client.authorization_url(&request);
            println!("{}", url);
            return Ok(());
        }
        RedirectMode::Paste => {
            let url = client.authorization_url(&request);
            presenter.present(&url);
            client.mark_awaiting_redirect();
            let pasted = read_pasted_url()?;
            complete_pasted_redirect(&mut client, &pasted).await?
        }
        RedirectMode::Listen => {
            let listener =
                CallbackListener::bind_redirect_uri(&client.config().redirect_uri).await?;
            run_handshake(&mut client, &request, &presenter, listener).await?
        }
    };

    match token.refresh_token {
        Some(refresh_token) => println!("\n✅ SUCCESS! Your refresh token:\n{}", refresh_token),
        None => {
            warn!("Reddit returned no refresh token; request a permanent duration to get one");
            println!("\n✅ Authorized. Access token:\n{}", token.access_token);
        }
    }
    Ok(())
}

async fn connect_store(local_store: Option<PathBuf>) -> Result<StoreBackend, CoreError> {
    match local_store {
        Some(root) => {
            info!("Using local object store at {}", root.display());
            Ok(StoreBackend::Local(FsObjectStore::new(root)))
        }
        None => {
            let credentials = StorageCredentials::from_lookup(process_env)?;
            Ok(StoreBackend::S3(S3ObjectStore::connect(&credentials).await))
        }
    }
}

async fn scrape(
    job: &ScrapeJob,
    local_store: Option<PathBuf>,
    skip_upload: bool,
) -> Result<(), CoreError> {
    let credentials = RedditCredentials::for_api(process_env)?;
    // Settle every setting before the first network call.
    let upload_target = if skip_upload {
        None
    } else {
        let bucket = match &local_store {
            Some(_) => process_env(newsdesk_core::S3_BUCKET_NAME)
                .unwrap_or_else(|| "news-headlines-csvs".to_string()),
            None => upload_bucket(process_env)?,
        };
        Some((connect_store(local_store).await?, bucket))
    };

    let oauth = RedditClient::new(RedditOAuth2Config::from_credentials(&credentials))?;
    let access_token = oauth
        .api_access_token(credentials.refresh_token.as_deref())
        .await?;

    let api = RedditApiClient::new(credentials.user_agent.clone())?;
    let fetcher = ForumFetcher::new(
        AuthorizedListings::new(api, access_token),
        job.permalink_base.clone(),
    );

    info!("🔍 Fetching hot posts for {}", job.name);
    let posts = fetcher.fetch_all(&job.forums, job.limit, job.max_total).await?;
    for post in &posts {
        println!("[{}] {} ({} points)", post.subreddit, post.title, post.score);
    }

    let today: NaiveDate = Local::now().date_naive();
    let artifact = job.artifact(today);
    let local_path = job.local_path(today);
    if posts.is_empty() {
        warn!("No posts collected for {}, writing header-only file", job.name);
    }
    write_posts(&posts, &local_path, job.format)?;
    info!("✅ Saved {} posts to {}", posts.len(), local_path.display());

    let Some((store, bucket)) = upload_target else {
        return Ok(());
    };

    let key = artifact.object_key();
    upload_artifact(&store, &local_path, &bucket, &key).await?;
    println!("Uploaded to S3: {}", key);

    if job.remove_after_upload {
        if let Err(e) = std::fs::remove_file(&local_path) {
            warn!("Could not remove {}: {}", local_path.display(), e);
        }
    }
    Ok(())
}

async fn article(
    jobs: JobsConfig,
    local_store: Option<PathBuf>,
    today: NaiveDate,
) -> Result<(), CoreError> {
    let credentials = OpenAiCredentials::from_lookup(process_env)?;
    let store = connect_store(local_store).await?;

    let config = jobs.article;
    let provider = OpenAiProvider::from_credentials(&credentials)?
        .with_model(config.model.clone())
        .with_temperature(config.temperature);

    let generator = ArticleGenerator::new(store, provider, config);
    let output = generator.run(today).await?;
    println!("✅ Article saved to {}", output.display());
    Ok(())
}

fn list_jobs(jobs: &JobsConfig) {
    println!("Scrape jobs:");
    for job in &jobs.scrape {
        let cap = job
            .max_total
            .map(|total| format!(", at most {} total", total))
            .unwrap_or_default();
        println!(
            "  {:<28} r/{} ({} each{}) -> {}/{}_YYYY-MM-DD.{}",
            job.name,
            job.forums.join(", r/"),
            job.limit,
            cap,
            job.category(),
            job.name_prefix(),
            job.format.extension()
        );
    }

    println!("\nArticle sources (bucket {}):", jobs.article.bucket);
    for source in &jobs.article.sources {
        let marker = if source.required { "required" } else { "optional" };
        println!("  {:<28} {}", source.category, marker);
    }
}
