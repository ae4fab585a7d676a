//! Command-line interface for the pr-stats binary.
//!
//! A single invocation loads the target list, then fetches, aggregates and
//! publishes the report of every repository in order. Per-repository
//! failures are logged and do not change the exit status; only startup
//! failures (credentials, target list, invalid options) exit with status 1.

use std::{path::PathBuf, process, time::Duration};

use clap::{ArgAction, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use pr_stats::{
    BucketOptions, Credentials, DEFAULT_API_BASE, DEFAULT_PATH_PREFIX, DEFAULT_PER_PAGE,
    DirectoryPublisher, Error, GitHubClient, MonthNames, Orchestrator, Publisher, RunOptions,
    RunSummary, Target, TargetSource, Throttle, ThrottleConfig, fetch_targets, load_targets,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Publish pull-request statistics for a list of GitHub repositories.
#[derive(Debug, Parser,)]
#[command(name = "pr-stats", version, about = "Publish pull-request statistics as static-site data")]
struct Cli
{
    /// Target list: an http(s) URL of a JSON document or a local JSON/YAML file.
    #[arg(long = "targets", env = "PR_STATS_TARGETS", value_name = "URL|PATH")]
    targets: String,

    /// GitHub login used for Basic authentication.
    #[arg(long = "username", env = "GITHUB_USERNAME")]
    username: Option<String,>,

    /// GitHub personal access token.
    #[arg(long = "token", env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String,>,

    /// JSON file holding `{"username", "token"}`, used for values not given above.
    #[arg(long = "credentials", value_name = "PATH")]
    credentials: Option<PathBuf,>,

    /// Repository receiving the reports, as <owner>/<repo>.
    #[arg(
        long = "destination",
        env = "PR_STATS_DESTINATION",
        value_name = "OWNER/REPO",
        required_unless_present = "output_dir"
    )]
    destination: Option<String,>,

    /// Branch of the destination repository to commit to.
    #[arg(long = "branch")]
    branch: Option<String,>,

    /// Write reports below this directory instead of committing them.
    #[arg(long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf,>,

    /// Directory of the reports within the destination.
    #[arg(long = "path-prefix", default_value = DEFAULT_PATH_PREFIX)]
    path_prefix: String,

    /// GitHub REST endpoint.
    #[arg(long = "api-base", env = "GITHUB_API_URL", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Pull requests requested per page (1-100).
    #[arg(long = "per-page", default_value_t = DEFAULT_PER_PAGE)]
    per_page: u8,

    /// Requests allowed per rate window.
    #[arg(long = "rate", default_value_t = 5)]
    rate: usize,

    /// Length of the rate window in seconds.
    #[arg(long = "rate-window", value_name = "SECONDS", default_value_t = 10)]
    rate_window: u64,

    /// Requests allowed in flight at once.
    #[arg(long = "concurrent", default_value_t = 2)]
    concurrent: usize,

    /// Language of month names in date buckets (english or french).
    #[arg(long = "month-names", default_value = "english")]
    month_names: String,

    /// Offset from UTC in minutes, or `local` for the host time zone, used to
    /// assign pull requests to months.
    #[arg(long = "utc-offset", value_name = "MINUTES|local", default_value = "0", allow_hyphen_values = true)]
    utc_offset: String,

    /// Hide the progress bar.
    #[arg(long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,
}

impl Cli
{
    fn run_options(&self,) -> Result<RunOptions, Error,>
    {
        let months: MonthNames = self.month_names.parse()?;
        RunOptions {
            api_base:    self.api_base.clone(),
            per_page:    self.per_page,
            path_prefix: self.path_prefix.clone(),
            buckets:     BucketOptions {
                zone: self.utc_offset.parse()?,
                months,
            },
        }
        .validated()
    }

    fn throttle_config(&self,) -> ThrottleConfig
    {
        ThrottleConfig {
            rate:       self.rate,
            per:        Duration::from_secs(self.rate_window,),
            concurrent: self.concurrent,
        }
    }
}

/// Entry point that reports startup errors and sets the exit status.
#[tokio::main]
async fn main()
{
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pr_stats=info",),),
        )
        .with_writer(std::io::stderr,)
        .init();

    if let Err(error,) = run(Cli::parse(),).await {
        error!("{}", error.to_display_string());
        process::exit(1,);
    }
}

/// Executes a full run.
///
/// # Errors
///
/// Propagates errors from credential resolution, option validation and
/// target loading. Per-repository failures are reported in the summary.
async fn run(cli: Cli,) -> Result<RunSummary, Error,>
{
    let credentials =
        Credentials::resolve(cli.username.clone(), cli.token.clone(), cli.credentials.as_deref(),)?;
    let options = cli.run_options()?;
    let throttle = Throttle::new(&cli.throttle_config(),)?;
    let client = GitHubClient::new(&credentials, &options.api_base,)?;

    let targets = match TargetSource::parse(&cli.targets,) {
        TargetSource::Url(url,) => fetch_targets(&client, &url,).await?,
        TargetSource::File(path,) => load_targets(&path,)?,
    };
    info!("Processing {} repositories", targets.len());

    let progress = progress_bar(cli.quiet,);
    let summary = match &cli.output_dir {
        Some(directory,) => {
            let publisher = DirectoryPublisher::new(directory,);
            publish_all(&client, &publisher, &throttle, options, progress, &targets,).await
        }
        None => {
            let destination = cli
                .destination
                .as_deref()
                .ok_or_else(|| Error::validation("missing required --destination <OWNER/REPO>",),)
                .and_then(Target::parse,)?;
            let publisher = client.publisher(destination, cli.branch.clone(),);
            publish_all(&client, &publisher, &throttle, options, progress, &targets,).await
        }
    };

    Ok(summary,)
}

async fn publish_all<P,>(
    client: &GitHubClient,
    publisher: &P,
    throttle: &Throttle,
    options: RunOptions,
    progress: ProgressBar,
    targets: &[Target],
) -> RunSummary
where
    P: Publisher,
{
    Orchestrator::new(client, publisher, throttle, options,)
        .with_progress(progress,)
        .run(targets,)
        .await
}

fn progress_bar(quiet: bool,) -> ProgressBar
{
    if quiet {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new(0,);
    if let Ok(style,) =
        ProgressStyle::default_bar().template("{spinner:.yellow} [{elapsed_precise}] {pos}/{len} {msg}",)
    {
        progress.set_style(style,);
    }
    progress
}
