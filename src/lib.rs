//! Pull-request statistics for GitHub repositories.
//!
//! The library fetches the complete pull-request history of each configured
//! repository, reduces it to per-repository and per-contributor statistics,
//! and publishes every summary as a JSON file into a destination repository
//! that serves it as static-site data. Repositories are processed strictly
//! one after another; the only concurrency control is the request
//! [`Throttle`] protecting the GitHub API.

mod aggregate;
mod config;
mod error;
mod fetch;
mod github;
mod normalizer;
mod orchestrator;
mod publish;
mod target;
mod throttle;

pub use aggregate::{
    BucketOptions, BucketZone, ContributorStats, LastPullRequest, Leader, MonthNames, NOBODY, PeriodStats,
    RatioLeader, RepositoryReport, best_ratio, contributor_stats, monthly_frequency, most_merged,
    most_pull_requests, summarize,
};
pub use config::{Credentials, TargetSource, load_credentials, load_targets, parse_targets};
pub use error::{Error, io_error};
pub use fetch::{PageSource, RawPage, fetch_all_pages};
pub use github::{DEFAULT_API_BASE, GITHUB_MEDIA_TYPE, GitHubClient, GitHubPublisher, fetch_targets};
pub use normalizer::{GHOST_LOGIN, NormalizedPullRequest, RawPullRequest, RawUser, normalize_all};
pub use orchestrator::{
    DEFAULT_PATH_PREFIX, DEFAULT_PER_PAGE, Orchestrator, RunOptions, RunSummary, TargetOutcome,
};
pub use publish::{DirectoryPublisher, PublishedFile, Publisher};
pub use target::Target;
pub use throttle::{Throttle, ThrottleConfig, ThrottlePermit};
