//! Repository-level statistics computed from normalized pull requests.
//!
//! Every function here is pure and total: the same ordered input always
//! yields the same output, and empty inputs produce placeholder values
//! instead of errors. Maps keep first-encountered order, which is also the
//! tie-break order for the leader boards: a contributor only displaces the
//! current leader with a strictly greater value.

use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, Local, Offset, Utc};
use indexmap::IndexMap;
use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{error::Error, normalizer::NormalizedPullRequest};

/// Placeholder user reported when no contributor qualifies.
pub const NOBODY: &str = "nobody";

/// Language used for month names in date buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq,)]
pub enum MonthNames
{
    /// `January` .. `December`.
    #[default]
    English,
    /// `Janvier` .. `Décembre`.
    French,
}

const ENGLISH_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const FRENCH_MONTHS: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

impl MonthNames
{
    /// Returns the name of the zero-based month.
    pub fn name(self, month0: u32,) -> &'static str
    {
        let table = match self {
            Self::English => &ENGLISH_MONTHS,
            Self::French => &FRENCH_MONTHS,
        };
        table[month0 as usize % 12]
    }
}

impl FromStr for MonthNames
{
    type Err = Error;

    fn from_str(value: &str,) -> Result<Self, Self::Err,>
    {
        match value.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Self::English,),
            "french" | "fr" => Ok(Self::French,),
            other => Err(Error::validation(format!(
                "unsupported month names '{other}', expected english or french"
            ),),),
        }
    }
}

/// Time zone in which creation timestamps are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum BucketZone
{
    /// A fixed offset from UTC.
    Fixed(FixedOffset,),
    /// The time zone of the host running the process.
    Local,
}

impl Default for BucketZone
{
    fn default() -> Self
    {
        Self::Fixed(Utc.fix(),)
    }
}

impl BucketZone
{
    /// Builds a fixed zone from an offset in minutes east of UTC.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the offset is outside ±24 hours.
    pub fn from_offset_minutes(minutes: i32,) -> Result<Self, Error,>
    {
        minutes
            .checked_mul(60,)
            .and_then(FixedOffset::east_opt,)
            .map(Self::Fixed,)
            .ok_or_else(|| Error::validation(format!("invalid UTC offset of {minutes} minutes"),),)
    }
}

impl FromStr for BucketZone
{
    type Err = Error;

    /// Accepts `local` or an offset in minutes such as `60` or `-300`.
    fn from_str(value: &str,) -> Result<Self, Self::Err,>
    {
        let value = value.trim();
        if value.eq_ignore_ascii_case("local",) {
            return Ok(Self::Local,);
        }

        let minutes = value.parse::<i32>().map_err(|_| {
            Error::validation(format!(
                "unsupported UTC offset '{value}', expected minutes or local"
            ),)
        },)?;
        Self::from_offset_minutes(minutes,)
    }
}

/// Controls how creation timestamps are assigned to month buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq,)]
pub struct BucketOptions
{
    /// Zone applied before reading the calendar month and year.
    pub zone:   BucketZone,
    /// Language of the month names.
    pub months: MonthNames,
}

impl BucketOptions
{
    /// Builds options from an offset in minutes east of UTC.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the offset is outside ±24 hours.
    pub fn from_offset_minutes(minutes: i32, months: MonthNames,) -> Result<Self, Error,>
    {
        Ok(Self {
            zone: BucketZone::from_offset_minutes(minutes,)?,
            months,
        },)
    }

    /// Returns the `<MonthName>-<Year>` bucket label of a timestamp.
    pub fn label(&self, timestamp: &DateTime<Utc,>,) -> String
    {
        let (month0, year,) = match self.zone {
            BucketZone::Fixed(offset,) => {
                let local = timestamp.with_timezone(&offset,);
                (local.month0(), local.year(),)
            }
            BucketZone::Local => {
                let local = timestamp.with_timezone(&Local,);
                (local.month0(), local.year(),)
            }
        };
        format!("{}-{}", self.months.name(month0), year)
    }
}

/// Pull-request counts of one contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
#[serde(rename_all = "camelCase")]
pub struct ContributorStats
{
    /// Pull requests opened.
    pub total:      u64,
    /// Pull requests merged, never above `total`.
    pub merged:     u64,
    /// Avatar of the contributor's first-encountered pull request.
    pub avatar_url: String,
}

impl ContributorStats
{
    /// Share of merged pull requests, `None` when nothing was opened.
    pub fn merge_ratio(&self,) -> Option<f64,>
    {
        (self.total > 0).then(|| self.merged as f64 / self.total as f64,)
    }
}

/// Pull-request counts of one calendar month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize,)]
pub struct PeriodStats
{
    /// Pull requests created in the month.
    pub total:  u64,
    /// Those of them that were merged.
    pub merged: u64,
}

/// Contributor leading a count-based board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct Leader
{
    /// Contributor login, [`NOBODY`] when nobody scored.
    pub user:  String,
    /// Winning count.
    #[serde(rename = "nbPR")]
    pub count: u64,
    /// Contributor avatar.
    pub image: String,
}

/// Contributor with the best merge ratio.
#[derive(Debug, Clone, PartialEq, Serialize,)]
pub struct RatioLeader
{
    /// Contributor login, [`NOBODY`] when nobody scored.
    pub user:  String,
    /// Merge ratio in `[0, 1]`.
    pub ratio: f64,
    /// Contributor avatar.
    pub image: String,
}

/// Most recent pull request of a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize,)]
#[serde(rename_all = "camelCase")]
pub struct LastPullRequest
{
    /// Creation timestamp, serialized as `""` when the repository is empty.
    #[serde(serialize_with = "timestamp_or_empty")]
    pub created_at: Option<DateTime<Utc,>,>,
    /// Author login, empty when the repository is empty.
    pub username:   String,
}

/// Published summary of one repository.
#[derive(Debug, Clone, PartialEq, Serialize,)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryReport
{
    /// Time the report was computed.
    pub last_update:   DateTime<Utc,>,
    /// Repository owner.
    pub owner:         String,
    /// Repository name.
    pub repo:          String,
    /// Number of pull requests.
    #[serde(rename = "totalPR")]
    pub total_pr:      u64,
    /// Most recent pull request.
    #[serde(rename = "lastPR")]
    pub last_pr:       LastPullRequest,
    /// Contributor with the most pull requests.
    #[serde(rename = "bestPR", serialize_with = "some_or_empty")]
    pub best_pr:       Option<Leader,>,
    /// Contributor with the most merged pull requests.
    #[serde(serialize_with = "some_or_empty")]
    pub best_merged:   Option<Leader,>,
    /// Contributor with the best merge ratio.
    #[serde(serialize_with = "some_or_empty")]
    pub best_ratio:    Option<RatioLeader,>,
    /// Per-contributor counts in first-encountered order.
    #[serde(rename = "userPRInfos")]
    pub user_pr_infos: IndexMap<String, ContributorStats,>,
    /// Per-month counts in first-encountered order.
    #[serde(rename = "datePRInfos")]
    pub date_pr_infos: IndexMap<String, PeriodStats,>,
}

impl RepositoryReport
{
    /// Encodes the report as pretty JSON with two-space indentation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] if encoding fails.
    pub fn to_pretty_json(&self,) -> Result<String, Error,>
    {
        Ok(serde_json::to_string_pretty(self,)?,)
    }
}

/// Groups pull requests by author.
pub fn contributor_stats(
    pull_requests: &[NormalizedPullRequest],
) -> IndexMap<String, ContributorStats,>
{
    let mut stats: IndexMap<String, ContributorStats,> = IndexMap::new();
    for pull_request in pull_requests {
        let entry = stats.entry(pull_request.username.clone(),).or_insert_with(|| ContributorStats {
            total:      0,
            merged:     0,
            avatar_url: pull_request.avatar_url.clone(),
        },);
        entry.total += 1;
        if pull_request.is_merged() {
            entry.merged += 1;
        }
    }
    stats
}

/// Groups pull requests by creation month.
pub fn monthly_frequency(
    pull_requests: &[NormalizedPullRequest],
    options: &BucketOptions,
) -> IndexMap<String, PeriodStats,>
{
    let mut buckets: IndexMap<String, PeriodStats,> = IndexMap::new();
    for pull_request in pull_requests {
        let bucket = buckets.entry(options.label(&pull_request.created_at,),).or_default();
        bucket.total += 1;
        if pull_request.is_merged() {
            bucket.merged += 1;
        }
    }
    buckets
}

/// Contributor with the highest merge ratio.
///
/// Contributors without pull requests are ignored. Starts from
/// `{nobody, 0, ""}`, so a board where nobody merged anything keeps the
/// placeholder.
pub fn best_ratio(stats: &IndexMap<String, ContributorStats,>,) -> RatioLeader
{
    let mut leader = RatioLeader {
        user: NOBODY.to_owned(), ratio: 0.0, image: String::new(),
    };
    for (user, contributor,) in stats {
        if let Some(ratio,) = contributor.merge_ratio()
            && ratio > leader.ratio
        {
            leader = RatioLeader {
                user: user.clone(),
                ratio,
                image: contributor.avatar_url.clone(),
            };
        }
    }
    leader
}

/// Contributor with the most pull requests.
pub fn most_pull_requests(stats: &IndexMap<String, ContributorStats,>,) -> Leader
{
    leader_by(stats, |contributor| contributor.total,)
}

/// Contributor with the most merged pull requests.
pub fn most_merged(stats: &IndexMap<String, ContributorStats,>,) -> Leader
{
    leader_by(stats, |contributor| contributor.merged,)
}

fn leader_by<F,>(stats: &IndexMap<String, ContributorStats,>, score: F,) -> Leader
where
    F: Fn(&ContributorStats,) -> u64,
{
    let mut leader = Leader {
        user: NOBODY.to_owned(), count: 0, image: String::new(),
    };
    for (user, contributor,) in stats {
        let value = score(contributor,);
        if value > leader.count {
            leader = Leader {
                user:  user.clone(),
                count: value,
                image: contributor.avatar_url.clone(),
            };
        }
    }
    leader
}

/// Computes the full report of one repository.
///
/// `pull_requests` must be most-recent-first, as listed by the API; the
/// first element becomes `lastPR`. `now` is stamped as `lastUpdate`.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use pr_stats::{BucketOptions, summarize};
///
/// let report = summarize("octocat", "hello-world", &[], &BucketOptions::default(), Utc::now(),);
/// assert_eq!(report.total_pr, 0);
/// assert!(report.best_pr.is_none());
/// ```
pub fn summarize(
    owner: &str,
    repo: &str,
    pull_requests: &[NormalizedPullRequest],
    options: &BucketOptions,
    now: DateTime<Utc,>,
) -> RepositoryReport
{
    let mut report = RepositoryReport {
        last_update:   now,
        owner:         owner.to_owned(),
        repo:          repo.to_owned(),
        total_pr:      pull_requests.len() as u64,
        last_pr:       LastPullRequest::default(),
        best_pr:       None,
        best_merged:   None,
        best_ratio:    None,
        user_pr_infos: IndexMap::new(),
        date_pr_infos: IndexMap::new(),
    };

    let Some(latest,) = pull_requests.first() else {
        return report;
    };

    let stats = contributor_stats(pull_requests,);
    report.last_pr = LastPullRequest {
        created_at: Some(latest.created_at,),
        username:   latest.username.clone(),
    };
    report.best_ratio = Some(best_ratio(&stats,),);
    report.best_pr = Some(most_pull_requests(&stats,),);
    report.best_merged = Some(most_merged(&stats,),);
    report.date_pr_infos = monthly_frequency(pull_requests, options,);
    report.user_pr_infos = stats;
    report
}

fn some_or_empty<T, S,>(value: &Option<T,>, serializer: S,) -> Result<S::Ok, S::Error,>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(inner,) => inner.serialize(serializer,),
        None => serializer.serialize_map(Some(0,),)?.end(),
    }
}

fn timestamp_or_empty<S,>(value: &Option<DateTime<Utc,>,>, serializer: S,) -> Result<S::Ok, S::Error,>
where
    S: Serializer,
{
    match value {
        Some(timestamp,) => timestamp.serialize(serializer,),
        None => serializer.serialize_str("",),
    }
}
