// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Sequential processing of the configured repositories.
///
/// Each target goes through fetch, normalize, aggregate and publish before
/// the next one starts. Failures are logged and end the work for the
/// affected repository only; the loop always advances to the next target.
use chrono::Utc;
use indicatif::ProgressBar;
use tracing::{error, info, warn};

use crate::{
    aggregate::{BucketOptions, summarize},
    error::Error,
    fetch::{PageSource, fetch_all_pages},
    github::DEFAULT_API_BASE,
    normalizer::normalize_all,
    publish::{PublishedFile, Publisher},
    target::Target,
    throttle::Throttle,
};

/// Default number of pull requests requested per page.
pub const DEFAULT_PER_PAGE: u8 = 100;
/// Default directory of published reports.
pub const DEFAULT_PATH_PREFIX: &str = "generated_files";

/// Settings shared by every target of a run.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct RunOptions
{
    /// REST endpoint used to build first-page URLs.
    pub api_base:    String,
    /// Pull requests per page, between 1 and 100.
    pub per_page:    u8,
    /// Directory of the published reports within the destination.
    pub path_prefix: String,
    /// Month bucketing rules.
    pub buckets:     BucketOptions,
}

impl Default for RunOptions
{
    fn default() -> Self
    {
        Self {
            api_base:    DEFAULT_API_BASE.to_owned(),
            per_page:    DEFAULT_PER_PAGE,
            path_prefix: DEFAULT_PATH_PREFIX.to_owned(),
            buckets:     BucketOptions::default(),
        }
    }
}

impl RunOptions
{
    /// Checks option ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `per_page` is outside `1..=100`.
    pub fn validated(self,) -> Result<Self, Error,>
    {
        if !(1..=100).contains(&self.per_page,) {
            return Err(Error::validation(format!(
                "per_page must be between 1 and 100, got {}",
                self.per_page
            ),),);
        }
        Ok(self,)
    }
}

/// Result of processing one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum TargetOutcome
{
    /// The report was published.
    Published,
    /// A page could not be fetched; nothing was published.
    FetchFailed,
    /// The report could not be encoded or published.
    PublishFailed,
}

/// Counts of target outcomes over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq,)]
pub struct RunSummary
{
    /// Targets whose report was published.
    pub published:        usize,
    /// Targets skipped because fetching failed.
    pub fetch_failures:   usize,
    /// Targets whose report could not be published.
    pub publish_failures: usize,
}

impl RunSummary
{
    fn record(&mut self, outcome: TargetOutcome,)
    {
        match outcome {
            TargetOutcome::Published => self.published += 1,
            TargetOutcome::FetchFailed => self.fetch_failures += 1,
            TargetOutcome::PublishFailed => self.publish_failures += 1,
        }
    }

    /// Total number of targets processed.
    pub fn processed(&self,) -> usize
    {
        self.published + self.fetch_failures + self.publish_failures
    }
}

/// Drives a run over an ordered target list.
#[derive(Debug,)]
pub struct Orchestrator<'run, S, P,>
{
    source:    &'run S,
    publisher: &'run P,
    throttle:  &'run Throttle,
    options:   RunOptions,
    progress:  ProgressBar,
}

impl<'run, S, P,> Orchestrator<'run, S, P,>
where
    S: PageSource,
    P: Publisher,
{
    /// Creates an orchestrator with a hidden progress bar.
    pub fn new(
        source: &'run S,
        publisher: &'run P,
        throttle: &'run Throttle,
        options: RunOptions,
    ) -> Self
    {
        Self {
            source,
            publisher,
            throttle,
            options,
            progress: ProgressBar::hidden(),
        }
    }

    /// Reports per-target progress on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar,) -> Self
    {
        self.progress = progress;
        self
    }

    /// Processes every target in order, one at a time.
    pub async fn run(&self, targets: &[Target],) -> RunSummary
    {
        let mut summary = RunSummary::default();
        self.progress.set_length(targets.len() as u64,);

        for target in targets {
            self.progress.set_message(format!("Processing {target}..."),);
            let outcome = self.process(target,).await;
            summary.record(outcome,);
            self.progress.inc(1,);
        }

        self.progress.finish_with_message(format!(
            "Run complete: {} published, {} fetch failures, {} publish failures",
            summary.published, summary.fetch_failures, summary.publish_failures
        ),);
        info!(
            published = summary.published,
            fetch_failures = summary.fetch_failures,
            publish_failures = summary.publish_failures,
            "Processed {} targets",
            summary.processed()
        );

        summary
    }

    /// Fetches, aggregates and publishes the report of one target.
    pub async fn process(&self, target: &Target,) -> TargetOutcome
    {
        let first_url = target.pulls_url(&self.options.api_base, self.options.per_page,);
        let records = match fetch_all_pages(self.source, self.throttle, &first_url,).await {
            Ok(records,) => records,
            Err(e,) => {
                warn!(
                    repository = %target,
                    "Failed to fetch pull requests, skipping repository update: {}", e
                );
                return TargetOutcome::FetchFailed;
            }
        };

        let pull_requests = normalize_all(records,);
        info!(repository = %target, pull_requests = pull_requests.len(), "Fetched pull requests");

        let report = summarize(
            &target.owner,
            &target.repo,
            &pull_requests,
            &self.options.buckets,
            Utc::now(),
        );

        let content = match report.to_pretty_json() {
            Ok(content,) => content,
            Err(e,) => {
                error!(repository = %target, "Failed to encode report: {}", e);
                return TargetOutcome::PublishFailed;
            }
        };

        let file = PublishedFile {
            path: target.report_path(&self.options.path_prefix,),
            content,
            message: target.commit_message(),
        };

        match self.publisher.publish(&file,).await {
            Ok((),) => {
                info!(repository = %target, path = %file.path, "Published report");
                TargetOutcome::Published
            }
            Err(e,) => {
                error!(repository = %target, "Failed to update {}: {}", file.path, e);
                TargetOutcome::PublishFailed
            }
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::{
        fetch::tests::{StaticPages, page, raw},
        publish::tests::RecordingPublisher,
        throttle::ThrottleConfig,
    };

    fn options() -> RunOptions
    {
        RunOptions {
            api_base: "https://api.test".to_owned(), ..RunOptions::default()
        }
    }

    fn url(owner: &str, repo: &str,) -> String
    {
        format!("https://api.test/repos/{owner}/{repo}/pulls?state=all&per_page=100")
    }

    fn throttle() -> Throttle
    {
        Throttle::new(&ThrottleConfig::default(),).expect("valid limits",)
    }

    fn target(owner: &str, repo: &str,) -> Target
    {
        Target::new(owner, repo,).expect("valid target",)
    }

    #[tokio::test(start_paused = true)]
    async fn publishes_every_target_in_order()
    {
        let source = StaticPages::default()
            .with_page(&url("a", "one",), page(vec![raw("x", 3, true,)], Some("next",),),)
            .with_page("next", page(vec![raw("y", 2, false,)], None,),)
            .with_page(&url("b", "two",), page(vec![], None,),);
        let publisher = RecordingPublisher::default();
        let throttle = throttle();
        let orchestrator = Orchestrator::new(&source, &publisher, &throttle, options(),);

        let summary = orchestrator.run(&[target("a", "one",), target("b", "two",)],).await;

        assert_eq!(summary, RunSummary {
            published: 2, fetch_failures: 0, publish_failures: 0,
        });

        let published = publisher.published.borrow();
        assert_eq!(published[0].path, "generated_files/a-one.json");
        assert_eq!(published[0].message, "new version of file a-one");
        assert_eq!(published[1].path, "generated_files/b-two.json");

        let report: serde_json::Value =
            serde_json::from_str(&published[0].content,).expect("valid json",);
        assert_eq!(report["owner"], "a");
        assert_eq!(report["repo"], "one");
        assert_eq!(report["totalPR"], 2);
        assert_eq!(report["lastPR"]["username"], "x");

        let empty: serde_json::Value =
            serde_json::from_str(&published[1].content,).expect("valid json",);
        assert_eq!(empty["totalPR"], 0);
        assert_eq!(empty["bestRatio"], serde_json::json!({}));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_failure_skips_only_that_target()
    {
        let source = StaticPages::default()
            .with_failure(&url("a", "broken",),)
            .with_page(&url("b", "fine",), page(vec![raw("x", 3, true,)], None,),);
        let publisher = RecordingPublisher::default();
        let throttle = throttle();
        let orchestrator = Orchestrator::new(&source, &publisher, &throttle, options(),);

        let summary = orchestrator.run(&[target("a", "broken",), target("b", "fine",)],).await;

        assert_eq!(summary.fetch_failures, 1);
        assert_eq!(summary.published, 1);
        let published = publisher.published.borrow();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].path, "generated_files/b-fine.json");
    }

    #[tokio::test(start_paused = true)]
    async fn publish_failure_still_advances()
    {
        let source = StaticPages::default()
            .with_page(&url("a", "one",), page(vec![], None,),)
            .with_page(&url("b", "two",), page(vec![], None,),);
        let publisher = RecordingPublisher {
            failing: vec!["generated_files/a-one.json".to_owned()],
            ..RecordingPublisher::default()
        };
        let throttle = throttle();
        let orchestrator = Orchestrator::new(&source, &publisher, &throttle, options(),);

        let summary = orchestrator.run(&[target("a", "one",), target("b", "two",)],).await;

        assert_eq!(summary.publish_failures, 1);
        assert_eq!(summary.published, 1);
        assert_eq!(summary.processed(), 2);
        assert_eq!(*source.requested.borrow(), vec![url("a", "one"), url("b", "two")]);
    }

    #[test]
    fn run_options_reject_out_of_range_page_size()
    {
        let options = RunOptions {
            per_page: 0, ..RunOptions::default()
        };
        assert!(options.validated().is_err());
        assert!(RunOptions::default().validated().is_ok());
    }
}
