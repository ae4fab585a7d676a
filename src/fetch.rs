// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Pagination over pull-request list endpoints.
///
/// Pages are requested one after another through a [`PageSource`], each
/// request gated by the run's [`Throttle`], until a page arrives without a
/// `next` link.
use std::future::Future;

use tracing::debug;

use crate::{error::Error, normalizer::RawPullRequest, throttle::Throttle};

/// One page of raw pull-request records.
#[derive(Debug, Clone, Default, PartialEq, Eq,)]
pub struct RawPage
{
    /// Records in API order.
    pub records: Vec<RawPullRequest,>,
    /// URL of the following page, taken from the `rel="next"` link.
    pub next:    Option<String,>,
}

/// Transport able to fetch one page of pull requests by URL.
pub trait PageSource
{
    /// Fetches the page at `url`.
    fn fetch_page(&self, url: &str,) -> impl Future<Output = Result<RawPage, Error,>,>;
}

/// Fetches every page starting at `first_url` and concatenates the records
/// in page order.
///
/// # Errors
///
/// Returns the first error reported by the source or the throttle. Records
/// collected before the failure are discarded.
///
/// # Example
///
/// ```no_run
/// use pr_stats::{GitHubClient, Throttle, ThrottleConfig, Target, fetch_all_pages};
///
/// # async fn example(client: GitHubClient) -> Result<(), pr_stats::Error> {
/// let throttle = Throttle::new(&ThrottleConfig::default(),)?;
/// let target = Target::new("octocat", "hello-world",)?;
/// let url = target.pulls_url("https://api.github.com", 100,);
/// let records = fetch_all_pages(&client, &throttle, &url,).await?;
/// println!("{} pull requests", records.len());
/// # Ok(())
/// # }
/// ```
pub async fn fetch_all_pages<S,>(
    source: &S,
    throttle: &Throttle,
    first_url: &str,
) -> Result<Vec<RawPullRequest,>, Error,>
where
    S: PageSource,
{
    let mut records = Vec::new();
    let mut next = Some(first_url.to_owned(),);
    let mut pages = 0usize;

    while let Some(url,) = next {
        let page = {
            let _permit = throttle.acquire().await?;
            source.fetch_page(&url,).await?
        };

        pages += 1;
        debug!("Fetched page {} ({} records) from {}", pages, page.records.len(), url);

        records.extend(page.records,);
        next = page.next;
    }

    Ok(records,)
}
