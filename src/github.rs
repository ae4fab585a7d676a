// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// GitHub adapters built on octocrab.
///
/// One authenticated client serves the three remote interactions of a run:
/// fetching the target list, listing pull requests page by page, and
/// committing generated reports through the contents API.
///
/// octocrab only attaches credentials to host-relative routes, so page URLs
/// are reduced to their path and query before they are requested.
use base64::{Engine, prelude::BASE64_STANDARD};
use http::{
    HeaderMap, HeaderValue,
    header::{ACCEPT, AUTHORIZATION},
};
use octocrab::{Octocrab, Page};
use tracing::{debug, info};

use crate::{
    config::{Credentials, parse_targets},
    error::Error,
    fetch::{PageSource, RawPage},
    normalizer::RawPullRequest,
    publish::{PublishedFile, Publisher},
    target::Target,
};

/// Default REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
/// Media type requested from the REST API.
pub const GITHUB_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// Authenticated GitHub REST client.
#[derive(Debug, Clone,)]
pub struct GitHubClient
{
    octocrab:      Octocrab,
    authorization: HeaderValue,
}

impl GitHubClient
{
    /// Builds a client that sends Basic authentication and the
    /// [`GITHUB_MEDIA_TYPE`] media type on every request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GitHub`] when the base URL is invalid or the client
    /// cannot be constructed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pr_stats::{Credentials, GitHubClient, DEFAULT_API_BASE};
    ///
    /// # fn example() -> Result<(), pr_stats::Error> {
    /// let credentials = Credentials::resolve(
    ///     Some("octocat".to_owned(),),
    ///     Some("ghp_example".to_owned(),),
    ///     None,
    /// )?;
    /// let client = GitHubClient::new(&credentials, DEFAULT_API_BASE,)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(credentials: &Credentials, api_base: &str,) -> Result<Self, Error,>
    {
        let octocrab = Octocrab::builder()
            .base_uri(api_base,)
            .map_err(|e| Error::github(format!("invalid GitHub API base URL '{api_base}'"), e,),)?
            .add_header(ACCEPT, GITHUB_MEDIA_TYPE.to_owned(),)
            .basic_auth(credentials.username.clone(), credentials.token.clone(),)
            .build()
            .map_err(|e| Error::github("failed to initialize GitHub client", e,),)?;

        let encoded = BASE64_STANDARD.encode(format!("{}:{}", credentials.username, credentials.token),);
        let mut authorization = HeaderValue::from_str(&format!("Basic {encoded}"),)
            .map_err(|e| Error::validation(format!("credentials cannot be sent as a header: {e}"),),)?;
        authorization.set_sensitive(true,);

        Ok(Self {
            octocrab,
            authorization,
        },)
    }

    /// Returns a publisher committing into `destination`, optionally on a
    /// specific branch instead of the default one.
    pub fn publisher(&self, destination: Target, branch: Option<String,>,) -> GitHubPublisher
    {
        GitHubPublisher {
            octocrab: self.octocrab.clone(),
            destination,
            branch,
        }
    }
}

/// Returns the path and query of `url`, or `url` itself when it is already
/// host-relative.
fn request_route(url: &str,) -> &str
{
    match url.split_once("://",) {
        Some((_, rest,),) => rest.find('/',).map_or("/", |index| &rest[index..],),
        None => url,
    }
}

/// Downloads and parses a remote JSON target list.
///
/// The list usually lives on a static site rather than the API host, so the
/// Basic credentials are attached explicitly instead of relying on octocrab.
///
/// # Errors
///
/// Returns [`Error::GitHub`] when the download fails and the errors of
/// [`parse_targets`] when the document is invalid.
pub async fn fetch_targets(client: &GitHubClient, url: &str,) -> Result<Vec<Target,>, Error,>
{
    debug!("Fetching target list from {}", url);
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, client.authorization.clone(),);

    let document: serde_json::Value = client
        .octocrab
        .get_with_headers(url, None::<&(),>, Some(headers,),)
        .await
        .map_err(|e| Error::github(format!("failed to fetch target list from {url}"), e,),)?;

    let targets = parse_targets(&serde_json::to_string(&document,)?,)?;
    info!("Loaded {} targets from {}", targets.len(), url);
    Ok(targets,)
}

impl PageSource for GitHubClient
{
    async fn fetch_page(&self, url: &str,) -> Result<RawPage, Error,>
    {
        let page: Page<RawPullRequest,> = self
            .octocrab
            .get(request_route(url,), None::<&(),>,)
            .await
            .map_err(|e| Error::github(format!("failed to fetch page {url}"), e,),)?;

        Ok(RawPage {
            records: page.items,
            next:    page.next.map(|uri| uri.to_string(),),
        },)
    }
}

/// Commits reports into a repository through the contents API.
#[derive(Debug, Clone,)]
pub struct GitHubPublisher
{
    octocrab:    Octocrab,
    destination: Target,
    branch:      Option<String,>,
}

impl GitHubPublisher
{
    /// Returns the SHA of the current version of `path`, `None` when the
    /// file does not exist yet.
    async fn existing_sha(&self, path: &str,) -> Result<Option<String,>, Error,>
    {
        let handler = self.octocrab.repos(&self.destination.owner, &self.destination.repo,);
        let mut request = handler.get_content().path(path,);
        if let Some(branch,) = &self.branch {
            request = request.r#ref(branch,);
        }

        match request.send().await {
            Ok(contents,) => Ok(contents.items.into_iter().next().map(|item| item.sha,),),
            Err(octocrab::Error::GitHub {
                source, ..
            },) if source.status_code.as_u16() == 404 => Ok(None,),
            Err(e,) => Err(Error::github(
                format!("failed to look up {path} in {}", self.destination),
                e,
            ),),
        }
    }
}

impl Publisher for GitHubPublisher
{
    async fn publish(&self, file: &PublishedFile,) -> Result<(), Error,>
    {
        let sha = self.existing_sha(&file.path,).await?;
        let handler = self.octocrab.repos(&self.destination.owner, &self.destination.repo,);

        let mut request = match &sha {
            Some(sha,) => handler.update_file(&file.path, &file.message, &file.content, sha,),
            None => handler.create_file(&file.path, &file.message, &file.content,),
        };
        if let Some(branch,) = &self.branch {
            request = request.branch(branch,);
        }

        request.send().await.map_err(|e| {
            Error::github(format!("failed to commit {} to {}", file.path, self.destination), e,)
        },)?;

        debug!(
            "{} {} in {}",
            if sha.is_some() { "Updated" } else { "Created" },
            file.path,
            self.destination
        );
        Ok((),)
    }
}
