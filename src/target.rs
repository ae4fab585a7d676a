// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Repository targets processed by a run.
///
/// A target identifies one monitored GitHub repository and derives the
/// pull-request listing URL and the path its report is published under.
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Characters GitHub accepts in account and repository names.
static NAME_PATTERN: LazyLock<Regex,> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.-]+$",).unwrap_or_else(|error| panic!("invalid name pattern: {error}"),)
},);

/// One monitored repository, in the order supplied by the target list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize,)]
pub struct Target
{
    /// Account that owns the repository.
    pub owner: String,
    /// Repository name.
    #[serde(alias = "repository")]
    pub repo:  String,
}

impl Target
{
    /// Builds a validated target from raw owner and repository names.
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when either name is empty, contains
    /// characters GitHub does not allow, or is a relative path component.
    ///
    /// # Examples
    ///
    /// ```
    /// use pr_stats::Target;
    ///
    /// let target = Target::new(" octocat ", "hello-world",)?;
    /// assert_eq!(target.to_string(), "octocat/hello-world");
    /// # Ok::<(), pr_stats::Error>(())
    /// ```
    pub fn new(owner: &str, repo: &str,) -> Result<Self, Error,>
    {
        Ok(Self {
            owner: normalize_name("owner", owner,)?,
            repo:  normalize_name("repo", repo,)?,
        },)
    }

    /// Re-validates a target that was deserialized without going through
    /// [`Target::new`].
    ///
    /// # Errors
    ///
    /// Same as [`Target::new`].
    pub fn validated(self,) -> Result<Self, Error,>
    {
        Self::new(&self.owner, &self.repo,)
    }

    /// Parses an `owner/repo` pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the input is not exactly two
    /// slash-separated names.
    pub fn parse(input: &str,) -> Result<Self, Error,>
    {
        let mut parts = input.trim().split('/',);
        match (parts.next(), parts.next(), parts.next(),) {
            (Some(owner,), Some(repo,), None,) => Self::new(owner, repo,),
            _ => Err(Error::validation(format!("expected <owner>/<repo>, got '{input}'"),),),
        }
    }

    /// Returns the `owner-repo` slug used for report file names.
    pub fn slug(&self,) -> String
    {
        format!("{}-{}", self.owner, self.repo)
    }

    /// Returns the URL of the first page of the repository's pull requests,
    /// covering every state.
    pub fn pulls_url(&self, api_base: &str, per_page: u8,) -> String
    {
        format!(
            "{}/repos/{}/{}/pulls?state=all&per_page={per_page}",
            api_base.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }

    /// Returns the path of the published report below `prefix`.
    pub fn report_path(&self, prefix: &str,) -> String
    {
        let prefix = prefix.trim_matches('/',);
        if prefix.is_empty() {
            format!("{}.json", self.slug())
        } else {
            format!("{prefix}/{}.json", self.slug())
        }
    }

    /// Returns the commit message used when publishing the report.
    pub fn commit_message(&self,) -> String
    {
        format!("new version of file {}", self.slug())
    }
}

impl std::fmt::Display for Target
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

fn normalize_name(field: &str, input: &str,) -> Result<String, Error,>
{
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty"),),);
    }

    if trimmed == "." || trimmed == ".." || !NAME_PATTERN.is_match(trimmed,) {
        return Err(Error::validation(format!("{field} '{trimmed}' is not a valid GitHub name"),),);
    }

    Ok(trimmed.to_owned(),)
}
