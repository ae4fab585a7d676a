//! Configuration documents consumed at startup.
//!
//! Two inputs drive a run: the credentials used for every GitHub call and
//! the ordered list of repositories to process. The target list is either a
//! bare array of `{owner, repo}` objects or a document with a `targets` key,
//! encoded as JSON or YAML. Remote lists are fetched through the GitHub
//! client (see [`crate::github::fetch_targets`]) and parsed with
//! [`parse_targets`].

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    error::{self, Error},
    target::Target,
};

/// Username/token pair used for Basic authentication against GitHub.
///
/// The on-disk shape matches a `github-credentials.json` file:
///
/// ```
/// use pr_stats::Credentials;
///
/// let credentials: Credentials =
///     serde_json::from_str(r#"{"username":"octocat","token":"ghp_example"}"#,)?;
/// assert_eq!(credentials.username, "octocat");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Clone, Deserialize,)]
pub struct Credentials
{
    /// GitHub login.
    pub username: String,
    /// Personal access token used as the Basic-auth password.
    pub token:    String,
}

impl std::fmt::Debug for Credentials
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        f.debug_struct("Credentials",)
            .field("username", &self.username,)
            .field("token", &"<redacted>",)
            .finish()
    }
}

impl Credentials
{
    /// Resolves credentials from explicit values, falling back to a JSON
    /// credentials file for whichever value is missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::Serialize`] when the file cannot be
    /// read or decoded, and [`Error::Validation`] when either value is still
    /// missing or blank afterwards.
    pub fn resolve(
        username: Option<String,>,
        token: Option<String,>,
        file: Option<&Path,>,
    ) -> Result<Self, Error,>
    {
        let from_file = file.map(load_credentials,).transpose()?;
        let (file_username, file_token,) = match from_file {
            Some(credentials,) => (Some(credentials.username,), Some(credentials.token,),),
            None => (None, None,),
        };

        let username = username.or(file_username,).filter(|value| !value.trim().is_empty(),);
        let token = token.or(file_token,).filter(|value| !value.trim().is_empty(),);

        match (username, token,) {
            (Some(username,), Some(token,),) => Ok(Self {
                username: username.trim().to_owned(),
                token:    token.trim().to_owned(),
            },),
            (None, _,) => Err(Error::validation("missing GitHub username",),),
            (_, None,) => Err(Error::validation("missing GitHub token",),),
        }
    }
}

/// Reads a `{username, token}` JSON credentials file.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and
/// [`Error::Serialize`] when it is not valid JSON of the expected shape.
pub fn load_credentials(path: &Path,) -> Result<Credentials, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    Ok(serde_json::from_str(&contents,)?,)
}

/// Location of the target list.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub enum TargetSource
{
    /// Remote JSON document fetched with the run's credentials.
    Url(String,),
    /// Local JSON or YAML file.
    File(PathBuf,),
}

impl TargetSource
{
    /// Classifies a `--targets` argument: `http://` and `https://` inputs are
    /// URLs, everything else is a path.
    pub fn parse(input: &str,) -> Self
    {
        let trimmed = input.trim();
        if trimmed.starts_with("https://",) || trimmed.starts_with("http://",) {
            Self::Url(trimmed.to_owned(),)
        } else {
            Self::File(PathBuf::from(trimmed,),)
        }
    }
}

#[derive(Debug, Deserialize,)]
#[serde(untagged)]
enum TargetDocument
{
    List(Vec<Target,>,),
    Wrapped
    {
        targets: Vec<Target,>,
    },
}

/// Parses and validates a target list.
///
/// JSON documents are valid YAML, so one parser covers both encodings.
/// Processing order is the document order.
///
/// # Errors
///
/// Returns [`Error::Parse`] when the document matches neither accepted shape
/// and [`Error::Validation`] when it lists no targets or an entry carries an
/// invalid name.
///
/// # Examples
///
/// ```
/// use pr_stats::parse_targets;
///
/// let targets = parse_targets(r#"[{"owner":"octocat","repo":"hello-world"}]"#,)?;
/// assert_eq!(targets[0].to_string(), "octocat/hello-world");
/// # Ok::<(), pr_stats::Error>(())
/// ```
pub fn parse_targets(contents: &str,) -> Result<Vec<Target,>, Error,>
{
    let document: TargetDocument = serde_yaml::from_str(contents,)?;
    let targets = match document {
        TargetDocument::List(targets,) => targets,
        TargetDocument::Wrapped {
            targets,
        } => targets,
    };

    if targets.is_empty() {
        return Err(Error::validation("target list must contain at least one repository",),);
    }

    targets.into_iter().map(Target::validated,).collect()
}

/// Loads targets from a local JSON or YAML file.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read, otherwise the errors
/// of [`parse_targets`].
pub fn load_targets(path: &Path,) -> Result<Vec<Target,>, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    parse_targets(&contents,)
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn parses_bare_json_array_in_order()
    {
        let json = r#"[
            {"owner": "spring-projects", "repo": "spring-boot"},
            {"owner": "octocat", "repo": "hello-world"}
        ]"#;

        let targets = parse_targets(json,).expect("valid targets",);
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].to_string(), "spring-projects/spring-boot");
        assert_eq!(targets[1].to_string(), "octocat/hello-world");
    }

    #[test]
    fn parses_wrapped_yaml_document()
    {
        let yaml = r"
targets:
  - owner: octocat
    repository: hello-world
";
        let targets = parse_targets(yaml,).expect("valid targets",);
        assert_eq!(targets, vec![Target::new("octocat", "hello-world").expect("valid target")]);
    }

    #[test]
    fn rejects_empty_list()
    {
        let error = parse_targets("[]",).expect_err("expected validation error",);
        match error {
            Error::Validation {
                message,
            } => assert_eq!(message, "target list must contain at least one repository"),
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_entries()
    {
        assert!(parse_targets(r#"[{"owner": "", "repo": "x"}]"#,).is_err());
        assert!(matches!(parse_targets(r#"[{"owner": "only"}]"#,), Err(Error::Parse { .. })));
    }

    #[test]
    fn load_targets_reads_file()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("config.json",);
        fs::write(&path, r#"[{"owner":"a","repo":"b"}]"#,).expect("failed to write config",);

        let targets = load_targets(&path,).expect("valid file",);
        assert_eq!(targets.len(), 1);

        let missing = load_targets(&temp.path().join("missing.json",),);
        assert!(matches!(missing, Err(Error::Io { .. })));
    }

    #[test]
    fn target_source_classifies_urls_and_paths()
    {
        assert_eq!(
            TargetSource::parse(" https://example.github.io/generated_files/config.json ",),
            TargetSource::Url("https://example.github.io/generated_files/config.json".to_owned())
        );
        assert_eq!(
            TargetSource::parse("targets.yaml",),
            TargetSource::File(PathBuf::from("targets.yaml"))
        );
    }

    #[test]
    fn credentials_prefer_explicit_values_over_file()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("github-credentials.json",);
        fs::write(&path, r#"{"username":"file-user","token":"file-token"}"#,)
            .expect("failed to write credentials",);

        let credentials = Credentials::resolve(Some("cli-user".to_owned()), None, Some(&path),)
            .expect("credentials resolved",);
        assert_eq!(credentials.username, "cli-user");
        assert_eq!(credentials.token, "file-token");
    }

    #[test]
    fn credentials_require_both_values()
    {
        let error = Credentials::resolve(Some("user".to_owned()), Some("  ".to_owned()), None,)
            .expect_err("blank token rejected",);
        match error {
            Error::Validation {
                message,
            } => assert_eq!(message, "missing GitHub token"),
            other => panic!("unexpected error variant: {other:?}"),
        }

        assert!(Credentials::resolve(None, Some("token".to_owned()), None).is_err());
    }

    #[test]
    fn credentials_debug_redacts_token()
    {
        let credentials = Credentials {
            username: "octocat".to_owned(),
            token:    "ghp_secret".to_owned(),
        };
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("octocat"));
        assert!(!rendered.contains("ghp_secret"));
    }
}
