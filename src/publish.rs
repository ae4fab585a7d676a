// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Destinations for generated reports.
///
/// A report is written as one file identified by its repository-relative
/// path, together with the commit message used when the destination is a
/// GitHub repository.
use std::{
    fs,
    future::Future,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::{self, Error};

/// File produced for one repository.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct PublishedFile
{
    /// Path relative to the destination root, e.g.
    /// `generated_files/octocat-hello-world.json`.
    pub path:    String,
    /// File contents.
    pub content: String,
    /// Commit message describing the update.
    pub message: String,
}

/// Destination able to store a [`PublishedFile`].
pub trait Publisher
{
    /// Writes the file, replacing any previous version.
    fn publish(&self, file: &PublishedFile,) -> impl Future<Output = Result<(), Error,>,>;
}

/// Writes reports below a local directory instead of committing them.
#[derive(Debug, Clone,)]
pub struct DirectoryPublisher
{
    root: PathBuf,
}

impl DirectoryPublisher
{
    /// Creates a publisher rooted at `root`.
    pub fn new(root: impl Into<PathBuf,>,) -> Self
    {
        Self {
            root: root.into(),
        }
    }

    /// Returns the local path a published file is written to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the file path is absolute or climbs
    /// out of the root.
    pub fn destination(&self, file: &PublishedFile,) -> Result<PathBuf, Error,>
    {
        let relative = Path::new(&file.path,);
        let escapes = relative.components().any(|component| {
            !matches!(component, std::path::Component::Normal(_) | std::path::Component::CurDir)
        },);
        if file.path.is_empty() || escapes {
            return Err(Error::validation(format!(
                "publish path '{}' must be relative to the output directory",
                file.path
            ),),);
        }
        Ok(self.root.join(relative,),)
    }
}

impl Publisher for DirectoryPublisher
{
    async fn publish(&self, file: &PublishedFile,) -> Result<(), Error,>
    {
        let destination = self.destination(file,)?;
        if let Some(parent,) = destination.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent,).map_err(|source| error::io_error(parent, source,),)?;
        }

        fs::write(&destination, &file.content,)
            .map_err(|source| error::io_error(&destination, source,),)?;
        debug!("Wrote {} ({})", destination.display(), file.message);
        Ok((),)
    }
}
