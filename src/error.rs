#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the pr-stats crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.

use std::path::{Path, PathBuf};

/// Unified error type returned by the loaders, the GitHub adapters and the
/// CLI.
///
/// Per-repository failures are logged by the orchestrator and never bubble
/// out of a run; the variants below surface to the caller only during
/// startup (credentials, target list) or from the individual adapters.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors that occur while reading or writing local files.
    #[error("failed to access {path:?}: {source}")]
    Io {
        /// Location of the file being accessed.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML/JSON decoding errors for configuration documents.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Returned when configuration or input violates invariants.
    #[error("invalid configuration: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Wraps JSON errors raised while encoding reports or decoding
    /// credentials.
    #[error("failed to process JSON: {source}")]
    Serialize {
        /// Underlying serde_json error.
        source: serde_json::Error
    },
    /// Wraps failures reported by the GitHub client.
    #[error("{context}: {source}")]
    GitHub {
        /// Operation that was being performed.
        context: String,
        /// Error reported by octocrab.
        source:  octocrab::Error
    },
    /// Service errors that do not originate from the GitHub client.
    #[error("service error: {message}")]
    Service {
        /// Human readable message describing the service error.
        message: String
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a service error from the provided displayable value.
    pub fn service<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Service {
            message: message.into()
        }
    }

    /// Wraps an octocrab error with the operation that produced it.
    pub fn github<C>(context: C, source: octocrab::Error) -> Self
    where
        C: Into<String>
    {
        Self::GitHub {
            context: context.into(),
            source
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}
