use std::path::PathBuf;

use thiserror::Error;

/// Why a version lookup failed. `VersionLocator::locate` logs these and
/// collapses all of them to `Version::UNKNOWN`.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("couldn't find {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("{op}({}): {reason}", .path.display())]
    Unavailable {
        op: &'static str,
        path: PathBuf,
        reason: String,
    },

    #[error("no version info ({})", .path.display())]
    NoVersionInfo { path: PathBuf },

    #[error("{reason} ({})", .path.display())]
    Malformed { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    FileNotFound,
    MetadataUnavailable,
    MetadataMalformed,
}

impl LocateError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LocateError::NotFound { .. } => FailureKind::FileNotFound,
            LocateError::Unavailable { .. } | LocateError::NoVersionInfo { .. } => {
                FailureKind::MetadataUnavailable
            }
            LocateError::Malformed { .. } => FailureKind::MetadataMalformed,
        }
    }

    pub(crate) fn unavailable(op: &'static str, path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        LocateError::Unavailable {
            op,
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        LocateError::Malformed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
