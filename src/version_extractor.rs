use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::config::ConfigStore;
use crate::error::LocateError;
use crate::paths;
use crate::version::Version;

/// Reads the game version from one platform's metadata format.
pub trait PlatformVersionReader {
    /// The file or bundle to inspect inside `install_dir`.
    fn target_path(&self, install_dir: &Path) -> PathBuf;

    /// Reads the version of an existing `target`.
    fn read_version(&self, target: &Path) -> Result<Version, LocateError>;
}

impl<R: PlatformVersionReader + ?Sized> PlatformVersionReader for &R {
    fn target_path(&self, install_dir: &Path) -> PathBuf {
        (**self).target_path(install_dir)
    }

    fn read_version(&self, target: &Path) -> Result<Version, LocateError> {
        (**self).read_version(target)
    }
}

#[cfg(target_os = "macos")]
pub type NativeReader = crate::bundle::BundleVersionReader;

#[cfg(not(target_os = "macos"))]
pub type NativeReader = crate::pe::PeVersionReader;

/// Finds the installed game and reads its version.
#[derive(Debug, Clone)]
pub struct VersionLocator<R> {
    reader: R,
    default_dir: String,
}

impl VersionLocator<NativeReader> {
    pub fn native() -> Self {
        VersionLocator::new(NativeReader::default(), paths::default_install_dir())
    }
}

impl<R: PlatformVersionReader> VersionLocator<R> {
    pub fn new(reader: R, default_dir: impl Into<String>) -> Self {
        VersionLocator {
            reader,
            default_dir: default_dir.into(),
        }
    }

    pub fn install_dir<C: ConfigStore + ?Sized>(&self, config: &C) -> PathBuf {
        PathBuf::from(config.read_string(paths::INSTALL_DIR_KEY, &self.default_dir))
    }

    /// Like [`locate`](Self::locate), but hands back the failure instead of logging it.
    pub fn probe<C: ConfigStore + ?Sized>(&self, config: &C) -> Result<(PathBuf, Version), LocateError> {
        let target = self.reader.target_path(&self.install_dir(config));
        if !target.exists() {
            return Err(LocateError::NotFound { path: target });
        }
        let version = self.reader.read_version(&target)?;
        Ok((target, version))
    }

    /// Returns the installed version, or `Version::UNKNOWN` after logging
    /// why it could not be determined.
    pub fn locate<C: ConfigStore + ?Sized>(&self, config: &C) -> Version {
        match self.probe(config) {
            Ok((target, version)) => {
                debug!("{} v{}", target.display(), version);
                version
            }
            Err(e) => {
                error!("{e}");
                Version::UNKNOWN
            }
        }
    }
}
