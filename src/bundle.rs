use std::path::{Path, PathBuf};

use plist::Value;

use crate::error::LocateError;
use crate::paths;
use crate::version::{ParseVersionError, Version};
use crate::version_extractor::PlatformVersionReader;

pub const VERSION_KEY: &str = "BlizzardFileVersion";

/// Reads `BlizzardFileVersion` from an application bundle's `Info.plist`.
#[derive(Debug, Clone)]
pub struct BundleVersionReader {
    bundle_name: &'static str,
    key: &'static str,
}

impl BundleVersionReader {
    pub fn new(bundle_name: &'static str, key: &'static str) -> Self {
        BundleVersionReader { bundle_name, key }
    }

    pub fn info_plist(bundle: &Path) -> PathBuf {
        bundle.join("Contents").join("Info.plist")
    }
}

impl Default for BundleVersionReader {
    fn default() -> Self {
        BundleVersionReader::new(paths::GAME_BUNDLE, VERSION_KEY)
    }
}

impl PlatformVersionReader for BundleVersionReader {
    fn target_path(&self, install_dir: &Path) -> PathBuf {
        install_dir.join(self.bundle_name)
    }

    fn read_version(&self, target: &Path) -> Result<Version, LocateError> {
        let info = Value::from_file(Self::info_plist(target))
            .map_err(|e| LocateError::unavailable("read Info.plist", target, e))?;

        let value = info
            .as_dictionary()
            .and_then(|dict| dict.get(self.key))
            .and_then(Value::as_string)
            .ok_or_else(|| LocateError::malformed(target, format!("cannot find {}", self.key)))?;

        value.parse().map_err(|e: ParseVersionError| {
            LocateError::malformed(target, format!("unexpected version value or format {value:?}: {e}"))
        })
    }
}
