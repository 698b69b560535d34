use tracing::{error, info};

use crate::config::ConfigStore;
use crate::paths;
use crate::prompt::DirectoryPrompt;
use crate::version::Version;
use crate::version_extractor::{PlatformVersionReader, VersionLocator};

/// Keeps asking for the install directory until the game is found or the
/// user gives up.
pub struct InstallDirectoryResolver<R, C, P> {
    locator: VersionLocator<R>,
    config: C,
    prompt: P,
    message: String,
}

impl<R, C, P> InstallDirectoryResolver<R, C, P>
where
    R: PlatformVersionReader,
    C: ConfigStore,
    P: DirectoryPrompt,
{
    pub fn new(locator: VersionLocator<R>, config: C, prompt: P) -> Self {
        InstallDirectoryResolver {
            locator,
            config,
            prompt,
            message: paths::prompt_message(),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn into_config(self) -> C {
        self.config
    }

    pub fn resolve(&mut self) -> bool {
        self.resolve_version().is_some()
    }

    /// Returns `None` only when the user cancels the prompt.
    pub fn resolve_version(&mut self) -> Option<Version> {
        loop {
            let version = self.locator.locate(&self.config);
            if !version.is_unknown() {
                return Some(version);
            }

            let Some(dir) = self
                .prompt
                .select_directory(&self.message)
                .filter(|dir| !dir.as_os_str().is_empty())
            else {
                info!("install directory prompt cancelled");
                return None;
            };

            info!("using install directory {}", dir.display());
            if let Err(e) = self
                .config
                .write_string(paths::INSTALL_DIR_KEY, &dir.to_string_lossy())
            {
                error!("failed to save {}: {e}", paths::INSTALL_DIR_KEY);
            }
        }
    }
}
