//! Finds the installed Hearthstone client and reads its version.
//!
//! On Windows the version comes from the `VS_FIXEDFILEINFO` of
//! `Hearthstone.exe`, on macOS from the `BlizzardFileVersion` entry of
//! `Hearthstone.app/Contents/Info.plist`. Both are packed into a [`Version`].

pub mod bundle;
pub mod config;
pub mod error;
pub mod paths;
pub mod pe;
pub mod prompt;
pub mod resolver;
pub mod version;
pub mod version_extractor;

pub use config::{ConfigStore, MemoryConfig, TomlConfig};
pub use error::{ConfigError, FailureKind, LocateError};
pub use prompt::{ConsolePrompt, DirectoryPrompt};
pub use resolver::InstallDirectoryResolver;
pub use version::{ParseVersionError, Version};
pub use version_extractor::{NativeReader, PlatformVersionReader, VersionLocator};
