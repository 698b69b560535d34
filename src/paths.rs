use std::path::PathBuf;

/// Version of Hearth Log itself, e.g. `v0.2.1`.
pub const APP_VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

pub const APP_NAME: &str = "Hearth Log";

/// Config key holding the game's install directory.
pub const INSTALL_DIR_KEY: &str = "HearthstoneDir";

pub const GAME_EXECUTABLE: &str = "Hearthstone.exe";
pub const GAME_BUNDLE: &str = "Hearthstone.app";

#[cfg(target_os = "macos")]
pub const DEFAULT_INSTALL_DIR: &str = "/Applications/Hearthstone";

#[cfg(not(target_os = "macos"))]
pub const DEFAULT_INSTALL_DIR: &str = r"C:\Program Files (x86)\Hearthstone";

pub fn default_install_dir() -> String {
    DEFAULT_INSTALL_DIR.to_string()
}

pub fn prompt_message() -> String {
    format!("{APP_NAME}: Please locate your Hearthstone directory (Usually {DEFAULT_INSTALL_DIR})")
}

/// Per-user data directory, e.g. `%APPDATA%\Hearth Log` or
/// `~/Library/Application Support/Hearth Log`.
pub fn user_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_NAME))
}

pub fn config_file() -> Option<PathBuf> {
    user_data_dir().map(|dir| dir.join("config.toml"))
}
