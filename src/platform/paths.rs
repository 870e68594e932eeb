// EventDash - platform/paths.rs
//
// Platform-specific directory resolution. Uses the `directories` crate for
// XDG (Linux), AppData (Windows), and Library (macOS) compliance.

use crate::util::constants;
use directories::{ProjectDirs, UserDirs};
use std::path::PathBuf;

/// Resolved platform paths for EventDash configuration and output.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. %APPDATA%\EventDash\ or
    /// ~/.config/eventdash/).
    pub config_dir: PathBuf,

    /// The user's desktop folder, the default export destination.
    /// `None` when the platform has no resolvable desktop directory.
    pub desktop_dir: Option<PathBuf>,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory for configuration if platform
    /// dirs cannot be determined; the desktop stays `None` and export then
    /// requires an explicit output directory.
    pub fn resolve() -> Self {
        let config_dir = match ProjectDirs::from("", "", constants::APP_ID) {
            Some(proj_dirs) => proj_dirs.config_dir().to_path_buf(),
            None => {
                tracing::warn!("Could not determine platform directories, using current directory");
                PathBuf::from(".")
            }
        };

        let desktop_dir = UserDirs::new().and_then(|dirs| dirs.desktop_dir().map(|d| d.to_path_buf()));

        tracing::debug!(
            config = %config_dir.display(),
            desktop = ?desktop_dir.as_ref().map(|d| d.display().to_string()),
            "Platform paths resolved"
        );

        Self {
            config_dir,
            desktop_dir,
        }
    }
}
