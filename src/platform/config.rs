// EventDash - platform/config.rs
//
// config.toml loading with startup validation. Configuration problems are
// never fatal: every invalid value produces an actionable warning and
// falls back to the named-constant default, so the dashboard always comes
// up with the five standard channels at worst.

use crate::core::model::ChannelSpec;
use crate::util::constants;
use crate::util::error::ConfigError;
use std::path::{Path, PathBuf};

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility; a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[[channels]]` entries.
    pub channels: Vec<RawChannel>,
    /// `[export]` section.
    pub export: ExportSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// One `[[channels]]` entry.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawChannel {
    /// Full OS channel name. Required; entries without one are skipped.
    pub name: Option<String>,
    /// Short display label. Defaults to the name.
    pub label: Option<String>,
    /// Per-channel record cap.
    pub max_records: Option<usize>,
}

/// `[export]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// Destination directory for exports. Defaults to the desktop folder.
    pub directory: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
#[derive(Debug, Clone)]
pub struct DashConfig {
    /// Channels to aggregate, in dashboard/export order.
    pub channels: Vec<ChannelSpec>,

    /// Export destination override.
    pub export_dir: Option<PathBuf>,

    /// Logging level string (consumed before tracing is initialised).
    pub log_level: Option<String>,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            channels: ChannelSpec::defaults(),
            export_dir: None,
            log_level: None,
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns a `DashConfig` with validated values and a list of non-fatal
/// warnings. A missing file means first-run defaults with no warnings; an
/// unreadable or unparseable file means defaults plus a warning.
pub fn load_config(config_dir: &Path) -> (DashConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (DashConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            let err = ConfigError::Io {
                path: config_path.clone(),
                source: e,
            };
            warnings.push(format!("{err}. Using defaults."));
            return (DashConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let err = ConfigError::TomlParse {
                path: config_path.clone(),
                source: e,
            };
            warnings.push(format!("{err}. Using defaults."));
            return (DashConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let mut config = DashConfig::default();

    // -- Channels --
    let mut channels: Vec<ChannelSpec> = Vec::new();
    for (idx, entry) in raw.channels.into_iter().enumerate() {
        let Some(name) = entry.name.filter(|n| !n.trim().is_empty()) else {
            warnings.push(format!(
                "[[channels]] entry {} has no name and was skipped.",
                idx + 1
            ));
            continue;
        };

        let max_records = match entry.max_records {
            None => constants::DEFAULT_MAX_RECORDS,
            Some(n) if (constants::MIN_MAX_RECORDS..=constants::ABSOLUTE_MAX_RECORDS)
                .contains(&n) =>
            {
                n
            }
            Some(n) => {
                let err = ConfigError::ValueOutOfRange {
                    field: format!("channels.{name}.max_records"),
                    value: n.to_string(),
                    expected: format!(
                        "{}-{}",
                        constants::MIN_MAX_RECORDS,
                        constants::ABSOLUTE_MAX_RECORDS
                    ),
                };
                warnings.push(format!(
                    "{err}. Using default ({}).",
                    constants::DEFAULT_MAX_RECORDS
                ));
                constants::DEFAULT_MAX_RECORDS
            }
        };

        let label = entry
            .label
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| name.clone());
        channels.push(ChannelSpec::new(name, label, max_records));
    }
    if !channels.is_empty() {
        config.channels = channels;
    }

    // -- Export: directory --
    if let Some(ref dir) = raw.export.directory {
        if !dir.is_empty() {
            config.export_dir = Some(PathBuf::from(dir));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default ({}).",
                constants::DEFAULT_LOG_LEVEL
            ));
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}
