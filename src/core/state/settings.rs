use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{UpdaterError, UpdaterResult};

const SETTINGS_FILE: &str = "appsettings.json";
const DEVELOPMENT_SETTINGS_FILE: &str = "appsettings.Development.json";
const APP_DIR_NAME: &str = "minecraft-updater";
const DEFAULT_RELEASES_URL: &str = "https://github.com/alpaka-gaming/minecraft-updater/releases";
pub const DEFAULT_LOG_LEVEL: &str = "info";

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%([^%]+)%").expect("env var pattern is valid"));

/// `AppSettings` section of `appsettings.json`. Everything is optional here;
/// [`Settings::resolve`] decides what is required once CLI values are known.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppSettingsSection {
    pub server: Option<String>,
    pub profile: Option<String>,
    pub game_path: Option<PathBuf>,
    pub releases_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoggingSection {
    pub level: Option<String>,
}

/// On-disk shape of the settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SettingsFile {
    #[serde(default)]
    pub app_settings: AppSettingsSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Values given on the command line; they win over the file.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub server: Option<String>,
    pub profile: Option<String>,
    pub game_path: Option<PathBuf>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: String,
    pub profile: String,
    pub game_path: PathBuf,
    pub releases_url: String,
}

impl SettingsFile {
    /// Load settings from `explicit`, or from `appsettings.json` in the
    /// working directory or next to the executable. A missing file yields
    /// defaults; a malformed one is an error.
    ///
    /// Debug builds also overlay `appsettings.Development.json` from the
    /// same directory.
    pub fn load(explicit: Option<&Path>) -> UpdaterResult<Self> {
        let Some(path) = explicit.map(Path::to_path_buf).or_else(find_settings_file) else {
            debug!("No {} found, using defaults", SETTINGS_FILE);
            return Ok(Self::default());
        };

        let mut value = read_json(&path)?;

        if cfg!(debug_assertions) {
            let development = path.with_file_name(DEVELOPMENT_SETTINGS_FILE);
            if development.exists() {
                debug!("Overlaying {:?}", development);
                merge_json(&mut value, &read_json(&development)?);
            }
        }

        serde_json::from_value(value)
            .map_err(|e| UpdaterError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Configured tracing level for this crate, `info` when unset.
    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

impl Settings {
    pub fn resolve(file: SettingsFile, overrides: SettingsOverrides) -> UpdaterResult<Self> {
        let app = file.app_settings;

        let server = overrides
            .server
            .or(app.server)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| UpdaterError::Config("no server configured".into()))?;
        let profile = overrides
            .profile
            .or(app.profile)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| UpdaterError::Config("no profile configured".into()))?;
        let game_path = overrides
            .game_path
            .or(app.game_path)
            .map(|p| expand_path(&p))
            .or_else(default_game_path)
            .ok_or_else(|| UpdaterError::Config("cannot determine the game directory".into()))?;

        Ok(Self {
            server,
            profile,
            game_path,
            releases_url: app
                .releases_url
                .unwrap_or_else(|| DEFAULT_RELEASES_URL.to_string()),
        })
    }
}

fn find_settings_file() -> Option<PathBuf> {
    let mut candidates = vec![PathBuf::from(SETTINGS_FILE)];
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join(SETTINGS_FILE));
    }
    candidates.into_iter().find(|p| p.is_file())
}

fn read_json(path: &Path) -> UpdaterResult<serde_json::Value> {
    let raw = std::fs::read_to_string(path).map_err(|e| UpdaterError::io(path, e))?;
    serde_json::from_str(&raw)
        .map_err(|e| UpdaterError::Config(format!("{}: {}", path.display(), e)))
}

/// Recursively overlay `overlay` onto `base`. Objects merge key by key,
/// anything else is replaced.
pub fn merge_json(base: &mut serde_json::Value, overlay: &serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overlay)) => {
            for (k, v) in overlay {
                merge_json(base.entry(k.clone()).or_insert(serde_json::Value::Null), v);
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// `%APPDATA%\.minecraft` on Windows, `~/.minecraft` elsewhere.
pub fn default_game_path() -> Option<PathBuf> {
    let base = if cfg!(target_os = "windows") {
        dirs::config_dir()
    } else {
        dirs::home_dir()
    };
    base.map(|b| b.join(".minecraft"))
}

/// Directory for rolling log files.
pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
        .join("logs")
}

/// Expand `%VAR%` references and a leading `~` the way launchers write
/// game directories. Unknown variables are left as written.
pub fn expand_path(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    let expanded = ENV_VAR.replace_all(&text, |caps: &regex::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    });

    if let Some(rest) = expanded.strip_prefix('~') {
        if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest.trim_start_matches(['/', '\\']));
            }
        }
    }

    PathBuf::from(expanded.into_owned())
}
