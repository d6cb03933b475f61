use serde::Deserialize;
use std::path::PathBuf;

// =============================================================================
// Registry constants
// =============================================================================

/// Default base URL for the npm registry
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Timeout for a single registry request in milliseconds (5 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 5_000;

/// Client identifier sent with every registry request
pub const USER_AGENT: &str = "version-lens";

/// Accept header requesting the abbreviated metadata document
pub const ABBREVIATED_METADATA_ACCEPT: &str =
    "application/vnd.npm.install-v1+json; q=1.0, application/json; q=0.8, */*";

// =============================================================================
// Interaction and logging constants
// =============================================================================

/// Default window after a programmatic edit during which the picker stays closed
pub const DEFAULT_PICKER_GUARD_MS: u64 = 500;

/// Environment variable holding the log filter directive
pub const LOG_FILTER_ENV: &str = "VERSION_LENS_LOG";

/// File name of the server log inside the data directory
pub const LOG_FILE_NAME: &str = "version-lens.log";

/// LSP configuration structure, read from `initializationOptions`
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LensConfig {
    pub registry_url: String,
    pub decorations: DecorationConfig,
    /// Offer prerelease versions in the picker
    pub show_prerelease: bool,
    pub picker_guard_ms: u64,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            decorations: DecorationConfig::default(),
            show_prerelease: true,
            picker_guard_ms: DEFAULT_PICKER_GUARD_MS,
        }
    }
}

/// Per-bucket decoration toggles
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecorationConfig {
    pub major: bool,
    pub minor: bool,
    pub patch: bool,
    pub invalid: bool,
    pub icon: bool,
}

impl Default for DecorationConfig {
    fn default() -> Self {
        Self {
            major: true,
            minor: true,
            patch: true,
            invalid: true,
            icon: true,
        }
    }
}

/// Returns the path to the data directory for version-lens.
/// Uses $XDG_DATA_HOME/version-lens if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/version-lens,
/// or ./version-lens if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("version-lens")
}
