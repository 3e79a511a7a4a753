use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::preference::Preferences;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub library: Option<LibraryConfig>,
    pub scrapers: Option<ScrapersConfig>,
    pub network: Option<NetworkConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    pub folder: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapersConfig {
    pub pdf_builtin: Option<bool>,
    pub disabled_importers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

/// Platform config directory path: `<config_dir>/bibdraft/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bibdraft").join("config.toml"))
}

/// Load config by cascading CWD `.bibdraft.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".bibdraft.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_library = base.library.unwrap_or_default();
    let overlay_library = overlay.library.unwrap_or_default();
    let base_scrapers = base.scrapers.unwrap_or_default();
    let overlay_scrapers = overlay.scrapers.unwrap_or_default();
    let base_network = base.network.unwrap_or_default();
    let overlay_network = overlay.network.unwrap_or_default();

    ConfigFile {
        library: Some(LibraryConfig {
            folder: overlay_library.folder.or(base_library.folder),
        }),
        scrapers: Some(ScrapersConfig {
            pdf_builtin: overlay_scrapers.pdf_builtin.or(base_scrapers.pdf_builtin),
            disabled_importers: overlay_scrapers
                .disabled_importers
                .or(base_scrapers.disabled_importers),
        }),
        network: Some(NetworkConfig {
            timeout_secs: overlay_network.timeout_secs.or(base_network.timeout_secs),
            user_agent: overlay_network.user_agent.or(base_network.user_agent),
        }),
    }
}

impl ConfigFile {
    /// Apply this file on top of the built-in defaults.
    pub fn to_preferences(&self) -> Preferences {
        let defaults = Preferences::default();
        let library = self.library.clone().unwrap_or_default();
        let scrapers = self.scrapers.clone().unwrap_or_default();
        let network = self.network.clone().unwrap_or_default();

        Preferences {
            app_lib_folder: library
                .folder
                .map(PathBuf::from)
                .unwrap_or(defaults.app_lib_folder),
            pdf_builtin_scraper: scrapers
                .pdf_builtin
                .unwrap_or(defaults.pdf_builtin_scraper),
            disabled_importers: scrapers
                .disabled_importers
                .unwrap_or(defaults.disabled_importers),
            request_timeout_secs: network
                .timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
            user_agent: network.user_agent.unwrap_or(defaults.user_agent),
        }
    }

    /// The effective config for `prefs`, every field filled in.
    pub fn from_preferences(prefs: &Preferences) -> Self {
        ConfigFile {
            library: Some(LibraryConfig {
                folder: Some(prefs.app_lib_folder.display().to_string()),
            }),
            scrapers: Some(ScrapersConfig {
                pdf_builtin: Some(prefs.pdf_builtin_scraper),
                disabled_importers: Some(prefs.disabled_importers.clone()),
            }),
            network: Some(NetworkConfig {
                timeout_secs: Some(prefs.request_timeout_secs),
                user_agent: Some(prefs.user_agent.clone()),
            }),
        }
    }
}
