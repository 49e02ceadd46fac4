//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Project-level config file names, checked in order
const PROJECT_CONFIG_FILES: [&str; 2] = ["concord.toml", ".concord.toml"];

/// Prefix of environment overrides (`CONCORD_CONSENSUS__THRESHOLD=0.7`)
pub const ENV_PREFIX: &str = "CONCORD_";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Files that take part in one load, lowest priority first
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub global: Option<PathBuf>,
    pub project: Option<PathBuf>,
    pub explicit: Option<PathBuf>,
}

impl ConfigSources {
    /// Discover global and project files from the environment and working directory
    pub fn discover(explicit: Option<&Path>) -> Self {
        Self {
            global: ConfigLoader::global_config_path().filter(|p| p.exists()),
            project: ConfigLoader::project_config_path(),
            explicit: explicit.map(Path::to_path_buf),
        }
    }
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `CONCORD_*` environment variables (`__` separates nesting)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./concord.toml` or `./.concord.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/concord/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        Self::load_sources(&ConfigSources::discover(config_path))
    }

    /// Load configuration from the given files plus the environment
    pub fn load_sources(sources: &ConfigSources) -> Result<FileConfig, ConfigError> {
        if let Some(path) = &sources.explicit
            && !path.exists()
        {
            return Err(ConfigError::NotFound(path.clone()));
        }

        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        for path in [&sources.global, &sources.project, &sources.explicit]
            .into_iter()
            .flatten()
        {
            debug!("Merging config file {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract().map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/concord/config.toml if set,
    /// otherwise falls back to ~/.config/concord/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("concord").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations being used (for --show-config)
    pub fn describe_sources(sources: &ConfigSources) -> Vec<String> {
        let mut lines = vec!["Configuration sources (in priority order):".to_string()];

        lines.push(format!("  [ENV  ] {}*", ENV_PREFIX));

        if let Some(path) = &sources.explicit {
            lines.push(format!("  [FOUND] Explicit: {}", path.display()));
        }

        match &sources.project {
            Some(path) => lines.push(format!("  [FOUND] Project: {}", path.display())),
            None => lines.push(format!(
                "  [     ] Project: ./{} or ./{}",
                PROJECT_CONFIG_FILES[0], PROJECT_CONFIG_FILES[1]
            )),
        }

        match (&sources.global, Self::global_config_path()) {
            (Some(path), _) => lines.push(format!("  [FOUND] Global:  {}", path.display())),
            (None, Some(path)) => lines.push(format!("  [     ] Global:  {}", path.display())),
            (None, None) => {}
        }

        lines.push("  [     ] Default: built-in defaults".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.providers.is_empty());
        assert_eq!(config.consensus.wait, "all");
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("concord"));
    }

    #[test]
    fn test_later_sources_override_earlier_ones() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("concord.toml");
        let explicit = dir.path().join("explicit.toml");

        fs::write(
            &global,
            "[consensus]\ntimeout_seconds = 10\nthreshold = 0.9\nmin_providers = 3\n",
        )
        .unwrap();
        fs::write(&project, "[consensus]\ntimeout_seconds = 20\nthreshold = 0.7\n").unwrap();
        fs::write(&explicit, "[consensus]\ntimeout_seconds = 30\n").unwrap();

        let config = ConfigLoader::load_sources(&ConfigSources {
            global: Some(global),
            project: Some(project),
            explicit: Some(explicit),
        })
        .unwrap();

        assert_eq!(config.consensus.timeout_seconds, 30);
        assert_eq!(config.consensus.threshold, 0.7);
        assert_eq!(config.consensus.min_providers, 3);
        assert_eq!(config.consensus.synthesis, "cross_verification");
    }

    #[test]
    fn test_providers_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("concord.toml");
        fs::write(
            &path,
            r#"
[[providers]]
id = "echo"
command = "cat"

[[providers]]
id = "fixed"
kind = "static"
response = "Paris is the capital of France."
"#,
        )
        .unwrap();

        let config = ConfigLoader::load_sources(&ConfigSources {
            explicit: Some(path),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers[1].id, "fixed");
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigLoader::load_sources(&ConfigSources {
            explicit: Some(dir.path().join("missing.toml")),
            ..Default::default()
        });
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("concord.toml");
        fs::write(&path, "[consensus]\ntimeout_seconds = \"soon\"\n").unwrap();

        let result = ConfigLoader::load_sources(&ConfigSources {
            project: Some(path),
            ..Default::default()
        });
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_describe_sources_lists_explicit_file() {
        let sources = ConfigSources {
            explicit: Some(PathBuf::from("custom.toml")),
            ..Default::default()
        };
        let lines = ConfigLoader::describe_sources(&sources);
        assert!(lines.iter().any(|l| l.contains("Explicit: custom.toml")));
        assert!(lines.iter().any(|l| l.contains("concord.toml")));
    }
}
