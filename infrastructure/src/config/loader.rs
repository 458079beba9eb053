//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;

const PROJECT_FILES: [&str; 2] = ["taskpilot.toml", ".taskpilot.toml"];
const ENV_PREFIX: &str = "TASKPILOT_";

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `TASKPILOT_` environment variables (`TASKPILOT_STEP__MAX_STEPS=5`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./taskpilot.toml` or `./.taskpilot.toml`
    /// 4. Global config: `$XDG_CONFIG_HOME/taskpilot/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
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
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("taskpilot").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations being used, highest priority first.
    pub fn config_sources(config_path: Option<&Path>) -> Vec<String> {
        let mut sources = Vec::new();

        sources.push(format!("  [ENV  ] {}* variables", ENV_PREFIX));

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            sources.push(format!("  [{:<5}] Explicit: {}", mark, path.display()));
        }

        match Self::project_config_path() {
            Some(path) => sources.push(format!("  [FOUND] Project: {}", path.display())),
            None => sources.push(format!(
                "  [     ] Project: ./{} or ./{}",
                PROJECT_FILES[0], PROJECT_FILES[1]
            )),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            sources.push(format!("  [{}] Global:  {}", mark, path.display()));
        }

        sources.push("  [     ] Default: built-in defaults".to_string());
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.step.max_think_retries, 3);
        assert_eq!(config.user_input.timeout_secs, 300);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("taskpilot"));
    }

    #[test]
    fn test_explicit_file_and_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
[step]
max_steps = 7
max_think_retries = 4
"#,
            )?;
            jail.set_env("TASKPILOT_STEP__MAX_STEPS", "9");

            let config = ConfigLoader::load(Some(Path::new("custom.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.step.max_think_retries, 4);
            assert_eq!(config.step.max_steps, 9);
            Ok(())
        });
    }

    #[test]
    fn test_project_file_is_discovered() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "taskpilot.toml",
                r#"
[agent]
name = "project-agent"
"#,
            )?;

            let config = ConfigLoader::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.agent.name, "project-agent");
            assert!(ConfigLoader::project_config_path().is_some());
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = ConfigLoader::load(Some(Path::new("/nonexistent/taskpilot.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
