use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub model: ModelConfig,
    pub scoring: ScoringConfig,
    pub api: ApiConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(".")
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Config::builder()
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/default")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/local")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(Environment::default().separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Locations of the trained vectorizer and classifier artifacts.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub vectorizer_path: PathBuf,
    pub classifier_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    pub policy_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub bind: String,
    #[serde(default = "ApiConfig::default_history_limit")]
    pub history_limit: i64,
}

impl ApiConfig {
    const fn default_history_limit() -> i64 {
        50
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "ObservabilityConfig::default_metrics_path")]
    pub metrics_path: String,
}

impl ObservabilityConfig {
    fn default_metrics_path() -> String {
        "/metrics".to_string()
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_path: Self::default_metrics_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_shipped_defaults() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
        let config = AppConfig::load_from_path(&root).expect("default config loads");
        assert_eq!(
            config.model.vectorizer_path,
            PathBuf::from("model/vectorizer.json")
        );
        assert_eq!(config.scoring.policy_path, PathBuf::from("config/policy.toml"));
        assert_eq!(config.api.history_limit, 50);
        assert_eq!(config.observability.metrics_path, "/metrics");
    }
}
