use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Benchmark run configuration.
///
/// Constructed once at startup and passed into the provisioner, adapters and
/// runner; read-only for the lifetime of the run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BenchConfig {
    /// TPC-H scale factor. Larger values produce proportionally larger tables.
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
}

fn default_scale_factor() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PathsConfig {
    /// Root directory for generated datasets. Defaults to ./data
    pub data_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProfileConfig {
    /// Collect an execution profile for every query and log it.
    #[serde(default)]
    pub enabled: bool,
    /// Retrieve the profile inside the measured window instead of after it.
    #[serde(default)]
    pub include_in_timing: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            scale_factor: default_scale_factor(),
            paths: PathsConfig::default(),
            profile: ProfileConfig::default(),
        }
    }
}

impl BenchConfig {
    /// Load configuration from an optional file and environment variables.
    ///
    /// Environment variables use the SQLBENCH_ prefix with a double
    /// underscore between nesting levels, so field names containing
    /// underscores stay intact: SQLBENCH_SCALE_FACTOR=0.1,
    /// SQLBENCH_PROFILE__INCLUDE_IN_TIMING=true
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("SQLBENCH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.scale_factor > 0.0) {
            anyhow::bail!(
                "scale_factor must be positive, got {}",
                self.scale_factor
            );
        }
        Ok(())
    }

    /// Root directory under which scale-factor-specific datasets live.
    pub fn data_dir(&self) -> PathBuf {
        self.paths
            .data_dir
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = BenchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scale_factor, 1.0);
        assert!(!config.profile.enabled);
    }

    #[test]
    fn rejects_nonpositive_scale_factor() {
        let mut config = BenchConfig::default();
        config.scale_factor = 0.0;
        assert!(config.validate().is_err());

        config.scale_factor = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn environment_overrides_are_applied() {
        std::env::set_var("SQLBENCH_SCALE_FACTOR", "5.0");
        std::env::set_var("SQLBENCH_PROFILE__INCLUDE_IN_TIMING", "true");

        let config = BenchConfig::load(None).unwrap();
        assert_eq!(config.scale_factor, 5.0);
        assert!(config.profile.include_in_timing);

        std::env::remove_var("SQLBENCH_SCALE_FACTOR");
        std::env::remove_var("SQLBENCH_PROFILE__INCLUDE_IN_TIMING");
    }

    #[test]
    fn data_dir_defaults_when_unset() {
        let config = BenchConfig::default();
        assert_eq!(config.data_dir(), PathBuf::from("./data"));

        let mut config = BenchConfig::default();
        config.paths.data_dir = Some("/tmp/bench".to_string());
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/bench"));
    }
}
