//! Configuration loading and management.

use std::path::{Path, PathBuf};

use cellseg_core::SegmentConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tolerances and run thresholds passed to every request.
    pub segmentation: SegmentConfig,
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources win: defaults, the user config file, `config_path`,
    /// then `CELLSEG_*` variables with `__` separating nested keys.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("CELLSEG_").split("__"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for cellseg.
///
/// On Linux: `~/.config/cellseg`
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("cellseg"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn test_defaults_without_files() {
        let config = Config::load_from(None).unwrap();
        assert_eq!(config.segmentation.min_run_rows, 2);
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[segmentation]\nmin_run_rows = 5\n\n[segmentation.tolerance]\nrelative = 0.05"
        )
        .unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.segmentation.min_run_rows, 5);
        assert!((config.segmentation.tolerance.relative - 0.05).abs() < f64::EPSILON);
        assert!((config.segmentation.tolerance.absolute - 0.001).abs() < f64::EPSILON);
        assert!((config.segmentation.max_pulse_duration_s - 360.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_dirs_config_path_ends_with_cellseg() {
        if let Some(path) = dirs_config_path() {
            assert_eq!(path.file_name().unwrap(), "cellseg");
        }
    }
}
