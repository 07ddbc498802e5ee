// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Application configuration, read from a TOML file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use bay_alloc_engine::config::EngineConfig;
use bay_alloc_model::generator::{ScenarioGenConfig, ScenarioGenConfigError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid scenario settings: {0}")]
    Scenario(#[from] ScenarioGenConfigError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Used when `RUST_LOG` is not set.
    pub log_filter: String,
    pub report_path: PathBuf,
    pub engine: EngineConfig,
    pub scenario: ScenarioGenConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            report_path: PathBuf::from("bay-alloc-report.json"),
            engine: EngineConfig::default(),
            scenario: ScenarioGenConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.scenario.validate()?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(AppConfig::load_or_default(None).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
log_filter = "debug"

[engine]
project_id = "north-dock"

[engine.persistence]
queue_capacity = 0

[scenario]
bays = 2
seed = 9
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.report_path, PathBuf::from("bay-alloc-report.json"));
        assert_eq!(config.engine.project_id.as_str(), "north-dock");
        assert_eq!(config.engine.persistence.queue_capacity, 0);
        assert_eq!(config.engine.persistence.worker_name, "bay-alloc-persist");
        assert_eq!(config.scenario.bays(), 2);
        assert_eq!(config.scenario.seed(), 9);
        assert_eq!(config.scenario.groups_per_bay(), 30);
    }

    #[test]
    fn test_bad_files_are_reported() {
        let mut broken = NamedTempFile::new().unwrap();
        writeln!(broken, "log_filter = [").unwrap();
        assert!(matches!(
            AppConfig::load(broken.path()),
            Err(ConfigError::Parse { .. })
        ));

        let mut invalid = NamedTempFile::new().unwrap();
        writeln!(invalid, "[scenario]\nbays = 0").unwrap();
        assert!(matches!(
            AppConfig::load(invalid.path()),
            Err(ConfigError::Scenario(ScenarioGenConfigError::NoBays))
        ));
    }
}
