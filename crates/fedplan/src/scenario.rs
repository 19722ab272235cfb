//! Scenario files
//!
//! A scenario is a [`SimulationConfig`] stored as YAML. Named scenarios live in the data
//! directory:
//!
//! ```text
//! ~/.fedplan/
//!   fedplan.log
//!   scenarios/
//!     baseline.yaml
//!     retire-at-60.yaml
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use fedplan_core::config::{SimulationBuilder, SimulationConfig};
use fedplan_core::model::ReturnProfile;

/// Error types for scenario operations
#[derive(Debug)]
pub enum ScenarioError {
    Io(String),
    Parse(String),
    Serialize(String),
    Invalid(String),
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::Io(msg) => write!(f, "IO error: {}", msg),
            ScenarioError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ScenarioError::Serialize(msg) => write!(f, "Serialization error: {}", msg),
            ScenarioError::Invalid(msg) => write!(f, "Invalid scenario: {}", msg),
        }
    }
}

impl std::error::Error for ScenarioError {}

/// Parse and validate a scenario.
pub fn from_yaml(yaml: &str) -> Result<SimulationConfig, ScenarioError> {
    let config: SimulationConfig = serde_saphyr::from_str(yaml)
        .map_err(|e| ScenarioError::Parse(format!("Failed to parse YAML: {}", e)))?;
    config
        .validate()
        .map_err(|e| ScenarioError::Invalid(e.to_string()))?;
    Ok(config)
}

pub fn to_yaml(config: &SimulationConfig) -> Result<String, ScenarioError> {
    serde_saphyr::to_string(config)
        .map_err(|e| ScenarioError::Serialize(format!("Failed to serialize scenario: {}", e)))
}

pub fn load(path: &Path) -> Result<SimulationConfig, ScenarioError> {
    let content = fs::read_to_string(path).map_err(|e| {
        ScenarioError::Io(format!("Failed to read {}: {}", path.display(), e))
    })?;
    from_yaml(&content)
}

pub fn save(path: &Path, config: &SimulationConfig) -> Result<(), ScenarioError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| ScenarioError::Io(format!("Failed to create directory: {}", e)))?;
    }
    let yaml = to_yaml(config)?;
    fs::write(path, yaml).map_err(|e| ScenarioError::Io(format!("Failed to write scenario: {}", e)))
}

/// Named scenarios under `{data_dir}/scenarios`
pub struct ScenarioStore {
    root: PathBuf,
}

impl ScenarioStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            root: data_dir.join("scenarios"),
        }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.yaml", sanitize_filename(name)))
    }

    /// An existing file path is used as is; anything else is a scenario name.
    pub fn resolve(&self, name_or_path: &str) -> PathBuf {
        let as_path = PathBuf::from(name_or_path);
        if as_path.is_file() {
            as_path
        } else {
            self.path_for(name_or_path)
        }
    }

    pub fn load(&self, name_or_path: &str) -> Result<SimulationConfig, ScenarioError> {
        load(&self.resolve(name_or_path))
    }

    pub fn save(&self, name: &str, config: &SimulationConfig) -> Result<PathBuf, ScenarioError> {
        let path = self.path_for(name);
        save(&path, config)?;
        Ok(path)
    }

    /// Names of all stored scenarios, sorted
    pub fn list(&self) -> Result<Vec<String>, ScenarioError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.root)
            .map_err(|e| ScenarioError::Io(format!("Failed to read scenarios: {}", e)))?;
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "yaml"))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }
}

/// A mid-career employee planning to retire at the MRA with 27 years of service.
pub fn example() -> Result<SimulationConfig, ScenarioError> {
    SimulationBuilder::new()
        .born(1970, 3, 15)
        .hired(2000, 1, 10)
        .separating(2027, 3, 31)
        .high3(110_000.0)
        .start_year(2025)
        .years(40)
        .salary(112_000.0)
        .salary_growth(0.02)
        .traditional(250_000.0, 0.05)
        .roth(40_000.0, 0.05)
        .growth_rate(0.06)
        .return_profile(ReturnProfile::Normal {
            mean: 0.06,
            std_dev: 0.12,
        })
        .inflation(0.025)
        .annual_expenses(70_000.0)
        .social_security_at_62(22_000.0)
        .build()
        .map_err(|e| ScenarioError::Invalid(e.to_string()))
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
