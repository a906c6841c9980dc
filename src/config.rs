//! World configuration
//!
//! Loaded from RON (Rusty Object Notation) or JSON files, or built in code.

use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Settings a world is created with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Initial gravity
    pub gravity: Vec3,
    /// Constraint solver iterations per substep
    pub solver_iterations: NonZeroUsize,
    /// Substep length used by [`crate::World::step`]
    pub fixed_substep: f32,
    /// Substep cap used by [`crate::World::step`]
    pub max_substeps: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::ZERO,
            solver_iterations: NonZeroUsize::new(4).expect("4 is non-zero"),
            fixed_substep: 1.0 / 60.0,
            max_substeps: 1,
        }
    }
}

impl WorldConfig {
    /// Set gravity
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set solver iterations
    pub fn with_solver_iterations(mut self, iterations: NonZeroUsize) -> Self {
        self.solver_iterations = iterations;
        self
    }

    /// Set the default substep length and cap
    pub fn with_substeps(mut self, fixed_substep: f32, max_substeps: i32) -> Self {
        self.fixed_substep = fixed_substep;
        self.max_substeps = max_substeps;
        self
    }

    /// Check values the engine cannot run with
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gravity.is_finite() {
            return Err(ConfigError::Invalid("gravity must be finite".to_string()));
        }
        if !(self.fixed_substep > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "fixed_substep must be positive, got {}",
                self.fixed_substep
            )));
        }
        if self.max_substeps < 0 {
            return Err(ConfigError::Invalid(format!(
                "max_substeps must not be negative, got {}",
                self.max_substeps
            )));
        }
        Ok(())
    }

    /// Parse and validate a RON document
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            ron::from_str(content).map_err(|e| ConfigError::DeserializeError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| ConfigError::DeserializeError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json` file, or RON for any other extension
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_ron_str(&content)?
        };

        log::debug!("Loaded world config from {}", path.display());
        Ok(config)
    }

    /// Save as pretty-printed RON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Save as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// Errors that can occur while loading or saving a configuration
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// A field holds a value the engine cannot use
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorldConfig::default();
        assert_eq!(config.gravity, Vec3::ZERO);
        assert_eq!(config.solver_iterations.get(), 4);
        assert_eq!(config.max_substeps, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ron_partial_document() {
        let config = WorldConfig::from_ron_str("(gravity: (0.0, -9.81, 0.0), max_substeps: 10)")
            .unwrap();
        assert_eq!(config.gravity, Vec3::new(0.0, -9.81, 0.0));
        assert_eq!(config.max_substeps, 10);
        assert_eq!(config.fixed_substep, 1.0 / 60.0);
    }

    #[test]
    fn test_json_round_trip() {
        let config = WorldConfig::default()
            .with_gravity(Vec3::new(0.0, -1.62, 0.0))
            .with_solver_iterations(NonZeroUsize::new(8).unwrap())
            .with_substeps(0.01, 5);
        let json = serde_json::to_string(&config).unwrap();
        let loaded = WorldConfig::from_json_str(&json).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_json_file_round_trip() {
        let path = std::env::temp_dir().join(format!("cphysics-world-{}.json", std::process::id()));
        let config = WorldConfig::default().with_gravity(Vec3::new(0.0, -3.71, 0.0));
        config.save_json(&path).unwrap();

        let loaded = WorldConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_validation() {
        let config = WorldConfig::default().with_substeps(0.0, 1);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let err = WorldConfig::from_json_str(r#"{"max_substeps": -2}"#).unwrap_err();
        assert!(err.to_string().starts_with("Invalid configuration"));

        let err = WorldConfig::from_ron_str("(gravity: oops)").unwrap_err();
        assert!(matches!(err, ConfigError::DeserializeError(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = WorldConfig::load("/nonexistent/world.ron").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
