//! Per-route generation parameters.
//!
//! The parameter table is static configuration: it is built (or loaded
//! from a JSON file) once at startup and shared read-only afterwards.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

use super::backend::ModelId;

/// Clip duration used when a parameter set omits `duration`.
pub const DEFAULT_DURATION_SEC: f64 = 10.0;

/// Longest clip any route may request.
pub const MAX_DURATION_SEC: f64 = 120.0;

/// Named generation parameters for one route (e.g. duration, temperature).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationParams {
    values: BTreeMap<String, f64>,
}

impl GenerationParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the set with `name` set to `value`.
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    /// Returns a parameter value by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Returns the requested clip duration in seconds.
    pub fn duration_sec(&self) -> f64 {
        self.get("duration").unwrap_or(DEFAULT_DURATION_SEC)
    }

    /// Iterates over all parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn validate(&self, model: ModelId) -> Option<String> {
        let duration = self.duration_sec();
        if !(duration > 0.0 && duration <= MAX_DURATION_SEC) {
            return Some(format!(
                "{}: duration must be in (0, {}] seconds, got {}",
                model, MAX_DURATION_SEC, duration
            ));
        }

        if let Some((name, value)) = self.iter().find(|(_, v)| !v.is_finite()) {
            return Some(format!("{}: parameter '{}' is not finite ({})", model, name, value));
        }

        None
    }
}

/// Parameter sets for every route.
///
/// One field per [`ModelId`] makes a missing entry unrepresentable; a
/// JSON file lacking a route fails to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelParamTable {
    pub general: GenerationParams,
    pub percussion: GenerationParams,
    pub piano: GenerationParams,
    pub hybrid: GenerationParams,
}

impl ModelParamTable {
    /// Returns the built-in tuned parameters.
    pub fn builtin() -> Self {
        Self {
            general: GenerationParams::new()
                .with("duration", 10.0)
                .with("temperature", 0.7)
                .with("top_k", 250.0),
            percussion: GenerationParams::new()
                .with("duration", 5.0)
                .with("guidance_scale", 3.0),
            piano: GenerationParams::new()
                .with("duration", 15.0)
                .with("conditioning_strength", 0.8),
            hybrid: GenerationParams::new()
                .with("duration", 10.0)
                .with("temperature", 0.6),
        }
    }

    /// Loads a table from a JSON file and validates it.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::with_source(
                crate::error::ErrorCode::InvalidConfig,
                format!("Failed to read parameter file {}", path.display()),
                e,
            )
        })?;
        Self::from_json(&text)
    }

    /// Parses a table from JSON text and validates it.
    pub fn from_json(text: &str) -> Result<Self> {
        let table: Self = serde_json::from_str(text).map_err(|e| {
            PipelineError::with_source(
                crate::error::ErrorCode::InvalidConfig,
                "Malformed parameter table",
                e,
            )
        })?;

        if let Some(reason) = table.validate() {
            return Err(PipelineError::invalid_config(reason));
        }

        Ok(table)
    }

    /// Returns the parameters for a route.
    pub fn get(&self, model: ModelId) -> &GenerationParams {
        match model {
            ModelId::General => &self.general,
            ModelId::Percussion => &self.percussion,
            ModelId::Piano => &self.piano,
            ModelId::Hybrid => &self.hybrid,
        }
    }

    /// Validates every entry.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        ModelId::ALL
            .iter()
            .find_map(|&model| self.get(model).validate(model))
    }
}

impl Default for ModelParamTable {
    fn default() -> Self {
        Self::builtin()
    }
}
