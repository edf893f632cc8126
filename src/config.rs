//! TOML-based plant configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Complete plant, tariff, and optimizer configuration parsed from TOML.
///
/// All fields have defaults matching the reference plant. Load from TOML
/// with [`SimulationConfig::from_toml_file`] or use
/// [`SimulationConfig::baseline`] for the built-in default. The value is
/// read-only once constructed and shared by every evaluation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Storage tank geometry and level bounds.
    #[serde(default)]
    pub tank: TankConfig,
    /// Pump characteristic curve and efficiency.
    #[serde(default)]
    pub pump: PumpConfig,
    /// Delivery pipe between pump and tank.
    #[serde(default)]
    pub pipe: PipeConfig,
    /// Horizon and step size.
    #[serde(default)]
    pub time: TimeConfig,
    /// Time-of-day energy price anchors.
    #[serde(default)]
    pub tariff: TariffConfig,
    /// Violation penalty shaping.
    #[serde(default)]
    pub penalty: PenaltyConfig,
    /// Admissible pump cycle lengths.
    #[serde(default)]
    pub cycles: CycleConfig,
    /// Global minimizer budget.
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

/// Storage tank geometry and level bounds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TankConfig {
    /// Lowest admissible level (m).
    pub min_level: f64,
    /// Highest admissible level (m).
    pub max_level: f64,
    /// Level at the start of the horizon (m).
    pub initial_level: f64,
    /// Cross-sectional area (m²).
    pub area: f64,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            min_level: 0.0,
            max_level: 9.0,
            initial_level: 4.0,
            area: 185.0,
        }
    }
}

/// Pump characteristic `H(Q) = max_head - curve_coefficient * Q²`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PumpConfig {
    /// Wire-to-water efficiency (0..1].
    pub efficiency: f64,
    /// Shut-off head (m).
    pub max_head: f64,
    /// Quadratic curve coefficient (m per (m³/h)²).
    pub curve_coefficient: f64,
    /// Flow the root finder starts from (m³/h).
    pub nominal_flow: f64,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            efficiency: 0.65,
            max_head: 260.0,
            curve_coefficient: 0.002,
            nominal_flow: 150.0,
        }
    }
}

/// Delivery pipe parameters for the friction loss term.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipeConfig {
    /// Internal diameter (m).
    pub diameter: f64,
    /// Darcy friction factor.
    pub friction_factor: f64,
    /// Length (m).
    pub length: f64,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            diameter: 0.3,
            friction_factor: 0.02,
            length: 5000.0,
        }
    }
}

/// Simulation horizon and step size, both in hours.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeConfig {
    /// Length of the simulated period (h).
    pub horizon: f64,
    /// Step size (h).
    pub step: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            horizon: 24.0,
            step: 0.25,
        }
    }
}

/// `(hour, price)` anchor points covering one day.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TariffConfig {
    /// Anchors sorted by hour, first at 0 and last at 24 with equal prices.
    pub anchors: Vec<(f64, f64)>,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            anchors: vec![
                (0.0, 0.0713),
                (2.0, 0.0651),
                (4.0, 0.0593),
                (6.0, 0.0778),
                (8.0, 0.0851),
                (10.0, 0.0923),
                (12.0, 0.0968),
                (14.0, 0.10094),
                (16.0, 0.10132),
                (18.0, 0.10230),
                (20.0, 0.10189),
                (22.0, 0.10132),
                (24.0, 0.0713),
            ],
        }
    }
}

/// Penalty shaping for level excursions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PenaltyConfig {
    /// Cost of the first hour of a violation run; hour `k` of a run costs `k * base`.
    pub base: f64,
    /// Weight of the quadratic terminal-state terms of the objective.
    pub constraint_weight: f64,
    /// Lower edge of the violation band, defaults to `tank.min_level`.
    pub band_min: Option<f64>,
    /// Upper edge of the violation band, defaults to `tank.max_level`.
    pub band_max: Option<f64>,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            base: 5.0,
            constraint_weight: 1000.0,
            band_min: None,
            band_max: None,
        }
    }
}

/// Admissible length of a single pump cycle (h).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CycleConfig {
    /// Shortest admissible cycle.
    pub min_duration: f64,
    /// Longest admissible cycle.
    pub max_duration: f64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            min_duration: 0.5,
            max_duration: 8.0,
        }
    }
}

/// Budget and tuning of the global minimizer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerConfig {
    /// Upper bound on generations.
    pub max_generations: usize,
    /// Population members per decision variable.
    pub population_per_dimension: usize,
    /// Relative convergence tolerance on the spread of population scores.
    pub tolerance: f64,
    /// Run a local polish from the best member on completion.
    pub polish: bool,
    /// Random seed; identical seeds reproduce identical runs.
    pub seed: u64,
    /// Dither range of the mutation factor, resampled every generation.
    pub mutation: (f64, f64),
    /// Crossover probability.
    pub recombination: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_generations: 300,
            population_per_dimension: 25,
            tolerance: 0.01,
            polish: true,
            seed: 42,
            mutation: (0.5, 1.0),
            recombination: 0.7,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field} — {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"time.step"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl SimulationConfig {
    /// Returns the reference plant.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns the reference plant with the narrower 2–7 m operating band
    /// driving the violation penalty, while the hard bounds stay at 0–9 m.
    pub fn legacy_band() -> Self {
        Self {
            penalty: PenaltyConfig {
                band_min: Some(2.0),
                band_max: Some(7.0),
                ..PenaltyConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the reference plant with a small optimizer budget for smoke runs.
    pub fn quick() -> Self {
        Self {
            optimizer: OptimizerConfig {
                max_generations: 60,
                population_per_dimension: 10,
                ..OptimizerConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "legacy_band", "quick"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "legacy_band" => Ok(Self::legacy_band()),
            "quick" => Ok(Self::quick()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Lower edge of the band whose excursions feed the violation penalty.
    pub fn band_min(&self) -> f64 {
        self.penalty.band_min.unwrap_or(self.tank.min_level)
    }

    /// Upper edge of the band whose excursions feed the violation penalty.
    pub fn band_max(&self) -> f64 {
        self.penalty.band_max.unwrap_or(self.tank.max_level)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let tank = &self.tank;
        if !(tank.min_level < tank.max_level) {
            errors.push(ConfigError::new("tank.min_level", "must be < tank.max_level"));
        }
        if !(tank.area > 0.0) {
            errors.push(ConfigError::new("tank.area", "must be > 0"));
        }
        if !tank.initial_level.is_finite() {
            errors.push(ConfigError::new("tank.initial_level", "must be finite"));
        }

        let pump = &self.pump;
        if !(pump.efficiency > 0.0 && pump.efficiency <= 1.0) {
            errors.push(ConfigError::new("pump.efficiency", "must be in (0.0, 1.0]"));
        }
        if !(pump.max_head > 0.0) {
            errors.push(ConfigError::new("pump.max_head", "must be > 0"));
        }
        if !(pump.curve_coefficient >= 0.0) {
            errors.push(ConfigError::new("pump.curve_coefficient", "must be >= 0"));
        }
        if !(pump.nominal_flow > 0.0) {
            errors.push(ConfigError::new("pump.nominal_flow", "must be > 0"));
        }

        let pipe = &self.pipe;
        if !(pipe.diameter > 0.0) {
            errors.push(ConfigError::new("pipe.diameter", "must be > 0"));
        }
        if !(pipe.friction_factor >= 0.0) {
            errors.push(ConfigError::new("pipe.friction_factor", "must be >= 0"));
        }
        if !(pipe.length >= 0.0) {
            errors.push(ConfigError::new("pipe.length", "must be >= 0"));
        }

        let time = &self.time;
        if !(time.horizon > 0.0) {
            errors.push(ConfigError::new("time.horizon", "must be > 0"));
        }
        if !(time.step > 0.0) {
            errors.push(ConfigError::new("time.step", "must be > 0"));
        } else if time.step > time.horizon {
            errors.push(ConfigError::new("time.step", "must be <= time.horizon"));
        }

        validate_anchors(&self.tariff.anchors, &mut errors);

        let penalty = &self.penalty;
        if !(penalty.base >= 0.0) {
            errors.push(ConfigError::new("penalty.base", "must be >= 0"));
        }
        if !(penalty.constraint_weight >= 0.0) {
            errors.push(ConfigError::new("penalty.constraint_weight", "must be >= 0"));
        }
        if !(self.band_min() < self.band_max()) {
            errors.push(ConfigError::new("penalty.band_min", "must be < penalty.band_max"));
        }

        let cycles = &self.cycles;
        if !(cycles.min_duration > 0.0) {
            errors.push(ConfigError::new("cycles.min_duration", "must be > 0"));
        }
        if !(cycles.min_duration <= cycles.max_duration) {
            errors.push(ConfigError::new(
                "cycles.min_duration",
                "must be <= cycles.max_duration",
            ));
        }

        let opt = &self.optimizer;
        if opt.max_generations == 0 {
            errors.push(ConfigError::new("optimizer.max_generations", "must be > 0"));
        }
        if opt.population_per_dimension < 2 {
            errors.push(ConfigError::new(
                "optimizer.population_per_dimension",
                "must be >= 2",
            ));
        }
        if !(opt.tolerance >= 0.0) {
            errors.push(ConfigError::new("optimizer.tolerance", "must be >= 0"));
        }
        let (lo, hi) = opt.mutation;
        if !(lo > 0.0 && lo <= hi && hi <= 2.0) {
            errors.push(ConfigError::new(
                "optimizer.mutation",
                "must satisfy 0 < min <= max <= 2",
            ));
        }
        if !(0.0..=1.0).contains(&opt.recombination) {
            errors.push(ConfigError::new("optimizer.recombination", "must be in [0.0, 1.0]"));
        }

        errors
    }
}

fn validate_anchors(anchors: &[(f64, f64)], errors: &mut Vec<ConfigError>) {
    if anchors.len() < 2 {
        errors.push(ConfigError::new("tariff.anchors", "must have at least 2 anchors"));
        return;
    }
    if anchors.iter().any(|(h, p)| !h.is_finite() || !p.is_finite()) {
        errors.push(ConfigError::new("tariff.anchors", "must be finite"));
        return;
    }
    if anchors.windows(2).any(|w| w[0].0 >= w[1].0) {
        errors.push(ConfigError::new("tariff.anchors", "hours must be strictly increasing"));
    }
    let (first_hour, first_price) = anchors[0];
    let (last_hour, last_price) = anchors[anchors.len() - 1];
    if first_hour != 0.0 || last_hour != 24.0 {
        errors.push(ConfigError::new("tariff.anchors", "must span hours 0 to 24"));
    }
    if first_price != last_price {
        errors.push(ConfigError::new(
            "tariff.anchors",
            "first and last prices must be equal",
        ));
    }
}
