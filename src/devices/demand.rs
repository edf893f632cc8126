use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Coefficients of the high-demand variable-consumer curve, constant term first.
const VARIABLE_HIGH: [f64; 8] = [
    75.393, -1.0124, -3.8645, 1.03965, -0.09621, 3.733e-3, -4.90754e-5, -1.19333e-7,
];

/// Coefficients of the low-demand variable-consumer curve, constant term first.
const VARIABLE_LOW: [f64; 8] = [
    75.393, -1.32657, -3.85966, 1.05577, -0.100585, 4.1432e-3, -6.54846e-5, 1.19333e-7,
];

/// Coefficients of the residential curve, constant term first.
const RESIDENTIAL: [f64; 4] = [20.0, 0.1335, 0.09, -0.004];

/// Extreme consumption scenario of the variable consumer class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemandScenario {
    /// Upper envelope of variable-class consumption.
    High,
    /// Lower envelope of variable-class consumption.
    Low,
}

impl DemandScenario {
    /// Every scenario, in the order the driver iterates them.
    pub const ALL: [Self; 2] = [Self::High, Self::Low];

    /// Lowercase label used in reports and file names.
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for DemandScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DemandScenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" | "max" => Ok(Self::High),
            "low" | "min" => Ok(Self::Low),
            other => Err(format!(
                "unknown demand scenario \"{other}\", expected \"high\" or \"low\""
            )),
        }
    }
}

/// Consumption model: a variable consumer class plus a residential class.
///
/// All rates are in m³/h and `t` is the time of day in hours. The curves are
/// fitted on `[0, 24)` but evaluate for any real `t`.
///
/// # Examples
///
/// ```
/// use pump_sim::devices::demand::{DemandModel, DemandScenario};
///
/// let model = DemandModel::new(DemandScenario::High);
/// let total = model.total_m3h(0.0);
/// assert!((total - 95.393).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemandModel {
    scenario: DemandScenario,
}

impl DemandModel {
    pub const fn new(scenario: DemandScenario) -> Self {
        Self { scenario }
    }

    pub const fn scenario(&self) -> DemandScenario {
        self.scenario
    }

    /// Variable-class consumption for the selected scenario.
    pub fn variable_m3h(&self, t: f64) -> f64 {
        match self.scenario {
            DemandScenario::High => polynomial(&VARIABLE_HIGH, t),
            DemandScenario::Low => polynomial(&VARIABLE_LOW, t),
        }
    }

    /// Residential consumption, independent of the scenario.
    pub fn residential_m3h(&self, t: f64) -> f64 {
        polynomial(&RESIDENTIAL, t)
    }

    /// Total consumption: variable class plus residential class.
    pub fn total_m3h(&self, t: f64) -> f64 {
        self.variable_m3h(t) + self.residential_m3h(t)
    }
}

/// Horner evaluation, `coefficients[k]` multiplies `t^k`.
fn polynomial(coefficients: &[f64], t: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc.mul_add(t, c))
}
