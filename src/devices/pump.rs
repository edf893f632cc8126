use roots::{SimpleConvergency, find_root_newton_raphson};
use tracing::trace;

use crate::config::{PipeConfig, PumpConfig};

/// Water density (kg/m³).
pub const WATER_DENSITY: f64 = 1000.0;

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f64 = 9.81;

/// Seconds per hour, for m³/h to m³/s conversion.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Iteration cap of the head-balance solve.
const MAX_ITERATIONS: usize = 50;

/// Absolute tolerance of the head-balance solve, applied both to the flow
/// update (m³/h) and to the head residual (m).
const FLOW_TOLERANCE: f64 = 1e-9;

/// Instantaneous pump operating point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OperatingPoint {
    /// Flow rate (m³/h, >= 0).
    pub flow_m3h: f64,
    /// Pump head at that flow (m).
    pub head_m: f64,
    /// Electrical power draw (kW, >= 0).
    pub power_kw: f64,
}

impl OperatingPoint {
    /// The pump at rest.
    pub const OFF: Self = Self {
        flow_m3h: 0.0,
        head_m: 0.0,
        power_kw: 0.0,
    };
}

/// Single-pump, single-pipe hydraulic model.
///
/// The pump characteristic `H(Q) = H_max - a·Q²` is balanced against the
/// static lift (the tank level) plus the Darcy–Weisbach friction loss
/// `k·Q²` of the delivery pipe, where
///
/// ```text
/// k = 32·f·L / (D⁵·g·π²·3600²)
/// ```
///
/// converts the loss coefficient to flow in m³/h.
#[derive(Debug, Clone, PartialEq)]
pub struct HydraulicModel {
    max_head: f64,
    curve_coefficient: f64,
    efficiency: f64,
    nominal_flow: f64,
    friction_coefficient: f64,
}

impl HydraulicModel {
    pub fn new(pump: &PumpConfig, pipe: &PipeConfig) -> Self {
        let friction_coefficient = 32.0 * pipe.friction_factor * pipe.length
            / (pipe.diameter.powi(5)
                * GRAVITY
                * std::f64::consts::PI.powi(2)
                * SECONDS_PER_HOUR.powi(2));
        Self {
            max_head: pump.max_head,
            curve_coefficient: pump.curve_coefficient,
            efficiency: pump.efficiency,
            nominal_flow: pump.nominal_flow,
            friction_coefficient,
        }
    }

    /// Pump head at flow `q` (m).
    pub fn pump_head(&self, q: f64) -> f64 {
        self.max_head - self.curve_coefficient * q * q
    }

    /// Pipe friction loss at flow `q` (m).
    pub fn friction_loss(&self, q: f64) -> f64 {
        self.friction_coefficient * q * q
    }

    /// Resolves the flow (m³/h) that balances pump head against lift plus
    /// friction for a tank at `level` metres.
    ///
    /// Newton iteration from the nominal flow. A solve that does not
    /// converge yields zero flow; the result is never negative.
    pub fn flow_rate(&self, level: f64) -> f64 {
        let balance = |q: f64| self.pump_head(q) - (level + self.friction_loss(q));
        let slope = |q: f64| -2.0 * (self.curve_coefficient + self.friction_coefficient) * q;
        let mut convergency = SimpleConvergency {
            eps: FLOW_TOLERANCE,
            max_iter: MAX_ITERATIONS,
        };
        match find_root_newton_raphson(self.nominal_flow, balance, slope, &mut convergency) {
            Ok(q) if q.is_finite() => q.max(0.0),
            Ok(q) => {
                trace!(level, flow = q, "head balance produced a non-finite flow");
                0.0
            }
            Err(e) => {
                trace!(level, error = %e, "head balance did not converge");
                0.0
            }
        }
    }

    /// Electrical power (kW) to deliver `flow_m3h` against `head_m`.
    pub fn power_kw(&self, flow_m3h: f64, head_m: f64) -> f64 {
        WATER_DENSITY * GRAVITY * (flow_m3h / SECONDS_PER_HOUR) * head_m
            / (1000.0 * self.efficiency)
    }

    /// Operating point for a tank at `level` with the pump `on` or off.
    ///
    /// An idle pump yields [`OperatingPoint::OFF`] without solving.
    pub fn operating_point(&self, level: f64, on: bool) -> OperatingPoint {
        if !on {
            return OperatingPoint::OFF;
        }
        let flow_m3h = self.flow_rate(level);
        let head_m = self.pump_head(flow_m3h);
        OperatingPoint {
            flow_m3h,
            head_m,
            power_kw: self.power_kw(flow_m3h, head_m),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;

    fn reference() -> HydraulicModel {
        HydraulicModel::new(&PumpConfig::default(), &PipeConfig::default())
    }

    /// Both curves are quadratic in `Q`, so the balance has a closed form.
    fn closed_form_flow(model: &HydraulicModel, level: f64) -> f64 {
        ((model.max_head - level) / (model.curve_coefficient + model.friction_coefficient)).sqrt()
    }

    #[test]
    fn flow_balances_head() {
        let model = reference();
        for level in [0.0, 2.0, 4.0, 7.0, 9.0] {
            let q = model.flow_rate(level);
            assert_abs_diff_eq!(
                model.pump_head(q),
                level + model.friction_loss(q),
                epsilon = 1e-6
            );
            assert_relative_eq!(q, closed_form_flow(&model, level), max_relative = 1e-9);
        }
    }

    #[test]
    fn head_residual_meets_solve_tolerance() {
        let model = reference();
        for level in [0.5, 3.25, 6.0, 8.75] {
            let q = model.flow_rate(level);
            let residual = model.pump_head(q) - (level + model.friction_loss(q));
            assert!(residual.abs() < 1e-8, "level {level}: residual {residual} m");
        }
    }

    #[test]
    fn reference_operating_point() {
        let model = reference();
        let point = model.operating_point(4.0, true);
        assert!((289.0..291.0).contains(&point.flow_m3h), "flow {}", point.flow_m3h);
        assert!((91.0..93.5).contains(&point.head_m), "head {}", point.head_m);
        assert!((110.0..114.0).contains(&point.power_kw), "power {}", point.power_kw);
    }

    #[test]
    fn higher_level_reduces_flow() {
        let model = reference();
        assert!(model.flow_rate(8.0) < model.flow_rate(1.0));
    }

    #[test]
    fn pump_off_is_idle_at_any_level() {
        let model = reference();
        for level in [-5.0, 0.0, 4.0, 9.0, 500.0] {
            assert_eq!(model.operating_point(level, false), OperatingPoint::OFF);
        }
    }

    #[test]
    fn lift_above_shutoff_head_fails_soft() {
        let model = reference();
        assert_eq!(model.flow_rate(300.0), 0.0);
        let point = model.operating_point(300.0, true);
        assert_eq!(point.flow_m3h, 0.0);
        assert_eq!(point.power_kw, 0.0);
    }

    #[test]
    fn power_formula() {
        let model = reference();
        // 3600 m³/h = 1 m³/s against 65 m at 65 % efficiency: 9.81 · 100 kW.
        assert_relative_eq!(model.power_kw(3600.0, 65.0), 981.0, max_relative = 1e-12);
    }
}
