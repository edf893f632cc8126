/// Discrete time grid `t_i = i·Δt` for `i = 0..T`, `T = ⌈horizon / Δt⌉`.
///
/// The last grid point lies strictly before the horizon.
///
/// # Examples
///
/// ```
/// use pump_sim::sim::clock::Clock;
///
/// let clock = Clock::new(1.0, 0.25);
/// let times: Vec<f64> = clock.times().collect();
/// assert_eq!(times, vec![0.0, 0.25, 0.5, 0.75]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    /// Step size in hours.
    step: f64,
    /// Number of grid points.
    total: usize,
}

/// Grid points closer than this to the horizon are dropped.
const HORIZON_EPSILON: f64 = 1e-9;

impl Clock {
    /// Creates a grid covering `[0, horizon)` with spacing `step`.
    ///
    /// # Panics
    ///
    /// Panics if `step` or `horizon` is not strictly positive.
    pub fn new(horizon: f64, step: f64) -> Self {
        assert!(step > 0.0, "step must be > 0");
        assert!(horizon > 0.0, "horizon must be > 0");
        let total = (horizon / step - HORIZON_EPSILON).ceil().max(1.0) as usize;
        Self { step, total }
    }

    pub const fn step(&self) -> f64 {
        self.step
    }

    /// Number of grid points.
    pub const fn len(&self) -> usize {
        self.total
    }

    pub const fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Time of grid point `i` in hours.
    pub fn time_at(&self, i: usize) -> f64 {
        i as f64 * self.step
    }

    /// Iterates all grid times in order.
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.total).map(|i| self.time_at(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_grid_has_96_points() {
        let clock = Clock::new(24.0, 0.25);
        assert_eq!(clock.len(), 96);
        assert_eq!(clock.time_at(0), 0.0);
        assert_eq!(clock.time_at(95), 23.75);
    }

    #[test]
    fn non_dividing_step_rounds_up() {
        let clock = Clock::new(1.0, 0.3);
        let times: Vec<f64> = clock.times().collect();
        assert_eq!(times.len(), 4);
        assert!(times.iter().all(|&t| t < 1.0));
    }

    #[test]
    fn step_equal_to_horizon_is_single_point() {
        let clock = Clock::new(2.0, 2.0);
        assert_eq!(clock.len(), 1);
    }

    #[test]
    #[should_panic]
    fn zero_step_panics() {
        Clock::new(24.0, 0.0);
    }
}
