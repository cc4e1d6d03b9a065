//! ODE solvers for second order systems

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// Position and velocity of a point, in that order.
pub type PhaseState = [Vector3<f64>; 2];

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A fixed step integrator.
pub trait Solver {
    /// Advance `state` from time `t` by `dt`.
    ///
    /// `system` returns the time derivative of a state at a given time.
    fn step<F>(&self, system: F, state: &PhaseState, t: f64, dt: f64) -> PhaseState
    where
        F: Fn(&PhaseState, f64) -> PhaseState;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Classic fourth order Runge-Kutta.
#[derive(Debug, Default, Clone, Copy)]
pub struct RungeKutta4;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Solver for RungeKutta4 {
    fn step<F>(&self, system: F, state: &PhaseState, t: f64, dt: f64) -> PhaseState
    where
        F: Fn(&PhaseState, f64) -> PhaseState,
    {
        let half = 0.5 * dt;

        let k1 = system(state, t);
        let k2 = system(&axpy(state, half, &k1), t + half);
        let k3 = system(&axpy(state, half, &k2), t + half);
        let k4 = system(&axpy(state, dt, &k3), t + dt);

        [
            state[0] + (k1[0] + 2.0 * k2[0] + 2.0 * k3[0] + k4[0]) * (dt / 6.0),
            state[1] + (k1[1] + 2.0 * k2[1] + 2.0 * k3[1] + k4[1]) * (dt / 6.0),
        ]
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// `x + a * k`
fn axpy(x: &PhaseState, a: f64, k: &PhaseState) -> PhaseState {
    [x[0] + k[0] * a, x[1] + k[1] * a]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_constant_acceleration_is_exact() {
        // x'' = (0, 0, -1), RK4 integrates polynomials up to 4th order exactly
        let system = |s: &PhaseState, _t: f64| [s[1], Vector3::new(0.0, 0.0, -1.0)];
        let mut state = [Vector3::new(0.0, 0.0, 10.0), Vector3::new(1.0, 0.0, 0.0)];

        let dt = 0.1;
        for i in 0..10 {
            state = RungeKutta4.step(system, &state, i as f64 * dt, dt);
        }

        assert!((state[0] - Vector3::new(1.0, 0.0, 9.5)).norm() < 1e-12);
        assert!((state[1] - Vector3::new(1.0, 0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_harmonic_oscillator() {
        // x'' = -x, starting at x = 1, after t = pi x = -1
        let system = |s: &PhaseState, _t: f64| [s[1], -s[0]];
        let mut state = [Vector3::new(1.0, 0.0, 0.0), Vector3::zeros()];

        let n = 1000;
        let dt = std::f64::consts::PI / n as f64;
        for i in 0..n {
            state = RungeKutta4.step(system, &state, i as f64 * dt, dt);
        }

        assert!((state[0][0] + 1.0).abs() < 1e-9);
        assert!(state[1][0].abs() < 1e-9);
    }
}
