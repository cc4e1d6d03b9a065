//! Point mass model
//!
//! A single mass moving freely in 3D under an external force law supplied by
//! the caller at every update.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;
use serde::Serialize;
use std::cell::Ref;
use std::rc::Rc;

// Internal
use super::{div_vec3, PhaseState, RungeKutta4, Solver};
use crate::{
    dataset::{Dataset, Shared},
    diag::{default_sink, CtrlError, DiagnosticSink},
};
use util::{maths, module::Steppable};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Mass used when none, or an invalid one, is given.
pub const DEFAULT_MASS: f64 = 1.0;

/// Time step used when none, or an invalid one, is given.
///
/// Units: seconds
pub const DEFAULT_TIME_STEP: f64 = 0.001;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State block of a point mass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointMassModelData {
    pub mass: f64,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub acceleration: Vector3<f64>,

    /// Force acting on the mass at the last update.
    pub force: Vector3<f64>,

    /// Units: seconds
    pub time_step: f64,
}

/// Dataset viewed by a point mass model.
pub type PointMassModelDataset = Dataset<(Shared<PointMassModelData>,)>;

/// Point mass model.
pub struct PointMassModel {
    data: PointMassModelDataset,
    initial_position: Vector3<f64>,
    time: f64,
    solver: RungeKutta4,
    diag: Rc<dyn DiagnosticSink>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for PointMassModelData {
    fn default() -> Self {
        Self {
            mass: DEFAULT_MASS,
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            acceleration: Vector3::zeros(),
            force: Vector3::zeros(),
            time_step: DEFAULT_TIME_STEP,
        }
    }
}

impl Default for PointMassModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PointMassModel {
    /// Create a model at rest at the origin, with its own storage.
    pub fn new() -> Self {
        Self::from_data(PointMassModelDataset::new())
    }

    /// Create a model viewing the given data block.
    ///
    /// The current position becomes the initial position.
    pub fn from_data(data: PointMassModelDataset) -> Self {
        let initial_position = data.get::<0>().position;

        Self {
            data,
            initial_position,
            time: 0.0,
            solver: RungeKutta4,
            diag: default_sink(),
        }
    }

    /// Replace the diagnostic sink.
    pub fn set_diagnostics(&mut self, diag: Rc<dyn DiagnosticSink>) -> &mut Self {
        self.diag = diag;
        self
    }

    pub fn dataset(&self) -> &PointMassModelDataset {
        &self.data
    }

    pub fn data(&self) -> Ref<'_, PointMassModelData> {
        self.data.get::<0>()
    }

    pub fn mass(&self) -> f64 {
        self.data().mass
    }

    pub fn position(&self) -> Vector3<f64> {
        self.data().position
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.data().velocity
    }

    pub fn acceleration(&self) -> Vector3<f64> {
        self.data().acceleration
    }

    pub fn initial_position(&self) -> Vector3<f64> {
        self.initial_position
    }

    /// Simulated time since the last reset.
    ///
    /// Units: seconds
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Set the mass, resetting it to [`DEFAULT_MASS`] if it is not positive.
    pub fn set_mass(&mut self, mass: f64) -> &mut Self {
        let mass = if maths::is_positive(mass) {
            mass
        } else {
            self.diag.report(&CtrlError::InvalidMass(mass));
            DEFAULT_MASS
        };
        self.data.get_mut::<0>().mass = mass;
        self
    }

    pub fn set_position(&mut self, position: Vector3<f64>) -> &mut Self {
        self.data.get_mut::<0>().position = position;
        self
    }

    pub fn set_velocity(&mut self, velocity: Vector3<f64>) -> &mut Self {
        self.data.get_mut::<0>().velocity = velocity;
        self
    }

    pub fn set_initial_position(&mut self, position: Vector3<f64>) -> &mut Self {
        self.initial_position = position;
        self
    }

    /// Return to the initial position at rest and restart the clock.
    pub fn reset(&mut self) -> &mut Self {
        {
            let mut d = self.data.get_mut::<0>();
            d.position = self.initial_position;
            d.velocity = Vector3::zeros();
            d.acceleration = Vector3::zeros();
            d.force = Vector3::zeros();
        }
        self.time = 0.0;
        self
    }

    /// Reset to a new initial position.
    pub fn reset_to(&mut self, position: Vector3<f64>) -> &mut Self {
        self.initial_position = position;
        self.reset()
    }

    /// Advance by one time step under the given force law.
    ///
    /// `force` receives the position, velocity and time and returns the force
    /// acting on the mass.
    pub fn update_with<F>(&mut self, force: F) -> bool
    where
        F: Fn(&Vector3<f64>, &Vector3<f64>, f64) -> Vector3<f64>,
    {
        let (mass, dt, state) = {
            let d = self.data();
            (d.mass, d.time_step, [d.position, d.velocity])
        };

        let diag = &*self.diag;
        let system = |s: &PhaseState, t: f64| -> PhaseState {
            [s[1], div_vec3(&force(&s[0], &s[1], t), mass, diag)]
        };

        let next = self.solver.step(&system, &state, self.time, dt);
        self.time += dt;

        let f = force(&next[0], &next[1], self.time);
        let mut d = self.data.get_mut::<0>();
        d.position = next[0];
        d.velocity = next[1];
        d.acceleration = div_vec3(&f, mass, diag);
        d.force = f;

        true
    }
}

impl Steppable for PointMassModel {
    fn time_step(&self) -> f64 {
        self.data().time_step
    }

    /// Set the time step, resetting it to [`DEFAULT_TIME_STEP`] if it is not
    /// positive.
    fn set_time_step(&mut self, time_step: f64) {
        let time_step = if maths::is_positive(time_step) {
            time_step
        } else {
            self.diag.report(&CtrlError::InvalidTimeStep(time_step));
            DEFAULT_TIME_STEP
        };
        self.data.get_mut::<0>().time_step = time_step;
    }

    /// Advance with no external force.
    fn update(&mut self) -> bool {
        self.update_with(|_, _, _| Vector3::zeros())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::diag::RecordingSink;

    #[test]
    fn test_defaults() {
        let model = PointMassModel::new();
        assert_eq!(model.mass(), 1.0);
        assert_eq!(model.time_step(), 0.001);
        assert_eq!(model.position(), Vector3::zeros());
        assert_eq!(model.time(), 0.0);
    }

    #[test]
    fn test_invalid_parameters_reset() {
        let sink = Rc::new(RecordingSink::default());
        let mut model = PointMassModel::new();
        model.set_diagnostics(sink.clone());

        model.set_mass(2.0);
        assert_eq!(model.mass(), 2.0);
        model.set_mass(-2.0);
        assert_eq!(model.mass(), DEFAULT_MASS);

        model.set_time_step(0.01);
        assert_eq!(model.time_step(), 0.01);
        model.set_time_step(0.0);
        assert_eq!(model.time_step(), DEFAULT_TIME_STEP);

        assert_eq!(
            sink.take(),
            vec![CtrlError::InvalidMass(-2.0), CtrlError::InvalidTimeStep(0.0)]
        );
    }

    #[test]
    fn test_free_motion() {
        let mut model = PointMassModel::new();
        model.set_velocity(Vector3::new(1.0, 0.0, 0.0));

        for _ in 0..100 {
            assert!(model.update());
        }

        assert!((model.position() - Vector3::new(0.1, 0.0, 0.0)).norm() < 1e-12);
        assert!((model.time() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_constant_force() {
        let mut model = PointMassModel::new();
        model.set_mass(2.0);

        // a = 1, x = t^2 / 2
        for _ in 0..1000 {
            model.update_with(|_, _, _| Vector3::new(0.0, 2.0, 0.0));
        }

        assert!((model.position()[1] - 0.5).abs() < 1e-9);
        assert!((model.velocity()[1] - 1.0).abs() < 1e-9);
        assert_eq!(model.acceleration(), Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_reset() {
        let mut model = PointMassModel::new();
        model.set_initial_position(Vector3::new(0.0, 0.1, 0.0));
        model.set_velocity(Vector3::new(1.0, 1.0, 1.0));
        model.update();

        model.reset();
        assert_eq!(model.position(), Vector3::new(0.0, 0.1, 0.0));
        assert_eq!(model.velocity(), Vector3::zeros());
        assert_eq!(model.time(), 0.0);

        model.reset_to(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(model.position(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(model.initial_position(), Vector3::new(1.0, 2.0, 3.0));
    }
}
