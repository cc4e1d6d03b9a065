//! COM-ZMP model
//!
//! The robot body is a point mass balanced on its ZMP like an inverted
//! pendulum:
//!
//! ```text
//! a = zeta^2 (p - pz) - g,    zeta^2 = g / z
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::Vector3;
use serde::Serialize;
use std::cell::Ref;
use std::rc::Rc;

// Internal
use super::formula;
use crate::{
    ctrl::{DEFAULT_MASS, DEFAULT_TIME_STEP},
    dataset::{Dataset, Shared},
    diag::{default_sink, CtrlError, DiagnosticSink},
};
use util::{maths, module::Steppable};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Standard gravitational acceleration.
///
/// Units: meters/second^2
pub const G: f64 = 9.80665;

/// Initial COM height of a default model.
///
/// Units: meters
pub const DEFAULT_COM_HEIGHT: f64 = 1.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State block of the COM-ZMP model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComZmpModelData {
    pub mass: f64,
    pub com_position: Vector3<f64>,
    pub com_velocity: Vector3<f64>,
    pub com_acceleration: Vector3<f64>,
    pub zmp_position: Vector3<f64>,
    pub reaction_force: Vector3<f64>,

    /// Units: seconds
    pub time_step: f64,
}

/// Dataset viewed by a COM-ZMP model.
pub type ComZmpModelDataset = Dataset<(Shared<ComZmpModelData>,)>;

/// COM-ZMP model.
pub struct ComZmpModel {
    data: ComZmpModelDataset,
    initial_com_position: Vector3<f64>,
    time: f64,
    diag: Rc<dyn DiagnosticSink>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ComZmpModelData {
    fn default() -> Self {
        Self {
            mass: DEFAULT_MASS,
            com_position: Vector3::new(0.0, 0.0, DEFAULT_COM_HEIGHT),
            com_velocity: Vector3::zeros(),
            com_acceleration: Vector3::zeros(),
            zmp_position: Vector3::zeros(),
            reaction_force: Vector3::zeros(),
            time_step: DEFAULT_TIME_STEP,
        }
    }
}

impl Default for ComZmpModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ComZmpModel {
    /// Create a model with the default mass and the COM at rest at the
    /// default height.
    pub fn new() -> Self {
        Self::from_data(ComZmpModelDataset::new())
    }

    /// Create a default model with the given mass.
    pub fn with_mass(mass: f64) -> Self {
        let mut model = Self::new();
        model.set_mass(mass);
        model
    }

    /// Create a model viewing an existing state block.
    ///
    /// The current COM position becomes the initial position.
    pub fn from_data(data: ComZmpModelDataset) -> Self {
        let initial_com_position = data.get::<0>().com_position;

        Self {
            data,
            initial_com_position,
            time: 0.0,
            diag: default_sink(),
        }
    }

    /// Replace the diagnostic sink.
    pub fn set_diagnostics(&mut self, diag: Rc<dyn DiagnosticSink>) -> &mut Self {
        self.diag = diag;
        self
    }

    pub fn diagnostics(&self) -> &Rc<dyn DiagnosticSink> {
        &self.diag
    }

    pub fn dataset(&self) -> &ComZmpModelDataset {
        &self.data
    }

    pub fn states(&self) -> Ref<'_, ComZmpModelData> {
        self.data.get::<0>()
    }

    pub fn mass(&self) -> f64 {
        self.states().mass
    }

    pub fn com_position(&self) -> Vector3<f64> {
        self.states().com_position
    }

    pub fn com_velocity(&self) -> Vector3<f64> {
        self.states().com_velocity
    }

    pub fn com_acceleration(&self) -> Vector3<f64> {
        self.states().com_acceleration
    }

    pub fn zmp_position(&self) -> Vector3<f64> {
        self.states().zmp_position
    }

    pub fn reaction_force(&self) -> Vector3<f64> {
        self.states().reaction_force
    }

    pub fn initial_com_position(&self) -> Vector3<f64> {
        self.initial_com_position
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

    pub fn set_com_position(&mut self, com_position: Vector3<f64>) -> &mut Self {
        self.data.get_mut::<0>().com_position = com_position;
        self
    }

    pub fn set_com_velocity(&mut self, com_velocity: Vector3<f64>) -> &mut Self {
        self.data.get_mut::<0>().com_velocity = com_velocity;
        self
    }

    pub fn set_zmp_position(&mut self, zmp_position: Vector3<f64>) -> &mut Self {
        self.data.get_mut::<0>().zmp_position = zmp_position;
        self
    }

    pub fn set_reaction_force(&mut self, reaction_force: Vector3<f64>) -> &mut Self {
        self.data.get_mut::<0>().reaction_force = reaction_force;
        self
    }

    /// Move the COM to `com_position` and stop it.
    pub fn reset_com_position(&mut self, com_position: Vector3<f64>) -> &mut Self {
        {
            let mut s = self.data.get_mut::<0>();
            s.com_velocity = Vector3::zeros();
            s.com_position = com_position;
        }
        self
    }

    /// Return the COM to its initial position at rest and restart the clock.
    pub fn reset(&mut self) -> &mut Self {
        let p = self.initial_com_position;
        self.reset_com_position(p);
        self.data.get_mut::<0>().com_acceleration = Vector3::zeros();
        self.time = 0.0;
        self
    }

    /// Reset to a new initial COM position.
    pub fn reset_to(&mut self, com_position: Vector3<f64>) -> &mut Self {
        self.initial_com_position = com_position;
        self.reset()
    }

    /// Squared zeta of a pendulum of height `com_height`.
    ///
    /// Returns 0 and reports a diagnostic if the height is not positive.
    pub fn compute_zeta_sqr(&self, com_height: f64) -> f64 {
        try_zeta_sqr(com_height).unwrap_or_else(|e| {
            self.diag.report(&e);
            0.0
        })
    }

    /// Zeta of a pendulum of height `com_height`, 0 if the height is not
    /// positive.
    pub fn compute_zeta(&self, com_height: f64) -> f64 {
        self.compute_zeta_sqr(com_height).sqrt()
    }

    /// Acceleration of the COM at `com_position` over the ZMP at
    /// `zmp_position`.
    pub fn compute_acceleration(
        &self,
        com_position: &Vector3<f64>,
        zmp_position: &Vector3<f64>,
    ) -> Vector3<f64> {
        let zeta_sqr = self.compute_zeta_sqr(com_position[2]);
        acceleration(com_position, zmp_position, zeta_sqr)
    }

    /// Zeta for which the vertical reaction force `reaction_force` holds the
    /// COM at `com_position` over the ZMP at `zmp_position`.
    ///
    /// Returns 0 and reports a diagnostic if the COM is not above the ZMP or
    /// the force does not push upwards.
    pub fn compute_zeta_from_force(
        &self,
        com_position: &Vector3<f64>,
        zmp_position: &Vector3<f64>,
        reaction_force: &Vector3<f64>,
        mass: f64,
    ) -> f64 {
        formula::try_des_zeta(com_position[2], zmp_position[2], reaction_force[2], mass)
            .unwrap_or_else(|e| {
                self.diag.report(&e);
                0.0
            })
    }

    /// Advance the model by one time step.
    ///
    /// If the COM height is not positive the state is left untouched.
    pub fn try_update(&mut self) -> Result<(), CtrlError> {
        let dt = {
            let mut guard = self.data.get_mut::<0>();
            let s = &mut *guard;

            let zeta_sqr = try_zeta_sqr(s.com_position[2])?;
            let dt = s.time_step;

            s.com_acceleration = acceleration(&s.com_position, &s.zmp_position, zeta_sqr);
            s.com_velocity += s.com_acceleration * dt;
            s.com_position += s.com_velocity * dt;
            dt
        };

        self.time += dt;
        trace!("COM-ZMP model advanced to t = {:.4} s", self.time);

        Ok(())
    }
}

impl Steppable for ComZmpModel {
    fn time_step(&self) -> f64 {
        self.states().time_step
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

    fn update(&mut self) -> bool {
        match self.try_update() {
            Ok(()) => true,
            Err(e) => {
                self.diag.report(&e);
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Squared zeta of a pendulum of height `com_height`, `g / com_height`.
pub fn try_zeta_sqr(com_height: f64) -> Result<f64, CtrlError> {
    if maths::is_positive(com_height) {
        Ok(G / com_height)
    } else {
        Err(CtrlError::DegenerateComHeight(com_height))
    }
}

/// COM acceleration for a given squared zeta.
pub fn acceleration(
    com_position: &Vector3<f64>,
    zmp_position: &Vector3<f64>,
    zeta_sqr: f64,
) -> Vector3<f64> {
    (com_position - zmp_position) * zeta_sqr - Vector3::new(0.0, 0.0, G)
}
