//! # Generic control module
//!
//! Building blocks for controllers of a single vector degree of freedom, such
//! as a foot trajectory: a point mass model integrated by a Runge-Kutta solver
//! and a PD controller feeding it.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod pd_ctrl;
pub mod point_mass;
pub mod solver;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;

// Internal
use crate::diag::{CtrlError, DiagnosticSink};
pub use pd_ctrl::*;
pub use point_mass::*;
pub use solver::*;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Divide a vector by a scalar.
///
/// If the divisor is tiny the vector is returned unchanged and a
/// `DivisionByZero` diagnostic is reported.
pub fn div_vec3(v: &Vector3<f64>, k: f64, diag: &dyn DiagnosticSink) -> Vector3<f64> {
    match util::maths::checked_div(1.0, k) {
        Some(inv) => v * inv,
        None => {
            diag.report(&CtrlError::DivisionByZero);
            *v
        }
    }
}
