//! Parameters structure for ComCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::{DEFAULT_COM_HEIGHT, DEFAULT_DIST, DEFAULT_KR, DEFAULT_Q1, DEFAULT_Q2, DEFAULT_RHO};
use crate::ctrl::{DEFAULT_MASS, DEFAULT_TIME_STEP};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the COM controller.
///
/// Any parameter missing from the file takes its default value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ComCtrlParams {
    // ---- MODEL ----

    /// Mass of the robot.
    ///
    /// Units: kilograms
    pub mass_kg: f64,

    /// Control cycle period.
    ///
    /// Units: seconds
    pub time_step_s: f64,

    /// Initial, and default reference, COM position.
    ///
    /// Units: meters
    pub initial_com_position_m: [f64; 3],

    // ---- GAINS ----
    pub qx1: f64,
    pub qx2: f64,
    pub qy1: f64,
    pub qy2: f64,
    pub qz1: f64,
    pub qz2: f64,

    // ---- LATERAL SWING ----

    /// Swing side, -1 for right, 1 for left and 0 for none.
    pub rho: f64,

    /// Swing distance.
    ///
    /// Units: meters
    pub dist_m: f64,

    pub kr: f64,

    /// Default height of the virtual horizontal plane.
    ///
    /// Units: meters
    pub vhp_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ComCtrlParams {
    fn default() -> Self {
        Self {
            mass_kg: DEFAULT_MASS,
            time_step_s: DEFAULT_TIME_STEP,
            initial_com_position_m: [0.0, 0.0, DEFAULT_COM_HEIGHT],
            qx1: DEFAULT_Q1,
            qx2: DEFAULT_Q2,
            qy1: DEFAULT_Q1,
            qy2: DEFAULT_Q2,
            qz1: DEFAULT_Q1,
            qz2: DEFAULT_Q2,
            rho: DEFAULT_RHO,
            dist_m: DEFAULT_DIST,
            kr: DEFAULT_KR,
            vhp_m: 0.0,
        }
    }
}
