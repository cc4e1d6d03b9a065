//! COM-guided control formulae
//!
//! Pure functions giving the desired ZMP along each horizontal axis, the
//! desired vertical reaction force and the value of zeta realising that force.
//! All state is passed in explicitly.
//!
//! Along a horizontal axis the desired ZMP is
//!
//! ```text
//! xz = x + q1 q2 (x - xd) + (q1 + q2) (v - vd) / zeta
//! ```
//!
//! so that the COM converges on the reference with the poles `-q1 zeta` and
//! `-q2 zeta`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::G;
use crate::diag::CtrlError;
use util::maths;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Desired ZMP position along the x axis.
///
/// Returns 0 if `zeta` is not positive.
pub fn des_zmp_x(x: f64, v: f64, xd: f64, vd: f64, q1: f64, q2: f64, zeta: f64) -> f64 {
    if !maths::is_positive(zeta) {
        return 0.0;
    }

    x + q1 * q2 * (x - xd) + (q1 + q2) * (v - vd) / zeta
}

/// Desired ZMP position along the y axis.
///
/// Same law as the x axis, shifted by the lateral offset
/// `rho * kr * dist`. Returns 0 if `zeta` is not positive.
#[allow(clippy::too_many_arguments)]
pub fn des_zmp_y(
    y: f64,
    v: f64,
    yd: f64,
    vd: f64,
    q1: f64,
    q2: f64,
    zeta: f64,
    rho: f64,
    dist: f64,
    kr: f64,
) -> f64 {
    if !maths::is_positive(zeta) {
        return 0.0;
    }

    des_zmp_x(y, v, yd, vd, q1, q2, zeta) + rho * kr * dist
}

/// Desired vertical reaction force bringing the COM height `z` to `zd`.
///
/// The gains are scaled by the zeta of a pendulum of height `zd`. Returns 0
/// if `zd` is not positive.
pub fn des_react_force_z(z: f64, vz: f64, zd: f64, q1: f64, q2: f64, mass: f64) -> f64 {
    if !maths::is_positive(zd) {
        return 0.0;
    }

    let zeta_sqr = G / zd;
    mass * (G - q1 * q2 * zeta_sqr * (z - zd) - (q1 + q2) * zeta_sqr.sqrt() * vz)
}

/// Zeta realising the vertical reaction force `fz` with the COM at height
/// `z` above a ZMP at height `zz`.
pub fn try_des_zeta(z: f64, zz: f64, fz: f64, mass: f64) -> Result<f64, CtrlError> {
    let height = z - zz;
    if !maths::is_positive(height) || !maths::is_positive(fz) || !maths::is_positive(mass) {
        return Err(CtrlError::DegenerateZeta { force: fz, height });
    }

    Ok((fz / (mass * height)).sqrt())
}

/// As [`try_des_zeta`], returning 0 when zeta is undefined.
pub fn des_zeta(z: f64, zz: f64, fz: f64, mass: f64) -> f64 {
    try_des_zeta(z, zz, fz, mass).unwrap_or(0.0)
}
