//! Per-axis gain holders of the COM controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;

// Internal
use super::formula;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default position feedback gain on every axis.
pub const DEFAULT_Q1: f64 = 1.0;

/// Default velocity feedback gain on every axis.
pub const DEFAULT_Q2: f64 = 1.0;

pub const DEFAULT_RHO: f64 = 0.0;
pub const DEFAULT_DIST: f64 = 0.0;
pub const DEFAULT_KR: f64 = 1.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains of the x axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComCtrlX {
    q1: f64,
    q2: f64,
}

/// Gains of the y axis.
///
/// Besides the feedback gains the lateral axis carries the swing parameters:
/// `rho` selects the side to swing to (-1, 0 or 1), `dist` is the swing
/// distance and `kr` scales it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComCtrlY {
    q1: f64,
    q2: f64,
    rho: f64,
    dist: f64,
    kr: f64,
}

/// Gains of the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComCtrlZ {
    q1: f64,
    q2: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ComCtrlX {
    fn default() -> Self {
        Self::new(DEFAULT_Q1, DEFAULT_Q2)
    }
}

impl ComCtrlX {
    pub fn new(q1: f64, q2: f64) -> Self {
        Self { q1, q2 }
    }

    pub fn q1(&self) -> f64 {
        self.q1
    }

    pub fn q2(&self) -> f64 {
        self.q2
    }

    pub fn set_q1(&mut self, q1: f64) -> &mut Self {
        self.q1 = q1;
        self
    }

    pub fn set_q2(&mut self, q2: f64) -> &mut Self {
        self.q2 = q2;
        self
    }

    /// Desired ZMP x position.
    pub fn des_zmp_pos(
        &self,
        ref_com_position: &Vector3<f64>,
        ref_com_velocity: &Vector3<f64>,
        com_position: &Vector3<f64>,
        com_velocity: &Vector3<f64>,
        zeta: f64,
    ) -> f64 {
        formula::des_zmp_x(
            com_position[0],
            com_velocity[0],
            ref_com_position[0],
            ref_com_velocity[0],
            self.q1,
            self.q2,
            zeta,
        )
    }
}

impl Default for ComCtrlY {
    fn default() -> Self {
        Self {
            q1: DEFAULT_Q1,
            q2: DEFAULT_Q2,
            rho: DEFAULT_RHO,
            dist: DEFAULT_DIST,
            kr: DEFAULT_KR,
        }
    }
}

impl ComCtrlY {
    pub fn new(q1: f64, q2: f64) -> Self {
        Self {
            q1,
            q2,
            ..Default::default()
        }
    }

    pub fn q1(&self) -> f64 {
        self.q1
    }

    pub fn q2(&self) -> f64 {
        self.q2
    }

    pub fn rho(&self) -> f64 {
        self.rho
    }

    pub fn dist(&self) -> f64 {
        self.dist
    }

    pub fn kr(&self) -> f64 {
        self.kr
    }

    pub fn set_q1(&mut self, q1: f64) -> &mut Self {
        self.q1 = q1;
        self
    }

    pub fn set_q2(&mut self, q2: f64) -> &mut Self {
        self.q2 = q2;
        self
    }

    pub fn set_rho(&mut self, rho: f64) -> &mut Self {
        self.rho = rho;
        self
    }

    pub fn set_dist(&mut self, dist: f64) -> &mut Self {
        self.dist = dist;
        self
    }

    pub fn set_kr(&mut self, kr: f64) -> &mut Self {
        self.kr = kr;
        self
    }

    /// Desired ZMP y position, including the swing offset.
    pub fn des_zmp_pos(
        &self,
        ref_com_position: &Vector3<f64>,
        ref_com_velocity: &Vector3<f64>,
        com_position: &Vector3<f64>,
        com_velocity: &Vector3<f64>,
        zeta: f64,
    ) -> f64 {
        formula::des_zmp_y(
            com_position[1],
            com_velocity[1],
            ref_com_position[1],
            ref_com_velocity[1],
            self.q1,
            self.q2,
            zeta,
            self.rho,
            self.dist,
            self.kr,
        )
    }
}

impl Default for ComCtrlZ {
    fn default() -> Self {
        Self::new(DEFAULT_Q1, DEFAULT_Q2)
    }
}

impl ComCtrlZ {
    pub fn new(q1: f64, q2: f64) -> Self {
        Self { q1, q2 }
    }

    pub fn q1(&self) -> f64 {
        self.q1
    }

    pub fn q2(&self) -> f64 {
        self.q2
    }

    pub fn set_q1(&mut self, q1: f64) -> &mut Self {
        self.q1 = q1;
        self
    }

    pub fn set_q2(&mut self, q2: f64) -> &mut Self {
        self.q2 = q2;
        self
    }

    /// Desired vertical reaction force.
    pub fn des_react_force(
        &self,
        ref_com_position: &Vector3<f64>,
        com_position: &Vector3<f64>,
        com_velocity: &Vector3<f64>,
        mass: f64,
    ) -> f64 {
        formula::des_react_force_z(
            com_position[2],
            com_velocity[2],
            ref_com_position[2],
            self.q1,
            self.q2,
            mass,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::com_ctrl::G;

    #[test]
    fn test_defaults() {
        let x = ComCtrlX::default();
        assert_eq!((x.q1(), x.q2()), (1.0, 1.0));

        let y = ComCtrlY::default();
        assert_eq!((y.q1(), y.q2()), (1.0, 1.0));
        assert_eq!((y.rho(), y.dist(), y.kr()), (0.0, 0.0, 1.0));

        let z = ComCtrlZ::default();
        assert_eq!((z.q1(), z.q2()), (1.0, 1.0));
    }

    #[test]
    fn test_setters() {
        let mut x = ComCtrlX::default();
        x.set_q1(1.2).set_q2(0.8);
        assert_eq!((x.q1(), x.q2()), (1.2, 0.8));

        let mut y = ComCtrlY::new(2.0, 3.0);
        y.set_rho(-1.0).set_dist(0.1).set_kr(0.5);
        assert_eq!((y.q1(), y.q2()), (2.0, 3.0));
        assert_eq!((y.rho(), y.dist(), y.kr()), (-1.0, 0.1, 0.5));
    }

    #[test]
    fn test_axis_selection() {
        let r = Vector3::new(1.0, 0.5, 1.0);
        let vr = Vector3::zeros();
        let p = Vector3::new(3.0, 1.0, 1.0);
        let v = Vector3::new(-1.0, 0.0, 0.0);

        assert_eq!(ComCtrlX::default().des_zmp_pos(&r, &vr, &p, &v, 1.0), 3.0);
        assert_eq!(ComCtrlY::default().des_zmp_pos(&r, &vr, &p, &v, 1.0), 1.5);
        assert_eq!(ComCtrlZ::default().des_react_force(&r, &p, &v, 1.0), G);
    }
}
