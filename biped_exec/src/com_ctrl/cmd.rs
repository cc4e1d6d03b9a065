//! Commands and resolved inputs of the COM controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// Internal
use super::{DEFAULT_Q1, DEFAULT_Q2};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Commands given to the COM controller.
///
/// Every field is an optional override. A field left as `None` resolves to
/// its default on every tick, never to the value used on the previous tick.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComCtrlCommands {
    /// Reference COM position.
    ///
    /// Units: meters
    pub xd: Option<f64>,
    pub yd: Option<f64>,
    pub zd: Option<f64>,

    /// Reference COM velocity.
    ///
    /// Units: meters/second
    pub vxd: Option<f64>,
    pub vyd: Option<f64>,

    pub qx1: Option<f64>,
    pub qx2: Option<f64>,
    pub qy1: Option<f64>,
    pub qy2: Option<f64>,
    pub qz1: Option<f64>,
    pub qz2: Option<f64>,

    /// Height of the virtual horizontal plane the ZMP lies on.
    ///
    /// Units: meters
    pub vhp: Option<f64>,
}

/// Values consumed by one tick of the COM controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComCtrlInputs {
    pub com_position: Vector3<f64>,
    pub com_velocity: Vector3<f64>,
    pub qx1: f64,
    pub qx2: f64,
    pub qy1: f64,
    pub qy2: f64,
    pub qz1: f64,
    pub qz2: f64,
    pub vhp: f64,
}

/// Values used for commands which are not given.
#[derive(Debug, Clone, PartialEq)]
pub struct ComCtrlDefaults {
    pub com_position: Vector3<f64>,
    pub com_velocity: Vector3<f64>,
    pub qx1: f64,
    pub qx2: f64,
    pub qy1: f64,
    pub qy2: f64,
    pub qz1: f64,
    pub qz2: f64,
    pub vhp: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ComCtrlCommands {
    /// Unset every command.
    pub fn clear(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }

    /// Command the whole reference COM position.
    pub fn set_com_position(&mut self, com_position: Vector3<f64>) -> &mut Self {
        self.xd = Some(com_position[0]);
        self.yd = Some(com_position[1]);
        self.zd = Some(com_position[2]);
        self
    }

    /// Command some components of the reference COM position, unsetting the
    /// others.
    pub fn set_com_position_opt(
        &mut self,
        xd: Option<f64>,
        yd: Option<f64>,
        zd: Option<f64>,
    ) -> &mut Self {
        self.xd = xd;
        self.yd = yd;
        self.zd = zd;
        self
    }

    /// Command the horizontal reference COM velocity.
    pub fn set_com_velocity(&mut self, vxd: Option<f64>, vyd: Option<f64>) -> &mut Self {
        self.vxd = vxd;
        self.vyd = vyd;
        self
    }
}

impl Default for ComCtrlInputs {
    fn default() -> Self {
        resolve(&ComCtrlCommands::default(), &ComCtrlDefaults::default())
    }
}

impl Default for ComCtrlDefaults {
    fn default() -> Self {
        Self::with_com_position(Vector3::new(0.0, 0.0, super::DEFAULT_COM_HEIGHT))
    }
}

impl ComCtrlDefaults {
    /// Defaults holding the COM still at `com_position`.
    pub fn with_com_position(com_position: Vector3<f64>) -> Self {
        Self {
            com_position,
            com_velocity: Vector3::zeros(),
            qx1: DEFAULT_Q1,
            qx2: DEFAULT_Q2,
            qy1: DEFAULT_Q1,
            qy2: DEFAULT_Q2,
            qz1: DEFAULT_Q1,
            qz2: DEFAULT_Q2,
            vhp: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Resolve the commands into the inputs of one tick.
pub fn resolve(commands: &ComCtrlCommands, defaults: &ComCtrlDefaults) -> ComCtrlInputs {
    let c = commands;
    let d = defaults;

    ComCtrlInputs {
        com_position: Vector3::new(
            c.xd.unwrap_or(d.com_position[0]),
            c.yd.unwrap_or(d.com_position[1]),
            c.zd.unwrap_or(d.com_position[2]),
        ),
        com_velocity: Vector3::new(
            c.vxd.unwrap_or(d.com_velocity[0]),
            c.vyd.unwrap_or(d.com_velocity[1]),
            d.com_velocity[2],
        ),
        qx1: c.qx1.unwrap_or(d.qx1),
        qx2: c.qx2.unwrap_or(d.qx2),
        qy1: c.qy1.unwrap_or(d.qy1),
        qy2: c.qy2.unwrap_or(d.qy2),
        qz1: c.qz1.unwrap_or(d.qz1),
        qz2: c.qz2.unwrap_or(d.qz2),
        vhp: c.vhp.unwrap_or(d.vhp),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let defaults = ComCtrlDefaults::with_com_position(Vector3::new(0.0, 0.1, 0.42));
        let inputs = resolve(&ComCtrlCommands::default(), &defaults);

        assert_eq!(inputs.com_position, Vector3::new(0.0, 0.1, 0.42));
        assert_eq!(inputs.com_velocity, Vector3::zeros());
        assert_eq!((inputs.qx1, inputs.qx2), (1.0, 1.0));
        assert_eq!((inputs.qy1, inputs.qy2), (1.0, 1.0));
        assert_eq!((inputs.qz1, inputs.qz2), (1.0, 1.0));
        assert_eq!(inputs.vhp, 0.0);
    }

    #[test]
    fn test_resolve_overrides() {
        let defaults = ComCtrlDefaults::default();
        let mut cmds = ComCtrlCommands::default();
        cmds.set_com_position_opt(Some(0.2), None, Some(0.9));
        cmds.set_com_velocity(None, Some(-0.1));
        cmds.qy2 = Some(2.0);
        cmds.vhp = Some(0.05);

        let inputs = resolve(&cmds, &defaults);
        assert_eq!(inputs.com_position, Vector3::new(0.2, 0.0, 0.9));
        assert_eq!(inputs.com_velocity, Vector3::new(0.0, -0.1, 0.0));
        assert_eq!(inputs.qy2, 2.0);
        assert_eq!(inputs.qy1, 1.0);
        assert_eq!(inputs.vhp, 0.05);
    }

    #[test]
    fn test_unset_commands_do_not_persist() {
        let defaults = ComCtrlDefaults::default();
        let mut cmds = ComCtrlCommands::default();

        cmds.set_com_position(Vector3::new(1.0, 2.0, 3.0));
        cmds.qx1 = Some(5.0);
        assert_eq!(resolve(&cmds, &defaults).qx1, 5.0);

        cmds.clear();
        let inputs = resolve(&cmds, &defaults);
        assert_eq!(inputs.com_position, defaults.com_position);
        assert_eq!(inputs.qx1, DEFAULT_Q1);
        assert_eq!(cmds, ComCtrlCommands::default());
    }
}
