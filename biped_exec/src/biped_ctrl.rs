//! # Biped controller
//!
//! Composes a COM controller and one PD controller per foot over a single
//! ten block dataset. Each sub-controller views its own blocks of the shared
//! dataset, so no value is copied between them.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::cell::Ref;
use std::rc::Rc;

// Internal
use crate::{
    com_ctrl::{
        ComCtrl, ComCtrlCommands, ComCtrlInputs, ComCtrlOutputs, ComCtrlParams, ComZmpModelData,
    },
    ctrl::{PdCtrl, PdCtrlOutputs, PdCtrlRefs, PointMassModelData, DEFAULT_MASS},
    dataset::{Dataset, Shared},
    diag::DiagnosticSink,
    subdata,
};
use util::module::{HasOutputs, Steppable};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Dataset of a biped controller.
///
/// | Index | Block              |
/// |-------|--------------------|
/// | 0     | COM-ZMP states     |
/// | 1     | Left foot states   |
/// | 2     | Right foot states  |
/// | 3     | COM inputs         |
/// | 4     | Left foot refs     |
/// | 5     | Right foot refs    |
/// | 6     | COM outputs        |
/// | 7     | Left foot outputs  |
/// | 8     | Right foot outputs |
/// | 9     | COM commands       |
pub type BipedCtrlData = Dataset<(
    Shared<ComZmpModelData>,
    Shared<PointMassModelData>,
    Shared<PointMassModelData>,
    Shared<ComCtrlInputs>,
    Shared<PdCtrlRefs>,
    Shared<PdCtrlRefs>,
    Shared<ComCtrlOutputs>,
    Shared<PdCtrlOutputs>,
    Shared<PdCtrlOutputs>,
    Shared<ComCtrlCommands>,
)>;

/// Parameters for the biped controller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BipedCtrlParams {
    pub com: ComCtrlParams,

    /// Units: kilograms
    pub foot_mass_kg: f64,

    /// Initial foot positions.
    ///
    /// Units: meters
    pub left_foot_position_m: [f64; 3],
    pub right_foot_position_m: [f64; 3],

    /// Per-axis stiffness of the foot controllers.
    ///
    /// Units: newtons/meter
    pub foot_stiffness: [f64; 3],

    /// Per-axis damping of the foot controllers.
    ///
    /// Units: newtons/(meter/second)
    pub foot_damping: [f64; 3],
}

/// Biped controller.
pub struct BipedCtrl {
    data: BipedCtrlData,
    com: ComCtrl,
    left_foot: PdCtrl,
    right_foot: PdCtrl,
}

/// One flat row of the biped controller archive.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct BipedCtrlRecord {
    pub time_s: f64,
    pub com_x_m: f64,
    pub com_y_m: f64,
    pub com_z_m: f64,
    pub zmp_x_m: f64,
    pub zmp_y_m: f64,
    pub zeta: f64,
    pub lf_x_m: f64,
    pub lf_y_m: f64,
    pub lf_z_m: f64,
    pub rf_x_m: f64,
    pub rf_y_m: f64,
    pub rf_z_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for BipedCtrlParams {
    fn default() -> Self {
        Self {
            com: ComCtrlParams::default(),
            foot_mass_kg: DEFAULT_MASS,
            left_foot_position_m: [0.0, 0.1, 0.0],
            right_foot_position_m: [0.0, -0.1, 0.0],
            foot_stiffness: [0.0; 3],
            foot_damping: [0.0; 3],
        }
    }
}

impl Default for BipedCtrl {
    fn default() -> Self {
        Self::new()
    }
}

impl BipedCtrl {
    /// Create a controller with default sub-controllers.
    pub fn new() -> Self {
        Self::from_data(BipedCtrlData::new())
    }

    /// Create a controller and apply the parameters to it.
    pub fn with_params(params: &BipedCtrlParams) -> Self {
        let mut ctrl = Self::new();
        ctrl.apply_params(params);
        ctrl
    }

    /// Create a controller viewing an existing dataset.
    pub fn from_data(data: BipedCtrlData) -> Self {
        let com = ComCtrl::from_data(subdata!(data; 0, 3, 6, 9));
        let left_foot = PdCtrl::from_data(subdata!(data; 1, 4, 7));
        let right_foot = PdCtrl::from_data(subdata!(data; 2, 5, 8));

        Self {
            data,
            com,
            left_foot,
            right_foot,
        }
    }

    /// Apply the parameters, resetting the COM and both feet.
    pub fn apply_params(&mut self, params: &BipedCtrlParams) -> &mut Self {
        self.com.apply_params(&params.com);
        let time_step = self.com.time_step();

        let stiffness = Vector3::from(params.foot_stiffness);
        let damping = Vector3::from(params.foot_damping);
        let mut feet = [
            (&mut self.left_foot, params.left_foot_position_m),
            (&mut self.right_foot, params.right_foot_position_m),
        ];

        for (foot, position) in feet.iter_mut() {
            foot.model_mut().set_mass(params.foot_mass_kg);
            foot.set_time_step(time_step);
            foot.reset_to(Vector3::from(*position));
            foot.set_gains(stiffness, damping);
        }

        debug!("Biped controller parameters applied");

        self
    }

    /// Replace the diagnostic sink of every sub-controller.
    pub fn set_diagnostics(&mut self, diag: Rc<dyn DiagnosticSink>) -> &mut Self {
        self.com.set_diagnostics(diag.clone());
        self.left_foot.set_diagnostics(diag.clone());
        self.right_foot.set_diagnostics(diag);
        self
    }

    pub fn data(&self) -> &BipedCtrlData {
        &self.data
    }

    pub fn com(&self) -> &ComCtrl {
        &self.com
    }

    pub fn com_mut(&mut self) -> &mut ComCtrl {
        &mut self.com
    }

    pub fn left_foot(&self) -> &PdCtrl {
        &self.left_foot
    }

    pub fn left_foot_mut(&mut self) -> &mut PdCtrl {
        &mut self.left_foot
    }

    pub fn right_foot(&self) -> &PdCtrl {
        &self.right_foot
    }

    pub fn right_foot_mut(&mut self) -> &mut PdCtrl {
        &mut self.right_foot
    }

    /// Reset the COM and both feet to their initial positions.
    pub fn reset(&mut self) -> &mut Self {
        let p = self.com.initial_com_position();
        self.com.reset(p);
        self.left_foot.reset();
        self.right_foot.reset();
        self
    }

    /// Flatten the current outputs into an archive row.
    pub fn record(&self) -> BipedCtrlRecord {
        let com = self.data.get::<6>();
        let lf = self.data.get::<7>();
        let rf = self.data.get::<8>();

        BipedCtrlRecord {
            time_s: self.com.time(),
            com_x_m: com.com_position[0],
            com_y_m: com.com_position[1],
            com_z_m: com.com_position[2],
            zmp_x_m: com.zmp_position[0],
            zmp_y_m: com.zmp_position[1],
            zeta: com.zeta,
            lf_x_m: lf.position[0],
            lf_y_m: lf.position[1],
            lf_z_m: lf.position[2],
            rf_x_m: rf.position[0],
            rf_y_m: rf.position[1],
            rf_z_m: rf.position[2],
        }
    }
}

impl Steppable for BipedCtrl {
    fn time_step(&self) -> f64 {
        self.com.time_step()
    }

    fn set_time_step(&mut self, time_step: f64) {
        self.com.set_time_step(time_step);
        self.left_foot.set_time_step(time_step);
        self.right_foot.set_time_step(time_step);
    }

    /// Step the COM controller then both feet.
    ///
    /// If the COM controller fails the feet are not stepped.
    fn update(&mut self) -> bool {
        self.com.update() && self.left_foot.update() && self.right_foot.update()
    }
}

impl HasOutputs for BipedCtrl {
    type Outputs = ComCtrlOutputs;

    /// Outputs of the COM controller.
    fn outputs(&self) -> Ref<'_, ComCtrlOutputs> {
        self.com.outputs()
    }
}
