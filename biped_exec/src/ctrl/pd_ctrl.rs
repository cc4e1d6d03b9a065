//! PD controller
//!
//! Drives a point mass towards a reference position and velocity with a
//! per-axis spring-damper force.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefMut};
use std::rc::Rc;

// Internal
use super::{PointMassModel, PointMassModelData};
use crate::{
    dataset::{Dataset, Shared},
    diag::DiagnosticSink,
    subdata,
};
use util::module::{HasOutputs, HasReferences, Steppable};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// References of a PD controller.
///
/// Stiffness and damping are per-axis gains.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdCtrlRefs {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub stiffness: Vector3<f64>,
    pub damping: Vector3<f64>,
}

/// Outputs of a PD controller.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct PdCtrlOutputs {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub acceleration: Vector3<f64>,
    pub force: Vector3<f64>,
}

/// Dataset of a PD controller: model states, references, outputs.
pub type PdCtrlData =
    Dataset<(Shared<PointMassModelData>, Shared<PdCtrlRefs>, Shared<PdCtrlOutputs>)>;

/// PD controller over a point mass model.
pub struct PdCtrl {
    data: PdCtrlData,
    model: PointMassModel,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for PdCtrl {
    fn default() -> Self {
        Self::new()
    }
}

impl PdCtrl {
    /// Create a controller with its own storage, holding the mass at rest at
    /// the origin.
    pub fn new() -> Self {
        Self::from_data(PdCtrlData::new())
    }

    /// Create a controller viewing the given dataset.
    ///
    /// The model views block 0, and the references are set to hold the
    /// current state.
    pub fn from_data(data: PdCtrlData) -> Self {
        let model = PointMassModel::from_data(subdata!(data; 0));

        let mut ctrl = Self { data, model };
        ctrl.reset_refs();
        ctrl
    }

    /// Create a controller driving an existing model, sharing its state.
    pub fn from_model(model: PointMassModel) -> Self {
        let data = PdCtrlData::from_blocks((
            model.dataset().ptr::<0>(),
            Default::default(),
            Default::default(),
        ));

        let mut ctrl = Self { data, model };
        ctrl.reset_refs();
        ctrl
    }

    pub fn set_diagnostics(&mut self, diag: Rc<dyn DiagnosticSink>) -> &mut Self {
        self.model.set_diagnostics(diag);
        self
    }

    pub fn data(&self) -> &PdCtrlData {
        &self.data
    }

    pub fn model(&self) -> &PointMassModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut PointMassModel {
        &mut self.model
    }

    pub fn states(&self) -> Ref<'_, PointMassModelData> {
        self.data.get::<0>()
    }

    /// Set stiffness and damping gains.
    pub fn set_gains(&mut self, stiffness: Vector3<f64>, damping: Vector3<f64>) -> &mut Self {
        {
            let mut refs = self.data.get_mut::<1>();
            refs.stiffness = stiffness;
            refs.damping = damping;
        }
        self
    }

    /// Return the model to its initial position and hold it there.
    pub fn reset(&mut self) -> &mut Self {
        self.model.reset();
        self.reset_refs()
    }

    /// Move the model to a new initial position and hold it there.
    pub fn reset_to(&mut self, position: Vector3<f64>) -> &mut Self {
        self.model.reset_to(position);
        self.reset_refs()
    }

    fn reset_refs(&mut self) -> &mut Self {
        let (p, v) = {
            let s = self.states();
            (s.position, s.velocity)
        };
        {
            let mut refs = self.data.get_mut::<1>();
            refs.position = p;
            refs.velocity = v;
        }
        self
    }

    fn update_outputs(&mut self) {
        let out = {
            let s = self.states();
            PdCtrlOutputs {
                position: s.position,
                velocity: s.velocity,
                acceleration: s.acceleration,
                force: s.force,
            }
        };
        self.data.set::<2>(out);
    }
}

impl Steppable for PdCtrl {
    fn time_step(&self) -> f64 {
        self.model.time_step()
    }

    fn set_time_step(&mut self, time_step: f64) {
        self.model.set_time_step(time_step);
    }

    fn update(&mut self) -> bool {
        let refs = self.data.get::<1>().clone();

        let ok = self.model.update_with(|p, v, _t| {
            desired_force(
                p,
                v,
                &refs.position,
                &refs.velocity,
                &refs.stiffness,
                &refs.damping,
            )
        });
        if !ok {
            return false;
        }

        self.update_outputs();
        true
    }
}

impl HasReferences for PdCtrl {
    type Refs = PdCtrlRefs;

    fn refs(&self) -> Ref<'_, PdCtrlRefs> {
        self.data.get::<1>()
    }

    fn refs_mut(&self) -> RefMut<'_, PdCtrlRefs> {
        self.data.get_mut::<1>()
    }
}

impl HasOutputs for PdCtrl {
    type Outputs = PdCtrlOutputs;

    fn outputs(&self) -> Ref<'_, PdCtrlOutputs> {
        self.data.get::<2>()
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Spring-damper force pulling towards the reference state.
///
/// `f = k * (pd - p) + c * (vd - v)`, component-wise.
pub fn desired_force(
    position: &Vector3<f64>,
    velocity: &Vector3<f64>,
    ref_position: &Vector3<f64>,
    ref_velocity: &Vector3<f64>,
    stiffness: &Vector3<f64>,
    damping: &Vector3<f64>,
) -> Vector3<f64> {
    stiffness.component_mul(&(ref_position - position))
        + damping.component_mul(&(ref_velocity - velocity))
}
