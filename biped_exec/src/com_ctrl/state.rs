//! Implementations for the ComCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::Vector3;
use serde::Serialize;
use std::cell::{Ref, RefMut};
use std::rc::Rc;

// Internal
use super::{
    formula, resolve, ComCtrlCommands, ComCtrlDefaults, ComCtrlInputs, ComCtrlParams, ComCtrlX,
    ComCtrlY, ComCtrlZ, ComZmpModel, ComZmpModelData,
};
use crate::{
    dataset::{Dataset, Shared},
    diag::{CtrlError, DiagnosticSink},
    subdata,
};
use util::module::{HasOutputs, HasReferences, Steppable};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Outputs of the COM controller, published after each successful tick.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ComCtrlOutputs {
    pub com_position: Vector3<f64>,
    pub com_velocity: Vector3<f64>,
    pub com_acceleration: Vector3<f64>,
    pub zmp_position: Vector3<f64>,
    pub reaction_force: Vector3<f64>,
    pub zeta: f64,
}

/// Dataset of the COM controller: model states, inputs, outputs, commands.
pub type ComCtrlData = Dataset<(
    Shared<ComZmpModelData>,
    Shared<ComCtrlInputs>,
    Shared<ComCtrlOutputs>,
    Shared<ComCtrlCommands>,
)>;

/// COM controller.
///
/// Each tick resolves the commands, computes the vertical reaction force and
/// the ZMP which bring the COM to the reference and feeds both to the
/// COM-ZMP model.
pub struct ComCtrl {
    data: ComCtrlData,
    model: ComZmpModel,

    x: ComCtrlX,
    y: ComCtrlY,
    z: ComCtrlZ,

    defaults: ComCtrlDefaults,
}

/// One flat row of the COM controller archive.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct ComCtrlRecord {
    pub time_s: f64,
    pub com_x_m: f64,
    pub com_y_m: f64,
    pub com_z_m: f64,
    pub com_vx_ms: f64,
    pub com_vy_ms: f64,
    pub com_vz_ms: f64,
    pub com_ax_mss: f64,
    pub com_ay_mss: f64,
    pub com_az_mss: f64,
    pub zmp_x_m: f64,
    pub zmp_y_m: f64,
    pub zmp_z_m: f64,
    pub fz_n: f64,
    pub zeta: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ComCtrl {
    fn default() -> Self {
        Self::new()
    }
}

impl ComCtrl {
    /// Create a controller holding a default model still.
    pub fn new() -> Self {
        Self::from_data(ComCtrlData::new())
    }

    /// Create a controller from its parameters.
    pub fn with_params(params: &ComCtrlParams) -> Self {
        let mut ctrl = Self::new();
        ctrl.apply_params(params);
        ctrl
    }

    /// Create a controller viewing an existing dataset.
    ///
    /// The model views block 0. The current COM position becomes the initial
    /// and default reference position.
    pub fn from_data(data: ComCtrlData) -> Self {
        let model = ComZmpModel::from_data(subdata!(data; 0));
        let defaults = ComCtrlDefaults::with_com_position(model.initial_com_position());

        let ctrl = Self {
            data,
            model,
            x: ComCtrlX::default(),
            y: ComCtrlY::default(),
            z: ComCtrlZ::default(),
            defaults,
        };
        ctrl.data.set::<1>(resolve(&ctrl.commands(), &ctrl.defaults));
        ctrl.publish_states();
        ctrl
    }

    /// Apply a parameter set, resetting the COM to the initial position.
    pub fn apply_params(&mut self, params: &ComCtrlParams) -> &mut Self {
        self.model.set_mass(params.mass_kg);
        self.set_time_step(params.time_step_s);

        let d = &mut self.defaults;
        d.qx1 = params.qx1;
        d.qx2 = params.qx2;
        d.qy1 = params.qy1;
        d.qy2 = params.qy2;
        d.qz1 = params.qz1;
        d.qz2 = params.qz2;
        d.vhp = params.vhp_m;

        self.y
            .set_rho(params.rho)
            .set_dist(params.dist_m)
            .set_kr(params.kr);

        self.reset(Vector3::from(params.initial_com_position_m))
    }

    /// Replace the diagnostic sink.
    pub fn set_diagnostics(&mut self, diag: Rc<dyn DiagnosticSink>) -> &mut Self {
        self.model.set_diagnostics(diag);
        self
    }

    pub fn data(&self) -> &ComCtrlData {
        &self.data
    }

    pub fn model(&self) -> &ComZmpModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut ComZmpModel {
        &mut self.model
    }

    pub fn states(&self) -> Ref<'_, ComZmpModelData> {
        self.data.get::<0>()
    }

    /// Inputs resolved on the last tick.
    pub fn inputs(&self) -> Ref<'_, ComCtrlInputs> {
        self.data.get::<1>()
    }

    pub fn commands(&self) -> Ref<'_, ComCtrlCommands> {
        self.data.get::<3>()
    }

    pub fn commands_mut(&self) -> RefMut<'_, ComCtrlCommands> {
        self.data.get_mut::<3>()
    }

    pub fn x(&self) -> &ComCtrlX {
        &self.x
    }

    pub fn y(&self) -> &ComCtrlY {
        &self.y
    }

    pub fn z(&self) -> &ComCtrlZ {
        &self.z
    }

    /// The lateral axis, to adjust the swing parameters.
    ///
    /// The feedback gains are overwritten from the inputs on every tick.
    pub fn y_mut(&mut self) -> &mut ComCtrlY {
        &mut self.y
    }

    pub fn defaults(&self) -> &ComCtrlDefaults {
        &self.defaults
    }

    pub fn defaults_mut(&mut self) -> &mut ComCtrlDefaults {
        &mut self.defaults
    }

    pub fn initial_com_position(&self) -> Vector3<f64> {
        self.model.initial_com_position()
    }

    /// Simulated time since the last reset.
    ///
    /// Units: seconds
    pub fn time(&self) -> f64 {
        self.model.time()
    }

    /// Move the COM to `com_position` at rest and make it the default
    /// reference.
    pub fn reset(&mut self, com_position: Vector3<f64>) -> &mut Self {
        debug!("Resetting COM controller to {:?}", com_position);

        self.defaults.com_position = com_position;
        self.model.reset_to(com_position);
        self.data.set::<1>(resolve(&self.commands(), &self.defaults));
        self.publish_states();
        self
    }

    /// Overwrite the model state with measured values.
    pub fn feedback(&mut self, com_position: Vector3<f64>, com_velocity: Vector3<f64>) -> &mut Self {
        self.model
            .set_com_position(com_position)
            .set_com_velocity(com_velocity);
        self
    }

    /// Perform one control tick.
    ///
    /// The outputs are only written if the whole tick succeeds.
    pub fn try_update(&mut self) -> Result<(), CtrlError> {
        // Resolve the commands for this tick
        let inputs = resolve(&self.commands(), &self.defaults);
        self.data.set::<1>(inputs.clone());

        self.x.set_q1(inputs.qx1).set_q2(inputs.qx2);
        self.y.set_q1(inputs.qy1).set_q2(inputs.qy2);
        self.z.set_q1(inputs.qz1).set_q2(inputs.qz2);

        let (mass, p, v, zz) = {
            let s = self.states();
            (s.mass, s.com_position, s.com_velocity, s.zmp_position[2])
        };

        // Zeta is taken about the ZMP the model currently holds
        let fz = self.z.des_react_force(&inputs.com_position, &p, &v, mass);
        let zeta = formula::try_des_zeta(p[2], zz, fz, mass)?;

        let zmp_position = Vector3::new(
            self.x.des_zmp_pos(&inputs.com_position, &inputs.com_velocity, &p, &v, zeta),
            self.y.des_zmp_pos(&inputs.com_position, &inputs.com_velocity, &p, &v, zeta),
            inputs.vhp,
        );
        let reaction_force = Vector3::new(0.0, 0.0, fz);

        self.model
            .set_reaction_force(reaction_force)
            .set_zmp_position(zmp_position);
        self.model.try_update()?;

        let out = {
            let s = self.states();
            ComCtrlOutputs {
                com_position: s.com_position,
                com_velocity: s.com_velocity,
                com_acceleration: s.com_acceleration,
                zmp_position,
                reaction_force,
                zeta,
            }
        };
        self.data.set::<2>(out);

        Ok(())
    }

    /// Flatten the current outputs into an archive row.
    pub fn record(&self) -> ComCtrlRecord {
        let o = self.outputs();

        ComCtrlRecord {
            time_s: self.time(),
            com_x_m: o.com_position[0],
            com_y_m: o.com_position[1],
            com_z_m: o.com_position[2],
            com_vx_ms: o.com_velocity[0],
            com_vy_ms: o.com_velocity[1],
            com_vz_ms: o.com_velocity[2],
            com_ax_mss: o.com_acceleration[0],
            com_ay_mss: o.com_acceleration[1],
            com_az_mss: o.com_acceleration[2],
            zmp_x_m: o.zmp_position[0],
            zmp_y_m: o.zmp_position[1],
            zmp_z_m: o.zmp_position[2],
            fz_n: o.reaction_force[2],
            zeta: o.zeta,
        }
    }

    /// Copy the model state into the outputs.
    fn publish_states(&self) {
        let out = {
            let s = self.states();
            ComCtrlOutputs {
                com_position: s.com_position,
                com_velocity: s.com_velocity,
                com_acceleration: s.com_acceleration,
                zmp_position: s.zmp_position,
                reaction_force: s.reaction_force,
                zeta: 0.0,
            }
        };
        self.data.set::<2>(out);
    }
}

impl Steppable for ComCtrl {
    fn time_step(&self) -> f64 {
        self.model.time_step()
    }

    fn set_time_step(&mut self, time_step: f64) {
        self.model.set_time_step(time_step);
    }

    fn update(&mut self) -> bool {
        match self.try_update() {
            Ok(()) => true,
            Err(e) => {
                self.model.diagnostics().report(&e);
                false
            }
        }
    }
}

impl HasReferences for ComCtrl {
    type Refs = ComCtrlCommands;

    fn refs(&self) -> Ref<'_, ComCtrlCommands> {
        self.commands()
    }

    fn refs_mut(&self) -> RefMut<'_, ComCtrlCommands> {
        self.commands_mut()
    }
}

impl HasOutputs for ComCtrl {
    type Outputs = ComCtrlOutputs;

    fn outputs(&self) -> Ref<'_, ComCtrlOutputs> {
        self.data.get::<2>()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{com_ctrl::G, diag::RecordingSink};

    #[test]
    fn test_defaults() {
        let ctrl = ComCtrl::new();

        assert_eq!(ctrl.states().com_position, Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(ctrl.initial_com_position(), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(ctrl.outputs().com_position, Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(ctrl.inputs().com_position, Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(*ctrl.commands(), ComCtrlCommands::default());
        assert_eq!(ctrl.time_step(), 0.001);
    }

    #[test]
    fn test_rest_is_held() {
        let mut ctrl = ComCtrl::new();

        for _ in 0..100 {
            assert!(ctrl.update());
        }

        let o = ctrl.outputs();
        assert!((o.com_position - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
        assert!(o.com_velocity.norm() < 1e-12);
        assert!((o.reaction_force[2] - G).abs() < 1e-12);
        assert!((o.zeta - G.sqrt()).abs() < 1e-12);
        assert_eq!(o.zmp_position, Vector3::zeros());
    }

    #[test]
    fn test_move_toward_reference() {
        let mut ctrl = ComCtrl::new();
        ctrl.commands_mut().set_com_position_opt(Some(-1.0), Some(-0.5), None);

        let mut last = ctrl.outputs().clone();
        for _ in 0..10 {
            assert!(ctrl.update_dt(0.001));
            let o = ctrl.outputs().clone();

            let speed = o.com_velocity.xy().norm();
            assert!(speed > last.com_velocity.xy().norm());
            assert!(o.com_position[0] < last.com_position[0]);
            assert!(o.com_position[1] < last.com_position[1]);
            assert!(o.com_position[0] > -1.0);
            assert!(o.com_position[1] > -0.5);

            // The ZMP leads the COM on the far side of the reference
            assert!(o.zmp_position[0] > o.com_position[0]);
            assert!(o.zmp_position[1] > o.com_position[1]);

            last = o;
        }

        assert!((ctrl.time() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_commands_are_not_persistent() {
        let mut ctrl = ComCtrl::new();

        ctrl.commands_mut().qx1 = Some(3.0);
        ctrl.commands_mut().set_com_velocity(Some(0.1), None);
        assert!(ctrl.update());
        assert_eq!(ctrl.inputs().qx1, 3.0);
        assert_eq!(ctrl.x().q1(), 3.0);
        assert_eq!(ctrl.inputs().com_velocity[0], 0.1);

        ctrl.commands_mut().clear();
        assert!(ctrl.update());
        assert_eq!(ctrl.inputs().qx1, 1.0);
        assert_eq!(ctrl.x().q1(), 1.0);
        assert_eq!(ctrl.inputs().com_velocity[0], 0.0);
    }

    #[test]
    fn test_virtual_horizontal_plane() {
        let mut ctrl = ComCtrl::new();
        ctrl.refs_mut().vhp = Some(0.1);

        // The plane reaches the model on this tick, zeta still uses the old ZMP
        assert!(ctrl.update());
        assert_eq!(ctrl.outputs().zmp_position[2], 0.1);
        assert_eq!(ctrl.states().zmp_position[2], 0.1);
        assert!((ctrl.outputs().zeta - G.sqrt()).abs() < 1e-12);

        let (p, v) = (ctrl.states().com_position, ctrl.states().com_velocity);
        let fz = formula::des_react_force_z(p[2], v[2], 1.0, 1.0, 1.0, 1.0);

        assert!(ctrl.update());
        let o = ctrl.outputs();
        assert_eq!(o.zmp_position[2], 0.1);
        assert!((o.zeta - (fz / (p[2] - 0.1)).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_zeta_about_model_zmp() {
        let mut ctrl = ComCtrl::new();
        ctrl.model_mut().set_zmp_position(Vector3::new(0.0, 0.0, 0.5));

        assert!(ctrl.update());
        assert!((ctrl.outputs().zeta - (G / 0.5).sqrt()).abs() < 1e-12);
        assert_eq!(ctrl.outputs().zmp_position[2], 0.0);
    }

    #[test]
    fn test_model_failure_keeps_outputs() {
        let sink = Rc::new(RecordingSink::default());
        let mut ctrl = ComCtrl::new();
        ctrl.set_diagnostics(sink.clone());

        assert!(ctrl.update());
        let before = ctrl.outputs().clone();
        let time = ctrl.time();

        // Zeta is defined above a sunken ZMP but the model needs a positive
        // COM height
        ctrl.refs_mut().vhp = Some(-0.5);
        ctrl.model_mut().set_zmp_position(Vector3::new(0.0, 0.0, -0.5));
        ctrl.feedback(Vector3::zeros(), Vector3::zeros());

        assert!(!ctrl.update());
        assert_eq!(*ctrl.outputs(), before);
        assert_eq!(ctrl.time(), time);
        assert_eq!(ctrl.states().com_position, Vector3::zeros());
        assert_eq!(ctrl.states().zmp_position[2], -0.5);
        assert_eq!(sink.take(), vec![CtrlError::DegenerateComHeight(0.0)]);

        assert!(matches!(
            ctrl.try_update(),
            Err(CtrlError::DegenerateComHeight(_))
        ));
    }

    #[test]
    fn test_degenerate_height_fails() {
        let sink = Rc::new(RecordingSink::default());
        let mut ctrl = ComCtrl::new();
        ctrl.set_diagnostics(sink.clone());

        assert!(ctrl.update());
        let before = ctrl.outputs().clone();

        ctrl.feedback(Vector3::new(0.0, 0.0, 0.0), Vector3::zeros());
        assert!(!ctrl.update());
        assert_eq!(*ctrl.outputs(), before);

        let reports = sink.take();
        assert_eq!(reports.len(), 1);
        assert!(matches!(reports[0], CtrlError::DegenerateZeta { .. }));

        assert!(ctrl.try_update().is_err());
    }

    #[test]
    fn test_reset_and_feedback() {
        let mut ctrl = ComCtrl::new();
        ctrl.commands_mut().xd = Some(0.2);
        for _ in 0..10 {
            ctrl.update();
        }

        ctrl.reset(Vector3::new(0.0, 0.1, 0.8));
        assert_eq!(ctrl.states().com_position, Vector3::new(0.0, 0.1, 0.8));
        assert_eq!(ctrl.states().com_velocity, Vector3::zeros());
        assert_eq!(ctrl.defaults().com_position, Vector3::new(0.0, 0.1, 0.8));
        assert_eq!(ctrl.time(), 0.0);

        ctrl.commands_mut().clear();
        ctrl.update();
        assert_eq!(ctrl.inputs().com_position, Vector3::new(0.0, 0.1, 0.8));

        ctrl.feedback(Vector3::new(0.01, 0.1, 0.8), Vector3::new(0.1, 0.0, 0.0));
        assert_eq!(ctrl.model().com_position(), Vector3::new(0.01, 0.1, 0.8));
        assert_eq!(ctrl.model().com_velocity(), Vector3::new(0.1, 0.0, 0.0));
    }

    #[test]
    fn test_invalid_time_step() {
        let sink = Rc::new(RecordingSink::default());
        let mut ctrl = ComCtrl::new();
        ctrl.set_diagnostics(sink.clone());

        ctrl.set_time_step(-1.0);
        assert_eq!(ctrl.time_step(), 0.001);
        assert_eq!(sink.take(), vec![CtrlError::InvalidTimeStep(-1.0)]);
    }

    #[test]
    fn test_with_params() {
        let params = ComCtrlParams {
            mass_kg: 2.0,
            time_step_s: 0.005,
            initial_com_position_m: [0.0, 0.0, 0.5],
            qx1: 1.5,
            dist_m: 0.1,
            rho: 1.0,
            ..Default::default()
        };
        let mut ctrl = ComCtrl::with_params(&params);

        assert_eq!(ctrl.states().mass, 2.0);
        assert_eq!(ctrl.time_step(), 0.005);
        assert_eq!(ctrl.initial_com_position(), Vector3::new(0.0, 0.0, 0.5));
        assert_eq!(ctrl.y().dist(), 0.1);

        assert!(ctrl.update());
        assert_eq!(ctrl.inputs().qx1, 1.5);

        // Swinging to the left shifts the ZMP by rho * kr * dist
        assert!((ctrl.outputs().zmp_position[1] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_record() {
        let mut ctrl = ComCtrl::new();
        ctrl.update();

        let r = ctrl.record();
        assert_eq!(r.time_s, 0.001);
        assert_eq!(r.com_z_m, ctrl.outputs().com_position[2]);
        assert_eq!(r.fz_n, ctrl.outputs().reaction_force[2]);
        assert_eq!(r.zeta, ctrl.outputs().zeta);
    }

    #[test]
    fn test_shared_dataset() {
        let data = ComCtrlData::new();
        let mut ctrl = ComCtrl::from_data(data.clone());

        data.get_mut::<3>().xd = Some(0.1);
        assert!(ctrl.update());
        assert_eq!(data.get::<1>().com_position[0], 0.1);
        assert_eq!(*data.get::<2>(), *ctrl.outputs());
        assert!(ctrl.model().dataset().shares::<_, 0, 0>(&data));
    }
}
