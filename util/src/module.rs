//! Module interfaces
//!
//! Each model and controller in `biped_lib` shall implement the items in this
//! module which apply to it. Models only step, controllers step and also
//! expose their references and outputs.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::cell::{Ref, RefMut};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Something advanced by a fixed time step once per cycle.
pub trait Steppable {
    /// The current time step.
    ///
    /// Units: seconds
    fn time_step(&self) -> f64;

    /// Set the time step used by subsequent calls to `update`.
    fn set_time_step(&mut self, time_step: f64);

    /// Advance by one time step.
    ///
    /// # Outputs
    /// - `true` if the step succeeded, `false` if it was rejected, in which
    ///   case no state has been advanced.
    fn update(&mut self) -> bool;

    /// Set the time step and advance by one step.
    fn update_dt(&mut self, time_step: f64) -> bool {
        self.set_time_step(time_step);
        self.update()
    }
}

/// A controller driven by a block of reference values.
pub trait HasReferences {
    /// The reference block.
    type Refs;

    /// Borrow the references.
    fn refs(&self) -> Ref<'_, Self::Refs>;

    /// Mutably borrow the references.
    fn refs_mut(&self) -> RefMut<'_, Self::Refs>;
}

/// A controller publishing a block of outputs after each successful update.
pub trait HasOutputs {
    /// The output block.
    type Outputs;

    /// Borrow the outputs.
    fn outputs(&self) -> Ref<'_, Self::Outputs>;
}
