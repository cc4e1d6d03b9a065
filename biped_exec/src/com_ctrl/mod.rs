//! # COM controller module
//!
//! COM-guided control of a biped modelled as a COM-ZMP inverted pendulum.
//! The per-axis laws are in [`formula`], the gains they use are held by
//! [`ComCtrlX`], [`ComCtrlY`] and [`ComCtrlZ`], and [`ComCtrl`] ties them to a
//! [`ComZmpModel`] each tick.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod axis;
mod cmd;
pub mod formula;
mod model;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use axis::*;
pub use cmd::*;
pub use model::*;
pub use params::*;
pub use state::*;
