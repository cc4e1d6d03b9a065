//! # Biped library.
//!
//! The mathematical control core of a biped robot: a COM-ZMP inverted
//! pendulum model, the COM-guided controller driving it and PD controlled
//! point masses for the feet, all wired together through shared datasets.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Biped controller - COM controller plus one PD controller per foot
pub mod biped_ctrl;

/// COM controller module - computes the ZMP and reaction force which bring the COM to its reference
pub mod com_ctrl;

/// Generic control module - point mass model, RK4 solver and PD controller
pub mod ctrl;

/// Dataset - index addressed groups of shared data blocks
pub mod dataset;

/// Diagnostics - error type of the control core and the sinks receiving it
pub mod diag;
