//! # Diagnostics
//!
//! Models and controllers never abort on bad input. Invalid parameters are
//! reset to safe defaults and singular dynamics make an update fail, and in
//! both cases a [`CtrlError`] is handed to the injected [`DiagnosticSink`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use std::cell::RefCell;
use std::rc::Rc;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised by the control core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CtrlError {
    #[error("Mass must be positive (given: {0})")]
    InvalidMass(f64),

    #[error("Time step must be positive (given: {0})")]
    InvalidTimeStep(f64),

    #[error("The COM height must be positive (given: {0})")]
    DegenerateComHeight(f64),

    #[error("Zeta could not be computed from reaction force {force} at height {height}")]
    DegenerateZeta { force: f64, height: f64 },

    #[error("Division by zero while scaling a vector")]
    DivisionByZero,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A receiver of non-fatal diagnostics.
pub trait DiagnosticSink {
    fn report(&self, error: &CtrlError);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Forwards diagnostics to the logger as warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

/// Discards all diagnostics.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

/// Keeps every diagnostic it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: RefCell<Vec<CtrlError>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DiagnosticSink for LogSink {
    fn report(&self, error: &CtrlError) {
        warn!("{}", error);
    }
}

impl DiagnosticSink for SilentSink {
    fn report(&self, _error: &CtrlError) {}
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, error: &CtrlError) {
        self.records.borrow_mut().push(error.clone());
    }
}

impl RecordingSink {
    /// Take all diagnostics received so far.
    pub fn take(&self) -> Vec<CtrlError> {
        self.records.replace(Vec::new())
    }

    /// Number of diagnostics received since the last `take`.
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// The sink used when none is injected.
pub fn default_sink() -> Rc<dyn DiagnosticSink> {
    Rc::new(LogSink)
}
