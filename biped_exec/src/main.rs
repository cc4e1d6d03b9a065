//! Biped simulation executable entry point.
//!
//! # Architecture
//!
//! The executable drives the control core in simulation:
//!
//!     - Create the session and the logger
//!     - Load the controller parameters
//!     - Main loop, once per time step:
//!         - Step the controller
//!         - Archive the outputs
//!     - Write a summary of the run into the session directory

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;
use structopt::StructOpt;

// Internal
use biped_lib::{
    biped_ctrl::{BipedCtrl, BipedCtrlParams},
    com_ctrl::{ComCtrl, ComCtrlOutputs},
};
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    module::{HasOutputs, Steppable},
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command line options.
#[derive(Debug, StructOpt)]
#[structopt(name = "biped_exec", about = "Simulate the biped control core")]
struct Opts {
    /// Parameter file, relative to `$BIPED_SW_ROOT/params` unless it exists
    /// as given.
    #[structopt(short, long, parse(from_os_str), default_value = "biped_ctrl.toml")]
    params: PathBuf,

    /// Number of ticks to run.
    #[structopt(short = "n", long, default_value = "1000")]
    ticks: u64,

    /// Time step overriding the one in the parameter file.
    #[structopt(short = "t", long)]
    time_step: Option<f64>,

    /// Only run the COM controller.
    #[structopt(long)]
    com_only: bool,

    /// Do not archive the outputs.
    #[structopt(long)]
    no_archive: bool,
}

/// Summary of a run, written as JSON at the end of the session.
#[derive(Debug, Serialize)]
struct RunSummary {
    ticks_requested: u64,
    ticks_completed: u64,
    final_time_s: f64,
    outputs: ComCtrlOutputs,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    let session = Session::new("biped_exec", "sessions").wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Debug, Some(&session)).wrap_err("Failed to initialise logging")?;

    info!("Biped Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: BipedCtrlParams = if opts.params.exists() {
        util::params::load_path(&opts.params)
    } else {
        util::params::load(&opts.params.to_string_lossy())
    }
    .wrap_err_with(|| format!("Could not load parameters from {:?}", opts.params))?;

    info!("Parameters loaded from {:?}", opts.params);

    // ---- INITIALISE ARCHIVE ----

    let mut arch = if opts.no_archive {
        None
    } else {
        let path = if opts.com_only {
            "com_ctrl.csv"
        } else {
            "biped_ctrl.csv"
        };
        Some(Archiver::from_path(&session, path).wrap_err("Failed to create the archive")?)
    };

    // ---- MAIN LOOP ----

    let summary = if opts.com_only {
        let mut ctrl = ComCtrl::with_params(&params.com);
        if let Some(dt) = opts.time_step {
            ctrl.set_time_step(dt);
        }

        let ticks_completed = run(&mut ctrl, opts.ticks, arch.as_mut(), ComCtrl::record)?;

        let summary = RunSummary {
            ticks_requested: opts.ticks,
            ticks_completed,
            final_time_s: ctrl.time(),
            outputs: ctrl.outputs().clone(),
        };
        summary
    } else {
        let mut ctrl = BipedCtrl::with_params(&params);
        if let Some(dt) = opts.time_step {
            ctrl.set_time_step(dt);
        }

        let ticks_completed = run(&mut ctrl, opts.ticks, arch.as_mut(), BipedCtrl::record)?;

        let summary = RunSummary {
            ticks_requested: opts.ticks,
            ticks_completed,
            final_time_s: ctrl.com().time(),
            outputs: ctrl.outputs().clone(),
        };
        summary
    };

    // ---- SUMMARY ----

    info!(
        "Completed {} of {} ticks, final COM position: {:?}",
        summary.ticks_completed, summary.ticks_requested, summary.outputs.com_position
    );

    let summary_path = session.session_root.join("summary.json");
    let summary_str =
        serde_json::to_string_pretty(&summary).wrap_err("Failed to serialise the summary")?;
    std::fs::write(&summary_path, summary_str).wrap_err("Failed to write the summary")?;

    info!("End of execution");

    Ok(())
}

/// Step `ctrl` up to `ticks` times, archiving a record after each tick.
///
/// Stops at the first failed tick and returns the number of completed ticks.
fn run<C, R, F>(
    ctrl: &mut C,
    ticks: u64,
    mut arch: Option<&mut Archiver>,
    record: F,
) -> Result<u64, Report>
where
    C: Steppable,
    R: Serialize,
    F: Fn(&C) -> R,
{
    info!("Running {} ticks of {} s", ticks, ctrl.time_step());

    for i in 0..ticks {
        if !ctrl.update() {
            warn!("Tick {} failed, stopping the simulation", i);
            return Ok(i);
        }

        if let Some(a) = arch.as_mut() {
            a.serialise(record(&*ctrl))
                .wrap_err_with(|| format!("Failed to archive tick {}", i))?;
        }
    }

    Ok(ticks)
}
