//! Main swerve drive executable entry point.
//!
//! # Architecture
//!
//! The executable drives a simulated drivetrain from a command script:
//!
//!     - Initialise the session, logging and parameters
//!     - Main loop:
//!         - Collect the script commands due this cycle
//!         - Driver aids (heading lock, position hold)
//!         - Drive control processing
//!         - Archive drive control data
//!         - Step the simulation
//!
//! The script path is the only argument.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, trace, warn};
use serde::Deserialize;
use std::collections::VecDeque;
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use swerve_lib::{
    drive_ctrl::{InputData, Params, NUM_MODULES},
    driver_aids::{self, DriverAids, ScriptCmd},
    sim::SimRig,
};
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingCmds, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the executable and its simulation.
#[derive(Debug, Deserialize)]
struct ExecParams {
    /// Target period of one cycle.
    ///
    /// Units: seconds
    cycle_period_s: f64,

    /// Steering rotation per cycle of the simulated steer actuators.
    ///
    /// Units: degrees
    steer_slew_deg: f64,

    /// Chassis rotation per cycle at full spin.
    ///
    /// Units: degrees
    spin_rate_deg: f64,

    /// Chassis rotation per cycle while driving, from wheel scrub.
    ///
    /// Units: degrees
    drift_deg: f64,

    /// Chassis travel per cycle at full wheel speed.
    ///
    /// Units: meters
    travel_per_cycle_m: f64,

    /// Steering positions of the simulated modules at startup.
    start_positions_deg: [f64; NUM_MODULES],

    /// Reference sensor readings of the simulated modules.
    reference_readings: [f64; NUM_MODULES],

    driver: driver_aids::Params,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    let session =
        Session::new("swerve_exec", "sessions").wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Trace, &["swerve_lib::sim"], &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Swerve Drive Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: ExecParams =
        util::params::load("swerve_exec.toml").wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- LOAD SCRIPT ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    if args.len() != 2 {
        return Err(eyre!("Expected a single argument, the path to a script"));
    }

    info!("Loading script from \"{}\"", &args[1]);

    let mut script: ScriptInterpreter<ScriptCmd> =
        ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} commands\n",
        script.get_duration(),
        script.get_num_cmds()
    );

    // ---- INITIALISE MODULES ----

    let mut rig = SimRig::new(
        Params::default(),
        exec_params.start_positions_deg,
        exec_params.reference_readings,
        exec_params.steer_slew_deg,
    )
    .wrap_err("Failed to build the simulated drivetrain")?;

    rig.ctrl
        .init("drive_ctrl.toml", &session)
        .wrap_err("Failed to initialise DriveCtrl")?;

    let mut aids = DriverAids::new(exec_params.driver);

    info!("Init complete\n");

    // ---- MAIN LOOP ----

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);

    let mut queue: VecDeque<ScriptCmd> = VecDeque::new();

    info!("Begining main loop\n");

    loop {
        let cycle_start_instant = Instant::now();

        // ---- COMMANDS ----

        match script.get_pending() {
            PendingCmds::None => (),
            PendingCmds::Some(cmds) => queue.extend(cmds),
            PendingCmds::EndOfScript if queue.is_empty() => {
                info!("End of script reached, stopping");
                break;
            }
            PendingCmds::EndOfScript => (),
        }

        // ---- DRIVER AIDS ----

        let cmd = aids.cycle_cmd(queue.pop_front(), rig.ctrl.heading(), rig.position());

        // ---- DRIVE CONTROL ----

        let (output, report) = rig
            .ctrl
            .proc(&InputData { cmd })
            .wrap_err("Error during DriveCtrl processing")?;

        if report.speed_scaling_skipped {
            debug!("Module speeds unscaled this cycle: {:?}", output.drv_speed);
        }

        if let Err(e) = rig.ctrl.write() {
            warn!("Could not archive DriveCtrl data: {}", e);
        }

        // ---- SIMULATION ----

        rig.step();

        let spin = rig.ctrl.current_cmd().map(|c| c.spin()).unwrap_or(0.0);
        let moving = output.drv_speed.iter().any(|s| *s != 0.0);
        let mut rotation_deg = 0.0;
        if moving {
            rotation_deg += spin * exec_params.spin_rate_deg + exec_params.drift_deg;
        }
        rig.move_chassis(exec_params.travel_per_cycle_m, rotation_deg);

        trace!("Chassis position {:?} m", rig.position());

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
            ),
        }
    }

    // ---- SHUTDOWN ----

    info!("End of execution");

    Ok(())
}
