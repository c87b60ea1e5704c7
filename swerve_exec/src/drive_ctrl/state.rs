//! Implementations for the DriveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace};
use serde::Serialize;

// Internal
use super::{DriveCmd, DriveCtrlError, ModuleGeometry, Params, NUM_MODULES};
use crate::eqpt::{DriveActuator, HeadingSensor, ReferenceSensor, SteerActuator};
use crate::swerve_module::{Polarity, SwerveModule};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state
pub struct DriveCtrl<S, D, R, H> {
    pub(crate) params: Params,
    pub(crate) geometry: ModuleGeometry,

    pub(crate) modules: [SwerveModule<S, D, R>; NUM_MODULES],
    pub(crate) heading_sensor: H,

    pub(crate) current_cmd: Option<DriveCmd>,

    /// True while an alignment is in progress
    pub(crate) aligning: bool,

    pub(crate) report: StatusReport,

    num_cycles: u64,
    arch: Option<DriveCtrlArchives>,
}

/// Input data to drive control.
#[derive(Default)]
pub struct InputData {
    /// The command to be executed, or `None` if there is no new command on
    /// this cycle.
    pub cmd: Option<DriveCmd>,
}

/// Module demands issued by drive control on a cycle.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct OutputData {
    /// Steer axis target of each module.
    ///
    /// Units: degrees,
    /// Frame: Module
    pub str_target_deg: [f64; NUM_MODULES],

    /// Speed sent to each drive, after any reversal.
    pub drv_speed: [f64; NUM_MODULES],

    /// True for the modules whose drive is reversed.
    pub reversed: [bool; NUM_MODULES],
}

/// Status report for drive control processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Every module is within `Params::align_threshold_deg` of its target
    pub aligned: bool,

    /// An alignment has been started and has not converged yet
    pub aligning: bool,

    /// The projected module speeds summed to zero, unscaled speeds were used
    pub speed_scaling_skipped: bool,

    /// The drive gate held the wheels still while the modules steered
    pub drive_gated: bool,
}

/// One module's demands, as archived.
#[derive(Serialize)]
struct ModuleRecord {
    cycle: u64,
    module: usize,
    str_target_deg: f64,
    drv_speed: f64,
    raw_speed: f64,
    reversed: bool,
}

/// The status report, as archived.
#[derive(Serialize)]
struct ReportRecord {
    cycle: u64,
    heading_deg: f64,
    aligned: bool,
    aligning: bool,
    speed_scaling_skipped: bool,
    drive_gated: bool,
}

struct DriveCtrlArchives {
    report: Archiver,
    modules: Archiver,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<S, D, R, H> DriveCtrl<S, D, R, H>
where
    S: SteerActuator,
    D: DriveActuator,
    R: ReferenceSensor,
    H: HeadingSensor,
{
    /// Create a new drive controller.
    ///
    /// Modules are given clockwise starting from module 1. The module
    /// calibration parameters in `params` replace those the modules were
    /// built with.
    pub fn new(
        params: Params,
        modules: [SwerveModule<S, D, R>; NUM_MODULES],
        heading_sensor: H,
    ) -> Result<Self, DriveCtrlError> {
        let geometry = ModuleGeometry::from_dims(params.half_width, params.half_length)?;

        let mut ctrl = Self {
            params,
            geometry,
            modules,
            heading_sensor,
            current_cmd: None,
            aligning: false,
            report: StatusReport::default(),
            num_cycles: 0,
            arch: None,
        };
        ctrl.apply_module_params();

        Ok(ctrl)
    }

    /// Replace the parameters, recomputing the geometry.
    ///
    /// On error the previous parameters are kept.
    pub fn set_params(&mut self, params: Params) -> Result<(), DriveCtrlError> {
        self.geometry = ModuleGeometry::from_dims(params.half_width, params.half_length)?;
        self.params = params;
        self.apply_module_params();

        Ok(())
    }

    fn apply_module_params(&mut self) {
        for (m, p) in self.modules.iter_mut().zip(self.params.modules.iter()) {
            m.set_params(*p);
        }
    }

    /// True if every module's steering is within `threshold_deg` of its
    /// target.
    pub fn is_aligned(&self, threshold_deg: f64) -> bool {
        self.modules.iter().all(|m| m.is_in_position(threshold_deg))
    }

    /// True while an alignment started by `align` has not converged.
    pub fn is_aligning(&self) -> bool {
        self.aligning
    }

    /// Calibrate every module, stopping at the first failure.
    pub fn calibrate(&mut self) -> Result<(), DriveCtrlError> {
        for (i, m) in self.modules.iter_mut().enumerate() {
            m.calibrate()
                .map_err(|e| DriveCtrlError::Calibration(i + 1, e))?;
        }

        info!("All modules calibrated");

        Ok(())
    }

    /// True once every module has been calibrated.
    pub fn is_calibrated(&self) -> bool {
        self.modules.iter().all(|m| m.is_calibrated())
    }

    /// Zero the heading sensor.
    pub fn reset_heading(&mut self) {
        self.heading_sensor.reset();
        info!("Heading reset");
    }

    /// Heading of the chassis in the field frame.
    pub fn heading(&self) -> f64 {
        self.heading_sensor.current_heading()
    }

    pub fn heading_sensor_mut(&mut self) -> &mut H {
        &mut self.heading_sensor
    }

    pub fn geometry(&self) -> &ModuleGeometry {
        &self.geometry
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn modules(&self) -> &[SwerveModule<S, D, R>; NUM_MODULES] {
        &self.modules
    }

    pub fn modules_mut(&mut self) -> &mut [SwerveModule<S, D, R>; NUM_MODULES] {
        &mut self.modules
    }

    /// The continuous command currently being executed.
    pub fn current_cmd(&self) -> Option<DriveCmd> {
        self.current_cmd
    }

    /// Demands currently held by the modules.
    pub fn output(&self) -> OutputData {
        let mut output = OutputData::default();

        for (i, m) in self.modules.iter().enumerate() {
            output.str_target_deg[i] = m.target();
            output.drv_speed[i] = m.drive().speed();
            output.reversed[i] = m.polarity() == Polarity::Reversed;
        }

        output
    }

    /// Execute a command on this cycle.
    fn execute(&mut self, cmd: DriveCmd) -> Result<(), DriveCtrlError> {
        // Any other continuous command abandons an alignment in progress
        if !cmd.is_one_shot() && !matches!(cmd, DriveCmd::Align { .. }) {
            self.aligning = false;
        }

        match cmd {
            DriveCmd::Holonomic {
                direction_deg,
                speed,
                spin,
            } => {
                self.holonomic(direction_deg, speed, spin);
            }
            DriveCmd::Components {
                forward,
                strafe,
                spin,
            } => {
                self.holonomic_components(forward, strafe, spin);
            }
            DriveCmd::Align { threshold_deg } => {
                self.align(threshold_deg);
            }
            DriveCmd::Stop => self.stop(),
            DriveCmd::ResetHeading => self.reset_heading(),
            DriveCmd::Calibrate => self.calibrate()?,
        }

        Ok(())
    }
}

impl<S, D, R, H> State for DriveCtrl<S, D, R, H>
where
    S: SteerActuator,
    D: DriveActuator,
    R: ReferenceSensor,
    H: HeadingSensor,
{
    type InitData = &'static str;
    type InitError = DriveCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = DriveCtrlError;

    /// Initialise the DriveCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data)?;
        self.set_params(params)?;

        let arch = DriveCtrlArchives {
            report: Archiver::from_path(session, "drive_ctrl/status_report.csv")
                .map_err(DriveCtrlError::ArchiveInit)?,
            modules: Archiver::from_path(session, "drive_ctrl/modules.csv")
                .map_err(DriveCtrlError::ArchiveInit)?,
        };
        self.arch = Some(arch);

        info!(
            "DriveCtrl initialised, module bearings {:?} deg",
            self.geometry.bearings_deg
        );

        Ok(())
    }

    /// Perform cyclic processing of drive control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.report = StatusReport::default();
        self.num_cycles += 1;

        if let Some(cmd) = input_data.cmd {
            // Driver commands are re-sent every cycle with new values
            match self.current_cmd {
                Some(c) if !cmd.is_one_shot() && c.same_kind(&cmd) => {
                    debug!("DriveCtrl command update: {:?}", cmd)
                }
                _ => info!("New DriveCtrl command: {:?}", cmd),
            }

            if cmd.is_one_shot() {
                self.execute(cmd)?;
            } else {
                self.current_cmd = Some(cmd);
            }
        }

        // With no command yet keep the wheels still
        let cmd = self.current_cmd.unwrap_or(DriveCmd::Stop);
        self.execute(cmd)?;

        self.report.aligned = self.is_aligned(self.params.align_threshold_deg);
        self.report.aligning = self.aligning;

        let output = self.output();

        trace!(
            "DriveCtrl output:\n    drv: {:?}\n    str: {:?}",
            output.drv_speed,
            output.str_target_deg
        );

        Ok((output, self.report))
    }
}

impl<S, D, R, H> Archived for DriveCtrl<S, D, R, H>
where
    S: SteerActuator,
    D: DriveActuator,
    R: ReferenceSensor,
    H: HeadingSensor,
{
    fn write(&mut self) -> Result<(), ArchiveError> {
        let cycle = self.num_cycles;
        let heading_deg = self.heading();
        let output = self.output();
        let report = self.report;

        let raw_speeds: Vec<f64> = self.modules.iter().map(|m| m.get()).collect();

        // Not initialised, nothing to write to
        let arch = match self.arch {
            Some(ref mut a) => a,
            None => return Ok(()),
        };

        arch.report.serialise(ReportRecord {
            cycle,
            heading_deg,
            aligned: report.aligned,
            aligning: report.aligning,
            speed_scaling_skipped: report.speed_scaling_skipped,
            drive_gated: report.drive_gated,
        })?;

        for i in 0..NUM_MODULES {
            arch.modules.serialise(ModuleRecord {
                cycle,
                module: i + 1,
                str_target_deg: output.str_target_deg[i],
                drv_speed: output.drv_speed[i],
                raw_speed: raw_speeds[i],
                reversed: output.reversed[i],
            })?;
        }

        Ok(())
    }
}
