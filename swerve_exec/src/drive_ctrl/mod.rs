//! # Drive control module
//!
//! Coordinates the four swerve modules of the drivetrain. A single holonomic
//! command (field direction, speed, spin) is turned into a steering target
//! and a speed for every module, using the fixed chassis geometry and the
//! current chassis heading.
//!
//! Modules are numbered clockwise starting from module 1.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_align;
mod calc_holonomic;
mod cmd;
mod geometry;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use calc_holonomic::*;
pub use cmd::*;
pub use geometry::*;
pub use params::*;
pub use state::*;

use crate::swerve_module::ModuleError;
use util::{archive::ArchiveError, params::LoadError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of swerve modules on the drivetrain.
pub const NUM_MODULES: usize = 4;

/// Fraction of the summed projection magnitudes under which the sum of the
/// projected module speeds is treated as zero, in which case the speeds are
/// not scaled.
pub const DEGENERATE_SUM_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DriveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error(
        "Chassis dimensions must be positive and finite, found half width {half_width} and \
         half length {half_length}"
    )]
    InvalidGeometry { half_width: f64, half_length: f64 },

    #[error("Could not load the DriveCtrl parameters: {0}")]
    ParamLoad(#[from] LoadError),

    #[error("Could not calibrate module {0}: {1}")]
    Calibration(usize, ModuleError),

    #[error("Could not initialise the DriveCtrl archives: {0}")]
    ArchiveInit(ArchiveError),
}
