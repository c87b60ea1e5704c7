//! Commands passed into DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::mem::discriminant;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A command for the drivetrain.
///
/// Continuous commands are re-executed every cycle until replaced. One-shot
/// commands are executed once on the cycle they arrive and leave the current
/// continuous command running.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DriveCmd {
    /// Translate along a field direction while spinning.
    ///
    /// Continuous.
    Holonomic {
        /// Units: degrees,
        /// Frame: Field
        direction_deg: f64,

        /// Normalised speed, -1 to +1
        speed: f64,

        /// Normalised spin demand
        spin: f64,
    },

    /// Translate by forward and strafe components while spinning.
    ///
    /// Continuous.
    Components {
        forward: f64,
        strafe: f64,
        spin: f64,
    },

    /// Steer every module to zero and hold the drive still.
    ///
    /// Continuous. The modules stay pointed at zero once aligned, the next
    /// command is up to the caller.
    Align { threshold_deg: f64 },

    /// Zero every drive, steering is held where it is.
    ///
    /// Continuous.
    Stop,

    /// Zero the heading sensor.
    ///
    /// One-shot.
    ResetHeading,

    /// Calibrate every module from its reference sensor.
    ///
    /// One-shot.
    Calibrate,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveCmd {
    /// True if the command is executed once rather than every cycle.
    pub fn is_one_shot(&self) -> bool {
        matches!(self, DriveCmd::ResetHeading | DriveCmd::Calibrate)
    }

    /// True if both commands are the same variant, whatever their values.
    pub fn same_kind(&self, other: &DriveCmd) -> bool {
        discriminant(self) == discriminant(other)
    }

    /// The spin demanded by the command, zero if it demands none.
    pub fn spin(&self) -> f64 {
        match self {
            DriveCmd::Holonomic { spin, .. } | DriveCmd::Components { spin, .. } => *spin,
            _ => 0.0,
        }
    }
}
