//! Parameters structure for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::NUM_MODULES;
use crate::swerve_module::ModuleParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for drive control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    // ---- GEOMETRY ----
    /// Distance from the chassis centre line to the wheel contact points,
    /// across the chassis.
    ///
    /// Only the ratio to `half_length` matters, any unit may be used.
    pub half_width: f64,

    /// Distance from the chassis centre line to the wheel contact points,
    /// along the chassis.
    pub half_length: f64,

    // ---- ALIGNMENT ----
    /// Steering error under which a module is considered in position for the
    /// status report.
    ///
    /// Units: degrees
    #[serde(default = "default_align_threshold_deg")]
    pub align_threshold_deg: f64,

    /// If set, holonomic commands only drive the wheels once every module is
    /// within this steering error, until then all speeds are zero.
    ///
    /// Units: degrees
    #[serde(default)]
    pub drive_gate_threshold_deg: Option<f64>,

    // ---- MODULES ----
    /// Calibration parameters of each module, clockwise from module 1.
    pub modules: [ModuleParams; NUM_MODULES],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            half_width: 21.85 / 2.0,
            half_length: 25.85 / 2.0,
            align_threshold_deg: default_align_threshold_deg(),
            drive_gate_threshold_deg: None,
            modules: [ModuleParams::default(); NUM_MODULES],
        }
    }
}

fn default_align_threshold_deg() -> f64 {
    4.0
}
