//! # Compass
//!
//! Angle normalisation and frame conversions shared by every part of the
//! drivetrain.
//!
//! All angles are in degrees. Any angle returned from this module lies in the
//! canonical range `[-180, 180)`.
//!
//! Frames:
//!     - Field frame: fixed to the playing field, the heading sensor reports
//!       the chassis heading in this frame.
//!     - Robot frame: fixed to the chassis, zero is chassis forward.
//!     - Module frame: robot frame shifted by the module's tare, zero is the
//!       physical zero of the module's steering sensor.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use util::maths::wrap;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Lower (inclusive) bound of the canonical angle range.
pub const ANGLE_MIN_DEG: f64 = -180.0;

/// Width of the canonical angle range.
pub const FULL_TURN_DEG: f64 = 360.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Per-module compass holding the module's tare.
///
/// The tare is the angle of the module's physical zero in the robot frame. It
/// is established once by calibration and only trimmed afterwards.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Compass {
    tare_deg: f64,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Normalise an angle into `[-180, 180)`.
///
/// Idempotent, and `180` maps to `-180`.
pub fn normalize(angle_deg: f64) -> f64 {
    wrap(angle_deg, ANGLE_MIN_DEG, FULL_TURN_DEG)
}

/// Convert a field frame angle into the robot frame.
pub fn to_robot_frame(field_angle_deg: f64, chassis_heading_deg: f64) -> f64 {
    normalize(field_angle_deg - chassis_heading_deg)
}

/// Convert a robot frame angle into the field frame.
pub fn to_field_frame(robot_angle_deg: f64, chassis_heading_deg: f64) -> f64 {
    normalize(robot_angle_deg + chassis_heading_deg)
}

/// Signed shortest rotation taking `from_deg` onto `to_deg`.
pub fn shortest_path(from_deg: f64, to_deg: f64) -> f64 {
    normalize(to_deg - from_deg)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Compass {
    pub fn tare(&self) -> f64 {
        self.tare_deg
    }

    /// Set the tare.
    ///
    /// If `additive` is false the tare is replaced by `raw_deg`, otherwise
    /// `raw_deg` is added to the current tare. The additive form is used to
    /// trim a calibrated module without losing the coarse calibration.
    pub fn set_tare(&mut self, raw_deg: f64, additive: bool) {
        self.tare_deg = if additive {
            normalize(self.tare_deg + raw_deg)
        } else {
            normalize(raw_deg)
        };
    }

    /// Convert a robot frame angle into this module's frame.
    pub fn apply_tare(&self, angle_deg: f64) -> f64 {
        normalize(angle_deg - self.tare_deg)
    }
}
