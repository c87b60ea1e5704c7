//! # Heading lock
//!
//! Holds the chassis heading while the driver is not commanding any spin.
//! When the commanded spin drops to zero the current heading is locked, and
//! once the chassis is moving fast enough any drift away from it is fed back
//! through the `spin` PID controller. A snap target, set from a preset
//! button, overrides the locked heading until the driver spins again.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Deserialize;

// Internal
use crate::compass::{normalize, shortest_path};
use crate::pid::KeyedPid;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// PID key used unless another is given.
pub const DEFAULT_KEY: &str = "spin";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Heading lock parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Chassis speed from which the locked heading is held. Below it the
    /// chassis is free to drift.
    pub engage_speed: f64,

    /// Heading errors of this size or less are ignored.
    ///
    /// Units: degrees
    pub deadband_deg: f64,
}

/// Heading lock state.
#[derive(Debug, Clone)]
pub struct HeadingLock {
    params: Params,

    key: String,

    /// Heading recorded when the driver last released the spin
    locked_deg: f64,

    /// Preset heading to turn to, overriding `locked_deg`
    snap_deg: Option<f64>,

    /// True while the driver is commanding no spin
    hands_off: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            engage_speed: 0.3,
            deadband_deg: 3.0,
        }
    }
}

impl HeadingLock {
    pub fn new(params: Params) -> Self {
        Self::with_key(params, DEFAULT_KEY)
    }

    /// Create a lock driving the given PID key.
    pub fn with_key(params: Params, key: &str) -> Self {
        Self {
            params,
            key: key.to_string(),
            locked_deg: 0.0,
            snap_deg: None,
            hands_off: false,
        }
    }

    /// Spin to command on this cycle.
    ///
    /// A non-zero driver spin is returned unchanged. With no driver spin the
    /// returned spin corrects the heading toward the snap target, or toward
    /// the locked heading if moving at `engage_speed` or above.
    pub fn update(
        &mut self,
        pid: &mut KeyedPid,
        heading_deg: f64,
        speed: f64,
        driver_spin: f64,
    ) -> f64 {
        if driver_spin != 0.0 {
            self.hands_off = false;
            self.snap_deg = None;
            return driver_spin;
        }

        if !self.hands_off {
            self.hands_off = true;
            self.locked_deg = normalize(heading_deg);
            pid.clear(self.key.as_str());
            debug!("Heading locked at {:.2} deg", self.locked_deg);
        }

        let error = match self.snap_deg {
            Some(s) => shortest_path(heading_deg, s),
            None if speed >= self.params.engage_speed => {
                shortest_path(heading_deg, self.locked_deg)
            }
            None => 0.0,
        };

        if error.abs() > self.params.deadband_deg {
            pid.compute(self.key.as_str(), error)
        } else {
            0.0
        }
    }

    /// Turn to a preset heading once the driver lets go of the spin.
    pub fn snap_to(&mut self, heading_deg: f64) {
        self.snap_deg = Some(normalize(heading_deg));
    }

    /// Relock at `heading_deg`, dropping any snap target and clearing the
    /// controller. Used after the heading sensor is zeroed.
    pub fn reset(&mut self, pid: &mut KeyedPid, heading_deg: f64) {
        self.locked_deg = normalize(heading_deg);
        self.snap_deg = None;
        pid.clear(self.key.as_str());
    }

    pub fn locked(&self) -> f64 {
        self.locked_deg
    }

    pub fn snap_target(&self) -> Option<f64> {
        self.snap_deg
    }
}
