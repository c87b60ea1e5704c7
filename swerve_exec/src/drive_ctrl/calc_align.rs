//! Alignment and stop manouvres

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;

// Internal
use super::*;
use crate::eqpt::{DriveActuator, HeadingSensor, ReferenceSensor, SteerActuator};

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
    /// Point every wheel straight ahead with the drives stopped.
    ///
    /// Returns true once every module is within `threshold_deg` of its
    /// target. Call once per cycle until it does.
    pub fn align(&mut self, threshold_deg: f64) -> bool {
        for m in self.modules.iter_mut() {
            m.steer_to(0.0);
            m.set(0.0);
        }

        let aligned = self.is_aligned(threshold_deg);

        if !aligned && !self.aligning {
            info!("Aligning modules to within {:.2} deg", threshold_deg);
        }
        if aligned && self.aligning {
            info!("Modules aligned");
        }

        self.aligning = !aligned;

        aligned
    }

    /// Stop every drive, leaving the steering where it is.
    pub fn stop(&mut self) {
        for m in self.modules.iter_mut() {
            m.set(0.0);
        }
    }
}
