//! Holonomic manouvre calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Serialize;
use util::maths::clamp;

// Internal
use super::*;
use crate::compass::normalize;
use crate::eqpt::{DriveActuator, HeadingSensor, ReferenceSensor, SteerActuator};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Result of one holonomic calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HolonomicOutput {
    /// Speed commanded to each module, before any module reversed it.
    pub speeds: [f64; NUM_MODULES],

    /// The projected speeds summed to zero and `speeds` are unscaled.
    pub scaling_skipped: bool,

    /// The drive gate zeroed `speeds` while the modules steered.
    pub gated: bool,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculate the speed of each module for a holonomic command.
///
/// Each module's speed is the commanded speed and spin projected through the
/// cosine of the module's field bearing less 90 degrees. The projections are
/// then scaled so that together they sum to `NUM_MODULES * speed`, keeping
/// the overall commanded magnitude.
///
/// If the projections sum to zero the scale is undefined. In that case every
/// module gets `speed` unscaled and the returned flag is set. The sum counts
/// as zero when it is within rounding of the projections cancelling, however
/// small the projections themselves are.
pub fn calc_module_speeds(
    bearings_deg: &[f64; NUM_MODULES],
    heading_deg: f64,
    speed: f64,
    spin: f64,
) -> ([f64; NUM_MODULES], bool) {
    let mut speeds = [0f64; NUM_MODULES];

    for (s, b) in speeds.iter_mut().zip(bearings_deg.iter()) {
        let field_bearing_deg = normalize(heading_deg + b);
        *s = speed * spin * (field_bearing_deg - 90.0).to_radians().cos();
    }

    let sum: f64 = speeds.iter().sum();
    let magnitude: f64 = speeds.iter().map(|s| s.abs()).sum();
    let scale = NUM_MODULES as f64 * speed / sum;

    if sum.abs() <= DEGENERATE_SUM_TOLERANCE * magnitude || !scale.is_finite() {
        debug!(
            "Projected module speeds sum to {:e}, speeds left unscaled",
            sum
        );
        return ([speed; NUM_MODULES], true);
    }

    for s in speeds.iter_mut() {
        *s *= scale;
    }

    (speeds, false)
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
    /// Drive the chassis along a field direction while spinning.
    ///
    /// All modules are steered toward `direction_deg` before any speed is
    /// set, so each module's speed is reversed according to this cycle's
    /// steering.
    pub fn holonomic(&mut self, direction_deg: f64, speed: f64, spin: f64) -> HolonomicOutput {
        let heading_deg = self.heading_sensor.current_heading();

        for m in self.modules.iter_mut() {
            m.steer_toward(direction_deg, heading_deg);
        }

        let (mut speeds, scaling_skipped) =
            calc_module_speeds(&self.geometry.bearings_deg, heading_deg, speed, spin);

        let gated = match self.params.drive_gate_threshold_deg {
            Some(t) => !self.is_aligned(t),
            None => false,
        };
        if gated {
            speeds = [0f64; NUM_MODULES];
        }

        for (m, s) in self.modules.iter_mut().zip(speeds.iter()) {
            m.set(*s);
        }

        self.report.speed_scaling_skipped = scaling_skipped;
        self.report.drive_gated = gated;

        HolonomicOutput {
            speeds,
            scaling_skipped,
            gated,
        }
    }

    /// Drive the chassis from forward and strafe components.
    ///
    /// The components give the field direction (`atan2(strafe, forward)`) and
    /// the speed, their magnitude limited to 1.
    pub fn holonomic_components(&mut self, forward: f64, strafe: f64, spin: f64) -> HolonomicOutput {
        let direction_deg = strafe.atan2(forward).to_degrees();
        let speed = clamp(&forward.hypot(strafe), &0.0, &1.0);

        self.holonomic(direction_deg, speed, spin)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sum(speeds: &[f64; NUM_MODULES]) -> f64 {
        speeds.iter().sum()
    }

    #[test]
    fn test_zero_spin_uses_unscaled_speed() {
        let g = ModuleGeometry::from_dims(10.925, 12.925).unwrap();

        let (speeds, skipped) = calc_module_speeds(&g.bearings_deg, 0.0, 1.0, 0.0);

        assert!(skipped);
        assert_eq!(speeds, [1.0; NUM_MODULES]);
        assert_eq!(sum(&speeds), 4.0);
    }

    #[test]
    fn test_symmetric_chassis_projections_cancel() {
        // On a rectangular chassis every module has a mirror image whose
        // projection cancels its own, whatever the heading.
        let g = ModuleGeometry::from_dims(10.925, 12.925).unwrap();

        for h in (-180..180).step_by(5) {
            let (speeds, skipped) = calc_module_speeds(&g.bearings_deg, h as f64, 0.8, 0.5);

            assert!(skipped, "heading {}", h);
            assert!(speeds.iter().all(|s| s.is_finite() && *s == 0.8));
        }
    }

    #[test]
    fn test_scaled_speeds() {
        let bearings = [90.0, 90.0, 0.0, 0.0];

        let (speeds, skipped) = calc_module_speeds(&bearings, 0.0, 0.5, 1.0);

        // Projections are 0.5, 0.5, ~0, ~0 so the scale is 2
        assert!(!skipped);
        assert!((sum(&speeds) - 2.0).abs() < 1e-12);
        assert!((speeds[0] - 1.0).abs() < 1e-12);
        assert!((speeds[1] - 1.0).abs() < 1e-12);
        assert!(speeds[2].abs() < 1e-12);
        assert!(speeds[3].abs() < 1e-12);

        // A tiny command still scales, only cancellation counts as zero
        let (speeds, skipped) = calc_module_speeds(&bearings, 0.0, 1e-5, 1e-5);
        assert!(!skipped);
        assert!((speeds[0] - 2e-5).abs() < 1e-15);
        assert!((speeds[1] - 2e-5).abs() < 1e-15);
        assert!(speeds[2].abs() < 1e-15);
        assert!(speeds[3].abs() < 1e-15);

        // Heading rotates the bearings into the field frame
        let (speeds, skipped) = calc_module_speeds(&bearings, 90.0, 0.5, 1.0);
        assert!(!skipped);
        assert!((sum(&speeds) - 2.0).abs() < 1e-12);
        assert!(speeds[0].abs() < 1e-12);
        assert!((speeds[2] - 1.0).abs() < 1e-12);
        assert!((speeds[3] - 1.0).abs() < 1e-12);
    }
}
