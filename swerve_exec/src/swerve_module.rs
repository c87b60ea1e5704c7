//! # Swerve module controller
//!
//! Controls one independently steered wheel. The controller converts a
//! commanded wheel direction into the module's own frame and decides whether
//! to reach it by steering the wheel face round, or by steering the back of
//! the wheel onto it and reversing the drive ("decapitation"). The latter
//! never needs more than 90 degrees of steering.
//!
//! # Ordering
//!
//! The drive polarity is decided when the steering target is computed. Each
//! cycle the steering target (`steer_toward` or `steer_to`) must therefore be
//! computed before the speed command (`set`) for the same cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use util::maths::lin_map;

// Internal
use crate::compass::{self, normalize, Compass, FULL_TURN_DEG};
use crate::eqpt::{DriveActuator, ReferenceSensor, SteerActuator};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Largest steering rotation made before the drive is reversed instead.
pub const DECAPITATION_THRESHOLD_DEG: f64 = 90.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Per-module calibration parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ModuleParams {
    /// Reference sensor reading corresponding to one full turn of the
    /// steering. Readings are mapped linearly from `[0, full_scale]` onto
    /// `[0, 360]` degrees.
    ///
    /// Units: sensor units
    pub reference_full_scale: f64,

    /// Trim added to the calibrated tare. Found empirically per module.
    ///
    /// Units: degrees
    #[serde(default)]
    pub trim_deg: f64,
}

/// A single swerve module.
pub struct SwerveModule<S, D, R> {
    steer: S,
    drive: D,
    reference: R,

    params: ModuleParams,

    compass: Compass,

    /// Drive polarity decided by the last steering computation
    polarity: Polarity,

    /// Last commanded speed, before the polarity is applied
    speed: f64,

    /// Last steering target sent to the actuator, module frame
    target_deg: f64,

    calibrated: bool,
    warned_uncalibrated: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Direction the drive actuator is run in relative to commanded speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Polarity {
    Forward,
    /// The wheel is pointing backwards along the commanded direction.
    Reversed,
}

/// Errors which can occur in a swerve module.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error(
        "Reference sensor gave an unusable reading of {reading} (full scale {full_scale}), \
         module left uncalibrated"
    )]
    InvalidReference { reading: f64, full_scale: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ModuleParams {
    fn default() -> Self {
        Self {
            reference_full_scale: 5.0,
            trim_deg: 0.0,
        }
    }
}

impl Polarity {
    /// Multiplier applied to commanded speeds.
    pub fn sign(&self) -> f64 {
        match self {
            Polarity::Forward => 1.0,
            Polarity::Reversed => -1.0,
        }
    }
}

impl<S, D, R> SwerveModule<S, D, R>
where
    S: SteerActuator,
    D: DriveActuator,
    R: ReferenceSensor,
{
    /// Create a new, uncalibrated, module.
    pub fn new(steer: S, drive: D, reference: R, params: ModuleParams) -> Self {
        Self {
            steer,
            drive,
            reference,
            params,
            compass: Compass::default(),
            polarity: Polarity::Forward,
            speed: 0.0,
            target_deg: 0.0,
            calibrated: false,
            warned_uncalibrated: false,
        }
    }

    /// Establish the module's tare from the reference sensor.
    ///
    /// The reading becomes the tare and the configured trim is then added on
    /// top of it. Returns the resulting tare.
    pub fn calibrate(&mut self) -> Result<f64, ModuleError> {
        let reading = self.reference.raw_reading();
        let full_scale = self.params.reference_full_scale;

        if !reading.is_finite() || !full_scale.is_finite() || full_scale == 0.0 {
            return Err(ModuleError::InvalidReference {
                reading,
                full_scale,
            });
        }

        let raw_deg = lin_map((0.0, full_scale), (0.0, FULL_TURN_DEG), reading);

        self.compass.set_tare(raw_deg, false);
        self.compass.set_tare(self.params.trim_deg, true);
        self.calibrated = true;

        info!(
            "Module calibrated: reading {:.4} -> {:.2} deg, trim {:.2} deg, tare {:.2} deg",
            reading,
            raw_deg,
            self.params.trim_deg,
            self.compass.tare()
        );

        Ok(self.compass.tare())
    }

    /// True once `calibrate` has succeeded.
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Steer the wheel toward a field frame direction.
    ///
    /// Returns the steering target sent to the actuator, in the module frame.
    pub fn steer_toward(&mut self, field_angle_deg: f64, chassis_heading_deg: f64) -> f64 {
        self.steer_to(compass::to_robot_frame(field_angle_deg, chassis_heading_deg))
    }

    /// Steer the wheel toward a robot frame direction.
    ///
    /// Returns the steering target sent to the actuator, in the module frame.
    pub fn steer_to(&mut self, chassis_angle_deg: f64) -> f64 {
        if !self.calibrated && !self.warned_uncalibrated {
            warn!("Steering an uncalibrated module, the zero tare will be used");
            self.warned_uncalibrated = true;
        }

        let end_deg = self.compass.apply_tare(chassis_angle_deg);
        let target_deg = self.decapitate_angle(end_deg);

        self.steer.set_target_angle(target_deg);
        self.target_deg = target_deg;

        target_deg
    }

    /// Pick the steering target for a desired module frame angle and update
    /// the drive polarity.
    ///
    /// If reaching `end_deg` needs more than 90 degrees of rotation the
    /// opposite angle is returned and the drive is reversed.
    pub fn decapitate_angle(&mut self, end_deg: f64) -> f64 {
        let delta = self.steer.shortest_delta(end_deg);

        if delta.abs() > DECAPITATION_THRESHOLD_DEG {
            if self.polarity == Polarity::Forward {
                debug!("Reversing drive, {:.2} deg to {:.2} deg", delta, end_deg);
            }
            self.polarity = Polarity::Reversed;
            normalize(end_deg + 180.0)
        } else {
            self.polarity = Polarity::Forward;
            normalize(end_deg)
        }
    }

    /// Command the wheel speed.
    ///
    /// The speed is reversed if the last steering computation decapitated the
    /// wheel.
    pub fn set(&mut self, speed: f64) {
        self.speed = speed;
        self.drive.set_speed(speed * self.polarity.sign());
    }

    /// The last commanded speed, before any reversal.
    pub fn get(&self) -> f64 {
        self.speed
    }

    /// True if the steering is within `threshold_deg` of its target.
    pub fn is_in_position(&self, threshold_deg: f64) -> bool {
        self.steer.current_error().abs() <= threshold_deg
    }

    /// Replace the calibration parameters.
    ///
    /// Takes effect on the next `calibrate`.
    pub fn set_params(&mut self, params: ModuleParams) {
        self.params = params;
    }

    /// Set the tare directly, see `Compass::set_tare`.
    pub fn set_tare(&mut self, raw_deg: f64, additive: bool) {
        self.compass.set_tare(raw_deg, additive);
    }

    pub fn tare(&self) -> f64 {
        self.compass.tare()
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn target(&self) -> f64 {
        self.target_deg
    }

    pub fn steer(&self) -> &S {
        &self.steer
    }

    pub fn steer_mut(&mut self) -> &mut S {
        &mut self.steer
    }

    pub fn drive(&self) -> &D {
        &self.drive
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::{SimDrive, SimReference, SimSteer};

    type SimModule = SwerveModule<SimSteer, SimDrive, SimReference>;

    fn module_at(position_deg: f64) -> SimModule {
        SwerveModule::new(
            SimSteer::at(position_deg),
            SimDrive::default(),
            SimReference::new(0.0),
            ModuleParams::default(),
        )
    }

    #[test]
    fn test_decapitation_threshold() {
        // With the steering at zero the shortest delta is the target itself
        let cases = [
            (45.0, Polarity::Forward, 45.0),
            (90.0, Polarity::Forward, 90.0),
            (90.001, Polarity::Reversed, normalize(90.001 + 180.0)),
            (179.0, Polarity::Reversed, -1.0),
            (-179.0, Polarity::Reversed, 1.0),
        ];

        for (end, polarity, target) in cases.iter() {
            let mut m = module_at(0.0);
            assert_eq!(m.decapitate_angle(*end), *target, "end {}", end);
            assert_eq!(m.polarity(), *polarity, "end {}", end);
        }
    }

    #[test]
    fn test_uncalibrated_steering() {
        let mut m = module_at(0.0);
        assert!(!m.warned_uncalibrated);

        // Zero tare, warned on the first steer only
        assert_eq!(m.steer_to(30.0), 30.0);
        assert!(m.warned_uncalibrated);
        assert_eq!(m.steer_to(-20.0), -20.0);
        assert!(m.warned_uncalibrated);

        assert!(!m.is_calibrated());
        assert_eq!(m.tare(), 0.0);
        assert_eq!(m.steer().target(), -20.0);
    }

    #[test]
    fn test_speed_follows_polarity() {
        let mut m = module_at(0.0);

        m.steer_to(150.0);
        assert_eq!(m.polarity(), Polarity::Reversed);
        assert_eq!(m.target(), -30.0);

        m.set(0.6);
        assert_eq!(m.get(), 0.6);
        assert_eq!(m.drive().speed(), -0.6);

        // A new target recomputes the polarity
        m.steer_to(20.0);
        m.set(0.6);
        assert_eq!(m.polarity(), Polarity::Forward);
        assert_eq!(m.drive().speed(), 0.6);
    }

    #[test]
    fn test_steer_toward_field_frame() {
        let mut m = module_at(0.0);
        m.set_tare(10.0, false);

        // Field 100, heading 30 -> robot 70 -> module 60
        assert_eq!(m.steer_toward(100.0, 30.0), 60.0);
        assert_eq!(m.steer().target(), 60.0);
        assert_eq!(m.polarity(), Polarity::Forward);

        // Field -90, heading 90 -> robot -180 -> module 170 -> reversed
        assert_eq!(m.steer_toward(-90.0, 90.0), -10.0);
        assert_eq!(m.polarity(), Polarity::Reversed);
    }

    #[test]
    fn test_in_position() {
        let mut m = module_at(-3.0);
        m.steer_to(0.0);

        assert!(m.is_in_position(3.0));
        assert!(!m.is_in_position(2.999));
    }

    #[test]
    fn test_calibrate() {
        let mut m = SwerveModule::new(
            SimSteer::at(0.0),
            SimDrive::default(),
            SimReference::new(1.25),
            ModuleParams {
                reference_full_scale: 5.0,
                trim_deg: -3.0,
            },
        );

        assert!(!m.is_calibrated());
        assert_eq!(m.calibrate().unwrap(), 87.0);
        assert!(m.is_calibrated());
        assert_eq!(m.tare(), 87.0);

        let mut bad = SwerveModule::new(
            SimSteer::at(0.0),
            SimDrive::default(),
            SimReference::new(std::f64::NAN),
            ModuleParams::default(),
        );
        assert!(matches!(
            bad.calibrate(),
            Err(ModuleError::InvalidReference { .. })
        ));
        assert!(!bad.is_calibrated());
        assert_eq!(bad.tare(), 0.0);
    }
}
