//! # Equipment interfaces
//!
//! The drivetrain only talks to hardware through these traits. Real motor
//! controllers, gyros and encoders are wrapped by the executable that owns
//! them; `crate::sim` provides simulated versions.
//!
//! All angles are in degrees. None of these calls may fail, a device which
//! cannot be read shall report its last known value.

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Chassis heading source, normally a gyro.
pub trait HeadingSensor {
    /// Heading of the chassis in the field frame.
    fn current_heading(&self) -> f64;

    /// Make the current orientation the new zero heading.
    fn reset(&mut self);
}

/// Closed-loop position actuator steering one wheel.
///
/// Angles given to and reported by the actuator are in the module frame.
pub trait SteerActuator {
    /// Set the closed-loop position target.
    fn set_target_angle(&mut self, angle_deg: f64);

    /// Signed shortest rotation from the current position to the last
    /// target.
    fn current_error(&self) -> f64;

    /// Signed shortest rotation from the current position to `candidate_deg`.
    ///
    /// The magnitude is not assumed to be below 360 for actuators which track
    /// multiple turns.
    fn shortest_delta(&self, candidate_deg: f64) -> f64;
}

/// Open-loop wheel drive.
pub trait DriveActuator {
    /// Set the normalised wheel speed, between -1 and +1.
    fn set_speed(&mut self, speed: f64);

    /// The last value passed to `set_speed`.
    fn speed(&self) -> f64;
}

/// Absolute steering reference read once during calibration.
pub trait ReferenceSensor {
    /// Raw reading of the sensor, in sensor units.
    fn raw_reading(&mut self) -> f64;
}

