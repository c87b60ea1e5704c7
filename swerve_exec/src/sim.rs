//! # Simulated equipment
//!
//! Stand-ins for the drivetrain hardware, used by the executable when no
//! hardware is attached and by the tests. The steering slews toward its
//! target by a fixed amount each tick, everything else responds instantly.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::Vector2;

// Internal
use crate::compass::{normalize, to_field_frame};
use crate::drive_ctrl::{DriveCtrl, DriveCtrlError, Params, NUM_MODULES};
use crate::eqpt::{DriveActuator, HeadingSensor, ReferenceSensor, SteerActuator};
use crate::swerve_module::SwerveModule;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Simulated steering axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimSteer {
    position_deg: f64,
    target_deg: f64,

    /// Largest rotation made by one `step`. Zero holds the axis still.
    ///
    /// Units: degrees/tick
    slew_deg: f64,
}

/// Simulated wheel drive.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimDrive {
    speed: f64,
}

/// Simulated gyro.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimGyro {
    heading_deg: f64,
}

/// Simulated absolute steering reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimReference {
    reading: f64,
}

/// Drive control over simulated equipment.
pub type SimDriveCtrl = DriveCtrl<SimSteer, SimDrive, SimReference, SimGyro>;

/// A simulated drivetrain.
pub struct SimRig {
    pub ctrl: SimDriveCtrl,

    /// Field position of the chassis centre, x right and y forward
    position: Vector2<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimSteer {
    /// An axis held at `position_deg`, targeting its own position.
    pub fn at(position_deg: f64) -> Self {
        let position_deg = normalize(position_deg);

        Self {
            position_deg,
            target_deg: position_deg,
            slew_deg: 0.0,
        }
    }

    pub fn with_slew(mut self, slew_deg: f64) -> Self {
        self.slew_deg = slew_deg.abs();
        self
    }

    pub fn position(&self) -> f64 {
        self.position_deg
    }

    pub fn target(&self) -> f64 {
        self.target_deg
    }

    /// Move the axis directly, as if pushed by hand.
    pub fn set_position(&mut self, position_deg: f64) {
        self.position_deg = normalize(position_deg);
    }

    /// Advance one tick, rotating the shortest way toward the target.
    pub fn step(&mut self) {
        let error = self.current_error();

        let rotation = if error.abs() <= self.slew_deg {
            error
        } else {
            self.slew_deg * error.signum()
        };

        self.position_deg = normalize(self.position_deg + rotation);
    }
}

impl SteerActuator for SimSteer {
    fn set_target_angle(&mut self, angle_deg: f64) {
        self.target_deg = normalize(angle_deg);
    }

    fn current_error(&self) -> f64 {
        normalize(self.target_deg - self.position_deg)
    }

    fn shortest_delta(&self, candidate_deg: f64) -> f64 {
        normalize(candidate_deg - self.position_deg)
    }
}

impl DriveActuator for SimDrive {
    fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    fn speed(&self) -> f64 {
        self.speed
    }
}

impl SimGyro {
    pub fn set_heading(&mut self, heading_deg: f64) {
        self.heading_deg = normalize(heading_deg);
    }

    /// Turn the chassis by `rate_deg` (one tick's worth of rotation).
    pub fn advance(&mut self, rate_deg: f64) {
        self.heading_deg = normalize(self.heading_deg + rate_deg);
    }
}

impl HeadingSensor for SimGyro {
    fn current_heading(&self) -> f64 {
        self.heading_deg
    }

    fn reset(&mut self) {
        self.heading_deg = 0.0;
    }
}

impl SimReference {
    pub fn new(reading: f64) -> Self {
        Self { reading }
    }
}

impl ReferenceSensor for SimReference {
    fn raw_reading(&mut self) -> f64 {
        self.reading
    }
}

impl SimRig {
    /// Build a rig whose steering starts at the given positions and slews by
    /// `slew_deg` per tick.
    ///
    /// `references` are the raw readings each module's reference sensor
    /// returns at calibration.
    pub fn new(
        params: Params,
        positions_deg: [f64; NUM_MODULES],
        references: [f64; NUM_MODULES],
        slew_deg: f64,
    ) -> Result<Self, DriveCtrlError> {
        let module = |i: usize| {
            SwerveModule::new(
                SimSteer::at(positions_deg[i]).with_slew(slew_deg),
                SimDrive::default(),
                SimReference::new(references[i]),
                params.modules[i],
            )
        };
        let modules = [module(0), module(1), module(2), module(3)];

        Ok(Self {
            ctrl: DriveCtrl::new(params, modules, SimGyro::default())?,
            position: Vector2::zeros(),
        })
    }

    /// Advance every steering axis one tick.
    pub fn step(&mut self) {
        for m in self.ctrl.modules_mut().iter_mut() {
            m.steer_mut().step();
        }

        trace!(
            "Sim steer positions: {:?}",
            self.ctrl
                .modules()
                .iter()
                .map(|m| m.steer().position())
                .collect::<Vec<_>>()
        );
    }

    /// Move the chassis by one tick of the wheels' current motion.
    ///
    /// Each wheel pushes along its field frame direction in proportion to its
    /// drive speed, and the chassis moves by the average of the pushes
    /// scaled by `distance_per_speed`. The chassis then turns by
    /// `rotation_deg`.
    pub fn move_chassis(&mut self, distance_per_speed: f64, rotation_deg: f64) {
        let heading_deg = self.ctrl.heading();

        let mut velocity = Vector2::zeros();
        for m in self.ctrl.modules().iter() {
            let wheel_deg = to_field_frame(m.steer().position() + m.tare(), heading_deg);
            let wheel_rad = wheel_deg.to_radians();
            velocity += Vector2::new(wheel_rad.sin(), wheel_rad.cos()) * m.drive().speed();
        }

        self.position += velocity * (distance_per_speed / NUM_MODULES as f64);
        self.gyro_mut().advance(rotation_deg);
    }

    pub fn position(&self) -> Vector2<f64> {
        self.position
    }

    pub fn gyro_mut(&mut self) -> &mut SimGyro {
        self.ctrl.heading_sensor_mut()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_steer_slews_shortest_way() {
        let mut s = SimSteer::at(170.0).with_slew(5.0);
        s.set_target_angle(-170.0);

        assert_eq!(s.current_error(), 20.0);

        s.step();
        assert_eq!(s.position(), 175.0);
        s.step();
        assert_eq!(s.position(), -180.0);
        s.step();
        s.step();
        assert_eq!(s.position(), -170.0);
        assert_eq!(s.current_error(), 0.0);

        // No overshoot once there
        s.step();
        assert_eq!(s.position(), -170.0);
    }

    #[test]
    fn test_chassis_follows_wheels() {
        let mut rig = SimRig::new(Params::default(), [0.0; NUM_MODULES], [0.0; NUM_MODULES], 0.0)
            .unwrap();

        // Straight ahead
        rig.ctrl.holonomic(0.0, 0.5, 0.0);
        rig.move_chassis(2.0, 0.0);
        assert!((rig.position() - Vector2::new(0.0, 1.0)).norm() < 1e-12);

        // A reversed wheel pushes the same way as a forward one
        rig.ctrl.modules_mut()[0].steer_mut().set_position(180.0);
        rig.ctrl.holonomic(0.0, 0.5, 0.0);
        assert!(rig.ctrl.output().reversed[0]);
        rig.move_chassis(2.0, 30.0);
        assert!((rig.position() - Vector2::new(0.0, 2.0)).norm() < 1e-12);
        assert_eq!(rig.ctrl.heading(), 30.0);

        // Strafing right with the chassis turned, in the field frame
        rig.ctrl.holonomic(90.0, 1.0, 0.0);
        for m in rig.ctrl.modules_mut().iter_mut() {
            let target = m.target();
            m.steer_mut().set_position(target);
        }
        rig.move_chassis(1.0, 0.0);
        assert!((rig.position() - Vector2::new(1.0, 2.0)).norm() < 1e-12);
    }

    #[test]
    fn test_gyro() {
        let mut g = SimGyro::default();
        g.advance(170.0);
        g.advance(20.0);
        assert_eq!(g.current_heading(), -170.0);

        g.reset();
        assert_eq!(g.current_heading(), 0.0);
    }
}
