//! # Position control
//!
//! Holds the chassis at an expected field position and heading, driving the
//! errors to zero through three PID keys. The output is a
//! `DriveCmd::Components` command.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::Vector2;

// Internal
use crate::compass::shortest_path;
use crate::drive_ctrl::DriveCmd;
use crate::pid::KeyedPid;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

pub const FORWARD_KEY: &str = "forward";
pub const STRAFE_KEY: &str = "strafe";
pub const SPIN_KEY: &str = "spin";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Position controller.
///
/// Positions are field frame, x to the right and y forward.
#[derive(Debug, Clone, Copy)]
pub struct PositionCtrl {
    /// Position error of the last update
    ///
    /// Units: same as the positions given to `update`
    pub last_error: Vector2<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PositionCtrl {
    pub fn new() -> Self {
        Self {
            last_error: Vector2::zeros(),
        }
    }

    /// Compute the command moving the chassis toward `expected`.
    ///
    /// The forward component corrects the y error, the strafe component the
    /// x error.
    pub fn update(
        &mut self,
        pid: &mut KeyedPid,
        current: Vector2<f64>,
        expected: Vector2<f64>,
        heading_deg: f64,
        expected_heading_deg: f64,
    ) -> DriveCmd {
        let error = expected - current;
        let spin_error = shortest_path(heading_deg, expected_heading_deg);

        self.last_error = error;

        let cmd = DriveCmd::Components {
            forward: pid.compute(FORWARD_KEY, error.y),
            strafe: pid.compute(STRAFE_KEY, error.x),
            spin: pid.compute(SPIN_KEY, spin_error),
        };

        trace!(
            "Position error {:?}, heading error {:.2} deg, cmd {:?}",
            error,
            spin_error,
            cmd
        );

        cmd
    }

    /// Clear the error terms of every key used.
    pub fn reset(&mut self, pid: &mut KeyedPid) {
        for k in [FORWARD_KEY, STRAFE_KEY, SPIN_KEY].iter() {
            pid.clear(*k);
        }
        self.last_error = Vector2::zeros();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pid::PidGains;

    fn pid() -> KeyedPid {
        let mut pid = KeyedPid::new();
        pid.set(FORWARD_KEY, PidGains::new(0.5, 0.0, 0.0));
        pid.set(STRAFE_KEY, PidGains::new(0.25, 0.0, 0.0));
        pid.set(SPIN_KEY, PidGains::new(0.25, 0.0, 0.0));
        pid
    }

    #[test]
    fn test_update() {
        let mut pid = pid();
        let mut ctrl = PositionCtrl::new();

        let cmd = ctrl.update(
            &mut pid,
            Vector2::new(1.0, 1.0),
            Vector2::new(3.0, -1.0),
            170.0,
            -170.0,
        );

        assert_eq!(
            cmd,
            DriveCmd::Components {
                forward: -1.0,
                strafe: 0.5,
                spin: 5.0,
            }
        );
        assert_eq!(ctrl.last_error, Vector2::new(2.0, -2.0));
    }

    #[test]
    fn test_at_target() {
        let mut pid = pid();
        let mut ctrl = PositionCtrl::new();
        let p = Vector2::new(4.0, 2.0);

        let cmd = ctrl.update(&mut pid, p, p, 30.0, 30.0);

        assert_eq!(
            cmd,
            DriveCmd::Components {
                forward: 0.0,
                strafe: 0.0,
                spin: 0.0,
            }
        );
    }

    #[test]
    fn test_reset() {
        let mut pid = pid();
        let mut ctrl = PositionCtrl::new();
        ctrl.update(
            &mut pid,
            Vector2::zeros(),
            Vector2::new(1.0, 1.0),
            0.0,
            10.0,
        );

        ctrl.reset(&mut pid);

        for k in [FORWARD_KEY, STRAFE_KEY, SPIN_KEY].iter() {
            let e = pid.entry(*k).unwrap();
            assert_eq!(e.integral, 0.0);
            assert_eq!(e.last_error, 0.0);
        }
        assert_eq!(ctrl.last_error, Vector2::zeros());
    }
}
