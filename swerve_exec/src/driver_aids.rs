//! # Driver aids
//!
//! Sits between the command source and drive control. Driver commands are
//! passed through the heading lock, and scripts can ask for a preset heading
//! or for the chassis to hold a field position. The aids turn all of this
//! into the single `DriveCmd` drive control needs each cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use nalgebra::Vector2;
use serde::Deserialize;

// Internal
use crate::drive_ctrl::DriveCmd;
use crate::heading_lock::{self, HeadingLock};
use crate::pid::{KeyedPid, PidGains};
use crate::position_ctrl::{PositionCtrl, FORWARD_KEY, SPIN_KEY, STRAFE_KEY};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Driver aid parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Hold the heading while driving without spin.
    pub heading_lock_enabled: bool,

    pub heading_lock: heading_lock::Params,

    pub spin_gains: PidGains,
    pub forward_gains: PidGains,
    pub strafe_gains: PidGains,
}

/// A field pose to hold.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Hold {
    position: Vector2<f64>,
    heading_deg: f64,
}

/// Driver aid state.
pub struct DriverAids {
    params: Params,

    pid: KeyedPid,

    lock: HeadingLock,

    position_ctrl: PositionCtrl,

    /// The last holonomic command, re-sent each cycle through the lock
    driver_cmd: Option<DriveCmd>,

    hold: Option<Hold>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A command for the driver aids.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum AidCmd {
    /// Turn to a preset field heading once no spin is commanded.
    SnapHeading { heading_deg: f64 },

    /// Drive to and hold a field pose until the next continuous drive
    /// command.
    HoldPosition { x: f64, y: f64, heading_deg: f64 },
}

/// Anything a command script may contain.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScriptCmd {
    Drive(DriveCmd),
    Aid(AidCmd),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            heading_lock_enabled: true,
            heading_lock: heading_lock::Params::default(),
            spin_gains: PidGains::new(0.02, 0.0, 0.01),
            forward_gains: PidGains::new(0.5, 0.0, 0.0),
            strafe_gains: PidGains::new(0.5, 0.0, 0.0),
        }
    }
}

impl DriverAids {
    pub fn new(params: Params) -> Self {
        let mut pid = KeyedPid::new();
        pid.set(SPIN_KEY, params.spin_gains);
        pid.set(FORWARD_KEY, params.forward_gains);
        pid.set(STRAFE_KEY, params.strafe_gains);

        Self {
            params,
            pid,
            lock: HeadingLock::with_key(params.heading_lock, SPIN_KEY),
            position_ctrl: PositionCtrl::new(),
            driver_cmd: None,
            hold: None,
        }
    }

    /// Give drive control's command for this cycle.
    ///
    /// `new` is the command which arrived this cycle, if any. One-shot drive
    /// commands pass straight through and the aids resume on the next cycle.
    /// Otherwise a position hold takes priority, then the last holonomic
    /// command with the heading lock applied. `None` leaves drive control
    /// running its current command.
    pub fn cycle_cmd(
        &mut self,
        new: Option<ScriptCmd>,
        heading_deg: f64,
        position: Vector2<f64>,
    ) -> Option<DriveCmd> {
        match new {
            Some(ScriptCmd::Aid(AidCmd::SnapHeading { heading_deg: h })) => {
                info!("Snapping heading to {:.2} deg", h);
                self.lock.snap_to(h);
            }
            Some(ScriptCmd::Aid(AidCmd::HoldPosition { x, y, heading_deg: h })) => {
                info!("Holding position ({:.3}, {:.3}) at {:.2} deg", x, y, h);
                self.position_ctrl.reset(&mut self.pid);
                self.driver_cmd = None;
                self.hold = Some(Hold {
                    position: Vector2::new(x, y),
                    heading_deg: h,
                });
            }
            Some(ScriptCmd::Drive(cmd)) if cmd.is_one_shot() => {
                // The sensor reads zero once drive control has run this
                if cmd == DriveCmd::ResetHeading {
                    self.lock.reset(&mut self.pid, 0.0);
                }
                return Some(cmd);
            }
            Some(ScriptCmd::Drive(cmd)) => {
                if self.hold.take().is_some() {
                    debug!("Position hold released");
                    self.lock.reset(&mut self.pid, heading_deg);
                }

                if let DriveCmd::Holonomic { .. } = cmd {
                    self.driver_cmd = Some(cmd);
                } else {
                    self.driver_cmd = None;
                    return Some(cmd);
                }
            }
            None => (),
        }

        if let Some(hold) = self.hold {
            return Some(self.position_ctrl.update(
                &mut self.pid,
                position,
                hold.position,
                heading_deg,
                hold.heading_deg,
            ));
        }

        match self.driver_cmd {
            Some(DriveCmd::Holonomic {
                direction_deg,
                speed,
                spin,
            }) => {
                let spin = if self.params.heading_lock_enabled {
                    self.lock.update(&mut self.pid, heading_deg, speed, spin)
                } else {
                    spin
                };

                Some(DriveCmd::Holonomic {
                    direction_deg,
                    speed,
                    spin,
                })
            }
            _ => None,
        }
    }

    pub fn is_holding(&self) -> bool {
        self.hold.is_some()
    }

    pub fn heading_lock(&self) -> &HeadingLock {
        &self.lock
    }

    pub fn position_ctrl(&self) -> &PositionCtrl {
        &self.position_ctrl
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn aids() -> DriverAids {
        let mut params = Params::default();
        params.spin_gains = PidGains::new(0.1, 0.0, 0.0);
        params.forward_gains = PidGains::new(0.5, 0.0, 0.0);
        params.strafe_gains = PidGains::new(0.25, 0.0, 0.0);
        DriverAids::new(params)
    }

    fn drive(direction_deg: f64, speed: f64, spin: f64) -> Option<ScriptCmd> {
        Some(ScriptCmd::Drive(DriveCmd::Holonomic {
            direction_deg,
            speed,
            spin,
        }))
    }

    fn drive_cmd(direction_deg: f64, speed: f64, spin: f64) -> Option<DriveCmd> {
        Some(DriveCmd::Holonomic {
            direction_deg,
            speed,
            spin,
        })
    }

    #[test]
    fn test_parse_script_cmds() {
        let cmd: ScriptCmd = serde_json::from_str(r#"{"type": "Stop"}"#).unwrap();
        assert_eq!(cmd, ScriptCmd::Drive(DriveCmd::Stop));

        let cmd: ScriptCmd =
            serde_json::from_str(r#"{"type": "SnapHeading", "heading_deg": 90.0}"#).unwrap();
        assert_eq!(cmd, ScriptCmd::Aid(AidCmd::SnapHeading { heading_deg: 90.0 }));

        let cmd: ScriptCmd = serde_json::from_str(
            r#"{"type": "HoldPosition", "x": 1.0, "y": -2.0, "heading_deg": 0.0}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            ScriptCmd::Aid(AidCmd::HoldPosition {
                x: 1.0,
                y: -2.0,
                heading_deg: 0.0
            })
        );

        assert!(serde_json::from_str::<ScriptCmd>(r#"{"type": "Dance"}"#).is_err());
    }

    #[test]
    fn test_holonomic_resent_through_lock() {
        let mut a = aids();
        let p = Vector2::zeros();

        // Locks at 10 on the first cycle
        assert_eq!(a.cycle_cmd(drive(0.0, 0.5, 0.0), 10.0, p), drive_cmd(0.0, 0.5, 0.0));

        // Drifted to 20, corrected back without a new command
        assert_eq!(a.cycle_cmd(None, 20.0, p), drive_cmd(0.0, 0.5, -1.0));

        // Driver spin wins
        assert_eq!(a.cycle_cmd(drive(0.0, 0.5, 0.4), 20.0, p), drive_cmd(0.0, 0.5, 0.4));
    }

    #[test]
    fn test_lock_disabled() {
        let mut params = Params::default();
        params.heading_lock_enabled = false;
        let mut a = DriverAids::new(params);
        let p = Vector2::zeros();

        a.cycle_cmd(drive(0.0, 0.5, 0.0), 10.0, p);
        assert_eq!(a.cycle_cmd(None, 60.0, p), drive_cmd(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_snap_heading() {
        let mut a = aids();
        let p = Vector2::zeros();
        a.cycle_cmd(drive(0.0, 0.0, 0.0), 0.0, p);

        // Turns toward the preset even while stationary
        let cmd = a.cycle_cmd(
            Some(ScriptCmd::Aid(AidCmd::SnapHeading { heading_deg: 90.0 })),
            0.0,
            p,
        );
        match cmd {
            Some(DriveCmd::Holonomic { speed, spin, .. }) => {
                assert_eq!(speed, 0.0);
                assert!((spin - 9.0).abs() < 1e-12);
            }
            other => panic!("Expected a holonomic command, got {:?}", other),
        }
        assert_eq!(a.heading_lock().snap_target(), Some(90.0));
    }

    #[test]
    fn test_one_shot_passes_through() {
        let mut a = aids();
        let p = Vector2::zeros();
        a.cycle_cmd(drive(45.0, 0.5, 0.0), 30.0, p);

        let cmd = a.cycle_cmd(Some(ScriptCmd::Drive(DriveCmd::Calibrate)), 30.0, p);
        assert_eq!(cmd, Some(DriveCmd::Calibrate));

        // Resetting the heading relocks at zero, so the holonomic command
        // resumes without turning back to 30
        let cmd = a.cycle_cmd(Some(ScriptCmd::Drive(DriveCmd::ResetHeading)), 30.0, p);
        assert_eq!(cmd, Some(DriveCmd::ResetHeading));
        assert_eq!(a.heading_lock().locked(), 0.0);
        assert_eq!(a.cycle_cmd(None, 0.0, p), drive_cmd(45.0, 0.5, 0.0));
    }

    #[test]
    fn test_other_continuous_cmds_sent_once() {
        let mut a = aids();
        let p = Vector2::zeros();
        a.cycle_cmd(drive(45.0, 0.5, 0.0), 0.0, p);

        let cmd = a.cycle_cmd(Some(ScriptCmd::Drive(DriveCmd::Stop)), 0.0, p);
        assert_eq!(cmd, Some(DriveCmd::Stop));

        // Drive control keeps running it
        assert_eq!(a.cycle_cmd(None, 0.0, p), None);
    }

    #[test]
    fn test_hold_position() {
        let mut a = aids();

        let hold = ScriptCmd::Aid(AidCmd::HoldPosition {
            x: 3.0,
            y: -1.0,
            heading_deg: 0.0,
        });
        let cmd = a.cycle_cmd(Some(hold), 0.0, Vector2::new(1.0, 1.0));

        assert!(a.is_holding());
        assert_eq!(
            cmd,
            Some(DriveCmd::Components {
                forward: -1.0,
                strafe: 0.5,
                spin: 0.0
            })
        );
        assert_eq!(a.position_ctrl().last_error, Vector2::new(2.0, -2.0));

        // Held without new commands
        let cmd = a.cycle_cmd(None, 0.0, Vector2::new(3.0, -1.0));
        assert_eq!(
            cmd,
            Some(DriveCmd::Components {
                forward: 0.0,
                strafe: 0.0,
                spin: 0.0
            })
        );

        // A one-shot leaves the hold in place
        a.cycle_cmd(Some(ScriptCmd::Drive(DriveCmd::Calibrate)), 0.0, Vector2::zeros());
        assert!(a.is_holding());

        // A continuous command releases it and relocks at the current heading
        let cmd = a.cycle_cmd(drive(0.0, 0.5, 0.0), 25.0, Vector2::zeros());
        assert!(!a.is_holding());
        assert_eq!(a.heading_lock().locked(), 25.0);
        assert_eq!(cmd, drive_cmd(0.0, 0.5, 0.0));
    }
}
