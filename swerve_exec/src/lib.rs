//! # Swerve drive library
//!
//! Control software for a four wheel swerve drivetrain. Every wheel is
//! steered independently, which lets the chassis translate in any direction
//! while rotating.
//!
//! The layers, from the bottom up:
//!
//! - `compass`: angle normalisation and frame conversion
//! - `pid`: a table of PID controllers addressed by key
//! - `swerve_module`: one steered wheel, including drive reversal
//! - `drive_ctrl`: the four modules driven together
//!
//! `heading_lock` and `position_ctrl` are closed loop aids producing drive
//! commands, brought together with the script commands in `driver_aids`.
//! `eqpt` holds the hardware interfaces and `sim` simulated hardware.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod compass;
pub mod drive_ctrl;
pub mod driver_aids;
pub mod eqpt;
pub mod heading_lock;
pub mod pid;
pub mod position_ctrl;
pub mod sim;
pub mod swerve_module;
