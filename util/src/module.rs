//! Cyclic module interfaces
//!
//! Each cyclic control module in `swerve_exec` shall implement the `State`
//! trait so the executable can initialise and step it the same way.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// A module stepped once per control cycle.
///
/// `proc` must never block. Anything taking several cycles, such as waiting
/// for a mechanism to converge, is held as state between calls and reported
/// through `StatusReport`.
pub trait State {
    /// Passed to `init`, typically the parameter file name.
    type InitData;
    type InitError;

    /// Demands for this cycle.
    type InputData;
    /// Demands the module issued this cycle.
    type OutputData;
    /// Flags describing how this cycle's processing went.
    type StatusReport;
    type ProcError;

    /// Load parameters and open any archives within `session`.
    ///
    /// A module must still be usable through `proc` without `init`, with
    /// the parameters it was built with and nothing archived.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Run one control cycle.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
