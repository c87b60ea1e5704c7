//! # Keyed PID controller
//!
//! A table of independent PID controllers sharing one algorithm. Each
//! control loop (heading lock, position hold on each axis, ...) is addressed
//! by its own key and owns its own gains and error terms.
//!
//! The table is an ordinary owned value. Consumers are handed a `&mut` to it
//! each cycle. If it must be shared between threads wrap it in a `Mutex`, as
//! `compute` is a read-modify-write of the entry.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains of a single controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Dervative gain
    pub k_d: f64,
}

/// The state held for each key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PidEntry {
    pub gains: PidGains,

    /// Error passed into the previous `compute`
    pub last_error: f64,

    /// Running sum of every error passed into `compute`.
    ///
    /// The sum is not clamped.
    pub integral: f64,
}

/// A table of PID controllers addressed by key.
#[derive(Debug, Clone)]
pub struct KeyedPid<K = String>
where
    K: Eq + Hash,
{
    entries: HashMap<K, PidEntry>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidGains {
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self { k_p, k_i, k_d }
    }
}

impl<K> Default for KeyedPid<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K> KeyedPid<K>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Install gains for the key.
    ///
    /// Accumulated error terms of an existing key are kept, a new key starts
    /// from zero.
    pub fn set<Q: Into<K>>(&mut self, key: Q, gains: PidGains) {
        self.entries.entry(key.into()).or_default().gains = gains;
    }

    /// Zero the error terms of the key, keeping its gains.
    ///
    /// An unknown key is created with zero gains.
    pub fn clear<Q: Into<K>>(&mut self, key: Q) {
        let entry = self.entries.entry(key.into()).or_default();
        entry.last_error = 0.0;
        entry.integral = 0.0;
    }

    /// Run the controller for the key on this cycle's error.
    ///
    /// Returns 0 for a key which has never been configured, the controller is
    /// inert until `set` has been called.
    pub fn compute<Q>(&mut self, key: &Q, error: f64) -> f64
    where
        K: Borrow<Q>,
        Q: Eq + Hash + Debug + ?Sized,
    {
        let entry = match self.entries.get_mut(key) {
            Some(e) => e,
            None => return 0.0,
        };

        let g = entry.gains;
        let integral = entry.integral + error;

        let out = g.k_p * error + g.k_i * integral + g.k_d * (error - entry.last_error);

        entry.last_error = error;
        entry.integral = integral;

        trace!("PID {:?}: error {:.4}, output {:.4}", key, error, out);

        out
    }

    /// Install gains and run the controller in one step.
    pub fn compute_with<Q>(&mut self, key: &Q, error: f64, gains: PidGains) -> f64
    where
        K: Borrow<Q>,
        Q: Eq + Hash + Debug + ToOwned<Owned = K> + ?Sized,
    {
        self.set(key.to_owned(), gains);
        self.compute(key, error)
    }

    /// Current state of the key, if it has been created.
    pub fn entry<Q>(&self, key: &Q) -> Option<&PidEntry>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.get(key)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_unconfigured_key() {
        let mut pid: KeyedPid = KeyedPid::new();

        assert_eq!(pid.compute("spin", 12.0), 0.0);
        assert_eq!(pid.compute("spin", -1e9), 0.0);

        // Computing must not create the entry
        assert!(pid.entry("spin").is_none());
    }

    #[test]
    fn test_compute() {
        let mut pid: KeyedPid = KeyedPid::new();
        pid.set("spin", PidGains::new(2.0, 0.5, 1.0));

        // p = 8, i = 0.5 * 4, d = 1 * (4 - 0)
        assert_eq!(pid.compute("spin", 4.0), 14.0);
        // p = 2, i = 0.5 * 5, d = 1 * (1 - 4)
        assert_eq!(pid.compute("spin", 1.0), 1.5);

        let e = pid.entry("spin").unwrap();
        assert_eq!(e.last_error, 1.0);
        assert_eq!(e.integral, 5.0);
    }

    #[test]
    fn test_keys_are_independent() {
        let mut pid: KeyedPid = KeyedPid::new();
        pid.set("forward", PidGains::new(1.0, 1.0, 0.0));
        pid.set("strafe", PidGains::new(1.0, 1.0, 0.0));

        pid.compute("forward", 10.0);
        pid.compute("forward", 10.0);

        assert_eq!(pid.compute("strafe", 1.0), 2.0);
        assert_eq!(pid.entry("forward").unwrap().integral, 20.0);
    }

    #[test]
    fn test_determinism() {
        let gains = PidGains::new(0.3, 0.02, 0.7);
        let errors = [5.0, 4.2, -1.3, 0.0, 7.7, -3.25];

        let mut a: KeyedPid = KeyedPid::new();
        let mut b: KeyedPid = KeyedPid::new();
        a.set("x", gains);
        b.set("x", gains);

        let out_a: Vec<f64> = errors.iter().map(|e| a.compute("x", *e)).collect();
        let out_b: Vec<f64> = errors.iter().map(|e| b.compute("x", *e)).collect();

        assert_eq!(out_a, out_b);
    }

    #[test]
    fn test_set_keeps_error_terms() {
        let mut pid: KeyedPid = KeyedPid::new();
        pid.set("spin", PidGains::new(1.0, 0.0, 0.0));
        pid.compute("spin", 3.0);
        pid.compute("spin", 5.0);

        // New gains, error terms of 5 (last) and 8 (sum) survive
        pid.set("spin", PidGains::new(0.0, 1.0, 1.0));
        assert_eq!(pid.compute("spin", 2.0), 10.0 + (2.0 - 5.0));
    }

    #[test]
    fn test_clear() {
        let mut pid: KeyedPid = KeyedPid::new();
        pid.set("spin", PidGains::new(1.0, 1.0, 1.0));
        pid.compute("spin", 3.0);

        pid.clear("spin");
        let e = pid.entry("spin").unwrap();
        assert_eq!(e.last_error, 0.0);
        assert_eq!(e.integral, 0.0);
        assert_eq!(e.gains, PidGains::new(1.0, 1.0, 1.0));

        // p = 2, i = 2, d = 2
        assert_eq!(pid.compute("spin", 2.0), 6.0);

        // Clearing an unknown key installs zero gains
        pid.clear("strafe");
        assert_eq!(pid.entry("strafe").unwrap().gains, PidGains::default());
        assert_eq!(pid.compute("strafe", 100.0), 0.0);
    }

    #[test]
    fn test_compute_with() {
        let mut pid: KeyedPid = KeyedPid::new();
        let gains = PidGains::new(1.0, 0.0, 0.0);

        assert_eq!(pid.compute_with("lift", 2.0, gains), 2.0);
        assert_eq!(pid.entry("lift").unwrap().last_error, 2.0);

        // Same as set followed by compute, error terms persist
        assert_eq!(pid.compute_with("lift", 1.0, PidGains::new(0.0, 1.0, 0.0)), 3.0);
    }
}
