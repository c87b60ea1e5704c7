//! Chassis geometry

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use serde::Serialize;

use super::{DriveCtrlError, NUM_MODULES};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Bearing of every module from the chassis centre.
///
/// Bearings are in the robot frame, measured from chassis forward. Module 1
/// sits at `atan(half_length / half_width)` and the others are its
/// reflections, going clockwise round the chassis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModuleGeometry {
    /// Units: degrees,
    /// Frame: Robot
    pub bearings_deg: [f64; NUM_MODULES],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ModuleGeometry {
    /// Derive the module bearings from the distances of the wheel contact
    /// points to the chassis centre lines.
    pub fn from_dims(half_width: f64, half_length: f64) -> Result<Self, DriveCtrlError> {
        let valid = |d: f64| d.is_finite() && d > 0.0;

        if !valid(half_width) || !valid(half_length) {
            return Err(DriveCtrlError::InvalidGeometry {
                half_width,
                half_length,
            });
        }

        let m1 = (half_length / half_width).atan().to_degrees();
        let m2 = 180.0 - m1;

        let bearings_deg = [m1, m2, -m2, -m1];

        debug!("Module bearings: {:?}", bearings_deg);

        Ok(Self { bearings_deg })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_dims() {
        let g = ModuleGeometry::from_dims(10.0, 10.0).unwrap();
        let expected = [45.0, 135.0, -135.0, -45.0];
        for (b, e) in g.bearings_deg.iter().zip(expected.iter()) {
            assert!((b - e).abs() < 1e-9, "{:?}", g.bearings_deg);
        }

        // Reflections are exact whatever the first bearing
        let g = ModuleGeometry::from_dims(21.85 / 2.0, 25.85 / 2.0).unwrap();
        let [m1, m2, m3, m4] = g.bearings_deg;
        assert!(m1 > 45.0 && m1 < 90.0);
        assert_eq!(m2, 180.0 - m1);
        assert_eq!(m3, -m2);
        assert_eq!(m4, -m1);
    }

    #[test]
    fn test_invalid_dims() {
        assert!(matches!(
            ModuleGeometry::from_dims(0.0, 10.0),
            Err(DriveCtrlError::InvalidGeometry { .. })
        ));
        assert!(ModuleGeometry::from_dims(10.0, -1.0).is_err());
        assert!(ModuleGeometry::from_dims(std::f64::INFINITY, 1.0).is_err());
    }
}
