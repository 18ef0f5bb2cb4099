//! Parameters structure for ArmCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::motion_gen::{Limits, NUM_AXES};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Arm control.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Params {
    // ---- CAPABILITIES ----
    /// Per-axis kinematic limit table.
    pub limits: Limits,

    // ---- MOTION ----
    /// Speed factor applied to motions, in `[0, 1]`.
    ///
    /// Scales the rate and acceleration limits uniformly across all axes.
    pub speed_factor: f64,

    /// Default SAFE position of the arm.
    ///
    /// Units: radians
    pub default_pos_rad: [f64; NUM_AXES],
}
