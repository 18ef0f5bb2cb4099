//! # Motion generation module
//!
//! Motion generation produces synchronized, time-optimal point-to-point
//! trajectories in joint space. Given the current configuration and a goal
//! configuration it yields, once per control cycle, the next position demand
//! for every axis such that all axes start and stop moving together, respect
//! their individual rate and acceleration limits, and arrive at the goal
//! exactly.
//!
//! Each axis follows a three phase transition: bang-acceleration, constant
//! rate cruise, bang-deceleration. The timings are first derived per axis in
//! isolation (`profile`), then reconciled into one shared arrival time
//! (`sync`), and finally evaluated at the elapsed motion time each cycle
//! (`sampler`). [`MotionGenerator`] owns the per-motion state machine tying
//! these together.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod generator;
mod profile;
mod sampler;
mod sync;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
pub use generator::*;
pub use sync::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of actuated axes on the arm.
pub const NUM_AXES: usize = 7;

/// Displacements smaller than this are treated as "already there". The axis
/// is reported finished immediately and takes no part in the motion.
///
/// Units: radians
pub const MIN_MOTION_DELTA_RAD: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A fixed size vector with one element per arm axis.
///
/// The dimension must match [`NUM_AXES`].
pub type JointVector = nalgebra::VectorN<f64, nalgebra::U7>;

/// A request for a single point-to-point motion.
#[derive(Debug, Clone)]
pub struct MotionRequest {
    /// Uniform throttle on the limit table, in `[0, 1]`.
    pub speed_factor: f64,

    /// Target joint configuration.
    ///
    /// Units: radians
    pub goal_pos_rad: JointVector,
}

/// Per-axis kinematic limit table for the arm.
///
/// Immutable for the lifetime of a motion. Speed scaling is applied into a
/// derived [`ScaledLimits`] value, never back into this table.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Limits {
    /// Minimum axis absolute position (lowest negative value)
    ///
    /// Units: radians
    pub min_abs_pos_rad: [f64; NUM_AXES],

    /// Maximum axis absolute position (highest positive value)
    ///
    /// Units: radians
    pub max_abs_pos_rad: [f64; NUM_AXES],

    /// Maximum axis rate, strictly positive
    ///
    /// Units: radians/second
    pub max_abs_rate_rads: [f64; NUM_AXES],

    /// Maximum acceleration leaving the start configuration, strictly
    /// positive
    ///
    /// Units: radians/second^2
    pub max_start_acc_radss: [f64; NUM_AXES],

    /// Maximum acceleration arriving at the goal configuration, strictly
    /// positive
    ///
    /// Units: radians/second^2
    pub max_goal_acc_radss: [f64; NUM_AXES],
}

/// Limits for one motion after applying the speed factor.
#[derive(Debug, Clone)]
pub(crate) struct ScaledLimits {
    pub dq_max: JointVector,
    pub ddq_max_start: JointVector,
    pub ddq_max_goal: JointVector,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors when constructing a motion.
#[derive(Debug, thiserror::Error)]
pub enum MotionError {
    #[error("Speed factor must be in (0, 1], got {0}")]
    InvalidSpeedFactor(f64),

    #[error("Goal position for axis {axis} ({value_rad} rad) is outside the joint range")]
    GoalOutOfRange { axis: usize, value_rad: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Limits {
    /// Check that the given configuration is inside the joint range on every
    /// axis.
    pub fn is_pos_valid(&self, pos_rad: &JointVector) -> bool {
        self.first_invalid_axis(pos_rad).is_none()
    }

    /// Get the first axis whose position is outside the joint range, or
    /// `None` if the whole configuration is valid.
    pub fn first_invalid_axis(&self, pos_rad: &JointVector) -> Option<usize> {
        (0..NUM_AXES).find(|&i| {
            pos_rad[i] < self.min_abs_pos_rad[i] || pos_rad[i] > self.max_abs_pos_rad[i]
        })
    }

    /// Derive the limits for a motion run at the given speed factor.
    pub(crate) fn scaled(&self, speed_factor: f64) -> ScaledLimits {
        ScaledLimits {
            dq_max: JointVector::from(self.max_abs_rate_rads) * speed_factor,
            ddq_max_start: JointVector::from(self.max_start_acc_radss) * speed_factor,
            ddq_max_goal: JointVector::from(self.max_goal_acc_radss) * speed_factor,
        }
    }
}
