//! # Arm control library.
//!
//! This library allows other crates in the workspace (and the tests) to
//! access items defined inside the arm executable crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm client - connection to the physical arm and gripper
pub mod arm_client;

/// Arm control module - tracks point-to-point motions cycle by cycle
pub mod arm_ctrl;

/// Motion generation - synchronized multi-axis trajectory generation
pub mod motion_gen;

/// Waypoint file loading
pub mod waypoints;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Target period of one control cycle.
pub const CYCLE_PERIOD_S: f64 = 0.001;

/// Number of cycles per second
pub const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;
