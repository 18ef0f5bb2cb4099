//! # Arm client
//!
//! Abstraction over the connection to the physical arm and gripper. The
//! control loop only depends on the [`ArmInterface`] trait; [`SimArm`]
//! provides a perfect-tracking implementation used when no hardware is
//! attached.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;

// Internal
use crate::motion_gen::JointVector;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Interface to the arm and its gripper.
pub trait ArmInterface {
    /// Read the current joint configuration. Called once per cycle.
    fn read_state(&mut self) -> Result<JointVector, ArmClientError>;

    /// Command absolute joint position demands.
    fn command_positions(&mut self, pos_rad: &JointVector) -> Result<(), ArmClientError>;

    /// Close the gripper on the target object.
    fn grasp(&mut self) -> Result<(), ArmClientError>;

    /// Open the gripper.
    fn release(&mut self) -> Result<(), ArmClientError>;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur when communicating with the arm.
#[derive(Debug, thiserror::Error)]
pub enum ArmClientError {
    #[error("Lost the connection to the arm: {0}")]
    ConnectionLost(String),

    #[error("The gripper could not complete the action: {0}")]
    GripperFailed(String),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Simulated arm which tracks commanded positions perfectly.
pub struct SimArm {
    pos_rad: JointVector,
    gripper_closed: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimArm {
    /// Create a new simulated arm resting at the given configuration.
    pub fn new(initial_pos_rad: JointVector) -> Self {
        Self {
            pos_rad: initial_pos_rad,
            gripper_closed: false,
        }
    }

    /// True if the gripper is currently closed.
    pub fn is_gripper_closed(&self) -> bool {
        self.gripper_closed
    }
}

impl ArmInterface for SimArm {
    fn read_state(&mut self) -> Result<JointVector, ArmClientError> {
        Ok(self.pos_rad)
    }

    fn command_positions(&mut self, pos_rad: &JointVector) -> Result<(), ArmClientError> {
        self.pos_rad = *pos_rad;
        Ok(())
    }

    fn grasp(&mut self) -> Result<(), ArmClientError> {
        info!("SimArm: closing gripper");
        self.gripper_closed = true;
        Ok(())
    }

    fn release(&mut self) -> Result<(), ArmClientError> {
        info!("SimArm: opening gripper");
        self.gripper_closed = false;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
