//! Host platform utility functions

use std::path::PathBuf;

/// Name of the environment variable pointing at the root of the software
/// tree. Parameter files and session directories are resolved relative to it.
pub const SW_ROOT_ENV_VAR: &str = "ARM_SW_ROOT";

/// Get the root directory of the arm software tree.
pub fn get_arm_sw_root() -> Result<PathBuf, std::env::VarError> {
    Ok(PathBuf::from(std::env::var(SW_ROOT_ENV_VAR)?))
}
