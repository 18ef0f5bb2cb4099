//! # Waypoint file loading
//!
//! Waypoint files are line oriented: each line is either a comma-separated
//! record of one joint position per axis (a pose, radians), or one of the
//! literal action tokens `grasp` / `release` on its own line. Empty lines
//! are ignored.
//!
//! Actions are represented as their own [`Waypoint`] variants rather than as
//! magic pose values, so a legitimate pose can never collide with an action
//! marker.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use crate::motion_gen::{JointVector, Limits, NUM_AXES};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Token marking a gripper grasp action in a waypoint file.
const GRASP_TOKEN: &str = "grasp";

/// Token marking a gripper release action in a waypoint file.
const RELEASE_TOKEN: &str = "release";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A single entry in a waypoint sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Waypoint {
    /// A joint-space pose to move to.
    Pose(JointVector),

    /// Close the gripper on the target object.
    Grasp,

    /// Open the gripper.
    Release,
}

/// Possible errors that can occur while loading a waypoint file.
#[derive(Debug, Error)]
pub enum WaypointError {
    #[error("Could not find the waypoint file at {0}")]
    FileNotFound(String),

    #[error("Could not load the waypoint file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Line {0}: expected one position per axis, found {1} fields")]
    WrongFieldCount(usize, usize),

    #[error("Line {0}: invalid joint position: {1}")]
    InvalidValue(usize, std::num::ParseFloatError),

    #[error("Line {line}: axis {axis} position {value_rad} rad is outside the joint range")]
    PoseOutOfRange {
        line: usize,
        axis: usize,
        value_rad: f64,
    },
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a waypoint sequence from the given file.
///
/// Each pose is validated against the joint range once, here, so the
/// sequencing loop never feeds the motion generator a pose it would reject.
pub fn load<P: AsRef<Path>>(path: P, limits: &Limits) -> Result<Vec<Waypoint>, WaypointError> {
    let path = PathBuf::from(path.as_ref());

    if !path.exists() {
        return Err(WaypointError::FileNotFound(
            path.to_string_lossy().into_owned(),
        ));
    }

    let text = fs::read_to_string(&path).map_err(WaypointError::FileLoadError)?;

    let mut waypoints = Vec::new();

    for (line_idx, line) in text.lines().enumerate() {
        let line_num = line_idx + 1;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        match line {
            GRASP_TOKEN => waypoints.push(Waypoint::Grasp),
            RELEASE_TOKEN => waypoints.push(Waypoint::Release),
            record => waypoints.push(Waypoint::Pose(parse_pose(record, line_num, limits)?)),
        }
    }

    Ok(waypoints)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Parse one comma-separated pose record.
fn parse_pose(
    record: &str,
    line_num: usize,
    limits: &Limits,
) -> Result<JointVector, WaypointError> {
    let fields: Vec<&str> = record.split(',').collect();

    if fields.len() != NUM_AXES {
        return Err(WaypointError::WrongFieldCount(line_num, fields.len()));
    }

    let mut pos_rad = JointVector::zeros();
    for (i, field) in fields.iter().enumerate() {
        pos_rad[i] = field
            .trim()
            .parse()
            .map_err(|e| WaypointError::InvalidValue(line_num, e))?;
    }

    if let Some(axis) = limits.first_invalid_axis(&pos_rad) {
        return Err(WaypointError::PoseOutOfRange {
            line: line_num,
            axis,
            value_rad: pos_rad[axis],
        });
    }

    Ok(pos_rad)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn test_limits() -> Limits {
        Limits {
            min_abs_pos_rad: [-2.8973, -1.7628, -2.8973, -3.0718, -2.8973, -0.0175, -2.8973],
            max_abs_pos_rad: [2.8973, 1.7628, 2.8973, -0.0698, 2.8973, 3.7525, 2.8973],
            max_abs_rate_rads: [2.0; NUM_AXES],
            max_start_acc_radss: [5.0; NUM_AXES],
            max_goal_acc_radss: [5.0; NUM_AXES],
        }
    }

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("arm_exec_waypoints_{}_{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_sequence() {
        let path = write_temp(
            "sequence.txt",
            "0.1, -0.3, 0.0, -1.5, 0.0, 1.2, 0.7\n\
             grasp\n\
             \n\
             0.0, 0.0, 0.0, -1.5, 0.0, 1.5, 0.0\n\
             release\n",
        );

        let waypoints = load(&path, &test_limits()).unwrap();

        assert_eq!(waypoints.len(), 4);
        assert!(matches!(waypoints[0], Waypoint::Pose(_)));
        assert_eq!(waypoints[1], Waypoint::Grasp);
        assert!(matches!(waypoints[2], Waypoint::Pose(_)));
        assert_eq!(waypoints[3], Waypoint::Release);

        if let Waypoint::Pose(pos) = &waypoints[0] {
            assert!((pos[1] - -0.3).abs() < 1e-12);
            assert!((pos[6] - 0.7).abs() < 1e-12);
        }
    }

    #[test]
    fn test_missing_file() {
        let result = load("definitely/not/a/file.txt", &test_limits());
        assert!(matches!(result, Err(WaypointError::FileNotFound(_))));
    }

    #[test]
    fn test_wrong_field_count() {
        let path = write_temp("short.txt", "0.1, -0.3, 0.0, -1.5\n");

        match load(&path, &test_limits()) {
            Err(WaypointError::WrongFieldCount(line, count)) => {
                assert_eq!(line, 1);
                assert_eq!(count, 4);
            }
            other => panic!("expected WrongFieldCount, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_value() {
        let path = write_temp(
            "bad_float.txt",
            "0.1, -0.3, 0.0, -1.5, 0.0, 1.2, 0.7\n\
             0.1, -0.3, zero, -1.5, 0.0, 1.2, 0.7\n",
        );

        match load(&path, &test_limits()) {
            Err(WaypointError::InvalidValue(line, _)) => assert_eq!(line, 2),
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_pose_out_of_range() {
        let path = write_temp("range.txt", "0.1, 3.2, 0.0, -1.5, 0.0, 1.2, 0.7\n");

        match load(&path, &test_limits()) {
            Err(WaypointError::PoseOutOfRange { line, axis, .. }) => {
                assert_eq!(line, 1);
                assert_eq!(axis, 1);
            }
            other => panic!("expected PoseOutOfRange, got {:?}", other),
        }
    }
}
