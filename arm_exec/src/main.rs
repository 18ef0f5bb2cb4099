//! Main arm-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logger and modules
//!     - Load the waypoint sequence
//!     - For each waypoint in order:
//!         - Pose: drive the ArmCtrl module at the cycle rate until the
//!           motion generator reports finished
//!         - Grasp/Release: command the gripper through the arm client
//!
//! Each pose is tracked by a fresh motion generator which synchronizes all
//! axes to start and stop together, so the arm follows a straight line in
//! joint space between waypoints.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use arm_lib::{
    arm_client::{ArmInterface, SimArm},
    arm_ctrl::{ArmCtrl, InputData, Params},
    motion_gen::{JointVector, MotionRequest},
    waypoints::{self, Waypoint},
    CYCLE_FREQUENCY_HZ, CYCLE_PERIOD_S,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default waypoint file used when no path is given on the command line.
const DEFAULT_WAYPOINT_FILE: &str = "demos/waypoints.txt";

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("arm_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Arm Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: Params =
        util::params::load("arm_exec.toml").wrap_err("Could not load arm_exec params")?;

    info!("Exec parameters loaded");

    // ---- LOAD WAYPOINTS ----

    let args: Vec<String> = env::args().collect();

    let waypoint_path = match args.len() {
        1 => String::from(DEFAULT_WAYPOINT_FILE),
        2 => args[1].clone(),
        _ => return Err(eyre!("Usage: arm_exec [waypoint_file]")),
    };

    let waypoints = waypoints::load(&waypoint_path, &params.limits)
        .wrap_err("Failed to load the waypoint file")?;

    info!(
        "Loaded {} waypoints from \"{}\"\n",
        waypoints.len(),
        waypoint_path
    );

    // ---- MODULE INITIALISATION ----

    let mut arm_ctrl = ArmCtrl::default();
    arm_ctrl
        .init("arm_exec.toml", &session)
        .wrap_err("Failed to initialise ArmCtrl")?;

    // No hardware transport in this baseline, drive the simulated arm
    let mut arm = SimArm::new(JointVector::from(params.default_pos_rad));

    info!(
        "Initialisation complete, starting waypoint sequence at {} Hz",
        CYCLE_FREQUENCY_HZ
    );

    // ---- SEQUENCE WAYPOINTS ----

    let num_waypoints = waypoints.len();
    let cycle_period = Duration::from_secs_f64(CYCLE_PERIOD_S);

    for (wp_idx, waypoint) in waypoints.into_iter().enumerate() {
        info!("Starting waypoint {} of {}", wp_idx + 1, num_waypoints);

        match waypoint {
            Waypoint::Grasp => {
                arm.grasp().wrap_err("Failed to grasp the object")?;
            }
            Waypoint::Release => {
                arm.release().wrap_err("Failed to open the gripper")?;
            }
            Waypoint::Pose(goal) => {
                // Each pose gets a fresh single-use generator inside ArmCtrl
                let mut request = Some(MotionRequest {
                    speed_factor: params.speed_factor,
                    goal_pos_rad: goal,
                });

                loop {
                    let cycle_start = Instant::now();

                    // System input acquisition
                    let current = arm
                        .read_state()
                        .wrap_err("Failed to read the arm state")?;

                    // Arm control processing
                    let (output, _report) = arm_ctrl
                        .proc(&InputData {
                            current_pos_rad: current,
                            request: request.take(),
                            period_s: CYCLE_PERIOD_S,
                        })
                        .wrap_err("ArmCtrl processing failed")?;

                    // Command the demands to the arm
                    arm.command_positions(&JointVector::from(output.pos_rad))
                        .wrap_err("Failed to command the arm")?;

                    // Write the archives
                    if let Err(e) = arm_ctrl.write() {
                        warn!("Could not write archives: {}", e);
                    }

                    if output.motion_finished {
                        let residual = util::maths::norm(&output.pos_rad, goal.as_slice())
                            .unwrap_or(std::f64::NAN);
                        info!(
                            "Waypoint {} reached (residual {:.2e} rad)",
                            wp_idx + 1,
                            residual
                        );
                        break;
                    }

                    // Maintain the cycle period
                    let elapsed = cycle_start.elapsed();
                    if elapsed < cycle_period {
                        thread::sleep(cycle_period - elapsed);
                    }
                }
            }
        }

        info!("Ending waypoint {}", wp_idx + 1);
    }

    info!("Waypoint sequence complete");

    Ok(())
}
