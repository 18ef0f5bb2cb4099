//! Implementations for the ArmCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Serialize;

// Internal
use super::Params;
use crate::motion_gen::{JointVector, MotionGenerator, MotionRequest, NUM_AXES};
use util::{
    archive::{Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Arm control module state
#[derive(Default)]
pub struct ArmCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    /// The generator tracking the current motion, if any. Single use: it is
    /// dropped as soon as it reports finished.
    pub(crate) generator: Option<MotionGenerator>,

    pub(crate) output: Option<OutputData>,
    arch_output: Archiver,
}

/// Input data to Arm Control.
pub struct InputData {
    /// The joint configuration reported by the arm this cycle.
    ///
    /// Units: radians
    pub current_pos_rad: JointVector,

    /// A new motion request, or `None` if there is no new request on this
    /// cycle.
    pub request: Option<MotionRequest>,

    /// Time elapsed since the previous cycle.
    ///
    /// Units: seconds
    pub period_s: f64,
}

/// Output demand from ArmCtrl that the arm must execute.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct OutputData {
    /// Joint absolute position demand.
    ///
    /// Units: radians
    pub pos_rad: [f64; NUM_AXES],

    /// True once the commanded motion has completed (also true when no
    /// motion has been commanded).
    pub motion_finished: bool,
}

impl Default for OutputData {
    fn default() -> Self {
        OutputData {
            pos_rad: [0.0; NUM_AXES],
            motion_finished: true,
        }
    }
}

/// Status report for ArmCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True while a motion is being tracked.
    pub motion_active: bool,

    /// Shared arrival time of the active motion, zero when idle.
    ///
    /// Units: seconds
    pub motion_duration_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for ArmCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = super::ArmCtrlError;

    /// Initialise the ArmCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(
        &mut self,
        init_data: Self::InitData,
        session: &Session,
    ) -> Result<(), Self::InitError> {
        // Load the parameters
        self.params = match params::load(init_data) {
            Ok(p) => p,
            Err(e) => return Err(e),
        };

        // Create the arch folder for arm_ctrl
        let mut arch_path = session.arch_root.clone();
        arch_path.push("arm_ctrl");
        std::fs::create_dir_all(arch_path).unwrap();

        // Initialise the archivers
        self.arch_report = Archiver::from_path(session, "arm_ctrl/status_report.csv").unwrap();
        self.arch_output = Archiver::from_path(session, "arm_ctrl/output.csv").unwrap();

        Ok(())
    }

    /// Perform cyclic processing of Arm Control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        // Check to see if there's a new request
        if let Some(request) = &input_data.request {
            // A motion in progress must run to completion first, there is no
            // in-motion re-planning
            if self.generator.is_some() {
                return Err(super::ArmCtrlError::MotionInProgress);
            }

            debug!("New ArmCtrl MotionRequest: {:?}", request);

            self.generator = Some(
                MotionGenerator::new(
                    request.speed_factor,
                    request.goal_pos_rad,
                    &self.params.limits,
                )
                .map_err(super::ArmCtrlError::InvalidRequest)?,
            );
        }

        let output = match self.generator {
            Some(ref mut generator) => {
                let (pos, finished) =
                    generator.sample(&input_data.current_pos_rad, input_data.period_s);

                self.report.motion_active = !finished;
                self.report.motion_duration_s = match generator.plan() {
                    Some(p) => p.max_t_f(),
                    None => 0.0,
                };

                let mut pos_rad = [0f64; NUM_AXES];
                for i in 0..NUM_AXES {
                    pos_rad[i] = pos[i];
                }

                OutputData {
                    pos_rad,
                    motion_finished: finished,
                }
            }
            None => {
                // No motion: hold the previous demand, or the current
                // position if nothing has been commanded yet.
                match self.output {
                    Some(po) => po,
                    None => {
                        let mut pos_rad = [0f64; NUM_AXES];
                        for i in 0..NUM_AXES {
                            pos_rad[i] = input_data.current_pos_rad[i];
                        }

                        OutputData {
                            pos_rad,
                            motion_finished: true,
                        }
                    }
                }
            }
        };

        // Drop the generator once the motion completes, it is single use
        if output.motion_finished {
            self.generator = None;
        }

        // Update the output in self
        self.output = Some(output);

        Ok((output, self.report))
    }
}

impl Archived for ArmCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Write each one individually
        self.arch_report.serialise(self.report)?;
        self.arch_output.serialise(self.output)?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::motion_gen::Limits;

    fn test_arm_ctrl() -> ArmCtrl {
        let mut arm_ctrl = ArmCtrl::default();
        arm_ctrl.params = Params {
            limits: Limits {
                min_abs_pos_rad: [-2.8973, -1.7628, -2.8973, -3.0718, -2.8973, -0.0175, -2.8973],
                max_abs_pos_rad: [2.8973, 1.7628, 2.8973, -0.0698, 2.8973, 3.7525, 2.8973],
                max_abs_rate_rads: [2.0, 2.0, 2.0, 2.0, 2.5, 2.5, 2.5],
                max_start_acc_radss: [5.0; NUM_AXES],
                max_goal_acc_radss: [5.0; NUM_AXES],
            },
            speed_factor: 0.5,
            default_pos_rad: [0.0, -0.7854, 0.0, -2.3562, 0.0, 1.5708, 0.7854],
        };
        arm_ctrl
    }

    #[test]
    fn test_motion_to_goal() {
        let mut arm_ctrl = test_arm_ctrl();
        let mut current = JointVector::from(arm_ctrl.params.default_pos_rad);
        let mut goal = current;
        goal[0] = 0.5;
        goal[3] = -1.8;

        let mut request = Some(MotionRequest {
            speed_factor: arm_ctrl.params.speed_factor,
            goal_pos_rad: goal,
        });

        let mut finished = false;
        for _ in 0..100_000 {
            let (output, report) = arm_ctrl
                .proc(&InputData {
                    current_pos_rad: current,
                    request: request.take(),
                    period_s: 0.001,
                })
                .unwrap();

            current = JointVector::from(output.pos_rad);

            if output.motion_finished {
                assert!(!report.motion_active);
                finished = true;
                break;
            }
        }

        assert!(finished, "motion never finished");
        for i in 0..NUM_AXES {
            assert!((current[i] - goal[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_request_while_active_rejected() {
        let mut arm_ctrl = test_arm_ctrl();
        let current = JointVector::from(arm_ctrl.params.default_pos_rad);
        let mut goal = current;
        goal[0] = 1.0;

        let request = MotionRequest {
            speed_factor: 0.5,
            goal_pos_rad: goal,
        };

        // First cycle starts the motion
        arm_ctrl
            .proc(&InputData {
                current_pos_rad: current,
                request: Some(request.clone()),
                period_s: 0.001,
            })
            .unwrap();

        // A second request mid-motion is rejected
        let result = arm_ctrl.proc(&InputData {
            current_pos_rad: current,
            request: Some(request),
            period_s: 0.001,
        });

        assert!(matches!(result, Err(super::super::ArmCtrlError::MotionInProgress)));
    }

    #[test]
    fn test_idle_holds_position() {
        let mut arm_ctrl = test_arm_ctrl();
        let current = JointVector::from(arm_ctrl.params.default_pos_rad);

        let (output, report) = arm_ctrl
            .proc(&InputData {
                current_pos_rad: current,
                request: None,
                period_s: 0.001,
            })
            .unwrap();

        assert!(output.motion_finished);
        assert!(!report.motion_active);
        for i in 0..NUM_AXES {
            assert_eq!(output.pos_rad[i], current[i]);
        }
    }

    #[test]
    fn test_invalid_request_rejected() {
        let mut arm_ctrl = test_arm_ctrl();
        let current = JointVector::from(arm_ctrl.params.default_pos_rad);
        let mut goal = current;
        goal[2] = 100.0;

        let result = arm_ctrl.proc(&InputData {
            current_pos_rad: current,
            request: Some(MotionRequest {
                speed_factor: 0.5,
                goal_pos_rad: goal,
            }),
            period_s: 0.001,
        });

        assert!(matches!(
            result,
            Err(super::super::ArmCtrlError::InvalidRequest(_))
        ));
    }
}
