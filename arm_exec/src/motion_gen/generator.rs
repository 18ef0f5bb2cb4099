//! Single-motion generator state machine

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
use super::{sampler, JointVector, Limits, MotionError, ScaledLimits, SyncPlan};
use util::raise_error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Generator for one synchronized point-to-point motion.
///
/// A generator is single use: it is constructed for one goal, sampled once
/// per control cycle until it reports finished, then discarded. The next
/// waypoint needs a new instance.
///
/// The start configuration is not known at construction, only once the
/// control loop supplies the live state, so the synchronized plan is computed
/// on the first call to [`MotionGenerator::sample`].
pub struct MotionGenerator {
    /// Target joint configuration, validated at construction.
    q_goal: JointVector,

    /// Limits for this motion, speed factor already applied.
    limits: ScaledLimits,

    /// Start configuration, captured on the first sample.
    q_start: JointVector,

    /// Elapsed time since the first sample.
    ///
    /// Units: seconds
    time_s: f64,

    /// The synchronized plan, computed once on the first sample.
    plan: Option<SyncPlan>,

    state: GenState,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Lifecycle of a motion generator.
#[derive(Debug, Clone, Copy, PartialEq)]
enum GenState {
    /// Constructed, no sample taken yet.
    Uninitialised,

    /// Plan computed, tracking the trajectory.
    Tracking,

    /// All axes arrived, further sampling is a caller contract violation.
    Finished,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionGenerator {
    /// Create a new generator for the given goal.
    ///
    /// # Inputs
    /// - `speed_factor`: uniform throttle on the limit table, in `(0, 1]`
    /// - `q_goal`: target joint configuration, radians
    /// - `limits`: the arm's kinematic limit table
    ///
    /// Fails fast, before any motion, if the speed factor is outside `(0, 1]`
    /// or the goal is outside the joint range. Zero is rejected along with
    /// negative factors: scaling the limit table to zero leaves the phase
    /// timings undefined, so no valid demand could ever be produced.
    pub fn new(
        speed_factor: f64,
        q_goal: JointVector,
        limits: &Limits,
    ) -> Result<Self, MotionError> {
        if !(speed_factor > 0.0 && speed_factor <= 1.0) {
            return Err(MotionError::InvalidSpeedFactor(speed_factor));
        }

        if let Some(axis) = limits.first_invalid_axis(&q_goal) {
            return Err(MotionError::GoalOutOfRange {
                axis,
                value_rad: q_goal[axis],
            });
        }

        Ok(Self {
            q_goal,
            limits: limits.scaled(speed_factor),
            q_start: JointVector::zeros(),
            time_s: 0.0,
            plan: None,
            state: GenState::Uninitialised,
        })
    }

    /// Sample the next joint position demand.
    ///
    /// The first call captures `current` as the authoritative start
    /// configuration and computes the synchronized plan at elapsed time
    /// zero. Each subsequent call accumulates `period_s` and evaluates the
    /// plan at the new elapsed time.
    ///
    /// # Inputs
    /// - `current`: the live joint configuration this cycle, radians
    /// - `period_s`: time since the previous sample, seconds
    ///
    /// # Outputs
    /// A tuple of:
    /// - the absolute joint position demand, radians
    /// - true once the motion has finished
    ///
    /// # Panics
    /// Sampling with a negative period, or after the motion has finished,
    /// raises an unrecoverable error: the trajectory maths is only valid for
    /// monotonically non-decreasing elapsed time, and a wrong position must
    /// never reach the hardware.
    pub fn sample(&mut self, current: &JointVector, period_s: f64) -> (JointVector, bool) {
        if period_s < 0.0 {
            raise_error!(
                "MotionGenerator sampled with a negative period ({} s)",
                period_s
            );
        }

        match self.state {
            GenState::Uninitialised => {
                self.q_start = *current;
                self.time_s = 0.0;

                let plan = SyncPlan::solve(&(self.q_goal - self.q_start), &self.limits);
                debug!(
                    "Motion planned: shared arrival in {:.3} s",
                    plan.max_t_f()
                );
                self.plan = Some(plan);

                self.state = GenState::Tracking;
            }
            GenState::Tracking => {
                self.time_s += period_s;
            }
            GenState::Finished => {
                raise_error!("MotionGenerator sampled after the motion finished");
            }
        }

        // Plan is always set by this point
        let plan = self.plan.as_ref().unwrap();

        let (delta_q_d, finished) = sampler::sample_offsets(plan, self.time_s);

        if finished {
            self.state = GenState::Finished;
        }

        (self.q_start + delta_q_d, finished)
    }

    /// True once the motion has finished.
    pub fn is_finished(&self) -> bool {
        self.state == GenState::Finished
    }

    /// The synchronized plan, or `None` before the first sample.
    pub fn plan(&self) -> Option<&SyncPlan> {
        self.plan.as_ref()
    }

    /// The goal configuration this generator was constructed for.
    pub fn goal(&self) -> &JointVector {
        &self.q_goal
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::motion_gen::NUM_AXES;

    /// Limit table of the reference 7 axis arm.
    fn test_limits() -> Limits {
        Limits {
            min_abs_pos_rad: [-2.8973, -1.7628, -2.8973, -3.0718, -2.8973, -0.0175, -2.8973],
            max_abs_pos_rad: [2.8973, 1.7628, 2.8973, -0.0698, 2.8973, 3.7525, 2.8973],
            max_abs_rate_rads: [2.0, 2.0, 2.0, 2.0, 2.5, 2.5, 2.5],
            max_start_acc_radss: [5.0; NUM_AXES],
            max_goal_acc_radss: [5.0; NUM_AXES],
        }
    }

    fn home_pos() -> JointVector {
        JointVector::from([0.0, -0.7854, 0.0, -2.3562, 0.0, 1.5708, 0.7854])
    }

    /// Run a generator to completion at a fixed period, returning the full
    /// sample trace and the number of cycles taken.
    fn run_to_completion(
        generator: &mut MotionGenerator,
        start: JointVector,
        period_s: f64,
    ) -> (Vec<JointVector>, usize) {
        let mut current = start;
        let mut trace = Vec::new();

        for cycle in 0..1_000_000 {
            let (pos, finished) = generator.sample(&current, period_s);
            trace.push(pos);
            current = pos;

            if finished {
                return (trace, cycle + 1);
            }
        }

        panic!("Motion did not finish");
    }

    #[test]
    fn test_invalid_speed_factor() {
        let limits = test_limits();

        assert!(MotionGenerator::new(1.5, home_pos(), &limits).is_err());
        assert!(MotionGenerator::new(-0.1, home_pos(), &limits).is_err());
        assert!(MotionGenerator::new(1.0, home_pos(), &limits).is_ok());
    }

    #[test]
    fn test_zero_speed_factor_rejected() {
        let limits = test_limits();
        let start = home_pos();
        let mut goal = start;
        goal[0] = 1.0;

        // A zero factor scales every rate limit to zero, which would make the
        // phase timings NaN and let the first sample demand the full goal
        // displacement in one cycle. It must be refused at construction.
        match MotionGenerator::new(0.0, goal, &limits) {
            Err(MotionError::InvalidSpeedFactor(f)) => assert_eq!(f, 0.0),
            other => panic!(
                "expected InvalidSpeedFactor, got {:?}",
                other.map(|_| ())
            ),
        }
    }

    #[test]
    fn test_goal_out_of_range() {
        let limits = test_limits();
        let mut goal = home_pos();
        goal[1] = 3.0;

        match MotionGenerator::new(0.5, goal, &limits) {
            Err(MotionError::GoalOutOfRange { axis, .. }) => assert_eq!(axis, 1),
            other => panic!("expected GoalOutOfRange, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_zero_motion() {
        let limits = test_limits();
        let start = home_pos();
        let mut generator = MotionGenerator::new(0.5, start, &limits).unwrap();

        // Goal equals start: finished immediately on the first sample with no
        // offset on any axis
        let (pos, finished) = generator.sample(&start, 0.001);

        assert!(finished);
        assert_eq!(pos, start);
        assert!(generator.is_finished());
    }

    #[test]
    fn test_exact_arrival() {
        let limits = test_limits();
        let start = home_pos();
        let mut goal = start;
        goal[0] = 1.0;
        goal[2] = -0.5;

        let mut generator = MotionGenerator::new(1.0, goal, &limits).unwrap();
        let (trace, _) = run_to_completion(&mut generator, start, 0.001);

        let end = trace.last().unwrap();
        for i in 0..NUM_AXES {
            assert!(
                (end[i] - goal[i]).abs() < 1e-9,
                "axis {} ended at {} instead of {}",
                i,
                end[i],
                goal[i]
            );
        }
    }

    #[test]
    fn test_synchronized_duration() {
        let limits = test_limits();
        let start = home_pos();
        let mut goal = start;
        goal[0] = 1.0;
        goal[1] = 0.5;
        goal[5] = 3.0;

        let mut generator = MotionGenerator::new(1.0, goal, &limits).unwrap();
        generator.sample(&start, 0.0);

        let plan = generator.plan().unwrap();
        let t_f = plan.max_t_f();
        for i in &[0usize, 1, 5] {
            assert!((plan.t_f_sync[*i] - t_f).abs() < 1e-9);
        }
    }

    #[test]
    fn test_determinism() {
        let limits = test_limits();
        let start = home_pos();
        let mut goal = start;
        goal[3] = -1.0;
        goal[6] = -0.3;

        let mut gen_a = MotionGenerator::new(0.7, goal, &limits).unwrap();
        let mut gen_b = MotionGenerator::new(0.7, goal, &limits).unwrap();

        let (trace_a, cycles_a) = run_to_completion(&mut gen_a, start, 0.001);
        let (trace_b, cycles_b) = run_to_completion(&mut gen_b, start, 0.001);

        assert_eq!(cycles_a, cycles_b);
        for (a, b) in trace_a.iter().zip(trace_b.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_monotonic_progress() {
        let limits = test_limits();
        let start = home_pos();
        let mut goal = start;
        goal[0] = 1.2;
        goal[4] = -0.8;

        let mut generator = MotionGenerator::new(1.0, goal, &limits).unwrap();
        let (trace, _) = run_to_completion(&mut generator, start, 0.001);

        for pair in trace.windows(2) {
            // Positive displacement axis never steps backwards
            assert!(pair[1][0] - pair[0][0] >= -1e-12);
            // Negative displacement axis never steps forwards
            assert!(pair[1][4] - pair[0][4] <= 1e-12);
        }
    }

    #[test]
    fn test_rate_limit_respected() {
        let limits = test_limits();
        let speed_factor = 0.5;
        let period_s = 0.001;
        let start = home_pos();
        let mut goal = start;
        goal[0] = 2.0;
        goal[5] = 3.0;

        let mut generator = MotionGenerator::new(speed_factor, goal, &limits).unwrap();
        let (trace, _) = run_to_completion(&mut generator, start, period_s);

        for pair in trace.windows(2) {
            for i in 0..NUM_AXES {
                let rate = (pair[1][i] - pair[0][i]).abs() / period_s;
                let cap = limits.max_abs_rate_rads[i] * speed_factor;
                assert!(
                    rate <= cap + 1e-6,
                    "axis {} rate {} exceeds cap {}",
                    i,
                    rate,
                    cap
                );
            }
        }
    }

    #[test]
    #[should_panic]
    fn test_sample_after_finished_panics() {
        let limits = test_limits();
        let start = home_pos();
        let mut generator = MotionGenerator::new(0.5, start, &limits).unwrap();

        // Zero motion finishes on the first sample
        generator.sample(&start, 0.001);
        generator.sample(&start, 0.001);
    }

    #[test]
    #[should_panic]
    fn test_negative_period_panics() {
        let limits = test_limits();
        let start = home_pos();
        let mut goal = start;
        goal[0] = 1.0;

        let mut generator = MotionGenerator::new(0.5, goal, &limits).unwrap();
        generator.sample(&start, 0.0);
        generator.sample(&start, -0.001);
    }
}
