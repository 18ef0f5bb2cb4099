//! Cross-axis synchronization of per-axis profiles

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;

// Internal
use super::profile::AxisProfile;
use super::{JointVector, ScaledLimits, MIN_MOTION_DELTA_RAD, NUM_AXES};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A fully synchronized motion plan.
///
/// Every non-trivial axis completes its three phase transition at the same
/// shared arrival time, so no axis leads or lags the others in joint space.
/// Computed exactly once per motion, immutable afterwards.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    /// Signed displacement from start to goal per axis
    ///
    /// Units: radians
    pub delta_q: JointVector,

    /// Sign of the displacement per axis (+1, -1, or 0 for trivial axes)
    pub sign: JointVector,

    /// Synchronized peak rate per axis
    ///
    /// Units: radians/second
    pub dq_max_sync: JointVector,

    /// End of the acceleration phase per axis
    ///
    /// Units: seconds
    pub t_1_sync: JointVector,

    /// End of the cruise phase per axis
    ///
    /// Units: seconds
    pub t_2_sync: JointVector,

    /// Arrival time per axis. Identical (within floating tolerance) for all
    /// non-trivial axes.
    ///
    /// Units: seconds
    pub t_f_sync: JointVector,

    /// Position offset accumulated over the acceleration phase per axis
    ///
    /// Units: radians
    pub q_1: JointVector,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SyncPlan {
    /// Reconcile the per-axis profiles for the given displacement into one
    /// shared arrival time.
    ///
    /// Each axis is first solved in isolation; the slowest axis sets the
    /// shared arrival time, and every other axis's peak rate is re-solved so
    /// that its own three phase transition completes at exactly that time.
    pub(crate) fn solve(delta_q: &JointVector, limits: &ScaledLimits) -> Self {
        let mut plan = SyncPlan {
            delta_q: *delta_q,
            sign: JointVector::zeros(),
            dq_max_sync: JointVector::zeros(),
            t_1_sync: JointVector::zeros(),
            t_2_sync: JointVector::zeros(),
            t_f_sync: JointVector::zeros(),
            q_1: JointVector::zeros(),
        };

        // Unconstrained per-axis profiles. The longest axis duration becomes
        // the shared arrival time.
        let mut max_t_f = 0.0f64;

        for i in 0..NUM_AXES {
            let profile = AxisProfile::solve(
                delta_q[i],
                limits.dq_max[i],
                limits.ddq_max_start[i],
                limits.ddq_max_goal[i],
            );

            if profile.t_f > max_t_f {
                max_t_f = profile.t_f;
            }
        }

        // Re-solve each non-trivial axis's peak rate so it arrives at
        // max_t_f. Trivial axes are excluded, which also guards the divide
        // by the peak rate below.
        for i in 0..NUM_AXES {
            if delta_q[i].abs() < MIN_MOTION_DELTA_RAD {
                continue;
            }

            plan.sign[i] = delta_q[i].signum();

            let ddq_start = limits.ddq_max_start[i];
            let ddq_goal = limits.ddq_max_goal[i];

            let a = 0.75 * (ddq_goal + ddq_start);
            let b = -max_t_f * ddq_goal * ddq_start;
            let c = delta_q[i].abs() * ddq_goal * ddq_start;

            // The true discriminant is non-negative; a negative value can
            // only come from round-off on the axis that defines max_t_f.
            let mut discriminant = b * b - 4.0 * a * c;
            if discriminant < 0.0 {
                trace!(
                    "Axis {} sync discriminant {:.3e} clamped to zero",
                    i,
                    discriminant
                );
                discriminant = 0.0;
            }

            let dq_sync = (-b - discriminant.sqrt()) / (2.0 * a);

            plan.dq_max_sync[i] = dq_sync;
            plan.t_1_sync[i] = 1.5 * dq_sync / ddq_start;
            let delta_t_2_sync = 1.5 * dq_sync / ddq_goal;
            plan.t_f_sync[i] = plan.t_1_sync[i] / 2.0
                + delta_t_2_sync / 2.0
                + delta_q[i].abs() / dq_sync;
            plan.t_2_sync[i] = plan.t_f_sync[i] - delta_t_2_sync;
            plan.q_1[i] = dq_sync * plan.sign[i] * 0.5 * plan.t_1_sync[i];
        }

        plan
    }

    /// True if the given axis takes no part in the motion.
    pub fn is_axis_trivial(&self, axis: usize) -> bool {
        self.delta_q[axis].abs() < MIN_MOTION_DELTA_RAD
    }

    /// Shared arrival time of the motion. Zero if every axis is trivial.
    ///
    /// Units: seconds
    pub fn max_t_f(&self) -> f64 {
        self.t_f_sync.max()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn test_limits() -> ScaledLimits {
        ScaledLimits {
            dq_max: JointVector::repeat(2.0),
            ddq_max_start: JointVector::repeat(5.0),
            ddq_max_goal: JointVector::repeat(5.0),
        }
    }

    #[test]
    fn test_shared_arrival() {
        // Two axes with different displacements, the rest trivial
        let mut delta_q = JointVector::zeros();
        delta_q[0] = 1.0;
        delta_q[1] = 2.0;

        let plan = SyncPlan::solve(&delta_q, &test_limits());

        // Axis 1 has the larger displacement and defines the arrival time:
        // it cruises at its rate limit, t_f = 0.6 / 2 + 0.6 / 2 + 2 / 2
        assert!((plan.max_t_f() - 1.6).abs() < 1e-9);

        // Both non-trivial axes arrive together
        assert!((plan.t_f_sync[0] - plan.t_f_sync[1]).abs() < 1e-9);

        // Axis 1 reaches the rate limit, axis 0 a lower peak
        assert!((plan.dq_max_sync[1] - 2.0).abs() < 1e-9);
        assert!(plan.dq_max_sync[0] < plan.dq_max_sync[1]);
        assert!(plan.dq_max_sync[0] > 0.0);

        // Trivial axes never enter the solve
        for i in 2..NUM_AXES {
            assert!(plan.is_axis_trivial(i));
            assert_eq!(plan.t_f_sync[i], 0.0);
            assert_eq!(plan.sign[i], 0.0);
        }
    }

    #[test]
    fn test_single_axis_resolves_to_own_profile() {
        // One moving axis: the re-solve at the boundary where the axis
        // itself defines max_t_f must reproduce its unconstrained peak,
        // exercising the discriminant clamp path.
        let mut delta_q = JointVector::zeros();
        delta_q[3] = -0.6;

        let plan = SyncPlan::solve(&delta_q, &test_limits());

        let expected_dq = (4.0 / 3.0 * 0.6 * 25.0 / 10.0f64).sqrt();
        assert!((plan.dq_max_sync[3] - expected_dq).abs() < 1e-9);
        assert_eq!(plan.sign[3], -1.0);
        assert!(plan.q_1[3] < 0.0);
    }

    #[test]
    fn test_all_trivial() {
        let plan = SyncPlan::solve(&JointVector::zeros(), &test_limits());

        assert_eq!(plan.max_t_f(), 0.0);
        for i in 0..NUM_AXES {
            assert!(plan.is_axis_trivial(i));
        }
    }

    #[test]
    fn test_phase_ordering() {
        let mut delta_q = JointVector::zeros();
        delta_q[0] = 0.3;
        delta_q[4] = 1.5;

        let plan = SyncPlan::solve(&delta_q, &test_limits());

        for i in &[0usize, 4] {
            let i = *i;
            assert!(plan.t_1_sync[i] > 0.0);
            assert!(plan.t_2_sync[i] >= plan.t_1_sync[i]);
            assert!(plan.t_f_sync[i] > plan.t_2_sync[i]);
        }
    }
}
