//! Per-cycle evaluation of a synchronized plan

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{JointVector, SyncPlan, NUM_AXES};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Evaluate the per-axis position offsets of the plan at elapsed time `t`.
///
/// # Outputs
/// A tuple of:
/// - the offset of each axis from the start configuration, radians
/// - true once every axis has finished
///
/// Trivial axes always contribute a zero offset and count as finished. Each
/// non-trivial axis follows a cubic ease-in over the acceleration phase, a
/// linear cruise, and a cubic ease-out onto the displacement, after which it
/// holds the displacement exactly.
pub(crate) fn sample_offsets(plan: &SyncPlan, t: f64) -> (JointVector, bool) {
    let mut delta_q_d = JointVector::zeros();
    let mut all_finished = true;

    for i in 0..NUM_AXES {
        if plan.is_axis_trivial(i) {
            continue;
        }

        let t_1 = plan.t_1_sync[i];
        let t_2 = plan.t_2_sync[i];
        let t_f = plan.t_f_sync[i];
        let t_d = t_2 - t_1;
        let delta_t_2 = t_f - t_2;
        let dq_sync = plan.dq_max_sync[i] * plan.sign[i];

        if t < t_1 {
            // Acceleration phase, cubic ease-in from rest
            delta_q_d[i] = -1.0 / t_1.powi(3) * dq_sync * (0.5 * t - t_1) * t.powi(3);
            all_finished = false;
        } else if t < t_2 {
            // Cruise phase, linear at the synchronized peak rate
            delta_q_d[i] = plan.q_1[i] + (t - t_1) * dq_sync;
            all_finished = false;
        } else if t < t_f {
            // Deceleration phase, cubic ease-out onto the displacement
            delta_q_d[i] = plan.delta_q[i]
                + 0.5
                    * (1.0 / delta_t_2.powi(3)
                        * (t - t_1 - 2.0 * delta_t_2 - t_d)
                        * (t - t_1 - t_d).powi(3)
                        + (2.0 * t - 2.0 * t_1 - delta_t_2 - 2.0 * t_d))
                    * dq_sync;
            all_finished = false;
        } else {
            delta_q_d[i] = plan.delta_q[i];
        }
    }

    (delta_q_d, all_finished)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
