//! Per-axis profile feasibility calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::MIN_MOTION_DELTA_RAD;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Three phase timing for one axis considered in isolation, before
/// cross-axis synchronization.
///
/// A trivial axis (displacement below [`MIN_MOTION_DELTA_RAD`]) has all
/// fields zero and is finished from the first cycle.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct AxisProfile {
    /// Peak rate reachable within the displacement
    ///
    /// Units: radians/second
    pub dq_reach: f64,

    /// Acceleration phase duration
    ///
    /// Units: seconds
    pub t_1: f64,

    /// Deceleration phase duration
    ///
    /// Units: seconds
    pub delta_t_2: f64,

    /// Total duration were this axis to move alone
    ///
    /// Units: seconds
    pub t_f: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AxisProfile {
    /// Derive the three phase timing for a single axis.
    ///
    /// # Inputs
    /// - `delta_q`: signed displacement to the goal, radians
    /// - `dq_max`: rate limit, radians/second, strictly positive
    /// - `ddq_max_start`: acceleration limit leaving the start, strictly
    ///   positive
    /// - `ddq_max_goal`: acceleration limit arriving at the goal, strictly
    ///   positive
    ///
    /// This is a closed form derivation, no iteration is involved.
    pub fn solve(delta_q: f64, dq_max: f64, ddq_max_start: f64, ddq_max_goal: f64) -> Self {
        let abs_delta_q = delta_q.abs();

        if abs_delta_q < MIN_MOTION_DELTA_RAD {
            return Self::default();
        }

        // Displacement below which the axis must begin decelerating before it
        // can reach the rate limit.
        let threshold = 0.75 * dq_max.powi(2) * (1.0 / ddq_max_start + 1.0 / ddq_max_goal);

        let dq_reach = if abs_delta_q < threshold {
            (4.0 / 3.0 * abs_delta_q * (ddq_max_start * ddq_max_goal)
                / (ddq_max_start + ddq_max_goal))
                .sqrt()
        } else {
            dq_max
        };

        let t_1 = 1.5 * dq_reach / ddq_max_start;
        let delta_t_2 = 1.5 * dq_reach / ddq_max_goal;
        let t_f = t_1 / 2.0 + delta_t_2 / 2.0 + abs_delta_q / dq_reach;

        Self {
            dq_reach,
            t_1,
            delta_t_2,
            t_f,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
