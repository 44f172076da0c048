//! Integer projection of the continuous optimum.
//!
//! The solver works on real-valued allocations; final output is whole posts
//! per zone. Baseline behavior rounds each component independently to the
//! nearest integer with `f64::round`: ties round away from zero, which for
//! these non-negative allocations means half-up (2.5 → 3). Because
//! components round independently, the integer sum can drift from the
//! budget by a small amount; callers can bound the drift via the exposed
//! continuous solution.
//!
//! [`RoundingMode::LargestRemainder`] is the documented opt-in correction:
//! floor every component, then distribute the leftover posts to the zones
//! with the largest fractional parts (ties broken by lower zone index) so
//! the sum matches the rounded budget exactly.

use std::cmp::Ordering;

use super::types::RoundingMode;

/// Project a continuous allocation to integers under the given policy.
///
/// `x` is expected to satisfy the box bounds (every component >= 1); the
/// solver projects onto bounds before handing the vector over.
pub fn round_allocation(x: &[f64], budget: f64, mode: RoundingMode) -> Vec<u32> {
    match mode {
        RoundingMode::Nearest => round_nearest(x),
        RoundingMode::LargestRemainder => round_largest_remainder(x, budget),
    }
}

/// Independent per-component rounding, ties away from zero.
fn round_nearest(x: &[f64]) -> Vec<u32> {
    x.iter().map(|&v| v.round() as u32).collect()
}

/// Largest-remainder rounding: floors plus residual distribution.
fn round_largest_remainder(x: &[f64], budget: f64) -> Vec<u32> {
    let n = x.len();
    let target: i64 = budget.round() as i64;

    let mut posts: Vec<i64> = x.iter().map(|&v| v.floor() as i64).collect();
    let mut residual = target - posts.iter().sum::<i64>();

    // Zones ordered by fractional part, largest first, lower index on ties.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        let fa = x[a] - x[a].floor();
        let fb = x[b] - x[b].floor();
        fb.partial_cmp(&fa)
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut k = 0;
    while residual > 0 {
        posts[order[k % n]] += 1;
        residual -= 1;
        k += 1;
    }

    // A negative residual only appears when the continuous sum overshoots
    // the budget; take posts back from the smallest fractional parts while
    // keeping every zone at its lower bound of one post.
    while residual < 0 {
        let mut progressed = false;
        for &i in order.iter().rev() {
            if residual == 0 {
                break;
            }
            if posts[i] > 1 {
                posts[i] -= 1;
                residual += 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    posts.into_iter().map(|p| p.max(0) as u32).collect()
}
