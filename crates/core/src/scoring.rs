//! Scoring module
//!
//! One rule: a lock event that clears `n` rows scores `100 * n²`. Multi-line
//! clears are rewarded super-linearly (1 → 100, 2 → 400, 3 → 900, 4 → 1600).
//! There are no levels, combos or drop points.

use crate::types::LINE_CLEAR_BASE;

/// Points for clearing `lines` rows in a single lock event.
pub fn line_clear_score(lines: usize) -> u32 {
    let n = lines as u32;
    LINE_CLEAR_BASE.saturating_mul(n.saturating_mul(n))
}
