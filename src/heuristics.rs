//! Cost-to-go estimate for the best-first search, and the click-group memo
//! shared by every expansion of one solve.
//!
//! The estimate assumes that a board with many click options contains many
//! groups that will merge away before they ever need a click of their own, while
//! a board with few options is close to a forced sequence. It scales the
//! logarithm of the group count by a tuning factor. It can overestimate, so the
//! search trades optimality for speed.
use crate::engine::{Board, ClickGroup};
use dashmap::DashMap;
use log::error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Estimated number of clicks left for a board with `group_count` click groups.
///
/// Computes `ln(max(group_count, 1)) * tuning`, so zero or one group estimate 0
/// and the result is always finite and non-negative for a non-negative tuning.
///
/// # Examples
/// ```
/// use former_solver::heuristics::estimate;
/// assert_eq!(estimate(0, 2.3), 0.0);
/// assert_eq!(estimate(1, 2.3), 0.0);
/// assert!((estimate(10, 2.0) - 2.0 * 10f64.ln()).abs() < 1e-12);
/// ```
pub fn estimate(group_count: usize, tuning: f64) -> f64 {
    (group_count.max(1) as f64).ln() * tuning
}

/// Estimates a board, checking that an occupied board reports at least one group.
pub fn estimate_board(board: &Board, groups: &[ClickGroup], tuning: f64) -> f64 {
    debug_assert!(
        !groups.is_empty() || board.is_empty(),
        "occupied board without click groups:\n{}",
        board.to_plain_string()
    );
    if groups.is_empty() && !board.is_empty() {
        error!(
            "Occupied board reported no click groups, clamping estimate:\n{}",
            board.to_plain_string()
        );
    }
    estimate(groups.len(), tuning)
}

/// Memo of click-group scans, keyed by full board content.
///
/// Created per solve call and dropped with it. Lookups bucket by the board's
/// 32-bit fingerprint and compare whole boards on a bucket hit, so two boards
/// that share a fingerprint never share an entry. Safe to share between worker
/// threads by reference.
#[derive(Debug, Default)]
pub struct HeuristicCache {
    groups: DashMap<Board, Arc<[ClickGroup]>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl HeuristicCache {
    pub fn new() -> Self {
        HeuristicCache::default()
    }

    /// Returns the click groups of `board`, scanning it on the first request.
    pub fn click_groups(&self, board: &Board) -> Arc<[ClickGroup]> {
        if let Some(groups) = self.groups.get(board) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(groups.value());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let groups: Arc<[ClickGroup]> = board.click_groups().into();
        self.groups.insert(*board, Arc::clone(&groups));
        groups
    }

    /// Estimated clicks left for `board`, using the memoised group scan.
    pub fn estimate(&self, board: &Board, tuning: f64) -> f64 {
        let groups = self.click_groups(board);
        estimate_board(board, &groups, tuning)
    }

    /// Number of distinct boards scanned so far.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// `(hits, misses)` since the cache was created.
    pub fn stats(&self) -> (usize, usize) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}
