//! Best-first search for a short click sequence that empties the board.
//!
//! States are ordered by `f = steps + estimate`, where the estimate comes from
//! [`crate::heuristics`]. The estimate is not admissible, so the first empty
//! board popped is a solution but not necessarily the shortest one.
use crate::engine::{Board, Click, HEIGHT, WIDTH};
use crate::error::{FormerError, FormerResult};
use crate::heuristics::HeuristicCache;
use log::{debug, info};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Heuristic multiplier used when the caller does not pick one.
pub const DEFAULT_TUNING: f64 = 2.3;

/// Expansions between two progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 10_000;

/// Settings for one solve call.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// Multiplier applied to the heuristic estimate.
    pub tuning: f64,
    /// Concurrent expansions allowed; 1 runs the sequential search.
    pub workers: usize,
    /// Stop after this many expansions, if set.
    pub max_expansions: Option<usize>,
    /// Log progress every this many expansions; 0 disables progress lines.
    pub progress_interval: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tuning: DEFAULT_TUNING,
            workers: num_cpus::get(),
            max_expansions: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl SolverConfig {
    /// Sequential configuration with the given tuning factor.
    pub fn new(tuning: f64) -> Self {
        Self {
            tuning,
            workers: 1,
            ..Self::default()
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = Some(max_expansions);
        self
    }

    pub fn with_progress_interval(mut self, progress_interval: usize) -> Self {
        self.progress_interval = progress_interval;
        self
    }

    /// Rejects a non-finite or negative tuning factor and a zero worker count.
    pub fn validate(&self) -> FormerResult<()> {
        if !self.tuning.is_finite() || self.tuning < 0.0 {
            return Err(FormerError::InvalidConfig {
                message: format!("tuning must be a finite, non-negative number, got {}", self.tuning),
            });
        }
        if self.workers == 0 {
            return Err(FormerError::InvalidConfig {
                message: "at least one worker is required".to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn should_log_progress(&self, expansions: usize) -> bool {
        self.progress_interval > 0 && expansions != 0 && expansions % self.progress_interval == 0
    }
}

/// A node of the search tree.
///
/// Owned by the expansion that created it until it is pushed onto the frontier;
/// never mutated afterwards.
#[derive(Clone, Debug)]
pub struct SearchState {
    pub board: Board,
    /// Positions clicked to reach `board`, in order.
    pub moves: Vec<u8>,
    /// Heuristic estimate of the clicks still needed (h).
    pub estimate: f64,
    /// `moves.len() + estimate` (f).
    pub priority: f64,
}

impl SearchState {
    /// Root state: no moves, priority equal to the estimate.
    pub fn initial(board: Board, cache: &HeuristicCache, tuning: f64) -> Self {
        let estimate = cache.estimate(&board, tuning);
        SearchState {
            board,
            moves: Vec::new(),
            estimate,
            priority: estimate,
        }
    }

    /// Number of clicks taken so far (g).
    pub fn steps(&self) -> usize {
        self.moves.len()
    }

    /// One successor per click group of this board.
    ///
    /// Each successor copies the board, clicks the group's representative
    /// position and is scored with the memoised estimate.
    pub fn successors(&self, cache: &HeuristicCache, tuning: f64) -> Vec<SearchState> {
        let groups = cache.click_groups(&self.board);
        groups
            .iter()
            .map(|group| {
                let mut board = self.board;
                board.apply_click(group.pos);

                let mut moves = Vec::with_capacity(self.moves.len() + 1);
                moves.extend_from_slice(&self.moves);
                moves.push(group.pos as u8);

                let estimate = cache.estimate(&board, tuning);
                SearchState {
                    board,
                    priority: moves.len() as f64 + estimate,
                    moves,
                    estimate,
                }
            })
            .collect()
    }
}

struct FrontierEntry {
    sequence: u64,
    state: SearchState,
}

// `BinaryHeap` is a max-heap, so the comparison is reversed: lower priority
// first, then earlier insertion first.
impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .state
            .priority
            .total_cmp(&self.state.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

/// Min-priority queue of search states.
///
/// Equal priorities pop in insertion order, so a sequential run is fully
/// deterministic.
#[derive(Default)]
pub struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
    next_sequence: u64,
}

impl Frontier {
    pub fn new() -> Self {
        Frontier::default()
    }

    pub fn push(&mut self, state: SearchState) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(FrontierEntry { sequence, state });
    }

    /// Removes and returns the state with the lowest priority.
    pub fn pop(&mut self) -> Option<SearchState> {
        self.heap.pop().map(|entry| entry.state)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl Extend<SearchState> for Frontier {
    fn extend<I: IntoIterator<Item = SearchState>>(&mut self, states: I) {
        for state in states {
            self.push(state);
        }
    }
}

/// Represents a solution found by the solver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    /// Clicks that empty the board, in order.
    pub moves: Vec<Click>,
    /// States expanded before the goal was popped.
    pub expansions: usize,
}

impl Solution {
    pub(crate) fn from_positions(positions: &[u8], expansions: usize) -> Self {
        Solution {
            moves: positions
                .iter()
                .map(|&pos| Click::from_pos(pos as usize))
                .collect(),
            expansions,
        }
    }

    /// Number of clicks in the solution.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// How a search ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// An empty board was reached.
    Solved(Solution),
    /// The frontier ran dry without reaching an empty board.
    Exhausted { expansions: usize },
    /// `SolverConfig::max_expansions` was reached first.
    ExpansionLimit { expansions: usize },
}

impl SearchOutcome {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SearchOutcome::Solved(solution) => Some(solution),
            _ => None,
        }
    }

    pub fn into_solution(self) -> Option<Solution> {
        match self {
            SearchOutcome::Solved(solution) => Some(solution),
            _ => None,
        }
    }

    /// Expansions performed, whatever the outcome.
    pub fn expansions(&self) -> usize {
        match self {
            SearchOutcome::Solved(solution) => solution.expansions,
            SearchOutcome::Exhausted { expansions } | SearchOutcome::ExpansionLimit { expansions } => {
                *expansions
            }
        }
    }
}

/// Solves `board`, sequentially when `config.workers <= 1` and with
/// [`crate::parallel::solve_concurrent`] otherwise.
pub fn solve(board: &Board, config: &SolverConfig) -> FormerResult<SearchOutcome> {
    if config.workers <= 1 {
        solve_astar(board, config)
    } else {
        crate::parallel::solve_concurrent(board, config)
    }
}

/// Solves the board with a single-threaded best-first search.
///
/// Pops the lowest-priority state; an empty board ends the search, otherwise
/// every click group spawns a successor at priority `steps + 1 + estimate`.
/// The result is deterministic for a given board and configuration.
///
/// # Returns
/// * `Ok(SearchOutcome::Solved)` with the click sequence, empty when `board` is
///   already empty.
/// * `Ok(SearchOutcome::Exhausted)` if the frontier empties first.
/// * `Ok(SearchOutcome::ExpansionLimit)` if `config.max_expansions` is reached.
/// * `Err(FormerError::InvalidConfig)` if the configuration is rejected.
///
/// # Examples
/// ```
/// use former_solver::solver::{solve_astar, SolverConfig};
/// use former_solver::utils::board_from_str_array;
///
/// let board = board_from_str_array(&["OO.....", "GG....."]).unwrap();
/// let outcome = solve_astar(&board, &SolverConfig::new(2.3)).unwrap();
/// assert_eq!(outcome.solution().unwrap().len(), 2);
/// ```
pub fn solve_astar(board: &Board, config: &SolverConfig) -> FormerResult<SearchOutcome> {
    config.validate()?;
    info!(
        "Starting sequential search: {} bricks, tuning {}",
        board.brick_count(),
        config.tuning
    );

    let cache = HeuristicCache::new();
    let mut frontier = Frontier::new();
    frontier.push(SearchState::initial(*board, &cache, config.tuning));

    let mut expansions = 0;
    while let Some(current) = frontier.pop() {
        if current.board.is_empty() {
            let (hits, misses) = cache.stats();
            info!(
                "Solved with {} clicks after {} expansions (cache hits {}, misses {})",
                current.steps(),
                expansions,
                hits,
                misses
            );
            return Ok(SearchOutcome::Solved(Solution::from_positions(
                &current.moves,
                expansions,
            )));
        }

        if config.max_expansions.is_some_and(|limit| expansions >= limit) {
            info!("Giving up after {} expansions", expansions);
            return Ok(SearchOutcome::ExpansionLimit { expansions });
        }

        let successors = current.successors(&cache, config.tuning);
        if config.should_log_progress(expansions) {
            debug!(
                "Iteration {}, moves: {}, estimate: {:.3}, groups: {}, frontier: {}",
                expansions,
                current.steps(),
                current.estimate,
                successors.len(),
                frontier.len()
            );
        }
        frontier.extend(successors);
        expansions += 1;
    }

    info!("Frontier exhausted after {} expansions", expansions);
    Ok(SearchOutcome::Exhausted { expansions })
}

/// Re-applies `moves` to a copy of `board` and returns the resulting board.
///
/// A solution is valid when the returned board is empty.
pub fn replay(board: &Board, moves: &[Click]) -> FormerResult<Board> {
    let mut board = *board;
    for click in moves {
        if click.x >= WIDTH || click.y >= HEIGHT {
            return Err(FormerError::CoordinatesOutOfRange {
                x: click.x,
                y: click.y,
            });
        }
        board.apply_click(click.pos());
    }
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::board_from_str_array;

    fn sandwich_board() -> Board {
        board_from_str_array(&[
            "OOOOOOO", "OOOOOOO", "OOOOOOO", "GGGGGGG", "GGGGGGG", "GGGGGGG", "OOOOOOO",
            "OOOOOOO", "OOOOOOO",
        ])
        .unwrap()
    }

    fn state_with_priority(priority: f64, tag: u8) -> SearchState {
        SearchState {
            board: Board::new_empty(),
            moves: vec![tag],
            estimate: priority,
            priority,
        }
    }

    #[test]
    fn test_solve_already_empty() {
        let outcome = solve_astar(&Board::new_empty(), &SolverConfig::new(2.3)).unwrap();
        let solution = outcome.solution().unwrap();
        assert!(solution.is_empty());
        assert_eq!(solution.expansions, 0);
    }

    #[test]
    fn test_solve_single_group() {
        let board = board_from_str_array(&["PPPPPPP"; HEIGHT]).unwrap();
        let solution = solve_astar(&board, &SolverConfig::new(2.3))
            .unwrap()
            .into_solution()
            .unwrap();
        assert_eq!(solution.moves, vec![Click { x: 0, y: 0 }]);
        assert_eq!(solution.expansions, 1);
    }

    #[test]
    fn test_solve_prefers_merging_click() {
        // Clicking the green band first lets both orange bands merge.
        let solution = solve_astar(&sandwich_board(), &SolverConfig::new(2.3))
            .unwrap()
            .into_solution()
            .unwrap();
        assert_eq!(
            solution.moves,
            vec![Click { x: 0, y: 3 }, Click { x: 0, y: 3 }]
        );
        assert_eq!(solution.expansions, 2);
    }

    #[test]
    fn test_solve_singleton_groups() {
        let board = board_from_str_array(&["OGPB..."]).unwrap();
        let solution = solve_astar(&board, &SolverConfig::new(2.3))
            .unwrap()
            .into_solution()
            .unwrap();
        assert_eq!(solution.len(), 4);
        assert!(replay(&board, &solution.moves).unwrap().is_empty());
    }

    #[test]
    fn test_solve_respects_expansion_limit() {
        let config = SolverConfig::new(2.3).with_max_expansions(1);
        let outcome = solve_astar(&sandwich_board(), &config).unwrap();
        assert_eq!(outcome, SearchOutcome::ExpansionLimit { expansions: 1 });
        assert!(outcome.solution().is_none());
    }

    #[test]
    fn test_solve_rejects_invalid_config() {
        let board = sandwich_board();
        assert!(matches!(
            solve_astar(&board, &SolverConfig::new(f64::NAN)),
            Err(FormerError::InvalidConfig { .. })
        ));
        assert!(matches!(
            solve_astar(&board, &SolverConfig::new(2.3).with_workers(0)),
            Err(FormerError::InvalidConfig { .. })
        ));
        assert!(SolverConfig::new(-1.0).validate().is_err());
    }

    #[test]
    fn test_solve_dispatches_on_workers() {
        let board = sandwich_board();
        let sequential = solve(&board, &SolverConfig::new(2.3)).unwrap();
        let concurrent = solve(&board, &SolverConfig::new(2.3).with_workers(3)).unwrap();
        for outcome in [sequential, concurrent] {
            let solution = outcome.into_solution().unwrap();
            assert!(replay(&board, &solution.moves).unwrap().is_empty());
        }
    }

    #[test]
    fn test_successors_cover_every_group() {
        let cache = HeuristicCache::new();
        let root = SearchState::initial(sandwich_board(), &cache, 2.3);
        assert!((root.priority - 2.3 * 3f64.ln()).abs() < 1e-12);

        let successors = root.successors(&cache, 2.3);
        let clicked: Vec<u8> = successors.iter().map(|s| s.moves[0]).collect();
        assert_eq!(clicked, vec![0, 21, 42]);
        for successor in &successors {
            assert_eq!(successor.steps(), 1);
            assert!((successor.priority - (1.0 + successor.estimate)).abs() < 1e-12);
        }
        assert_eq!(successors[1].estimate, 0.0);
        assert_eq!(successors[1].board.brick_count(), 42);
    }

    #[test]
    fn test_frontier_orders_by_priority_then_insertion() {
        let mut frontier = Frontier::new();
        frontier.push(state_with_priority(3.0, 0));
        frontier.push(state_with_priority(1.0, 1));
        frontier.push(state_with_priority(2.0, 2));
        frontier.push(state_with_priority(1.0, 3));
        assert_eq!(frontier.len(), 4);

        let order: Vec<u8> = std::iter::from_fn(|| frontier.pop())
            .map(|state| state.moves[0])
            .collect();
        assert_eq!(order, vec![1, 3, 2, 0]);
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_replay_rejects_off_board_click() {
        let board = sandwich_board();
        assert!(matches!(
            replay(&board, &[Click { x: WIDTH, y: 0 }]),
            Err(FormerError::CoordinatesOutOfRange { .. })
        ));
        let after = replay(&board, &[Click { x: 3, y: 4 }]).unwrap();
        assert_eq!(after.click_groups().len(), 1);
    }

    #[test]
    fn test_config_defaults() {
        let config = SolverConfig::default();
        assert_eq!(config.tuning, DEFAULT_TUNING);
        assert!(config.workers >= 1);
        assert_eq!(config.max_expansions, None);
        assert!(config.should_log_progress(DEFAULT_PROGRESS_INTERVAL));
        assert!(!config.should_log_progress(0));
        assert!(!config.with_progress_interval(0).should_log_progress(10));
    }
}
