//! Concurrent best-first search.
//!
//! A single control loop pops states from a shared [`Frontier`] and hands them
//! to a pool of scoped worker threads over a bounded channel. A permit counter
//! caps the number of expansions in flight at `SolverConfig::workers`. Workers
//! push successors straight back onto the frontier. The first worker to pop an
//! empty board records its moves; later goals are ignored.
//!
//! Expansion order depends on thread timing, so the returned solution is valid
//! but not reproducible across runs.
use crate::engine::Board;
use crate::error::FormerResult;
use crate::heuristics::HeuristicCache;
use crate::solver::{Frontier, SearchOutcome, SearchState, Solution, SolverConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, error, info, trace};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread;

/// Counting gate for in-flight expansions.
struct Permits {
    limit: usize,
    in_flight: Mutex<usize>,
    changed: Condvar,
}

impl Permits {
    fn new(limit: usize) -> Self {
        Permits {
            limit,
            in_flight: Mutex::new(0),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until fewer than `limit` permits are taken, then takes one.
    fn acquire(&self) -> PermitGuard<'_> {
        let mut in_flight = self.lock();
        while *in_flight >= self.limit {
            in_flight = self
                .changed
                .wait(in_flight)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *in_flight += 1;
        PermitGuard { permits: self }
    }

    fn release(&self) {
        let mut in_flight = self.lock();
        *in_flight = in_flight.saturating_sub(1);
        drop(in_flight);
        self.changed.notify_all();
    }

    /// Waits until at least one in-flight expansion finishes.
    ///
    /// Returns `true` when nothing is in flight any more.
    fn wait_for_progress(&self) -> bool {
        let mut in_flight = self.lock();
        if *in_flight == 0 {
            return true;
        }
        let observed = *in_flight;
        while *in_flight >= observed {
            in_flight = self
                .changed
                .wait(in_flight)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *in_flight == 0
    }

    fn in_flight(&self) -> usize {
        *self.lock()
    }
}

/// Returns its permit when dropped, including on unwind.
struct PermitGuard<'a> {
    permits: &'a Permits,
}

impl Drop for PermitGuard<'_> {
    fn drop(&mut self) {
        self.permits.release();
    }
}

/// One expansion handed to a worker, together with the permit it holds.
struct Task<'a> {
    state: SearchState,
    _permit: PermitGuard<'a>,
}

enum Exit {
    Solved,
    Exhausted,
    ExpansionLimit,
}

/// State shared by the control loop and every worker of one solve call.
struct SharedSearch<'a> {
    config: &'a SolverConfig,
    cache: HeuristicCache,
    frontier: Mutex<Frontier>,
    permits: Permits,
    winner: OnceLock<Vec<u8>>,
    stopped: AtomicBool,
    expansions: AtomicUsize,
}

impl<'a> SharedSearch<'a> {
    fn new(config: &'a SolverConfig) -> Self {
        SharedSearch {
            config,
            cache: HeuristicCache::new(),
            frontier: Mutex::new(Frontier::new()),
            permits: Permits::new(config.workers),
            winner: OnceLock::new(),
            stopped: AtomicBool::new(false),
            expansions: AtomicUsize::new(0),
        }
    }

    fn frontier(&self) -> MutexGuard<'_, Frontier> {
        self.frontier.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_finished(&self) -> bool {
        self.stopped.load(Ordering::Acquire) || self.winner.get().is_some()
    }

    /// Dispatches frontier states to the workers until a goal is recorded, the
    /// search runs dry or the expansion limit is hit.
    fn control<'s>(&'s self, tasks: &Sender<Task<'s>>) -> Exit {
        let exit = self.dispatch(tasks);
        self.stopped.store(true, Ordering::Release);
        exit
    }

    fn dispatch<'s>(&'s self, tasks: &Sender<Task<'s>>) -> Exit {
        loop {
            if self.winner.get().is_some() {
                return Exit::Solved;
            }
            if self
                .config
                .max_expansions
                .is_some_and(|limit| self.expansions.load(Ordering::Relaxed) >= limit)
            {
                return Exit::ExpansionLimit;
            }

            let permit = self.permits.acquire();
            let next = self.frontier().pop();
            match next {
                Some(state) => {
                    if tasks.send(Task { state, _permit: permit }).is_err() {
                        error!("All search workers have stopped, abandoning the frontier");
                        return Exit::Exhausted;
                    }
                }
                None => {
                    // Busy-empty: successors may still be on their way.
                    drop(permit);
                    let idle = self.permits.wait_for_progress();
                    if idle && self.frontier().is_empty() {
                        return if self.winner.get().is_some() {
                            Exit::Solved
                        } else {
                            Exit::Exhausted
                        };
                    }
                }
            }
        }
    }

    fn run_worker(&self, id: usize, tasks: Receiver<Task<'_>>) {
        trace!("Worker {} started", id);
        for task in tasks.iter() {
            if !self.is_finished() {
                self.expand(task.state);
            }
        }
        trace!("Worker {} stopped", id);
    }

    fn expand(&self, state: SearchState) {
        if state.board.is_empty() {
            let steps = state.steps();
            if self.winner.set(state.moves).is_ok() {
                debug!("Goal reached with {} clicks", steps);
            }
            return;
        }

        let successors = state.successors(&self.cache, self.config.tuning);
        let expansions = self.expansions.fetch_add(1, Ordering::Relaxed) + 1;
        if self.config.should_log_progress(expansions) {
            debug!(
                "Iteration {}, moves: {}, estimate: {:.3}, groups: {}, in flight: {}",
                expansions,
                state.steps(),
                state.estimate,
                successors.len(),
                self.permits.in_flight()
            );
        }
        self.frontier().extend(successors);
    }
}

/// Solves `board` with `config.workers` concurrent expansions.
///
/// Returns as soon as any worker reaches an empty board; expansions still in
/// flight at that point finish and their results are discarded. The frontier
/// is only declared exhausted once it is empty with nothing in flight. With an
/// expansion limit, up to `workers - 1` expansions that were already running
/// may complete past the limit and are included in the reported count.
pub fn solve_concurrent(board: &Board, config: &SolverConfig) -> FormerResult<SearchOutcome> {
    config.validate()?;
    if board.is_empty() {
        return Ok(SearchOutcome::Solved(Solution::from_positions(&[], 0)));
    }
    info!(
        "Starting concurrent search: {} bricks, tuning {}, {} workers",
        board.brick_count(),
        config.tuning,
        config.workers
    );

    let search = SharedSearch::new(config);
    search
        .frontier()
        .push(SearchState::initial(*board, &search.cache, config.tuning));

    let exit = thread::scope(|scope| {
        let (task_tx, task_rx) = bounded::<Task<'_>>(config.workers);
        for id in 0..config.workers {
            let task_rx = task_rx.clone();
            let search = &search;
            scope.spawn(move || search.run_worker(id, task_rx));
        }
        drop(task_rx);

        let exit = search.control(&task_tx);
        drop(task_tx);
        exit
    });

    let expansions = search.expansions.load(Ordering::Relaxed);
    let (hits, misses) = search.cache.stats();
    let outcome = match (exit, search.winner.get()) {
        (Exit::Solved, Some(moves)) => {
            info!(
                "Solved with {} clicks after {} expansions (cache hits {}, misses {})",
                moves.len(),
                expansions,
                hits,
                misses
            );
            SearchOutcome::Solved(Solution::from_positions(moves, expansions))
        }
        (Exit::ExpansionLimit, _) => {
            info!("Giving up after {} expansions", expansions);
            SearchOutcome::ExpansionLimit { expansions }
        }
        _ => {
            info!("Frontier exhausted after {} expansions", expansions);
            SearchOutcome::Exhausted { expansions }
        }
    };
    Ok(outcome)
}
