use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Barrier, Condvar, Mutex};
use std::thread;

use tracing::info;

use crate::agent::{Agent, OpenEntry};
use crate::error::SolveError;
use crate::state::State;

/// A one-shot wakeup event, one per agent: `set` releases a `wait`ing worker
/// and stays set until the next `clear`.
pub(crate) struct Waker {
    flag: Mutex<bool>,
    condvar: Condvar,
}

impl Waker {
    fn new() -> Self {
        Self { flag: Mutex::new(false), condvar: Condvar::new() }
    }

    pub(crate) fn set(&self) {
        *self.flag.lock().unwrap() = true;
        self.condvar.notify_all();
    }

    pub(crate) fn clear(&self) {
        *self.flag.lock().unwrap() = false;
    }

    pub(crate) fn wait(&self) {
        let mut flag = self.flag.lock().unwrap();
        while !*flag {
            flag = self.condvar.wait(flag).unwrap();
        }
    }
}

/// Everything guarded by the single global mutex: the per-color hand-off
/// inboxes and the count of workers currently parked on their wakers.
pub(crate) struct Queues {
    pub(crate) inboxes: Vec<BinaryHeap<OpenEntry>>,
    pub(crate) sleeping: usize,
}

/// How the search ended. Written exactly once into the shared slot.
pub(crate) enum Outcome {
    Solved(State),
    Exhausted,
    Interrupted,
}

/// State shared between the coordinator and its workers. Inboxes and the
/// sleep count live under one mutex; the outcome slot has its own mutex and
/// is never held together with the first; `done` is a plain flag workers
/// poll at the top of their loop.
pub(crate) struct Shared {
    pub(crate) queues: Mutex<Queues>,
    pub(crate) wakers: Vec<Waker>,
    pub(crate) inbox_seq: AtomicU64,
    done: AtomicBool,
    outcome: Mutex<Option<Outcome>>,
}

impl Shared {
    fn new(num_agents: usize) -> Self {
        Self {
            queues: Mutex::new(Queues {
                inboxes: (0..num_agents).map(|_| BinaryHeap::new()).collect(),
                sleeping: 0,
            }),
            wakers: (0..num_agents).map(|_| Waker::new()).collect(),
            inbox_seq: AtomicU64::new(0),
            done: AtomicBool::new(false),
            outcome: Mutex::new(None),
        }
    }

    pub(crate) fn num_agents(&self) -> usize {
        self.wakers.len()
    }

    pub(crate) fn is_done(&self) -> bool {
        self.done.load(AtomicOrdering::Relaxed)
    }

    /// Publish the outcome and wake everyone. The first caller wins; later
    /// outcomes (say, an interrupt racing a solution) are dropped.
    pub(crate) fn finish(&self, outcome: Outcome) {
        {
            let mut slot = self.outcome.lock().unwrap();
            if slot.is_some() {
                return;
            }
            *slot = Some(outcome);
        }

        self.done.store(true, AtomicOrdering::Relaxed);
        for waker in &self.wakers {
            waker.set();
        }
    }

    fn take_outcome(&self) -> Option<Outcome> {
        self.outcome.lock().unwrap().take()
    }
}

/// A cloneable handle that aborts the search from outside (a timeout timer,
/// a ctrl-c handler). The solve then reports [`SolveError::Interrupted`].
#[derive(Clone)]
pub struct ShutdownHandle {
    shared: Arc<Shared>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        info!("shutdown requested");
        self.shared.finish(Outcome::Interrupted);
    }
}

/// The solved board together with per-agent search metrics.
#[derive(Debug)]
pub struct SolveReport {
    /// A goal state: every flow finished, no free square left.
    pub board: State,
    /// Nodes expanded by each color's agent, indexed by color id.
    pub expanded: Vec<usize>,
}

impl SolveReport {
    /// Total nodes expanded across all agents.
    pub fn total_expanded(&self) -> usize {
        self.expanded.iter().sum()
    }
}

/// Owns the shared block and the worker threads: one search agent per color,
/// started behind a barrier, cooperating through the inbox table until one
/// of them announces a goal or all of them go quiescent.
pub struct Coordinator {
    initial: State,
    shared: Arc<Shared>,
}

impl Coordinator {
    pub fn new(initial: State) -> Self {
        let shared = Arc::new(Shared::new(initial.num_colors()));
        Self { initial, shared }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle { shared: self.shared.clone() }
    }

    /// Run the search to completion. Blocks until a goal state is found, the
    /// search space is exhausted, or shutdown is requested.
    pub fn solve(self) -> Result<SolveReport, SolveError> {
        let num_colors = self.initial.num_colors();
        if num_colors == 0 {
            // Nothing to route; the board is its own goal.
            return Ok(SolveReport { board: self.initial, expanded: Vec::new() });
        }

        info!(size = self.initial.size(), colors = num_colors, "starting search");
        let barrier = Barrier::new(num_colors);
        let shared = &self.shared;
        let initial = &self.initial;

        let expanded = thread::scope(|scope| {
            let handles = (0..num_colors)
                .map(|color| {
                    let barrier = &barrier;
                    let agent = Agent::new(color, Arc::clone(shared));
                    let mut start = initial.clone();
                    let source = start.sources[color];
                    start.set_head(source);

                    scope.spawn(move || {
                        barrier.wait();
                        agent.run(start)
                    })
                })
                .collect::<Vec<_>>();

            handles
                .into_iter()
                .map(|handle| handle.join().expect("search worker panicked"))
                .collect::<Vec<_>>()
        });

        match self.shared.take_outcome() {
            Some(Outcome::Solved(board)) => {
                info!(total_expanded = expanded.iter().sum::<usize>(), "solved");
                Ok(SolveReport { board, expanded })
            }
            Some(Outcome::Exhausted) => Err(SolveError::Unsolvable),
            Some(Outcome::Interrupted) | None => Err(SolveError::Interrupted),
        }
    }
}
