use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::atomic::Ordering as AtomicOrdering;
use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::cell::ColorId;
use crate::coordinator::{Outcome, Shared};
use crate::prune;
use crate::state::State;

/// A heap entry carrying the A* priority and a monotone insertion counter so
/// that pops among equal priorities are deterministic (FIFO).
#[derive(Debug)]
pub(crate) struct OpenEntry {
    pub(crate) f: usize,
    pub(crate) seq: u64,
    pub(crate) state: State,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.seq == other.seq
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on both keys: BinaryHeap is a max-heap and we want the
        // lowest f, earliest insertion first.
        other.f.cmp(&self.f).then_with(|| other.seq.cmp(&self.seq))
    }
}

/// One search worker, dedicated to a single color. It owns its open heap and
/// closed set outright; hand-offs arrive as deep clones through the shared
/// inbox table, so no live state is ever aliased between workers.
pub(crate) struct Agent {
    color: ColorId,
    shared: Arc<Shared>,
    open: BinaryHeap<OpenEntry>,
    closed: HashSet<u64>,
    seq: u64,
    expanded: usize,
    own_complete: Option<State>,
    finished_self: bool,
}

impl Agent {
    pub(crate) fn new(color: ColorId, shared: Arc<Shared>) -> Self {
        Self {
            color,
            shared,
            open: BinaryHeap::new(),
            closed: HashSet::new(),
            seq: 0,
            expanded: 0,
            own_complete: None,
            finished_self: false,
        }
    }

    /// The multi-agent A* loop. Expands `start` once, then keeps draining the
    /// inbox (hand-offs first) and the open heap until a goal is announced or
    /// every worker goes quiescent. Returns the expansion count.
    pub(crate) fn run(mut self, start: State) -> usize {
        debug!(color = self.color, "agent starting");
        self.expand(start);

        while !self.shared.is_done() {
            let from_inbox = self.shared.queues.lock().unwrap().inboxes[self.color].pop();

            if let Some(entry) = from_inbox {
                self.expand(entry.state);
            } else if let Some(entry) = self.open.pop() {
                self.expand(entry.state);
            } else if self.sleep() {
                break;
            }
        }

        debug!(color = self.color, expanded = self.expanded, "agent exiting");
        self.expanded
    }

    fn expand(&mut self, mut state: State) {
        self.expanded += 1;
        self.closed.insert(state.signature());

        if state.is_agent_goal_state(self.color) {
            // Hand-offs (and boards whose endpoints start adjacent) can
            // arrive already at the goal; they still must be announced.
            self.record_completion(&mut state);
        } else {
            let successors = self.find_successors(&mut state);
            let parent_f = state.f();
            for successor in successors {
                if !self.closed.contains(&successor.signature()) || parent_f > successor.f() {
                    self.push_open(successor);
                }
            }
        }

        if self.finished_self {
            self.finished_self = false;
            self.broadcast_to_missing_agents();
        }
    }

    fn push_open(&mut self, state: State) {
        let entry = OpenEntry { f: state.f(), seq: self.seq, state };
        self.seq += 1;
        self.open.push(entry);
    }

    /// Generate the accepted successors of `state`. A chain of forced moves
    /// is fast-forwarded in place first; only then is each remaining move
    /// applied to its own deep clone.
    fn find_successors(&mut self, state: &mut State) -> Vec<State> {
        let mut moves = state.possible_moves();

        while moves.len() == 1 {
            let outcome = state.perform_move(moves[0], self.color);
            self.expanded += 1;
            match outcome {
                Some(o) if o.reached_target => {
                    self.record_completion(state);
                    return Vec::new();
                }
                // A sole continuation can still land somewhere with real
                // choices, in which case the move was charged against g.
                Some(o) if !o.forced => trace!(color = self.color, "charged fast-forward move"),
                _ => {}
            }
            if self.process_state(state) {
                // The forced continuation was pruned (or reached the goal);
                // this whole branch yields nothing further.
                return Vec::new();
            }
            moves = state.possible_moves();
        }

        let mut successors = Vec::with_capacity(moves.len());
        for location in moves {
            let mut successor = state.clone();
            let outcome = successor.perform_move(location, self.color);
            if outcome.is_some_and(|o| o.reached_target) {
                self.record_completion(&mut successor);
                continue;
            }
            if !self.process_state(&mut successor) {
                successors.push(successor);
            }
        }

        successors
    }

    /// Returns true when `state` goes no further: either a pruning predicate
    /// rejected it, or it is this agent's goal (terminal; recorded for
    /// broadcast instead of expansion).
    fn process_state(&mut self, state: &mut State) -> bool {
        if prune::should_prune(state, self.color) {
            self.closed.insert(state.signature());
            return true;
        }

        if state.is_agent_goal_state(self.color) {
            self.closed.insert(state.signature());
            self.record_completion(state);
            return true;
        }

        false
    }

    fn record_completion(&mut self, state: &mut State) {
        state.finished[self.color] = true;
        self.own_complete = Some(state.clone());
        self.finished_self = true;
        debug!(color = self.color, "completed own flow");
    }

    /// Hand the completed board to every color that has not played on it
    /// yet: each gets a deep clone re-rooted at its own source with `g`
    /// zeroed so the hand-off outranks anything already queued. If no color
    /// is missing, this board is the global goal.
    fn broadcast_to_missing_agents(&mut self) {
        let Some(own_complete) = self.own_complete.clone() else {
            return;
        };
        let mut not_finished = 0;

        {
            let mut queues = self.shared.queues.lock().unwrap();
            for color in 0..own_complete.num_colors() {
                if own_complete.finished[color] {
                    continue;
                }
                not_finished += 1;

                let mut handoff = own_complete.clone();
                handoff.g = 0;
                let source = handoff.sources[color];
                handoff.set_head(source);

                let seq = self.shared.inbox_seq.fetch_add(1, AtomicOrdering::Relaxed);
                queues.inboxes[color].push(OpenEntry { f: handoff.f(), seq, state: handoff });
                self.shared.wakers[color].set();
            }
        }

        // A global goal needs every color finished AND every square filled; a
        // board that completes its last flow with free cells left is dead.
        if not_finished == 0 && own_complete.h == 0 {
            info!(color = self.color, "global goal reached");
            self.shared.finish(Outcome::Solved(own_complete));
        }
    }

    /// Both queues are empty: park on the waker. If every peer is parked and
    /// every inbox is empty, nothing left anywhere can produce a goal, so
    /// this agent declares the search exhausted. Returns true on exhaustion.
    fn sleep(&mut self) -> bool {
        let waker = &self.shared.wakers[self.color];
        waker.clear();

        {
            let mut queues = self.shared.queues.lock().unwrap();
            if !queues.inboxes[self.color].is_empty() {
                // A hand-off raced in between the empty pop and here.
                return false;
            }
            queues.sleeping += 1;
            if queues.sleeping == self.shared.num_agents()
                && queues.inboxes.iter().all(|inbox| inbox.is_empty())
            {
                drop(queues);
                info!("all agents quiescent; search space exhausted");
                self.shared.finish(Outcome::Exhausted);
                return true;
            }
        }

        waker.wait();
        self.shared.queues.lock().unwrap().sleeping -= 1;
        false
    }
}
