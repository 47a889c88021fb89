//! # `aqueduct`
//!
//! A solver for [Numberlink](https://en.wikipedia.org/wiki/Numberlink) puzzles
//! as posed by the mobile game Flow Free: connect every color's two endpoints
//! with non-crossing orthogonal paths that together cover the whole board.
//!
//! Begin by building an initial [`State`] with a [`BoardBuilder`], either from
//! a textual grid ([`BoardBuilder::from_rows`]) or by adding termini pairs
//! directly. Hand the state to a [`Coordinator`] and call
//! [`solve()`](Coordinator::solve).
//!
//! # Internals
//! The search runs one A* agent per color on its own thread. Each agent grows
//! its flow square by square, charging a move against its `g` cost only when
//! it had a real choice; chains of forced moves are fast-forwarded. Successors
//! are rejected by four admissibility checks (blocked endpoint, dead end,
//! stranded color or region via connected-component labeling, and directional
//! bottleneck) before ever reaching an open heap. When an agent completes its
//! own flow it hands deep clones of the finished board to every color still
//! missing from it; the hand-off with no color missing is the solution.
//!
//! This follows the multi-agent formulation of Flow Free solving; the pruning
//! rules are those described in
//! [Matt Zucker's flow solver write-up](https://mzucker.github.io/2016/08/28/flow-solver.html).

pub use builder::BoardBuilder;
pub use cell::ColorId;
pub use coordinator::{Coordinator, ShutdownHandle, SolveReport};
pub use error::{BoardError, SolveError};
pub use location::Location;
pub use state::State;

pub(crate) mod agent;
pub(crate) mod builder;
pub(crate) mod cell;
pub(crate) mod coordinator;
pub(crate) mod direction;
pub(crate) mod error;
pub(crate) mod location;
pub(crate) mod prune;
pub(crate) mod regions;
pub(crate) mod state;
mod tests;
