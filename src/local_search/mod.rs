//! Local search over complete, feasible solutions.
//!
//! - `two_opt` — Intra-route segment reversal
//! - `relocate` — Move one node, within or across routes
//! - `exchange` — Swap two nodes across routes
//!
//! [`LocalSearch`] drives the three neighbourhoods under a [`Budget`] and
//! only ever commits strictly improving, capacity-feasible moves.
//!
//! [`Budget`]: crate::config::Budget

mod exchange;
mod improver;
mod moves;
mod relocate;
mod two_opt;

pub use improver::{improve, ImproveReport, LocalSearch};
pub use moves::{Move, MoveKind};
