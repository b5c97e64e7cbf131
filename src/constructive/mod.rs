//! Constructive heuristics for building initial solutions.
//!
//! - [`cheapest_insertion`] — Sequential per-vehicle cheapest insertion, O(n³)

mod cheapest_insertion;

pub use cheapest_insertion::cheapest_insertion;
