//! Heuristic override layer.

mod engine;

pub use engine::{HeuristicPolicy, OverrideRule};
