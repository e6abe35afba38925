//! Heuristics module for PDPTW.
//!
//! This module exports the insertion, construction, pheromone and
//! improvement building blocks of the hybrid solver.

pub mod insertion;
pub mod construction;
pub mod pheromone;
pub mod local_search;
pub mod aco;

pub use insertion::*;
pub use construction::*;
pub use pheromone::*;
pub use local_search::*;
pub use aco::*;
