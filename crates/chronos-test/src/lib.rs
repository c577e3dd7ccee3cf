//! Chronos Test Harness - Scenario generation and end-to-end validation
//!
//! This crate provides:
//! - Seeded random ontologies with acyclic (or deliberately cyclic) graphs
//! - Invariant checks over combined timelines
//! - End-to-end integration tests of spawn, dependency and merge

pub mod integration;
pub mod scenario;

pub use integration::*;
pub use scenario::*;
