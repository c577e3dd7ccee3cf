//! Chronos Core - Fundamental types and primitives
//!
//! This crate defines the value types shared by every Chronos crate:
//! - Change events (a single timed, probable change)
//! - Change sets (ordered timelines of change events)
//! - The error taxonomy for ontology and scheduling operations

pub mod changeset;
pub mod error;
pub mod event;

pub use changeset::*;
pub use error::*;
pub use event::*;
