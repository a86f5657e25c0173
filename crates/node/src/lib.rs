//! Contending node.
//!
//! This crate composes the access state machine with the node's backoff
//! policy into a complete CSMA/CA-style contender.

mod state;

pub use state::{AccessState, Node};
