//! Core abstractions for the contention simulator: the [`BackoffPolicy`]
//! capability every policy implements, the [`Medium`] view a node gets of the
//! shared channel, and the values exchanged between them.

mod backoff;
mod traits;

pub use backoff::Backoff;
pub use traits::{BackoffPolicy, Medium};
