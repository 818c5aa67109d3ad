//! Reconciliation of discovered assets against the remote listing

mod engine;
mod events;


pub use engine::{Tracker, TrackerError, TrackerResult};
pub use events::{CompletionResult, TrackerEvent};
