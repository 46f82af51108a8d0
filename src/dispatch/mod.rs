//! Selection, message composition, and the single-run dispatch flow.

pub mod message;
pub mod run;
pub mod selector;

pub use run::{DISPATCH_MARKER, DispatchOutcome, Dispatcher};
