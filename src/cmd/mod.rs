//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module     | Commands handled |
//! |------------|------------------|
//! | `dispatch` | `Run`, `Preview` |

pub mod dispatch;

pub use dispatch::{cmd_preview, cmd_run};
