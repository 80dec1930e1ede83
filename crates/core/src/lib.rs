//! Core logic including session bootstrap, the per-turn flow and waiting
//! for runs to finish.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod config;
pub mod reply;
mod session;
mod waiter;

pub use config::{SessionConfig, WaitOptions};
pub use session::{RunOutcome, Session};
pub use waiter::{WaitOutcome, wait_for_run};
