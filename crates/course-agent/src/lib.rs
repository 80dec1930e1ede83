//! A terminal chat client for a hosted course-selection assistant.
//!
//! The crate includes a CLI tool for using in the terminal. And you can also
//! use it as a library to drive the same interaction loop over any reader
//! and writer, with any assistant service.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod repl;

pub use repl::Repl;

/// Re-exports of [`course_agent_core`] crate.
pub mod core {
    pub use course_agent_core::*;
}

/// Re-exports of [`course_agent_openai`] crate.
pub mod openai {
    pub use course_agent_openai::*;
}
