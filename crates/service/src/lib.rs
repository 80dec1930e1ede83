//! An abstraction layer for hosted conversational-assistant services.
//!
//! This crate establishes the narrow set of remote operations the chat
//! client relies on: creating a thread, posting a message, starting a run,
//! observing the run and listing the thread's messages. The interaction
//! loop only talks to these operations, so it can be driven by the real
//! HTTPS service or by an in-memory fake without any change.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod service;
mod types;

pub use error::*;
pub use service::*;
pub use types::*;
