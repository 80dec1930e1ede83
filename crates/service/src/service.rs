use std::error::Error;

use crate::error::ErrorKind;
use crate::types::{Run, RunId, ThreadId, ThreadMessage};

/// The error type for an assistant service.
pub trait AssistantServiceError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A hosted assistant service, which owns conversation threads and runs
/// assistants on them.
///
/// All state lives on the service side, the client only holds the opaque
/// identifiers it gets back. Implementations should behave like stateless
/// objects: every returned future is self-contained and can outlive the
/// borrow of `self`.
pub trait AssistantService: Send + Sync {
    /// The error type that may be returned by the service.
    type Error: AssistantServiceError;

    /// Creates a new, empty conversation thread.
    fn create_thread(
        &self,
    ) -> impl Future<Output = Result<ThreadId, Self::Error>> + Send + 'static;

    /// Appends a user message to the thread.
    fn post_message(
        &self,
        thread_id: &ThreadId,
        content: &str,
    ) -> impl Future<Output = Result<ThreadMessage, Self::Error>> + Send + 'static;

    /// Starts a run of the given assistant on the thread.
    fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &str,
    ) -> impl Future<Output = Result<Run, Self::Error>> + Send + 'static;

    /// Retrieves the current state of a run.
    fn get_run(
        &self,
        thread_id: &ThreadId,
        run_id: &RunId,
    ) -> impl Future<Output = Result<Run, Self::Error>> + Send + 'static;

    /// Lists the messages of the thread, in the order the service provides
    /// (newest first).
    fn list_messages(
        &self,
        thread_id: &ThreadId,
    ) -> impl Future<Output = Result<Vec<ThreadMessage>, Self::Error>>
    + Send
    + 'static;
}
