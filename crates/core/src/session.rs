#[cfg(test)]
mod tests;

use course_agent_service::{AssistantService, ThreadId};
use tracing::Instrument;

use crate::SessionConfig;
use crate::reply::latest_reply;
use crate::waiter::{WaitOutcome, wait_for_run};

/// The outcome of one user turn.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RunOutcome {
    /// The run completed, carrying the assistant's reply.
    Completed(String),
    /// The run failed, carrying the reason reported by the service.
    Failed(String),
    /// The run didn't finish within the allowed polls.
    TimedOut {
        /// How many times the run has been polled.
        polls: u32,
    },
}

/// A conversation with an assistant, bound to one remote thread for its
/// whole lifetime.
///
/// Turns are strictly serialized: [`Session::send`] posts the input, runs
/// the assistant and waits for it before returning, so there is never
/// more than one run in flight.
pub struct Session<S> {
    service: S,
    thread_id: ThreadId,
    config: SessionConfig,
}

impl<S: AssistantService> Session<S> {
    /// Opens a new remote thread and returns a session bound to it.
    pub async fn start(
        service: S,
        config: SessionConfig,
    ) -> Result<Self, S::Error> {
        let thread_id = service.create_thread().await?;
        info!("session started on thread {thread_id}");
        Ok(Self {
            service,
            thread_id,
            config,
        })
    }

    /// Returns the remote thread this session talks on.
    #[inline]
    pub fn thread_id(&self) -> &ThreadId {
        &self.thread_id
    }

    /// Returns the session configuration.
    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Sends a user input and waits for the assistant's reply.
    ///
    /// A failed or timed-out run is reported as a [`RunOutcome`], only
    /// errors from the service itself are returned as `Err`.
    pub async fn send(&self, input: &str) -> Result<RunOutcome, S::Error> {
        async move {
            let thread_id = &self.thread_id;
            self.service.post_message(thread_id, input).await?;
            let run = self
                .service
                .create_run(thread_id, &self.config.assistant_id)
                .await?;
            debug!("started run {}", run.id);

            let outcome = wait_for_run(
                &self.service,
                thread_id,
                &run.id,
                &self.config.wait,
            )
            .await?;
            let outcome = match outcome {
                WaitOutcome::Completed => {
                    let messages =
                        self.service.list_messages(thread_id).await?;
                    RunOutcome::Completed(latest_reply(&messages))
                }
                WaitOutcome::Failed(reason) => RunOutcome::Failed(reason),
                WaitOutcome::TimedOut { polls } => {
                    RunOutcome::TimedOut { polls }
                }
            };
            Ok(outcome)
        }
        .instrument(debug_span!("turn"))
        .await
    }
}
