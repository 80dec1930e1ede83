use course_agent_service::{AssistantService, RunId, RunStatus, ThreadId};
use tokio::time::sleep;

use crate::WaitOptions;

const DEFAULT_FAILURE_REASON: &str = "run failed";

/// How waiting for a run ended.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WaitOutcome {
    /// The run completed.
    Completed,
    /// The run failed, with the reason reported by the service.
    Failed(String),
    /// The run didn't reach a terminal status within the allowed polls.
    TimedOut {
        /// How many times the run has been polled.
        polls: u32,
    },
}

/// Polls the run until it is `completed` or `failed`.
///
/// Any other status, including `cancelled` and `expired`, keeps the poll
/// going until `max_polls` is reached. Errors from the service are returned
/// right away without retrying.
pub async fn wait_for_run<S: AssistantService>(
    service: &S,
    thread_id: &ThreadId,
    run_id: &RunId,
    options: &WaitOptions,
) -> Result<WaitOutcome, S::Error> {
    let mut polls = 0;
    loop {
        if options.max_polls.is_some_and(|max_polls| polls >= max_polls) {
            warn!("gave up waiting for run {run_id} after {polls} polls");
            return Ok(WaitOutcome::TimedOut { polls });
        }
        if polls > 0 {
            sleep(options.interval).await;
        }

        let run = service.get_run(thread_id, run_id).await?;
        polls += 1;
        trace!("run {run_id} is {} (poll #{polls})", run.status);

        match run.status {
            RunStatus::Completed => {
                debug!("run {run_id} completed after {polls} polls");
                return Ok(WaitOutcome::Completed);
            }
            RunStatus::Failed => {
                let reason = run
                    .last_error
                    .map(|err| err.message)
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| DEFAULT_FAILURE_REASON.to_owned());
                warn!("run {run_id} failed: {reason}");
                return Ok(WaitOutcome::Failed(reason));
            }
            _ => {}
        }
    }
}
