//! A local fake assistant service for testing purpose.

mod preset;

use std::collections::{HashMap, VecDeque};
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use course_agent_service::{
    AssistantService, AssistantServiceError, ErrorKind, Role, Run, RunError,
    RunId, RunStatus, ThreadId, ThreadMessage,
};

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    #[allow(dead_code)]
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl AssistantServiceError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// A remote operation received by [`TestAssistantService`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Call {
    CreateThread,
    PostMessage {
        thread_id: ThreadId,
        content: String,
    },
    CreateRun {
        thread_id: ThreadId,
        assistant_id: String,
    },
    GetRun {
        thread_id: ThreadId,
        run_id: RunId,
    },
    ListMessages {
        thread_id: ThreadId,
    },
}

struct RunState {
    thread_id: ThreadId,
    preset: PresetRun,
    polls: usize,
    replied: bool,
}

#[derive(Default)]
struct State {
    next_id: u64,
    threads: HashMap<ThreadId, Vec<ThreadMessage>>,
    runs: HashMap<RunId, RunState>,
    presets: VecDeque<PresetRun>,
    listed_messages: Option<Vec<ThreadMessage>>,
    pending_failure: Option<ErrorKind>,
    calls: Vec<Call>,
}

impl State {
    fn record(&mut self, call: Call) -> Result<(), Error> {
        self.calls.push(call);
        match self.pending_failure.take() {
            Some(kind) => Err(Error {
                message: "injected failure",
                kind,
            }),
            None => Ok(()),
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{}", self.next_id)
    }

    fn thread_mut(
        &mut self,
        thread_id: &ThreadId,
    ) -> Result<&mut Vec<ThreadMessage>, Error> {
        self.threads.get_mut(thread_id).ok_or(Error {
            message: "no such thread",
            kind: ErrorKind::NotFound,
        })
    }

    fn create_thread(&mut self) -> Result<ThreadId, Error> {
        self.record(Call::CreateThread)?;
        let thread_id = ThreadId::from(self.next_id("thread"));
        self.threads.insert(thread_id.clone(), vec![]);
        Ok(thread_id)
    }

    fn post_message(
        &mut self,
        thread_id: &ThreadId,
        content: &str,
    ) -> Result<ThreadMessage, Error> {
        self.record(Call::PostMessage {
            thread_id: thread_id.clone(),
            content: content.to_owned(),
        })?;
        let msg = ThreadMessage {
            id: self.next_id("msg"),
            role: Role::User,
            text: content.to_owned(),
        };
        // The service lists messages newest first.
        self.thread_mut(thread_id)?.insert(0, msg.clone());
        Ok(msg)
    }

    fn create_run(
        &mut self,
        thread_id: &ThreadId,
        assistant_id: &str,
    ) -> Result<Run, Error> {
        self.record(Call::CreateRun {
            thread_id: thread_id.clone(),
            assistant_id: assistant_id.to_owned(),
        })?;
        self.thread_mut(thread_id)?;
        let Some(preset) = self.presets.pop_front() else {
            return Err(Error {
                message: "no enough preset runs",
                kind: ErrorKind::Other,
            });
        };

        let run_id = RunId::from(self.next_id("run"));
        self.runs.insert(
            run_id.clone(),
            RunState {
                thread_id: thread_id.clone(),
                preset,
                polls: 0,
                replied: false,
            },
        );
        Ok(Run {
            id: run_id,
            thread_id: thread_id.clone(),
            status: RunStatus::Queued,
            last_error: None,
        })
    }

    fn get_run(
        &mut self,
        thread_id: &ThreadId,
        run_id: &RunId,
    ) -> Result<Run, Error> {
        self.record(Call::GetRun {
            thread_id: thread_id.clone(),
            run_id: run_id.clone(),
        })?;
        let not_found = Error {
            message: "no such run",
            kind: ErrorKind::NotFound,
        };
        let Some(run) = self.runs.get_mut(run_id) else {
            return Err(not_found);
        };
        if &run.thread_id != thread_id {
            return Err(not_found);
        }

        let statuses = &run.preset.statuses;
        let status = statuses
            .get(run.polls.min(statuses.len().saturating_sub(1)))
            .cloned()
            .unwrap_or(RunStatus::Queued);
        run.polls += 1;

        let last_error = match (&status, &run.preset.failure) {
            (RunStatus::Failed, Some(message)) => Some(RunError {
                code: "server_error".to_owned(),
                message: message.clone(),
            }),
            _ => None,
        };

        let reply = if status == RunStatus::Completed && !run.replied {
            run.replied = true;
            run.preset.reply.clone()
        } else {
            None
        };
        if let Some(reply) = reply {
            let msg = ThreadMessage {
                id: self.next_id("msg"),
                role: Role::Assistant,
                text: reply,
            };
            self.thread_mut(thread_id)?.insert(0, msg);
        }

        Ok(Run {
            id: run_id.clone(),
            thread_id: thread_id.clone(),
            status,
            last_error,
        })
    }

    fn list_messages(
        &mut self,
        thread_id: &ThreadId,
    ) -> Result<Vec<ThreadMessage>, Error> {
        self.record(Call::ListMessages {
            thread_id: thread_id.clone(),
        })?;
        let messages = self.thread_mut(thread_id)?.clone();
        Ok(self.listed_messages.clone().unwrap_or(messages))
    }
}

/// A local fake assistant service for testing purpose.
///
/// Before starting runs, you need to add a preset for each of them, which
/// describes the statuses the run goes through and the reply it produces.
/// Presets are consumed in order by `create_run`. If there are no enough
/// presets, an error will be returned.
///
/// Clones share the same state, so a test can keep a clone around to
/// inspect the received calls after handing the service over.
#[derive(Clone, Default)]
pub struct TestAssistantService {
    state: Arc<Mutex<State>>,
}

impl TestAssistantService {
    #[inline]
    pub fn add_run(&self, preset: PresetRun) {
        self.lock().presets.push_back(preset);
    }

    /// Overrides the messages returned by `list_messages`, for all threads.
    #[inline]
    pub fn set_messages(&self, messages: Vec<ThreadMessage>) {
        self.lock().listed_messages = Some(messages);
    }

    /// Makes the next call, whichever operation it is, fail with `kind`.
    #[inline]
    pub fn fail_next(&self, kind: ErrorKind) {
        self.lock().pending_failure = Some(kind);
    }

    /// Returns all calls received so far.
    #[inline]
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AssistantService for TestAssistantService {
    type Error = crate::Error;

    fn create_thread(
        &self,
    ) -> impl Future<Output = Result<ThreadId, Self::Error>> + Send + 'static
    {
        ready(self.lock().create_thread())
    }

    fn post_message(
        &self,
        thread_id: &ThreadId,
        content: &str,
    ) -> impl Future<Output = Result<ThreadMessage, Self::Error>> + Send + 'static
    {
        ready(self.lock().post_message(thread_id, content))
    }

    fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &str,
    ) -> impl Future<Output = Result<Run, Self::Error>> + Send + 'static {
        ready(self.lock().create_run(thread_id, assistant_id))
    }

    fn get_run(
        &self,
        thread_id: &ThreadId,
        run_id: &RunId,
    ) -> impl Future<Output = Result<Run, Self::Error>> + Send + 'static {
        ready(self.lock().get_run(thread_id, run_id))
    }

    fn list_messages(
        &self,
        thread_id: &ThreadId,
    ) -> impl Future<Output = Result<Vec<ThreadMessage>, Self::Error>>
    + Send
    + 'static {
        ready(self.lock().list_messages(thread_id))
    }
}
