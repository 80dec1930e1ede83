use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Returns the raw identifier.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

define_id! {
    /// An opaque identifier of a conversation thread.
    ThreadId
}

define_id! {
    /// An opaque identifier of a run, scoped to one thread.
    RunId
}

/// The author of a thread message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A message sent by the user.
    User,
    /// A message generated by the assistant.
    Assistant,
}

/// A message in a conversation thread.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadMessage {
    /// The unique identifier of the message.
    pub id: String,
    /// Who wrote the message.
    pub role: Role,
    /// The text content of the message.
    ///
    /// When the message carries several content parts, this is the first
    /// text part. It is empty if the message has no text at all.
    pub text: String,
}

/// The status of a run.
///
/// Transitions are driven entirely by the service, the client only
/// observes them by polling.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    /// The run is waiting to be picked up.
    Queued,
    /// The run is executing.
    InProgress,
    /// The run waits for the client to submit tool outputs.
    RequiresAction,
    /// A cancellation has been requested.
    Cancelling,
    /// The run was cancelled.
    Cancelled,
    /// The run failed.
    Failed,
    /// The run finished successfully.
    Completed,
    /// The run ended before producing a complete answer.
    Incomplete,
    /// The run expired.
    Expired,
    /// A status this crate doesn't know about, kept verbatim.
    Other(String),
}

impl RunStatus {
    /// Returns the wire representation of the status.
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Other(status) => status,
        }
    }
}

impl From<&str> for RunStatus {
    fn from(value: &str) -> Self {
        match value {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "requires_action" => RunStatus::RequiresAction,
            "cancelling" => RunStatus::Cancelling,
            "cancelled" => RunStatus::Cancelled,
            "failed" => RunStatus::Failed,
            "completed" => RunStatus::Completed,
            "incomplete" => RunStatus::Incomplete,
            "expired" => RunStatus::Expired,
            other => RunStatus::Other(other.to_owned()),
        }
    }
}

impl From<String> for RunStatus {
    #[inline]
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<RunStatus> for String {
    #[inline]
    fn from(value: RunStatus) -> Self {
        value.as_str().to_owned()
    }
}

impl Display for RunStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The last error reported for a run.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunError {
    /// A machine-readable error code.
    pub code: String,
    /// A human-readable description.
    pub message: String,
}

/// A run of an assistant on a thread.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Run {
    /// The unique identifier of the run.
    pub id: RunId,
    /// The thread this run belongs to.
    pub thread_id: ThreadId,
    /// The status observed when this value was fetched.
    pub status: RunStatus,
    /// The error that made the run fail, if any.
    pub last_error: Option<RunError>,
}
