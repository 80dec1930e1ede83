use course_agent_service::RunStatus;
use serde::{Deserialize, Serialize};

/// The preset behavior of one run.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetRun {
    /// Statuses returned by successive polls. Once exhausted, the last
    /// status is repeated forever. An empty list behaves like `queued`.
    pub statuses: Vec<RunStatus>,
    /// The assistant reply appended to the thread when the run is first
    /// observed as completed.
    pub reply: Option<String>,
    /// The error message reported by the run, if it fails.
    pub failure: Option<String>,
}

impl PresetRun {
    /// Creates a `PresetRun` walking through the specified statuses.
    #[inline]
    pub fn with_statuses(statuses: impl Into<Vec<RunStatus>>) -> Self {
        Self {
            statuses: statuses.into(),
            reply: None,
            failure: None,
        }
    }

    /// Creates a run that completes on the first poll with the given reply.
    #[inline]
    pub fn completed<S: Into<String>>(reply: S) -> Self {
        Self::with_statuses([RunStatus::Completed]).with_reply(reply)
    }

    /// Sets the reply produced by the run.
    #[inline]
    pub fn with_reply<S: Into<String>>(mut self, reply: S) -> Self {
        self.reply = Some(reply.into());
        self
    }

    /// Sets the error message reported by the run.
    #[inline]
    pub fn with_failure<S: Into<String>>(mut self, failure: S) -> Self {
        self.failure = Some(failure.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_deserialize_from_script() {
        let preset: PresetRun = serde_json::from_value(json!({
            "statuses": ["queued", "in_progress", "completed"],
            "reply": "Take CS 101 first.",
            "failure": null
        }))
        .unwrap();

        assert_eq!(
            preset,
            PresetRun::with_statuses([
                RunStatus::Queued,
                RunStatus::InProgress,
                RunStatus::Completed,
            ])
            .with_reply("Take CS 101 first.")
        );
    }
}
