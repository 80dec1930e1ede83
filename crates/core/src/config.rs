use std::time::Duration;

/// How to wait for a run to reach a terminal status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WaitOptions {
    /// The delay between two polls.
    pub interval: Duration,
    /// The maximum number of polls before giving up. `None` waits forever,
    /// `Some(0)` gives up without polling at all.
    pub max_polls: Option<u32>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_polls: Some(300),
        }
    }
}

impl WaitOptions {
    /// Sets the delay between two polls.
    #[inline]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the maximum number of polls, `None` means unbounded.
    #[inline]
    pub fn with_max_polls(mut self, max_polls: Option<u32>) -> Self {
        self.max_polls = max_polls;
        self
    }
}

/// Configuration of a [`Session`](crate::Session).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionConfig {
    pub(crate) assistant_id: String,
    pub(crate) wait: WaitOptions,
}

impl SessionConfig {
    /// Creates a configuration running the given assistant.
    #[inline]
    pub fn with_assistant_id<S: Into<String>>(assistant_id: S) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            wait: Default::default(),
        }
    }

    /// Sets how runs are awaited.
    #[inline]
    pub fn with_wait_options(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Returns the assistant identifier.
    #[inline]
    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }
}
