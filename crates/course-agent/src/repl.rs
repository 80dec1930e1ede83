//! The line-based chat protocol spoken on the terminal.

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::io;

use course_agent_core::{RunOutcome, Session};
use course_agent_service::{AssistantService, AssistantServiceError};
use owo_colors::OwoColorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const BANNER: &str =
    "🎓 Smart Course Selector Agent\nType 'exit' to quit\n\n";
const PROMPT: &str = "You: ";
const EXIT_MESSAGE: &str = "👋 Exiting...\n";

/// Error type for [`Repl::run`].
#[derive(Debug)]
pub enum Error<E> {
    /// Reading the input or writing the output failed.
    Io(io::Error),
    /// The assistant service returned an error.
    Service(E),
}

impl<E> From<io::Error> for Error<E> {
    #[inline]
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl<E: AssistantServiceError> Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {err}"),
            Error::Service(err) => write!(f, "{}: {err}", err.kind()),
        }
    }
}

impl<E: AssistantServiceError> StdError for Error<E> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Service(err) => Some(err),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Empty,
    Message(&'a str),
}

impl<'a> Input<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        let is_quit = line.eq_ignore_ascii_case("exit")
            || line.eq_ignore_ascii_case("quit");
        if is_quit {
            Input::Quit
        } else if line.is_empty() {
            Input::Empty
        } else {
            Input::Message(line)
        }
    }
}

/// The interactive line protocol on top of a [`Session`].
///
/// Each non-empty line is one turn. The loop ends on `exit`, `quit` or end
/// of input, and on the first error from the service. Failed and timed-out
/// runs are reported and the session goes on.
pub struct Repl<S> {
    session: Session<S>,
    styled: bool,
    on_waiting: Option<Box<dyn Fn() + Send + Sync>>,
    on_idle: Option<Box<dyn Fn() + Send + Sync>>,
}

impl<S: AssistantService> Repl<S> {
    /// Creates a loop driving the given session.
    #[inline]
    pub fn new(session: Session<S>) -> Self {
        Self {
            session,
            styled: false,
            on_waiting: None,
            on_idle: None,
        }
    }

    /// Enables colored labels in the output.
    #[inline]
    pub fn with_styled_output(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    /// Attaches a callback to be invoked when a turn starts waiting for
    /// the assistant.
    #[inline]
    pub fn on_waiting(
        mut self,
        on_waiting: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_waiting = Some(Box::new(on_waiting));
        self
    }

    /// Attaches a callback to be invoked when a turn is over, whatever
    /// its outcome.
    #[inline]
    pub fn on_idle(
        mut self,
        on_idle: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_idle = Some(Box::new(on_idle));
        self
    }

    /// Returns the underlying session.
    #[inline]
    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// Runs the loop until the user quits.
    pub async fn run<R, W>(
        &self,
        mut input: R,
        mut output: W,
    ) -> Result<(), Error<S::Error>>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        output.write_all(BANNER.as_bytes()).await?;

        loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;

            let mut line = String::new();
            if input.read_line(&mut line).await? == 0 {
                debug!("reached end of input");
                output.write_all(b"\n").await?;
                break;
            }

            let message = match Input::parse(&line) {
                Input::Quit => break,
                Input::Empty => continue,
                Input::Message(message) => message,
            };

            if let Some(on_waiting) = &self.on_waiting {
                on_waiting();
            }
            let outcome = self.session.send(message).await;
            if let Some(on_idle) = &self.on_idle {
                on_idle();
            }

            let outcome = outcome.map_err(|err| {
                error!("turn aborted: {err}");
                Error::Service(err)
            })?;
            output.write_all(self.render(&outcome).as_bytes()).await?;
        }

        output.write_all(EXIT_MESSAGE.as_bytes()).await?;
        output.flush().await?;
        Ok(())
    }

    fn render(&self, outcome: &RunOutcome) -> String {
        match outcome {
            RunOutcome::Completed(reply) => {
                format!("{} {reply}\n", self.paint("Agent:", false))
            }
            RunOutcome::Failed(reason) => {
                format!("{} {reason}\n", self.paint("Run failed:", true))
            }
            RunOutcome::TimedOut { polls } => format!(
                "{}\n",
                self.paint(&format!("Run timed out after {polls} polls"), true)
            ),
        }
    }

    fn paint(&self, text: &str, is_error: bool) -> String {
        match (self.styled, is_error) {
            (false, _) => text.to_owned(),
            (true, false) => text.bright_cyan().bold().to_string(),
            (true, true) => text.bright_red().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use course_agent_core::SessionConfig;
    use course_agent_service::{ErrorKind, RunStatus};
    use course_agent_test_service::{Call, PresetRun, TestAssistantService};

    use super::*;

    async fn repl(
        service: &TestAssistantService,
    ) -> Repl<TestAssistantService> {
        let config = SessionConfig::with_assistant_id("asst_courses");
        let session = Session::start(service.clone(), config).await.unwrap();
        Repl::new(session)
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(Input::parse("exit\n"), Input::Quit);
        assert_eq!(Input::parse("QUIT\r\n"), Input::Quit);
        assert_eq!(Input::parse("  Exit "), Input::Quit);
        assert_eq!(Input::parse("\n"), Input::Empty);
        assert_eq!(Input::parse("exit now\n"), Input::Message("exit now"));
        assert_eq!(Input::parse("hello\n"), Input::Message("hello"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_lines_are_skipped() {
        let service = TestAssistantService::default();
        let repl = repl(&service).await;

        let mut output = vec![];
        repl.run(&b"\n   \nquit\n"[..], &mut output).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.matches(PROMPT).count(), 3);
        assert_eq!(service.calls(), vec![Call::CreateThread]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_surrounding_whitespace_is_trimmed() {
        let service = TestAssistantService::default();
        service.add_run(PresetRun::completed("Try CS 101."));
        let repl = repl(&service).await;

        let mut output = vec![];
        repl.run(&b"  hello  \r\n\texit \n"[..], &mut output)
            .await
            .unwrap();

        let posted: Vec<_> = service
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::PostMessage { content, .. } => Some(content),
                _ => None,
            })
            .collect();
        assert_eq!(posted, vec!["hello".to_owned()]);

        let output = String::from_utf8(output).unwrap();
        assert!(output.ends_with(EXIT_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_of_input_quits() {
        let service = TestAssistantService::default();
        let repl = repl(&service).await;

        let mut output = vec![];
        repl.run(&b""[..], &mut output).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.ends_with(EXIT_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_run_keeps_session() {
        let service = TestAssistantService::default();
        service.add_run(
            PresetRun::with_statuses([RunStatus::Failed])
                .with_failure("Something went wrong."),
        );
        service.add_run(PresetRun::completed("Try CS 102."));
        let repl = repl(&service).await;

        let mut output = vec![];
        repl.run(&b"hello\nagain\nexit\n"[..], &mut output)
            .await
            .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Run failed: Something went wrong.\n"));
        assert!(output.contains("Agent: Try CS 102.\n"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_error_ends_loop() {
        let service = TestAssistantService::default();
        let repl = repl(&service).await;
        service.fail_next(ErrorKind::Unauthorized);

        let mut output = vec![];
        let err = repl
            .run(&b"hello\nexit\n"[..], &mut output)
            .await
            .unwrap_err();
        assert!(matches!(
            &err,
            Error::Service(err) if err.kind() == ErrorKind::Unauthorized
        ));

        let output = String::from_utf8(output).unwrap();
        assert!(!output.contains(EXIT_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_callbacks_wrap_each_turn() {
        let service = TestAssistantService::default();
        service.add_run(PresetRun::completed("one"));
        service.add_run(PresetRun::completed("two"));

        let waiting = Arc::new(AtomicUsize::new(0));
        let idle = Arc::new(AtomicUsize::new(0));
        let repl = repl(&service)
            .await
            .on_waiting({
                let waiting = Arc::clone(&waiting);
                move || {
                    waiting.fetch_add(1, Ordering::Relaxed);
                }
            })
            .on_idle({
                let idle = Arc::clone(&idle);
                move || {
                    idle.fetch_add(1, Ordering::Relaxed);
                }
            });

        let mut output = vec![];
        repl.run(&b"a\nb\nexit\n"[..], &mut output).await.unwrap();
        assert_eq!(waiting.load(Ordering::Relaxed), 2);
        assert_eq!(idle.load(Ordering::Relaxed), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_styled_output() {
        let service = TestAssistantService::default();
        service.add_run(PresetRun::completed("hi there"));
        let repl = repl(&service).await.with_styled_output(true);

        let mut output = vec![];
        repl.run(&b"hello\nexit\n"[..], &mut output).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("\u{1b}["));
        assert!(output.contains(" hi there\n"));
        assert!(!output.contains("Agent: hi there"));
    }
}
