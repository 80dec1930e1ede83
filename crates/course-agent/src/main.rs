//! The course selector chat client.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::IsTerminal as _;
use std::path::Path;
use std::process::ExitCode;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use course_agent::Repl;
use course_agent::core::{Session, SessionConfig, WaitOptions};
use course_agent::openai::{OpenAIConfigBuilder, OpenAIService};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io;

/// The assistant this client talks to, unless overridden by one of
/// [`ASSISTANT_ID_VARS`].
const ASSISTANT_ID: &str = "asst_smart_course_selector";

/// Variables naming the assistant, in order of precedence.
const ASSISTANT_ID_VARS: [&str; 3] =
    ["COURSE_AGENT_ASSISTANT_ID", "OPENAI_ASSISTANT_ID", "ASSISTANT_ID"];

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    load_env_file(None);

    let Ok(api_key) = env::var("OPENAI_API_KEY") else {
        eprintln!("OPENAI_API_KEY environment variable is not set");
        return ExitCode::FAILURE;
    };
    let mut config_builder = OpenAIConfigBuilder::with_api_key(api_key);
    if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
        config_builder = config_builder.with_base_url(base_url);
    }
    let service = OpenAIService::new(config_builder.build());

    let assistant_id = assistant_id(|name| env::var(name).ok());
    let Some(wait_options) = wait_options() else {
        eprintln!("COURSE_AGENT_MAX_POLLS must be a non-negative integer");
        return ExitCode::FAILURE;
    };
    let config = SessionConfig::with_assistant_id(assistant_id)
        .with_wait_options(wait_options);

    let session = match Session::start(service, config).await {
        Ok(session) => session,
        Err(err) => {
            report_fatal(&format!("failed to start a conversation: {err}"));
            return ExitCode::FAILURE;
        }
    };

    let spinner = Arc::new(Mutex::new(None::<ProgressBar>));
    let repl = Repl::new(session)
        .with_styled_output(std::io::stdout().is_terminal())
        .on_waiting({
            let spinner = Arc::clone(&spinner);
            move || {
                let progress_bar = ProgressBar::new_spinner();
                let style = ProgressStyle::with_template("{spinner} {wide_msg}");
                if let Ok(style) = style {
                    progress_bar.set_style(style.tick_chars(TICK_CHARS));
                }
                progress_bar.set_message("🤔 Thinking...");
                progress_bar.enable_steady_tick(Duration::from_millis(100));
                *spinner.lock().unwrap_or_else(PoisonError::into_inner) =
                    Some(progress_bar);
            }
        })
        .on_idle(move || {
            // Finish the progress bar before printing anything else.
            let progress_bar =
                spinner.lock().unwrap_or_else(PoisonError::into_inner).take();
            if let Some(progress_bar) = progress_bar {
                progress_bar.finish_and_clear();
            }
        });

    let stdin = io::BufReader::new(io::stdin());
    match repl.run(stdin, io::stdout()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_fatal(&err.to_string());
            ExitCode::FAILURE
        }
    }
}

/// Loads variables from a `.env` file, silently ignored if absent.
///
/// Variables already present in the environment win over the file.
fn load_env_file(path: Option<&Path>) {
    let result = match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_owned()),
        None => dotenvy::dotenv(),
    };
    match result {
        Ok(path) => debug!("loaded environment from {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => warn!("failed to load .env file: {err}"),
    }
}

fn assistant_id(lookup: impl Fn(&str) -> Option<String>) -> String {
    ASSISTANT_ID_VARS
        .iter()
        .filter_map(|&name| lookup(name))
        .find(|id| !id.trim().is_empty())
        .unwrap_or_else(|| ASSISTANT_ID.to_owned())
}

fn wait_options() -> Option<WaitOptions> {
    let options = WaitOptions::default();
    let Ok(max_polls) = env::var("COURSE_AGENT_MAX_POLLS") else {
        return Some(options);
    };
    match max_polls.trim().parse::<u32>() {
        Ok(0) => Some(options.with_max_polls(None)),
        Ok(max_polls) => Some(options.with_max_polls(Some(max_polls))),
        Err(_) => None,
    }
}

fn report_fatal(message: &str) {
    error!("{message}");
    eprintln!("{} {message}", "error:".bright_red().bold());
}
