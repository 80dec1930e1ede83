//! An assistant service backed by the OpenAI Assistants API.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use course_agent_service::{
    AssistantService, AssistantServiceError, ErrorKind, Run, RunId, ThreadId,
    ThreadMessage,
};
use mime::Mime;
use reqwest::{Client, RequestBuilder, StatusCode, header};
use serde::de::DeserializeOwned;
use tracing::Instrument;

pub use config::{OpenAIConfig, OpenAIConfigBuilder};

/// Error type for [`OpenAIService`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl AssistantServiceError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Assistant service talking to an OpenAI-compatible Assistants API.
#[derive(Clone, Debug)]
pub struct OpenAIService {
    client: Client,
    config: Arc<OpenAIConfig>,
}

impl OpenAIService {
    /// Creates a new `OpenAIService` with the given configuration.
    #[inline]
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.get(self.config.endpoint(path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.post(self.config.endpoint(path)))
            .header(header::CONTENT_TYPE, "application/json")
    }

    #[inline]
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header("OpenAI-Beta", "assistants=v2")
    }
}

impl AssistantService for OpenAIService {
    type Error = Error;

    fn create_thread(
        &self,
    ) -> impl Future<Output = Result<ThreadId, Self::Error>> + Send + 'static
    {
        let fut = send::<proto::ThreadObject>(
            self.post("/threads").json(&proto::CreateThreadRequest {}),
        );
        async move {
            let thread = fut.await?;
            debug!("created thread {}", thread.id);
            Ok(proto::thread_id(thread))
        }
        .instrument(debug_span!("create thread"))
    }

    fn post_message(
        &self,
        thread_id: &ThreadId,
        content: &str,
    ) -> impl Future<Output = Result<ThreadMessage, Self::Error>> + Send + 'static
    {
        let fut = send::<proto::MessageObject>(
            self.post(&format!("/threads/{thread_id}/messages"))
                .json(&proto::create_message_request(content)),
        );
        async move { fut.await.map(proto::message) }
            .instrument(debug_span!("post message"))
    }

    fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &str,
    ) -> impl Future<Output = Result<Run, Self::Error>> + Send + 'static {
        let fut = send::<proto::RunObject>(
            self.post(&format!("/threads/{thread_id}/runs"))
                .json(&proto::create_run_request(assistant_id)),
        );
        async move {
            let run = proto::run(fut.await?);
            debug!("created run {} ({})", run.id, run.status);
            Ok(run)
        }
        .instrument(debug_span!("create run"))
    }

    fn get_run(
        &self,
        thread_id: &ThreadId,
        run_id: &RunId,
    ) -> impl Future<Output = Result<Run, Self::Error>> + Send + 'static {
        let fut = send::<proto::RunObject>(
            self.get(&format!("/threads/{thread_id}/runs/{run_id}")),
        );
        async move { fut.await.map(proto::run) }
            .instrument(trace_span!("get run"))
    }

    fn list_messages(
        &self,
        thread_id: &ThreadId,
    ) -> impl Future<Output = Result<Vec<ThreadMessage>, Self::Error>>
    + Send
    + 'static {
        let fut = send::<proto::MessageList>(
            self.get(&format!("/threads/{thread_id}/messages?order=desc")),
        );
        async move { fut.await.map(proto::messages) }
            .instrument(debug_span!("list messages"))
    }
}

fn send<T: DeserializeOwned>(
    builder: RequestBuilder,
) -> impl Future<Output = Result<T, Error>> + Send + 'static {
    let resp_fut = builder.send();
    async move {
        let resp = resp_fut
            .await
            .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);
        let body = resp
            .text()
            .await
            .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
        trace!("got response ({status}): {body}");
        decode_response(status, content_type.as_deref(), &body)
    }
}

fn decode_response<T: DeserializeOwned>(
    status: StatusCode,
    content_type: Option<&str>,
    body: &str,
) -> Result<T, Error> {
    if !status.is_success() {
        let message = serde_json::from_str::<proto::ApiErrorBody>(body)
            .map(|body| body.error.message)
            .unwrap_or_else(|_| format!("unexpected status: {status}"));
        warn!("request failed ({status}): {message}");
        return Err(Error::new(message, classify_status(status)));
    }

    let is_json = content_type
        .and_then(|v| v.parse().ok())
        .map(|m: Mime| m.subtype().as_str() == "json")
        .unwrap_or(false);
    if !is_json {
        return Err(Error::new(
            format!("Unexpected content type: {content_type:?}"),
            ErrorKind::InvalidResponse,
        ));
    }

    serde_json::from_str(body)
        .map_err(|err| Error::new(format!("{err}"), ErrorKind::InvalidResponse))
}

#[inline]
fn classify_status(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ErrorKind::Unauthorized
        }
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::TOO_MANY_REQUESTS => ErrorKind::RateLimitExceeded,
        _ => ErrorKind::Other,
    }
}
