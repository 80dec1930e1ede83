use course_agent_service::{
    Role, Run, RunError, RunStatus, ThreadId, ThreadMessage,
};
use serde::{Deserialize, Serialize};

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ThreadObject {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct LastError {
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct RunObject {
    pub id: String,
    pub thread_id: String,
    pub status: String,
    pub last_error: Option<LastError>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct TextValue {
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        text: TextValue,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct MessageObject {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct MessageList {
    pub data: Vec<MessageObject>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiError,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ApiError {
    pub message: String,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CreateThreadRequest {}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CreateMessageRequest {
    role: Role,
    content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CreateRunRequest {
    assistant_id: String,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_message_request(content: &str) -> CreateMessageRequest {
    CreateMessageRequest {
        role: Role::User,
        content: content.to_owned(),
    }
}

#[inline]
pub fn create_run_request(assistant_id: &str) -> CreateRunRequest {
    CreateRunRequest {
        assistant_id: assistant_id.to_owned(),
    }
}

#[inline]
pub fn thread_id(thread: ThreadObject) -> ThreadId {
    ThreadId::from(thread.id)
}

pub fn run(run: RunObject) -> Run {
    Run {
        id: run.id.into(),
        thread_id: run.thread_id.into(),
        status: RunStatus::from(run.status),
        last_error: run.last_error.map(|err| RunError {
            code: err.code.unwrap_or_default(),
            message: err.message.unwrap_or_default(),
        }),
    }
}

pub fn message(msg: MessageObject) -> ThreadMessage {
    // Only the first text part is surfaced, other parts (images, files)
    // are not rendered by this client.
    let text = msg
        .content
        .into_iter()
        .find_map(|part| match part {
            ContentPart::Text { text } => Some(text.value),
            ContentPart::Unsupported => None,
        })
        .unwrap_or_default();
    ThreadMessage {
        id: msg.id,
        role: msg.role,
        text,
    }
}

#[inline]
pub fn messages(list: MessageList) -> Vec<ThreadMessage> {
    list.data.into_iter().map(message).collect()
}
