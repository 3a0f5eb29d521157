use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::blocks::{MessageTemplate, ModalView};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("slack gateway call failed: {0}")]
pub struct GatewayError(pub String);

/// Identity of a posted message, as returned by `chat.postMessage`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostedMessage {
    pub channel: String,
    pub ts: String,
}

/// Outbound Slack capability. The concrete wire client lives outside this
/// crate; handlers only ever see this trait.
#[async_trait]
pub trait SlackGateway: Send + Sync {
    async fn post_message(
        &self,
        channel: &str,
        message: &MessageTemplate,
    ) -> Result<PostedMessage, GatewayError>;

    async fn post_thread_reply(
        &self,
        channel: &str,
        thread_ts: &str,
        message: &MessageTemplate,
    ) -> Result<PostedMessage, GatewayError>;

    async fn open_view(&self, trigger_id: &str, view: &ModalView) -> Result<(), GatewayError>;
}

/// Records outbound calls and mints sequential timestamps. Backs tests and
/// gateway-free local runs.
#[derive(Default)]
pub struct RecordingGateway {
    state: Mutex<RecordingState>,
}

#[derive(Default)]
struct RecordingState {
    next_ts: u64,
    posted: Vec<(String, MessageTemplate)>,
    replies: Vec<(String, String, MessageTemplate)>,
    opened_views: Vec<(String, ModalView)>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn posted(&self) -> Vec<(String, MessageTemplate)> {
        self.state.lock().await.posted.clone()
    }

    pub async fn replies(&self) -> Vec<(String, String, MessageTemplate)> {
        self.state.lock().await.replies.clone()
    }

    pub async fn opened_views(&self) -> Vec<(String, ModalView)> {
        self.state.lock().await.opened_views.clone()
    }
}

#[async_trait]
impl SlackGateway for RecordingGateway {
    async fn post_message(
        &self,
        channel: &str,
        message: &MessageTemplate,
    ) -> Result<PostedMessage, GatewayError> {
        let mut state = self.state.lock().await;
        state.next_ts += 1;
        let ts = format!("1730000000.{:04}", state.next_ts);
        state.posted.push((channel.to_owned(), message.clone()));
        Ok(PostedMessage { channel: channel.to_owned(), ts })
    }

    async fn post_thread_reply(
        &self,
        channel: &str,
        thread_ts: &str,
        message: &MessageTemplate,
    ) -> Result<PostedMessage, GatewayError> {
        let mut state = self.state.lock().await;
        state.next_ts += 1;
        let ts = format!("1730000000.{:04}", state.next_ts);
        state.replies.push((channel.to_owned(), thread_ts.to_owned(), message.clone()));
        Ok(PostedMessage { channel: channel.to_owned(), ts })
    }

    async fn open_view(&self, trigger_id: &str, view: &ModalView) -> Result<(), GatewayError> {
        self.state.lock().await.opened_views.push((trigger_id.to_owned(), view.clone()));
        Ok(())
    }
}
