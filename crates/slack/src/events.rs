use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use samm_core::meetings::{
    AckOutcome, AckProcessor, AnnounceError, Announcer, CreateMeeting, FactoryError,
    MeetingFactory, MeetingStore, ProcessError,
};
use samm_core::{Acknowledgment, ChannelId, MeetingKey, MessageTs, UserId};

use crate::blocks::{
    announcement_message, completion_notice, create_meeting_modal, CREATE_MEETING_CALLBACK_ID,
};
use crate::gateway::{GatewayError, SlackGateway};
use crate::normalize::{reaction_ack, thread_reply_ack};

pub const MEETING_COMMAND: &str = "/samm";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlackEnvelope {
    pub envelope_id: String,
    pub event: SlackEvent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlackEvent {
    SlashCommand(SlashCommandPayload),
    ViewSubmission(ViewSubmissionEvent),
    Message(MessageEvent),
    ReactionAdded(ReactionAddedEvent),
    Unsupported { event_type: String },
}

impl SlackEvent {
    pub fn event_type(&self) -> SlackEventType {
        match self {
            Self::SlashCommand(_) => SlackEventType::SlashCommand,
            Self::ViewSubmission(_) => SlackEventType::ViewSubmission,
            Self::Message(_) => SlackEventType::Message,
            Self::ReactionAdded(_) => SlackEventType::ReactionAdded,
            Self::Unsupported { .. } => SlackEventType::Unsupported,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlackEventType {
    SlashCommand,
    ViewSubmission,
    Message,
    ReactionAdded,
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlashCommandPayload {
    pub command: String,
    pub channel_id: String,
    pub user_id: String,
    pub trigger_id: String,
    pub request_id: String,
}

/// A submitted modal, with the form state already flattened by the
/// transport layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewSubmissionEvent {
    pub callback_id: String,
    pub private_metadata: String,
    pub submitter_user_id: String,
    pub values: MeetingFormValues,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeetingFormValues {
    pub name: String,
    pub required: Vec<String>,
    pub optional: Vec<String>,
    pub agenda: String,
    /// Unix seconds, as the datetimepicker element submits it.
    pub end_unix: i64,
    /// Number inputs submit strings; parsed at handling time.
    pub reminder: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageEvent {
    pub channel_id: String,
    pub ts: String,
    pub thread_ts: Option<String>,
    pub user_id: String,
    pub text: String,
    pub bot_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactionAddedEvent {
    pub channel_id: String,
    pub message_ts: String,
    pub reactor_user_id: String,
    pub reaction: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    Processed,
    Ignored,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventHandlerError {
    #[error(transparent)]
    Factory(#[from] FactoryError),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("malformed event payload: {0}")]
    MalformedPayload(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Handler(#[from] EventHandlerError),
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    fn event_type(&self) -> SlackEventType;
    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;
}

#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<SlackEventType, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.insert(handler.event_type(), Arc::new(handler));
    }

    pub async fn dispatch(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, DispatchError> {
        let Some(handler) = self.handlers.get(&envelope.event.event_type()) else {
            return Ok(HandlerResult::Ignored);
        };

        handler.handle(envelope, ctx).await.map_err(DispatchError::from)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

/// Wires the full handler set against one store and one gateway.
pub fn meeting_dispatcher(
    store: Arc<dyn MeetingStore>,
    gateway: Arc<dyn SlackGateway>,
    ack_reaction: impl Into<String>,
    default_reminder_hours: u32,
) -> EventDispatcher {
    let acks = Arc::new(AckService::new(store.clone(), gateway.clone(), ack_reaction));

    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(SlashCommandHandler::new(gateway.clone(), default_reminder_hours));
    dispatcher.register(CreateMeetingHandler::new(store, gateway));
    dispatcher.register(ReactionAddedHandler::new(acks.clone()));
    dispatcher.register(MessageHandler::new(acks));
    dispatcher
}

#[derive(Deserialize)]
struct ViewMetadata {
    channel_id: String,
}

/// Opens the meeting-creation modal in response to the slash command. The
/// source channel rides along in the view's private metadata.
pub struct SlashCommandHandler {
    gateway: Arc<dyn SlackGateway>,
    default_reminder_hours: u32,
}

impl SlashCommandHandler {
    pub fn new(gateway: Arc<dyn SlackGateway>, default_reminder_hours: u32) -> Self {
        Self { gateway, default_reminder_hours }
    }
}

#[async_trait]
impl EventHandler for SlashCommandHandler {
    fn event_type(&self) -> SlackEventType {
        SlackEventType::SlashCommand
    }

    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        _ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let SlackEvent::SlashCommand(payload) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };
        if payload.command != MEETING_COMMAND {
            return Ok(HandlerResult::Ignored);
        }

        let metadata = serde_json::json!({ "channel_id": payload.channel_id }).to_string();
        let view = create_meeting_modal(&metadata, self.default_reminder_hours);
        self.gateway.open_view(&payload.trigger_id, &view).await?;
        Ok(HandlerResult::Processed)
    }
}

/// Posts the announcement through the gateway; the returned `(channel,
/// ts)` of the posted message becomes the meeting identity.
pub struct GatewayAnnouncer {
    gateway: Arc<dyn SlackGateway>,
}

impl GatewayAnnouncer {
    pub fn new(gateway: Arc<dyn SlackGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Announcer for GatewayAnnouncer {
    async fn announce(
        &self,
        channel: &ChannelId,
        meeting: &CreateMeeting,
    ) -> Result<MeetingKey, AnnounceError> {
        let message = announcement_message(meeting);
        let posted = self
            .gateway
            .post_message(&channel.0, &message)
            .await
            .map_err(|error| AnnounceError(error.to_string()))?;

        Ok(MeetingKey { channel: ChannelId(posted.channel), ts: MessageTs(posted.ts) })
    }
}

/// Handles `create-meeting` modal submissions: parse the form, announce,
/// persist.
pub struct CreateMeetingHandler {
    factory: MeetingFactory,
    announcer: GatewayAnnouncer,
}

impl CreateMeetingHandler {
    pub fn new(store: Arc<dyn MeetingStore>, gateway: Arc<dyn SlackGateway>) -> Self {
        Self { factory: MeetingFactory::new(store), announcer: GatewayAnnouncer::new(gateway) }
    }
}

fn user_set(ids: &[String]) -> BTreeSet<UserId> {
    ids.iter().map(|id| UserId(id.clone())).collect()
}

fn creation_request(values: &MeetingFormValues) -> Result<CreateMeeting, EventHandlerError> {
    let end = DateTime::from_timestamp(values.end_unix, 0).ok_or_else(|| {
        EventHandlerError::MalformedPayload(format!(
            "meeting end {} is not a valid unix timestamp",
            values.end_unix
        ))
    })?;
    let reminder_period_hours = values.reminder.trim().parse::<u32>().map_err(|_| {
        EventHandlerError::MalformedPayload(format!(
            "reminder period {:?} is not a whole number of hours",
            values.reminder
        ))
    })?;

    Ok(CreateMeeting {
        name: values.name.clone(),
        required: user_set(&values.required),
        optional: user_set(&values.optional),
        agenda: values.agenda.clone(),
        end,
        reminder_period_hours,
    })
}

#[async_trait]
impl EventHandler for CreateMeetingHandler {
    fn event_type(&self) -> SlackEventType {
        SlackEventType::ViewSubmission
    }

    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let SlackEvent::ViewSubmission(event) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };
        if event.callback_id != CREATE_MEETING_CALLBACK_ID {
            debug!(
                callback_id = %event.callback_id,
                correlation_id = %ctx.correlation_id,
                "view submission with unknown callback ignored"
            );
            return Ok(HandlerResult::Ignored);
        }

        let metadata: ViewMetadata =
            serde_json::from_str(&event.private_metadata).map_err(|error| {
                EventHandlerError::MalformedPayload(format!(
                    "view private_metadata is not valid: {error}"
                ))
            })?;

        let request = creation_request(&event.values)?;
        let channel = ChannelId(metadata.channel_id);
        self.factory.create(&channel, request, &self.announcer).await?;
        Ok(HandlerResult::Processed)
    }
}

/// Shared acknowledgment path for both inbound sources. Runs the
/// processor and, on completion, posts the finish notice into the
/// announcement thread.
pub struct AckService {
    store: Arc<dyn MeetingStore>,
    processor: AckProcessor,
    gateway: Arc<dyn SlackGateway>,
    ack_reaction: String,
}

impl AckService {
    pub fn new(
        store: Arc<dyn MeetingStore>,
        gateway: Arc<dyn SlackGateway>,
        ack_reaction: impl Into<String>,
    ) -> Self {
        Self {
            processor: AckProcessor::new(store.clone()),
            store,
            gateway,
            ack_reaction: ack_reaction.into(),
        }
    }

    pub fn ack_reaction(&self) -> &str {
        &self.ack_reaction
    }

    pub async fn apply(&self, ack: &Acknowledgment) -> Result<AckOutcome, EventHandlerError> {
        let outcome = self.processor.process(ack).await?;

        if outcome == AckOutcome::Completed {
            let key = ack.meeting_key();
            let record = self.store.get(&key).await.map_err(ProcessError::from)?;
            let name = record.map(|record| record.name).unwrap_or_else(|| "meeting".to_owned());
            self.gateway
                .post_thread_reply(&key.channel.0, &key.ts.0, &completion_notice(&name))
                .await?;
        }

        Ok(outcome)
    }
}

pub struct ReactionAddedHandler {
    acks: Arc<AckService>,
}

impl ReactionAddedHandler {
    pub fn new(acks: Arc<AckService>) -> Self {
        Self { acks }
    }
}

#[async_trait]
impl EventHandler for ReactionAddedHandler {
    fn event_type(&self) -> SlackEventType {
        SlackEventType::ReactionAdded
    }

    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        _ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let SlackEvent::ReactionAdded(event) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };
        let Some(ack) = reaction_ack(event, self.acks.ack_reaction()) else {
            return Ok(HandlerResult::Processed);
        };

        self.acks.apply(&ack).await?;
        Ok(HandlerResult::Processed)
    }
}

pub struct MessageHandler {
    acks: Arc<AckService>,
}

impl MessageHandler {
    pub fn new(acks: Arc<AckService>) -> Self {
        Self { acks }
    }
}

#[async_trait]
impl EventHandler for MessageHandler {
    fn event_type(&self) -> SlackEventType {
        SlackEventType::Message
    }

    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        _ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let SlackEvent::Message(event) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };
        let Some(ack) = thread_reply_ack(event) else {
            return Ok(HandlerResult::Processed);
        };

        self.acks.apply(&ack).await?;
        Ok(HandlerResult::Processed)
    }
}
