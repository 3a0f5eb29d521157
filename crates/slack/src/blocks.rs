use std::collections::BTreeSet;

use serde::Serialize;

use samm_core::meetings::CreateMeeting;
use samm_core::UserId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    Plain { text: String },
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain { text: text.into() }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header { block_id: String, text: TextObject },
    Section { block_id: String, text: TextObject },
    Divider,
    Context { block_id: String, elements: Vec<TextObject> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageTemplate {
    pub fallback_text: String,
    pub blocks: Vec<Block>,
}

pub struct MessageBuilder {
    fallback_text: String,
    blocks: Vec<Block>,
}

impl MessageBuilder {
    pub fn new(fallback_text: impl Into<String>) -> Self {
        Self { fallback_text: fallback_text.into(), blocks: Vec::new() }
    }

    pub fn header(mut self, block_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.blocks.push(Block::Header { block_id: block_id.into(), text: TextObject::plain(text) });
        self
    }

    pub fn section<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut SectionBuilder),
    {
        let mut builder = SectionBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Section { block_id: block_id.into(), text: builder.build() });
        self
    }

    pub fn divider(mut self) -> Self {
        self.blocks.push(Block::Divider);
        self
    }

    pub fn context<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut ContextBuilder),
    {
        let mut builder = ContextBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Context { block_id: block_id.into(), elements: builder.build() });
        self
    }

    pub fn build(self) -> MessageTemplate {
        MessageTemplate { fallback_text: self.fallback_text, blocks: self.blocks }
    }
}

#[derive(Default)]
pub struct SectionBuilder {
    text: Option<TextObject>,
}

impl SectionBuilder {
    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::plain(text));
        self
    }

    pub fn mrkdwn(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::mrkdwn(text));
        self
    }

    fn build(self) -> TextObject {
        self.text.unwrap_or_else(|| TextObject::plain(""))
    }
}

#[derive(Default)]
pub struct ContextBuilder {
    elements: Vec<TextObject>,
}

impl ContextBuilder {
    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.elements.push(TextObject::plain(text));
        self
    }

    pub fn mrkdwn(&mut self, text: impl Into<String>) -> &mut Self {
        self.elements.push(TextObject::mrkdwn(text));
        self
    }

    fn build(self) -> Vec<TextObject> {
        self.elements
    }
}

fn mention_list(users: &BTreeSet<UserId>) -> String {
    users.iter().map(|user| format!("<@{}>", user.0)).collect::<Vec<_>>().join(", ")
}

/// Announcement posted to the source channel when a meeting is created.
/// Its `(channel, ts)` becomes the meeting identity.
pub fn announcement_message(meeting: &CreateMeeting) -> MessageTemplate {
    MessageBuilder::new(meeting.name.clone())
        .header("meeting.header.v1", &meeting.name)
        .section("meeting.summary.v1", |section| {
            section.mrkdwn(format!(
                "*Required Attendees:* {}\n*Optional Attendees:* {}\n*Ends:* {} (UTC)\n*Reminder:* {} hr",
                mention_list(&meeting.required),
                mention_list(&meeting.optional),
                meeting.end.format("%Y-%m-%d %H:%M"),
                meeting.reminder_period_hours
            ));
        })
        .divider()
        .section("meeting.agenda.v1", |section| {
            section.mrkdwn(format!("*Agenda:*\n{}", meeting.agenda));
        })
        .context("meeting.howto.v1", |context| {
            context.mrkdwn(
                "React with :white_check_mark: or reply in this thread to check in.".to_string(),
            );
        })
        .build()
}

/// Posted in the announcement thread when the last required attendee
/// checks in. Delivery is at-least-once by design.
pub fn completion_notice(meeting_name: &str) -> MessageTemplate {
    MessageBuilder::new(format!("Meeting {meeting_name} finished"))
        .section("meeting.finished.v1", |section| {
            section.mrkdwn(format!(
                ":white_check_mark: All required attendees have responded to *{meeting_name}*. This meeting is finished."
            ));
        })
        .build()
}

pub const CREATE_MEETING_CALLBACK_ID: &str = "create-meeting";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputElement {
    PlainTextInput { action_id: String, multiline: bool },
    MultiUsersSelect { action_id: String },
    Datetimepicker { action_id: String },
    NumberInput { action_id: String, is_decimal_allowed: bool, initial_value: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InputBlock {
    pub block_id: String,
    pub label: TextObject,
    pub optional: bool,
    pub element: InputElement,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModalView {
    pub callback_id: String,
    pub title: TextObject,
    pub submit: TextObject,
    pub close: TextObject,
    pub private_metadata: String,
    pub blocks: Vec<InputBlock>,
}

/// The "New Async Meeting" creation modal. `private_metadata` carries the
/// source channel so the submission handler knows where to announce.
pub fn create_meeting_modal(private_metadata: &str, default_reminder_hours: u32) -> ModalView {
    let input = |block_id: &str, label: &str, optional: bool, element: InputElement| InputBlock {
        block_id: block_id.to_owned(),
        label: TextObject::plain(label),
        optional,
        element,
    };

    ModalView {
        callback_id: CREATE_MEETING_CALLBACK_ID.to_owned(),
        title: TextObject::plain("New Async Meeting"),
        submit: TextObject::plain("Submit"),
        close: TextObject::plain("Cancel"),
        private_metadata: private_metadata.to_owned(),
        blocks: vec![
            input(
                "input_name",
                "Name",
                false,
                InputElement::PlainTextInput { action_id: "name".to_owned(), multiline: false },
            ),
            input(
                "input_required",
                "Required",
                false,
                InputElement::MultiUsersSelect { action_id: "required".to_owned() },
            ),
            input(
                "input_optional",
                "Optional",
                true,
                InputElement::MultiUsersSelect { action_id: "optional".to_owned() },
            ),
            input(
                "input_agenda",
                "Agenda",
                false,
                InputElement::PlainTextInput { action_id: "agenda".to_owned(), multiline: true },
            ),
            input(
                "input_end",
                "Meeting End",
                false,
                InputElement::Datetimepicker { action_id: "end".to_owned() },
            ),
            input(
                "input_reminder",
                "Reminder Frequency (Hours)",
                false,
                InputElement::NumberInput {
                    action_id: "reminder".to_owned(),
                    is_decimal_allowed: false,
                    initial_value: default_reminder_hours.to_string(),
                },
            ),
        ],
    }
}
