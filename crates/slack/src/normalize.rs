//! Maps the two acknowledgment-bearing Slack event shapes onto the one
//! canonical [`Acknowledgment`] the processor consumes. Everything after
//! this point is source-agnostic.

use samm_core::{AckSource, Acknowledgment, ChannelId, MessageTs, UserId};

use crate::events::{MessageEvent, ReactionAddedEvent};

pub fn normalize_reaction_token(reaction: &str) -> String {
    reaction.trim().trim_matches(':').to_ascii_lowercase()
}

fn matches_ack_reaction(reaction: &str, configured: &str) -> bool {
    let token = normalize_reaction_token(reaction);
    let configured = normalize_reaction_token(configured);
    token == configured || (configured == "white_check_mark" && token == "✅")
}

/// A reaction acknowledges the message it was placed on, so the reacted
/// message's `ts` is the meeting identity. Reactions with any other emoji
/// are not acknowledgments.
pub fn reaction_ack(event: &ReactionAddedEvent, ack_reaction: &str) -> Option<Acknowledgment> {
    if !matches_ack_reaction(&event.reaction, ack_reaction) {
        return None;
    }

    Some(Acknowledgment {
        channel: ChannelId(event.channel_id.clone()),
        ts: MessageTs(event.message_ts.clone()),
        participant: UserId(event.reactor_user_id.clone()),
        source: AckSource::Reaction,
    })
}

/// A thread reply acknowledges the thread's root message, so `thread_ts`
/// is the meeting identity. Top-level channel messages carry no
/// `thread_ts` and are never acknowledgments; neither are bot messages,
/// which would otherwise loop on our own completion notices.
pub fn thread_reply_ack(event: &MessageEvent) -> Option<Acknowledgment> {
    if event.bot_id.is_some() {
        return None;
    }
    let thread_ts = event.thread_ts.as_ref()?;

    Some(Acknowledgment {
        channel: ChannelId(event.channel_id.clone()),
        ts: MessageTs(thread_ts.clone()),
        participant: UserId(event.user_id.clone()),
        source: AckSource::ThreadReply,
    })
}
