//! Slack Integration - Socket Mode bot interface
//!
//! This crate is the gateway-facing layer of samm:
//! - **Socket Mode** (`socket`) - connection loop with reconnect policy
//! - **Events** (`events`) - `/samm` command, modal submissions, thread
//!   replies, emoji reactions, routed through one dispatcher
//! - **Normalizer** (`normalize`) - maps the two acknowledgment-bearing
//!   event shapes into one canonical `Acknowledgment`
//! - **Block Kit** (`blocks`) - announcement/notice messages and the
//!   meeting creation modal
//! - **Gateway** (`gateway`) - the outbound post-message / open-view
//!   capability behind a trait
//!
//! # Architecture
//!
//! ```text
//! Slack Events → EventDispatcher → Handlers → AckProcessor / MeetingFactory
//!                                     ↓
//!                               SlackGateway (post message, open modal)
//! ```

pub mod blocks;
pub mod events;
pub mod gateway;
pub mod normalize;
pub mod socket;
