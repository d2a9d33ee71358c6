//! Types for responding to interactions according to the Discord webhook
//! protocol in a type-safe manner

use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::Value;
use serenity::builder::{
    CreateAutocompleteResponse, CreateInteractionResponse, CreateInteractionResponseMessage,
};

use super::completion::Completion;

mod component;
mod embed;
mod message;

pub use component::*;
pub use embed::*;
pub use message::*;

/// An error arising from constructing an invalid reply or component
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A message reply had neither text content nor embeds
    #[error("a reply needs text content or at least one embed")]
    EmptyReply,
    /// An action row was given too many buttons
    #[error("action rows hold at most {max} buttons, got {got}")]
    RowFull {
        /// The row capacity
        max: usize,
        /// The number of components given
        got: usize,
    },
    /// A component was added to a row already filled by a select menu
    #[error("select menus take up a whole action row")]
    MenuRow,
    /// A custom ID was empty or too long
    #[error("custom IDs must be 1 to 100 characters long, got {0}")]
    CustomIdLength(usize),
    /// A string select menu was given no options
    #[error("select menus need at least one option")]
    EmptyMenu,
    /// A string select menu was given too many options
    #[error("select menus hold at most {max} options, got {got}")]
    TooManyOptions {
        /// The option capacity
        max: usize,
        /// The number of options given
        got: usize,
    },
}

/// A complete response to an interaction, serialized as the webhook response
/// body
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Acknowledge a ping, serialized as exactly `{"type":1}`
    Pong,
    /// Post a new message
    Message(MessageData),
    /// Acknowledge now and post a message later
    DeferredMessage {
        /// Whether the eventual message is only visible to the invoking user
        ephemeral: bool,
    },
    /// Acknowledge a component interaction and edit its message later
    DeferredUpdate,
    /// Edit the message a component is attached to
    UpdateMessage(MessageData),
    /// Offer autocomplete suggestions
    Autocomplete(Vec<Completion>),
    /// A hand-built response body, returned verbatim
    Json(Value),
}

impl Response {
    /// Acknowledge a ping
    #[inline]
    #[must_use]
    pub fn pong() -> Self { Self::Pong }

    /// A bare text message only visible to the invoking user
    #[must_use]
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self::Message(MessageData::ephemeral(content))
    }

    /// Acknowledge an interaction, showing a loading state until a follow-up
    /// message is sent
    #[inline]
    #[must_use]
    pub fn defer(ephemeral: bool) -> Self { Self::DeferredMessage { ephemeral } }

    /// Acknowledge a component interaction without changing its message yet
    #[inline]
    #[must_use]
    pub fn defer_update() -> Self { Self::DeferredUpdate }

    /// Edit the message a component is attached to
    #[inline]
    #[must_use]
    pub fn update(reply: Reply) -> Self { reply.build_update() }

    /// Offer autocomplete suggestions
    #[inline]
    #[must_use]
    pub fn autocomplete(choices: Vec<Completion>) -> Self { Self::Autocomplete(choices) }

    /// The numeric response type tag, if known
    #[must_use]
    pub fn kind(&self) -> Option<u64> {
        Some(match self {
            Self::Pong => 1,
            Self::Message(_) => 4,
            Self::DeferredMessage { .. } => 5,
            Self::DeferredUpdate => 6,
            Self::UpdateMessage(_) => 7,
            Self::Autocomplete(_) => 8,
            Self::Json(v) => return v.get("type").and_then(Value::as_u64),
        })
    }
}

impl From<Value> for Response {
    fn from(value: Value) -> Self { Self::Json(value) }
}

impl Response {
    /// Lower this response into a serenity builder
    ///
    /// Returns `None` for a hand-built [`Json`](Self::Json) body.
    #[must_use]
    pub fn to_builder(&self) -> Option<CreateInteractionResponse> {
        Some(match self {
            Self::Pong => CreateInteractionResponse::Pong,
            Self::Message(data) => CreateInteractionResponse::Message(data.clone().into()),
            Self::DeferredMessage { ephemeral } => {
                let msg = CreateInteractionResponseMessage::new();
                CreateInteractionResponse::Defer(if *ephemeral { msg.ephemeral(true) } else { msg })
            },
            Self::DeferredUpdate => CreateInteractionResponse::Acknowledge,
            Self::UpdateMessage(data) => {
                CreateInteractionResponse::UpdateMessage(data.clone().into())
            },
            Self::Autocomplete(choices) => CreateInteractionResponse::Autocomplete(
                CreateAutocompleteResponse::new()
                    .set_choices(choices.iter().cloned().map(Completion::into_choice).collect()),
            ),
            Self::Json(_) => return None,
        })
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        match self {
            // Pings are answered with exactly {"type":1}
            Self::Pong => {
                let mut map = ser.serialize_map(Some(1))?;
                map.serialize_entry("type", &1_u8)?;
                map.end()
            },
            Self::Json(v) => v.serialize(ser),
            _ => self.to_builder().serialize(ser),
        }
    }
}
