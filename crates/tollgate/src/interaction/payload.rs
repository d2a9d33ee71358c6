//! Typed representation of an inbound interaction webhook payload

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use serenity::model::{
    application::{CommandType, ComponentType},
    id::{ApplicationId, ChannelId, CommandId, GuildId, InteractionId, RoleId, TargetId, UserId},
};

use super::option::CommandArg;
use crate::util::Redacted;

/// An error arising from a payload that does not follow the interaction
/// webhook protocol
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The body was not JSON, or its fields had the wrong shape
    #[error("malformed interaction payload: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The `type` tag lies outside the range of known interaction types
    #[error("unknown interaction type {0}")]
    UnknownType(u64),
    /// The interaction type requires a `data` object but none was sent
    #[error("interaction of type {0} is missing its data")]
    MissingData(u8),
}

/// The `type` tag of an interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InteractionType {
    /// Endpoint health check sent by Discord
    Ping = 1,
    /// Slash, user or message command invocation
    Command = 2,
    /// Button click or menu selection
    Component = 3,
    /// Autocomplete request for a command option
    Autocomplete = 4,
    /// Modal form submission
    ModalSubmit = 5,
}

impl InteractionType {
    /// Look up a known interaction type by its numeric tag
    #[must_use]
    pub fn from_tag(tag: u64) -> Option<Self> {
        Some(match tag {
            1 => Self::Ping,
            2 => Self::Command,
            3 => Self::Component,
            4 => Self::Autocomplete,
            5 => Self::ModalSubmit,
            _ => return None,
        })
    }

    /// The numeric tag of this interaction type
    #[inline]
    #[must_use]
    pub fn tag(self) -> u8 { self as u8 }
}

/// Minimal user information attached to an interaction
#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    /// The user's ID
    pub id: Option<UserId>,
    /// The user's unique handle
    #[serde(default)]
    pub username: String,
    /// The user's display name, if set
    pub global_name: Option<String>,
    /// Whether the user is a bot account
    #[serde(default)]
    pub bot: bool,
}

impl User {
    /// The name shown for this user in clients
    #[must_use]
    pub fn display_name(&self) -> &str { self.global_name.as_deref().unwrap_or(&self.username) }
}

/// Minimal guild member information attached to an interaction invoked
/// inside a guild
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Member {
    /// The member's user account
    pub user: Option<User>,
    /// The member's guild nickname
    pub nick: Option<String>,
    /// The member's roles
    #[serde(default)]
    pub roles: Vec<RoleId>,
    /// The member's permission bitset in the invoking channel
    pub permissions: Option<String>,
}

/// Fields common to every interaction type
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    /// The interaction's ID
    pub id: Option<InteractionId>,
    /// The ID of the application the interaction was sent to
    pub application_id: Option<ApplicationId>,
    /// Continuation token for follow-up messages
    pub token: Option<Redacted<String>>,
    /// Payload version, always 1 at time of writing
    pub version: Option<u8>,
    /// The guild the interaction was invoked from
    pub guild_id: Option<GuildId>,
    /// The channel the interaction was invoked from
    pub channel_id: Option<ChannelId>,
    /// The invoking guild member, for guild interactions
    pub member: Option<Member>,
    /// The invoking user, for DM interactions
    pub user: Option<User>,
    /// The invoking user's selected language
    pub locale: Option<String>,
    /// The guild's preferred language
    pub guild_locale: Option<String>,
    /// The bot's permission bitset in the invoking channel
    pub app_permissions: Option<String>,
    /// The message a component is attached to
    pub message: Option<Value>,
}

/// A single interaction webhook event
#[derive(Debug, Clone)]
pub struct Interaction {
    /// The interaction type tag
    pub kind: InteractionType,
    /// The type-specific payload
    pub data: InteractionData,
    /// Fields common to all interaction types
    pub envelope: Envelope,
}

#[derive(Deserialize)]
struct RawInteraction {
    #[serde(rename = "type")]
    kind: u64,
    data: Option<Value>,
    #[serde(flatten)]
    envelope: Envelope,
}

impl Interaction {
    /// Parse an interaction from a (previously authenticated) request body
    ///
    /// # Errors
    /// This function returns an error if the body is not a JSON object with a
    /// numeric `type`, if the type is outside the known range, or if the
    /// `data` object does not match the shape implied by the type.
    pub fn parse(body: &[u8]) -> Result<Self, ProtocolError> {
        let RawInteraction {
            kind,
            data,
            envelope,
        } = serde_json::from_slice(body)?;
        let kind = InteractionType::from_tag(kind).ok_or(ProtocolError::UnknownType(kind))?;
        let data = InteractionData::parse(kind, data)?;

        Ok(Self {
            kind,
            data,
            envelope,
        })
    }

    /// The user who invoked this interaction, whether in a guild or a DM
    #[must_use]
    pub fn invoker(&self) -> Option<&User> {
        self.envelope
            .member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.envelope.user.as_ref())
    }

    /// The guild this interaction was invoked from, if any
    #[inline]
    #[must_use]
    pub fn guild_id(&self) -> Option<GuildId> { self.envelope.guild_id }

    /// The channel this interaction was invoked from, if known
    #[inline]
    #[must_use]
    pub fn channel_id(&self) -> Option<ChannelId> { self.envelope.channel_id }

    /// The command data, for command and autocomplete interactions
    #[must_use]
    pub fn command(&self) -> Option<&CommandData> {
        match self.data {
            InteractionData::Command(ref c) | InteractionData::Autocomplete(ref c) => Some(c),
            _ => None,
        }
    }

    /// The component data, for component interactions
    #[must_use]
    pub fn component(&self) -> Option<&ComponentData> {
        match self.data {
            InteractionData::Component(ref c) => Some(c),
            _ => None,
        }
    }
}

/// The type-specific payload of an interaction
#[derive(Debug, Clone)]
pub enum InteractionData {
    /// A ping carries no data
    Ping,
    /// An invoked command
    Command(CommandData),
    /// A clicked button or submitted menu
    Component(ComponentData),
    /// A partially-typed command awaiting suggestions
    Autocomplete(CommandData),
    /// A submitted modal form
    Modal(ModalData),
}

impl InteractionData {
    fn parse(kind: InteractionType, data: Option<Value>) -> Result<Self, ProtocolError> {
        fn required<T: DeserializeOwned>(
            kind: InteractionType,
            data: Option<Value>,
        ) -> Result<T, ProtocolError> {
            let data = data.ok_or(ProtocolError::MissingData(kind.tag()))?;
            Ok(serde_json::from_value(data)?)
        }

        Ok(match kind {
            InteractionType::Ping => Self::Ping,
            InteractionType::Command => Self::Command(required(kind, data)?),
            InteractionType::Component => Self::Component(required(kind, data)?),
            InteractionType::Autocomplete => Self::Autocomplete(required(kind, data)?),
            InteractionType::ModalSubmit => Self::Modal(
                data.map(serde_json::from_value)
                    .transpose()?
                    .unwrap_or_default(),
            ),
        })
    }
}

/// The data of a command or autocomplete interaction
#[derive(Debug, Clone, Deserialize)]
pub struct CommandData {
    /// The registered command's ID
    pub id: Option<CommandId>,
    /// The command's name
    pub name: String,
    /// Whether this is a slash, user or message command
    #[serde(rename = "type")]
    pub kind: Option<CommandType>,
    /// The supplied options, in the order Discord sent them
    #[serde(default)]
    pub options: Vec<CommandArg>,
    /// The guild the command is registered to, for guild commands
    pub guild_id: Option<GuildId>,
    /// The targeted user or message, for context menu commands
    pub target_id: Option<TargetId>,
    /// Users, roles, channels and attachments referenced by the options
    pub resolved: Option<Value>,
}

fn button() -> ComponentType { ComponentType::Button }

/// The data of a component interaction
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentData {
    /// The custom ID of the clicked or submitted component
    pub custom_id: String,
    /// The kind of component
    #[serde(default = "button")]
    pub component_type: ComponentType,
    /// The selected values, for select menus
    #[serde(default)]
    pub values: Vec<String>,
}

impl ComponentData {
    /// Whether this component belongs to the select menu family
    #[must_use]
    pub fn is_menu(&self) -> bool {
        matches!(
            self.component_type,
            ComponentType::StringSelect
                | ComponentType::UserSelect
                | ComponentType::RoleSelect
                | ComponentType::MentionableSelect
                | ComponentType::ChannelSelect
        )
    }
}

/// The data of a modal submit interaction
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModalData {
    /// The custom ID of the modal
    #[serde(default)]
    pub custom_id: String,
    /// The submitted rows of text inputs
    #[serde(default)]
    pub components: Vec<Value>,
}
