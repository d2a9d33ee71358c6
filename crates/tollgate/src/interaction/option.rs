//! Typed command option values supplied with command and autocomplete
//! interactions

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use serenity::model::{
    application::CommandOptionType,
    id::{AttachmentId, ChannelId, GenericId, RoleId, UserId},
};

/// An error converting a raw option into a typed [`CommandArg`]
#[derive(Debug, thiserror::Error)]
pub enum OptionError {
    /// The option type code was not recognized
    #[error("unknown type {1} for option {0:?}")]
    UnknownKind(String, u8),
    /// A value-bearing option had no value
    #[error("missing value for option {0:?}")]
    MissingValue(String),
    /// The value did not match the declared option type
    #[error("invalid value for option {0:?}: {1}")]
    BadValue(String, serde_json::Error),
}

#[derive(Deserialize)]
struct RawOption {
    name: String,
    #[serde(rename = "type")]
    kind: u8,
    value: Option<Value>,
    #[serde(default)]
    options: Vec<CommandArg>,
    #[serde(default)]
    focused: bool,
}

/// The typed value of a command option
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// A subcommand with its own options
    SubCommand(Vec<CommandArg>),
    /// A group of subcommands, holding the invoked one
    SubCommandGroup(Vec<CommandArg>),
    /// A string
    String(String),
    /// An integer
    Integer(i64),
    /// A boolean
    Boolean(bool),
    /// A user mention
    User(UserId),
    /// A channel mention
    Channel(ChannelId),
    /// A role mention
    Role(RoleId),
    /// A user or role mention
    Mentionable(GenericId),
    /// A real number
    Number(f64),
    /// An uploaded attachment
    Attachment(AttachmentId),
    /// The partial text of the option currently being autocompleted
    Focused(String),
}

/// A single named option supplied with a command
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawOption")]
pub struct CommandArg {
    /// The option's name
    pub name: String,
    /// The option's declared type
    pub kind: CommandOptionType,
    /// The option's value
    pub value: OptionValue,
    /// Whether the user is currently typing into this option
    pub focused: bool,
}

impl TryFrom<RawOption> for CommandArg {
    type Error = OptionError;

    fn try_from(raw: RawOption) -> Result<Self, OptionError> {
        let RawOption {
            name,
            kind,
            value,
            options,
            focused,
        } = raw;

        let value = if focused && !matches!(kind, 1 | 2) {
            let text = match value {
                Some(Value::String(s)) => s,
                Some(v) => v.to_string(),
                None => String::new(),
            };
            OptionValue::Focused(text)
        } else {
            match kind {
                1 => OptionValue::SubCommand(options),
                2 => OptionValue::SubCommandGroup(options),
                3 => OptionValue::String(parse_value(&name, value)?),
                4 => OptionValue::Integer(parse_value(&name, value)?),
                5 => OptionValue::Boolean(parse_value(&name, value)?),
                6 => OptionValue::User(parse_value(&name, value)?),
                7 => OptionValue::Channel(parse_value(&name, value)?),
                8 => OptionValue::Role(parse_value(&name, value)?),
                9 => OptionValue::Mentionable(parse_value(&name, value)?),
                10 => OptionValue::Number(parse_value(&name, value)?),
                11 => OptionValue::Attachment(parse_value(&name, value)?),
                k => return Err(OptionError::UnknownKind(name, k)),
            }
        };

        Ok(Self {
            name,
            kind: CommandOptionType::from(kind),
            value,
            focused,
        })
    }
}

fn parse_value<T: DeserializeOwned>(name: &str, value: Option<Value>) -> Result<T, OptionError> {
    let value = value.ok_or_else(|| OptionError::MissingValue(name.into()))?;
    serde_json::from_value(value).map_err(|e| OptionError::BadValue(name.into(), e))
}

/// The options supplied with a command, in the order Discord sent them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(Vec<CommandArg>);

impl From<Vec<CommandArg>> for Args {
    fn from(args: Vec<CommandArg>) -> Self { Self(args) }
}

impl<'a> IntoIterator for &'a Args {
    type IntoIter = std::slice::Iter<'a, CommandArg>;
    type Item = &'a CommandArg;

    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

impl Args {
    /// Iterate over the top-level options
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, CommandArg> { self.0.iter() }

    /// Iterate over the top-level option values positionally
    pub fn values(&self) -> impl Iterator<Item = &OptionValue> { self.0.iter().map(|a| &a.value) }

    /// The number of top-level options
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize { self.0.len() }

    /// Whether no options were supplied
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Look up a top-level option by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.0.iter().find(|a| a.name == name).map(|a| &a.value)
    }

    /// Look up a string option by name
    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            OptionValue::String(s) | OptionValue::Focused(s) => Some(s),
            _ => None,
        }
    }

    /// Look up an integer option by name
    #[must_use]
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            OptionValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Look up a boolean option by name
    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            OptionValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Look up a real number option by name
    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            OptionValue::Number(f) => Some(*f),
            _ => None,
        }
    }

    /// Look up a user option by name
    #[must_use]
    pub fn user(&self, name: &str) -> Option<UserId> {
        match self.get(name)? {
            OptionValue::User(u) => Some(*u),
            _ => None,
        }
    }

    /// The invoked subcommand (or subcommand group) and its options, if any
    #[must_use]
    pub fn subcommand(&self) -> Option<(&str, Args)> {
        self.0.iter().find_map(|a| match a.value {
            OptionValue::SubCommand(ref o) | OptionValue::SubCommandGroup(ref o) => {
                Some((a.name.as_str(), Args(o.clone())))
            },
            _ => None,
        })
    }

    /// The option currently being autocompleted, searching nested
    /// subcommands
    #[must_use]
    pub fn focused(&self) -> Option<&CommandArg> {
        let mut stk = vec![self.0.iter()];

        while let Some(it) = stk.last_mut() {
            let Some(next) = it.next() else {
                stk.pop();
                continue;
            };

            match next.value {
                OptionValue::SubCommand(ref o) | OptionValue::SubCommandGroup(ref o) => {
                    stk.push(o.iter());
                },
                _ if next.focused => return Some(next),
                _ => (),
            }
        }

        None
    }
}
