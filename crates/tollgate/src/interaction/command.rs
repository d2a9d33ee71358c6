//! Registration metadata for application commands

use serenity::{
    builder::{CreateCommand, CreateCommandOption},
    model::{
        application::{CommandOptionType, CommandType},
        id::GuildId,
        Permissions,
    },
};

/// The type of a command option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    /// A nested subcommand
    SubCommand,
    /// A group of nested subcommands
    SubCommandGroup,
    /// A string
    String,
    /// An integer
    Integer,
    /// A boolean
    Boolean,
    /// A user mention
    User,
    /// A channel mention
    Channel,
    /// A role mention
    Role,
    /// A user or role mention
    Mentionable,
    /// A real number
    Number,
    /// An uploaded file
    Attachment,
}

impl From<OptionKind> for CommandOptionType {
    fn from(value: OptionKind) -> Self {
        match value {
            OptionKind::SubCommand => Self::SubCommand,
            OptionKind::SubCommandGroup => Self::SubCommandGroup,
            OptionKind::String => Self::String,
            OptionKind::Integer => Self::Integer,
            OptionKind::Boolean => Self::Boolean,
            OptionKind::User => Self::User,
            OptionKind::Channel => Self::Channel,
            OptionKind::Role => Self::Role,
            OptionKind::Mentionable => Self::Mentionable,
            OptionKind::Number => Self::Number,
            OptionKind::Attachment => Self::Attachment,
        }
    }
}

/// A fixed choice offered for a string option
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Choice {
    /// The user-facing name of this choice
    pub name: String,
    /// The value sent when this choice is picked
    pub value: String,
}

impl Choice {
    /// Construct a new choice
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Metadata for a command option or subcommand
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandOption {
    kind: OptionKind,
    name: String,
    description: String,
    required: bool,
    autocomplete: bool,
    choices: Vec<Choice>,
    options: Vec<CommandOption>,
}

impl CommandOption {
    /// Construct a new optional parameter or subcommand
    #[must_use]
    pub fn new(kind: OptionKind, name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: desc.into(),
            required: false,
            autocomplete: false,
            choices: vec![],
            options: vec![],
        }
    }

    /// Set whether this parameter must be supplied
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Set whether this parameter sends autocomplete requests
    #[must_use]
    pub fn autocomplete(mut self, autocomplete: bool) -> Self {
        self.autocomplete = autocomplete;
        self
    }

    /// Add a fixed choice for this parameter
    #[must_use]
    pub fn choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    /// Add a nested option, for subcommands and subcommand groups
    #[must_use]
    pub fn option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    /// The name of this option
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str { &self.name }
}

impl From<&CommandOption> for CreateCommandOption {
    fn from(value: &CommandOption) -> Self {
        let CommandOption {
            kind,
            name,
            description,
            required,
            autocomplete,
            choices,
            options,
        } = value;

        let opt = Self::new((*kind).into(), name, description)
            .required(*required)
            .set_autocomplete(*autocomplete);
        let opt = choices
            .iter()
            .fold(opt, |o, c| o.add_string_choice(&c.name, &c.value));
        options
            .iter()
            .fold(opt, |o, s| o.add_sub_option(s.into()))
    }
}

/// Metadata for an application command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    name: String,
    description: Option<String>,
    kind: CommandType,
    options: Vec<CommandOption>,
    guild_ids: Vec<GuildId>,
    dm_permission: bool,
    default_permission: bool,
    nsfw: bool,
}

impl CommandInfo {
    fn with_kind(name: impl Into<String>, description: Option<String>, kind: CommandType) -> Self {
        Self {
            name: name.into(),
            description,
            kind,
            options: vec![],
            guild_ids: vec![],
            dm_permission: true,
            default_permission: true,
            nsfw: false,
        }
    }

    /// Construct a new description of a chat input command
    #[inline]
    #[must_use]
    pub fn slash(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self::with_kind(name, Some(desc.into()), CommandType::ChatInput)
    }

    /// Construct a new description of a user context menu command
    #[inline]
    #[must_use]
    pub fn user(name: impl Into<String>) -> Self {
        Self::with_kind(name, None, CommandType::User)
    }

    /// Construct a new description of a message context menu command
    #[inline]
    #[must_use]
    pub fn message(name: impl Into<String>) -> Self {
        Self::with_kind(name, None, CommandType::Message)
    }

    /// Add a parameter or subcommand
    #[must_use]
    pub fn option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    /// Restrict this command to a guild instead of registering it globally
    ///
    /// May be called more than once to register the command in several
    /// guilds.
    #[must_use]
    pub fn guild(mut self, id: GuildId) -> Self {
        self.guild_ids.push(id);
        self
    }

    /// Set whether this command should be usable in DM (i.e. non-guild)
    /// channels
    #[must_use]
    pub fn dm_permission(mut self, dm_permission: bool) -> Self {
        self.dm_permission = dm_permission;
        self
    }

    /// Set whether this command is usable by everyone by default, rather than
    /// only by administrators
    #[must_use]
    pub fn default_permission(mut self, default_permission: bool) -> Self {
        self.default_permission = default_permission;
        self
    }

    /// Set whether this command is age-restricted
    #[must_use]
    pub fn nsfw(mut self, nsfw: bool) -> Self {
        self.nsfw = nsfw;
        self
    }

    /// Get the unique, non-localized name of this command
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// The guilds this command is restricted to, if any
    #[inline]
    #[must_use]
    pub fn guild_ids(&self) -> &[GuildId] { &self.guild_ids }

    /// Whether this command is registered per guild rather than globally
    #[inline]
    #[must_use]
    pub fn is_guild_restricted(&self) -> bool { !self.guild_ids.is_empty() }
}

impl From<&CommandInfo> for CreateCommand {
    fn from(value: &CommandInfo) -> Self {
        let CommandInfo {
            name,
            description,
            kind,
            options,
            guild_ids: _,
            dm_permission,
            default_permission,
            nsfw,
        } = value;

        let mut cmd = Self::new(name)
            .kind(*kind)
            .dm_permission(*dm_permission)
            .nsfw(*nsfw)
            .set_options(options.iter().map(Into::into).collect());

        if let Some(desc) = description {
            cmd = cmd.description(desc);
        }

        if !default_permission {
            cmd = cmd.default_member_permissions(Permissions::empty());
        }

        cmd
    }
}

#[cfg(test)]
mod tests {
    use serenity::{builder::CreateCommand, model::id::GuildId};

    use super::{Choice, CommandInfo, CommandOption, OptionKind};

    fn body(info: &CommandInfo) -> serde_json::Value {
        serde_json::to_value(CreateCommand::from(info)).unwrap()
    }

    #[test]
    fn slash_command() {
        let info = CommandInfo::slash("ice-cream", "Order dessert")
            .option(
                CommandOption::new(OptionKind::String, "flavour", "Which flavour")
                    .required(true)
                    .choice(Choice::new("Vanilla", "vanilla"))
                    .choice(Choice::new("Chocolate", "choc")),
            )
            .option(CommandOption::new(OptionKind::Integer, "scoops", "How many").autocomplete(true));
        let body = body(&info);

        assert_eq!(body["name"], "ice-cream");
        assert_eq!(body["description"], "Order dessert");
        assert_eq!(body["type"], 1);

        let opts = body["options"].as_array().unwrap();
        assert_eq!(opts.len(), 2);
        assert_eq!(opts[0]["name"], "flavour");
        assert_eq!(opts[0]["type"], 3);
        assert_eq!(opts[0]["required"], true);
        assert_eq!(opts[0]["choices"][1]["name"], "Chocolate");
        assert_eq!(opts[0]["choices"][1]["value"], "choc");
        assert_eq!(opts[1]["type"], 4);
        assert_eq!(opts[1]["autocomplete"], true);
    }

    #[test]
    fn subcommands() {
        let info = CommandInfo::slash("dice", "Roll dice").option(
            CommandOption::new(OptionKind::SubCommand, "roll", "Roll once").option(
                CommandOption::new(OptionKind::Integer, "sides", "Number of sides").required(true),
            ),
        );
        let body = body(&info);

        assert_eq!(body["options"][0]["type"], 1);
        assert_eq!(body["options"][0]["options"][0]["name"], "sides");
    }

    #[test]
    fn context_menu_and_permissions() {
        let info = CommandInfo::user("High five")
            .dm_permission(false)
            .default_permission(false)
            .nsfw(true);
        let body = body(&info);

        assert_eq!(body["type"], 2);
        assert_eq!(body["dm_permission"], false);
        assert_eq!(body["default_member_permissions"], "0");
        assert_eq!(body["nsfw"], true);
        assert!(!info.is_guild_restricted());
    }

    #[test]
    fn guild_restriction() {
        let info = CommandInfo::slash("local", "Guild only")
            .guild(GuildId::new(1))
            .guild(GuildId::new(2));

        assert!(info.is_guild_restricted());
        assert_eq!(info.guild_ids(), [GuildId::new(1), GuildId::new(2)]);
    }
}
