use serenity::{
    builder::{
        CreateActionRow, CreateButton, CreateSelectMenu, CreateSelectMenuKind,
        CreateSelectMenuOption,
    },
    model::{
        application::ButtonStyle,
        channel::{ChannelType, ReactionType},
    },
};
use url::Url;

use super::ValidationError;
use crate::util::{non_empty, BuilderHelpers};

/// The maximum number of buttons in a single action row
pub const MAX_ROW_LEN: usize = 5;
/// The maximum number of options in a string select menu
pub const MAX_MENU_OPTIONS: usize = 25;
/// The maximum length of a component custom ID, in characters
pub const MAX_CUSTOM_ID_LEN: usize = 100;

fn custom_id(id: impl Into<String>) -> Result<String, ValidationError> {
    let id = id.into();
    let len = id.chars().count();

    if (1..=MAX_CUSTOM_ID_LEN).contains(&len) {
        Ok(id)
    } else {
        Err(ValidationError::CustomIdLength(len))
    }
}

/// A single row of message components
///
/// A row holds either up to [`MAX_ROW_LEN`] buttons or one select menu, which
/// always takes up the full width of the row.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionRow {
    /// A row of buttons
    Buttons(Vec<Button>),
    /// A single menu occupying a full row
    Menu(SelectMenu),
}

impl ActionRow {
    /// Construct a row holding the given buttons
    ///
    /// # Errors
    /// This function returns an error if more than [`MAX_ROW_LEN`] buttons
    /// are given.
    pub fn new(buttons: impl IntoIterator<Item = Button>) -> Result<Self, ValidationError> {
        let buttons: Vec<_> = buttons.into_iter().collect();

        if buttons.len() > MAX_ROW_LEN {
            return Err(ValidationError::RowFull {
                max: MAX_ROW_LEN,
                got: buttons.len(),
            });
        }

        Ok(Self::Buttons(buttons))
    }

    /// Construct a row holding a single select menu
    #[inline]
    #[must_use]
    pub fn menu(menu: SelectMenu) -> Self { Self::Menu(menu) }

    /// Append a button to this row
    ///
    /// # Errors
    /// This method returns an error if the row is already full or holds a
    /// select menu.
    pub fn push(&mut self, button: Button) -> Result<(), ValidationError> {
        match self {
            Self::Buttons(b) if b.len() >= MAX_ROW_LEN => Err(ValidationError::RowFull {
                max: MAX_ROW_LEN,
                got: b.len() + 1,
            }),
            Self::Buttons(b) => {
                b.push(button);
                Ok(())
            },
            Self::Menu(_) => Err(ValidationError::MenuRow),
        }
    }

    /// The number of components in this row
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Buttons(b) => b.len(),
            Self::Menu(_) => 1,
        }
    }

    /// Whether this row holds no components
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl From<ActionRow> for CreateActionRow {
    fn from(value: ActionRow) -> Self {
        match value {
            ActionRow::Buttons(b) => Self::Buttons(b.into_iter().map(Into::into).collect()),
            ActionRow::Menu(m) => Self::SelectMenu(m.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ButtonTarget {
    Custom(String, ButtonStyle),
    Link(Url),
}

/// A clickable button
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    target: ButtonTarget,
    label: Option<String>,
    emoji: Option<ReactionType>,
    disabled: bool,
}

impl Button {
    /// Construct a primary-style button which sends an interaction with the
    /// given custom ID when clicked
    ///
    /// # Errors
    /// This function returns an error if the custom ID is empty or longer than
    /// [`MAX_CUSTOM_ID_LEN`] characters.
    pub fn new(
        custom_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            target: ButtonTarget::Custom(self::custom_id(custom_id)?, ButtonStyle::Primary),
            label: Some(label.into()),
            emoji: None,
            disabled: false,
        })
    }

    /// Construct a button which opens the given URL when clicked
    #[must_use]
    pub fn link(url: Url, label: impl Into<String>) -> Self {
        Self {
            target: ButtonTarget::Link(url),
            label: Some(label.into()),
            emoji: None,
            disabled: false,
        }
    }

    /// Set the style of this button
    ///
    /// Link buttons have a fixed style, so this has no effect on them.
    #[must_use]
    pub fn style(mut self, style: ButtonStyle) -> Self {
        if let ButtonTarget::Custom(_, ref mut s) = self.target {
            *s = style;
        }
        self
    }

    /// Set the emoji shown beside the label
    #[must_use]
    pub fn emoji(mut self, emoji: impl Into<ReactionType>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    /// Set whether this button is greyed out
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// The custom ID of this button, if it is not a link button
    #[must_use]
    pub fn custom_id(&self) -> Option<&str> {
        match self.target {
            ButtonTarget::Custom(ref id, _) => Some(id),
            ButtonTarget::Link(_) => None,
        }
    }
}

impl From<Button> for CreateButton {
    fn from(value: Button) -> Self {
        let Button {
            target,
            label,
            emoji,
            disabled,
        } = value;

        match target {
            ButtonTarget::Custom(id, style) => Self::new(id).style(style),
            ButtonTarget::Link(url) => Self::new_link(url),
        }
        .fold_opt(label, Self::label)
        .fold_opt(emoji, Self::emoji)
        .disabled(disabled)
    }
}

/// A single choice in a string select menu
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    label: String,
    value: String,
    description: Option<String>,
    emoji: Option<ReactionType>,
    default: bool,
}

impl SelectOption {
    /// Construct an option with the given user-facing label and the value
    /// reported back when it is selected
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            description: None,
            emoji: None,
            default: false,
        }
    }

    /// Set the additional description shown under the label
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the emoji shown beside the label
    #[must_use]
    pub fn emoji(mut self, emoji: impl Into<ReactionType>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    /// Set whether this option is selected by default
    #[must_use]
    pub fn default(mut self, default: bool) -> Self {
        self.default = default;
        self
    }
}

impl From<SelectOption> for CreateSelectMenuOption {
    fn from(value: SelectOption) -> Self {
        let SelectOption {
            label,
            value,
            description,
            emoji,
            default,
        } = value;

        Self::new(label, value)
            .fold_opt(description, Self::description)
            .fold_opt(emoji, Self::emoji)
            .fold_opt(default.then_some(true), Self::default_selection)
    }
}

/// The kind of values a select menu offers
#[derive(Debug, Clone, PartialEq)]
pub enum MenuKind {
    /// A fixed list of strings
    String(Vec<SelectOption>),
    /// Guild members
    User,
    /// Guild roles
    Role,
    /// Guild members and roles
    Mentionable,
    /// Guild channels, optionally limited to the given types
    Channel(Vec<ChannelType>),
}

impl From<MenuKind> for CreateSelectMenuKind {
    fn from(value: MenuKind) -> Self {
        match value {
            MenuKind::String(options) => Self::String {
                options: options.into_iter().map(Into::into).collect(),
            },
            MenuKind::User => Self::User {
                default_users: None,
            },
            MenuKind::Role => Self::Role {
                default_roles: None,
            },
            MenuKind::Mentionable => Self::Mentionable {
                default_users: None,
                default_roles: None,
            },
            MenuKind::Channel(types) => Self::Channel {
                channel_types: non_empty(types),
                default_channels: None,
            },
        }
    }
}

/// A dropdown select menu
#[derive(Debug, Clone, PartialEq)]
pub struct SelectMenu {
    custom_id: String,
    kind: MenuKind,
    placeholder: Option<String>,
    min_values: Option<u8>,
    max_values: Option<u8>,
    disabled: bool,
}

impl SelectMenu {
    fn with_kind(custom_id: impl Into<String>, kind: MenuKind) -> Result<Self, ValidationError> {
        Ok(Self {
            custom_id: self::custom_id(custom_id)?,
            kind,
            placeholder: None,
            min_values: None,
            max_values: None,
            disabled: false,
        })
    }

    /// Construct a menu offering a fixed list of strings
    ///
    /// # Errors
    /// This function returns an error if the custom ID is invalid, or if there
    /// are no options or more than [`MAX_MENU_OPTIONS`].
    pub fn string(
        custom_id: impl Into<String>,
        options: impl IntoIterator<Item = SelectOption>,
    ) -> Result<Self, ValidationError> {
        let options: Vec<_> = options.into_iter().collect();

        match options.len() {
            0 => return Err(ValidationError::EmptyMenu),
            n if n > MAX_MENU_OPTIONS => {
                return Err(ValidationError::TooManyOptions {
                    max: MAX_MENU_OPTIONS,
                    got: n,
                })
            },
            _ => (),
        }

        Self::with_kind(custom_id, MenuKind::String(options))
    }

    /// Construct a menu offering guild members
    ///
    /// # Errors
    /// This function returns an error if the custom ID is invalid.
    pub fn user(custom_id: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_kind(custom_id, MenuKind::User)
    }

    /// Construct a menu offering guild roles
    ///
    /// # Errors
    /// This function returns an error if the custom ID is invalid.
    pub fn role(custom_id: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_kind(custom_id, MenuKind::Role)
    }

    /// Construct a menu offering guild members and roles
    ///
    /// # Errors
    /// This function returns an error if the custom ID is invalid.
    pub fn mentionable(custom_id: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_kind(custom_id, MenuKind::Mentionable)
    }

    /// Construct a menu offering guild channels of the given types, or of any
    /// type if none are given
    ///
    /// # Errors
    /// This function returns an error if the custom ID is invalid.
    pub fn channel(
        custom_id: impl Into<String>,
        types: impl IntoIterator<Item = ChannelType>,
    ) -> Result<Self, ValidationError> {
        Self::with_kind(custom_id, MenuKind::Channel(types.into_iter().collect()))
    }

    /// Set the text shown when nothing is selected
    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set the minimum number of values that must be chosen
    #[must_use]
    pub fn min_values(mut self, min: u8) -> Self {
        self.min_values = Some(min);
        self
    }

    /// Set the maximum number of values that can be chosen
    #[must_use]
    pub fn max_values(mut self, max: u8) -> Self {
        self.max_values = Some(max);
        self
    }

    /// Set whether this menu is greyed out
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// The custom ID of this menu
    #[inline]
    #[must_use]
    pub fn custom_id(&self) -> &str { &self.custom_id }

    /// The kind of values this menu offers
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &MenuKind { &self.kind }
}

impl From<SelectMenu> for CreateSelectMenu {
    fn from(value: SelectMenu) -> Self {
        let SelectMenu {
            custom_id,
            kind,
            placeholder,
            min_values,
            max_values,
            disabled,
        } = value;

        Self::new(custom_id, kind.into())
            .fold_opt(placeholder, Self::placeholder)
            .fold_opt(min_values, Self::min_values)
            .fold_opt(max_values, Self::max_values)
            .fold_opt(disabled.then_some(true), Self::disabled)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use serenity::{
        builder::CreateActionRow,
        model::{application::ButtonStyle, channel::ChannelType},
    };
    use url::Url;

    use super::{ActionRow, Button, SelectMenu, SelectOption, MAX_ROW_LEN};
    use crate::interaction::response::ValidationError;

    fn buttons(n: usize) -> Vec<Button> {
        (0..n)
            .map(|i| Button::new(format!("b{i}"), format!("Button {i}")).unwrap())
            .collect()
    }

    fn lower(row: ActionRow) -> serde_json::Value {
        serde_json::to_value(CreateActionRow::from(row)).unwrap()
    }

    #[test]
    fn row_limit() {
        assert!(ActionRow::new(buttons(MAX_ROW_LEN)).is_ok());
        assert_eq!(
            ActionRow::new(buttons(MAX_ROW_LEN + 1)),
            Err(ValidationError::RowFull { max: 5, got: 6 })
        );
    }

    #[test]
    fn push_past_limit() {
        let mut row = ActionRow::new(buttons(4)).unwrap();
        row.push(Button::new("last", "Last").unwrap()).unwrap();

        assert_eq!(
            row.push(Button::new("extra", "Extra").unwrap()),
            Err(ValidationError::RowFull { max: 5, got: 6 })
        );
        assert_eq!(row.len(), 5);
    }

    #[test]
    fn menus_fill_their_row() {
        let mut row = ActionRow::menu(SelectMenu::user("who").unwrap());

        assert_eq!(
            row.push(Button::new("b", "B").unwrap()),
            Err(ValidationError::MenuRow)
        );
        assert_eq!(row.len(), 1);
    }

    #[test]
    fn custom_id_length() {
        assert_eq!(
            Button::new("", "Empty").unwrap_err(),
            ValidationError::CustomIdLength(0)
        );
        assert_eq!(
            SelectMenu::user("x".repeat(101)).unwrap_err(),
            ValidationError::CustomIdLength(101)
        );
        assert!(Button::new("é".repeat(100), "Wide").is_ok());
    }

    #[test]
    fn serialize_row() {
        let row = ActionRow::new([
            Button::new("wave", "Wave")
                .unwrap()
                .style(ButtonStyle::Success)
                .emoji('👋'),
            Button::link(Url::parse("https://example.com/").unwrap(), "Docs")
                .style(ButtonStyle::Danger)
                .disabled(true),
        ])
        .unwrap();

        assert_eq!(
            lower(row),
            json!({
                "type": 1,
                "components": [
                    {
                        "type": 2,
                        "style": 3,
                        "custom_id": "wave",
                        "label": "Wave",
                        "emoji": {"name": "👋"},
                        "disabled": false,
                    },
                    {
                        "type": 2,
                        "style": 5,
                        "url": "https://example.com/",
                        "label": "Docs",
                        "disabled": true,
                    },
                ],
            })
        );
    }

    #[test]
    fn serialize_menus() {
        let menu = SelectMenu::string("flavour", [
            SelectOption::new("Vanilla", "vanilla").default(true),
            SelectOption::new("Chocolate", "choc").description("The good one"),
        ])
        .unwrap()
        .placeholder("Pick one")
        .max_values(1);

        assert_eq!(
            lower(ActionRow::menu(menu)),
            json!({
                "type": 1,
                "components": [{
                    "type": 3,
                    "custom_id": "flavour",
                    "options": [
                        {"label": "Vanilla", "value": "vanilla", "default": true},
                        {"label": "Chocolate", "value": "choc", "description": "The good one"},
                    ],
                    "placeholder": "Pick one",
                    "max_values": 1,
                }],
            })
        );

        let menu = SelectMenu::channel("where", [ChannelType::Text]).unwrap();
        assert_eq!(
            lower(ActionRow::menu(menu))["components"][0],
            json!({"type": 8, "custom_id": "where", "channel_types": [0]})
        );

        for (menu, ty, id) in [
            (SelectMenu::user("u"), 5, "u"),
            (SelectMenu::role("r"), 6, "r"),
            (SelectMenu::mentionable("m"), 7, "m"),
            (SelectMenu::channel("c", []), 8, "c"),
        ] {
            assert_eq!(
                lower(ActionRow::menu(menu.unwrap().disabled(true)))["components"][0],
                json!({"type": ty, "custom_id": id, "disabled": true})
            );
        }
    }

    #[test]
    fn menu_options() {
        assert_eq!(
            SelectMenu::string("empty", []).unwrap_err(),
            ValidationError::EmptyMenu
        );
        assert_eq!(
            SelectMenu::string(
                "big",
                (0..26).map(|i| SelectOption::new(i.to_string(), i.to_string()))
            )
            .unwrap_err(),
            ValidationError::TooManyOptions { max: 25, got: 26 }
        );
    }
}
