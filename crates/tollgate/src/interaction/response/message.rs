use serenity::{
    builder::{CreateAllowedMentions, CreateInteractionResponseMessage},
    model::application::InteractionResponseFlags,
};

use super::{ActionRow, Embed, Response, ValidationError};
use crate::util::{non_empty, BuilderHelpers};

/// The `data` object of a message response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageData {
    tts: bool,
    content: Option<String>,
    embeds: Vec<Embed>,
    allowed_mentions: Option<CreateAllowedMentions>,
    flags: InteractionResponseFlags,
    components: Vec<ActionRow>,
}

impl MessageData {
    /// A bare ephemeral text message
    pub(crate) fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            flags: InteractionResponseFlags::EPHEMERAL,
            ..Self::default()
        }
    }

    /// The text content of this message
    #[inline]
    #[must_use]
    pub fn content(&self) -> Option<&str> { self.content.as_deref() }

    /// The flags attached to this message
    #[inline]
    #[must_use]
    pub fn flags(&self) -> InteractionResponseFlags { self.flags }
}

impl From<MessageData> for CreateInteractionResponseMessage {
    fn from(value: MessageData) -> Self {
        let MessageData {
            tts,
            content,
            embeds,
            allowed_mentions,
            flags,
            components,
        } = value;

        Self::new()
            .fold_opt(tts.then_some(true), Self::tts)
            .fold_opt(content, Self::content)
            .fold_opt(non_empty(embeds), Self::embeds)
            .fold_opt(allowed_mentions, Self::allowed_mentions)
            .fold_opt((!flags.is_empty()).then_some(flags), Self::flags)
            .fold_opt(non_empty(components), Self::components)
    }
}

/// Builder for a message reply to an interaction
#[derive(Debug, Clone, Default)]
pub struct Reply {
    content: Option<String>,
    embeds: Vec<Embed>,
    components: Vec<ActionRow>,
    ephemeral: bool,
    flags: InteractionResponseFlags,
    tts: bool,
    allowed_mentions: Option<CreateAllowedMentions>,
}

impl Reply {
    /// Construct an empty reply
    #[inline]
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Construct a reply with the given text content
    #[inline]
    #[must_use]
    pub fn plain(content: impl Into<String>) -> Self { Self::new().content(content) }

    /// Set the text content of this reply
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Append an embed
    #[must_use]
    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    /// Append several embeds
    #[must_use]
    pub fn embeds(mut self, embeds: impl IntoIterator<Item = Embed>) -> Self {
        self.embeds.extend(embeds);
        self
    }

    /// Append a row of components
    #[must_use]
    pub fn row(mut self, row: ActionRow) -> Self {
        self.components.push(row);
        self
    }

    /// Append several rows of components
    #[must_use]
    pub fn components(mut self, rows: impl IntoIterator<Item = ActionRow>) -> Self {
        self.components.extend(rows);
        self
    }

    /// Set whether this reply is only visible to the invoking user
    ///
    /// Ignored if non-empty flags are set with [`flags`](Self::flags).
    #[must_use]
    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }

    /// Set the message flags explicitly
    #[must_use]
    pub fn flags(mut self, flags: InteractionResponseFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set whether this reply is read aloud by text-to-speech
    #[must_use]
    pub fn tts(mut self, tts: bool) -> Self {
        self.tts = tts;
        self
    }

    /// Restrict who this reply is allowed to ping
    #[must_use]
    pub fn allowed_mentions(mut self, allowed: CreateAllowedMentions) -> Self {
        self.allowed_mentions = Some(allowed);
        self
    }

    /// Prevent this reply from pinging anyone
    #[inline]
    #[must_use]
    pub fn suppress_mentions(self) -> Self { self.allowed_mentions(CreateAllowedMentions::new()) }

    /// Convert this reply into response data without checking its contents
    #[must_use]
    pub fn into_data(self) -> MessageData {
        let Self {
            content,
            embeds,
            components,
            ephemeral,
            flags,
            tts,
            allowed_mentions,
        } = self;

        let flags = if !flags.is_empty() {
            flags
        } else if ephemeral {
            InteractionResponseFlags::EPHEMERAL
        } else {
            InteractionResponseFlags::empty()
        };

        MessageData {
            tts,
            content: content.filter(|c| !c.is_empty()),
            embeds,
            allowed_mentions,
            flags,
            components,
        }
    }

    /// Build a new message in response to an interaction
    ///
    /// # Errors
    /// This method returns [`ValidationError::EmptyReply`] if the reply has
    /// neither text content nor embeds.
    pub fn build(self) -> Result<Response, ValidationError> {
        let data = self.into_data();

        if data.content.is_none() && data.embeds.is_empty() {
            return Err(ValidationError::EmptyReply);
        }

        Ok(Response::Message(data))
    }

    /// Build an edit of the message a component is attached to
    ///
    /// Unlike [`build`](Self::build), an update may leave out text content to
    /// change only the components.
    #[must_use]
    pub fn build_update(self) -> Response { Response::UpdateMessage(self.into_data()) }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use serenity::model::application::InteractionResponseFlags;

    use super::Reply;
    use crate::interaction::response::{ActionRow, Button, Embed, ValidationError};

    fn json(reply: Reply) -> serde_json::Value { serde_json::to_value(reply.build().unwrap()).unwrap() }

    #[test]
    fn empty_reply() {
        assert_eq!(Reply::new().build(), Err(ValidationError::EmptyReply));
        assert_eq!(Reply::plain("").build(), Err(ValidationError::EmptyReply));
        assert_eq!(
            Reply::new()
                .row(ActionRow::new([Button::new("a", "A").unwrap()]).unwrap())
                .build(),
            Err(ValidationError::EmptyReply)
        );
    }

    #[test]
    fn ephemeral_reply() {
        assert_eq!(
            json(Reply::plain("hi").ephemeral(true)),
            json!({"type": 4, "data": {"content": "hi", "flags": 64, "attachments": []}})
        );
    }

    #[test]
    fn zero_flags_count_as_unset() {
        let reply = Reply::plain("hi")
            .ephemeral(true)
            .flags(InteractionResponseFlags::empty());

        assert_eq!(
            json(reply),
            json!({"type": 4, "data": {"content": "hi", "flags": 64, "attachments": []}})
        );
    }

    #[test]
    fn explicit_flags_win() {
        let reply = Reply::plain("hi")
            .ephemeral(true)
            .flags(InteractionResponseFlags::SUPPRESS_EMBEDS);

        assert_eq!(
            json(reply),
            json!({"type": 4, "data": {"content": "hi", "flags": 4, "attachments": []}})
        );
    }

    #[test]
    fn plain_reply_omits_flags() {
        let data = json(Reply::plain("hi"));

        assert_eq!(
            data,
            json!({"type": 4, "data": {"content": "hi", "attachments": []}})
        );
        assert!(data["data"].get("flags").is_none());
    }

    #[test]
    fn combined_flags() {
        let reply = Reply::plain("shh").flags(
            InteractionResponseFlags::EPHEMERAL | InteractionResponseFlags::SUPPRESS_NOTIFICATIONS,
        );

        assert_eq!(json(reply)["data"]["flags"], 4160);
    }

    #[test]
    fn embed_only_reply() {
        let reply = Reply::new()
            .embed(Embed::default().title("t"))
            .tts(true)
            .suppress_mentions();

        assert_eq!(
            json(reply),
            json!({
                "type": 4,
                "data": {
                    "tts": true,
                    "embeds": [{"type": "rich", "title": "t"}],
                    "allowed_mentions": {"parse": [], "users": [], "roles": []},
                    "attachments": [],
                },
            })
        );
    }

    #[test]
    fn update_may_omit_content() {
        let res = Reply::new()
            .row(ActionRow::new([Button::new("a", "A").unwrap().disabled(true)]).unwrap())
            .build_update();

        assert_eq!(
            serde_json::to_value(res).unwrap(),
            json!({
                "type": 7,
                "data": {
                    "components": [{
                        "type": 1,
                        "components": [{
                            "type": 2,
                            "style": 1,
                            "custom_id": "a",
                            "label": "A",
                            "disabled": true,
                        }],
                    }],
                    "attachments": [],
                },
            })
        );
    }
}
