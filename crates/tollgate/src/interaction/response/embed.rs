use chrono::{DateTime, Utc};
use serenity::{
    builder::{CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter},
    model::Colour,
};
use url::Url;

use crate::util::BuilderHelpers;

#[derive(Debug, Clone, PartialEq)]
struct EmbedFooter {
    text: String,
    icon_url: Option<Url>,
}

impl From<EmbedFooter> for CreateEmbedFooter {
    fn from(value: EmbedFooter) -> Self {
        let EmbedFooter { text, icon_url } = value;
        Self::new(text).fold_opt(icon_url, Self::icon_url)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct EmbedAuthor {
    name: String,
    url: Option<Url>,
    icon_url: Option<Url>,
}

impl From<EmbedAuthor> for CreateEmbedAuthor {
    fn from(value: EmbedAuthor) -> Self {
        let EmbedAuthor {
            name,
            url,
            icon_url,
        } = value;

        Self::new(name)
            .fold_opt(url, Self::url)
            .fold_opt(icon_url, Self::icon_url)
    }
}

/// A message rich content embed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Embed {
    title: Option<String>,
    description: Option<String>,
    url: Option<Url>,
    timestamp: Option<DateTime<Utc>>,
    colour: Option<Colour>,
    footer: Option<EmbedFooter>,
    image: Option<Url>,
    thumbnail: Option<Url>,
    author: Option<EmbedAuthor>,
    fields: Vec<(String, String, bool)>,
}

impl Embed {
    /// Set the title of this embed
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the body text of this embed
    #[must_use]
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Set the URL the title links to
    #[must_use]
    pub fn url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    /// Set the timestamp shown in the footer
    #[must_use]
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the colour of the embed's side bar
    #[must_use]
    pub fn colour(mut self, colour: impl Into<Colour>) -> Self {
        self.colour = Some(colour.into());
        self
    }

    /// Set the footer text and optional icon
    #[must_use]
    pub fn footer(mut self, text: impl Into<String>, icon_url: Option<Url>) -> Self {
        self.footer = Some(EmbedFooter {
            text: text.into(),
            icon_url,
        });
        self
    }

    /// Set the large image shown below the body
    #[must_use]
    pub fn image(mut self, url: Url) -> Self {
        self.image = Some(url);
        self
    }

    /// Set the small image shown beside the title
    #[must_use]
    pub fn thumbnail(mut self, url: Url) -> Self {
        self.thumbnail = Some(url);
        self
    }

    /// Set the author line shown above the title
    #[must_use]
    pub fn author(
        mut self,
        name: impl Into<String>,
        url: Option<Url>,
        icon_url: Option<Url>,
    ) -> Self {
        self.author = Some(EmbedAuthor {
            name: name.into(),
            url,
            icon_url,
        });
        self
    }

    /// Append a name-value field
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push((name.into(), value.into(), inline));
        self
    }
}

impl From<Embed> for CreateEmbed {
    fn from(value: Embed) -> Self {
        let Embed {
            title,
            description,
            url,
            timestamp,
            colour,
            footer,
            image,
            thumbnail,
            author,
            fields,
        } = value;

        Self::new()
            .fold_opt(title, Self::title)
            .fold_opt(description, Self::description)
            .fold_opt(url, Self::url)
            .fold_opt(timestamp, Self::timestamp)
            .fold_opt(colour, Self::colour)
            .fold_opt(footer, |e, f| e.footer(f.into()))
            .fold_opt(image, Self::image)
            .fold_opt(thumbnail, Self::thumbnail)
            .fold_opt(author, |e, a| e.author(a.into()))
            .fields(fields)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use serenity::{builder::CreateEmbed, model::Colour};
    use url::Url;

    use super::Embed;

    fn lower(embed: Embed) -> serde_json::Value {
        serde_json::to_value(CreateEmbed::from(embed)).unwrap()
    }

    #[test]
    fn empty() {
        assert_eq!(lower(Embed::default()), json!({"type": "rich"}));
    }

    #[test]
    fn full() {
        let url = Url::parse("https://example.com/a.png").unwrap();
        let embed = Embed::default()
            .title("Hello")
            .description("world")
            .timestamp(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
            .colour(Colour::BLURPLE)
            .footer("feet", None)
            .author("ferris", None, Some(url.clone()))
            .field("a", "1", true)
            .field("b", "2", false);

        assert_eq!(
            lower(embed),
            json!({
                "type": "rich",
                "title": "Hello",
                "description": "world",
                "timestamp": "2024-01-02T03:04:05Z",
                "color": Colour::BLURPLE.0,
                "footer": {"text": "feet"},
                "author": {"name": "ferris", "icon_url": "https://example.com/a.png"},
                "fields": [
                    {"name": "a", "value": "1", "inline": true},
                    {"name": "b", "value": "2", "inline": false},
                ],
            })
        );
    }

    #[test]
    fn media_urls() {
        let url = Url::parse("https://example.com/a.png").unwrap();
        let json = lower(Embed::default().image(url.clone()).thumbnail(url));

        assert_eq!(json["image"]["url"], "https://example.com/a.png");
        assert_eq!(json["thumbnail"]["url"], "https://example.com/a.png");
    }
}
