//! A small client for the handful of Discord REST endpoints a gateway needs

use std::time::Duration;

use reqwest::{header::AUTHORIZATION, RequestBuilder, StatusCode};
use serde::Deserialize;
use serenity::{
    builder::CreateCommand,
    model::id::{ApplicationId, CommandId, GuildId, UserId},
};

use crate::{config::Config, interaction::command::CommandInfo, util::Redacted};

const TIMEOUT: Duration = Duration::from_secs(10);

/// An error arising from a REST call
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// Discord did not accept the bot token
    #[error("Discord rejected the bot token ({status})")]
    Authentication {
        /// The status code of the rejection
        status: StatusCode,
    },
    /// Discord returned a non-success status
    #[error("Discord returned {status}: {body}")]
    Status {
        /// The status code of the response
        status: StatusCode,
        /// The raw response body, for diagnostics
        body: String,
    },
    /// The request could not be sent or its response could not be read
    #[error("Error sending request: {0}")]
    Http(#[from] reqwest::Error),
}

/// The user account belonging to the configured bot token
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrentUser {
    /// The user's snowflake ID
    pub id: UserId,
    /// The user's account name
    pub username: String,
    /// Whether the account is a bot account
    #[serde(default)]
    pub bot: bool,
}

/// A command as acknowledged by Discord after registration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisteredCommand {
    /// The ID Discord assigned to the command
    pub id: CommandId,
    /// The name of the command
    pub name: String,
    /// The guild the command was registered in, if not global
    #[serde(default)]
    pub guild_id: Option<GuildId>,
}

/// An authenticated Discord REST client
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base: String,
    token: Redacted<String>,
}

impl RestClient {
    /// Construct a client from the given configuration without contacting
    /// Discord
    ///
    /// # Errors
    /// This function returns an error if the underlying HTTP client cannot be
    /// initialized.
    pub fn new(config: &Config) -> Result<Self, RestError> {
        let http = reqwest::Client::builder()
            .user_agent(format!(
                "DiscordBot ({}, {})",
                env!("CARGO_PKG_REPOSITORY"),
                crate::VERSION
            ))
            .timeout(TIMEOUT)
            .connect_timeout(TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base: config.api_url(),
            token: Redacted(config.token().into()),
        })
    }

    /// Construct a client and check its token by fetching the bot's own user
    ///
    /// # Errors
    /// This function returns [`RestError::Authentication`] if Discord rejects
    /// the token, or another error if the request fails.
    pub async fn connect(config: &Config) -> Result<(Self, CurrentUser), RestError> {
        let client = Self::new(config)?;
        let me = client.current_user().await?;
        Ok((client, me))
    }

    fn request(&self, req: RequestBuilder) -> RequestBuilder {
        req.header(AUTHORIZATION, format!("Bot {}", self.token.expose()))
    }

    /// Fetch the user account the bot token belongs to
    ///
    /// # Errors
    /// This function returns [`RestError::Authentication`] for any
    /// non-success response.
    #[tracing::instrument(level = "debug", skip(self), err)]
    pub async fn current_user(&self) -> Result<CurrentUser, RestError> {
        let res = self
            .request(self.http.get(format!("{}/users/@me", self.base)))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(RestError::Authentication { status });
        }

        Ok(res.json().await?)
    }

    /// Register a command with Discord, overwriting any existing command with
    /// the same name
    ///
    /// Guild-restricted commands are registered once per guild, in order;
    /// otherwise the command is registered globally.  Registration stops at
    /// the first failure.
    ///
    /// # Errors
    /// This function returns [`RestError::Status`] if Discord refuses the
    /// command, or another error if a request fails.
    #[tracing::instrument(level = "info", skip(self, info), fields(name = info.name()), err)]
    pub async fn register_command(
        &self,
        app: ApplicationId,
        info: &CommandInfo,
    ) -> Result<Vec<RegisteredCommand>, RestError> {
        let body = CreateCommand::from(info);
        let urls: Vec<_> = if info.is_guild_restricted() {
            info.guild_ids()
                .iter()
                .map(|g| format!("{}/applications/{app}/guilds/{g}/commands", self.base))
                .collect()
        } else {
            vec![format!("{}/applications/{app}/commands", self.base)]
        };

        let mut registered = Vec::with_capacity(urls.len());
        for url in urls {
            let res = self.request(self.http.post(&url)).json(&body).send().await?;

            let status = res.status();
            if !status.is_success() {
                let body = res.text().await.unwrap_or_default();
                return Err(RestError::Status { status, body });
            }

            let cmd: RegisteredCommand = res.json().await?;
            tracing::debug!(id = %cmd.id, guild = ?cmd.guild_id, "Command registered");
            registered.push(cmd);
        }

        Ok(registered)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        net::SocketAddr,
        sync::{Arc, Mutex},
    };

    use axum::{
        extract::{Path, State},
        http::{HeaderMap, StatusCode, Uri},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use serenity::model::id::{ApplicationId, GuildId, UserId};

    use super::{RestClient, RestError};
    use crate::{interaction::command::CommandInfo, Config};

    const PUBLIC_KEY: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";

    type Log = Arc<Mutex<Vec<(String, Value)>>>;

    async fn me(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
        match headers.get("authorization").and_then(|v| v.to_str().ok()) {
            Some("Bot good") => Ok(Json(json!({
                "id": "1234",
                "username": "tollbot",
                "bot": true,
            }))),
            _ => Err(StatusCode::UNAUTHORIZED),
        }
    }

    async fn create(
        State(log): State<Log>,
        Path(params): Path<HashMap<String, String>>,
        uri: Uri,
        Json(body): Json<Value>,
    ) -> Result<Json<Value>, StatusCode> {
        if body["name"] == "broken" {
            return Err(StatusCode::BAD_REQUEST);
        }

        let res = json!({
            "id": "99",
            "name": body["name"],
            "guild_id": params.get("guild"),
        });
        log.lock().unwrap().push((uri.path().to_owned(), body));
        Ok(Json(res))
    }

    async fn mock() -> (SocketAddr, Log) {
        let log = Log::default();
        let app = Router::new()
            .route("/api/v10/users/@me", get(me))
            .route("/api/v10/applications/{app}/commands", post(create))
            .route(
                "/api/v10/applications/{app}/guilds/{guild}/commands",
                post(create),
            )
            .with_state(Arc::clone(&log));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        (addr, log)
    }

    fn config(addr: SocketAddr, token: &str) -> Config {
        Config::new(10, "secret", PUBLIC_KEY, token, 0)
            .unwrap()
            .api_base(format!("http://{addr}/api"))
    }

    #[tokio::test]
    async fn connect_fetches_user() {
        let (addr, _) = mock().await;
        let (_, me) = RestClient::connect(&config(addr, "good")).await.unwrap();

        assert_eq!(me.id, UserId::new(1234));
        assert_eq!(me.username, "tollbot");
        assert!(me.bot);
    }

    #[tokio::test]
    async fn bad_token_is_rejected() {
        let (addr, _) = mock().await;
        let err = RestClient::connect(&config(addr, "bad")).await.unwrap_err();

        assert!(
            matches!(err, RestError::Authentication { status } if status.as_u16() == 401),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn global_and_guild_registration() {
        let (addr, log) = mock().await;
        let (rest, _) = RestClient::connect(&config(addr, "good")).await.unwrap();
        let app = ApplicationId::new(7);

        let global = rest
            .register_command(app, &CommandInfo::slash("ping", "Ping"))
            .await
            .unwrap();
        assert_eq!(global.len(), 1);
        assert_eq!(global[0].name, "ping");
        assert_eq!(global[0].guild_id, None);

        let local = CommandInfo::slash("local", "Local")
            .guild(GuildId::new(1))
            .guild(GuildId::new(2));
        let guild = rest.register_command(app, &local).await.unwrap();
        assert_eq!(
            guild.iter().map(|c| c.guild_id).collect::<Vec<_>>(),
            [Some(GuildId::new(1)), Some(GuildId::new(2))]
        );

        let log = log.lock().unwrap();
        let paths: Vec<_> = log.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, [
            "/api/v10/applications/7/commands",
            "/api/v10/applications/7/guilds/1/commands",
            "/api/v10/applications/7/guilds/2/commands",
        ]);
        assert_eq!(log[0].1["description"], "Ping");
    }

    #[tokio::test]
    async fn refused_registration() {
        let (addr, _) = mock().await;
        let (rest, _) = RestClient::connect(&config(addr, "good")).await.unwrap();

        let err = rest
            .register_command(ApplicationId::new(7), &CommandInfo::slash("broken", "No"))
            .await
            .unwrap_err();

        assert!(
            matches!(err, RestError::Status { status, .. } if status.as_u16() == 400),
            "{err:?}"
        );
    }
}
