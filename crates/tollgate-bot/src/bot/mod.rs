use std::num::NonZeroU64;

use serenity::model::id::{ApplicationId, GuildId};
use tollgate::{Config, Event, Redacted, Registry};

use crate::prelude::*;

mod commands;

#[derive(Debug, clap::Args)]
pub struct BotOpts {
    /// The Discord API token to use
    #[arg(long, env)]
    discord_token: Redacted<String>,

    /// The hex-encoded public key from the application's developer portal page
    #[arg(long, env)]
    discord_public_key: String,

    /// The application's client secret
    #[arg(long, env)]
    discord_secret_key: Redacted<String>,

    /// The application ID, if it differs from the bot user's ID
    #[arg(long, env)]
    discord_application_id: Option<NonZeroU64>,

    /// The Discord API version to use
    #[arg(long, env, default_value_t = 10)]
    discord_api_version: u8,

    /// The port to listen for interactions on
    #[arg(short, long, env, default_value_t = 8080)]
    port: u16,

    /// Register commands in this guild only, rather than globally
    #[arg(long, env)]
    guild_id: Option<NonZeroU64>,
}

impl BotOpts {
    pub fn guild(&self) -> Option<GuildId> { self.guild_id.map(|g| GuildId::new(g.get())) }

    pub fn into_config(self, verbose: bool) -> Result<Config> {
        let Self {
            discord_token,
            discord_public_key,
            discord_secret_key,
            discord_application_id,
            discord_api_version,
            port,
            guild_id: _,
        } = self;

        let config = Config::new(
            discord_api_version,
            discord_secret_key.0,
            &discord_public_key,
            discord_token.0,
            port,
        )
        .context("Invalid Discord public key")?
        .verbose(verbose);

        Ok(match discord_application_id {
            Some(id) => config.application_id(ApplicationId::new(id.get())),
            None => config,
        })
    }
}

#[instrument(level = "debug")]
pub fn registry(guild: Option<GuildId>) -> Result<Registry> {
    let mut reg = Registry::new();

    commands::register(&mut reg, guild);

    reg.listen(Event::InteractionReceive, |_, int| async move {
        debug!(id = ?int.envelope.id, kind = ?int.kind, "Interaction received");
        anyhow::Ok(())
    })
    .listen(Event::ButtonClick, |_, int| async move {
        let user = int.invoker().map(|u| u.display_name().to_owned());
        let id = int.component().map(|c| c.custom_id.clone());
        info!(?user, ?id, "Button clicked");
        anyhow::Ok(())
    });

    ensure!(
        !reg.definitions().is_empty(),
        "No commands were defined for registration"
    );

    Ok(reg)
}
