//! Signature-checked webhook dispatch for Discord application interactions
//!
//! Discord delivers interactions (slash commands, button clicks, menu
//! selections, autocomplete requests) to an HTTP endpoint as signed JSON
//! payloads.  This crate verifies those signatures, routes each payload to a
//! handler registered ahead of time in a [`Registry`], and writes the
//! handler's reply back as the HTTP response.
//!
//! ```no_run
//! use tollgate::prelude::*;
//!
//! async fn ping(_int: Arc<Interaction>, _args: Args) -> HandlerResult {
//!     Ok(Reply::plain("pong").ephemeral(true).build()?)
//! }
//!
//! # async fn run() -> Result<(), tollgate::GatewayError> {
//! let mut registry = Registry::default();
//! registry.define(CommandInfo::slash("ping", "Check that the bot is alive"), ping);
//!
//! let config = Config::new(10, "secret", &"00".repeat(32), "token", 8080)?;
//! Gateway::new(config, registry)
//!     .await?
//!     .run(std::future::pending())
//!     .await
//! # }
//! ```

#![deny(
    clippy::disallowed_methods,
    clippy::suspicious,
    clippy::style,
    clippy::clone_on_ref_ptr
)]
#![warn(
    clippy::pedantic,
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations
)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod gateway;
pub mod interaction;
pub mod rest;
pub mod signature;
mod util;

pub use config::Config;
pub use gateway::{Gateway, GatewayError};
pub use interaction::{dispatch::Dispatcher, registry::Event, Registry};
pub use util::Redacted;

/// The version of this crate, as reported to Discord in the `User-Agent`
/// header
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports for writing interaction handlers
pub mod prelude {
    pub use std::sync::Arc;

    pub use serenity::model::{
        application::{ButtonStyle, InteractionResponseFlags},
        channel::ReactionType,
    };

    pub use crate::{
        interaction::{
            command::{Choice, CommandInfo, CommandOption, OptionKind},
            completion::Completion,
            handler::{HandlerError, HandlerResult},
            option::{Args, CommandArg, OptionValue},
            payload::{Interaction, InteractionData},
            response::{
                ActionRow, Button, Embed, Reply, Response, SelectMenu, SelectOption,
                ValidationError,
            },
        },
        Config, Event, Gateway, Registry,
    };
}
