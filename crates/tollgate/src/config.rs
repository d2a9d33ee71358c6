//! Immutable startup configuration for a [`Gateway`](crate::Gateway)

use serenity::model::id::ApplicationId;

use crate::{
    signature::{AuthenticationError, SignatureGate},
    util::Redacted,
};

/// Base URL of Discord's REST API, without the version segment
pub const DEFAULT_API_BASE: &str = "https://discord.com/api";

/// Everything a gateway needs to know before it starts accepting traffic
#[derive(Debug, Clone)]
pub struct Config {
    api_version: u8,
    secret_key: Redacted<String>,
    gate: SignatureGate,
    token: Redacted<String>,
    port: u16,
    verbose: bool,
    application_id: Option<ApplicationId>,
    api_base: String,
}

impl Config {
    /// Construct a new configuration
    ///
    /// `public_key` is the hex-encoded key from the application's developer
    /// portal page and is parsed eagerly, so that a typo fails at startup
    /// rather than on the first request.
    ///
    /// # Errors
    /// This function returns an error if `public_key` is not a valid
    /// hex-encoded Ed25519 public key.
    pub fn new(
        api_version: u8,
        secret_key: impl Into<String>,
        public_key: &str,
        token: impl Into<String>,
        port: u16,
    ) -> Result<Self, AuthenticationError> {
        Ok(Self {
            api_version,
            secret_key: Redacted(secret_key.into()),
            gate: SignatureGate::from_hex(public_key)?,
            token: Redacted(token.into()),
            port,
            verbose: false,
            application_id: None,
            api_base: DEFAULT_API_BASE.into(),
        })
    }

    /// Raise the log level of the HTTP server's request tracing
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the application ID used for command registration
    ///
    /// If unset, the ID of the bot user is used, which matches the
    /// application ID for every bot created through the developer portal.
    #[must_use]
    pub fn application_id(mut self, id: ApplicationId) -> Self {
        self.application_id = Some(id);
        self
    }

    /// Override the REST API base URL (without the `/v{N}` suffix)
    #[must_use]
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// The Discord API version used for REST calls
    #[inline]
    #[must_use]
    pub fn api_version(&self) -> u8 { self.api_version }

    /// The OAuth2 client secret of the application
    #[inline]
    #[must_use]
    pub fn secret_key(&self) -> &str { self.secret_key.expose() }

    /// The signature gate built from the application's public key
    #[inline]
    #[must_use]
    pub fn gate(&self) -> SignatureGate { self.gate }

    /// The bot token
    #[inline]
    #[must_use]
    pub fn token(&self) -> &str { self.token.expose() }

    /// The TCP port the webhook server listens on
    #[inline]
    #[must_use]
    pub fn port(&self) -> u16 { self.port }

    /// Whether HTTP request tracing is logged at `INFO` rather than `DEBUG`
    #[inline]
    #[must_use]
    pub fn is_verbose(&self) -> bool { self.verbose }

    /// The explicitly configured application ID, if any
    #[inline]
    #[must_use]
    pub fn explicit_application_id(&self) -> Option<ApplicationId> { self.application_id }

    /// The versioned REST API root, e.g. `https://discord.com/api/v10`
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("{}/v{}", self.api_base.trim_end_matches('/'), self.api_version)
    }
}
