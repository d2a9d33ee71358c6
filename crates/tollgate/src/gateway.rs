//! The HTTP surface of an interaction webhook

use std::{future::Future, net::Ipv4Addr};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response as HttpResponse},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serenity::model::id::ApplicationId;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::{
    config::Config,
    interaction::{
        dispatch::Dispatcher, payload::Interaction, response::Response, ProtocolError, Registry,
    },
    rest::{RegisteredCommand, RestClient, RestError},
    signature::{AuthenticationError, SignatureGate, SIGNATURE_HEADER, TIMESTAMP_HEADER},
};

/// Body of `GET /`, so that operators can check the server is reachable
pub const INDEX_TEXT: &str = "This is a Discord Interaction API.";

/// An error arising while starting or serving a gateway
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A request was unsigned or carried a bad signature
    #[error("Authentication failed: {0}")]
    Authentication(#[from] AuthenticationError),
    /// A request body was not a well-formed interaction
    #[error("Invalid interaction: {0}")]
    Protocol(#[from] ProtocolError),
    /// A call to Discord's REST API failed
    #[error("Discord API error: {0}")]
    Rest(#[from] RestError),
    /// The listening socket could not be opened
    #[error("Unable to bind port {port}: {source}")]
    Bind {
        /// The requested port
        port: u16,
        /// The underlying error
        source: std::io::Error,
    },
    /// The HTTP server stopped with an error
    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),
}

impl GatewayError {
    /// The HTTP status this error is reported with
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Protocol(_) => StatusCode::BAD_REQUEST,
            Self::Rest(_) => StatusCode::BAD_GATEWAY,
            Self::Bind { .. } | Self::Serve(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> HttpResponse {
        let status = self.status();
        tracing::debug!(%status, err = %self, "Rejecting request");

        (status, Json(ErrorBody {
            error: self.to_string(),
        }))
            .into_response()
    }
}

#[derive(Debug, Clone)]
struct AppState {
    gate: SignatureGate,
    dispatcher: Dispatcher,
}

/// Build the webhook router without starting a server
///
/// The router serves `GET /` with [`INDEX_TEXT`] and accepts signed
/// interactions on `POST /interaction`.  When `verbose` is set, request
/// tracing is logged at `INFO` rather than `DEBUG`.
pub fn router(gate: SignatureGate, dispatcher: Dispatcher, verbose: bool) -> Router {
    let level = if verbose { Level::INFO } else { Level::DEBUG };

    Router::new()
        .route("/", get(index))
        .route("/interaction", post(interaction))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(level))
                .on_response(DefaultOnResponse::new().level(level)),
        )
        .with_state(AppState { gate, dispatcher })
}

async fn index() -> &'static str { INDEX_TEXT }

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

async fn interaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Response>, GatewayError> {
    state.gate.verify(
        header(&headers, SIGNATURE_HEADER),
        header(&headers, TIMESTAMP_HEADER),
        &body,
    )?;

    let int = Interaction::parse(&body)?;
    Ok(Json(state.dispatcher.dispatch(int).await))
}

/// A configured interaction webhook, ready to register commands and serve
/// requests
#[derive(Debug)]
pub struct Gateway {
    config: Config,
    rest: RestClient,
    application_id: ApplicationId,
    dispatcher: Dispatcher,
}

impl Gateway {
    /// Validate the bot token against Discord and freeze the given registry
    ///
    /// # Errors
    /// This function returns [`GatewayError::Rest`] if Discord rejects the
    /// token or cannot be reached.
    pub async fn new(config: Config, registry: Registry) -> Result<Self, GatewayError> {
        let (rest, me) = RestClient::connect(&config).await?;
        tracing::info!(user = %me.username, id = %me.id, "Authenticated with Discord");

        let application_id = config
            .explicit_application_id()
            .unwrap_or_else(|| ApplicationId::new(me.id.get()));

        Ok(Self {
            config,
            rest,
            application_id,
            dispatcher: Dispatcher::new(registry),
        })
    }

    /// The application commands are registered under
    #[inline]
    #[must_use]
    pub fn application_id(&self) -> ApplicationId { self.application_id }

    /// The REST client authenticated with this gateway's token
    #[inline]
    #[must_use]
    pub fn rest(&self) -> &RestClient { &self.rest }

    /// Build the webhook router for this gateway
    #[must_use]
    pub fn router(&self) -> Router {
        router(
            self.config.gate(),
            self.dispatcher.clone(),
            self.config.is_verbose(),
        )
    }

    /// Register every defined command with Discord, in definition order
    ///
    /// # Errors
    /// This method returns an error at the first command Discord refuses.
    #[tracing::instrument(level = "info", skip(self), fields(app = %self.application_id))]
    pub async fn register_commands(&self) -> Result<Vec<RegisteredCommand>, GatewayError> {
        let defs = self.dispatcher.registry().definitions();
        let mut registered = Vec::with_capacity(defs.len());

        for info in defs {
            registered.extend(self.rest.register_command(self.application_id, info).await?);
        }

        tracing::info!(count = registered.len(), "Commands registered");
        Ok(registered)
    }

    /// Register commands, then serve interactions until `shutdown` resolves
    ///
    /// # Errors
    /// This method returns an error if command registration fails, the port
    /// cannot be bound, or the server fails.
    pub async fn run(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), GatewayError> {
        self.register_commands().await?;

        let port = self.config.port();
        let listener = tokio::net::TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map_err(|source| GatewayError::Bind { port, source })?;
        tracing::info!(port, "Listening for interactions");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(GatewayError::Serve)?;

        tracing::info!("Gateway shut down");
        Ok(())
    }
}
