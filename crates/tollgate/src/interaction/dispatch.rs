//! Routing of parsed interactions to their registered handlers

use std::{
    fmt::{self, Write},
    sync::Arc,
};

use super::{
    completion::MAX_CHOICES,
    handler::HandlerError,
    option::{Args, CommandArg, OptionValue},
    payload::{Interaction, InteractionData},
    registry::{Event, Registry},
    response::Response,
};

/// Reply sent for a command with no registered handler
pub const UNKNOWN_COMMAND: &str = "This command is not registered with Interaction Gateway API.";
/// Reply sent for a button with no registered handler
pub const UNKNOWN_BUTTON: &str = "This button is not registered with Interaction Gateway API.";
/// Reply sent for a select menu with no registered handler
pub const UNKNOWN_MENU: &str = "This menu is not registered with Interaction Gateway API.";
/// Reply sent for a known interaction type that cannot be routed
pub const UNSUPPORTED: &str = "This interaction is not yet supported by Interaction Gateway API.";

#[inline]
fn write_string(f: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut s = String::new();
    f(&mut s).unwrap_or_else(|e| unreachable!("{e}"));
    s
}

fn write_args(w: &mut impl Write, args: &[CommandArg]) -> fmt::Result {
    for arg in args {
        match arg.value {
            OptionValue::SubCommand(ref o) | OptionValue::SubCommandGroup(ref o) => {
                write!(w, " {}", arg.name)?;
                write_args(w, o)?;
            },
            ref val => {
                if arg.focused {
                    write!(w, " !:{}(", arg.name)
                } else {
                    write!(w, " {}(", arg.name)
                }?;
                match val {
                    OptionValue::String(s) | OptionValue::Focused(s) => write!(w, "{s:?}"),
                    OptionValue::Integer(i) => write!(w, "{i}"),
                    OptionValue::Boolean(b) => write!(w, "{b:?}"),
                    OptionValue::User(u) => write!(w, "u:{u}"),
                    OptionValue::Channel(c) => write!(w, "#{c}"),
                    OptionValue::Role(r) => write!(w, "r:{r}"),
                    OptionValue::Mentionable(m) => write!(w, "@{m}"),
                    OptionValue::Number(f) => write!(w, "{f:.2}"),
                    OptionValue::Attachment(a) => write!(w, "<{a}>"),
                    OptionValue::SubCommand(_) | OptionValue::SubCommandGroup(_) => {
                        unreachable!()
                    },
                }?;
                write!(w, ")")?;
            },
        }
    }

    Ok(())
}

/// A short human-readable summary of an interaction for log output
fn describe(int: &Interaction) -> String {
    write_string(|w| match int.data {
        InteractionData::Ping => write!(w, "ping"),
        InteractionData::Command(ref c) => {
            write!(w, "/{}", c.name)?;
            write_args(w, &c.options)
        },
        InteractionData::Autocomplete(ref c) => {
            write!(w, "complete::/{}", c.name)?;
            write_args(w, &c.options)
        },
        InteractionData::Component(ref c) if c.is_menu() => {
            write!(w, "menu::{:?} {:?}", c.custom_id, c.values)
        },
        InteractionData::Component(ref c) => write!(w, "button::{:?}", c.custom_id),
        InteractionData::Modal(ref m) => write!(w, "modal::{:?}", m.custom_id),
    })
}

fn pretty_handler_error(err: HandlerError, desc: &'static str) -> Response {
    let msg = match err {
        HandlerError::Validation(err) => {
            tracing::error!(%err, "Handler for {desc} built an invalid response");
            err.to_string()
        },
        HandlerError::Other(err) => {
            tracing::error!(?err, "Unexpected error handling {desc}");
            format!("{err:#}")
        },
    };

    Response::ephemeral(format!("Unexpected error: `{}`", msg.replace('`', "'")))
}

/// Routes authenticated interactions to the handlers in a [`Registry`]
///
/// Cloning a dispatcher is cheap, and all clones share the same registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
}

impl From<Registry> for Dispatcher {
    fn from(registry: Registry) -> Self { Self::new(registry) }
}

impl Dispatcher {
    /// Freeze a registry for dispatching
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// The registry interactions are routed against
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Registry { &self.registry }

    async fn notify(&self, event: Event, int: &Arc<Interaction>) {
        let listeners = self
            .registry
            .listeners(Event::InteractionReceive)
            .iter()
            .map(|l| (Event::InteractionReceive, l))
            .chain(self.registry.listeners(event).iter().map(|l| (event, l)));

        for (event, listener) in listeners {
            if let Err(err) = listener.on_event(event, Arc::clone(int)).await {
                tracing::warn!(?err, %event, ?listener, "Event listener failed");
            }
        }
    }

    /// Produce the response to an interaction
    ///
    /// Interactions with a registered handler first notify the
    /// [`Event::InteractionReceive`] listeners, then the listeners for their
    /// specific event, and finally invoke the handler.  Interactions without a
    /// handler receive a fixed ephemeral reply and notify no listeners.
    #[tracing::instrument(
        level = "error",
        name = "dispatch",
        skip_all,
        fields(id = ?int.envelope.id, name = %describe(&int)),
    )]
    pub async fn dispatch(&self, int: Interaction) -> Response {
        let int = Arc::new(int);

        match int.data {
            InteractionData::Ping => {
                tracing::debug!("Responding to ping");
                Response::pong()
            },
            InteractionData::Command(ref data) => {
                tracing::info!("Handling application command");

                let Some(handler) = self.registry.find_command(&data.name) else {
                    tracing::warn!("Rejecting unknown command");
                    return Response::ephemeral(UNKNOWN_COMMAND);
                };
                tracing::debug!(?handler, "Command handler selected");

                self.notify(Event::CommandReceive, &int).await;
                let args = Args::from(data.options.clone());
                handler
                    .respond(Arc::clone(&int), args)
                    .await
                    .unwrap_or_else(|e| pretty_handler_error(e, "command"))
            },
            InteractionData::Component(ref data) if data.is_menu() => {
                tracing::info!("Handling menu selection");

                let Some(handler) = self.registry.find_menu(&data.custom_id) else {
                    tracing::warn!("Rejecting unknown menu");
                    return Response::ephemeral(UNKNOWN_MENU);
                };
                tracing::debug!(?handler, "Menu handler selected");

                self.notify(Event::MenuSelect, &int).await;
                handler
                    .respond(Arc::clone(&int), data.values.clone())
                    .await
                    .unwrap_or_else(|e| pretty_handler_error(e, "menu"))
            },
            InteractionData::Component(ref data) => {
                tracing::info!("Handling button click");

                let Some(handler) = self.registry.find_button(&data.custom_id) else {
                    tracing::warn!("Rejecting unknown button");
                    return Response::ephemeral(UNKNOWN_BUTTON);
                };
                tracing::debug!(?handler, "Button handler selected");

                self.notify(Event::ButtonClick, &int).await;
                handler
                    .respond(Arc::clone(&int))
                    .await
                    .unwrap_or_else(|e| pretty_handler_error(e, "button"))
            },
            InteractionData::Autocomplete(ref data) => {
                tracing::trace!("Handling command autocomplete");

                let Some(handler) = self.registry.find_completion(&data.name) else {
                    tracing::debug!("No completion handler registered");
                    return Response::ephemeral(UNSUPPORTED);
                };

                let mut choices = handler
                    .complete(Arc::clone(&int), Args::from(data.options.clone()))
                    .await
                    .unwrap_or_else(|err| {
                        tracing::error!(%err, "Error in command completion");
                        vec![]
                    });

                if choices.len() > MAX_CHOICES {
                    tracing::debug!(count = choices.len(), "Truncating completion list");
                    choices.truncate(MAX_CHOICES);
                }

                Response::autocomplete(choices)
            },
            InteractionData::Modal(_) => {
                tracing::warn!("Rejecting unsupported modal submission");
                Response::ephemeral(UNSUPPORTED)
            },
        }
    }
}
