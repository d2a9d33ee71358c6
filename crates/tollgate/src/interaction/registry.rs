//! Handler and listener registration, built once before serving

use std::{collections::HashMap, fmt, future::Future, str::FromStr, sync::Arc};

use super::{
    command::CommandInfo,
    handler::{
        ButtonHandler, CommandHandler, CompletionHandler, CompletionResult, EventListener,
        HandlerFn, HandlerResult, MenuHandler,
    },
    option::Args,
    payload::Interaction,
};

/// The kinds of routed interaction an [`EventListener`] can observe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// Any command, button or menu interaction that found a handler
    InteractionReceive,
    /// A command interaction that found a handler
    CommandReceive,
    /// A button interaction that found a handler
    ButtonClick,
    /// A menu interaction that found a handler
    MenuSelect,
}

impl Event {
    /// The canonical name of this event
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InteractionReceive => "interaction_receive",
            Self::CommandReceive => "command_receive",
            Self::ButtonClick => "button_click",
            Self::MenuSelect => "menu_select",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// An error parsing an [`Event`] from a string
#[derive(Debug, thiserror::Error)]
#[error("unknown event name {0:?}")]
pub struct UnknownEvent(String);

impl FromStr for Event {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, UnknownEvent> {
        Ok(match s {
            "interaction_receive" => Self::InteractionReceive,
            "command_receive" => Self::CommandReceive,
            "button_click" => Self::ButtonClick,
            "menu_select" => Self::MenuSelect,
            s => return Err(UnknownEvent(s.into())),
        })
    }
}

/// A set of interaction handlers, populated before the gateway starts and
/// immutable afterwards
///
/// Each command name, button ID and menu ID maps to at most one handler; a
/// later registration under the same key replaces the earlier one.  Any number
/// of listeners may observe each [`Event`], and are notified in registration
/// order.
#[derive(Debug, Default)]
pub struct Registry {
    commands: HashMap<String, Arc<dyn CommandHandler>>,
    buttons: HashMap<String, Arc<dyn ButtonHandler>>,
    menus: HashMap<String, Arc<dyn MenuHandler>>,
    completions: HashMap<String, Arc<dyn CompletionHandler>>,
    listeners: HashMap<Event, Vec<Arc<dyn EventListener>>>,
    definitions: Vec<CommandInfo>,
}

fn insert<H: ?Sized>(map: &mut HashMap<String, Arc<H>>, kind: &str, key: String, handler: Arc<H>) {
    if map.insert(key.clone(), handler).is_some() {
        tracing::debug!(kind, %key, "Replacing previously registered handler");
    }
}

impl Registry {
    /// Construct an empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Register a handler for the command with the given name
    pub fn command<F, R>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Arc<Interaction>, Args) -> R + Send + Sync + 'static,
        R: Future<Output = HandlerResult> + Send + 'static,
    {
        self.command_handler(name, HandlerFn(f))
    }

    /// Register a handler object for the command with the given name
    pub fn command_handler(
        &mut self,
        name: impl Into<String>,
        handler: impl CommandHandler + 'static,
    ) -> &mut Self {
        let handler: Arc<dyn CommandHandler> = Arc::new(handler);
        insert(&mut self.commands, "command", name.into(), handler);
        self
    }

    /// Register a command definition to be sent to Discord at startup,
    /// together with its handler
    pub fn define<F, R>(&mut self, info: CommandInfo, f: F) -> &mut Self
    where
        F: Fn(Arc<Interaction>, Args) -> R + Send + Sync + 'static,
        R: Future<Output = HandlerResult> + Send + 'static,
    {
        self.define_handler(info, HandlerFn(f))
    }

    /// Register a command definition to be sent to Discord at startup,
    /// together with its handler object
    pub fn define_handler(
        &mut self,
        info: CommandInfo,
        handler: impl CommandHandler + 'static,
    ) -> &mut Self {
        self.command_handler(info.name(), handler);

        if let Some(old) = self.definitions.iter_mut().find(|d| d.name() == info.name()) {
            tracing::debug!(name = info.name(), "Replacing previously defined command");
            *old = info;
        } else {
            self.definitions.push(info);
        }

        self
    }

    /// Register a handler for the button with the given custom ID
    pub fn button<F, R>(&mut self, custom_id: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Arc<Interaction>) -> R + Send + Sync + 'static,
        R: Future<Output = HandlerResult> + Send + 'static,
    {
        self.button_handler(custom_id, HandlerFn(f))
    }

    /// Register a handler object for the button with the given custom ID
    pub fn button_handler(
        &mut self,
        custom_id: impl Into<String>,
        handler: impl ButtonHandler + 'static,
    ) -> &mut Self {
        let handler: Arc<dyn ButtonHandler> = Arc::new(handler);
        insert(&mut self.buttons, "button", custom_id.into(), handler);
        self
    }

    /// Register a handler for the select menu with the given custom ID
    pub fn menu<F, R>(&mut self, custom_id: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Arc<Interaction>, Vec<String>) -> R + Send + Sync + 'static,
        R: Future<Output = HandlerResult> + Send + 'static,
    {
        self.menu_handler(custom_id, HandlerFn(f))
    }

    /// Register a handler object for the select menu with the given custom ID
    pub fn menu_handler(
        &mut self,
        custom_id: impl Into<String>,
        handler: impl MenuHandler + 'static,
    ) -> &mut Self {
        let handler: Arc<dyn MenuHandler> = Arc::new(handler);
        insert(&mut self.menus, "menu", custom_id.into(), handler);
        self
    }

    /// Register an autocomplete handler for the command with the given name
    pub fn completion<F, R>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Arc<Interaction>, Args) -> R + Send + Sync + 'static,
        R: Future<Output = CompletionResult> + Send + 'static,
    {
        self.completion_handler(name, HandlerFn(f))
    }

    /// Register an autocomplete handler object for the command with the given
    /// name
    pub fn completion_handler(
        &mut self,
        name: impl Into<String>,
        handler: impl CompletionHandler + 'static,
    ) -> &mut Self {
        let handler: Arc<dyn CompletionHandler> = Arc::new(handler);
        insert(&mut self.completions, "completion", name.into(), handler);
        self
    }

    /// Add a listener for the given event
    pub fn listen<F, R>(&mut self, event: Event, f: F) -> &mut Self
    where
        F: Fn(Event, Arc<Interaction>) -> R + Send + Sync + 'static,
        R: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.listener(event, HandlerFn(f))
    }

    /// Add a listener object for the given event
    pub fn listener(&mut self, event: Event, listener: impl EventListener + 'static) -> &mut Self {
        self.listeners
            .entry(event)
            .or_default()
            .push(Arc::new(listener));
        self
    }

    /// Look up the handler for a command
    #[must_use]
    pub fn find_command(&self, name: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.commands.get(name)
    }

    /// Look up the handler for a button
    #[must_use]
    pub fn find_button(&self, custom_id: &str) -> Option<&Arc<dyn ButtonHandler>> {
        self.buttons.get(custom_id)
    }

    /// Look up the handler for a select menu
    #[must_use]
    pub fn find_menu(&self, custom_id: &str) -> Option<&Arc<dyn MenuHandler>> {
        self.menus.get(custom_id)
    }

    /// Look up the autocomplete handler for a command
    #[must_use]
    pub fn find_completion(&self, name: &str) -> Option<&Arc<dyn CompletionHandler>> {
        self.completions.get(name)
    }

    /// The listeners for an event, in registration order
    #[must_use]
    pub fn listeners(&self, event: Event) -> &[Arc<dyn EventListener>] {
        self.listeners
            .get(&event)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The command definitions to register with Discord
    #[inline]
    #[must_use]
    pub fn definitions(&self) -> &[CommandInfo] { &self.definitions }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{Event, Registry};
    use crate::interaction::{
        command::CommandInfo,
        handler::{CommandHandler, HandlerResult},
        option::Args,
        payload::Interaction,
        response::Response,
    };

    async fn one(_: Arc<Interaction>, _: Args) -> HandlerResult { Ok(Response::ephemeral("one")) }

    async fn two(_: Arc<Interaction>, _: Args) -> HandlerResult { Ok(Response::ephemeral("two")) }

    #[test]
    fn event_names() {
        for ev in [
            Event::InteractionReceive,
            Event::CommandReceive,
            Event::ButtonClick,
            Event::MenuSelect,
        ] {
            assert_eq!(ev.to_string().parse::<Event>().unwrap(), ev);
        }

        assert_eq!(Event::ButtonClick.to_string(), "button_click");
        assert!("on_message".parse::<Event>().is_err());
    }

    #[tokio::test]
    async fn last_registration_wins() {
        let mut reg = Registry::new();
        reg.command("test", one).command("test", two);

        let int = Arc::new(Interaction::parse(br#"{"type":2,"data":{"name":"test"}}"#).unwrap());
        let res = reg
            .find_command("test")
            .unwrap()
            .respond(int, Args::default())
            .await
            .unwrap();

        assert_eq!(res, Response::ephemeral("two"));
        assert!(reg.find_command("nope").is_none());
    }

    #[test]
    fn definitions_replace_by_name() {
        let mut reg = Registry::new();
        reg.define(CommandInfo::slash("a", "first"), one)
            .define(CommandInfo::slash("b", "other"), one)
            .define(CommandInfo::slash("a", "second").nsfw(true), two);

        let defs = reg.definitions();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0], CommandInfo::slash("a", "second").nsfw(true));
        assert_eq!(defs[1].name(), "b");
        assert!(reg.find_command("a").is_some());
    }

    #[test]
    fn listeners_keep_order() {
        async fn noop(_: Event, _: Arc<Interaction>) -> anyhow::Result<()> { Ok(()) }

        let mut reg = Registry::new();
        assert!(reg.listeners(Event::ButtonClick).is_empty());

        reg.listen(Event::ButtonClick, noop)
            .listen(Event::ButtonClick, noop);
        assert_eq!(reg.listeners(Event::ButtonClick).len(), 2);
        assert!(reg.listeners(Event::MenuSelect).is_empty());
    }
}
