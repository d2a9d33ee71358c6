//! Traits for defining handler logic for various interactions

use std::{fmt, future::Future, sync::Arc};

use super::{
    completion::Completion,
    option::Args,
    payload::Interaction,
    registry::Event,
    response::{Response, ValidationError},
};

/// An error arising from handling an interaction
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The handler tried to build an invalid response
    #[error("Error building response: {0}")]
    Validation(#[from] ValidationError),
    /// An unhandled error occurred
    #[error("Unexpected error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Return type for command, button and menu handlers
pub type HandlerResult = Result<Response, HandlerError>;

/// Return type for autocomplete handlers
pub type CompletionResult = Result<Vec<Completion>, HandlerError>;

/// A handler for a command interaction
#[async_trait::async_trait]
pub trait CommandHandler: fmt::Debug + Send + Sync {
    /// Respond to a command interaction, given its options in the order they
    /// were supplied
    async fn respond(&self, int: Arc<Interaction>, args: Args) -> HandlerResult;
}

/// A handler for a button click
#[async_trait::async_trait]
pub trait ButtonHandler: fmt::Debug + Send + Sync {
    /// Respond to a button interaction
    async fn respond(&self, int: Arc<Interaction>) -> HandlerResult;
}

/// A handler for a select menu submission
#[async_trait::async_trait]
pub trait MenuHandler: fmt::Debug + Send + Sync {
    /// Respond to a menu interaction, given the selected values
    async fn respond(&self, int: Arc<Interaction>, values: Vec<String>) -> HandlerResult;
}

/// A handler for autocomplete requests for a command's options
#[async_trait::async_trait]
pub trait CompletionHandler: fmt::Debug + Send + Sync {
    /// Suggest values for the focused option
    async fn complete(&self, int: Arc<Interaction>, args: Args) -> CompletionResult;
}

/// An observer notified of routed interactions before their handler runs
#[async_trait::async_trait]
pub trait EventListener: fmt::Debug + Send + Sync {
    /// Observe an interaction
    ///
    /// Errors are logged and otherwise ignored.
    async fn on_event(&self, event: Event, int: Arc<Interaction>) -> anyhow::Result<()>;
}

/// Adapter allowing plain functions and closures returning futures to be
/// registered as handlers
#[derive(Clone, Copy)]
pub struct HandlerFn<F>(pub F);

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerFn")
            .field(&std::any::type_name::<F>())
            .finish()
    }
}

#[async_trait::async_trait]
impl<F, R> CommandHandler for HandlerFn<F>
where
    F: Fn(Arc<Interaction>, Args) -> R + Send + Sync + 'static,
    R: Future<Output = HandlerResult> + Send + 'static,
{
    async fn respond(&self, int: Arc<Interaction>, args: Args) -> HandlerResult {
        (self.0)(int, args).await
    }
}

#[async_trait::async_trait]
impl<F, R> ButtonHandler for HandlerFn<F>
where
    F: Fn(Arc<Interaction>) -> R + Send + Sync + 'static,
    R: Future<Output = HandlerResult> + Send + 'static,
{
    async fn respond(&self, int: Arc<Interaction>) -> HandlerResult { (self.0)(int).await }
}

#[async_trait::async_trait]
impl<F, R> MenuHandler for HandlerFn<F>
where
    F: Fn(Arc<Interaction>, Vec<String>) -> R + Send + Sync + 'static,
    R: Future<Output = HandlerResult> + Send + 'static,
{
    async fn respond(&self, int: Arc<Interaction>, values: Vec<String>) -> HandlerResult {
        (self.0)(int, values).await
    }
}

#[async_trait::async_trait]
impl<F, R> CompletionHandler for HandlerFn<F>
where
    F: Fn(Arc<Interaction>, Args) -> R + Send + Sync + 'static,
    R: Future<Output = CompletionResult> + Send + 'static,
{
    async fn complete(&self, int: Arc<Interaction>, args: Args) -> CompletionResult {
        (self.0)(int, args).await
    }
}

#[async_trait::async_trait]
impl<F, R> EventListener for HandlerFn<F>
where
    F: Fn(Event, Arc<Interaction>) -> R + Send + Sync + 'static,
    R: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn on_event(&self, event: Event, int: Arc<Interaction>) -> anyhow::Result<()> {
        (self.0)(event, int).await
    }
}
