//! The execution coordinator: decides where a matched command's handler
//! actually runs (§4.I). Parsing always happens synchronously on the
//! calling thread (§5); this module governs only the handler step.
use std::error::Error as StdError;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::context::CommandContext;

/// The error a handler can fail with: any boxed, thread-safe
/// [`std::error::Error`], wrapped by [`crate::error::CommandErrorKind::CommandExecution`]
/// once it reaches the dispatcher.
pub type HandlerError = Box<dyn StdError + Send + Sync>;

/// The result of running a matched command's handler.
pub type HandlerOutcome = Result<(), HandlerError>;

/// A matched command's executable body.
///
/// Always expressed as producing a future, even for handlers that complete
/// immediately (`Box::pin(std::future::ready(...))`): this keeps
/// [`CommandExecutionCoordinator`] implementations uniform regardless of
/// whether a given handler is "sync" or "async" in spirit (§4.I).
pub trait CommandHandler<S>: Send + Sync {
    /// Runs the handler against the bound context, returning a future for
    /// its outcome.
    fn execute<'a>(&'a self, context: &'a mut CommandContext<S>) -> BoxFuture<'a, HandlerOutcome>;
}

impl<S, F, Fut> CommandHandler<S> for F
where
    F: Fn(&mut CommandContext<S>) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerOutcome> + Send + 'static,
{
    fn execute<'a>(&'a self, context: &'a mut CommandContext<S>) -> BoxFuture<'a, HandlerOutcome> {
        self(context).boxed()
    }
}

/// Governs whether a matched handler runs inline or is handed to an
/// executor, and whether the caller waits for it (§4.I).
pub trait CommandExecutionCoordinator<S>: Send + Sync {
    /// Runs `handler` against `context` under this coordinator's strategy.
    fn coordinate<'a>(
        &'a self,
        handler: &'a dyn CommandHandler<S>,
        context: &'a mut CommandContext<S>,
    ) -> BoxFuture<'a, HandlerOutcome>;
}

/// Runs the handler's future directly on the caller's task: no executor
/// hop. The safe default (§4.I): correct regardless of what runtime (if
/// any) the embedder is using, at the cost of the caller awaiting the
/// handler to completion itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineCoordinator;

impl<S: Send + Sync> CommandExecutionCoordinator<S> for InlineCoordinator {
    fn coordinate<'a>(
        &'a self,
        handler: &'a dyn CommandHandler<S>,
        context: &'a mut CommandContext<S>,
    ) -> BoxFuture<'a, HandlerOutcome> {
        handler.execute(context)
    }
}

/// Spawns the handler's future onto a [`tokio::runtime::Handle`], so a slow
/// handler doesn't block whatever called `coordinate` (§4.I).
///
/// Requires `S: 'static` and the context to be owned by the spawned task:
/// callers that need the context back afterwards (to inspect bound
/// arguments post-execution) should prefer [`InlineCoordinator`] instead,
/// since a spawned task cannot borrow across the `'a` lifetime the trait
/// method signature offers. `AsyncCoordinator` is therefore exposed as a
/// convenience entry point ([`Self::spawn_owned`]) rather than through
/// [`CommandExecutionCoordinator`] itself.
#[derive(Clone)]
pub struct AsyncCoordinator {
    handle: tokio::runtime::Handle,
}

impl AsyncCoordinator {
    /// Builds a coordinator that spawns onto the given runtime handle.
    #[must_use]
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Spawns a handler with an owned context, returning a [`JoinOutcome`]
    /// future resolving once the handler completes on the runtime.
    pub fn spawn_owned<S>(
        &self,
        handler: Arc<dyn CommandHandler<S>>,
        mut context: CommandContext<S>,
    ) -> BoxFuture<'static, JoinOutcome>
    where
        S: Send + 'static,
    {
        let join = self.handle.spawn(async move {
            let outcome = handler.execute(&mut context).await;
            (context, outcome)
        });
        async move {
            match join.await {
                Ok((context, outcome)) => JoinOutcome::Completed(context, outcome),
                Err(_) => JoinOutcome::Cancelled,
            }
        }
        .boxed()
    }
}

/// The result of awaiting an [`AsyncCoordinator::spawn_owned`] future.
pub enum JoinOutcome<S = ()> {
    /// The handler ran to completion (or failure); the context is handed
    /// back so the caller can inspect what was bound.
    Completed(CommandContext<S>, HandlerOutcome),
    /// The spawned task panicked or the runtime was shut down first.
    Cancelled,
}
