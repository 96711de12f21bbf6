//! The exception controller: routes a failed command to the most specific
//! handler registered for its kind, falling back to a catch-all (§4.H).
//!
//! Rust has no runtime class hierarchy to walk the way the Java source's
//! controller does ("walk from the thrown type up to `Throwable`"), so
//! specificity here is an explicit small integer attached at registration
//! time: a handler for one exact [`crate::error::CommandErrorKind`] variant
//! is more specific than one for a whole category, which is more specific
//! than the catch-all. Ties (same specificity, multiple matches) are broken
//! by registration order, latest wins (§4.D.4, §4.H: "break ties by
//! registration order (last wins)").
use std::sync::Arc;

use crate::context::CommandContext;
use crate::error::{CommandError, CommandErrorKind};

/// How precisely a registered handler targets an error kind. Higher wins.
pub type Specificity = u8;

/// The catch-all specificity: matches anything, used as the last resort.
pub const CATCH_ALL: Specificity = 0;
/// The specificity of a handler registered for one whole error category
/// (e.g. "any argument-parse failure").
pub const CATEGORY: Specificity = 1;
/// The specificity of a handler registered for one exact error shape (e.g.
/// "missing flag named x"), the most specific level this controller
/// distinguishes.
pub const EXACT: Specificity = 2;

type Matcher = Arc<dyn Fn(&CommandErrorKind) -> bool + Send + Sync>;
type Handler<S> = Arc<dyn Fn(&CommandContext<S>, &CommandError) + Send + Sync>;

struct Registration<S> {
    specificity: Specificity,
    matches: Matcher,
    handle: Handler<S>,
}

/// Dispatches a [`CommandError`] to the best-matching registered handler.
pub struct ExceptionController<S> {
    registrations: Vec<Registration<S>>,
}

impl<S> ExceptionController<S> {
    /// An empty controller: [`Self::dispatch`] returns `false` until at
    /// least one handler (typically a [`CATCH_ALL`] one) is registered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }

    /// Registers a handler for every [`CommandErrorKind`] `matches` accepts,
    /// at the given specificity.
    pub fn register(
        &mut self,
        specificity: Specificity,
        matches: impl Fn(&CommandErrorKind) -> bool + Send + Sync + 'static,
        handle: impl Fn(&CommandContext<S>, &CommandError) + Send + Sync + 'static,
    ) {
        self.registrations.push(Registration {
            specificity,
            matches: Arc::new(matches),
            handle: Arc::new(handle),
        });
    }

    /// Registers a handler invoked for every error kind, regardless of
    /// anything more specific also matching it unless a higher-specificity
    /// registration also matches.
    pub fn catch_all(&mut self, handle: impl Fn(&CommandContext<S>, &CommandError) + Send + Sync + 'static) {
        self.register(CATCH_ALL, |_| true, handle);
    }

    /// Registers a handler for [`CommandErrorKind::ArgumentParse`] failures.
    pub fn on_argument_parse(&mut self, handle: impl Fn(&CommandContext<S>, &CommandError) + Send + Sync + 'static) {
        self.register(
            CATEGORY,
            |kind| matches!(kind, CommandErrorKind::ArgumentParse(_)),
            handle,
        );
    }

    /// Registers a handler for [`CommandErrorKind::NoPermission`] failures.
    pub fn on_no_permission(&mut self, handle: impl Fn(&CommandContext<S>, &CommandError) + Send + Sync + 'static) {
        self.register(
            CATEGORY,
            |kind| matches!(kind, CommandErrorKind::NoPermission { .. }),
            handle,
        );
    }

    /// Registers a handler for [`CommandErrorKind::InvalidCommandSender`] failures.
    pub fn on_invalid_sender(&mut self, handle: impl Fn(&CommandContext<S>, &CommandError) + Send + Sync + 'static) {
        self.register(
            CATEGORY,
            |kind| matches!(kind, CommandErrorKind::InvalidCommandSender { .. }),
            handle,
        );
    }

    /// Finds the highest-specificity match (ties broken by registration
    /// order) and invokes it. Returns whether a handler was found.
    pub fn dispatch(&self, context: &CommandContext<S>, error: &CommandError) -> bool {
        let mut best: Option<&Registration<S>> = None;
        for registration in &self.registrations {
            if !(registration.matches)(&error.kind) {
                continue;
            }
            let better = match best {
                None => true,
                Some(current) => registration.specificity >= current.specificity,
            };
            if better {
                best = Some(registration);
            }
        }

        match best {
            Some(registration) => {
                (registration.handle)(context, error);
                true
            }
            None => false,
        }
    }
}

impl<S> Default for ExceptionController<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn ctx() -> CommandContext<()> {
        CommandContext::new(())
    }

    #[test]
    fn most_specific_handler_wins_over_catch_all() {
        let seen = Arc::new(Mutex::new(String::new()));
        let mut controller = ExceptionController::<()>::new();

        let seen_catch_all = seen.clone();
        controller.catch_all(move |_, _| *seen_catch_all.lock() = "catch_all".to_string());

        let seen_permission = seen.clone();
        controller.on_no_permission(move |_, _| *seen_permission.lock() = "permission".to_string());

        let error = CommandError::new(
            "give",
            CommandErrorKind::NoPermission {
                permission: "give.use".into(),
            },
        );
        assert!(controller.dispatch(&ctx(), &error));
        assert_eq!(*seen.lock(), "permission");
    }

    #[test]
    fn last_registered_wins_among_equal_specificity() {
        let seen = Arc::new(Mutex::new(String::new()));
        let mut controller = ExceptionController::<()>::new();

        let first = seen.clone();
        controller.catch_all(move |_, _| *first.lock() = "first".to_string());
        let second = seen.clone();
        controller.catch_all(move |_, _| *second.lock() = "second".to_string());

        let error = CommandError::new(
            "",
            CommandErrorKind::NoSuchCommand {
                supplied: "x".into(),
            },
        );
        controller.dispatch(&ctx(), &error);
        assert_eq!(*seen.lock(), "second");
    }

    #[test]
    fn no_match_returns_false() {
        let controller = ExceptionController::<()>::new();
        let error = CommandError::new(
            "",
            CommandErrorKind::NoSuchCommand {
                supplied: "x".into(),
            },
        );
        assert!(!controller.dispatch(&ctx(), &error));
    }
}
