//! The command manager: the facade tying the parser registry, tree,
//! exception controller, processor chain, and coordinator together, and
//! driving the manager's one-way lifecycle state machine (§3, §4.K).
use std::sync::Arc;

use parking_lot::Mutex;

use crate::component::Command;
use crate::context::CommandContext;
use crate::coordinator::{CommandExecutionCoordinator, HandlerError, InlineCoordinator};
use crate::error::{CommandError, CommandErrorKind};
use crate::exception::ExceptionController;
use crate::help::HelpHandler;
use crate::input::CommandInput;
use crate::parser::{ArgumentParser, ParserRegistry, Suggestion};
use crate::permission::PermissionChecked;
use crate::preprocessor::{PostprocessAction, Postprocessor, Preprocessor, ProcessorChain};
use crate::sender::SenderRequirement;
use crate::tree::{CommandTree, InsertError};

/// Case-sensitivity and coordinator policy, frozen at the
/// `BeforeRegistration → Registering` transition (§3: `CommandManagerSettings`).
#[derive(Debug, Clone)]
pub struct CommandManagerSettings {
    /// Whether literal/alias matching requires exact case (default `false`:
    /// user-facing text is case-insensitive).
    pub case_sensitive_literals: bool,
    /// Whether permission strings are compared byte-for-byte (default
    /// `true`; see §9 Open Question — this split is the recorded decision).
    pub case_sensitive_permissions: bool,
    /// Whether a positional component may overlap with a following flag
    /// container's value parser's name (reserved for embedders that want
    /// stricter conflict checking than the core enforces by default).
    pub overlapping_arguments_allowed: bool,
}

impl Default for CommandManagerSettings {
    fn default() -> Self {
        Self {
            case_sensitive_literals: false,
            case_sensitive_permissions: true,
            overlapping_arguments_allowed: false,
        }
    }
}

/// The manager's one-way lifecycle (§3): configuration may only be mutated
/// up to [`Self::Registering`]; [`Self::AfterRegistration`] freezes
/// everything for lock-free concurrent reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    /// Nothing has been registered yet.
    BeforeRegistration,
    /// At least one registration call has been made; more are still legal.
    Registering,
    /// Registration is closed; the tree and registries are read-only.
    AfterRegistration,
}

impl ManagerState {
    const fn ordinal(self) -> u8 {
        match self {
            Self::BeforeRegistration => 0,
            Self::Registering => 1,
            Self::AfterRegistration => 2,
        }
    }
}

/// Why a manager operation was rejected.
#[derive(Debug, thiserror::Error)]
pub enum CommandManagerError {
    /// A mutating call (`register*`) arrived after the manager had already
    /// transitioned to [`ManagerState::AfterRegistration`].
    #[error("manager has already completed registration")]
    AlreadyRegistered,
    /// An explicit [`CommandManager::transition_to`] call tried to move the
    /// state machine backwards (§8: "State monotonicity").
    #[error("cannot move manager state backwards (from {from:?} to {to:?})")]
    StateRegressed {
        /// The state the manager was in.
        from: ManagerState,
        /// The (illegal, earlier) state that was requested.
        to: ManagerState,
    },
    /// [`CommandTree::insert`] rejected the command.
    #[error(transparent)]
    Insert(#[from] InsertError),
}

/// What a completed dispatch produced, once the exception controller (if
/// any) has had a chance to react (§4.H, §7).
pub enum DispatchOutcome<S> {
    /// The matched command's handler ran to completion without error.
    Executed(CommandContext<S>),
    /// Parsing, a sender/permission check, or the handler itself failed,
    /// and a registered exception handler accepted the failure; the
    /// context reflects whatever was bound up to the point of failure.
    ExceptionHandled(CommandContext<S>),
    /// A postprocessor short-circuited the dispatch after binding succeeded
    /// but before the handler ran, e.g. confirmation middleware holding the
    /// command for a follow-up prompt (§4.D.2 step 8).
    ConsumedWithoutExecuting(CommandContext<S>),
}

impl<S> DispatchOutcome<S> {
    /// The context carried by any variant.
    #[must_use]
    pub const fn context(&self) -> &CommandContext<S> {
        match self {
            Self::Executed(context) | Self::ExceptionHandled(context) | Self::ConsumedWithoutExecuting(context) => {
                context
            }
        }
    }
}

/// Facade over the parser registry, command tree, exception controller,
/// processor chain, and coordinator (§4.K). `S` is the single sender type
/// this manager is parameterized by (Design Note 1).
pub struct CommandManager<S> {
    state: Mutex<ManagerState>,
    settings: CommandManagerSettings,
    tree: CommandTree<S>,
    parsers: ParserRegistry<S>,
    exceptions: ExceptionController<S>,
    processors: ProcessorChain<S>,
    coordinator: Arc<dyn CommandExecutionCoordinator<S>>,
}

impl<S> CommandManager<S>
where
    S: Send + Sync + 'static + PermissionChecked,
{
    /// Builds a manager with the given settings, using the
    /// [`InlineCoordinator`] by default (§4.I: the safe, runtime-agnostic
    /// choice).
    #[must_use]
    pub fn new(settings: CommandManagerSettings) -> Self {
        Self::with_coordinator(settings, Arc::new(InlineCoordinator))
    }

    /// Builds a manager with an explicit coordinator, e.g. one that spawns
    /// handlers onto a `tokio::runtime::Handle`.
    #[must_use]
    pub fn with_coordinator(settings: CommandManagerSettings, coordinator: Arc<dyn CommandExecutionCoordinator<S>>) -> Self {
        Self {
            state: Mutex::new(ManagerState::BeforeRegistration),
            tree: CommandTree::new(settings.case_sensitive_literals),
            settings,
            parsers: ParserRegistry::new(),
            exceptions: ExceptionController::new(),
            processors: ProcessorChain::new(),
            coordinator,
        }
    }

    /// The manager's current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ManagerState {
        *self.state.lock()
    }

    /// The frozen configuration this manager was built with.
    #[must_use]
    pub const fn settings(&self) -> &CommandManagerSettings {
        &self.settings
    }

    /// Advances the manager to `target`, rejecting any attempt to move
    /// backwards (§8: "State monotonicity"). A no-op if already there.
    ///
    /// # Errors
    /// [`CommandManagerError::StateRegressed`] if `target` precedes the
    /// current state.
    pub fn transition_to(&self, target: ManagerState) -> Result<(), CommandManagerError> {
        let mut state = self.state.lock();
        if target.ordinal() < state.ordinal() {
            return Err(CommandManagerError::StateRegressed { from: *state, to: target });
        }
        *state = target;
        Ok(())
    }

    fn ensure_mutable(&self) -> Result<(), CommandManagerError> {
        let mut state = self.state.lock();
        if *state == ManagerState::AfterRegistration {
            return Err(CommandManagerError::AlreadyRegistered);
        }
        *state = ManagerState::Registering;
        Ok(())
    }

    fn freeze(&self) {
        let mut state = self.state.lock();
        if *state != ManagerState::AfterRegistration {
            *state = ManagerState::AfterRegistration;
        }
    }

    /// Registers a built command. Rejects once the manager has frozen.
    ///
    /// # Errors
    /// [`CommandManagerError::AlreadyRegistered`] or
    /// [`CommandManagerError::Insert`] (tree conflict).
    pub fn register(&mut self, command: Command<S>) -> Result<(), CommandManagerError> {
        self.ensure_mutable()?;
        self.tree.insert(command)?;
        Ok(())
    }

    /// Registers the parser used for every component whose value type is
    /// `T` and that doesn't carry its own parser directly (§4.C).
    ///
    /// # Errors
    /// [`CommandManagerError::AlreadyRegistered`] once frozen.
    pub fn register_parser<T: 'static>(
        &mut self,
        parser: impl ArgumentParser<S, T> + 'static,
    ) -> Result<(), CommandManagerError> {
        self.ensure_mutable()?;
        self.parsers.register(parser);
        Ok(())
    }

    /// Registers a named suggestion provider (§4.C).
    ///
    /// # Errors
    /// [`CommandManagerError::AlreadyRegistered`] once frozen.
    pub fn register_suggestion_provider(
        &mut self,
        name: &'static str,
        provider: impl Fn(&CommandContext<S>, &str) -> Vec<Suggestion> + Send + Sync + 'static,
    ) -> Result<(), CommandManagerError> {
        self.ensure_mutable()?;
        self.parsers.register_suggestion_provider(name, provider);
        Ok(())
    }

    /// Appends a preprocessor to the chain run before tree parsing (§4.G).
    ///
    /// # Errors
    /// [`CommandManagerError::AlreadyRegistered`] once frozen.
    pub fn register_preprocessor(&mut self, preprocessor: Preprocessor<S>) -> Result<(), CommandManagerError> {
        self.ensure_mutable()?;
        self.processors.add_preprocessor(preprocessor);
        Ok(())
    }

    /// Appends a postprocessor to the chain run after binding succeeds but
    /// before the handler is invoked (§4.G).
    ///
    /// # Errors
    /// [`CommandManagerError::AlreadyRegistered`] once frozen.
    pub fn register_postprocessor(&mut self, postprocessor: Postprocessor<S>) -> Result<(), CommandManagerError> {
        self.ensure_mutable()?;
        self.processors.add_postprocessor(postprocessor);
        Ok(())
    }

    /// Registers an exception handler at the given specificity (§4.H). Use
    /// [`crate::exception::CATCH_ALL`]/[`crate::exception::CATEGORY`]/
    /// [`crate::exception::EXACT`], or `ExceptionController`'s convenience
    /// methods via [`Self::exceptions_mut`].
    ///
    /// # Errors
    /// [`CommandManagerError::AlreadyRegistered`] once frozen.
    pub fn register_exception_handler(
        &mut self,
        specificity: crate::exception::Specificity,
        matches: impl Fn(&CommandErrorKind) -> bool + Send + Sync + 'static,
        handle: impl Fn(&CommandContext<S>, &CommandError) + Send + Sync + 'static,
    ) -> Result<(), CommandManagerError> {
        self.ensure_mutable()?;
        self.exceptions.register(specificity, matches, handle);
        Ok(())
    }

    /// Direct mutable access to the exception controller, for callers who
    /// want its typed convenience methods (`catch_all`, `on_no_permission`, ...).
    ///
    /// # Errors
    /// [`CommandManagerError::AlreadyRegistered`] once frozen.
    pub fn exceptions_mut(&mut self) -> Result<&mut ExceptionController<S>, CommandManagerError> {
        self.ensure_mutable()?;
        Ok(&mut self.exceptions)
    }

    /// A view over the command tree, e.g. for a help renderer built outside
    /// this crate.
    #[must_use]
    pub const fn tree(&self) -> &CommandTree<S> {
        &self.tree
    }

    /// Resolves a command line against the tree and, on success, runs the
    /// matched handler under this manager's coordinator (§4.D.2, §4.I).
    ///
    /// Freezes the manager to [`ManagerState::AfterRegistration`] on first
    /// call, per §4.K ("the first call to `execute`/`suggest`/`help_query`
    /// implicitly completes the transition").
    pub async fn execute(&self, sender: S, line: &str) -> Result<DispatchOutcome<S>, CommandError> {
        self.freeze();
        let mut context = CommandContext::new(sender);
        let mut input = CommandInput::new(line);

        let result = self.dispatch(&mut context, &mut input);
        match result {
            Ok(command) => {
                if self.processors.run_postprocessors(&context) == PostprocessAction::ConsumedWithoutExecuting {
                    return Ok(DispatchOutcome::ConsumedWithoutExecuting(context));
                }

                let chain = Self::command_chain(&command);
                let handler = command.handler().clone();
                let outcome = self
                    .coordinator
                    .coordinate(handler.as_ref(), &mut context)
                    .await;
                match outcome {
                    Ok(()) => Ok(DispatchOutcome::Executed(context)),
                    Err(cause) => {
                        log::warn!("command handler for '{chain}' failed: {cause}");
                        let error = CommandError::new(chain, CommandErrorKind::CommandExecution(cause));
                        if self.exceptions.dispatch(&context, &error) {
                            Ok(DispatchOutcome::ExceptionHandled(context))
                        } else {
                            Err(error)
                        }
                    }
                }
            }
            Err(error) => {
                if self.exceptions.dispatch(&context, &error) {
                    Ok(DispatchOutcome::ExceptionHandled(context))
                } else {
                    Err(error)
                }
            }
        }
    }

    fn command_chain(command: &Arc<Command<S>>) -> String {
        command
            .path()
            .iter()
            .filter_map(|component| match component.name() {
                "--" => None,
                name => Some(name),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn dispatch(
        &self,
        context: &mut CommandContext<S>,
        input: &mut CommandInput,
    ) -> Result<Arc<Command<S>>, CommandError> {
        self.processors
            .run_preprocessors(context, input)
            .map_err(|kind| CommandError::new(String::new(), kind))?;

        let command = self.tree.parse(context, input)?;

        self.check_sender(context, &command)?;
        self.check_permission(context, &command)?;
        Ok(command)
    }

    fn check_sender(&self, context: &CommandContext<S>, command: &Arc<Command<S>>) -> Result<(), CommandError> {
        let requirement: &SenderRequirement<S> = command.sender_requirement();
        if requirement.is_satisfied_by(context.sender()) {
            Ok(())
        } else {
            Err(CommandError::new(
                Self::command_chain(command),
                CommandErrorKind::InvalidCommandSender {
                    required_type: requirement.name(),
                },
            ))
        }
    }

    fn check_permission(&self, context: &CommandContext<S>, command: &Arc<Command<S>>) -> Result<(), CommandError> {
        let permission = command.permission();
        if permission.is_none() || context.sender().has_permission(permission) {
            Ok(())
        } else {
            Err(CommandError::new(
                Self::command_chain(command),
                CommandErrorKind::NoPermission {
                    permission: permission.as_str().to_string(),
                },
            ))
        }
    }

    /// Tab-completion candidates for a partial command line (§4.D.3). Never
    /// fails; an unresolvable prefix simply yields no suggestions.
    ///
    /// Freezes the manager, same as [`Self::execute`].
    #[must_use]
    pub fn suggest(&self, sender: S, line: &str) -> Vec<Suggestion> {
        self.freeze();
        let mut context = CommandContext::new(sender);
        let mut input = CommandInput::new(line);
        self.tree.suggest(&mut context, &mut input)
    }

    /// Answers a help query over the subset of the tree `sender` is allowed
    /// to see — a command is visible when its sender-type requirement and
    /// permission are both satisfied (§4.J, §6: `help_query(sender, query)`).
    ///
    /// Freezes the manager, same as [`Self::execute`].
    pub fn help_query(&self, sender: &S, query: &str) -> crate::help::HelpResult {
        self.freeze();
        HelpHandler::new(&self.tree).query(query, &|command: &Command<S>| {
            command.sender_requirement().is_satisfied_by(sender)
                && (command.permission().is_none() || sender.has_permission(command.permission()))
        })
    }
}

/// A handler error boxed for [`CommandErrorKind::CommandExecution`], used
/// by embedders whose handlers want to report typed failures uniformly.
#[must_use]
pub fn wrap_handler_error(error: HandlerError) -> CommandErrorKind {
    CommandErrorKind::CommandExecution(error)
}
