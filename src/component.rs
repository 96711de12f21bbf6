//! Command components: the typed slots that make up a command's path.
use std::sync::Arc;

use crate::context::CommandContext;
use crate::coordinator::CommandHandler;
use crate::error::ArgumentParseError;
use crate::flag::FlagSet;
use crate::input::CommandInput;
use crate::key::TypedKey;
use crate::parser::{ArgumentParser, Suggestion};
use crate::permission::Permission;
use crate::sender::SenderRequirement;

/// A type-erased [`ArgumentParser`] that also knows how to bind its result
/// into a [`CommandContext`] under a fixed [`TypedKey`].
///
/// The tree and the flag subsystem both need to hold parsers for many
/// different `T`s side by side (a node's children, a command's flags); this
/// is the object-safe seam that makes that possible without the tree
/// itself being generic over every argument's value type (Design Note 1).
pub trait DynArgumentParser<S>: Send + Sync {
    /// Parses one value and binds it into the context. On failure, leaves
    /// `input`'s cursor where [`ArgumentParser::parse`] left it.
    fn parse_and_bind(
        &self,
        context: &mut CommandContext<S>,
        input: &mut CommandInput,
    ) -> Result<(), ArgumentParseError>;

    /// Forwards to the wrapped parser's suggestions.
    fn suggestions(&self, context: &CommandContext<S>, partial: &str) -> Vec<Suggestion>;

    /// A short name for the produced value's type, e.g. `"integer"`.
    fn value_type_name(&self) -> &'static str;
}

/// Binds a concrete [`ArgumentParser<S, T>`] to a [`TypedKey<T>`], erasing
/// `T` behind [`DynArgumentParser`].
pub struct TypedComponentParser<S, T> {
    key: TypedKey<T>,
    parser: Arc<dyn ArgumentParser<S, T>>,
}

impl<S, T> TypedComponentParser<S, T> {
    /// Pairs a parser with the key its result will be bound under.
    #[must_use]
    pub fn new(key: TypedKey<T>, parser: impl ArgumentParser<S, T> + 'static) -> Self {
        Self {
            key,
            parser: Arc::new(parser),
        }
    }
}

impl<S, T: Send + Sync + 'static> DynArgumentParser<S> for TypedComponentParser<S, T> {
    fn parse_and_bind(
        &self,
        context: &mut CommandContext<S>,
        input: &mut CommandInput,
    ) -> Result<(), ArgumentParseError> {
        let value = self.parser.parse(context, input)?;
        context.set(self.key, value);
        Ok(())
    }

    fn suggestions(&self, context: &CommandContext<S>, partial: &str) -> Vec<Suggestion> {
        self.parser.suggestions(context, partial)
    }

    fn value_type_name(&self) -> &'static str {
        self.parser.value_type_name()
    }
}

/// A default value for an optional [`CommandComponent`]: either a fixed
/// value or a producer evaluated lazily against the context (for defaults
/// that depend on earlier-bound arguments or the sender).
pub enum Default_<S, T> {
    /// A value known ahead of time.
    Value(T),
    /// A producer evaluated when the component is skipped at parse time.
    Deferred(Arc<dyn Fn(&CommandContext<S>) -> T + Send + Sync>),
}

impl<S, T: Clone> Default_<S, T> {
    /// Produces the default, given the context as it stood when the
    /// component was skipped.
    pub fn resolve(&self, context: &CommandContext<S>) -> T {
        match self {
            Self::Value(value) => value.clone(),
            Self::Deferred(producer) => producer(context),
        }
    }
}

/// A type-erased [`Default_`], bound to the [`TypedKey`] it resolves into
/// (Design Note 1): the tree holds one of these per optional [`ComponentKind::Variable`]
/// that declares a default, without the tree itself being generic over `T`.
pub trait DynDefault<S>: Send + Sync {
    /// Resolves this default against `context` and binds it under its key.
    fn bind(&self, context: &mut CommandContext<S>);
}

struct TypedDefault<S, T> {
    key: TypedKey<T>,
    default: Default_<S, T>,
}

impl<S, T: Clone + Send + Sync + 'static> DynDefault<S> for TypedDefault<S, T> {
    fn bind(&self, context: &mut CommandContext<S>) {
        let value = self.default.resolve(context);
        context.set(self.key, value);
    }
}

/// A preprocessor step run against one component's consumed token, after
/// its parser has already succeeded, e.g. an extra validator (§3).
pub type ComponentPreprocessor<S> =
    Arc<dyn Fn(&mut CommandContext<S>, &CommandInput) -> Result<(), ArgumentParseError> + Send + Sync>;

/// One slot in a command's path: either a literal word (with aliases) or a
/// typed variable.
pub enum ComponentKind<S> {
    /// A fixed word, plus any aliases that resolve to the same node.
    Literal {
        /// The canonical name, used in syntax rendering and as the node's
        /// primary identity for conflict detection.
        name: &'static str,
        /// Alternative spellings accepted in the sender's place.
        aliases: Vec<&'static str>,
    },
    /// A typed value, parsed by `parser` and bound under `name`.
    Variable {
        /// The argument's name, used as its context key and in syntax
        /// rendering (`<name>`/`[name]`).
        name: &'static str,
        /// The type-erased parser/binder.
        parser: Arc<dyn DynArgumentParser<S>>,
        /// Bound into the context in place of this component when it's
        /// optional and the sender omits it (§3). `None` leaves the key
        /// unset, same as before defaults existed.
        default: Option<Arc<dyn DynDefault<S>>>,
    },
    /// A flag container: always the last component on its path (§4.F).
    Flags(Arc<FlagSet<S>>),
}

/// One slot in a command's path, with its requiredness and optional
/// default/preprocessors.
pub struct CommandComponent<S> {
    pub(crate) kind: ComponentKind<S>,
    pub(crate) required: bool,
    pub(crate) description: Option<&'static str>,
    pub(crate) preprocessors: Vec<ComponentPreprocessor<S>>,
}

impl<S> CommandComponent<S> {
    /// A required literal component.
    #[must_use]
    pub fn literal(name: &'static str) -> Self {
        Self {
            kind: ComponentKind::Literal {
                name,
                aliases: Vec::new(),
            },
            required: true,
            description: None,
            preprocessors: Vec::new(),
        }
    }

    /// Adds an alias that resolves to this same literal node.
    #[must_use]
    pub fn alias(mut self, alias: &'static str) -> Self {
        if let ComponentKind::Literal { aliases, .. } = &mut self.kind {
            aliases.push(alias);
        }
        self
    }

    /// A required typed variable component.
    #[must_use]
    pub fn required<T: Send + Sync + 'static>(
        name: &'static str,
        key: TypedKey<T>,
        parser: impl ArgumentParser<S, T> + 'static,
    ) -> Self {
        Self {
            kind: ComponentKind::Variable {
                name,
                parser: Arc::new(TypedComponentParser::new(key, parser)),
                default: None,
            },
            required: true,
            description: None,
            preprocessors: Vec::new(),
        }
    }

    /// An optional typed variable component, left unset in the context when
    /// the sender omits it. Use [`Self::optional_with_default`] instead if a
    /// skipped occurrence should bind a value (§3, §8).
    #[must_use]
    pub fn optional<T: Send + Sync + 'static>(
        name: &'static str,
        key: TypedKey<T>,
        parser: impl ArgumentParser<S, T> + 'static,
    ) -> Self {
        let mut component = Self::required(name, key, parser);
        component.required = false;
        component
    }

    /// An optional typed variable component bound to `default` when the
    /// sender omits it (§3, §8: scenario 2's `give <player> [amount]`).
    #[must_use]
    pub fn optional_with_default<T: Send + Sync + Clone + 'static>(
        name: &'static str,
        key: TypedKey<T>,
        parser: impl ArgumentParser<S, T> + 'static,
        default: Default_<S, T>,
    ) -> Self
    where
        S: 'static,
    {
        let mut component = Self::optional(name, key, parser);
        if let ComponentKind::Variable { default: slot, .. } = &mut component.kind {
            *slot = Some(Arc::new(TypedDefault { key, default }));
        }
        component
    }

    /// A flag container component; always optional and always terminal.
    #[must_use]
    pub fn flags(flags: FlagSet<S>) -> Self {
        Self {
            kind: ComponentKind::Flags(Arc::new(flags)),
            required: false,
            description: None,
            preprocessors: Vec::new(),
        }
    }

    /// Attaches a human-readable description, surfaced by the help handler.
    #[must_use]
    pub fn description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Appends a preprocessor run after this component's parser succeeds.
    #[must_use]
    pub fn preprocessor(mut self, preprocessor: ComponentPreprocessor<S>) -> Self {
        self.preprocessors.push(preprocessor);
        self
    }

    /// Whether this component must be present for the path to match.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// This component's kind (literal, variable, or flag container).
    #[must_use]
    pub const fn kind(&self) -> &ComponentKind<S> {
        &self.kind
    }

    /// The component's name (literal's canonical name, or the variable's
    /// argument name).
    #[must_use]
    pub fn name(&self) -> &'static str {
        match &self.kind {
            ComponentKind::Literal { name, .. } | ComponentKind::Variable { name, .. } => name,
            ComponentKind::Flags(_) => "--",
        }
    }
}

/// A fully built, immutable command: a path of [`CommandComponent`]s plus
/// the handler metadata attached to its terminal node.
pub struct Command<S> {
    pub(crate) path: Vec<CommandComponent<S>>,
    pub(crate) permission: Permission,
    pub(crate) sender_requirement: SenderRequirement<S>,
    pub(crate) description: Option<&'static str>,
    pub(crate) handler: Arc<dyn CommandHandler<S>>,
}

fn noop_handler<S>() -> Arc<dyn CommandHandler<S>> {
    Arc::new(|_: &mut CommandContext<S>| async { Ok(()) })
}

impl<S> Command<S> {
    /// Starts building a command rooted at the given literal name.
    ///
    /// The built command's handler defaults to a no-op that succeeds
    /// immediately; real commands attach their behavior with
    /// [`CommandBuilder::handler`].
    #[must_use]
    pub fn builder(root: &'static str) -> CommandBuilder<S> {
        CommandBuilder {
            path: vec![CommandComponent::literal(root)],
            permission: Permission::none(),
            sender_requirement: SenderRequirement::any(),
            description: None,
            handler: noop_handler(),
        }
    }

    /// The command's full component path, root literal first.
    #[must_use]
    pub fn path(&self) -> &[CommandComponent<S>] {
        &self.path
    }

    /// The permission required to invoke this command.
    #[must_use]
    pub const fn permission(&self) -> &Permission {
        &self.permission
    }

    /// The sender-type requirement for this command.
    #[must_use]
    pub const fn sender_requirement(&self) -> &SenderRequirement<S> {
        &self.sender_requirement
    }

    /// The command's human-readable description, if any (surfaced by the
    /// help handler).
    #[must_use]
    pub const fn description(&self) -> Option<&'static str> {
        self.description
    }

    /// The handler to invoke once this command is fully matched.
    #[must_use]
    pub fn handler(&self) -> &Arc<dyn CommandHandler<S>> {
        &self.handler
    }
}

/// Builds a [`Command`], validating the required-after-optional invariant
/// (§8) at [`CommandBuilder::build`].
pub struct CommandBuilder<S> {
    path: Vec<CommandComponent<S>>,
    permission: Permission,
    sender_requirement: SenderRequirement<S>,
    description: Option<&'static str>,
    handler: Arc<dyn CommandHandler<S>>,
}

/// Why a [`CommandBuilder::build`] call was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandBuildError {
    /// A required component was declared after an optional one (§8).
    #[error("required component '{required}' follows optional component '{optional}'")]
    RequiredAfterOptional {
        /// The optional component's name.
        optional: String,
        /// The required component that illegally follows it.
        required: String,
    },
}

impl<S> CommandBuilder<S> {
    /// Appends a component to the path.
    #[must_use]
    pub fn then(mut self, component: CommandComponent<S>) -> Self {
        self.path.push(component);
        self
    }

    /// Adds an alias for the command's root literal.
    #[must_use]
    pub fn alias(mut self, alias: &'static str) -> Self {
        if let Some(root) = self.path.first_mut() {
            if let ComponentKind::Literal { aliases, .. } = &mut root.kind {
                aliases.push(alias);
            }
        }
        self
    }

    /// Sets the permission required to invoke the built command.
    #[must_use]
    pub fn permission(mut self, permission: impl Into<Permission>) -> Self {
        self.permission = permission.into();
        self
    }

    /// Sets the sender-type requirement for the built command.
    #[must_use]
    pub fn requires_sender(mut self, requirement: SenderRequirement<S>) -> Self {
        self.sender_requirement = requirement;
        self
    }

    /// Sets the command's human-readable description.
    #[must_use]
    pub fn description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Attaches the handler run once this command is fully matched,
    /// replacing the no-op default.
    #[must_use]
    pub fn handler(mut self, handler: impl CommandHandler<S> + 'static) -> Self {
        self.handler = Arc::new(handler);
        self
    }

    /// Validates and finalizes the command.
    ///
    /// # Errors
    /// [`CommandBuildError::RequiredAfterOptional`] if a required component
    /// follows an optional one anywhere on the path.
    pub fn build(self) -> Result<Command<S>, CommandBuildError> {
        let mut last_optional: Option<&'static str> = None;
        for component in &self.path {
            if let ComponentKind::Flags(_) = component.kind {
                continue;
            }
            if component.is_required() {
                if let Some(optional) = last_optional {
                    return Err(CommandBuildError::RequiredAfterOptional {
                        optional: optional.to_string(),
                        required: component.name().to_string(),
                    });
                }
            } else {
                last_optional = Some(component.name());
            }
        }

        Ok(Command {
            path: self.path,
            permission: self.permission,
            sender_requirement: self.sender_requirement,
            description: self.description,
            handler: self.handler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::string::{StringMode, StringParser};

    const NAME: TypedKey<String> = TypedKey::new("name");
    const AMOUNT: TypedKey<i64> = TypedKey::new("amount");

    #[test]
    fn required_after_optional_is_rejected() {
        let result = Command::<()>::builder("give")
            .then(CommandComponent::optional(
                "name",
                NAME,
                StringParser::new("name", StringMode::Single),
            ))
            .then(CommandComponent::required(
                "amount",
                AMOUNT,
                crate::parser::numeric::IntegerParser::new("amount", None),
            ))
            .build();
        assert!(matches!(
            result,
            Err(CommandBuildError::RequiredAfterOptional { .. })
        ));
    }

    #[test]
    fn required_then_optional_builds_fine() {
        let result = Command::<()>::builder("give")
            .then(CommandComponent::required(
                "name",
                NAME,
                StringParser::new("name", StringMode::Single),
            ))
            .then(CommandComponent::optional(
                "amount",
                AMOUNT,
                crate::parser::numeric::IntegerParser::new("amount", None),
            ))
            .build();
        assert!(result.is_ok());
    }
}
