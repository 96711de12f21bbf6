//! The typed-argument parser contract, its stock implementations, and the
//! registry that maps a type/name to a parser.
pub mod array;
pub mod boolean;
pub mod either;
pub mod enum_parser;
pub mod literal;
pub mod numeric;
pub mod string;

use std::any::{Any, TypeId};
use std::sync::Arc;

use scc::HashMap;

use crate::context::CommandContext;
use crate::error::ArgumentParseError;
use crate::input::CommandInput;

/// A single tab-completion candidate.
///
/// Kept as a plain string rather than a richer "rich suggestion" type: the
/// core only needs to know which tokens are acceptable next (§4.D.3); any
/// icon/tooltip dressing belongs to the platform integration consuming
/// these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion(pub String);

impl Suggestion {
    /// Wraps a candidate string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl From<&str> for Suggestion {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Suggestion {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// The outcome of a single argument parser's attempt to read from a
/// [`CommandInput`].
///
/// Parsing is modeled as synchronous and CPU-bound (§5: "Parsing is
/// CPU-bound and deterministic"); a parser that genuinely needs to suspend
/// (e.g. to await a lookup) should perform that lookup eagerly before the
/// parse (for instance, by having the command's preprocessor populate the
/// context) rather than through the parser itself. Asynchrony in this
/// crate lives at the [`crate::coordinator`] layer, which governs whether
/// the *handler* runs inline or on an executor.
pub type ParseOutcome<T> = Result<T, ArgumentParseError>;

/// Parses one argument's worth of tokens out of a [`CommandInput`] and
/// offers suggestions for the same position.
///
/// `S` is the manager's sender type, threaded through so a parser can
/// consult the sender (e.g. to scope suggestions to what that sender can
/// see) or earlier-bound context values.
pub trait ArgumentParser<S, T>: Send + Sync {
    /// Attempts to consume `T`'s worth of tokens from `input`.
    ///
    /// On success, `input`'s cursor has advanced past the consumed tokens.
    /// On failure, `input` MUST be left exactly as it was unless the error
    /// documents partial consumption (§8 Cursor discipline).
    fn parse(&self, context: &mut CommandContext<S>, input: &mut CommandInput) -> ParseOutcome<T>;

    /// Returns suggestions for the given partial token. Must not mutate
    /// `input`/`context` beyond reading them (§4.D.3: "never fails").
    fn suggestions(&self, context: &CommandContext<S>, partial: &str) -> Vec<Suggestion>;

    /// A short, human-readable name for this argument's value type, used in
    /// `<expected>`/syntax captions (e.g. `"integer"`).
    fn value_type_name(&self) -> &'static str;
}

type ParserFactory<S> = Arc<dyn Any + Send + Sync>;

/// Maps a descriptor to an [`ArgumentParser`] (by the Rust type it produces)
/// or to a suggestion provider (by name), per §4.C.
///
/// Backed by `scc::HashMap`, same as the teacher's command/handler registry:
/// reads never block a concurrent writer, which matters once a manager is
/// frozen and read from many sender threads at once while registration of a
/// *different* manager instance is still in flight elsewhere in the process.
pub struct ParserRegistry<S> {
    by_type: HashMap<TypeId, ParserFactory<S>>,
    by_name: HashMap<&'static str, Arc<dyn Fn(&CommandContext<S>, &str) -> Vec<Suggestion> + Send + Sync>>,
}

impl<S: 'static> ParserRegistry<S> {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_type: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Registers the parser used whenever a component's value type is `T`
    /// and no more specific parser was attached directly to the component.
    /// Replaces any parser already registered for `T`.
    pub fn register<T: 'static>(&mut self, parser: impl ArgumentParser<S, T> + 'static) {
        let type_id = TypeId::of::<T>();
        let factory: ParserFactory<S> = Arc::new(Arc::new(parser) as Arc<dyn ArgumentParser<S, T>>);
        let _ = self.by_type.remove_sync(&type_id);
        let _ = self.by_type.insert_sync(type_id, factory);
    }

    /// Looks up the parser registered for `T`, if any.
    #[must_use]
    pub fn get<T: 'static>(&self) -> Option<Arc<dyn ArgumentParser<S, T>>> {
        self.by_type.read_sync(&TypeId::of::<T>(), |_, boxed| {
            boxed
                .downcast_ref::<Arc<dyn ArgumentParser<S, T>>>()
                .expect("by_type is keyed by TypeId::of::<T>()")
                .clone()
        })
    }

    /// Registers a named suggestion provider, independent of any particular
    /// component's value type (§4.C: "Suggestion-provider lookup is by
    /// exact name"). Replaces any provider already registered under `name`.
    pub fn register_suggestion_provider(
        &mut self,
        name: &'static str,
        provider: impl Fn(&CommandContext<S>, &str) -> Vec<Suggestion> + Send + Sync + 'static,
    ) {
        let _ = self.by_name.remove_sync(&name);
        let _ = self.by_name.insert_sync(name, Arc::new(provider));
    }

    /// Looks up a named suggestion provider.
    #[must_use]
    pub fn get_suggestion_provider(
        &self,
        name: &str,
    ) -> Option<Arc<dyn Fn(&CommandContext<S>, &str) -> Vec<Suggestion> + Send + Sync>> {
        self.by_name.read_sync(name, |_, provider| provider.clone())
    }
}

impl<S: 'static> Default for ParserRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Filters a list of candidates to those matching `prefix`, per the default
/// suggestion processor (§4.D.3): case-insensitive prefix match, original
/// order preserved.
#[must_use]
pub fn filter_by_prefix<'a>(
    candidates: impl IntoIterator<Item = &'a str>,
    prefix: &str,
) -> Vec<Suggestion> {
    let prefix_lower = prefix.to_lowercase();
    candidates
        .into_iter()
        .filter(|candidate| candidate.to_lowercase().starts_with(&prefix_lower))
        .map(Suggestion::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_by_prefix_preserves_order_and_is_case_insensitive() {
        let candidates = ["Alice", "Albert", "Bob"];
        let result = filter_by_prefix(candidates, "al");
        assert_eq!(
            result,
            vec![Suggestion::new("Alice"), Suggestion::new("Albert")]
        );
    }

    struct EchoParser;

    impl ArgumentParser<(), String> for EchoParser {
        fn parse(
            &self,
            _context: &mut CommandContext<()>,
            input: &mut CommandInput,
        ) -> ParseOutcome<String> {
            input
                .read_string()
                .map_err(|_| ArgumentParseError::NoInputProvided {
                    argument: "echo".into(),
                })
        }

        fn suggestions(&self, _context: &CommandContext<()>, _partial: &str) -> Vec<Suggestion> {
            Vec::new()
        }

        fn value_type_name(&self) -> &'static str {
            "string"
        }
    }

    #[test]
    fn registry_looks_up_parser_by_type() {
        let mut registry = ParserRegistry::<()>::new();
        registry.register::<String>(EchoParser);
        let parser = registry.get::<String>().expect("registered above");
        let mut ctx = CommandContext::new(());
        let mut input = CommandInput::new("hello");
        assert_eq!(parser.parse(&mut ctx, &mut input).unwrap(), "hello");
    }
}
