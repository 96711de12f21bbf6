//! The flag subsystem: `--name value`, presence flags, short forms, and the
//! `--` terminator (§4.F). A [`FlagSet`] is always the last component on a
//! command's path, consuming whatever remains of the input after the
//! positional components have matched.
use std::collections::HashSet;
use std::sync::Arc;

use crate::component::DynArgumentParser;
use crate::context::CommandContext;
use crate::error::ArgumentParseError;
use crate::input::CommandInput;
use crate::key::TypedKey;
use crate::parser::Suggestion;

/// Recognizes a token as flag-shaped: `--name` (long), `-n`/`-abc` (short,
/// letters only), or the bare `--` terminator.
///
/// Used both by the flag subsystem itself and by
/// [`crate::parser::string::StringMode::GreedyFlagAware`] to know where a
/// preceding greedy positional must stop.
#[must_use]
pub fn looks_like_flag(token: &str) -> bool {
    if token == "--" {
        return true;
    }
    if let Some(rest) = token.strip_prefix("--") {
        return !rest.is_empty();
    }
    if let Some(rest) = token.strip_prefix('-') {
        return !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphabetic());
    }
    false
}

enum FlagKind<S> {
    /// Bound `true` when the flag is seen; never bound otherwise. Readers
    /// should treat an absent key as `false`.
    Presence(TypedKey<bool>),
    /// Consumes one value from the input via the wrapped parser.
    Value(Arc<dyn DynArgumentParser<S>>),
}

struct FlagDefinition<S> {
    long: &'static str,
    short: Option<char>,
    required: bool,
    repeatable: bool,
    kind: FlagKind<S>,
}

/// The set of flags a command's [`crate::component::CommandComponent::flags`]
/// accepts, built once and shared behind an `Arc`.
pub struct FlagSet<S> {
    flags: Vec<FlagDefinition<S>>,
    allow_short_grouping: bool,
}

impl<S> FlagSet<S> {
    /// An empty flag set, short-form grouping enabled by default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flags: Vec::new(),
            allow_short_grouping: true,
        }
    }

    /// Disables grouping multiple short flags behind one dash (`-abc`); each
    /// short flag must then be passed on its own (`-a -b -c`).
    #[must_use]
    pub fn without_short_grouping(mut self) -> Self {
        self.allow_short_grouping = false;
        self
    }

    /// Adds a presence flag: bound `true` under `key` when seen, otherwise
    /// left unbound.
    #[must_use]
    pub fn presence(mut self, long: &'static str, short: Option<char>, key: TypedKey<bool>) -> Self {
        self.flags.push(FlagDefinition {
            long,
            short,
            required: false,
            repeatable: false,
            kind: FlagKind::Presence(key),
        });
        self
    }

    /// Adds a value flag: its argument is parsed and bound by `parser`
    /// (typically a [`crate::component::TypedComponentParser`]).
    #[must_use]
    pub fn value(
        mut self,
        long: &'static str,
        short: Option<char>,
        required: bool,
        parser: Arc<dyn DynArgumentParser<S>>,
    ) -> Self {
        self.flags.push(FlagDefinition {
            long,
            short,
            required,
            repeatable: false,
            kind: FlagKind::Value(parser),
        });
        self
    }

    /// Marks the most recently added flag as repeatable (no
    /// [`ArgumentParseError::DuplicateFlag`] on repeat occurrences).
    #[must_use]
    pub fn repeatable(mut self) -> Self {
        if let Some(last) = self.flags.last_mut() {
            last.repeatable = true;
        }
        self
    }

    fn find_long(&self, name: &str) -> Option<&FlagDefinition<S>> {
        self.flags.iter().find(|def| def.long == name)
    }

    fn find_short(&self, short: char) -> Option<&FlagDefinition<S>> {
        self.flags.iter().find(|def| def.short == Some(short))
    }

    /// Consumes every remaining token as a flag occurrence, stopping at a
    /// bare `--` (which is itself consumed) or at end of input.
    ///
    /// # Errors
    /// [`ArgumentParseError::UnknownFlag`], [`ArgumentParseError::DuplicateFlag`],
    /// or [`ArgumentParseError::MissingFlag`] (for unsatisfied required flags,
    /// checked once the loop ends).
    pub fn parse(
        &self,
        context: &mut CommandContext<S>,
        input: &mut CommandInput,
    ) -> Result<(), ArgumentParseError> {
        let mut seen: HashSet<&'static str> = HashSet::new();

        loop {
            let Some(token) = input.peek_token() else {
                break;
            };
            if !looks_like_flag(token) {
                break;
            }
            if self.parse_one(context, input, &mut seen)? {
                break;
            }
        }

        self.check_required(&seen)
    }

    /// Consumes a single flag occurrence from `input`: a long flag, a short
    /// flag (or short group), or the bare `--` terminator. The caller must
    /// have already confirmed the peeked token is flag-shaped.
    ///
    /// Returns `true` if the consumed token was the `--` terminator, in
    /// which case the caller should stop treating subsequent tokens as
    /// flags. `seen` accumulates across calls so a command tree walk that
    /// interleaves flag occurrences with positional components (§4.F) can
    /// track them all before the final [`Self::check_required`] call.
    ///
    /// # Errors
    /// [`ArgumentParseError::UnknownFlag`] or [`ArgumentParseError::DuplicateFlag`].
    pub(crate) fn parse_one(
        &self,
        context: &mut CommandContext<S>,
        input: &mut CommandInput,
        seen: &mut HashSet<&'static str>,
    ) -> Result<bool, ArgumentParseError> {
        let raw = input
            .read_string()
            .expect("caller confirmed the peeked token is flag-shaped");
        if raw == "--" {
            return Ok(true);
        }
        if let Some(name) = raw.strip_prefix("--") {
            self.apply_long(name, context, input, seen)?;
        } else if let Some(chars) = raw.strip_prefix('-') {
            self.apply_short(chars, context, input, seen)?;
        }
        Ok(false)
    }

    /// Verifies every required flag was among `seen`, once no more flag
    /// occurrences remain in the input.
    ///
    /// # Errors
    /// [`ArgumentParseError::MissingFlag`] for the first unsatisfied required
    /// flag.
    pub(crate) fn check_required(&self, seen: &HashSet<&'static str>) -> Result<(), ArgumentParseError> {
        for def in &self.flags {
            if def.required && !seen.contains(def.long) {
                return Err(ArgumentParseError::MissingFlag {
                    name: def.long.to_string(),
                });
            }
        }
        Ok(())
    }

    fn apply_long(
        &self,
        name: &str,
        context: &mut CommandContext<S>,
        input: &mut CommandInput,
        seen: &mut HashSet<&'static str>,
    ) -> Result<(), ArgumentParseError> {
        let Some(def) = self.find_long(name) else {
            return Err(ArgumentParseError::UnknownFlag {
                name: name.to_string(),
            });
        };
        if seen.contains(def.long) && !def.repeatable {
            return Err(ArgumentParseError::DuplicateFlag {
                name: def.long.to_string(),
            });
        }
        match &def.kind {
            FlagKind::Presence(key) => context.set(*key, true),
            FlagKind::Value(parser) => parser.parse_and_bind(context, input)?,
        }
        seen.insert(def.long);
        Ok(())
    }

    fn apply_short(
        &self,
        chars: &str,
        context: &mut CommandContext<S>,
        input: &mut CommandInput,
        seen: &mut HashSet<&'static str>,
    ) -> Result<(), ArgumentParseError> {
        if !self.allow_short_grouping {
            return self.apply_short_char(chars, context, input, seen, true);
        }
        let group: Vec<char> = chars.chars().collect();
        for (index, ch) in group.iter().enumerate() {
            let is_last = index + 1 == group.len();
            let mut buf = [0u8; 4];
            self.apply_short_char(ch.encode_utf8(&mut buf), context, input, seen, is_last)?;
        }
        Ok(())
    }

    fn apply_short_char(
        &self,
        token: &str,
        context: &mut CommandContext<S>,
        input: &mut CommandInput,
        seen: &mut HashSet<&'static str>,
        allow_value: bool,
    ) -> Result<(), ArgumentParseError> {
        let ch = token.chars().next().unwrap_or(' ');
        let Some(def) = self.find_short(ch) else {
            return Err(ArgumentParseError::UnknownFlag {
                name: ch.to_string(),
            });
        };
        if seen.contains(def.long) && !def.repeatable {
            return Err(ArgumentParseError::DuplicateFlag {
                name: def.long.to_string(),
            });
        }
        match &def.kind {
            FlagKind::Presence(key) => context.set(*key, true),
            FlagKind::Value(parser) => {
                if !allow_value {
                    return Err(ArgumentParseError::UnknownFlag {
                        name: ch.to_string(),
                    });
                }
                parser.parse_and_bind(context, input)?;
            }
        }
        seen.insert(def.long);
        Ok(())
    }

    /// Renders this flag set's syntax hint, e.g. `"[--force] [--reason <string>]"`
    /// (§4.J: flag container syntax).
    #[must_use]
    pub fn render_syntax(&self) -> String {
        self.flags
            .iter()
            .map(|def| match &def.kind {
                FlagKind::Presence(_) => format!("[--{}]", def.long),
                FlagKind::Value(parser) => format!("[--{} <{}>]", def.long, parser.value_type_name()),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Suggestions for the token currently being typed: flag names when
    /// `partial` starts with a dash, or the value parser's own suggestions
    /// when `partial` follows a known value flag.
    #[must_use]
    pub fn suggestions(&self, context: &CommandContext<S>, partial: &str) -> Vec<Suggestion> {
        if partial.starts_with('-') {
            let candidates: Vec<String> = self
                .flags
                .iter()
                .map(|def| format!("--{}", def.long))
                .chain(self.flags.iter().filter_map(|def| def.short).map(|c| format!("-{c}")))
                .collect();
            return crate::parser::filter_by_prefix(candidates.iter().map(String::as_str), partial);
        }
        Vec::new()
    }
}

impl<S> Default for FlagSet<S> {
    fn default() -> Self {
        Self::new()
    }
}
