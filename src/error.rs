//! The error taxonomy produced by parsing, permission checks, and handlers.
use crate::caption::{Caption, CaptionVariables};

/// Failure of a single typed argument parser, before it's wrapped in the
/// tree-level [`CommandError`] that adds the chain prefix.
#[derive(Debug, thiserror::Error)]
pub enum ArgumentParseError {
    /// The argument was required but no more input was left to read.
    #[error("no input provided for argument '{argument}'")]
    NoInputProvided {
        /// The argument's declared name.
        argument: String,
    },
    /// The raw token didn't match the parser's expected shape.
    #[error("'{raw}' is not a valid {expected} (argument '{argument}')")]
    InvalidFormat {
        /// The argument's declared name.
        argument: String,
        /// The text that failed to parse.
        raw: String,
        /// A short description of the expected shape, e.g. `"integer"`.
        expected: &'static str,
    },
    /// A numeric argument fell outside its declared `[min, max]` range.
    #[error("'{input}' is out of range for '{argument}', expected between {min} and {max}")]
    NumberOutOfRange {
        /// The argument's declared name.
        argument: String,
        /// The inclusive lower bound, formatted for display.
        min: String,
        /// The inclusive upper bound, formatted for display.
        max: String,
        /// The offending input text.
        input: String,
    },
    /// A regex-based validator rejected the argument's text.
    #[error("'{input}' does not match the expected pattern for '{argument}'")]
    RegexValidation {
        /// The argument's declared name.
        argument: String,
        /// The pattern that was violated, for display purposes.
        pattern: String,
        /// The offending input text.
        input: String,
    },
    /// A flag name was not recognized by the flag container.
    #[error("unknown flag '--{name}'")]
    UnknownFlag {
        /// The unrecognized flag name.
        name: String,
    },
    /// A required flag was absent.
    #[error("missing required flag '--{name}'")]
    MissingFlag {
        /// The missing flag's name.
        name: String,
    },
    /// A non-repeatable flag was supplied more than once.
    #[error("flag '--{name}' was specified more than once")]
    DuplicateFlag {
        /// The repeated flag's name.
        name: String,
    },
}

impl ArgumentParseError {
    /// The caption identifying this failure, plus its filled-in variables.
    #[must_use]
    pub fn caption(&self) -> (Caption, CaptionVariables) {
        match self {
            Self::NoInputProvided { argument } => (
                Caption::NoInputProvided,
                CaptionVariables::new().with("argument", argument.clone()),
            ),
            Self::InvalidFormat {
                argument,
                raw,
                expected,
            } => (
                Caption::InvalidFormat,
                CaptionVariables::new()
                    .with("argument", argument.clone())
                    .with("input", raw.clone())
                    .with("expected", *expected),
            ),
            Self::NumberOutOfRange {
                argument,
                min,
                max,
                input,
            } => (
                Caption::NumberOutOfRange,
                CaptionVariables::new()
                    .with("argument", argument.clone())
                    .with("min", min.clone())
                    .with("max", max.clone())
                    .with("input", input.clone()),
            ),
            Self::RegexValidation {
                argument,
                pattern,
                input,
            } => (
                Caption::RegexValidation,
                CaptionVariables::new()
                    .with("argument", argument.clone())
                    .with("pattern", pattern.clone())
                    .with("input", input.clone()),
            ),
            Self::UnknownFlag { name } => (
                Caption::UnknownFlag,
                CaptionVariables::new().with("name", name.clone()),
            ),
            Self::MissingFlag { name } => (
                Caption::MissingFlag,
                CaptionVariables::new().with("name", name.clone()),
            ),
            Self::DuplicateFlag { name } => (
                Caption::DuplicateFlag,
                CaptionVariables::new().with("name", name.clone()),
            ),
        }
    }
}

/// The kind of failure a parse/execute traversal produced, without the
/// chain prefix (see [`CommandError`]).
#[derive(Debug, thiserror::Error)]
pub enum CommandErrorKind {
    /// No literal root matched the first token.
    #[error("no such command '{supplied}'")]
    NoSuchCommand {
        /// The token the sender actually typed.
        supplied: String,
    },
    /// Input partially matched a command but diverged from it.
    #[error("invalid syntax, expected: {correct_syntax}")]
    InvalidSyntax {
        /// The full syntax of the command the input was closest to.
        correct_syntax: String,
    },
    /// The matched command exists but the sender lacks its permission.
    #[error("no permission (requires '{permission}')")]
    NoPermission {
        /// The permission string the terminal command requires.
        permission: String,
    },
    /// The sender's runtime type isn't assignable to the command's
    /// required sender type.
    #[error("sender must be a {required_type}")]
    InvalidCommandSender {
        /// The name of the sender type the command requires.
        required_type: &'static str,
    },
    /// An argument parser failed.
    #[error(transparent)]
    ArgumentParse(#[from] ArgumentParseError),
    /// The handler itself returned an error.
    #[error("command execution failed: {0}")]
    CommandExecution(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// A preprocessor detected irresolvable ambiguity.
    #[error("ambiguous command: {detail}")]
    Ambiguous {
        /// A human-readable description of the ambiguity.
        detail: String,
    },
}

impl CommandErrorKind {
    /// The caption identifying this failure, plus its filled-in variables.
    #[must_use]
    pub fn caption(&self) -> (Caption, CaptionVariables) {
        match self {
            Self::NoSuchCommand { supplied } => (
                Caption::NoSuchCommand,
                CaptionVariables::new().with("supplied", supplied.clone()),
            ),
            Self::InvalidSyntax { correct_syntax } => (
                Caption::InvalidSyntax,
                CaptionVariables::new().with("correct_syntax", correct_syntax.clone()),
            ),
            Self::NoPermission { permission } => (
                Caption::NoPermission,
                CaptionVariables::new().with("permission", permission.clone()),
            ),
            Self::InvalidCommandSender { required_type } => (
                Caption::InvalidSender,
                CaptionVariables::new().with("required_type", *required_type),
            ),
            Self::ArgumentParse(inner) => inner.caption(),
            Self::CommandExecution(_) => (Caption::CommandExecution, CaptionVariables::new()),
            Self::Ambiguous { detail } => (
                Caption::Ambiguous,
                CaptionVariables::new().with("detail", detail.clone()),
            ),
        }
    }
}

/// A command-dispatch failure, carrying the chain of literal tokens that
/// were successfully matched before the failure occurred (e.g. `"config"`
/// for an input of `"config re"` that didn't resolve past the root).
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct CommandError {
    /// The command-chain prefix consumed so far, space-joined.
    pub chain: String,
    /// The specific failure.
    #[source]
    pub kind: CommandErrorKind,
}

impl CommandError {
    /// Builds an error, attaching the given chain prefix to a kind.
    #[must_use]
    pub fn new(chain: impl Into<String>, kind: CommandErrorKind) -> Self {
        Self {
            chain: chain.into(),
            kind,
        }
    }

    /// The caption identifying this failure, plus its filled-in variables
    /// (the chain prefix is added under the `chain` placeholder so
    /// formatters that want to show it can, without every template
    /// needing to reference it).
    #[must_use]
    pub fn caption(&self) -> (Caption, CaptionVariables) {
        let (caption, variables) = self.kind.caption();
        (caption, variables.with("chain", self.chain.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_out_of_range_caption_carries_all_variables() {
        let err = ArgumentParseError::NumberOutOfRange {
            argument: "amount".into(),
            min: "1".into(),
            max: "64".into(),
            input: "100".into(),
        };
        let (caption, variables) = err.caption();
        assert_eq!(caption, Caption::NumberOutOfRange);
        assert_eq!(variables.get("input"), Some("100"));
        assert_eq!(variables.get("min"), Some("1"));
        assert_eq!(variables.get("max"), Some("64"));
    }

    #[test]
    fn command_error_caption_includes_chain() {
        let err = CommandError::new(
            "config",
            CommandErrorKind::InvalidSyntax {
                correct_syntax: "config reset".into(),
            },
        );
        let (_, variables) = err.caption();
        assert_eq!(variables.get("chain"), Some("config"));
    }
}
