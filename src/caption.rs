//! Caption keys and the variable bag used to fill in their templates.
//!
//! The core never formats a user-facing string itself (§1, Out of scope):
//! every error path produces a [`Caption`] plus a [`CaptionVariables`] bag,
//! and a caller-supplied [`CaptionFormatter`] substitutes `<placeholder>`
//! tokens into a locale-specific template. [`DefaultCaptionFormatter`] is a
//! reference implementation, good enough for tests and simple embedders,
//! modeled on the teacher's `Translation`/`TranslatedMessage` pair
//! (`steel-utils/src/text/translation.rs`) but keyed by name rather than
//! position, per §6.

/// A stable identifier for a message the core can produce.
///
/// `#[non_exhaustive]` because new captions may be added without it being a
/// breaking change for formatters that already handle the default case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Caption {
    /// No literal root matched the first token.
    NoSuchCommand,
    /// The input partially matched a command but diverged.
    InvalidSyntax,
    /// The sender lacks the permission the matched command requires.
    NoPermission,
    /// The sender's type isn't assignable to the command's required type.
    InvalidSender,
    /// An argument was required but no more input was left to read.
    NoInputProvided,
    /// An argument's raw text didn't match the parser's expected shape.
    InvalidFormat,
    /// A numeric argument fell outside its declared `[min, max]` range.
    NumberOutOfRange,
    /// An argument failed a regex-based validator.
    RegexValidation,
    /// A flag name was not recognized by the flag container.
    UnknownFlag,
    /// A required flag was absent.
    MissingFlag,
    /// A non-repeatable flag was supplied more than once.
    DuplicateFlag,
    /// A preprocessor detected irresolvable ambiguity.
    Ambiguous,
    /// The handler itself returned an error.
    CommandExecution,
}

impl Caption {
    /// The built-in English template for this caption, in `<placeholder>`
    /// form. A [`CaptionFormatter`] is free to ignore this and look the key
    /// up in its own locale table instead.
    #[must_use]
    pub const fn default_template(self) -> &'static str {
        match self {
            Self::NoSuchCommand => "Unknown command '<supplied>'",
            Self::InvalidSyntax => "Invalid syntax, expected: <correct_syntax>",
            Self::NoPermission => "You do not have permission to do that (requires '<permission>')",
            Self::InvalidSender => "This command can only be used by a <required_type>",
            Self::NoInputProvided => "Missing argument '<argument>'",
            Self::InvalidFormat => "'<input>' is not a valid <expected> (argument '<argument>')",
            Self::NumberOutOfRange => {
                "'<input>' is out of range for '<argument>', expected between <min> and <max>"
            }
            Self::RegexValidation => "'<input>' does not match the expected pattern for '<argument>'",
            Self::UnknownFlag => "Unknown flag '--<name>'",
            Self::MissingFlag => "Missing required flag '--<name>'",
            Self::DuplicateFlag => "Flag '--<name>' was specified more than once",
            Self::Ambiguous => "Command is ambiguous: <detail>",
            Self::CommandExecution => "An internal error occurred while running this command",
        }
    }
}

/// An ordered bag of `{placeholder: value}` pairs for a [`Caption`].
///
/// Insertion order is preserved (the teacher's workspace consistently
/// prefers small linear structures over hashing at this scale); lookups
/// during formatting are a short linear scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptionVariables(Vec<(&'static str, String)>);

impl CaptionVariables {
    /// An empty variable bag.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a placeholder binding, builder-style.
    #[must_use]
    pub fn with(mut self, placeholder: &'static str, value: impl Into<String>) -> Self {
        self.0.push((placeholder, value.into()));
        self
    }

    /// Looks up a placeholder's value, if bound.
    #[must_use]
    pub fn get(&self, placeholder: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| *name == placeholder)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over the bound `(placeholder, value)` pairs, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(name, value)| (*name, value.as_str()))
    }
}

/// Formats a [`Caption`] + [`CaptionVariables`] into a user-facing string.
///
/// This is the external collaborator referenced throughout the spec: the
/// core only ever produces `(Caption, CaptionVariables)` pairs.
pub trait CaptionFormatter: Send + Sync {
    /// Formats the given caption, substituting its variables.
    fn format(&self, caption: Caption, variables: &CaptionVariables) -> String;
}

/// A reference [`CaptionFormatter`] that substitutes `<placeholder>` tokens
/// into [`Caption::default_template`], leaving unknown placeholders as
/// literal `<placeholder>` text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCaptionFormatter;

impl CaptionFormatter for DefaultCaptionFormatter {
    fn format(&self, caption: Caption, variables: &CaptionVariables) -> String {
        let mut result = caption.default_template().to_string();
        for (placeholder, value) in variables.iter() {
            let token = format!("<{placeholder}>");
            result = result.replace(&token, value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_placeholders() {
        let variables = CaptionVariables::new().with("supplied", "fyl");
        let formatted = DefaultCaptionFormatter.format(Caption::NoSuchCommand, &variables);
        assert_eq!(formatted, "Unknown command 'fyl'");
    }

    #[test]
    fn leaves_unknown_placeholders_literal() {
        let variables = CaptionVariables::new();
        let formatted = DefaultCaptionFormatter.format(Caption::NoSuchCommand, &variables);
        assert_eq!(formatted, "Unknown command '<supplied>'");
    }
}
