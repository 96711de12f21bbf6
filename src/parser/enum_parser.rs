//! The stock `enum` argument parser: a closed vocabulary of named values.
use crate::context::CommandContext;
use crate::error::ArgumentParseError;
use crate::input::CommandInput;
use crate::parser::{filter_by_prefix, ArgumentParser, ParseOutcome, Suggestion};

/// Parses one of a fixed set of `(name, value)` pairs, case-insensitively
/// by default.
///
/// Rust has no runtime reflection over `enum` variants, so unlike the Java
/// source's parser built from `Class<E>` this one takes its vocabulary
/// explicitly; a real caller typically builds it once from a derive-backed
/// `IntoEnumIterator`-style listing (outside this crate's scope).
pub struct EnumParser<T> {
    name: &'static str,
    variants: Vec<(&'static str, T)>,
    case_sensitive: bool,
}

impl<T: Clone> EnumParser<T> {
    /// Builds a parser over the given `(name, value)` vocabulary.
    #[must_use]
    pub fn new(name: &'static str, variants: Vec<(&'static str, T)>) -> Self {
        Self {
            name,
            variants,
            case_sensitive: false,
        }
    }

    /// Requires the input to match a variant's name byte-for-byte.
    #[must_use]
    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    fn find(&self, token: &str) -> Option<&T> {
        self.variants.iter().find_map(|(name, value)| {
            let matches = if self.case_sensitive {
                *name == token
            } else {
                name.eq_ignore_ascii_case(token)
            };
            matches.then_some(value)
        })
    }
}

impl<S, T: Clone + Send + Sync> ArgumentParser<S, T> for EnumParser<T> {
    fn parse(&self, _context: &mut CommandContext<S>, input: &mut CommandInput) -> ParseOutcome<T> {
        let mark = input.mark();
        let token = input.read_string().map_err(|_| ArgumentParseError::NoInputProvided {
            argument: self.name.to_string(),
        })?;
        self.find(&token).cloned().ok_or_else(|| {
            input.reset(mark);
            ArgumentParseError::InvalidFormat {
                argument: self.name.to_string(),
                raw: token,
                expected: "one of the accepted values",
            }
        })
    }

    fn suggestions(&self, _context: &CommandContext<S>, partial: &str) -> Vec<Suggestion> {
        filter_by_prefix(self.variants.iter().map(|(name, _)| *name), partial)
    }

    fn value_type_name(&self) -> &'static str {
        "enum"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum GameMode {
        Survival,
        Creative,
    }

    fn parser() -> EnumParser<GameMode> {
        EnumParser::new(
            "mode",
            vec![("survival", GameMode::Survival), ("creative", GameMode::Creative)],
        )
    }

    fn ctx() -> CommandContext<()> {
        CommandContext::new(())
    }

    #[test]
    fn matches_case_insensitively_by_default() {
        let mut input = CommandInput::new("Creative");
        let value: ParseOutcome<GameMode> = ArgumentParser::<(), GameMode>::parse(&parser(), &mut ctx(), &mut input);
        assert_eq!(value.unwrap(), GameMode::Creative);
    }

    #[test]
    fn case_sensitive_mode_rejects_wrong_casing() {
        let case_sensitive = parser().case_sensitive();
        let mut input = CommandInput::new("Creative");
        let result: ParseOutcome<GameMode> =
            ArgumentParser::<(), GameMode>::parse(&case_sensitive, &mut ctx(), &mut input);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_value_does_not_consume_input() {
        let mut input = CommandInput::new("hardcore");
        let mark = input.mark();
        let result: ParseOutcome<GameMode> = ArgumentParser::<(), GameMode>::parse(&parser(), &mut ctx(), &mut input);
        assert!(result.is_err());
        assert_eq!(input.mark(), mark);
    }
}
