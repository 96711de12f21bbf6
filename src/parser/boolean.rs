//! The stock `boolean` argument parser.
use crate::context::CommandContext;
use crate::error::ArgumentParseError;
use crate::input::CommandInput;
use crate::parser::{filter_by_prefix, ArgumentParser, ParseOutcome, Suggestion};

/// The accepted token vocabulary for a [`BooleanParser`] (§4.E:
/// "configurable accepted tokens; default `{true,false}` and (optionally)
/// `{yes,no,on,off}`").
#[derive(Debug, Clone, Copy)]
pub struct BooleanVocabulary {
    truthy: &'static [&'static str],
    falsy: &'static [&'static str],
}

impl BooleanVocabulary {
    /// The default vocabulary: `{"true"}` / `{"false"}`.
    pub const STANDARD: Self = Self {
        truthy: &["true"],
        falsy: &["false"],
    };

    /// The extended vocabulary §4.E calls out as optional: `true`/`yes`/`on`
    /// and `false`/`no`/`off`.
    pub const EXTENDED: Self = Self {
        truthy: &["true", "yes", "on"],
        falsy: &["false", "no", "off"],
    };

    /// Builds a custom vocabulary from caller-supplied token lists.
    #[must_use]
    pub const fn new(truthy: &'static [&'static str], falsy: &'static [&'static str]) -> Self {
        Self { truthy, falsy }
    }
}

/// Parses a boolean against a [`BooleanVocabulary`] (`STANDARD` by default).
pub struct BooleanParser {
    name: &'static str,
    vocabulary: BooleanVocabulary,
}

impl BooleanParser {
    /// Builds a parser for the given argument name, accepting the default
    /// `{true,false}` vocabulary.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self::with_vocabulary(name, BooleanVocabulary::STANDARD)
    }

    /// Builds a parser accepting a caller-supplied vocabulary, e.g.
    /// [`BooleanVocabulary::EXTENDED`] for `yes`/`no`/`on`/`off`.
    #[must_use]
    pub const fn with_vocabulary(name: &'static str, vocabulary: BooleanVocabulary) -> Self {
        Self { name, vocabulary }
    }
}

impl<S> ArgumentParser<S, bool> for BooleanParser {
    fn parse(&self, _context: &mut CommandContext<S>, input: &mut CommandInput) -> ParseOutcome<bool> {
        input
            .read_boolean_with(self.vocabulary.truthy, self.vocabulary.falsy)
            .map_err(|_| ArgumentParseError::InvalidFormat {
                argument: self.name.to_string(),
                raw: input.remaining().trim_start().to_string(),
                expected: "boolean",
            })
    }

    fn suggestions(&self, _context: &CommandContext<S>, partial: &str) -> Vec<Suggestion> {
        let candidates = self
            .vocabulary
            .truthy
            .iter()
            .chain(self.vocabulary.falsy.iter())
            .copied();
        filter_by_prefix(candidates, partial)
    }

    fn value_type_name(&self) -> &'static str {
        "boolean"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> CommandContext<()> {
        CommandContext::new(())
    }

    #[test]
    fn accepts_true_and_false() {
        let parser = BooleanParser::new("flag");
        let mut input = CommandInput::new("true");
        let value: ParseOutcome<bool> = ArgumentParser::<(), bool>::parse(&parser, &mut ctx(), &mut input);
        assert_eq!(value.unwrap(), true);
    }

    #[test]
    fn rejects_other_text() {
        let parser = BooleanParser::new("flag");
        let mut input = CommandInput::new("maybe");
        let result: ParseOutcome<bool> = ArgumentParser::<(), bool>::parse(&parser, &mut ctx(), &mut input);
        assert!(matches!(result, Err(ArgumentParseError::InvalidFormat { .. })));
    }

    #[test]
    fn suggests_matching_candidates() {
        let parser = BooleanParser::new("flag");
        let suggestions = parser.suggestions(&ctx(), "tr");
        assert_eq!(suggestions, vec![Suggestion::new("true")]);
    }

    #[test]
    fn extended_vocabulary_accepts_yes_no_on_off() {
        let parser = BooleanParser::with_vocabulary("flag", BooleanVocabulary::EXTENDED);
        let mut input = CommandInput::new("yes");
        let value: ParseOutcome<bool> = ArgumentParser::<(), bool>::parse(&parser, &mut ctx(), &mut input);
        assert_eq!(value.unwrap(), true);

        let mut input = CommandInput::new("off");
        let value: ParseOutcome<bool> = ArgumentParser::<(), bool>::parse(&parser, &mut ctx(), &mut input);
        assert_eq!(value.unwrap(), false);

        let mut input = CommandInput::new("true");
        let value: ParseOutcome<bool> = ArgumentParser::<(), bool>::parse(&parser, &mut ctx(), &mut input);
        assert_eq!(value.unwrap(), true);
    }

    #[test]
    fn standard_vocabulary_rejects_extended_tokens() {
        let parser = BooleanParser::new("flag");
        let mut input = CommandInput::new("yes");
        let result: ParseOutcome<bool> = ArgumentParser::<(), bool>::parse(&parser, &mut ctx(), &mut input);
        assert!(matches!(result, Err(ArgumentParseError::InvalidFormat { .. })));
    }
}
