//! The stock `either` combinator: try a primary parser, fall back to a
//! second on failure, resetting the cursor between attempts (§4.E).
use std::sync::Arc;

use crate::context::CommandContext;
use crate::input::CommandInput;
use crate::parser::{ArgumentParser, ParseOutcome, Suggestion};

/// The result of an [`EitherParser`]: which side matched, and its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Either<A, B> {
    /// The primary parser matched.
    Primary(A),
    /// The primary parser failed and the fallback matched instead.
    Fallback(B),
}

/// Tries `primary` first; if it fails, resets the input to where it started
/// and tries `fallback`. If both fail, the primary's error is returned
/// (matching the spec's "no input" vs. "no input for variant" ambiguity
/// rule in §4.E: the first-declared parser's failure is the one reported).
pub struct EitherParser<S, A, B> {
    primary: Arc<dyn ArgumentParser<S, A>>,
    fallback: Arc<dyn ArgumentParser<S, B>>,
}

impl<S, A, B> EitherParser<S, A, B> {
    /// Builds a combinator from a primary and a fallback parser.
    #[must_use]
    pub fn new(
        primary: impl ArgumentParser<S, A> + 'static,
        fallback: impl ArgumentParser<S, B> + 'static,
    ) -> Self {
        Self {
            primary: Arc::new(primary),
            fallback: Arc::new(fallback),
        }
    }
}

impl<S, A: Send + Sync, B: Send + Sync> ArgumentParser<S, Either<A, B>> for EitherParser<S, A, B> {
    fn parse(
        &self,
        context: &mut CommandContext<S>,
        input: &mut CommandInput,
    ) -> ParseOutcome<Either<A, B>> {
        let mark = input.mark();
        match self.primary.parse(context, input) {
            Ok(value) => Ok(Either::Primary(value)),
            Err(primary_err) => {
                input.reset(mark);
                match self.fallback.parse(context, input) {
                    Ok(value) => Ok(Either::Fallback(value)),
                    Err(_) => {
                        input.reset(mark);
                        Err(primary_err)
                    }
                }
            }
        }
    }

    fn suggestions(&self, context: &CommandContext<S>, partial: &str) -> Vec<Suggestion> {
        let mut suggestions = self.primary.suggestions(context, partial);
        suggestions.extend(self.fallback.suggestions(context, partial));
        suggestions
    }

    fn value_type_name(&self) -> &'static str {
        "either"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::numeric::IntegerParser;
    use crate::parser::string::{StringMode, StringParser};

    fn ctx() -> CommandContext<()> {
        CommandContext::new(())
    }

    #[test]
    fn prefers_the_primary_parser_when_it_matches() {
        let parser = EitherParser::new(IntegerParser::new("amount", None), StringParser::new("amount", StringMode::Single));
        let mut input = CommandInput::new("42");
        let value: ParseOutcome<Either<i64, String>> = parser.parse(&mut ctx(), &mut input);
        assert_eq!(value.unwrap(), Either::Primary(42));
    }

    #[test]
    fn falls_back_and_resets_cursor_on_primary_failure() {
        let parser = EitherParser::new(IntegerParser::new("amount", None), StringParser::new("amount", StringMode::Single));
        let mut input = CommandInput::new("all");
        let value: ParseOutcome<Either<i64, String>> = parser.parse(&mut ctx(), &mut input);
        assert_eq!(value.unwrap(), Either::Fallback("all".to_string()));
        assert!(input.is_empty());
    }
}
