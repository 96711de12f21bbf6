//! The stock `string_array` argument parser: zero-or-more tokens, consumed
//! until a flag-shaped token or the end of input (§4.E).
use crate::context::CommandContext;
use crate::error::ArgumentParseError;
use crate::flag::looks_like_flag;
use crate::input::CommandInput;
use crate::parser::{ArgumentParser, ParseOutcome, Suggestion};

/// Consumes whitespace-delimited (optionally quoted) tokens one at a time
/// until it sees a flag-shaped token or runs out of input.
///
/// Always succeeds, even with zero tokens consumed: an empty array is a
/// valid match, which is what lets a flag container immediately follow an
/// array component with nothing between them (§4.E, §4.F).
pub struct StringArrayParser {
    name: &'static str,
}

impl StringArrayParser {
    /// Builds a parser for the given argument name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl<S> ArgumentParser<S, Vec<String>> for StringArrayParser {
    fn parse(&self, _context: &mut CommandContext<S>, input: &mut CommandInput) -> ParseOutcome<Vec<String>> {
        let mut values = Vec::new();
        loop {
            let Some(token) = input.peek_token() else {
                break;
            };
            if looks_like_flag(token) {
                break;
            }
            let value = input.read_string().map_err(|_| ArgumentParseError::NoInputProvided {
                argument: self.name.to_string(),
            })?;
            values.push(value);
        }
        Ok(values)
    }

    fn suggestions(&self, _context: &CommandContext<S>, _partial: &str) -> Vec<Suggestion> {
        Vec::new()
    }

    fn value_type_name(&self) -> &'static str {
        "string array"
    }
}
