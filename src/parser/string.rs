//! String argument parsers: `single`, `quoted`, `greedy`, `greedy_flag_aware`.
use crate::context::CommandContext;
use crate::error::ArgumentParseError;
use crate::flag::looks_like_flag;
use crate::input::CommandInput;
use crate::parser::{ArgumentParser, ParseOutcome, Suggestion};

/// Which of the four string shapes a [`StringParser`] reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringMode {
    /// One whitespace-delimited token; quoting is honored if present.
    Single,
    /// Like [`Self::Single`], but the raw text must actually be quoted.
    Quoted,
    /// Consumes everything left in the input, verbatim.
    Greedy,
    /// Like [`Self::Greedy`], but stops just before the first token that
    /// looks like a flag (`--name` or `-n`), so a flag container can still
    /// consume the tail (§4.E: `greedy_flag_aware`).
    GreedyFlagAware,
}

/// The stock string argument parser, parameterized by [`StringMode`].
pub struct StringParser {
    name: &'static str,
    mode: StringMode,
}

impl StringParser {
    /// Builds a string parser for the given argument name and mode.
    #[must_use]
    pub const fn new(name: &'static str, mode: StringMode) -> Self {
        Self { name, mode }
    }

    fn parse_greedy(&self, input: &mut CommandInput, flag_aware: bool) -> ParseOutcome<String> {
        if input.is_empty() {
            return Err(ArgumentParseError::NoInputProvided {
                argument: self.name.to_string(),
            });
        }
        let remaining = input.remaining().to_string();
        let ws = leading_ws(&remaining);
        let base = input.cursor();

        if !flag_aware {
            input.reset(base + remaining.len());
            return Ok(remaining[ws..].trim_end_matches(' ').to_string());
        }

        let flag_start = token_starts(&remaining)
            .find(|(_, token)| looks_like_flag(token))
            .map_or(remaining.len(), |(idx, _)| idx);
        let text = remaining[ws..flag_start].trim_end_matches(' ').to_string();
        input.reset(base + ws + text.len());
        Ok(text)
    }
}

fn leading_ws(s: &str) -> usize {
    s.len() - s.trim_start_matches(' ').len()
}

/// Byte offsets (within `s`, a remaining-input slice) at which each
/// whitespace-delimited token starts, paired with the token itself.
fn token_starts(s: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut idx = 0;
    std::iter::from_fn(move || {
        while s[idx..].starts_with(' ') {
            idx += 1;
        }
        if idx >= s.len() {
            return None;
        }
        let start = idx;
        let end = s[idx..].find(' ').map_or(s.len(), |rel| idx + rel);
        idx = end;
        Some((start, &s[start..end]))
    })
}

impl<S> ArgumentParser<S, String> for StringParser {
    fn parse(&self, _context: &mut CommandContext<S>, input: &mut CommandInput) -> ParseOutcome<String> {
        match self.mode {
            StringMode::Single => input.read_string().map_err(|_| ArgumentParseError::NoInputProvided {
                argument: self.name.to_string(),
            }),
            StringMode::Quoted => {
                let mark = input.mark();
                let starts_quoted = matches!(input.peek_char_after_whitespace(), Some('"' | '\''));
                let value = input.read_string().map_err(|_| ArgumentParseError::NoInputProvided {
                    argument: self.name.to_string(),
                })?;
                if !starts_quoted {
                    input.reset(mark);
                    return Err(ArgumentParseError::InvalidFormat {
                        argument: self.name.to_string(),
                        raw: value,
                        expected: "quoted string",
                    });
                }
                Ok(value)
            }
            StringMode::Greedy => self.parse_greedy(input, false),
            StringMode::GreedyFlagAware => self.parse_greedy(input, true),
        }
    }

    fn suggestions(&self, _context: &CommandContext<S>, _partial: &str) -> Vec<Suggestion> {
        Vec::new()
    }

    fn value_type_name(&self) -> &'static str {
        match self.mode {
            StringMode::Single | StringMode::Quoted => "string",
            StringMode::Greedy | StringMode::GreedyFlagAware => "text",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> CommandContext<()> {
        CommandContext::new(())
    }

    #[test]
    fn single_reads_one_token() {
        let parser = StringParser::new("word", StringMode::Single);
        let mut input = CommandInput::new("hello world");
        let value: ParseOutcome<String> = ArgumentParser::<(), String>::parse(&parser, &mut ctx(), &mut input);
        assert_eq!(value.unwrap(), "hello");
        assert_eq!(input.remaining(), " world");
    }

    #[test]
    fn quoted_rejects_unquoted_input() {
        let parser = StringParser::new("word", StringMode::Quoted);
        let mut input = CommandInput::new("hello");
        let mark = input.mark();
        let result: ParseOutcome<String> = ArgumentParser::<(), String>::parse(&parser, &mut ctx(), &mut input);
        assert!(result.is_err());
        assert_eq!(input.mark(), mark);
    }

    #[test]
    fn greedy_consumes_the_rest() {
        let parser = StringParser::new("message", StringMode::Greedy);
        let mut input = CommandInput::new("hello there, world");
        let value: ParseOutcome<String> = ArgumentParser::<(), String>::parse(&parser, &mut ctx(), &mut input);
        assert_eq!(value.unwrap(), "hello there, world");
        assert!(input.is_empty());
    }

    #[test]
    fn greedy_flag_aware_stops_before_a_flag() {
        let parser = StringParser::new("message", StringMode::GreedyFlagAware);
        let mut input = CommandInput::new("hello world --loud");
        let value: ParseOutcome<String> = ArgumentParser::<(), String>::parse(&parser, &mut ctx(), &mut input);
        assert_eq!(value.unwrap(), "hello world");
        assert_eq!(input.remaining(), " --loud");
    }
}
