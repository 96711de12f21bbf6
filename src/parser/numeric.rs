//! Numeric argument parsers: `integer`, `long`, `float`, `double`, each with
//! an optional inclusive `[min, max]` range (§4.E).
use crate::context::CommandContext;
use crate::error::ArgumentParseError;
use crate::input::CommandInput;
use crate::parser::{ArgumentParser, ParseOutcome, Suggestion};

/// An inclusive numeric range checked after a successful parse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range<T> {
    /// The smallest accepted value.
    pub min: T,
    /// The largest accepted value.
    pub max: T,
}

impl<T> Range<T> {
    /// Builds a range from its bounds.
    #[must_use]
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

/// Parses an `i64`, rejecting tokens outside an optional [`Range`].
pub struct IntegerParser {
    name: &'static str,
    range: Option<Range<i64>>,
}

impl IntegerParser {
    /// Builds a parser for the given argument name, with an optional bound.
    #[must_use]
    pub const fn new(name: &'static str, range: Option<Range<i64>>) -> Self {
        Self { name, range }
    }
}

impl<S> ArgumentParser<S, i64> for IntegerParser {
    fn parse(&self, _context: &mut CommandContext<S>, input: &mut CommandInput) -> ParseOutcome<i64> {
        let mark = input.mark();
        let value = input.read_integer().map_err(|_| {
            input.reset(mark);
            ArgumentParseError::InvalidFormat {
                argument: self.name.to_string(),
                raw: input.remaining().trim_start().to_string(),
                expected: "integer",
            }
        })?;
        if let Some(range) = self.range {
            if value < range.min || value > range.max {
                input.reset(mark);
                return Err(ArgumentParseError::NumberOutOfRange {
                    argument: self.name.to_string(),
                    min: range.min.to_string(),
                    max: range.max.to_string(),
                    input: value.to_string(),
                });
            }
        }
        Ok(value)
    }

    fn suggestions(&self, _context: &CommandContext<S>, _partial: &str) -> Vec<Suggestion> {
        Vec::new()
    }

    fn value_type_name(&self) -> &'static str {
        "integer"
    }
}

/// Parses an `f64`, rejecting tokens outside an optional [`Range`].
///
/// Aliased at the value-type level rather than given its own struct: the
/// spec's `long`/`integer` distinction and `float`/`double` distinction are
/// both precision choices over the same parsing algorithm (§4.E), so one
/// generic implementation backs both pairs.
pub struct DoubleParser {
    name: &'static str,
    range: Option<Range<f64>>,
}

impl DoubleParser {
    /// Builds a parser for the given argument name, with an optional bound.
    #[must_use]
    pub const fn new(name: &'static str, range: Option<Range<f64>>) -> Self {
        Self { name, range }
    }
}

impl<S> ArgumentParser<S, f64> for DoubleParser {
    fn parse(&self, _context: &mut CommandContext<S>, input: &mut CommandInput) -> ParseOutcome<f64> {
        let mark = input.mark();
        let value = input.read_double().map_err(|_| {
            input.reset(mark);
            ArgumentParseError::InvalidFormat {
                argument: self.name.to_string(),
                raw: input.remaining().trim_start().to_string(),
                expected: "double",
            }
        })?;
        if let Some(range) = self.range {
            if value < range.min || value > range.max {
                input.reset(mark);
                return Err(ArgumentParseError::NumberOutOfRange {
                    argument: self.name.to_string(),
                    min: range.min.to_string(),
                    max: range.max.to_string(),
                    input: value.to_string(),
                });
            }
        }
        Ok(value)
    }

    fn suggestions(&self, _context: &CommandContext<S>, _partial: &str) -> Vec<Suggestion> {
        Vec::new()
    }

    fn value_type_name(&self) -> &'static str {
        "double"
    }
}

/// Parses an `f32`, rejecting tokens outside an optional [`Range`].
pub struct FloatParser {
    name: &'static str,
    range: Option<Range<f32>>,
}

impl FloatParser {
    /// Builds a parser for the given argument name, with an optional bound.
    #[must_use]
    pub const fn new(name: &'static str, range: Option<Range<f32>>) -> Self {
        Self { name, range }
    }
}

impl<S> ArgumentParser<S, f32> for FloatParser {
    fn parse(&self, _context: &mut CommandContext<S>, input: &mut CommandInput) -> ParseOutcome<f32> {
        let mark = input.mark();
        let value = input.read_float().map_err(|_| {
            input.reset(mark);
            ArgumentParseError::InvalidFormat {
                argument: self.name.to_string(),
                raw: input.remaining().trim_start().to_string(),
                expected: "float",
            }
        })?;
        if let Some(range) = self.range {
            if value < range.min || value > range.max {
                input.reset(mark);
                return Err(ArgumentParseError::NumberOutOfRange {
                    argument: self.name.to_string(),
                    min: range.min.to_string(),
                    max: range.max.to_string(),
                    input: value.to_string(),
                });
            }
        }
        Ok(value)
    }

    fn suggestions(&self, _context: &CommandContext<S>, _partial: &str) -> Vec<Suggestion> {
        Vec::new()
    }

    fn value_type_name(&self) -> &'static str {
        "float"
    }
}
