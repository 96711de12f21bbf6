//! The token stream consumed by the command tree during parsing.
use std::fmt;

/// An error produced while reading a single value out of a [`CommandInput`].
///
/// Unlike the tree-level [`crate::error::CommandError`], this is a low-level
/// cursor failure: "there was nothing left to read" or "what was there
/// didn't parse as the requested shape". Argument parsers turn these into
/// the richer `ArgumentParse` variants, attaching the argument's name and
/// the chain consumed so far.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// The input was exhausted before a value could be read.
    #[error("no input provided")]
    NoInputProvided,
    /// The raw text did not match the expected shape.
    #[error("'{raw}' is not a valid {expected}")]
    InvalidFormat {
        /// The text that failed to parse.
        raw: String,
        /// A short description of what was expected, e.g. `"integer"`.
        expected: &'static str,
    },
    /// A quoted string was opened but never closed.
    #[error("unterminated quoted string")]
    UnterminatedQuote,
}

/// A mutable cursor over a single raw command line.
///
/// The underlying string is never mutated, only the cursor advances; this
/// lets a parser read a few characters ahead, decide the input doesn't fit,
/// and roll the cursor back to its [`CommandInput::mark`] without having
/// touched anything else observing the same input.
#[derive(Clone)]
pub struct CommandInput {
    raw: String,
    cursor: usize,
}

impl CommandInput {
    /// Wraps a raw command line for tokenization, cursor at the start.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            cursor: 0,
        }
    }

    /// The cursor position, in bytes from the start of the original line.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Captures the current cursor position for a later [`Self::reset`].
    #[must_use]
    pub const fn mark(&self) -> usize {
        self.cursor
    }

    /// Restores the cursor to a position previously returned by [`Self::mark`].
    pub fn reset(&mut self, mark: usize) {
        self.cursor = mark;
    }

    /// The unconsumed tail of the input, including any leading separator.
    #[must_use]
    pub fn remaining(&self) -> &str {
        &self.raw[self.cursor..]
    }

    /// Whether there is nothing left to read (after skipping separators).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining_trimmed().is_empty()
    }

    pub(crate) fn remaining_trimmed(&self) -> &str {
        self.remaining().trim_start_matches(' ')
    }

    /// Looks at the next unconsumed character without advancing the cursor.
    #[must_use]
    pub fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Looks at the first character of the next token, skipping any leading
    /// separator, without advancing the cursor.
    #[must_use]
    pub fn peek_char_after_whitespace(&self) -> Option<char> {
        self.remaining_trimmed().chars().next()
    }

    /// Looks at the next whitespace-delimited token without consuming it or
    /// interpreting quotes; used by the flag subsystem to classify a token
    /// as flag-shaped before committing to read it.
    #[must_use]
    pub fn peek_token(&self) -> Option<&str> {
        let trimmed = self.remaining_trimmed();
        if trimmed.is_empty() {
            return None;
        }
        let end = trimmed.find(' ').unwrap_or(trimmed.len());
        Some(&trimmed[..end])
    }

    /// Advances past a run of one-or-more leading spaces, if any.
    pub fn skip_whitespace(&mut self) {
        let trimmed = self.raw[self.cursor..].trim_start_matches(' ');
        self.cursor = self.raw.len() - trimmed.len();
    }

    /// Reads one whitespace-delimited token, honoring `"..."`/`'...'` quoting
    /// with `\"`, `\'`, `\\`, `\n`, `\t` escapes.
    ///
    /// # Errors
    /// [`InputError::NoInputProvided`] if nothing is left, or
    /// [`InputError::UnterminatedQuote`] if a quote is opened but not closed.
    pub fn read_string(&mut self) -> Result<String, InputError> {
        self.skip_whitespace();
        if self.remaining().is_empty() {
            return Err(InputError::NoInputProvided);
        }

        let bytes = self.remaining();
        let mut chars = bytes.char_indices().peekable();
        match chars.peek().map(|&(_, c)| c) {
            Some(quote @ ('"' | '\'')) => self.read_quoted(quote),
            _ => self.read_unquoted(),
        }
    }

    fn read_unquoted(&mut self) -> Result<String, InputError> {
        let remaining = self.remaining();
        let end = remaining.find(' ').unwrap_or(remaining.len());
        let token = remaining[..end].to_string();
        self.cursor += end;
        Ok(token)
    }

    fn read_quoted(&mut self, quote: char) -> Result<String, InputError> {
        let remaining = self.remaining();
        let mut out = String::new();
        let mut iter = remaining.char_indices();
        let (_, opening) = iter.next().expect("quote character peeked");
        debug_assert_eq!(opening, quote);

        let mut consumed = opening.len_utf8();
        let mut closed = false;
        while let Some((idx, c)) = iter.next() {
            consumed = idx + c.len_utf8();
            if c == '\\' {
                let Some((escaped_idx, escaped)) = iter.next() else {
                    return Err(InputError::UnterminatedQuote);
                };
                consumed = escaped_idx + escaped.len_utf8();
                out.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                });
            } else if c == quote {
                closed = true;
                break;
            } else {
                out.push(c);
            }
        }

        if !closed {
            return Err(InputError::UnterminatedQuote);
        }
        self.cursor += consumed;
        Ok(out)
    }

    /// Reads an integer token (`read_string` + `str::parse`).
    ///
    /// # Errors
    /// See [`Self::read_string`]; additionally fails with
    /// [`InputError::InvalidFormat`] if the token isn't a valid `i64`.
    pub fn read_integer(&mut self) -> Result<i64, InputError> {
        self.read_parsed("integer")
    }

    /// Reads a `long` token. An alias of [`Self::read_integer`] kept for
    /// symmetry with the spec's distinct integer/long argument parsers.
    ///
    /// # Errors
    /// See [`Self::read_integer`].
    pub fn read_long(&mut self) -> Result<i64, InputError> {
        self.read_integer()
    }

    /// Reads a 32-bit float token.
    ///
    /// # Errors
    /// See [`Self::read_string`]; additionally fails with
    /// [`InputError::InvalidFormat`] if the token isn't a valid `f32`.
    pub fn read_float(&mut self) -> Result<f32, InputError> {
        self.read_parsed("float")
    }

    /// Reads a 64-bit float token.
    ///
    /// # Errors
    /// See [`Self::read_string`]; additionally fails with
    /// [`InputError::InvalidFormat`] if the token isn't a valid `f64`.
    pub fn read_double(&mut self) -> Result<f64, InputError> {
        self.read_parsed("double")
    }

    /// Reads a boolean token from the fixed set `{"true", "false"}`.
    ///
    /// # Errors
    /// See [`Self::read_string`]; additionally fails with
    /// [`InputError::InvalidFormat`] if the token is neither.
    pub fn read_boolean(&mut self) -> Result<bool, InputError> {
        self.read_boolean_with(&["true"], &["false"])
    }

    /// Reads a boolean token against a caller-supplied vocabulary instead of
    /// the fixed `{"true", "false"}` pair, e.g. `{"yes","on"}`/`{"no","off"}`
    /// (§4.E: "boolean with configurable accepted tokens"). Matching is
    /// case-insensitive, consistent with the rest of the tree's literal
    /// matching default.
    ///
    /// # Errors
    /// See [`Self::read_string`]; additionally fails with
    /// [`InputError::InvalidFormat`] if the token matches neither list.
    pub fn read_boolean_with(&mut self, truthy: &[&str], falsy: &[&str]) -> Result<bool, InputError> {
        let mark = self.mark();
        let token = self.read_string()?;
        if truthy.iter().any(|candidate| candidate.eq_ignore_ascii_case(&token)) {
            Ok(true)
        } else if falsy.iter().any(|candidate| candidate.eq_ignore_ascii_case(&token)) {
            Ok(false)
        } else {
            self.reset(mark);
            Err(InputError::InvalidFormat {
                raw: token,
                expected: "boolean",
            })
        }
    }

    fn read_parsed<T: std::str::FromStr>(
        &mut self,
        expected: &'static str,
    ) -> Result<T, InputError> {
        let mark = self.mark();
        let token = self.read_string()?;
        token.parse().map_err(|_| {
            self.reset(mark);
            InputError::InvalidFormat {
                raw: token.clone(),
                expected,
            }
        })
    }
}

impl fmt::Debug for CommandInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandInput")
            .field("remaining", &self.remaining())
            .finish()
    }
}
