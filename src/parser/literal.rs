//! Matching and suggestion helpers for literal command-tree nodes.
//!
//! Literals aren't modeled as an [`crate::parser::ArgumentParser`]: a
//! literal node binds nothing into the context, and the tree needs to
//! inspect a node's full alias list before committing to a match (for
//! tie-breaking and conflict detection), which doesn't fit the
//! one-value-at-a-time parser contract. These are plain functions the tree
//! calls directly.
use crate::parser::{filter_by_prefix, Suggestion};

/// Whether `token` matches `name` or one of `aliases`, under the manager's
/// `case_sensitive_literals` setting (SPEC_FULL.md Open Question; default
/// `false`).
#[must_use]
pub fn matches(token: &str, name: &str, aliases: &[&str], case_sensitive: bool) -> bool {
    if case_sensitive {
        token == name || aliases.iter().any(|alias| *alias == token)
    } else {
        token.eq_ignore_ascii_case(name) || aliases.iter().any(|alias| alias.eq_ignore_ascii_case(token))
    }
}

/// Suggestions for a literal node: its canonical name plus any alias that
/// itself starts with `partial` (§4.D.3: "each literal name/alias that
/// starts with the current token prefix").
#[must_use]
pub fn suggestions(name: &'static str, aliases: &[&'static str], partial: &str) -> Vec<Suggestion> {
    let mut candidates: Vec<&str> = Vec::with_capacity(1 + aliases.len());
    candidates.push(name);
    candidates.extend(aliases.iter().copied());
    filter_by_prefix(candidates, partial)
}
