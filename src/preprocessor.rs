//! Pre- and post-processing hooks run around a single command dispatch
//! (§4.G): normalization/rejection before the tree sees the input, and
//! observation after the handler (or the exception controller) has run.
use std::sync::Arc;

use crate::context::CommandContext;
use crate::error::CommandErrorKind;
use crate::input::CommandInput;

/// Runs before tree parsing. May rewrite `input` in place (by constructing
/// a new [`CommandInput`] and reassigning `*input`) or reject the command
/// outright, e.g. to flag it ambiguous before the tree gets a chance to
/// produce a less informative [`CommandErrorKind::InvalidSyntax`].
pub type Preprocessor<S> =
    Arc<dyn Fn(&mut CommandContext<S>, &mut CommandInput) -> Result<(), CommandErrorKind> + Send + Sync>;

/// What a [`Postprocessor`] decided after inspecting a successfully bound
/// command, before the handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostprocessAction {
    /// Let the handler run as normal.
    Continue,
    /// Treat the command as handled without ever invoking its handler, e.g.
    /// confirmation middleware holding the command for a follow-up prompt
    /// (§4.D.2 step 8).
    ConsumedWithoutExecuting,
}

/// Runs once parsing, the sender check, and the permission check have all
/// succeeded, but before the handler is invoked. May short-circuit the
/// dispatch into a "consumed but not executed" result by returning
/// [`PostprocessAction::ConsumedWithoutExecuting`] (§4.D.2 step 8).
pub type Postprocessor<S> = Arc<dyn Fn(&CommandContext<S>) -> PostprocessAction + Send + Sync>;

/// An ordered chain of [`Preprocessor`]s and [`Postprocessor`]s, run in
/// registration order. A preprocessor's rejection short-circuits the rest
/// of the chain and the dispatch itself; a postprocessor's short-circuit
/// stops the remaining postprocessors and the handler invocation.
pub struct ProcessorChain<S> {
    preprocessors: Vec<Preprocessor<S>>,
    postprocessors: Vec<Postprocessor<S>>,
}

impl<S> ProcessorChain<S> {
    /// An empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            preprocessors: Vec::new(),
            postprocessors: Vec::new(),
        }
    }

    /// Appends a preprocessor to the end of the chain.
    pub fn add_preprocessor(&mut self, preprocessor: Preprocessor<S>) {
        self.preprocessors.push(preprocessor);
    }

    /// Appends a postprocessor to the end of the chain.
    pub fn add_postprocessor(&mut self, postprocessor: Postprocessor<S>) {
        self.postprocessors.push(postprocessor);
    }

    /// Runs every preprocessor in order, stopping at the first rejection.
    ///
    /// # Errors
    /// The first [`CommandErrorKind`] a preprocessor returns.
    pub fn run_preprocessors(
        &self,
        context: &mut CommandContext<S>,
        input: &mut CommandInput,
    ) -> Result<(), CommandErrorKind> {
        for preprocessor in &self.preprocessors {
            preprocessor(context, input)?;
        }
        Ok(())
    }

    /// Runs every postprocessor in order, stopping at the first one that
    /// asks to short-circuit.
    #[must_use]
    pub fn run_postprocessors(&self, context: &CommandContext<S>) -> PostprocessAction {
        for postprocessor in &self.postprocessors {
            if postprocessor(context) == PostprocessAction::ConsumedWithoutExecuting {
                return PostprocessAction::ConsumedWithoutExecuting;
            }
        }
        PostprocessAction::Continue
    }
}

impl<S> Default for ProcessorChain<S> {
    fn default() -> Self {
        Self::new()
    }
}
