//! Sender-type requirements on a terminal command.
use std::fmt;

/// A predicate gating which senders may invoke a terminal command.
///
/// The Java source expresses "this command requires an `Admin` sender" with
/// a generic bound per command. Since the manager here is parameterized by
/// a single sender type `S` (Design Note 1), the same constraint becomes a
/// named predicate over `S` — typically a variant check on an enum sender,
/// or a trait-object downcast, supplied by the embedder.
pub struct SenderRequirement<S> {
    name: &'static str,
    predicate: fn(&S) -> bool,
}

impl<S> SenderRequirement<S> {
    /// A requirement every sender satisfies; the default for commands built
    /// without an explicit `.requires_sender(...)` call.
    #[must_use]
    pub const fn any() -> Self {
        Self {
            name: "any sender",
            predicate: |_| true,
        }
    }

    /// Builds a requirement from a display name (used in
    /// [`crate::error::CommandErrorKind::InvalidCommandSender`]) and a
    /// predicate over the sender.
    #[must_use]
    pub const fn new(name: &'static str, predicate: fn(&S) -> bool) -> Self {
        Self { name, predicate }
    }

    /// The display name of the required sender kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the given sender satisfies this requirement.
    #[must_use]
    pub fn is_satisfied_by(&self, sender: &S) -> bool {
        (self.predicate)(sender)
    }
}

impl<S> Clone for SenderRequirement<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for SenderRequirement<S> {}

impl<S> fmt::Debug for SenderRequirement<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderRequirement")
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    enum Sender {
        Console,
        Admin,
    }

    #[test]
    fn any_accepts_every_sender() {
        let requirement = SenderRequirement::<Sender>::any();
        assert!(requirement.is_satisfied_by(&Sender::Console));
        assert!(requirement.is_satisfied_by(&Sender::Admin));
    }

    #[test]
    fn named_requirement_checks_the_predicate() {
        let requirement = SenderRequirement::new("Admin", |s: &Sender| matches!(s, Sender::Admin));
        assert!(!requirement.is_satisfied_by(&Sender::Console));
        assert!(requirement.is_satisfied_by(&Sender::Admin));
        assert_eq!(requirement.name(), "Admin");
    }
}
