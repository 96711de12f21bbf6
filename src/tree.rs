//! The command tree: a trie of [`crate::component::CommandComponent`]s, with
//! insertion conflict checks and tree-based parsing/suggestion (§4.D).
use std::collections::HashSet;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::component::{Command, CommandComponent, ComponentKind};
use crate::context::CommandContext;
use crate::error::{CommandError, CommandErrorKind};
use crate::flag::{looks_like_flag, FlagSet};
use crate::input::CommandInput;
use crate::parser::{literal, Suggestion};

/// A node in the tree: one [`CommandComponent`], its children, and the
/// command (if any) reachable by stopping at this depth.
///
/// A command with optional trailing components is reachable from more than
/// one node: [`CommandTree::insert`] attaches it to every depth from the
/// full path back to (and including) the last required component, which is
/// what lets `give Steve` match a command declared as
/// `give <player> [amount]` without `amount`.
/// Sibling storage for a [`Node`]'s children or a [`CommandTree`]'s roots.
/// Most command nodes fan out into a handful of literal/variable/flags
/// children at most, so the common case never touches the heap (the
/// teacher's chunk ticket bookkeeping uses the same small-inline-capacity
/// pattern for its per-chunk ticket lists).
type Children<S> = SmallVec<[Node<S>; 4]>;

pub struct Node<S> {
    component: CommandComponent<S>,
    children: Children<S>,
    command: Option<Arc<Command<S>>>,
}

impl<S> Node<S> {
    /// This node's component.
    #[must_use]
    pub fn component(&self) -> &CommandComponent<S> {
        &self.component
    }

    /// This node's children, in insertion order.
    #[must_use]
    pub fn children(&self) -> &[Node<S>] {
        &self.children
    }

    /// The command reachable by stopping exactly at this node, if any.
    #[must_use]
    pub fn command(&self) -> Option<&Arc<Command<S>>> {
        self.command.as_ref()
    }

    fn new(component: CommandComponent<S>) -> Self {
        Self {
            component,
            children: Children::new(),
            command: None,
        }
    }

    fn name(&self) -> &'static str {
        self.component.name()
    }
}

/// Why [`CommandTree::insert`] rejected a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InsertError {
    /// A literal's name or alias collides with a different existing node at
    /// the same depth.
    #[error("'{alias}' conflicts with the existing literal '{existing}'")]
    AliasConflict {
        /// The colliding name or alias.
        alias: String,
        /// The existing node it collides with.
        existing: String,
    },
    /// Two differently named variable components were declared at the same
    /// tree position; at most one variable child is allowed per node.
    #[error("variable '{new}' conflicts with the existing variable '{existing}' at the same position")]
    AmbiguousVariableChild {
        /// The already-registered variable's name.
        existing: String,
        /// The newly declared variable's name.
        new: String,
    },
    /// A command is already reachable at this exact depth.
    #[error("a command is already registered for chain '{chain}'")]
    DuplicateCommand {
        /// The node's name where the conflict occurred.
        chain: String,
    },
}

/// A trie of [`CommandComponent`]s rooted at one or more literal names,
/// supporting insertion, parsing, and suggestion (§4.D).
pub struct CommandTree<S> {
    roots: Children<S>,
    case_sensitive_literals: bool,
}

impl<S: 'static> CommandTree<S> {
    /// An empty tree. `case_sensitive_literals` governs literal matching
    /// throughout (SPEC_FULL.md Open Question; the manager defaults this to
    /// `false`).
    #[must_use]
    pub fn new(case_sensitive_literals: bool) -> Self {
        Self {
            roots: Children::new(),
            case_sensitive_literals,
        }
    }

    /// The tree's top-level literal nodes, one per distinct root command
    /// name (aliases share a node with their canonical name).
    #[must_use]
    pub fn roots(&self) -> &[Node<S>] {
        &self.roots
    }

    /// Inserts a built [`Command`] into the tree.
    ///
    /// # Errors
    /// See [`InsertError`].
    pub fn insert(&mut self, command: Command<S>) -> Result<(), InsertError> {
        let command = Arc::new(command);
        let path: &[CommandComponent<S>] = &command.path;
        let root_name = path.first().map(CommandComponent::name).unwrap_or_default();
        if let Err(err) = Self::insert_rec(&mut self.roots, path, &command, self.case_sensitive_literals) {
            log::warn!("rejected command registration under '{root_name}': {err}");
            return Err(err);
        }
        Ok(())
    }

    fn insert_rec(
        siblings: &mut Children<S>,
        path: &[CommandComponent<S>],
        command: &Arc<Command<S>>,
        case_sensitive: bool,
    ) -> Result<bool, InsertError> {
        let component = &path[0];
        let idx = match &component.kind {
            ComponentKind::Literal { name, aliases } => {
                Self::find_or_insert_literal(siblings, name, aliases, case_sensitive)?
            }
            ComponentKind::Variable { name, .. } => Self::find_or_insert_variable(siblings, name, component)?,
            ComponentKind::Flags(_) => Self::find_or_insert_flags(siblings, component),
        };

        let child_attached = if path.len() == 1 {
            true
        } else {
            Self::insert_rec(&mut siblings[idx].children, &path[1..], command, case_sensitive)?
        };

        if child_attached {
            if siblings[idx].command.is_some() {
                return Err(InsertError::DuplicateCommand {
                    chain: siblings[idx].name().to_string(),
                });
            }
            siblings[idx].command = Some(command.clone());
        }

        Ok(child_attached && !component.is_required())
    }

    fn find_or_insert_literal(
        siblings: &mut Children<S>,
        name: &'static str,
        aliases: &[&'static str],
        case_sensitive: bool,
    ) -> Result<usize, InsertError> {
        let eq = |a: &str, b: &str| {
            if case_sensitive {
                a == b
            } else {
                a.eq_ignore_ascii_case(b)
            }
        };

        for (idx, sibling) in siblings.iter().enumerate() {
            let ComponentKind::Literal {
                name: sibling_name,
                aliases: sibling_aliases,
            } = &sibling.component.kind
            else {
                continue;
            };

            if eq(sibling_name, name) {
                return Ok(idx);
            }
            let overlaps = aliases.iter().any(|alias| eq(alias, sibling_name))
                || sibling_aliases.iter().any(|alias| eq(alias, name))
                || aliases
                    .iter()
                    .any(|alias| sibling_aliases.iter().any(|other| eq(alias, other)));
            if overlaps {
                return Err(InsertError::AliasConflict {
                    alias: name.to_string(),
                    existing: (*sibling_name).to_string(),
                });
            }
        }

        siblings.push(Node::new(CommandComponent::literal(name)));
        let idx = siblings.len() - 1;
        if let ComponentKind::Literal {
            aliases: node_aliases,
            ..
        } = &mut siblings[idx].component.kind
        {
            node_aliases.extend_from_slice(aliases);
        }
        Ok(idx)
    }

    fn find_or_insert_variable(
        siblings: &mut Children<S>,
        name: &'static str,
        component: &CommandComponent<S>,
    ) -> Result<usize, InsertError> {
        for (idx, sibling) in siblings.iter().enumerate() {
            if let ComponentKind::Variable {
                name: sibling_name, ..
            } = &sibling.component.kind
            {
                if *sibling_name == name {
                    return Ok(idx);
                }
                return Err(InsertError::AmbiguousVariableChild {
                    existing: (*sibling_name).to_string(),
                    new: name.to_string(),
                });
            }
        }

        siblings.push(Node::new(Self::clone_variable_component(component)));
        Ok(siblings.len() - 1)
    }

    fn find_or_insert_flags(siblings: &mut Children<S>, component: &CommandComponent<S>) -> usize {
        for (idx, sibling) in siblings.iter().enumerate() {
            if matches!(sibling.component.kind, ComponentKind::Flags(_)) {
                return idx;
            }
        }
        siblings.push(Node::new(Self::clone_flags_component(component)));
        siblings.len() - 1
    }

    fn clone_variable_component(component: &CommandComponent<S>) -> CommandComponent<S> {
        let ComponentKind::Variable { name, parser, default } = &component.kind else {
            unreachable!("called only for Variable components")
        };
        CommandComponent {
            kind: ComponentKind::Variable {
                name,
                parser: parser.clone(),
                default: default.clone(),
            },
            required: component.required,
            description: component.description,
            preprocessors: component.preprocessors.clone(),
        }
    }

    fn clone_flags_component(component: &CommandComponent<S>) -> CommandComponent<S> {
        let ComponentKind::Flags(flags) = &component.kind else {
            unreachable!("called only for Flags components")
        };
        CommandComponent {
            kind: ComponentKind::Flags(flags.clone()),
            required: false,
            description: component.description,
            preprocessors: Vec::new(),
        }
    }

    fn find_literal_child<'a>(children: &'a [Node<S>], token: &str, case_sensitive: bool) -> Option<&'a Node<S>> {
        children.iter().find(|child| {
            if let ComponentKind::Literal { name, aliases } = &child.component.kind {
                literal::matches(token, name, aliases, case_sensitive)
            } else {
                false
            }
        })
    }

    fn find_non_literal_child(children: &[Node<S>]) -> Option<&Node<S>> {
        children
            .iter()
            .find(|child| !matches!(child.component.kind, ComponentKind::Literal { .. }))
    }

    fn find_variable_child(children: &[Node<S>]) -> Option<&Node<S>> {
        children
            .iter()
            .find(|child| matches!(child.component.kind, ComponentKind::Variable { .. }))
    }

    fn find_flags_child(children: &[Node<S>]) -> Option<&Node<S>> {
        children
            .iter()
            .find(|child| matches!(child.component.kind, ComponentKind::Flags(_)))
    }

    /// Looks for a flag container reachable from `children` by following the
    /// positional chain forward (through at most one variable child per
    /// depth), without requiring those positionals to already be consumed.
    /// This is what lets flags precede a trailing positional in the input
    /// (§4.F): a flag-shaped token can be matched against the command's
    /// flags before its required arguments have all been bound.
    fn find_flags_in_subtree(children: &[Node<S>]) -> Option<&FlagSet<S>> {
        if let Some(flags_node) = Self::find_flags_child(children) {
            let ComponentKind::Flags(flags) = &flags_node.component.kind else {
                unreachable!("find_flags_child only returns Flags nodes")
            };
            return Some(flags.as_ref());
        }
        let variable = Self::find_variable_child(children)?;
        Self::find_flags_in_subtree(&variable.children)
    }

    /// Walks forward from `node` through optional variable children that
    /// carry a default, binding each into `context` as long as the sender
    /// never supplied a token for them. Stops at the first required
    /// component, the first optional component with no default, or a leaf
    /// (§3: optional-argument defaults).
    fn bind_trailing_optional_defaults<'n>(context: &mut CommandContext<S>, node: &'n Node<S>) -> &'n Node<S> {
        let mut current = node;
        loop {
            let Some(child) = Self::find_variable_child(&current.children) else {
                break;
            };
            if child.component.required {
                break;
            }
            let ComponentKind::Variable { default: Some(default), .. } = &child.component.kind else {
                break;
            };
            default.bind(context);
            current = child;
        }
        current
    }

    /// Finds any command terminal reachable from `node`, preferring `node`
    /// itself, then depth-first through its children. Used to report a
    /// representative syntax once parsing has already diverged, so the exact
    /// subtree walked doesn't matter as much as landing on *a* real command.
    fn find_any_command(node: &Node<S>) -> Option<&Arc<Command<S>>> {
        if let Some(command) = node.command() {
            return Some(command);
        }
        node.children().iter().find_map(Self::find_any_command)
    }

    /// The full syntax of the command the input was closest to, for an
    /// [`CommandErrorKind::InvalidSyntax`] raised at `node` with the
    /// offending (or absent) next `token` (§8). When `token` prefixes one of
    /// `node`'s literal children, that branch is preferred over an arbitrary
    /// one, so `"config re"` against `set`/`reset` siblings resolves to
    /// `"config reset"` rather than whichever was registered first.
    fn closest_syntax(node: &Node<S>, token: Option<&str>) -> String {
        let prefix_match = token.and_then(|token| {
            let token_lower = token.to_lowercase();
            node.children().iter().find(|child| match &child.component.kind {
                ComponentKind::Literal { name, aliases } => {
                    name.to_lowercase().starts_with(&token_lower)
                        || aliases.iter().any(|alias| alias.to_lowercase().starts_with(&token_lower))
                }
                _ => false,
            })
        });

        let start = prefix_match.or_else(|| node.children().first()).unwrap_or(node);
        Self::find_any_command(start)
            .or_else(|| node.command())
            .map(|command| crate::help::render_syntax(command.path()))
            .unwrap_or_default()
    }

    /// Walks the tree against `input`, binding arguments into `context` as
    /// it goes, and returns the matched terminal command.
    ///
    /// # Errors
    /// [`CommandErrorKind::NoSuchCommand`] if the first token matches no
    /// root; [`CommandErrorKind::InvalidSyntax`] if the input diverges
    /// partway through a real command's path; [`CommandErrorKind::ArgumentParse`]
    /// if a variable component's parser rejects its token.
    #[tracing::instrument(level = "trace", skip_all, fields(input = input.remaining()))]
    pub fn parse(
        &self,
        context: &mut CommandContext<S>,
        input: &mut CommandInput,
    ) -> Result<Arc<Command<S>>, CommandError> {
        input.skip_whitespace();
        let Some(first_token) = input.peek_token().map(str::to_string) else {
            return Err(CommandError::new(
                String::new(),
                CommandErrorKind::NoSuchCommand { supplied: String::new() },
            ));
        };

        let Some(mut node) = Self::find_literal_child(&self.roots, &first_token, self.case_sensitive_literals)
        else {
            return Err(CommandError::new(
                String::new(),
                CommandErrorKind::NoSuchCommand { supplied: first_token },
            ));
        };
        let _ = input.read_string();
        let mut chain = vec![node.name().to_string()];
        tracing::trace!(root = node.name(), "matched root literal");

        // Flags may appear interleaved with (including ahead of) the
        // remaining positionals, so occurrences are tracked across the whole
        // walk rather than only once a flag node is structurally reached
        // (§4.F).
        let mut flag_values: HashSet<&'static str> = HashSet::new();
        let mut flags_seen: Option<&FlagSet<S>> = None;
        let mut flags_terminated = false;

        loop {
            if let ComponentKind::Flags(flags) = &node.component.kind {
                flags_seen = Some(flags.as_ref());
                if !flags_terminated {
                    loop {
                        let Some(token) = input.peek_token() else { break };
                        if token == "--" {
                            let _ = input.read_string();
                            flags_terminated = true;
                            break;
                        }
                        if !looks_like_flag(token) {
                            break;
                        }
                        let done = flags
                            .parse_one(context, input, &mut flag_values)
                            .map_err(|error| CommandError::new(chain.join(" "), error.into()))?;
                        if done {
                            flags_terminated = true;
                            break;
                        }
                    }
                }
                break;
            }

            input.skip_whitespace();
            if input.is_empty() {
                break;
            }

            let next_token = input.peek_token().map(str::to_string);

            if !flags_terminated {
                if let Some(token) = next_token.as_deref() {
                    if looks_like_flag(token) {
                        if let Some(flags) = Self::find_flags_in_subtree(&node.children) {
                            flags_seen = Some(flags);
                            let done = flags
                                .parse_one(context, input, &mut flag_values)
                                .map_err(|error| CommandError::new(chain.join(" "), error.into()))?;
                            if done {
                                flags_terminated = true;
                            }
                            continue;
                        }
                    }
                }
            }

            let chosen = next_token.as_deref().and_then(|token| {
                Self::find_literal_child(&node.children, token, self.case_sensitive_literals)
                    .or_else(|| Self::find_non_literal_child(&node.children))
            });

            let Some(child) = chosen else {
                let correct_syntax = Self::closest_syntax(node, next_token.as_deref());
                return Err(CommandError::new(
                    chain.join(" "),
                    CommandErrorKind::InvalidSyntax { correct_syntax },
                ));
            };

            match &child.component.kind {
                ComponentKind::Literal { .. } => {
                    let _ = input.read_string();
                    chain.push(child.name().to_string());
                }
                ComponentKind::Variable { parser, name, .. } => {
                    parser
                        .parse_and_bind(context, input)
                        .map_err(|error| CommandError::new(chain.join(" "), error.into()))?;
                    chain.push((*name).to_string());
                }
                ComponentKind::Flags(_) => {}
            }
            tracing::trace!(node = child.name(), "descended one step");
            node = child;
        }

        if let Some(flags) = flags_seen {
            flags
                .check_required(&flag_values)
                .map_err(|error| CommandError::new(chain.join(" "), error.into()))?;
        }

        let node = Self::bind_trailing_optional_defaults(context, node);

        input.skip_whitespace();
        if !input.is_empty() {
            let correct_syntax = Self::closest_syntax(node, input.peek_token());
            return Err(CommandError::new(
                chain.join(" "),
                CommandErrorKind::InvalidSyntax { correct_syntax },
            ));
        }

        node.command.clone().ok_or_else(|| {
            let correct_syntax = Self::closest_syntax(node, None);
            CommandError::new(chain.join(" "), CommandErrorKind::InvalidSyntax { correct_syntax })
        })
    }

    /// Tab-completion candidates for the token the sender is currently
    /// typing (§4.D.3). Never fails: any parser error or unresolved prefix
    /// along the way simply yields no suggestions.
    #[must_use]
    #[tracing::instrument(level = "trace", skip_all, fields(input = input.remaining()))]
    pub fn suggest(&self, context: &mut CommandContext<S>, input: &mut CommandInput) -> Vec<Suggestion> {
        let mut siblings: &[Node<S>] = &self.roots;

        loop {
            let trimmed = input.remaining_trimmed();
            if trimmed.is_empty() {
                return Self::suggest_at(context, siblings, "");
            }

            let Some(space_at) = trimmed.find(' ') else {
                return Self::suggest_at(context, siblings, trimmed);
            };
            let token = trimmed[..space_at].to_string();

            let chosen = Self::find_literal_child(siblings, &token, self.case_sensitive_literals)
                .or_else(|| Self::find_non_literal_child(siblings));
            let Some(child) = chosen else {
                return Vec::new();
            };

            match &child.component.kind {
                ComponentKind::Literal { .. } => {
                    let _ = input.read_string();
                }
                ComponentKind::Variable { parser, .. } => {
                    if parser.parse_and_bind(context, input).is_err() {
                        return Vec::new();
                    }
                }
                ComponentKind::Flags(flags) => {
                    return flags.suggestions(context, trimmed);
                }
            }
            siblings = &child.children;
        }
    }

    fn suggest_at(context: &CommandContext<S>, siblings: &[Node<S>], partial: &str) -> Vec<Suggestion> {
        let mut out = Vec::new();
        for child in siblings {
            match &child.component.kind {
                ComponentKind::Literal { name, aliases } => {
                    out.extend(literal::suggestions(name, aliases, partial));
                }
                ComponentKind::Variable { parser, .. } => out.extend(parser.suggestions(context, partial)),
                ComponentKind::Flags(flags) => out.extend(flags.suggestions(context, partial)),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::TypedKey;
    use crate::parser::numeric::IntegerParser;
    use crate::parser::string::{StringMode, StringParser};

    const PLAYER: TypedKey<String> = TypedKey::new("player");
    const AMOUNT: TypedKey<i64> = TypedKey::new("amount");

    fn build_give() -> Command<()> {
        Command::builder("give")
            .then(CommandComponent::required(
                "player",
                PLAYER,
                StringParser::new("player", StringMode::Single),
            ))
            .then(CommandComponent::optional(
                "amount",
                AMOUNT,
                IntegerParser::new("amount", None),
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn resolves_a_full_required_and_optional_path() {
        let mut tree = CommandTree::new(false);
        tree.insert(build_give()).unwrap();
        let mut ctx = CommandContext::new(());
        let mut input = CommandInput::new("give Steve 5");
        let matched = tree.parse(&mut ctx, &mut input).unwrap();
        assert_eq!(matched.path().first().unwrap().name(), "give");
        assert_eq!(ctx.get(PLAYER).map(String::as_str), Some("Steve"));
        assert_eq!(ctx.get(AMOUNT), Some(&5));
    }

    #[test]
    fn resolves_with_the_optional_argument_omitted() {
        let mut tree = CommandTree::new(false);
        tree.insert(build_give()).unwrap();
        let mut ctx = CommandContext::new(());
        let mut input = CommandInput::new("give Steve");
        let matched = tree.parse(&mut ctx, &mut input);
        assert!(matched.is_ok());
        assert_eq!(ctx.get(AMOUNT), None);
    }

    #[test]
    fn unknown_root_is_no_such_command() {
        let mut tree = CommandTree::new(false);
        tree.insert(build_give()).unwrap();
        let mut ctx = CommandContext::new(());
        let mut input = CommandInput::new("frobnicate");
        let result = tree.parse(&mut ctx, &mut input);
        assert!(matches!(
            result,
            Err(CommandError {
                kind: CommandErrorKind::NoSuchCommand { .. },
                ..
            })
        ));
    }

    #[test]
    fn incomplete_required_argument_is_invalid_syntax() {
        let mut tree = CommandTree::new(false);
        tree.insert(build_give()).unwrap();
        let mut ctx = CommandContext::new(());
        // Nothing follows the root, so the required <player> never matches.
        let mut input = CommandInput::new("give");
        let result = tree.parse(&mut ctx, &mut input);
        assert!(matches!(
            result,
            Err(CommandError {
                kind: CommandErrorKind::InvalidSyntax { .. },
                ..
            })
        ));
    }

    #[test]
    fn trailing_garbage_after_a_full_match_is_invalid_syntax() {
        let mut tree = CommandTree::new(false);
        tree.insert(build_give()).unwrap();
        let mut ctx = CommandContext::new(());
        let mut input = CommandInput::new("give Steve 5 extra garbage");
        let result = tree.parse(&mut ctx, &mut input);
        assert!(matches!(
            result,
            Err(CommandError {
                kind: CommandErrorKind::InvalidSyntax { .. },
                ..
            })
        ));
    }

    #[test]
    fn skipped_optional_with_a_default_binds_it() {
        use crate::component::Default_;

        let mut tree = CommandTree::new(false);
        tree.insert(
            Command::builder("give")
                .then(CommandComponent::required(
                    "player",
                    PLAYER,
                    StringParser::new("player", StringMode::Single),
                ))
                .then(CommandComponent::optional_with_default(
                    "amount",
                    AMOUNT,
                    IntegerParser::new("amount", None),
                    Default_::Value(1),
                ))
                .build()
                .unwrap(),
        )
        .unwrap();
        let mut ctx = CommandContext::new(());
        let mut input = CommandInput::new("give Steve");
        tree.parse(&mut ctx, &mut input).unwrap();
        assert_eq!(ctx.get(AMOUNT), Some(&1));
    }

    #[test]
    fn distinct_root_names_do_not_conflict() {
        let mut tree = CommandTree::<()>::new(false);
        tree.insert(Command::builder("teleport").build().unwrap()).unwrap();
        let result = tree.insert(Command::builder("tp").build().unwrap());
        assert!(result.is_ok());
    }

    #[test]
    fn root_alias_conflicting_with_another_root_is_rejected() {
        let mut tree = CommandTree::<()>::new(false);
        tree.insert(Command::builder("teleport").build().unwrap()).unwrap();
        let result = tree.insert(Command::builder("home").alias("teleport").build().unwrap());
        assert!(matches!(result, Err(InsertError::AliasConflict { .. })));
    }

    #[test]
    fn suggestions_list_matching_literal_children() {
        let mut tree = CommandTree::<()>::new(false);
        tree.insert(Command::builder("teleport").build().unwrap()).unwrap();
        tree.insert(Command::builder("tell").build().unwrap()).unwrap();
        let mut ctx = CommandContext::new(());
        let mut input = CommandInput::new("te");
        let suggestions = tree.suggest(&mut ctx, &mut input);
        assert_eq!(suggestions.len(), 2);
    }

    #[test]
    fn invalid_syntax_reports_the_chain_and_the_closest_full_syntax() {
        let mut tree = CommandTree::<()>::new(false);
        tree.insert(Command::builder("config").then(CommandComponent::literal("set")).build().unwrap())
            .unwrap();
        tree.insert(Command::builder("config").then(CommandComponent::literal("reset")).build().unwrap())
            .unwrap();
        let mut ctx = CommandContext::new(());
        let mut input = CommandInput::new("config re");
        let error = tree.parse(&mut ctx, &mut input).unwrap_err();
        assert_eq!(error.chain, "config");
        assert!(matches!(
            error.kind,
            CommandErrorKind::InvalidSyntax { correct_syntax } if correct_syntax == "config reset"
        ));
    }
}
