//! The help handler: answers a descriptor query over the visible subset of
//! a [`crate::tree::CommandTree`] (§4.J).
use crate::component::{CommandComponent, ComponentKind};
use crate::tree::{CommandTree, Node};

/// One command's rendered syntax, e.g. `"give <player> [amount]"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxHint {
    /// The command's space-joined syntax string.
    pub syntax: String,
    /// The command's description, if it carries one.
    pub description: Option<&'static str>,
}

/// The result of a single [`HelpHandler::query`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpResult {
    /// The query uniquely identified one terminal command.
    VerboseCommand(SyntaxHint),
    /// The query matched a subtree reachable by more than one terminal; the
    /// common path plus each child's short syntax is returned.
    MultipleCommand {
        /// The longest path shared by every match, e.g. `"config"`.
        common_path: String,
        /// One hint per reachable terminal beneath the common path.
        children: Vec<SyntaxHint>,
    },
    /// The query didn't resolve to a single command or subtree; lists the
    /// visible root commands instead. An empty query always lands here.
    IndexCommand(Vec<SyntaxHint>),
}

/// Walks a [`CommandTree`] to answer help queries, filtering every visited
/// command through a caller-supplied visibility predicate (§4.J).
pub struct HelpHandler<'a, S> {
    tree: &'a CommandTree<S>,
}

impl<'a, S> HelpHandler<'a, S> {
    /// Builds a handler over the given tree.
    #[must_use]
    pub fn new(tree: &'a CommandTree<S>) -> Self {
        Self { tree }
    }

    /// Answers a query (a space-separated command-chain prefix, possibly
    /// empty) against the subset of the tree `visible` accepts.
    pub fn query(&self, query: &str, visible: &dyn Fn(&crate::component::Command<S>) -> bool) -> HelpResult {
        let tokens: Vec<&str> = query.split_whitespace().collect();
        if tokens.is_empty() {
            return HelpResult::IndexCommand(self.index(visible));
        }

        let Some((matched_path, node)) = Self::resolve(self.tree.roots(), &tokens) else {
            return HelpResult::IndexCommand(self.index(visible));
        };

        let terminals = Self::collect_terminals(node, visible);
        match terminals.len() {
            0 => HelpResult::IndexCommand(self.index(visible)),
            1 => HelpResult::VerboseCommand(Self::hint_for(terminals[0])),
            _ => HelpResult::MultipleCommand {
                common_path: matched_path,
                children: terminals.into_iter().map(Self::hint_for).collect(),
            },
        }
    }

    fn index(&self, visible: &dyn Fn(&crate::component::Command<S>) -> bool) -> Vec<SyntaxHint> {
        self.tree
            .roots()
            .iter()
            .filter_map(|root| root.command())
            .filter(|command| visible(command))
            .map(|command| Self::hint_for(command))
            .collect()
    }

    fn resolve<'n>(siblings: &'n [Node<S>], tokens: &[&str]) -> Option<(String, &'n Node<S>)> {
        let (first, rest) = tokens.split_first()?;
        let node = siblings.iter().find(|node| Self::node_matches(node, first))?;
        if rest.is_empty() {
            return Some((node.component().name().to_string(), node));
        }
        let (deeper_path, deeper_node) = Self::resolve(node.children(), rest)?;
        Some((format!("{} {}", node.component().name(), deeper_path), deeper_node))
    }

    fn node_matches(node: &Node<S>, token: &str) -> bool {
        match node.component().kind() {
            ComponentKind::Literal { name, aliases } => {
                name.eq_ignore_ascii_case(token) || aliases.iter().any(|alias| alias.eq_ignore_ascii_case(token))
            }
            ComponentKind::Variable { name, .. } => *name == token,
            ComponentKind::Flags(_) => false,
        }
    }

    fn collect_terminals<'n>(
        node: &'n Node<S>,
        visible: &dyn Fn(&crate::component::Command<S>) -> bool,
    ) -> Vec<&'n crate::component::Command<S>> {
        let mut out = Vec::new();
        Self::collect_terminals_into(node, visible, &mut out);
        out
    }

    /// A command with a trailing optional component is reachable from more
    /// than one node (§3: `CommandTree::insert` attaches it at every depth
    /// from the last required component onward), so the same `Arc<Command<S>>`
    /// can surface at several nodes in one subtree. Dedup by identity so a
    /// single command is never double-counted as "multiple" terminals.
    fn collect_terminals_into<'n>(
        node: &'n Node<S>,
        visible: &dyn Fn(&crate::component::Command<S>) -> bool,
        out: &mut Vec<&'n crate::component::Command<S>>,
    ) {
        if let Some(command) = node.command() {
            if visible(command) && !out.iter().any(|existing| std::ptr::eq(*existing, command.as_ref())) {
                out.push(command.as_ref());
            }
        }
        for child in node.children() {
            Self::collect_terminals_into(child, visible, out);
        }
    }

    fn hint_for(command: &crate::component::Command<S>) -> SyntaxHint {
        SyntaxHint {
            syntax: render_syntax(command.path()),
            description: command.description(),
        }
    }
}

/// Renders a command's path per the §4.J formatting rule: literals as their
/// name, required variables as `<name>`, optional variables as `[name]`,
/// and a trailing flag container as `[--flag] [--other <value>]…`.
#[must_use]
pub fn render_syntax<S>(path: &[CommandComponent<S>]) -> String {
    let mut parts = Vec::with_capacity(path.len());
    for component in path {
        match component.kind() {
            ComponentKind::Literal { name, .. } => parts.push((*name).to_string()),
            ComponentKind::Variable { name, .. } => {
                if component.is_required() {
                    parts.push(format!("<{name}>"));
                } else {
                    parts.push(format!("[{name}]"));
                }
            }
            ComponentKind::Flags(flags) => parts.push(flags.render_syntax()),
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Command, CommandComponent};
    use crate::flag::FlagSet;
    use crate::key::TypedKey;
    use crate::parser::numeric::IntegerParser;
    use crate::parser::string::{StringMode, StringParser};

    const PLAYER: TypedKey<String> = TypedKey::new("player");
    const AMOUNT: TypedKey<i64> = TypedKey::new("amount");

    fn always_visible(_: &Command<()>) -> bool {
        true
    }

    fn build_tree() -> CommandTree<()> {
        let mut tree = CommandTree::new(false);
        tree.insert(
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
                .description("gives an item to a player")
                .build()
                .unwrap(),
        )
        .unwrap();
        tree.insert(
            Command::builder("config")
                .then(CommandComponent::literal("set"))
                .build()
                .unwrap(),
        )
        .unwrap();
        tree.insert(
            Command::builder("config")
                .then(CommandComponent::literal("reset"))
                .build()
                .unwrap(),
        )
        .unwrap();
        tree
    }

    #[test]
    fn empty_query_returns_the_root_index() {
        let tree = build_tree();
        let result = HelpHandler::new(&tree).query("", &always_visible);
        assert!(matches!(result, HelpResult::IndexCommand(hints) if hints.len() == 2));
    }

    #[test]
    fn query_matching_a_single_terminal_is_verbose() {
        let tree = build_tree();
        let result = HelpHandler::new(&tree).query("give", &always_visible);
        match result {
            HelpResult::VerboseCommand(hint) => {
                assert_eq!(hint.syntax, "give <player> [amount]");
                assert_eq!(hint.description, Some("gives an item to a player"));
            }
            other => panic!("expected VerboseCommand, got {other:?}"),
        }
    }

    #[test]
    fn query_matching_a_subtree_lists_its_children() {
        let tree = build_tree();
        let result = HelpHandler::new(&tree).query("config", &always_visible);
        match result {
            HelpResult::MultipleCommand { common_path, children } => {
                assert_eq!(common_path, "config");
                assert_eq!(children.len(), 2);
            }
            other => panic!("expected MultipleCommand, got {other:?}"),
        }
    }

    #[test]
    fn unresolvable_query_falls_back_to_the_index() {
        let tree = build_tree();
        let result = HelpHandler::new(&tree).query("frobnicate", &always_visible);
        assert!(matches!(result, HelpResult::IndexCommand(_)));
    }

    #[test]
    fn invisible_commands_are_excluded_from_the_index() {
        let tree = build_tree();
        let result = HelpHandler::new(&tree).query("", &|command: &Command<()>| {
            command.path().first().map(CommandComponent::name) != Some("give")
        });
        assert!(matches!(result, HelpResult::IndexCommand(hints) if hints.len() == 1));
    }
}
