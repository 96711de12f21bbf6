//! Tab-completion: a parser whose suggestions narrow to a fixed candidate
//! list by prefix, reached through `CommandManager::suggest`.
use cloud::component::CommandComponent;
use cloud::context::CommandContext;
use cloud::error::ArgumentParseError;
use cloud::input::CommandInput;
use cloud::key::TypedKey;
use cloud::parser::{filter_by_prefix, ArgumentParser, ParseOutcome, Suggestion};
use cloud::permission::{Permission, PermissionChecked};
use cloud::{Command, CommandManager, CommandManagerSettings};

#[derive(Clone)]
struct Sender;

impl PermissionChecked for Sender {
    fn has_permission(&self, _permission: &Permission) -> bool {
        true
    }
}

const NAME: TypedKey<String> = TypedKey::new("name");

struct KnownNames(&'static [&'static str]);

impl<S> ArgumentParser<S, String> for KnownNames {
    fn parse(&self, _context: &mut CommandContext<S>, input: &mut CommandInput) -> ParseOutcome<String> {
        input.read_string().map_err(|_| ArgumentParseError::NoInputProvided {
            argument: "name".to_string(),
        })
    }

    fn suggestions(&self, _context: &CommandContext<S>, partial: &str) -> Vec<Suggestion> {
        filter_by_prefix(self.0.iter().copied(), partial)
    }

    fn value_type_name(&self) -> &'static str {
        "name"
    }
}

fn build_manager() -> CommandManager<Sender> {
    let mut manager = CommandManager::new(CommandManagerSettings::default());
    manager
        .register(
            Command::builder("greet")
                .then(CommandComponent::required(
                    "name",
                    NAME,
                    KnownNames(&["Alice", "Albert", "Bob"]),
                ))
                .handler(|_: &mut CommandContext<Sender>| async { Ok(()) })
                .build()
                .unwrap(),
        )
        .unwrap();
    manager
}

#[test]
fn suggests_names_matching_the_typed_prefix_in_order() {
    let manager = build_manager();
    let suggestions = manager.suggest(Sender, "greet Al");
    assert_eq!(
        suggestions,
        vec![Suggestion::new("Alice"), Suggestion::new("Albert")]
    );
}

#[test]
fn suggests_the_root_command_itself_on_an_empty_line() {
    let manager = build_manager();
    let suggestions = manager.suggest(Sender, "");
    assert_eq!(suggestions, vec![Suggestion::new("greet")]);
}
