//! End-to-end dispatch scenarios: a manager with a handful of registered
//! commands, driven entirely through `CommandManager::execute`.
use cloud::component::{CommandComponent, Default_};
use cloud::coordinator::HandlerOutcome;
use cloud::flag::FlagSet;
use cloud::key::TypedKey;
use cloud::parser::numeric::{IntegerParser, Range};
use cloud::parser::string::{StringMode, StringParser};
use cloud::permission::{Permission, PermissionChecked};
use cloud::{Command, CommandContext, CommandError, CommandErrorKind, CommandManager, CommandManagerSettings};

#[derive(Clone)]
struct Sender {
    admin: bool,
}

impl PermissionChecked for Sender {
    fn has_permission(&self, permission: &Permission) -> bool {
        permission.is_none() || self.admin
    }
}

const NAME: TypedKey<String> = TypedKey::new("name");
const PLAYER: TypedKey<String> = TypedKey::new("player");
const AMOUNT: TypedKey<i64> = TypedKey::new("amount");

fn noop(_: &mut CommandContext<Sender>) -> impl std::future::Future<Output = HandlerOutcome> {
    async { Ok(()) }
}

fn build_manager() -> CommandManager<Sender> {
    let mut manager = CommandManager::new(CommandManagerSettings::default());

    manager
        .register(
            Command::builder("greet")
                .then(CommandComponent::required(
                    "name",
                    NAME,
                    StringParser::new("name", StringMode::Single),
                ))
                .handler(noop)
                .build()
                .unwrap(),
        )
        .unwrap();

    manager
        .register(
            Command::builder("give")
                .then(CommandComponent::required(
                    "player",
                    PLAYER,
                    StringParser::new("player", StringMode::Single),
                ))
                .then(CommandComponent::optional_with_default(
                    "amount",
                    AMOUNT,
                    IntegerParser::new("amount", Some(Range::new(1, 64))),
                    Default_::Value(1),
                ))
                .handler(noop)
                .build()
                .unwrap(),
        )
        .unwrap();

    manager
        .register(
            Command::builder("config")
                .then(CommandComponent::literal("set"))
                .handler(noop)
                .build()
                .unwrap(),
        )
        .unwrap();
    manager
        .register(
            Command::builder("config")
                .then(CommandComponent::literal("reset"))
                .handler(noop)
                .build()
                .unwrap(),
        )
        .unwrap();

    manager
}

#[tokio::test]
async fn greet_binds_the_required_name_argument() {
    let manager = build_manager();
    let outcome = manager
        .execute(Sender { admin: false }, "greet Alice")
        .await
        .unwrap();
    assert_eq!(outcome.context().get(NAME).map(String::as_str), Some("Alice"));
}

#[tokio::test]
async fn give_defaults_amount_when_omitted() {
    let manager = build_manager();
    let outcome = manager.execute(Sender { admin: false }, "give bob").await.unwrap();
    assert_eq!(outcome.context().get(PLAYER).map(String::as_str), Some("bob"));
    assert_eq!(outcome.context().get(AMOUNT), Some(&1));
}

#[tokio::test]
async fn give_rejects_an_out_of_range_amount() {
    let manager = build_manager();
    let result = manager.execute(Sender { admin: false }, "give bob 100").await;
    match result {
        Err(CommandError {
            kind: CommandErrorKind::ArgumentParse(cloud::error::ArgumentParseError::NumberOutOfRange { min, max, input, .. }),
            ..
        }) => {
            assert_eq!(min, "1");
            assert_eq!(max, "64");
            assert_eq!(input, "100");
        }
        other => panic!("expected NumberOutOfRange, got {other:?}"),
    }
}

#[tokio::test]
async fn diverging_partway_through_a_subtree_is_invalid_syntax() {
    let manager = build_manager();
    let result = manager.execute(Sender { admin: false }, "config re").await;
    match result {
        Err(CommandError {
            chain,
            kind: CommandErrorKind::InvalidSyntax { correct_syntax },
        }) => {
            assert_eq!(chain, "config");
            assert_eq!(correct_syntax, "config reset");
        }
        other => panic!("expected InvalidSyntax, got {other:?}"),
    }
}

#[tokio::test]
async fn deploy_accepts_a_value_and_presence_flag_together() {
    let mut manager = CommandManager::<Sender>::new(CommandManagerSettings::default());
    const TARGET: TypedKey<String> = TypedKey::new("target");
    const COUNT: TypedKey<i64> = TypedKey::new("count");
    const FORCE: TypedKey<bool> = TypedKey::new("force");

    manager
        .register(
            Command::builder("deploy")
                .then(CommandComponent::required(
                    "target",
                    TARGET,
                    StringParser::new("target", StringMode::Single),
                ))
                .then(CommandComponent::flags(
                    FlagSet::new()
                        .presence("force", Some('f'), FORCE)
                        .value(
                            "count",
                            Some('c'),
                            false,
                            std::sync::Arc::new(cloud::component::TypedComponentParser::new(
                                COUNT,
                                IntegerParser::new("count", None),
                            )),
                        ),
                ))
                .handler(noop)
                .build()
                .unwrap(),
        )
        .unwrap();

    let outcome = manager
        .execute(Sender { admin: false }, "deploy --force --count 3 prod")
        .await
        .unwrap();
    let context = outcome.context();
    assert_eq!(context.get(TARGET).map(String::as_str), Some("prod"));
    assert_eq!(context.get(FORCE), Some(&true));
    assert_eq!(context.get(COUNT), Some(&3));

    let result = manager.execute(Sender { admin: false }, "deploy prod --unknown").await;
    assert!(matches!(
        result,
        Err(CommandError {
            kind: CommandErrorKind::ArgumentParse(cloud::error::ArgumentParseError::UnknownFlag { .. }),
            ..
        })
    ));
}
