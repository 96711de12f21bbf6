//! Sender-type and permission gating on a single terminal command, and the
//! exception-controller routing each kind of denial takes (§4.H, §6).
use cloud::context::CommandContext;
use cloud::error::CommandErrorKind;
use cloud::permission::{Permission, PermissionChecked};
use cloud::sender::SenderRequirement;
use cloud::{Command, CommandError, CommandManager, CommandManagerSettings};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Role {
    Player,
    Admin,
}

#[derive(Clone)]
struct Sender {
    role: Role,
    granted: &'static [&'static str],
}

impl PermissionChecked for Sender {
    fn has_permission(&self, permission: &Permission) -> bool {
        permission.is_none() || self.granted.contains(&permission.as_str())
    }
}

fn build_manager() -> CommandManager<Sender> {
    let mut manager = CommandManager::new(CommandManagerSettings::default());
    manager
        .register(
            Command::builder("admin")
                .requires_sender(SenderRequirement::new("Admin", |sender: &Sender| sender.role == Role::Admin))
                .permission("admin.use")
                .handler(|_: &mut CommandContext<Sender>| async { Ok(()) })
                .build()
                .unwrap(),
        )
        .unwrap();
    manager
}

#[tokio::test]
async fn non_admin_sender_is_rejected_before_the_permission_check() {
    let manager = build_manager();
    let sender = Sender {
        role: Role::Player,
        granted: &["admin.use"],
    };
    let result = manager.execute(sender, "admin").await;
    assert!(matches!(
        result,
        Err(CommandError {
            kind: CommandErrorKind::InvalidCommandSender { required_type: "Admin" },
            ..
        })
    ));
}

#[tokio::test]
async fn admin_sender_lacking_the_permission_is_denied() {
    let manager = build_manager();
    let sender = Sender {
        role: Role::Admin,
        granted: &[],
    };
    let result = manager.execute(sender, "admin").await;
    assert!(matches!(
        result,
        Err(CommandError {
            kind: CommandErrorKind::NoPermission { .. },
            ..
        })
    ));
}

#[tokio::test]
async fn admin_sender_with_the_permission_succeeds() {
    let manager = build_manager();
    let sender = Sender {
        role: Role::Admin,
        granted: &["admin.use"],
    };
    let outcome = manager.execute(sender, "admin").await;
    assert!(outcome.is_ok());
}

#[tokio::test]
async fn help_query_hides_admin_only_commands_from_a_player() {
    let manager = build_manager();
    let player = Sender {
        role: Role::Player,
        granted: &[],
    };
    let result = manager.help_query(&player, "");
    match result {
        cloud::HelpResult::IndexCommand(hints) => assert!(hints.is_empty()),
        other => panic!("expected an empty IndexCommand, got {other:?}"),
    }

    let admin = Sender {
        role: Role::Admin,
        granted: &["admin.use"],
    };
    let result = manager.help_query(&admin, "");
    match result {
        cloud::HelpResult::IndexCommand(hints) => assert_eq!(hints.len(), 1),
        other => panic!("expected one visible command, got {other:?}"),
    }
}
