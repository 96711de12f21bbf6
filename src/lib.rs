//! Cloud: a general-purpose command dispatch framework.
//!
//! Given a free-form text line from some sender, [`manager::CommandManager`]
//! identifies which registered command it invokes, parses each argument
//! with a typed [`parser::ArgumentParser`], enforces per-command
//! permissions and sender-type constraints, and either runs the matched
//! handler or routes a structured failure to the most specific registered
//! [`exception::ExceptionController`] handler. The same
//! [`tree::CommandTree`] answers tab-completion ([`manager::CommandManager::suggest`])
//! and help ([`manager::CommandManager::help_query`]) queries.
//!
//! Platform integrations, annotation/DSL command builders, caption
//! rendering, and confirmation middleware are external collaborators; this
//! crate only specifies the interfaces they plug into (the
//! [`caption::CaptionFormatter`] trait, the [`coordinator`] traits, the
//! [`sender::PermissionChecked`] trait).

pub mod caption;
pub mod component;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod exception;
pub mod flag;
pub mod help;
pub mod input;
pub mod key;
pub mod manager;
pub mod parser;
pub mod permission;
pub mod preprocessor;
pub mod sender;
pub mod tree;

pub use component::{Command, CommandBuilder, CommandComponent};
pub use context::CommandContext;
pub use coordinator::{AsyncCoordinator, CommandExecutionCoordinator, CommandHandler, InlineCoordinator};
pub use error::{CommandError, CommandErrorKind};
pub use help::{HelpHandler, HelpResult};
pub use input::CommandInput;
pub use key::TypedKey;
pub use manager::{CommandManager, CommandManagerError, CommandManagerSettings, DispatchOutcome, ManagerState};
pub use permission::{Permission, PermissionChecked};
pub use sender::SenderRequirement;
pub use tree::CommandTree;
