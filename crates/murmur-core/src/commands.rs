use murmur_types::models::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    On,
    Off,
    Block,
    Unblock,
    AddAdmin,
    RemoveAdmin,
    ListAdmins,
    ExportUsers,
}

/// One row of the command table.
#[derive(Debug)]
pub struct CommandSpec {
    pub name: &'static str,
    pub command: Command,
    pub action: Action,
    /// Reply for missing or malformed arguments; `None` for commands without any.
    pub usage: Option<&'static str>,
    /// Reply when the store fails underneath the command.
    pub failure: &'static str,
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "start",
        command: Command::Start,
        action: Action::Start,
        usage: None,
        failure: crate::notices::REGISTER_FAILED,
    },
    CommandSpec {
        name: "help",
        command: Command::Help,
        action: Action::Help,
        usage: None,
        failure: crate::notices::GENERIC_FAILURE,
    },
    CommandSpec {
        name: "on",
        command: Command::On,
        action: Action::Activate,
        usage: None,
        failure: crate::notices::GENERIC_FAILURE,
    },
    CommandSpec {
        name: "off",
        command: Command::Off,
        action: Action::Deactivate,
        usage: None,
        failure: crate::notices::GENERIC_FAILURE,
    },
    CommandSpec {
        name: "block",
        command: Command::Block,
        action: Action::Block,
        usage: Some("Use: /block <user_id>"),
        failure: "❌ Error blocking user.",
    },
    CommandSpec {
        name: "desblock",
        command: Command::Unblock,
        action: Action::Unblock,
        usage: Some("Use: /desblock <user_id>"),
        failure: "❌ Error unblocking user.",
    },
    CommandSpec {
        name: "add_admin",
        command: Command::AddAdmin,
        action: Action::Promote,
        usage: Some("Use: /add_admin <user_id>"),
        failure: "❌ Error adding admin. Use: /add_admin <user_id>",
    },
    CommandSpec {
        name: "remove_admin",
        command: Command::RemoveAdmin,
        action: Action::Demote,
        usage: Some("Use: /remove_admin <user_id>"),
        failure: "❌ Error removing admin. Use: /remove_admin <user_id>",
    },
    CommandSpec {
        name: "list_admins",
        command: Command::ListAdmins,
        action: Action::ListAdmins,
        usage: None,
        failure: "❌ Error listing administrators.",
    },
    CommandSpec {
        name: "export_users",
        command: Command::ExportUsers,
        action: Action::ExportUsers,
        usage: None,
        failure: "❌ An error occurred while exporting the users.",
    },
];

pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.name == name)
}
