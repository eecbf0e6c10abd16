use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chat-platform identity of a person talking to the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid user id: {0:?}")]
pub struct ParseUserIdError(pub String);

impl FromStr for UserId {
    type Err = ParseUserIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(UserId)
            .map_err(|_| ParseUserIdError(s.to_string()))
    }
}

/// Derived privilege level. Ordering follows privilege: `RegularUser < Admin < Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    RegularUser,
    Admin,
    Owner,
}

impl Role {
    /// Pure role derivation. The owner comparison wins over any stored flag.
    pub fn derive(id: UserId, owner: UserId, stored_admin: bool) -> Self {
        if id == owner {
            Role::Owner
        } else if stored_admin {
            Role::Admin
        } else {
            Role::RegularUser
        }
    }

    pub fn at_least(self, required: Role) -> bool {
        self >= required
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::RegularUser => "user",
            Role::Admin => "admin",
            Role::Owner => "owner",
        };
        f.write_str(name)
    }
}

/// Anything a principal can ask the bot to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Start,
    Help,
    SendAnonymous,
    Activate,
    Deactivate,
    Block,
    Unblock,
    Promote,
    Demote,
    ListAdmins,
    ExportUsers,
}

impl Action {
    pub fn required_role(self) -> Role {
        match self {
            Action::Start | Action::Help | Action::SendAnonymous => Role::RegularUser,
            Action::Activate
            | Action::Deactivate
            | Action::Block
            | Action::Unblock
            | Action::ListAdmins
            | Action::ExportUsers => Role::Admin,
            Action::Promote | Action::Demote => Role::Owner,
        }
    }
}

/// Best-effort display record for a user, as reported by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName {
    pub name: String,
    pub username: Option<String>,
}
