use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

/// Fixed role set, ordered by privilege: admin > moderator > user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Moderator,
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Moderator, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::User => "user",
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            Role::Admin => 2,
            Role::Moderator => 1,
            Role::User => 0,
        }
    }

    pub fn outranks(&self, other: Role) -> bool {
        self.rank() > other.rank()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "moderator" => Ok(Role::Moderator),
            "user" => Ok(Role::User),
            other => Err(AppError::Validation(format!("Unknown role: {}", other))),
        }
    }
}

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct RoleRecord {
    pub id: i64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("root".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_hierarchy() {
        assert!(Role::Admin.outranks(Role::Moderator));
        assert!(Role::Moderator.outranks(Role::User));
        assert!(!Role::User.outranks(Role::User));
        assert!(!Role::Moderator.outranks(Role::Admin));
    }
}
