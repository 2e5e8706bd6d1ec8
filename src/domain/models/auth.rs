use serde::{Deserialize, Serialize};

use crate::domain::models::{group::Group, role::Role, user::User};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// An authenticated caller: an active user together with its parsed role and group.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
    pub role: Role,
    pub group: Option<Group>,
}

impl Identity {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn group_id(&self) -> Option<i64> {
        self.group.as_ref().map(|g| g.id)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn group_blocked(&self) -> bool {
        self.group.as_ref().is_some_and(|g| !g.is_active)
    }
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Serialize)]
pub struct GroupRef {
    pub id: i64,
    pub name: String,
}

#[derive(Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub group: Option<GroupRef>,
}

impl From<&Identity> for UserProfile {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.user.id,
            username: identity.user.username.clone(),
            role: identity.role,
            group: identity.group.as_ref().map(|g| GroupRef { id: g.id, name: g.name.clone() }),
        }
    }
}
