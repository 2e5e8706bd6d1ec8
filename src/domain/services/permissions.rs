//! Authorization decisions for every protected operation.
//!
//! All role and group rules live in [`RULES`]; handlers call [`authorize`]
//! before touching storage and never branch on roles themselves.

use std::fmt;
use serde::Serialize;
use tracing::warn;

use crate::domain::models::{auth::Identity, role::Role, user::User};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenReason {
    RoleMismatch,
    GroupMismatch,
    SelfTarget,
    GroupBlocked,
}

impl fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ForbiddenReason::RoleMismatch => "your role does not permit this action",
            ForbiddenReason::GroupMismatch => "resource belongs to another group",
            ForbiddenReason::SelfTarget => "this action cannot target yourself or your own group",
            ForbiddenReason::GroupBlocked => "your group is blocked",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewProfile,
    ReadInventory,
    WriteInventory,
    RemoveInventory,
    ReadCatalog,
    WriteCatalog,
    RemoveCatalog,
    ListIdentities,
    /// Create, modify or (de)activate an identity holding `role`. `target` is the
    /// existing identity's id, `None` when creating.
    ManageIdentity { role: Role, target: Option<i64> },
    ListRoles,
    ListGroups,
    CreateGroup,
    BlockGroup,
    UnblockGroup,
    DeleteGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionKind {
    ViewProfile,
    ReadInventory,
    WriteInventory,
    RemoveInventory,
    ReadCatalog,
    WriteCatalog,
    RemoveCatalog,
    ListIdentities,
    ManageIdentity,
    ListRoles,
    ListGroups,
    CreateGroup,
    ChangeGroupState,
}

impl Action {
    fn kind(&self) -> ActionKind {
        match self {
            Action::ViewProfile => ActionKind::ViewProfile,
            Action::ReadInventory => ActionKind::ReadInventory,
            Action::WriteInventory => ActionKind::WriteInventory,
            Action::RemoveInventory => ActionKind::RemoveInventory,
            Action::ReadCatalog => ActionKind::ReadCatalog,
            Action::WriteCatalog => ActionKind::WriteCatalog,
            Action::RemoveCatalog => ActionKind::RemoveCatalog,
            Action::ListIdentities => ActionKind::ListIdentities,
            Action::ManageIdentity { .. } => ActionKind::ManageIdentity,
            Action::ListRoles => ActionKind::ListRoles,
            Action::ListGroups => ActionKind::ListGroups,
            Action::CreateGroup => ActionKind::CreateGroup,
            Action::BlockGroup | Action::UnblockGroup | Action::DeleteGroup => ActionKind::ChangeGroupState,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Deny,
    OwnGroup,
    Any,
}

struct Rule {
    action: ActionKind,
    admin: Scope,
    moderator: Scope,
    user: Scope,
}

const fn rule(action: ActionKind, admin: Scope, moderator: Scope, user: Scope) -> Rule {
    Rule { action, admin, moderator, user }
}

use Scope::{Any, Deny, OwnGroup};

const RULES: &[Rule] = &[
    rule(ActionKind::ViewProfile, Any, Any, Any),
    rule(ActionKind::ReadInventory, Any, OwnGroup, OwnGroup),
    rule(ActionKind::WriteInventory, Any, OwnGroup, OwnGroup),
    rule(ActionKind::RemoveInventory, Any, OwnGroup, Deny),
    rule(ActionKind::ReadCatalog, Any, Any, Any),
    rule(ActionKind::WriteCatalog, Any, Any, Any),
    rule(ActionKind::RemoveCatalog, Any, Deny, Deny),
    rule(ActionKind::ListIdentities, Any, OwnGroup, Deny),
    rule(ActionKind::ManageIdentity, Any, OwnGroup, Deny),
    rule(ActionKind::ListRoles, Any, Any, Deny),
    rule(ActionKind::ListGroups, Any, Deny, Deny),
    rule(ActionKind::CreateGroup, Any, Deny, Deny),
    rule(ActionKind::ChangeGroupState, Any, Deny, Deny),
];

fn scope_for(role: Role, kind: ActionKind) -> Scope {
    RULES
        .iter()
        .find(|r| r.action == kind)
        .map(|r| match role {
            Role::Admin => r.admin,
            Role::Moderator => r.moderator,
            Role::User => r.user,
        })
        .unwrap_or(Deny)
}

/// Decides whether `caller` may perform `action` on a resource owned by `resource_group`.
///
/// For group state changes `resource_group` is the targeted group itself.
pub fn authorize(caller: &Identity, action: Action, resource_group: Option<i64>) -> Result<(), AppError> {
    evaluate(caller, action, resource_group).map_err(|reason| {
        warn!(
            user_id = caller.id(),
            role = %caller.role,
            ?action,
            ?resource_group,
            %reason,
            "authorization denied"
        );
        AppError::Forbidden(reason)
    })
}

fn evaluate(caller: &Identity, action: Action, resource_group: Option<i64>) -> Result<(), ForbiddenReason> {
    if caller.group_blocked() && action != Action::ViewProfile {
        return Err(ForbiddenReason::GroupBlocked);
    }

    match action {
        Action::BlockGroup | Action::UnblockGroup | Action::DeleteGroup => {
            if resource_group.is_some() && resource_group == caller.group_id() {
                return Err(ForbiddenReason::SelfTarget);
            }
        }
        Action::ManageIdentity { target: Some(target), .. } if target == caller.id() => {
            return Err(ForbiddenReason::SelfTarget);
        }
        _ => {}
    }

    match scope_for(caller.role, action.kind()) {
        Deny => return Err(ForbiddenReason::RoleMismatch),
        OwnGroup => {
            if caller.group_id().is_none() || caller.group_id() != resource_group {
                return Err(ForbiddenReason::GroupMismatch);
            }
        }
        Any => {}
    }

    // Below admin, only strictly lower roles can be granted or managed.
    if let Action::ManageIdentity { role, .. } = action {
        if !caller.is_admin() && !caller.role.outranks(role) {
            return Err(ForbiddenReason::RoleMismatch);
        }
    }

    Ok(())
}

/// Groups holding an administrator can be neither blocked nor deleted.
pub fn ensure_group_unprotected(members: &[User]) -> Result<(), AppError> {
    if members.iter().any(|m| m.role == Role::Admin.as_str()) {
        return Err(AppError::ProtectedGroup);
    }
    Ok(())
}

/// Reports a foreign-group denial as a missing resource so other tenants stay invisible.
pub fn hide_foreign(result: Result<(), AppError>, what: &str) -> Result<(), AppError> {
    match result {
        Err(AppError::Forbidden(ForbiddenReason::GroupMismatch)) => Err(AppError::NotFound(format!("{} not found", what))),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::group::Group;
    use chrono::Utc;

    const GROUP_A: i64 = 1;
    const GROUP_B: i64 = 2;

    fn identity(id: i64, role: Role, group: Option<i64>) -> Identity {
        Identity {
            user: User {
                id,
                username: format!("user{}", id),
                password_hash: String::new(),
                role: role.as_str().to_string(),
                group_id: group,
                is_active: true,
                created_at: Utc::now(),
            },
            role,
            group: group.map(|g| Group { id: g, name: format!("Group{}", g), is_active: true, created_at: Utc::now() }),
        }
    }

    fn reason(result: Result<(), AppError>) -> Option<ForbiddenReason> {
        match result {
            Ok(()) => None,
            Err(AppError::Forbidden(r)) => Some(r),
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }

    fn all_actions() -> Vec<Action> {
        let mut actions = vec![
            Action::ViewProfile,
            Action::ReadInventory,
            Action::WriteInventory,
            Action::RemoveInventory,
            Action::ReadCatalog,
            Action::WriteCatalog,
            Action::RemoveCatalog,
            Action::ListIdentities,
            Action::ListRoles,
            Action::ListGroups,
            Action::CreateGroup,
            Action::BlockGroup,
            Action::UnblockGroup,
            Action::DeleteGroup,
        ];
        for role in Role::ALL {
            actions.push(Action::ManageIdentity { role, target: None });
            actions.push(Action::ManageIdentity { role, target: Some(99) });
        }
        actions
    }

    #[test]
    fn test_admin_is_unrestricted() {
        let admin = identity(1, Role::Admin, None);
        for action in all_actions() {
            for group in [None, Some(GROUP_A), Some(GROUP_B)] {
                assert!(authorize(&admin, action, group).is_ok(), "{:?} on {:?}", action, group);
            }
        }
    }

    #[test]
    fn test_user_role_allow_table() {
        let user = identity(5, Role::User, Some(GROUP_A));
        let allowed_in_own_group = [Action::ViewProfile, Action::ReadInventory, Action::WriteInventory, Action::ReadCatalog, Action::WriteCatalog];

        for action in all_actions() {
            let result = authorize(&user, action, Some(GROUP_A));
            if allowed_in_own_group.contains(&action) {
                assert!(result.is_ok(), "{:?} should be allowed", action);
            } else {
                assert!(reason(result).is_some(), "{:?} should be forbidden", action);
            }
        }
    }

    #[test]
    fn test_moderator_role_allow_table() {
        let moderator = identity(2, Role::Moderator, Some(GROUP_A));
        let allowed_in_own_group = [
            Action::ViewProfile,
            Action::ReadInventory,
            Action::WriteInventory,
            Action::RemoveInventory,
            Action::ReadCatalog,
            Action::WriteCatalog,
            Action::ListIdentities,
            Action::ManageIdentity { role: Role::User, target: None },
            Action::ManageIdentity { role: Role::User, target: Some(99) },
            Action::ListRoles,
        ];
        let allowed_anywhere = [Action::ViewProfile, Action::ReadCatalog, Action::WriteCatalog, Action::ListRoles];

        for action in all_actions() {
            let own = authorize(&moderator, action, Some(GROUP_A));
            if allowed_in_own_group.contains(&action) {
                assert!(own.is_ok(), "{:?} should be allowed in own group", action);
            } else {
                assert!(reason(own).is_some(), "{:?} should be forbidden in own group", action);
            }

            let foreign = authorize(&moderator, action, Some(GROUP_B));
            if allowed_anywhere.contains(&action) {
                assert!(foreign.is_ok(), "{:?} should be allowed in another group", action);
            } else {
                assert!(reason(foreign).is_some(), "{:?} should be forbidden in another group", action);
            }
        }
    }

    #[test]
    fn test_user_cannot_touch_other_groups() {
        let user = identity(5, Role::User, Some(GROUP_B));
        assert_eq!(reason(authorize(&user, Action::WriteInventory, Some(GROUP_A))), Some(ForbiddenReason::GroupMismatch));
        assert_eq!(reason(authorize(&user, Action::ReadInventory, Some(GROUP_A))), Some(ForbiddenReason::GroupMismatch));
        assert_eq!(reason(authorize(&user, Action::ReadInventory, None)), Some(ForbiddenReason::GroupMismatch));
        assert_eq!(reason(authorize(&user, Action::ManageIdentity { role: Role::User, target: None }, Some(GROUP_B))), Some(ForbiddenReason::RoleMismatch));
        assert_eq!(reason(authorize(&user, Action::CreateGroup, None)), Some(ForbiddenReason::RoleMismatch));
    }

    #[test]
    fn test_user_without_group_has_no_inventory_access() {
        let user = identity(5, Role::User, None);
        assert_eq!(reason(authorize(&user, Action::ReadInventory, None)), Some(ForbiddenReason::GroupMismatch));
        assert!(authorize(&user, Action::ReadCatalog, None).is_ok());
    }

    #[test]
    fn test_moderator_manages_only_users_of_own_group() {
        let moderator = identity(2, Role::Moderator, Some(GROUP_A));

        assert!(authorize(&moderator, Action::ManageIdentity { role: Role::User, target: None }, Some(GROUP_A)).is_ok());
        assert!(authorize(&moderator, Action::ManageIdentity { role: Role::User, target: Some(7) }, Some(GROUP_A)).is_ok());

        assert_eq!(
            reason(authorize(&moderator, Action::ManageIdentity { role: Role::User, target: None }, Some(GROUP_B))),
            Some(ForbiddenReason::GroupMismatch)
        );
        assert_eq!(
            reason(authorize(&moderator, Action::ManageIdentity { role: Role::Moderator, target: None }, Some(GROUP_A))),
            Some(ForbiddenReason::RoleMismatch)
        );
        assert_eq!(
            reason(authorize(&moderator, Action::ManageIdentity { role: Role::Admin, target: Some(7) }, Some(GROUP_A))),
            Some(ForbiddenReason::RoleMismatch)
        );
        assert_eq!(
            reason(authorize(&moderator, Action::ManageIdentity { role: Role::User, target: Some(2) }, Some(GROUP_A))),
            Some(ForbiddenReason::SelfTarget)
        );
    }

    #[test]
    fn test_moderator_inventory_scope() {
        let moderator = identity(2, Role::Moderator, Some(GROUP_A));
        assert!(authorize(&moderator, Action::RemoveInventory, Some(GROUP_A)).is_ok());
        assert_eq!(reason(authorize(&moderator, Action::RemoveInventory, Some(GROUP_B))), Some(ForbiddenReason::GroupMismatch));
        assert_eq!(reason(authorize(&moderator, Action::RemoveCatalog, None)), Some(ForbiddenReason::RoleMismatch));
    }

    #[test]
    fn test_moderator_can_never_change_own_group_state() {
        let moderator = identity(2, Role::Moderator, Some(GROUP_A));
        for action in [Action::BlockGroup, Action::UnblockGroup, Action::DeleteGroup] {
            assert_eq!(reason(authorize(&moderator, action, Some(GROUP_A))), Some(ForbiddenReason::SelfTarget));
            assert_eq!(reason(authorize(&moderator, action, Some(GROUP_B))), Some(ForbiddenReason::RoleMismatch));
        }
    }

    #[test]
    fn test_admin_cannot_change_own_group_state() {
        let admin = identity(1, Role::Admin, Some(GROUP_A));
        assert_eq!(reason(authorize(&admin, Action::BlockGroup, Some(GROUP_A))), Some(ForbiddenReason::SelfTarget));
        assert!(authorize(&admin, Action::BlockGroup, Some(GROUP_B)).is_ok());
    }

    #[test]
    fn test_blocked_group_only_views_profile() {
        let mut user = identity(5, Role::Moderator, Some(GROUP_A));
        if let Some(group) = user.group.as_mut() {
            group.is_active = false;
        }
        assert!(authorize(&user, Action::ViewProfile, None).is_ok());
        for action in all_actions().into_iter().filter(|a| *a != Action::ViewProfile) {
            assert_eq!(reason(authorize(&user, action, Some(GROUP_A))), Some(ForbiddenReason::GroupBlocked));
        }
    }

    #[test]
    fn test_every_action_kind_has_a_rule() {
        for action in all_actions() {
            assert!(RULES.iter().any(|r| r.action == action.kind()), "{:?} missing from RULES", action);
        }
    }

    #[test]
    fn test_protected_group_detection() {
        let member = identity(5, Role::User, Some(GROUP_A)).user;
        let admin = identity(1, Role::Admin, Some(GROUP_A)).user;
        assert!(ensure_group_unprotected(&[member.clone()]).is_ok());
        assert!(matches!(ensure_group_unprotected(&[member, admin]), Err(AppError::ProtectedGroup)));
        assert!(ensure_group_unprotected(&[]).is_ok());
    }

    #[test]
    fn test_hide_foreign_only_masks_group_mismatch() {
        let user = identity(5, Role::User, Some(GROUP_B));
        assert!(matches!(
            hide_foreign(authorize(&user, Action::WriteInventory, Some(GROUP_A)), "Spool"),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            hide_foreign(authorize(&user, Action::RemoveInventory, Some(GROUP_B)), "Spool"),
            Err(AppError::Forbidden(ForbiddenReason::RoleMismatch))
        ));
    }
}
