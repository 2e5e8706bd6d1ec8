mod common;

use axum::http::StatusCode;
use common::TestApp;
use filament_tracker::error::AppError;
use serde_json::json;

#[tokio::test]
async fn test_blocking_group_cascades_to_members() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let group_a = app.create_group(&admin, "GroupA").await;
    app.create_user(&admin, "alice", "user", Some(group_a)).await;
    app.create_user(&admin, "mod_a", "moderator", Some(group_a)).await;

    let stale_token = app.login("alice", "password123").await;

    let (status, group) = app.put(&format!("/api/v1/groups/{}/block", group_a), &admin, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(group["is_active"], false);

    let (_, users) = app.get("/api/v1/users", &admin).await;
    for user in users.as_array().unwrap().iter().filter(|u| u["group_id"] == group_a) {
        assert_eq!(user["is_active"], false, "{:?} still active", user["username"]);
    }

    for username in ["alice", "mod_a"] {
        let (status, body) = app.try_login(username, "password123").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Your group is blocked. Contact an administrator.");
    }

    let (status, _) = app.get("/api/v1/auth/me", &stale_token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, group) = app.put(&format!("/api/v1/groups/{}/unblock", group_a), &admin, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(group["is_active"], true);

    let (status, _) = app.try_login("alice", "password123").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_group_holding_an_admin_is_protected() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let ops = app.create_group(&admin, "Ops").await;
    app.create_user(&admin, "ops_admin", "admin", Some(ops)).await;

    let (status, body) = app.put(&format!("/api/v1/groups/{}/block", ops), &admin, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Group contains an administrator and cannot be blocked or deleted");

    let (status, _) = app.delete(&format!("/api/v1/groups/{}", ops), &admin).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, groups) = app.get("/api/v1/groups", &admin).await;
    let ops_group = groups.as_array().unwrap().iter().find(|g| g["id"] == ops).unwrap();
    assert_eq!(ops_group["is_active"], true);
}

#[tokio::test]
async fn test_group_management_is_admin_only() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let group_a = app.create_group(&admin, "GroupA").await;
    let group_b = app.create_group(&admin, "GroupB").await;
    app.create_user(&admin, "mod_a", "moderator", Some(group_a)).await;
    let moderator = app.login("mod_a", "password123").await;

    let (status, body) = app.put(&format!("/api/v1/groups/{}/block", group_a), &moderator, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "this action cannot target yourself or your own group");

    let (status, _) = app.put(&format!("/api/v1/groups/{}/block", group_b), &moderator, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.post("/api/v1/groups", &moderator, json!({ "name": "Rogue" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/v1/groups", &moderator).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_duplicate_and_missing_groups() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.create_group(&admin, "GroupA").await;

    let (status, _) = app.post("/api/v1/groups", &admin, json!({ "name": "GroupA" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.post("/api/v1/groups", &admin, json!({ "name": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.put("/api/v1/groups/9999/block", &admin, json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_group_detaches_members_and_inventory() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let group = app.create_group(&admin, "Doomed").await;
    let member = app.create_user(&admin, "erin", "user", Some(group)).await;
    let pla = app.create_plastic_type(&admin, "PLA").await;
    let spool = app.create_spool(&admin, pla, 1000.0, Some(group)).await;

    let (status, body) = app.delete(&format!("/api/v1/groups/{}", group), &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "deleted");

    let (_, users) = app.get("/api/v1/users", &admin).await;
    let erin = users.as_array().unwrap().iter().find(|u| u["id"] == member).unwrap();
    assert_eq!(erin["is_active"], false);
    assert!(erin["group_id"].is_null());

    let (status, spool) = app.get(&format!("/api/v1/spools/{}", spool["id"]), &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert!(spool["group_id"].is_null());

    let (status, _) = app.delete(&format!("/api/v1/groups/{}", group), &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_check_is_enforced_by_the_group_store() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let ops = app.create_group(&admin, "Ops").await;
    app.create_user(&admin, "worker", "user", Some(ops)).await;
    let late_admin = app.create_user(&admin, "late_admin", "admin", None).await;

    // Admin moved in after any handler-level look at the member list.
    let (status, _) = app.put(&format!("/api/v1/users/{}", late_admin), &admin, json!({ "group_id": ops })).await;
    assert_eq!(status, StatusCode::OK);

    let blocked = app.state.group_repo.set_active(ops, false).await;
    assert!(matches!(blocked, Err(AppError::ProtectedGroup)), "{:?}", blocked.map(|g| g.id));
    let deleted = app.state.group_repo.delete(ops).await;
    assert!(matches!(deleted, Err(AppError::ProtectedGroup)));

    let members = app.state.user_repo.list_group_members(ops).await.unwrap();
    assert_eq!(members.len(), 2);
    assert!(members.iter().all(|m| m.is_active));
    assert!(app.state.group_repo.find_by_id(ops).await.unwrap().unwrap().is_active);

    let reactivated = app.state.group_repo.set_active(ops, true).await.unwrap();
    assert!(reactivated.is_active);
}
