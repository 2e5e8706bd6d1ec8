mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

struct Fixture {
    app: TestApp,
    admin: String,
    group_a: i64,
    group_b: i64,
    moderator: String,
}

async fn fixture() -> Fixture {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let group_a = app.create_group(&admin, "GroupA").await;
    let group_b = app.create_group(&admin, "GroupB").await;
    app.create_user(&admin, "mod_a", "moderator", Some(group_a)).await;
    let moderator = app.login("mod_a", "password123").await;
    Fixture { app, admin, group_a, group_b, moderator }
}

#[tokio::test]
async fn test_moderator_creates_users_in_own_group_only() {
    let f = fixture().await;

    let payload = json!({ "username": "u1", "password": "pw", "group_id": f.group_b });
    let (status, created) = f.app.post("/api/v1/users", &f.moderator, payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["role"], "user");
    assert_eq!(created["group_id"], f.group_a);
    assert!(created.get("password_hash").is_none());

    let payload = json!({ "username": "m2", "password": "pw", "role": "moderator" });
    let (status, body) = f.app.post("/api/v1/users", &f.moderator, payload).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "your role does not permit this action");

    let payload = json!({ "username": "a2", "password": "pw", "role": "admin" });
    let (status, _) = f.app.post("/api/v1/users", &f.moderator, payload).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_moderator_cannot_elevate_or_move_users() {
    let f = fixture().await;
    let u1 = f.app.create_user(&f.moderator, "u1", "user", None).await;

    let (status, _) = f.app.put(&format!("/api/v1/users/{}", u1), &f.moderator, json!({ "role": "admin" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = f.app.put(&format!("/api/v1/users/{}", u1), &f.moderator, json!({ "role": "moderator" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = f.app.put(&format!("/api/v1/users/{}", u1), &f.moderator, json!({ "group_id": f.group_b })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = f.app.put(&format!("/api/v1/users/{}", u1), &f.moderator, json!({ "password": "fresh" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["role"], "user");
    f.app.login("u1", "fresh").await;

    let (status, updated) = f.app.put(&format!("/api/v1/users/{}", u1), &f.admin, json!({ "role": "moderator" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["role"], "moderator");
}

#[tokio::test]
async fn test_moderator_sees_and_manages_only_own_group() {
    let f = fixture().await;
    f.app.create_user(&f.moderator, "u1", "user", None).await;
    let foreign = f.app.create_user(&f.admin, "b1", "user", Some(f.group_b)).await;

    let (status, users) = f.app.get("/api/v1/users", &f.moderator).await;
    assert_eq!(status, StatusCode::OK);
    let mut names: Vec<&str> = users.as_array().unwrap().iter().map(|u| u["username"].as_str().unwrap()).collect();
    names.sort();
    assert_eq!(names, vec!["mod_a", "u1"]);

    let (status, _) = f.app.put(&format!("/api/v1/users/{}/block", foreign), &f.moderator, json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = f.app.put(&format!("/api/v1/users/{}", foreign), &f.moderator, json!({ "password": "x" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_nobody_can_block_themselves() {
    let f = fixture().await;

    let (_, me) = f.app.get("/api/v1/auth/me", &f.moderator).await;
    let (status, body) = f.app.put(&format!("/api/v1/users/{}/block", me["id"]), &f.moderator, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "this action cannot target yourself or your own group");

    let (_, me) = f.app.get("/api/v1/auth/me", &f.admin).await;
    let (status, _) = f.app.put(&format!("/api/v1/users/{}/block", me["id"]), &f.admin, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_plain_users_cannot_manage_identities() {
    let f = fixture().await;
    f.app.create_user(&f.admin, "u1", "user", Some(f.group_a)).await;
    let user = f.app.login("u1", "password123").await;

    let (status, _) = f.app.get("/api/v1/users", &user).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let payload = json!({ "username": "u2", "password": "pw" });
    let (status, _) = f.app.post("/api/v1/users", &user, payload).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_user_creation_validation() {
    let f = fixture().await;
    f.app.create_user(&f.admin, "u1", "user", Some(f.group_a)).await;

    let payload = json!({ "username": "u1", "password": "pw", "group_id": f.group_a });
    let (status, _) = f.app.post("/api/v1/users", &f.admin, payload).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let payload = json!({ "username": "u3", "password": "", "group_id": f.group_a });
    let (status, _) = f.app.post("/api/v1/users", &f.admin, payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let payload = json!({ "username": "u4", "password": "pw", "group_id": 9999 });
    let (status, _) = f.app.post("/api/v1/users", &f.admin, payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
