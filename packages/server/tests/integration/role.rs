use serde_json::json;

use crate::common::{TestApp, routes};

async fn create_role(app: &TestApp, token: &str, name: &str) -> i32 {
    let res = app
        .post_with_token(
            routes::ROLES,
            &json!({"name": name, "description": "test role"}),
            token,
        )
        .await;
    assert_eq!(res.status, 200, "create role failed: {}", res.text);
    res.id()
}

async fn permission_id(app: &TestApp, token: &str, code: &str) -> i64 {
    let res = app
        .get_with_token(&format!("{}?keyword={code}", routes::PERMISSIONS), token)
        .await;
    res.body["data"]["list"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["code"] == code)
        .and_then(|p| p["id"].as_i64())
        .expect("seeded permission")
}

/// Replace the role's grants and read back the stored permission ids.
async fn set_role_permissions(
    app: &TestApp,
    token: &str,
    role: i32,
    ids: &[i64],
) -> serde_json::Value {
    let res = app
        .put_with_token(
            &routes::role_permissions(role),
            &json!({"permissionIds": ids}),
            token,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    app.get_with_token(&routes::role_permission_ids(role), token)
        .await
        .body["data"]
        .clone()
}

#[tokio::test]
async fn granted_permissions_reach_the_token_after_relogin() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let user = app
        .register_user("kate", "kate@example.com", "securepass")
        .await;

    let denied = app.get_with_token(routes::PROBLEMS, &user).await;
    assert_eq!(denied.status, 403);

    let role = create_role(&app, &admin, "setter").await;
    let manage = permission_id(&app, &admin, "problem:manage").await;
    let res = app
        .put_with_token(
            &routes::role_permissions(role),
            &json!({"permissionIds": [manage, manage]}),
            &admin,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    let ids = app
        .get_with_token(&routes::role_permission_ids(role), &admin)
        .await;
    assert_eq!(ids.body["data"], json!([manage]));

    let me = app.get_with_token(routes::ME, &user).await;
    let user_id = me.body["data"]["id"].as_i64().unwrap() as i32;
    let default_roles = me.body["data"]["roles"].clone();
    let mut role_ids: Vec<i64> = serde_json::from_value(default_roles).unwrap();
    role_ids.push(role as i64);
    let res = app
        .put_with_token(
            &routes::user_roles(user_id),
            &json!({"roleIds": role_ids}),
            &admin,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    let user = app.login("kate@example.com", "securepass").await;
    let allowed = app.get_with_token(routes::PROBLEMS, &user).await;
    assert_eq!(allowed.status, 200, "{}", allowed.text);
}

#[tokio::test]
async fn unknown_permission_ids_are_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let role = create_role(&app, &admin, "broken").await;

    let res = app
        .put_with_token(
            &routes::role_permissions(role),
            &json!({"permissionIds": [424242]}),
            &admin,
        )
        .await;
    assert_eq!(res.code(), 13001);

    let ids = app
        .get_with_token(&routes::role_permission_ids(role), &admin)
        .await;
    assert_eq!(ids.body["data"], json!([]));
}

#[tokio::test]
async fn deleted_roles_disappear_from_listings() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let role = create_role(&app, &admin, "temp").await;

    let simple = app.get_with_token(routes::ROLES_SIMPLE, &admin).await;
    assert!(
        simple.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .any(|r| r["name"] == "temp")
    );

    let res = app.delete_with_token(&routes::role(role), &admin).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let res = app.get_with_token(&routes::role(role), &admin).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.code(), 14001);

    let again = app.delete_with_token(&routes::role(role), &admin).await;
    assert_eq!(again.code(), 14001);
}

#[tokio::test]
async fn admin_created_users_get_the_default_password() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let res = app
        .post_with_token(
            routes::USERS,
            &json!({"userName": "mallory", "email": "mallory@example.com"}),
            &admin,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    let id = res.id();
    let login_name = res.body["data"]["loginName"].as_str().unwrap().to_string();
    assert_eq!(login_name.len(), 32);

    app.login(&login_name, crate::common::ADMIN_PASSWORD).await;

    let res = app.delete_with_token(&routes::user(id), &admin).await;
    assert_eq!(res.status, 200, "{}", res.text);
    let res = app.get_with_token(&routes::user(id), &admin).await;
    assert_eq!(res.code(), 11012);
}

#[tokio::test]
async fn role_permission_updates_replace_previous_grants() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let role = create_role(&app, &admin, "reviewer").await;
    let view = permission_id(&app, &admin, "problem:view").await;
    let manage = permission_id(&app, &admin, "problem:manage").await;
    let mut both = vec![view, manage];
    both.sort_unstable();

    assert_eq!(set_role_permissions(&app, &admin, role, &both).await, json!(both));
    assert_eq!(set_role_permissions(&app, &admin, role, &[manage]).await, json!([manage]));
    assert_eq!(set_role_permissions(&app, &admin, role, &both).await, json!(both));
    assert_eq!(set_role_permissions(&app, &admin, role, &[]).await, json!([]));
}

#[tokio::test]
async fn user_role_updates_drop_old_roles() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let user = app
        .register_user("lena", "lena@example.com", "securepass")
        .await;
    let me = app.get_with_token(routes::ME, &user).await;
    let user_id = me.body["data"]["id"].as_i64().unwrap() as i32;
    let default_roles = me.body["data"]["roles"].clone();
    assert_ne!(default_roles, json!([]));

    let first = create_role(&app, &admin, "first").await;
    let second = create_role(&app, &admin, "second").await;

    let res = app
        .put_with_token(
            &routes::user_roles(user_id),
            &json!({"roleIds": [first, second]}),
            &admin,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    let roles = app
        .get_with_token(&routes::user_roles(user_id), &admin)
        .await;
    assert_eq!(roles.body["data"], json!([first, second]));

    let res = app
        .put_with_token(
            &routes::user_roles(user_id),
            &json!({"roleIds": [second]}),
            &admin,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    let roles = app
        .get_with_token(&routes::user_roles(user_id), &admin)
        .await;
    assert_eq!(roles.body["data"], json!([second]));

    let res = app
        .put_with_token(&routes::user_roles(user_id), &json!({"roleIds": []}), &admin)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    let roles = app
        .get_with_token(&routes::user_roles(user_id), &admin)
        .await;
    assert_eq!(roles.body["data"], json!([]));
}
