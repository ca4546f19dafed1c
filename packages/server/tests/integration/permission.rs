use serde_json::json;

use crate::common::{TestApp, routes};

/// Seeded permission forest size.
const SEEDED: u64 = 8;

async fn create(app: &TestApp, token: &str, code: &str, parent_id: i32) -> i32 {
    let res = app
        .post_with_token(
            routes::PERMISSIONS,
            &json!({"parentId": parent_id, "code": code, "name": code, "category": "api"}),
            token,
        )
        .await;
    assert_eq!(res.status, 200, "create permission failed: {}", res.text);
    res.body["data"].as_i64().unwrap() as i32
}

#[tokio::test]
async fn tree_nests_children_under_seeded_roots() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let res = app.get_with_token(routes::PERMISSION_TREE, &token).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let roots = res.body["data"].as_array().unwrap();
    let system = roots
        .iter()
        .find(|n| n["code"] == "system")
        .expect("system root");
    assert_eq!(system["parentId"], 0);
    let children: Vec<&str> = system["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["code"].as_str().unwrap())
        .collect();
    assert!(children.contains(&"role:manage"));
    assert!(children.contains(&"user:manage"));

    let count = app.get_with_token(routes::PERMISSION_COUNT, &token).await;
    assert_eq!(count.body["data"], SEEDED);
}

#[tokio::test]
async fn deleting_a_parent_removes_its_whole_subtree() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let root = create(&app, &token, "report", 0).await;
    let child = create(&app, &token, "report:view", root).await;
    let grandchild = create(&app, &token, "report:view:export", child).await;

    let children = app
        .get_with_token(&routes::permission_children(root), &token)
        .await;
    assert_eq!(children.body["data"].as_array().unwrap().len(), 1);

    let res = app.delete_with_token(&routes::permission(root), &token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    let mut deleted: Vec<i64> = res.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect();
    deleted.sort();
    assert_eq!(deleted, vec![root as i64, child as i64, grandchild as i64]);

    let gone = app
        .get_with_token(&routes::permission(grandchild), &token)
        .await;
    assert_eq!(gone.status, 404);
    assert_eq!(gone.code(), 13001);

    let count = app.get_with_token(routes::PERMISSION_COUNT, &token).await;
    assert_eq!(count.body["data"], SEEDED);
}

#[tokio::test]
async fn creating_under_a_missing_parent_fails() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let res = app
        .post_with_token(
            routes::PERMISSIONS,
            &json!({"parentId": 99999, "code": "orphan"}),
            &token,
        )
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(res.code(), 13001);
}

#[tokio::test]
async fn update_keeps_unspecified_fields() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let id = create(&app, &token, "stats", 0).await;

    let res = app
        .put_with_token(
            &routes::permission(id),
            &json!({"name": "统计", "method": "GET"}),
            &token,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["data"]["code"], "stats");
    assert_eq!(res.body["data"]["name"], "统计");
    assert_eq!(res.body["data"]["method"], "GET");
}

#[tokio::test]
async fn list_filters_by_code_and_pages() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let res = app
        .get_with_token(
            &format!("{}?keyword=problem:&pageSize=1&sortProperty=code", routes::PERMISSIONS),
            &token,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["data"]["total"], 2);
    assert_eq!(res.body["data"]["size"], 1);
    assert_eq!(res.body["data"]["list"][0]["code"], "problem:manage");

    let bad = app
        .get_with_token(&format!("{}?sortProperty=secret", routes::PERMISSIONS), &token)
        .await;
    assert_eq!(bad.status, 400);
}

#[tokio::test]
async fn regular_users_cannot_manage_permissions() {
    let app = TestApp::spawn().await;
    let token = app
        .register_user("judy", "judy@example.com", "securepass")
        .await;

    let res = app.get_with_token(routes::PERMISSION_TREE, &token).await;
    assert_eq!(res.status, 403);
}
