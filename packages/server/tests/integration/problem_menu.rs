use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn blank_fields_get_defaults_and_the_creator_is_kept() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let res = app.post_with_token(routes::MENUS, &json!({}), &token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["data"]["name"], "未命名题单");
    assert_eq!(res.body["data"]["description"], "无描述信息");
    let id = res.id();
    let creator = res.body["data"]["creatorId"].clone();

    let res = app
        .put_with_token(&routes::menu(id), &json!({"name": "动态规划"}), &token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["data"]["name"], "动态规划");
    assert_eq!(res.body["data"]["description"], "无描述信息");
    assert_eq!(res.body["data"]["creatorId"], creator);
}

#[tokio::test]
async fn listing_counts_member_problems() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let menu = app.create_menu(&token, "graphs").await;
    app.create_menu(&token, "strings").await;

    let res = app
        .post_with_token(
            routes::PROBLEMS,
            &json!({"number": "G1", "menuIds": [menu]}),
            &token,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["data"]["menuIds"], json!([menu]));

    let res = app
        .get_with_token(&format!("{}?name=graph", routes::MENUS), &token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["data"]["total"], 1);
    let item = &res.body["data"]["list"][0];
    assert_eq!(item["problemCount"], 1);
    assert_eq!(item["creatorName"], "administrator");

    let simple = app.get_with_token(routes::MENUS_SIMPLE, &token).await;
    assert_eq!(simple.body["data"].as_array().unwrap().len(), 2);
    let all = app.get_with_token(routes::MENUS_ALL, &token).await;
    assert_eq!(all.body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn non_empty_menus_need_force_to_delete() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let menu = app.create_menu(&token, "greedy").await;
    let problem = app
        .post_with_token(
            routes::PROBLEMS,
            &json!({"number": "GR1", "menuIds": [menu]}),
            &token,
        )
        .await
        .id();

    let res = app.delete_with_token(&routes::menu(menu), &token).await;
    assert_eq!(res.status, 422);
    assert_eq!(res.code(), 11513);

    let res = app
        .delete_with_token(&format!("{}?force=true", routes::menu(menu)), &token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    let res = app.get_with_token(&routes::menu(menu), &token).await;
    assert_eq!(res.code(), 11514);

    let res = app.get_with_token(&routes::problem(problem), &token).await;
    assert_eq!(res.body["data"]["menuIds"], json!([]));
}

#[tokio::test]
async fn problems_cannot_join_missing_menus() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let res = app
        .post_with_token(
            routes::PROBLEMS,
            &json!({"number": "M404", "menuIds": [31337]}),
            &token,
        )
        .await;
    assert_eq!(res.code(), 11514);

    let check = app
        .get_with_token(&format!("{}?number=M404", routes::CHECK_NUMBER), &token)
        .await;
    assert_eq!(check.body["data"], true);
}

#[tokio::test]
async fn uploaded_icon_is_public() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let res = app
        .upload_with_token(routes::MENU_ICON, "icon.png", b"icon-bytes".to_vec(), &token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    let url = res.body["data"].as_str().unwrap();
    assert!(url.starts_with(&app.url("/api/v1/problem-menus/icon/")));

    let served = app.client.get(url).send().await.unwrap();
    assert_eq!(served.status().as_u16(), 200);
    assert_eq!(served.bytes().await.unwrap().as_ref(), b"icon-bytes");
}
