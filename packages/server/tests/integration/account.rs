use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn info_reflects_profile_updates() {
    let app = TestApp::spawn().await;
    let token = app
        .register_user("grace", "grace@example.com", "securepass")
        .await;

    let res = app
        .put_with_token(
            routes::ACCOUNT_INFO,
            &json!({
                "userName": "Grace H.",
                "introduction": "compilers",
                "gender": 2,
                "birthday": "1990-12-09",
            }),
            &token,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    let info = app.get_with_token(routes::ACCOUNT_INFO, &token).await;
    assert_eq!(info.status, 200);
    assert_eq!(info.body["data"]["userName"], "Grace H.");
    assert_eq!(info.body["data"]["introduction"], "compilers");
    assert_eq!(info.body["data"]["gender"], 2);
    assert_eq!(info.body["data"]["birthday"], "1990-12-09");
    assert_eq!(info.body["data"]["codingAge"], 0);
}

#[tokio::test]
async fn password_change_requires_the_old_password() {
    let app = TestApp::spawn().await;
    let token = app
        .register_user("heidi", "heidi@example.com", "securepass")
        .await;

    let wrong = app
        .post_with_token(
            routes::ACCOUNT_PASSWORD,
            &json!({"oldPassword": "not-it", "newPassword": "brandnew"}),
            &token,
        )
        .await;
    assert_eq!(wrong.code(), 11000);

    let res = app
        .post_with_token(
            routes::ACCOUNT_PASSWORD,
            &json!({"oldPassword": "securepass", "newPassword": "brandnew"}),
            &token,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    app.login("heidi@example.com", "brandnew").await;
}

#[tokio::test]
async fn uploaded_avatar_is_served_back() {
    let app = TestApp::spawn().await;
    let token = app
        .register_user("ivan", "ivan@example.com", "securepass")
        .await;
    let bytes = b"\x89PNG\r\n\x1a\nfake".to_vec();

    let res = app
        .upload_with_token(routes::ACCOUNT_AVATAR, "me.PNG", bytes.clone(), &token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    let url = res.body["data"].as_str().unwrap().to_string();
    assert!(url.starts_with(&app.url("/api/v1/account/avatar/")));
    assert!(url.ends_with(".png"));

    let served = app.client.get(&url).send().await.unwrap();
    assert_eq!(served.status().as_u16(), 200);
    assert_eq!(
        served.headers()["content-type"].to_str().unwrap(),
        "image/png"
    );
    assert_eq!(served.bytes().await.unwrap().to_vec(), bytes);
}

#[tokio::test]
async fn missing_avatar_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app
        .get_without_token(&format!("{}/nothing.png", routes::ACCOUNT_AVATAR))
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(res.code(), 11511);
}
