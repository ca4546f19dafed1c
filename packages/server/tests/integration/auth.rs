use std::time::Duration;

use serde_json::json;

use crate::common::{ADMIN_PASSWORD, TestApp, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn registering_with_a_planted_code_creates_a_default_user() {
        let app = TestApp::spawn().await;

        let token = app
            .register_user("alice", "alice@example.com", "securepass")
            .await;

        let me = app.get_with_token(routes::ME, &token).await;
        assert_eq!(me.status, 200, "{}", me.text);
        assert_eq!(me.body["data"]["email"], "alice@example.com");
        assert_eq!(me.body["data"]["userName"], "alice");
        let permissions = me.body["data"]["permissions"].as_array().unwrap();
        assert!(permissions.iter().any(|p| p == "problem:view"));
        assert!(!permissions.iter().any(|p| p == "problem:manage"));
    }

    #[tokio::test]
    async fn wrong_code_is_rejected() {
        let app = TestApp::spawn().await;
        app.plant_register_code("bob@example.com", "111111").await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "bob",
                    "email": "bob@example.com",
                    "password": "securepass",
                    "code": "222222",
                }),
            )
            .await;

        assert_eq!(res.status, 422);
        assert_eq!(res.code(), 11007);
    }

    #[tokio::test]
    async fn the_same_email_cannot_register_twice() {
        let app = TestApp::spawn().await;
        app.register_user("carol", "carol@example.com", "securepass")
            .await;

        app.plant_register_code("carol@example.com", "654321").await;
        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "carol2",
                    "email": "carol@example.com",
                    "password": "securepass",
                    "code": "654321",
                }),
            )
            .await;

        assert_eq!(res.status, 422);
        assert_eq!(res.code(), 11002);
    }

    #[tokio::test]
    async fn short_passwords_are_rejected() {
        let app = TestApp::spawn().await;
        app.plant_register_code("dave@example.com", "123456").await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "dave",
                    "email": "dave@example.com",
                    "password": "123",
                    "code": "123456",
                }),
            )
            .await;

        assert_eq!(res.code(), 11009);
    }

    #[tokio::test]
    async fn send_code_stores_a_six_digit_code() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::SEND_CODE,
                &json!({"email": "erin@example.com", "kind": "register"}),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let code = app
            .cache
            .get("emailcode-register-erin@example.com")
            .await
            .unwrap()
            .expect("code should be cached");
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn send_code_rejects_unknown_kinds_and_bad_emails() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::SEND_CODE,
                &json!({"email": "erin@example.com", "kind": "reset"}),
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.code(), 11005);

        let res = app
            .post_without_token(
                routes::SEND_CODE,
                &json!({"email": "not-an-email", "kind": "login"}),
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.code(), 11001);
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn seeded_admin_can_log_in_by_login_name() {
        let app = TestApp::spawn().await;

        let token = app.login("admin", ADMIN_PASSWORD).await;
        let me = app.get_with_token(routes::ME, &token).await;

        assert_eq!(me.status, 200);
        assert_eq!(me.body["data"]["loginName"], "admin");
        let permissions = me.body["data"]["permissions"].as_array().unwrap();
        assert!(permissions.iter().any(|p| p == "role:manage"));
        assert!(permissions.iter().any(|p| p == "submission:record"));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN_PASSWORD,
                &json!({"account": "admin", "password": "nope-nope"}),
            )
            .await;

        assert_eq!(res.status, 422);
        assert_eq!(res.code(), 11000);
    }

    #[tokio::test]
    async fn email_code_login_consumes_the_code() {
        let app = TestApp::spawn().await;
        app.register_user("frank", "frank@example.com", "securepass")
            .await;

        app.cache
            .set_ex(
                "emailcode-login-frank@example.com",
                "777777",
                Duration::from_secs(60),
            )
            .await
            .unwrap();
        let body = json!({"email": "frank@example.com", "code": "777777"});

        let first = app.post_without_token(routes::LOGIN_EMAIL, &body).await;
        assert_eq!(first.status, 200, "{}", first.text);
        assert!(first.body["data"]["token"].is_string());

        let second = app.post_without_token(routes::LOGIN_EMAIL, &body).await;
        assert_eq!(second.code(), 11006);
    }

    #[tokio::test]
    async fn me_requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;
        assert_eq!(res.status, 401);

        let res = app.get_with_token(routes::ME, "garbage").await;
        assert_eq!(res.status, 401);
        assert_eq!(res.code(), 11008);
    }
}
