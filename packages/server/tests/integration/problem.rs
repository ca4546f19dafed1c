use serde_json::json;

use crate::common::{TestApp, routes};

mod problems {
    use super::*;

    #[tokio::test]
    async fn new_problems_start_disabled_with_the_template_description() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let id = app.create_problem(&token, "P1001").await;
        let res = app.get_with_token(&routes::problem(id), &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["number"], "P1001");
        assert_eq!(res.body["data"]["enable"], -1);
        assert_eq!(res.body["data"]["description"], "## 题目描述\n");

        let by_number = app
            .get_with_token(&routes::problem_by_number("P1001"), &token)
            .await;
        assert_eq!(by_number.id(), id);
    }

    #[tokio::test]
    async fn duplicate_numbers_are_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        app.create_problem(&token, "P2000").await;

        let check = app
            .get_with_token(&format!("{}?number=P2000", routes::CHECK_NUMBER), &token)
            .await;
        assert_eq!(check.body["data"], false);
        let check = app
            .get_with_token(&format!("{}?number=P2001", routes::CHECK_NUMBER), &token)
            .await;
        assert_eq!(check.body["data"], true);

        let res = app
            .post_with_token(routes::PROBLEMS, &json!({"number": "P2000"}), &token)
            .await;
        assert_eq!(res.status, 422);
        assert_eq!(res.code(), 11500);
    }

    #[tokio::test]
    async fn public_list_only_shows_enabled_problems() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let shown = app.create_problem(&admin, "P3001").await;
        app.create_problem(&admin, "P3002").await;

        let res = app
            .put_with_token(&routes::problem_enable(shown), &json!({"enable": 1}), &admin)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let user = app
            .register_user("leo", "leo@example.com", "securepass")
            .await;
        let res = app.get_with_token(routes::PUBLIC_PROBLEMS, &user).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["total"], 1);
        assert_eq!(res.body["data"]["list"][0]["id"], shown);
        assert_eq!(res.body["data"]["list"][0]["status"], 0);

        let all = app.get_with_token(routes::PROBLEMS, &admin).await;
        assert_eq!(all.body["data"]["total"], 2);
    }

    #[tokio::test]
    async fn enable_accepts_only_known_values() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let id = app.create_problem(&token, "P3100").await;

        let res = app
            .put_with_token(&routes::problem_enable(id), &json!({"enable": 5}), &token)
            .await;
        assert_eq!(res.status, 400);

        let res = app
            .put_with_token(&routes::problem_enable(9999), &json!({"enable": 1}), &token)
            .await;
        assert_eq!(res.code(), 11507);
    }

    #[tokio::test]
    async fn template_is_served_for_supported_languages() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let id = app.create_problem(&token, "P4001").await;

        let res = app
            .get_with_token(&routes::problem_template(id, "cpp"), &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"], "int main() { return 0; }\n");

        let res = app
            .get_with_token(&routes::problem_template(id, "java"), &token)
            .await;
        assert_eq!(res.code(), 12503);
    }

    #[tokio::test]
    async fn deleting_a_problem_hides_it_and_its_cases() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let id = app.create_problem(&token, "P5001").await;
        let case = app
            .post_with_token(&routes::cases(id), &json!({"input": "1 2", "output": "3"}), &token)
            .await
            .id();

        let res = app.delete_with_token(&routes::problem(id), &token).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app.get_with_token(&routes::problem(id), &token).await;
        assert_eq!(res.status, 404);
        let res = app.get_with_token(&routes::case(id, case), &token).await;
        assert_eq!(res.status, 404);

        // Numbers of deleted problems stay reserved.
        let check = app
            .get_with_token(&format!("{}?number=P5001", routes::CHECK_NUMBER), &token)
            .await;
        assert_eq!(check.body["data"], false);
    }

    #[tokio::test]
    async fn viewers_cannot_create_problems() {
        let app = TestApp::spawn().await;
        let user = app
            .register_user("mia", "mia@example.com", "securepass")
            .await;

        let res = app
            .post_with_token(routes::PROBLEMS, &json!({"number": "X1"}), &user)
            .await;
        assert_eq!(res.status, 403);
    }
}

mod cases {
    use super::*;

    #[tokio::test]
    async fn blank_names_are_generated_in_sequence() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let id = app.create_problem(&token, "C1001").await;

        let next = app.get_with_token(&routes::new_case_name(id), &token).await;
        assert_eq!(next.body["data"], "1");

        let first = app
            .post_with_token(&routes::cases(id), &json!({"caseName": "case7"}), &token)
            .await;
        assert_eq!(first.status, 200, "{}", first.text);

        let second = app
            .post_with_token(&routes::cases(id), &json!({"input": "x"}), &token)
            .await;
        assert_eq!(second.body["data"]["caseName"], "case8");

        let list = app.get_with_token(&routes::cases(id), &token).await;
        assert_eq!(list.body["data"]["total"], 2);
    }

    #[tokio::test]
    async fn names_are_unique_within_a_problem() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let a = app.create_problem(&token, "C2001").await;
        let b = app.create_problem(&token, "C2002").await;

        let body = json!({"caseName": "sample"});
        app.post_with_token(&routes::cases(a), &body, &token).await;

        let dup = app.post_with_token(&routes::cases(a), &body, &token).await;
        assert_eq!(dup.code(), 11512);

        let other = app.post_with_token(&routes::cases(b), &body, &token).await;
        assert_eq!(other.status, 200, "{}", other.text);
    }

    #[tokio::test]
    async fn cases_are_scoped_to_their_problem() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let a = app.create_problem(&token, "C3001").await;
        let b = app.create_problem(&token, "C3002").await;
        let case = app
            .post_with_token(&routes::cases(a), &json!({"caseName": "1"}), &token)
            .await
            .id();

        let res = app.get_with_token(&routes::case(b, case), &token).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.code(), 11515);

        let res = app
            .put_with_token(
                &routes::case(a, case),
                &json!({"output": "42"}),
                &token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["caseName"], "1");
        assert_eq!(res.body["data"]["output"], "42");

        let res = app.delete_with_token(&routes::case(a, case), &token).await;
        assert_eq!(res.status, 200, "{}", res.text);
        let res = app.get_with_token(&routes::case(a, case), &token).await;
        assert_eq!(res.code(), 11515);
    }
}
