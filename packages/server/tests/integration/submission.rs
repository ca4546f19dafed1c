use chrono::{Datelike, Utc};
use serde_json::json;

use crate::common::{TestApp, TestResponse, routes};

async fn record(
    app: &TestApp,
    admin: &str,
    user_id: i64,
    problem_id: i32,
    status: i32,
) -> TestResponse {
    app.post_with_token(
        routes::SUBMISSIONS,
        &json!({
            "userId": user_id,
            "problemId": problem_id,
            "language": "cpp",
            "code": "int main() {}",
            "status": status,
            "timeUsed": 12,
            "memoryUsed": 2048,
        }),
        admin,
    )
    .await
}

async fn user_id(app: &TestApp, token: &str) -> i64 {
    app.get_with_token(routes::ME, token).await.body["data"]["id"]
        .as_i64()
        .unwrap()
}

#[tokio::test]
async fn recorded_submissions_update_attempt_status() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let problem = app.create_problem(&admin, "S1").await;
    app.put_with_token(&routes::problem_enable(problem), &json!({"enable": 1}), &admin)
        .await;

    let user = app
        .register_user("nina", "nina@example.com", "securepass")
        .await;
    let uid = user_id(&app, &user).await;

    let res = record(&app, &admin, uid, problem, 2).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert!(res.body["data"].is_number());

    let list = app.get_with_token(routes::PUBLIC_PROBLEMS, &user).await;
    assert_eq!(list.body["data"]["list"][0]["status"], 1);

    record(&app, &admin, uid, problem, 1).await;
    record(&app, &admin, uid, problem, 4).await;
    let list = app.get_with_token(routes::PUBLIC_PROBLEMS, &user).await;
    assert_eq!(list.body["data"]["list"][0]["status"], 2);

    let mine = app.get_with_token(routes::SUBMISSIONS, &user).await;
    assert_eq!(mine.status, 200, "{}", mine.text);
    assert_eq!(mine.body["data"]["total"], 3);
    assert_eq!(mine.body["data"]["list"][0]["problemName"], "Problem S1");
}

#[tokio::test]
async fn activity_counts_todays_submissions() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let problem = app.create_problem(&admin, "S2").await;
    let user = app
        .register_user("omar", "omar@example.com", "securepass")
        .await;
    let uid = user_id(&app, &user).await;

    record(&app, &admin, uid, problem, 1).await;
    record(&app, &admin, uid, problem, 3).await;

    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let res = app.get_with_token(&routes::activity(0), &user).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["data"], json!([{"date": today, "count": 2}]));

    let year = Utc::now().year();
    let res = app.get_with_token(&routes::activity(year), &user).await;
    assert_eq!(res.body["data"][0]["count"], 2);

    let years = app.get_with_token(routes::ACTIVITY_YEARS, &user).await;
    assert_eq!(years.body["data"], json!([year.to_string()]));

    let other = app.get_with_token(routes::ACTIVITY_YEARS, &admin).await;
    assert_eq!(other.body["data"], json!([]));
}

#[tokio::test]
async fn invalid_callbacks_are_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let problem = app.create_problem(&admin, "S3").await;

    let res = record(&app, &admin, 1, problem, 99).await;
    assert_eq!(res.status, 400);

    let res = record(&app, &admin, 1, 424242, 1).await;
    assert_eq!(res.code(), 11507);
}

#[tokio::test]
async fn only_the_judge_permission_may_record() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let problem = app.create_problem(&admin, "S4").await;
    let user = app
        .register_user("pia", "pia@example.com", "securepass")
        .await;
    let uid = user_id(&app, &user).await;

    let res = record(&app, &user, uid, problem, 1).await;
    assert_eq!(res.status, 403);
}
