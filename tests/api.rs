//! End-to-end API tests over the assembled router.

use axum_test::TestServer;
use serde_json::{Value, json};
use tempfile::TempDir;

use lingoleap::{app, db, state::AppState};

struct Server {
    server: TestServer,
    // Held so the database file outlives the server
    _temp: TempDir,
}

fn spawn() -> Server {
    let temp = TempDir::new().unwrap();
    let pool = db::init_db(&temp.path().join("lingoleap.db")).unwrap();
    {
        let conn = pool.lock().unwrap();
        db::seed::seed_catalog(&conn).unwrap();
    }
    let router = app::build_router(AppState::new(pool));
    Server {
        server: TestServer::new(router).unwrap(),
        _temp: temp,
    }
}

async fn register(server: &TestServer, username: &str) -> (String, Value) {
    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "Sup3r!pass",
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    let token = body["token"].as_str().unwrap().to_string();
    (token, body["user"].clone())
}

#[tokio::test]
async fn register_login_and_profile_round_trip() {
    let s = spawn();

    let (token, user) = register(&s.server, "mira").await;
    assert_eq!(user["username"], "mira");
    assert_eq!(user["globalScore"], 0);
    assert!(user.get("passwordHash").is_none());

    let response = s
        .server
        .post("/auth/login")
        .json(&json!({ "email": "mira@example.com", "password": "Sup3r!pass" }))
        .await;
    response.assert_status_ok();

    let response = s
        .server
        .get("/user/profile")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user"]["email"], "mira@example.com");
}

#[tokio::test]
async fn weak_passwords_are_rejected() {
    let s = spawn();
    let response = s
        .server
        .post("/auth/register")
        .json(&json!({
            "username": "eve",
            "email": "eve@example.com",
            "password": "alllowercase",
        }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn protected_routes_require_a_valid_bearer_token() {
    let s = spawn();

    let response = s.server.get("/user/profile").await;
    response.assert_status_unauthorized();

    let response = s
        .server
        .get("/user/profile")
        .authorization_bearer("notarealtokennotarealtokennotarea")
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let s = spawn();
    let (token, _) = register(&s.server, "theo").await;

    s.server
        .post("/auth/logout")
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    s.server
        .get("/user/profile")
        .authorization_bearer(&token)
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn quiz_answers_are_graded_server_side() {
    let s = spawn();
    let (token, _) = register(&s.server, "ana").await;

    let languages: Value = s
        .server
        .get("/languages")
        .await
        .json();
    let language_id = languages["languages"][0]["id"].as_i64().unwrap();

    let question: Value = s
        .server
        .get("/lessons/questions/random")
        .add_query_param("languageId", language_id)
        .authorization_bearer(&token)
        .await
        .json();
    // Accepted answers never leave the server
    assert!(question["question"].get("correctAnswer").is_none());
    let question_id = question["question"]["id"].as_i64().unwrap();

    let response = s
        .server
        .post("/lessons/questions/check-answer")
        .authorization_bearer(&token)
        .json(&json!({
            "questionId": question_id,
            "selectedAnswer": "definitely not a correct answer",
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["isCorrect"], false);
    assert_eq!(body["pointsEarned"], 0);
}

#[tokio::test]
async fn daily_question_allows_one_attempt_per_day() {
    let s = spawn();
    let (token, _) = register(&s.server, "liam").await;

    let languages: Value = s.server.get("/languages").await.json();
    let language_id = languages["languages"][0]["id"].as_i64().unwrap();

    let question: Value = s
        .server
        .get(&format!("/lessons/questions/daily/{language_id}"))
        .authorization_bearer(&token)
        .await
        .json();
    let question_id = question["question"]["id"].as_i64().unwrap();

    let first = s
        .server
        .post("/lessons/questions/daily/check-answer")
        .authorization_bearer(&token)
        .json(&json!({ "questionId": question_id, "selectedAnswer": "wrong" }))
        .await;
    first.assert_status_ok();

    // A wrong answer still consumes the day's attempt
    let second = s
        .server
        .post("/lessons/questions/daily/check-answer")
        .authorization_bearer(&token)
        .json(&json!({ "questionId": question_id, "selectedAnswer": "wrong" }))
        .await;
    second.assert_status(axum::http::StatusCode::CONFLICT);
    let body: Value = second.json();
    assert!(body.get("nextAttemptTime").is_some());
}

#[tokio::test]
async fn lesson_answers_move_hearts_and_score_until_completion() {
    let s = spawn();
    let (token, _) = register(&s.server, "noah").await;

    let languages: Value = s.server.get("/languages").await.json();
    let language_id = languages["languages"][0]["id"].as_i64().unwrap();

    s.server
        .post("/user/select-language")
        .authorization_bearer(&token)
        .json(&json!({ "languageId": language_id }))
        .await
        .assert_status_ok();

    let lessons: Value = s
        .server
        .get(&format!("/lessons/by-language/{language_id}"))
        .authorization_bearer(&token)
        .await
        .json();
    let lesson = &lessons["lessons"][0];
    let lesson_id = lesson["id"].as_i64().unwrap();
    let exercise_id = lesson["exercises"][0]["id"].as_i64().unwrap();

    let wrong: Value = s
        .server
        .post("/progress/check-lesson-answer")
        .authorization_bearer(&token)
        .json(&json!({
            "lessonId": lesson_id,
            "exerciseId": exercise_id,
            "selectedAnswer": "nope",
        }))
        .await
        .json();
    assert_eq!(wrong["isCorrect"], false);
    assert_eq!(wrong["heartsLeft"], 2);
    assert_eq!(wrong["pointsEarned"], 0);

    // Complete the lesson, then re-answering awards nothing
    s.server
        .post("/user/complete-lesson")
        .authorization_bearer(&token)
        .json(&json!({ "lessonId": lesson_id, "earnedPoints": 30 }))
        .await
        .assert_status_ok();

    let after: Value = s
        .server
        .post("/progress/check-lesson-answer")
        .authorization_bearer(&token)
        .json(&json!({
            "lessonId": lesson_id,
            "exerciseId": exercise_id,
            "selectedAnswer": "nope",
        }))
        .await
        .json();
    assert_eq!(after["isCompleted"], true);
    assert_eq!(after["pointsEarned"], 0);
    assert_eq!(after["heartsLeft"], 2);

    let profile: Value = s
        .server
        .get("/user/profile")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(profile["user"]["globalScore"], 30);
    let progress = &profile["user"]["languageProgress"][language_id.to_string()];
    assert_eq!(progress["completedLessonIds"][0], lesson_id);
}

#[tokio::test]
async fn leaderboard_update_is_monotonic() {
    let s = spawn();
    let (token, _) = register(&s.server, "zara").await;

    s.server
        .post("/user/update-global-score")
        .authorization_bearer(&token)
        .json(&json!({ "points": 50 }))
        .await
        .assert_status_ok();

    let created = s
        .server
        .post("/leaderboard/update")
        .authorization_bearer(&token)
        .await;
    created.assert_status(axum::http::StatusCode::CREATED);

    // Same score again: entry is left untouched
    let unchanged: Value = s
        .server
        .post("/leaderboard/update")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(
        unchanged["message"],
        "New score is lower or equal, no update performed."
    );

    let board: Value = s
        .server
        .get("/leaderboard/current")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(board[0]["rank"], 1);
    assert_eq!(board[0]["username"], "zara");
    assert_eq!(board[0]["score"], 50);

    // No prior month data yet
    let past: Value = s
        .server
        .get("/leaderboard/past")
        .authorization_bearer(&token)
        .await
        .json();
    assert!(past.is_null());
}

#[tokio::test]
async fn lesson_authoring_requires_admin() {
    let s = spawn();
    let (token, _) = register(&s.server, "omar").await;

    let languages: Value = s.server.get("/languages").await.json();
    let language_id = languages["languages"][0]["id"].as_i64().unwrap();

    let response = s
        .server
        .post("/lessons")
        .authorization_bearer(&token)
        .json(&json!({
            "title": "New lesson",
            "language": language_id,
            "level": "BEGINNER",
            "order": 0,
            "exercises": [],
        }))
        .await;
    response.assert_status_forbidden();
}
