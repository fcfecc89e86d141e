use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn submitting_creates_an_attempt_for_the_caller() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("student1", "securepass").await;
    let assignment_id = app.create_assignment(&token, "Homework").await;

    let res = app
        .post_with_token(
            routes::CREATE_ATTEMPT,
            &json!({
                "assignment_id": assignment_id,
                "files": {"main.py": "print(15)"},
            }),
            &token,
        )
        .await;

    assert_eq!(res.status, 201);
    assert_eq!(res.body["status"], "Submitted");
    assert!(res.body["score"].is_null());
    assert_eq!(
        res.body["assignment_id"].as_i64().unwrap() as i32,
        assignment_id
    );

    // user_id comes from the token, not the request body.
    let me = app.get_with_token(routes::ME, &token).await;
    assert_eq!(res.body["user_id"], me.body["id"]);
}

#[tokio::test]
async fn attempt_against_unknown_assignment_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("student2", "securepass").await;

    let res = app
        .post_with_token(
            routes::CREATE_ATTEMPT,
            &json!({"assignment_id": 555, "files": {"main.py": ""}}),
            &token,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn grading_sets_status_score_and_feedback() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("student3", "securepass").await;
    let assignment_id = app.create_assignment(&token, "To grade").await;
    let id = app.create_attempt(&token, assignment_id).await;

    let res = app
        .put_with_token(
            &routes::edit_attempt(id),
            &json!({
                "status": "Graded",
                "score": 85,
                "feedback": "Solid work, watch the edge cases.",
                "files": {"main.py": "print(sum(range(6)))"},
            }),
            &token,
        )
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "Graded");
    assert_eq!(res.body["score"], 85);
    assert_eq!(res.body["feedback"], "Solid work, watch the edge cases.");
}

#[tokio::test]
async fn out_of_range_score_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("student4", "securepass").await;
    let assignment_id = app.create_assignment(&token, "Range check").await;
    let id = app.create_attempt(&token, assignment_id).await;

    let res = app
        .put_with_token(
            &routes::edit_attempt(id),
            &json!({"score": 101, "files": {"main.py": ""}}),
            &token,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn score_can_be_cleared_with_null() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("student5", "securepass").await;
    let assignment_id = app.create_assignment(&token, "Regrade").await;
    let id = app.create_attempt(&token, assignment_id).await;

    let graded = app
        .put_with_token(
            &routes::edit_attempt(id),
            &json!({"status": "Graded", "score": 40, "files": {"main.py": ""}}),
            &token,
        )
        .await;
    assert_eq!(graded.status, 200);

    let res = app
        .put_with_token(
            &routes::edit_attempt(id),
            &json!({"status": "Under Review", "score": null, "files": {"main.py": ""}}),
            &token,
        )
        .await;

    assert_eq!(res.status, 200);
    assert!(res.body["score"].is_null());
    assert_eq!(res.body["status"], "Under Review");
}

#[tokio::test]
async fn listing_filters_by_assignment_and_user() {
    let app = TestApp::spawn().await;
    let alice = app.create_authenticated_user("alice_att", "securepass").await;
    let bob = app.create_authenticated_user("bob_att", "securepass").await;
    let first = app.create_assignment(&alice, "First hw").await;
    let second = app.create_assignment(&alice, "Second hw").await;

    app.create_attempt(&alice, first).await;
    app.create_attempt(&alice, second).await;
    app.create_attempt(&bob, first).await;

    let all = app.get_with_token(routes::LIST_ATTEMPTS, &alice).await;
    assert_eq!(all.body["count"], 3);

    let by_assignment = app
        .get_with_token(
            &format!("{}?assignment_id={first}", routes::LIST_ATTEMPTS),
            &alice,
        )
        .await;
    assert_eq!(by_assignment.body["count"], 2);

    let bob_id = app.get_with_token(routes::ME, &bob).await.body["id"]
        .as_i64()
        .unwrap();
    let by_both = app
        .get_with_token(
            &format!(
                "{}?assignment_id={first}&user_id={bob_id}",
                routes::LIST_ATTEMPTS
            ),
            &alice,
        )
        .await;
    assert_eq!(by_both.body["count"], 1);
    assert_eq!(by_both.body["attempts"][0]["user_id"].as_i64().unwrap(), bob_id);
}

#[tokio::test]
async fn resubmission_replaces_the_stored_files() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("student6", "securepass").await;
    let assignment_id = app.create_assignment(&token, "Retry").await;
    let id = app.create_attempt(&token, assignment_id).await;

    let res = app
        .put_with_token(
            &routes::edit_attempt(id),
            &json!({"files": {"main.py": "print('second try')", "notes.md": "fixed"}}),
            &token,
        )
        .await;
    assert_eq!(res.status, 200);

    let read = app.get_with_token(&routes::get_attempt(id), &token).await;
    assert_eq!(read.body["files"]["main.py"], "print('second try')");
    assert_eq!(read.body["files"]["notes.md"], "fixed");
}
