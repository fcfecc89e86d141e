use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn create_and_read_back_an_assignment() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("grader1", "securepass").await;

    let res = app
        .post_with_token(
            routes::CREATE_ASSIGNMENT,
            &json!({
                "title": "Sum the numbers",
                "description": "Week 1",
                "difficulty": "Intermediate",
                "status": "Not Started",
                "files": {"main.py": "# solve", "tests/test_main.py": "assert True"},
            }),
            &token,
        )
        .await;
    assert_eq!(res.status, 201);
    let id = res.id();
    assert_eq!(
        res.body["blob_pointer"],
        format!("assignments/assignment-{id}.json")
    );

    let read = app.get_with_token(&routes::get_assignment(id), &token).await;
    assert_eq!(read.status, 200);
    assert_eq!(read.body["status"], "Not Started");
    assert_eq!(read.body["files"]["tests/test_main.py"], "assert True");
    assert!(read.body["template_id"].is_null());
}

#[tokio::test]
async fn assignment_can_reference_a_template() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("grader2", "securepass").await;
    let template_id = app.create_template(&token, "Source template").await;

    let res = app
        .post_with_token(
            routes::CREATE_ASSIGNMENT,
            &json!({
                "title": "From template",
                "difficulty": "Beginner",
                "status": "Not Started",
                "template_id": template_id,
                "files": {"main.py": ""},
            }),
            &token,
        )
        .await;

    assert_eq!(res.status, 201);
    assert_eq!(res.body["template_id"].as_i64().unwrap() as i32, template_id);
}

#[tokio::test]
async fn dangling_template_reference_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("grader3", "securepass").await;

    let res = app
        .post_with_token(
            routes::CREATE_ASSIGNMENT,
            &json!({
                "title": "Dangling",
                "difficulty": "Beginner",
                "status": "Not Started",
                "template_id": 777,
                "files": {"main.py": ""},
            }),
            &token,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn status_transitions_through_edit() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("grader4", "securepass").await;
    let id = app.create_assignment(&token, "Progressing").await;

    let res = app
        .put_with_token(
            &routes::edit_assignment(id),
            &json!({"status": "In Progress", "files": {"main.py": "wip"}}),
            &token,
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "In Progress");

    let res = app
        .put_with_token(
            &routes::edit_assignment(id),
            &json!({"status": "Completed", "files": {"main.py": "done"}}),
            &token,
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "Completed");
}

#[tokio::test]
async fn unknown_status_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("grader5", "securepass").await;
    let id = app.create_assignment(&token, "Bad status").await;

    let res = app
        .put_with_token(
            &routes::edit_assignment(id),
            &json!({"status": "Done-ish", "files": {"main.py": ""}}),
            &token,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn template_reference_can_be_cleared_with_null() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("grader6", "securepass").await;
    let template_id = app.create_template(&token, "To detach").await;

    let created = app
        .post_with_token(
            routes::CREATE_ASSIGNMENT,
            &json!({
                "title": "Detachable",
                "difficulty": "Beginner",
                "status": "Not Started",
                "template_id": template_id,
                "files": {"main.py": ""},
            }),
            &token,
        )
        .await;
    assert_eq!(created.status, 201);
    let id = created.id();

    let res = app
        .put_with_token(
            &routes::edit_assignment(id),
            &json!({"template_id": null, "files": {"main.py": ""}}),
            &token,
        )
        .await;

    assert_eq!(res.status, 200);
    assert!(res.body["template_id"].is_null());
}
