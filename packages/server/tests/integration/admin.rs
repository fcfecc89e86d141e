use std::sync::atomic::Ordering;

use serde_json::json;

use crate::common::{TestApp, routes};

async fn orphaned_template(app: &TestApp, token: &str, title: &str) -> i32 {
    app.store.fail_puts.store(true, Ordering::SeqCst);
    let res = app
        .post_with_token(
            routes::CREATE_TEMPLATE,
            &json!({
                "title": title,
                "difficulty": "Beginner",
                "files": {"main.py": "print('orphan')"},
            }),
            token,
        )
        .await;
    app.store.fail_puts.store(false, Ordering::SeqCst);
    assert_eq!(res.status, 500);
    assert_eq!(res.code(), "PARTIAL_WRITE");

    let list = app.get_with_token(routes::LIST_TEMPLATES, token).await;
    list.body["templates"][0]["id"].as_i64().unwrap() as i32
}

#[tokio::test]
async fn clean_stores_produce_an_empty_report() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("admin1", "securepass").await;
    app.create_template(&token, "Healthy").await;

    let res = app.get_with_token(routes::CONSISTENCY, &token).await;

    assert_eq!(res.status, 200);
    for kind in ["templates", "assignments", "attempts"] {
        assert_eq!(res.body[kind]["orphan_records"], json!([]));
        assert_eq!(res.body[kind]["unreferenced_objects"], json!([]));
    }
}

#[tokio::test]
async fn orphan_records_show_up_in_the_report() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("admin2", "securepass").await;
    let id = orphaned_template(&app, &token, "Orphaned").await;

    let res = app.get_with_token(routes::CONSISTENCY, &token).await;

    assert_eq!(res.status, 200);
    let orphans = res.body["templates"]["orphan_records"].as_array().unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0]["id"].as_i64().unwrap() as i32, id);
}

#[tokio::test]
async fn unreferenced_objects_show_up_in_the_report() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("admin3", "securepass").await;

    // An object nothing points at, plus one with an unparsable name.
    app.store.insert_raw("templates", "template-12345.json", b"{}");
    app.store.insert_raw("templates", "stray-object.json", b"{}");

    let res = app.get_with_token(routes::CONSISTENCY, &token).await;

    assert_eq!(res.status, 200);
    let names: Vec<&str> = res.body["templates"]["unreferenced_objects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"template-12345.json"));
    assert!(names.contains(&"stray-object.json"));
}

#[tokio::test]
async fn repair_patches_the_pointer_when_the_bundle_exists() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("admin4", "securepass").await;
    let id = orphaned_template(&app, &token, "Repairable").await;

    // The interrupted create never stored the bundle; put it back by hand,
    // as an operator re-uploading from a backup would.
    app.store.insert_raw(
        "templates",
        &format!("template-{id}.json"),
        br#"{"main.py": "print('restored')"}"#,
    );

    let res = app
        .post_with_token(&routes::repair("template", id), &json!({}), &token)
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["repaired"], true);
    assert_eq!(
        res.body["blob_pointer"],
        format!("templates/template-{id}.json")
    );

    // The combined read now works end to end.
    let read = app.get_with_token(&routes::get_template(id), &token).await;
    assert_eq!(read.body["payload_missing"], false);
    assert_eq!(read.body["files"]["main.py"], "print('restored')");
}

#[tokio::test]
async fn repair_is_a_no_op_for_a_healthy_record() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("admin5", "securepass").await;
    let id = app.create_template(&token, "Already fine").await;

    let res = app
        .post_with_token(&routes::repair("template", id), &json!({}), &token)
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["repaired"], false);
}

#[tokio::test]
async fn repair_without_a_stored_bundle_is_a_conflict() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("admin6", "securepass").await;
    let id = orphaned_template(&app, &token, "Unrepairable").await;

    let res = app
        .post_with_token(&routes::repair("template", id), &json!({}), &token)
        .await;

    assert_eq!(res.status, 409);
    assert_eq!(res.code(), "CONFLICT");
}

#[tokio::test]
async fn repair_rejects_an_unknown_kind() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("admin7", "securepass").await;

    let res = app
        .post_with_token(&routes::repair("widget", 1), &json!({}), &token)
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn repair_of_a_missing_record_is_404() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("admin8", "securepass").await;

    let res = app
        .post_with_token(&routes::repair("template", 8888), &json!({}), &token)
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(res.code(), "NOT_FOUND");
}
