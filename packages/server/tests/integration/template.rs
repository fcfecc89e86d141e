use std::sync::atomic::Ordering;

use serde_json::json;

use crate::common::{TestApp, routes};

mod create {
    use super::*;

    #[tokio::test]
    async fn create_stores_record_and_bundle() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("teacher1", "securepass").await;

        let res = app
            .post_with_token(
                routes::CREATE_TEMPLATE,
                &json!({
                    "title": "Loops 101",
                    "description": "Intro loops",
                    "difficulty": "Beginner",
                    "files": {"main.py": "for i in range(3): pass"},
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201);
        let id = res.id();
        assert_eq!(
            res.body["blob_pointer"],
            format!("templates/template-{id}.json")
        );

        // The bundle object exists under the derived name.
        let raw = app
            .store
            .raw("templates", &format!("template-{id}.json"))
            .expect("bundle object should exist");
        let decoded: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(decoded["main.py"], "for i in range(3): pass");
    }

    #[tokio::test]
    async fn empty_title_is_rejected_before_any_write() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("teacher2", "securepass").await;

        let res = app
            .post_with_token(
                routes::CREATE_TEMPLATE,
                &json!({
                    "title": "   ",
                    "difficulty": "Beginner",
                    "files": {"main.py": ""},
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
        assert_eq!(app.store.put_calls.load(Ordering::SeqCst), 0);

        let list = app.get_with_token(routes::LIST_TEMPLATES, &token).await;
        assert_eq!(list.body["count"], 0);
    }

    #[tokio::test]
    async fn unknown_difficulty_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("teacher3", "securepass").await;

        let res = app
            .post_with_token(
                routes::CREATE_TEMPLATE,
                &json!({
                    "title": "Bad difficulty",
                    "difficulty": "Impossible",
                    "files": {"main.py": ""},
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn traversal_path_in_bundle_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("teacher4", "securepass").await;

        let res = app
            .post_with_token(
                routes::CREATE_TEMPLATE,
                &json!({
                    "title": "Sneaky",
                    "difficulty": "Beginner",
                    "files": {"../etc/passwd": "nope"},
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn failed_bundle_write_reports_partial_write_and_keeps_record() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("teacher5", "securepass").await;

        app.store.fail_puts.store(true, Ordering::SeqCst);
        let res = app
            .post_with_token(
                routes::CREATE_TEMPLATE,
                &json!({
                    "title": "Doomed",
                    "difficulty": "Beginner",
                    "files": {"main.py": ""},
                }),
                &token,
            )
            .await;
        app.store.fail_puts.store(false, Ordering::SeqCst);

        assert_eq!(res.status, 500);
        assert_eq!(res.code(), "PARTIAL_WRITE");

        // The orphaned record survives and reads back without a payload.
        let list = app.get_with_token(routes::LIST_TEMPLATES, &token).await;
        assert_eq!(list.body["count"], 1);
        let id = list.body["templates"][0]["id"].as_i64().unwrap() as i32;
        assert!(list.body["templates"][0]["blob_pointer"].is_null());

        let read = app.get_with_token(&routes::get_template(id), &token).await;
        assert_eq!(read.status, 200);
        assert_eq!(read.body["payload_missing"], true);
        assert!(read.body["files"].is_null());
        assert!(read.body["download_url"].is_null());
    }
}

mod read {
    use super::*;

    #[tokio::test]
    async fn get_returns_combined_view() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("reader1", "securepass").await;
        let id = app.create_template(&token, "Readable").await;

        let res = app.get_with_token(&routes::get_template(id), &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "Readable");
        assert_eq!(res.body["files"]["main.py"], "print('hello')");
        assert_eq!(res.body["payload_missing"], false);
        assert!(
            res.body["download_url"]
                .as_str()
                .is_some_and(|u| u.contains(&format!("template-{id}.json")))
        );
    }

    #[tokio::test]
    async fn missing_id_is_404_without_touching_the_blob_store() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("reader2", "securepass").await;

        let res = app.get_with_token(&routes::get_template(9999), &token).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");
        assert_eq!(app.store.get_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn corrupt_stored_bundle_is_reported_distinctly() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("reader3", "securepass").await;
        let id = app.create_template(&token, "Will corrupt").await;

        app.store
            .insert_raw("templates", &format!("template-{id}.json"), b"{not json");

        let res = app.get_with_token(&routes::get_template(id), &token).await;

        assert_eq!(res.status, 500);
        assert_eq!(res.code(), "CORRUPT_PAYLOAD");
    }
}

mod edit {
    use super::*;

    #[tokio::test]
    async fn edit_replaces_bundle_wholesale() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("editor1", "securepass").await;
        let id = app.create_template(&token, "Replace me").await;

        let res = app
            .put_with_token(
                &routes::edit_template(id),
                &json!({
                    "title": "Replaced",
                    "files": {"solution.py": "answer = 42"},
                }),
                &token,
            )
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "Replaced");

        // Old files are gone; the replacement is the whole bundle.
        let read = app.get_with_token(&routes::get_template(id), &token).await;
        assert_eq!(read.body["files"]["solution.py"], "answer = 42");
        assert!(read.body["files"]["main.py"].is_null());
        assert!(read.body["files"]["README.md"].is_null());
    }

    #[tokio::test]
    async fn omitted_fields_keep_values_and_null_clears() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("editor2", "securepass").await;
        let id = app.create_template(&token, "Patch semantics").await;

        // Omit description: it stays.
        let res = app
            .put_with_token(
                &routes::edit_template(id),
                &json!({"difficulty": "Advanced", "files": {"a.py": ""}}),
                &token,
            )
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["description"], "Starter for loops practice");
        assert_eq!(res.body["difficulty"], "Advanced");

        // Explicit null clears it.
        let res = app
            .put_with_token(
                &routes::edit_template(id),
                &json!({"description": null, "files": {"a.py": ""}}),
                &token,
            )
            .await;
        assert_eq!(res.status, 200);
        assert!(res.body["description"].is_null());
    }

    #[tokio::test]
    async fn edit_of_missing_id_is_404_and_writes_nothing() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("editor3", "securepass").await;

        let res = app
            .put_with_token(
                &routes::edit_template(4242),
                &json!({"files": {"a.py": ""}}),
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(app.store.put_calls.load(Ordering::SeqCst), 0);
    }
}

mod list {
    use super::*;

    #[tokio::test]
    async fn list_returns_metadata_without_fetching_bundles() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("lister1", "securepass").await;
        app.create_template(&token, "One").await;
        app.create_template(&token, "Two").await;

        app.store.get_calls.store(0, Ordering::SeqCst);
        let res = app.get_with_token(routes::LIST_TEMPLATES, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["count"], 2);
        assert!(res.body["templates"][0].get("files").is_none());
        assert_eq!(app.store.get_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn updating_a_template_moves_it_to_the_front() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("lister2", "securepass").await;
        let first = app.create_template(&token, "First").await;
        let _second = app.create_template(&token, "Second").await;

        // Make sure the edit's updated_at lands strictly later.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let res = app
            .put_with_token(
                &routes::edit_template(first),
                &json!({"files": {"a.py": ""}}),
                &token,
            )
            .await;
        assert_eq!(res.status, 200);

        let list = app.get_with_token(routes::LIST_TEMPLATES, &token).await;
        assert_eq!(list.body["templates"][0]["id"].as_i64().unwrap() as i32, first);
    }

    #[tokio::test]
    async fn list_requires_authentication() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::LIST_TEMPLATES).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.code(), "TOKEN_MISSING");
    }
}
