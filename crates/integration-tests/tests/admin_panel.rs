//! Integration tests for the admin panel and the admin-only "move to draft"
//! action on the feed.

#![allow(clippy::unwrap_used)]

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use brief_bulletin_integration_tests::{
    TestApp, article, error_envelope, ok_envelope, pending_comment,
};
use mockito::Matcher;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_reader_is_not_authorized() {
    let mut app = TestApp::spawn().await;
    app.sign_in_reader(&json!([])).await;

    let resp = app.get("/admin/drafts").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(resp
        .text()
        .await
        .unwrap()
        .contains("You are not authorized to view this page."));

    let resp = app.post("/admin/comments/3/archive").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_visitor_is_sent_to_sign_in() {
    let app = TestApp::spawn().await;
    assert_eq!(app.get("/admin").await.url().path(), "/auth/login");
}

// ============================================================================
// Drafts
// ============================================================================

#[tokio::test]
async fn test_approve_draft() {
    let mut app = TestApp::spawn().await;
    app.sign_in_admin(&json!([])).await;

    let drafts = app
        .api
        .mock("GET", "/api/draft-article-list")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .match_header("authorization", "Bearer token-Editor")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ok_envelope(&json!([
            article(11, "Draft about trains"),
            article(12, "Draft about ferries"),
        ])))
        .expect(1)
        .create_async()
        .await;
    let publish = app
        .api
        .mock("GET", "/api/publish-article")
        .match_query(Matcher::UrlEncoded("id".into(), "11".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ok_envelope(&json!(true)))
        .create_async()
        .await;

    let resp = app.get("/admin").await;
    assert_eq!(resp.url().path(), "/admin/drafts");
    let body = resp.text().await.unwrap();
    assert!(body.contains("Approve Articles"));
    assert!(body.contains("Draft about trains"));
    assert!(body.contains("Draft about ferries"));

    // Approving removes the row without reloading the list
    let body = app
        .post("/admin/drafts/11/publish")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Article approved successfully!"));
    assert!(!body.contains("Draft about trains"));
    assert!(body.contains("Draft about ferries"));

    drafts.assert_async().await;
    publish.assert_async().await;
}

#[tokio::test]
async fn test_empty_draft_list() {
    let mut app = TestApp::spawn().await;
    app.sign_in_admin(&json!([])).await;

    // The API answers `true` when there is nothing to review
    let drafts = app
        .api
        .mock("GET", "/api/draft-article-list")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ok_envelope(&json!(true)))
        .create_async()
        .await;

    let body = app.get("/admin/drafts").await.text().await.unwrap();
    assert!(body.contains("No draft articles."));
    drafts.assert_async().await;
}

#[tokio::test]
async fn test_failed_approval_keeps_draft() {
    let mut app = TestApp::spawn().await;
    app.sign_in_admin(&json!([])).await;

    let drafts = app
        .api
        .mock("GET", "/api/draft-article-list")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ok_envelope(&json!([article(11, "Draft about trains")])))
        .create_async()
        .await;
    app.keep(drafts);
    let publish = app
        .api
        .mock("GET", "/api/publish-article")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;
    app.keep(publish);

    app.get("/admin/drafts").await;
    let body = app
        .post("/admin/drafts/11/publish")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Failed to approve article"));
    assert!(body.contains("Draft about trains"));
}

// ============================================================================
// Comments
// ============================================================================

#[tokio::test]
async fn test_activate_and_archive_comments() {
    let mut app = TestApp::spawn().await;
    app.sign_in_admin(&json!([])).await;

    let pending = app
        .api
        .mock("GET", "/api/approval-due-comments")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ok_envelope(&json!([
            pending_comment(7, "Nadia", "Lovely coverage"),
            pending_comment(8, "Spammer", "Buy cheap watches"),
        ])))
        .expect(1)
        .create_async()
        .await;
    let activate = app
        .api
        .mock("GET", "/api/active-comment")
        .match_query(Matcher::UrlEncoded("comment_id".into(), "7".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ok_envelope(&json!(true)))
        .create_async()
        .await;
    let disable = app
        .api
        .mock("GET", "/api/disable-comment")
        .match_query(Matcher::UrlEncoded("comment_id".into(), "8".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ok_envelope(&json!(true)))
        .create_async()
        .await;

    let body = app.get("/admin/comments").await.text().await.unwrap();
    assert!(body.contains("Lovely coverage"));
    assert!(body.contains("Buy cheap watches"));

    let body = app
        .post("/admin/comments/7/activate")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Comment activated!"));
    assert!(!body.contains("Lovely coverage"));

    // Archiving asks first
    let body = app
        .get("/admin/comments/8/archive")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Archive comment?"));
    assert!(body.contains("Yes, archive it"));
    assert!(body.contains(r#"action="/admin/comments/8/archive""#));

    let body = app
        .post("/admin/comments/8/archive")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Comment archived!"));
    assert!(body.contains("No pending comments."));

    pending.assert_async().await;
    activate.assert_async().await;
    disable.assert_async().await;
}

#[tokio::test]
async fn test_comments_load_failure() {
    let mut app = TestApp::spawn().await;
    app.sign_in_admin(&json!([])).await;

    let pending = app
        .api
        .mock("GET", "/api/approval-due-comments")
        .with_status(502)
        .create_async()
        .await;

    let body = app.get("/admin/comments").await.text().await.unwrap();
    assert!(body.contains("Failed to load comments"));
    pending.assert_async().await;
}

// ============================================================================
// Create Admin
// ============================================================================

#[tokio::test]
async fn test_create_admin() {
    let mut app = TestApp::spawn().await;
    app.sign_in_admin(&json!([])).await;

    let create = app
        .api
        .mock("POST", "/api/auth/create")
        .match_body(Matcher::PartialJson(json!({
            "email": "second@example.com",
            "userName": "Second Admin",
            "role": "ADMIN",
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ok_envelope(&json!(null)))
        .expect(1)
        .create_async()
        .await;

    let body = app
        .post_form(
            "/admin/create-admin",
            &[("name", "Second Admin"), ("email", ""), ("password", "pw")],
        )
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Please fill all required fields (Name, Email, Password)."));
    assert!(body.contains("Second Admin"));

    let body = app
        .post_form(
            "/admin/create-admin",
            &[
                ("name", "Second Admin"),
                ("email", "second@example.com"),
                ("password", "pw-for-admin"),
                ("phone", ""),
            ],
        )
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Admin user created successfully!"));
    assert!(!body.contains("second@example.com"));

    create.assert_async().await;
}

#[tokio::test]
async fn test_create_admin_shows_server_message() {
    let mut app = TestApp::spawn().await;
    app.sign_in_admin(&json!([])).await;

    let create = app
        .api
        .mock("POST", "/api/auth/create")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(error_envelope(409, Some("Email already registered")))
        .create_async()
        .await;

    let body = app
        .post_form(
            "/admin/create-admin",
            &[
                ("name", "Second Admin"),
                ("email", "taken@example.com"),
                ("password", "pw-for-admin"),
            ],
        )
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Email already registered"));
    assert!(body.contains("taken@example.com"));

    let body = app
        .post("/admin/create-admin/reset")
        .await
        .text()
        .await
        .unwrap();
    assert!(!body.contains("taken@example.com"));
    assert!(!body.contains("Email already registered"));

    create.assert_async().await;
}

// ============================================================================
// Move To Draft
// ============================================================================

#[tokio::test]
async fn test_move_to_draft_removes_article_from_feed() {
    let mut app = TestApp::spawn().await;
    app.sign_in_admin(&json!([article(1, "Harbour reopens"), article(2, "Budget passed")]))
        .await;

    let draft = app
        .api
        .mock("GET", "/api/draft-article")
        .match_query(Matcher::UrlEncoded("id".into(), "1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ok_envelope(&json!(true)))
        .expect(1)
        .create_async()
        .await;

    let body = app.get("/home").await.text().await.unwrap();
    assert!(body.contains("Admin Panel"));
    assert!(body.contains("/articles/1/draft"));

    let body = app.get("/articles/1/draft").await.text().await.unwrap();
    assert!(body.contains("Move to Draft?"));
    assert!(body.contains("Yes, move to draft"));

    let resp = app.post("/articles/1/draft").await;
    assert_eq!(resp.url().path(), "/home");
    let body = resp.text().await.unwrap();
    assert!(body.contains("Moved to Draft!"));
    assert!(!body.contains("Harbour reopens"));
    assert!(body.contains("Budget passed"));

    draft.assert_async().await;
}

#[tokio::test]
async fn test_move_to_draft_failure_keeps_article() {
    let mut app = TestApp::spawn().await;
    app.sign_in_admin(&json!([article(1, "Harbour reopens")]))
        .await;

    let draft = app
        .api
        .mock("GET", "/api/draft-article")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(error_envelope(400, None))
        .expect(2)
        .create_async()
        .await;

    let body = app.post("/articles/1/draft").await.text().await.unwrap();
    assert!(body.contains("Failed to move article to draft"));
    assert!(body.contains("Harbour reopens"));

    // The in-flight guard was released, so a retry reaches the API again
    app.post("/articles/1/draft").await;
    draft.assert_async().await;
}

#[tokio::test]
async fn test_abandoned_draft_request_does_not_block_retries() {
    let mut app = TestApp::spawn_with(|config| config.api_timeout = Duration::from_secs(1)).await;
    app.sign_in_admin(&json!([article(1, "Harbour reopens")]))
        .await;

    let slow = Arc::new(AtomicBool::new(true));
    let body = ok_envelope(&json!(true));
    let draft = app
        .api
        .mock("GET", "/api/draft-article")
        .match_query(Matcher::UrlEncoded("id".into(), "1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_chunked_body(move |w| {
            if slow.swap(false, Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(1500));
            }
            w.write_all(body.as_bytes())
        })
        .expect(2)
        .create_async()
        .await;

    let err = app
        .post_within("/articles/1/draft", Duration::from_millis(300))
        .await
        .unwrap_err();
    assert!(err.is_timeout());

    tokio::time::sleep(Duration::from_millis(1600)).await;
    let body = app.post("/articles/1/draft").await.text().await.unwrap();
    assert!(body.contains("Moved to Draft!"));
    draft.assert_async().await;
}

#[tokio::test]
async fn test_readers_cannot_move_to_draft() {
    let mut app = TestApp::spawn().await;
    app.sign_in_reader(&json!([article(1, "Harbour reopens")]))
        .await;

    let resp = app.post("/articles/1/draft").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
