//! Integration tests for the home feed, the article page and comments.

#![allow(clippy::unwrap_used)]

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use brief_bulletin_integration_tests::{TestApp, article, error_envelope, ok_envelope};
use mockito::Matcher;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_feed_requires_session() {
    let app = TestApp::spawn().await;
    assert_eq!(app.get("/home").await.url().path(), "/auth/login");
    assert_eq!(app.get("/articles/1").await.url().path(), "/auth/login");
}

#[tokio::test]
async fn test_first_page_renders_cards() {
    let mut app = TestApp::spawn().await;
    app.sign_in_reader(&json!([article(1, "Harbour reopens"), article(2, "Budget passed")]))
        .await;

    let body = app.get("/home").await.text().await.unwrap();
    assert!(body.contains("Harbour reopens"));
    assert!(body.contains("Budget passed"));
    assert!(body.contains("World"));
    assert!(body.contains("March 1, 2024"));
    assert!(body.contains("4 views"));
    assert!(body.contains("/static/img/placeholder.svg"));
    assert!(body.contains("Load more"));
}

#[tokio::test]
async fn test_load_more_until_exhausted() {
    let mut app = TestApp::spawn().await;
    app.sign_in_reader(&json!([article(1, "Harbour reopens")]))
        .await;

    let page2 = app.mock_articles(2, "en", &json!([article(2, "Second page story")])).await;
    let resp = app.post("/home/more").await;
    assert_eq!(resp.url().path(), "/home");
    let body = resp.text().await.unwrap();
    assert!(body.contains("Harbour reopens"));
    assert!(body.contains("Second page story"));
    page2.assert_async().await;

    let page3 = app.mock_articles(3, "en", &json!(null)).await;
    let body = app.post("/home/more").await.text().await.unwrap();
    assert!(!body.contains("Load more"));
    page3.assert_async().await;

    // The end of the feed is remembered
    let page4 = app
        .api
        .mock("GET", "/api/articles")
        .match_query(Matcher::UrlEncoded("page".into(), "4".into()))
        .expect(0)
        .create_async()
        .await;
    app.post("/home/more").await;
    page4.assert_async().await;
}

#[tokio::test]
async fn test_visit_reloads_first_page() {
    let mut app = TestApp::spawn().await;
    app.sign_in_reader(&json!([article(1, "Harbour reopens")]))
        .await;

    let latest = json!([article(3, "Breaking update"), article(1, "Harbour reopens")]);
    let fresh = app.mock_articles(1, "en", &latest).await;
    let body = app.get("/home").await.text().await.unwrap();
    assert!(body.contains("Breaking update"));
    fresh.assert_async().await;
}

#[tokio::test]
async fn test_abandoned_load_does_not_block_the_feed() {
    let mut app = TestApp::spawn_with(|config| config.api_timeout = Duration::from_secs(1)).await;
    app.sign_in_reader(&json!([article(1, "Harbour reopens")]))
        .await;

    // The first answer takes longer than the reader is willing to wait
    let slow = Arc::new(AtomicBool::new(true));
    let body = ok_envelope(&json!([article(2, "Second page story")]));
    let page2 = app
        .api
        .mock("GET", "/api/articles")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
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
        .post_within("/home/more", Duration::from_millis(300))
        .await
        .unwrap_err();
    assert!(err.is_timeout());

    tokio::time::sleep(Duration::from_millis(1600)).await;
    let body = app.post("/home/more").await.text().await.unwrap();
    assert!(body.contains("Second page story"));
    page2.assert_async().await;
}

#[tokio::test]
async fn test_language_switch_reloads_from_first_page() {
    let mut app = TestApp::spawn().await;
    app.sign_in_reader(&json!([article(1, "Harbour reopens")]))
        .await;

    let bangla = app.mock_articles(1, "bn", &json!([article(9, "Bangla headline")])).await;
    let resp = app.post_form("/home/language", &[("lang", "bn")]).await;
    let body = resp.text().await.unwrap();
    assert!(body.contains("Bangla headline"));
    assert!(!body.contains("Harbour reopens"));
    bangla.assert_async().await;

    // Unknown languages are ignored
    let body = app
        .post_form("/home/language", &[("lang", "fr")])
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Bangla headline"));
}

#[tokio::test]
async fn test_failed_page_shows_dialog() {
    let mut app = TestApp::spawn().await;
    app.sign_in_reader(&json!([article(1, "Harbour reopens")]))
        .await;

    let broken = app
        .api
        .mock("GET", "/api/articles")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_status(500)
        .create_async()
        .await;
    let body = app.post("/home/more").await.text().await.unwrap();
    assert!(body.contains("Failed to load articles"));
    assert!(body.contains("Harbour reopens"));
    broken.assert_async().await;
}

#[tokio::test]
async fn test_expired_token_signs_out() {
    let mut app = TestApp::spawn().await;
    app.sign_in_reader(&json!([article(1, "Harbour reopens")]))
        .await;

    let expired = app
        .api
        .mock("GET", "/api/articles")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(error_envelope(401, None))
        .create_async()
        .await;

    let resp = app.post("/home/more").await;
    assert_eq!(resp.url().path(), "/auth/login");
    let body = resp.text().await.unwrap();
    assert!(body.contains("Your session has expired. Please sign in again."));
    expired.assert_async().await;

    assert_eq!(app.get("/home").await.url().path(), "/auth/login");
}

// ============================================================================
// Article Page
// ============================================================================

#[tokio::test]
async fn test_article_page_counts_read_and_lists_comments() {
    let mut app = TestApp::spawn().await;
    app.sign_in_reader(&json!([article(1, "Harbour reopens")]))
        .await;

    let read = app
        .api
        .mock("GET", "/api/read-news")
        .match_query(Matcher::UrlEncoded("id".into(), "1".into()))
        .match_header("authorization", "Bearer token-Reader")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ok_envelope(&json!(true)))
        .create_async()
        .await;
    let comments = app
        .api
        .mock("GET", "/api/all-comments")
        .match_query(Matcher::UrlEncoded("article_id".into(), "1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ok_envelope(&json!([{
            "id": 5,
            "article_id": 1,
            "user_name": "Nadia",
            "user_email": "nadia@example.com",
            "content": "Great news for the port",
            "created_at": "2024-03-02T10:00:00Z",
        }])))
        .create_async()
        .await;

    let resp = app.get("/articles/1").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Full text of Harbour reopens"));
    assert!(body.contains("View Original Source"));
    assert!(body.contains("5 views"));
    assert!(body.contains("Comments (1)"));
    assert!(body.contains("Great news for the port"));
    assert!(body.contains("nadia@example.com"));
    assert!(body.contains("March 2, 2024 at 10:00 AM"));
    assert!(!body.contains("Move to Draft"));

    read.assert_async().await;
    comments.assert_async().await;
}

#[tokio::test]
async fn test_unknown_article_goes_back_to_feed() {
    let mut app = TestApp::spawn().await;
    app.sign_in_reader(&json!([article(1, "Harbour reopens")]))
        .await;

    assert_eq!(app.get("/articles/77").await.url().path(), "/home");
}

#[tokio::test]
async fn test_post_comment() {
    let mut app = TestApp::spawn().await;
    app.sign_in_reader(&json!([article(1, "Harbour reopens")]))
        .await;

    let comments = app
        .api
        .mock("GET", "/api/all-comments")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ok_envelope(&json!(null)))
        .create_async()
        .await;
    app.keep(comments);
    let create = app
        .api
        .mock("POST", "/api/comment")
        .match_body(Matcher::PartialJson(json!({
            "article_id": 1,
            "user_name": "Nadia",
            "user_email": "nadia",
            "content": "Finally!",
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ok_envelope(&json!(true)))
        .expect(1)
        .create_async()
        .await;

    // Blank field: nothing is sent and the typed text is kept
    let body = app
        .post_form(
            "/articles/1/comments",
            &[("user_name", "Nadia"), ("user_email", " "), ("content", "Finally!")],
        )
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Please fill all fields"));
    assert!(body.contains("Finally!"));

    // The address itself is left to the API
    let body = app
        .post_form(
            "/articles/1/comments",
            &[("user_name", "Nadia"), ("user_email", "nadia"), ("content", "Finally!")],
        )
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("No comments yet."));
    create.assert_async().await;
}

#[tokio::test]
async fn test_static_assets_are_cacheable() {
    let app = TestApp::spawn().await;
    let resp = app.get("/static/img/placeholder.svg").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()["cache-control"],
        "public, max-age=31536000, immutable"
    );

    let resp = app.get("/auth/login").await;
    assert_eq!(resp.headers()["cache-control"], "no-store, max-age=0");
    assert_eq!(resp.headers()["x-frame-options"], "DENY");
    assert!(resp.headers().contains_key("x-request-id"));
}
