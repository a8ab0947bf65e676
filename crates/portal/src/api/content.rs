//! Content endpoints: categories, articles, drafts and comments.

use std::sync::Arc;

use brief_bulletin_core::{
    Article, ArticleId, Category, Comment, CommentId, NewComment, PageRequest,
};
use secrecy::SecretString;
use tracing::{debug, instrument};

use super::{ApiClient, ApiEnvelope, ApiError};

impl ApiClient {
    /// Category list. Public, cached for 10 minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is not cached and the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Arc<Vec<Category>>, ApiError> {
        if let Some(categories) = self.category_cache().get(&()).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Arc<Vec<Category>> =
            Arc::new(self.get("api/category", &[], None).await?.payload_list()?);
        self.category_cache().insert((), Arc::clone(&categories)).await;
        Ok(categories)
    }

    /// One page of published articles in a language.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn articles(
        &self,
        token: &SecretString,
        request: &PageRequest,
    ) -> Result<Vec<Article>, ApiError> {
        let query = [
            ("page", request.page.to_string()),
            ("lang", request.language.code().to_string()),
            ("totalNews", request.offset.to_string()),
        ];
        self.get("api/articles", &query, Some(token))
            .await?
            .payload_list()
    }

    /// One page of draft articles awaiting approval.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn drafts(&self, token: &SecretString, page: u32) -> Result<Vec<Article>, ApiError> {
        self.get("api/draft-article-list", &[("page", page.to_string())], Some(token))
            .await?
            .payload_list()
    }

    /// Publish a draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the API refuses.
    #[instrument(skip(self, token))]
    pub async fn publish_article(
        &self,
        token: &SecretString,
        id: ArticleId,
    ) -> Result<ApiEnvelope, ApiError> {
        self.get("api/publish-article", &[("id", id.to_string())], Some(token))
            .await
    }

    /// Move a published article back to draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the API refuses.
    #[instrument(skip(self, token))]
    pub async fn draft_article(
        &self,
        token: &SecretString,
        id: ArticleId,
    ) -> Result<ApiEnvelope, ApiError> {
        self.get("api/draft-article", &[("id", id.to_string())], Some(token))
            .await
    }

    /// Bump the read counter of an article.
    ///
    /// # Errors
    ///
    /// Returns an error if the API refuses.
    #[instrument(skip(self, token))]
    pub async fn read_news(&self, token: &SecretString, id: ArticleId) -> Result<(), ApiError> {
        self.get("api/read-news", &[("id", id.to_string())], Some(token))
            .await
            .map(drop)
    }

    /// Approved comments of an article.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn comments(
        &self,
        token: &SecretString,
        article_id: ArticleId,
    ) -> Result<Vec<Comment>, ApiError> {
        self.get(
            "api/all-comments",
            &[("article_id", article_id.to_string())],
            Some(token),
        )
        .await?
        .payload_list()
    }

    /// Submit a comment. New comments wait for moderation.
    ///
    /// # Errors
    ///
    /// Returns an error if the API refuses.
    #[instrument(skip(self, token, comment), fields(article_id = %comment.article_id))]
    pub async fn create_comment(
        &self,
        token: &SecretString,
        comment: &NewComment,
    ) -> Result<ApiEnvelope, ApiError> {
        self.post("api/comment", comment, Some(token)).await
    }

    /// Comments waiting for moderation.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn approval_due_comments(
        &self,
        token: &SecretString,
    ) -> Result<Vec<Comment>, ApiError> {
        self.get("api/approval-due-comments", &[], Some(token))
            .await?
            .payload_list()
    }

    /// Approve a pending comment.
    ///
    /// # Errors
    ///
    /// Returns an error if the API refuses.
    #[instrument(skip(self, token))]
    pub async fn activate_comment(
        &self,
        token: &SecretString,
        id: CommentId,
    ) -> Result<ApiEnvelope, ApiError> {
        self.get("api/active-comment", &[("comment_id", id.to_string())], Some(token))
            .await
    }

    /// Archive a comment.
    ///
    /// # Errors
    ///
    /// Returns an error if the API refuses.
    #[instrument(skip(self, token))]
    pub async fn disable_comment(
        &self,
        token: &SecretString,
        id: CommentId,
    ) -> Result<ApiEnvelope, ApiError> {
        self.get("api/disable-comment", &[("comment_id", id.to_string())], Some(token))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use brief_bulletin_core::{CommentForm, Language};
    use mockito::Matcher;
    use serde_json::json;

    use super::*;
    use crate::config::PortalConfig;

    async fn client(server: &mockito::ServerGuard) -> ApiClient {
        ApiClient::new(&PortalConfig::for_api(&server.url()).unwrap()).unwrap()
    }

    fn token() -> SecretString {
        SecretString::from("tok")
    }

    #[tokio::test]
    async fn test_articles_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/articles")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "2".into()),
                Matcher::UrlEncoded("lang".into(), "bn".into()),
                Matcher::UrlEncoded("totalNews".into(), "10".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "statusCode": 200,
                    "isSuccess": true,
                    "payload": [{ "id": 11, "title": "Headline" }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let api = client(&server).await;
        let request = PageRequest {
            page: 2,
            language: Language::Bn,
            offset: 10,
        };
        let articles = api.articles(&token(), &request).await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title(), "Headline");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_draft_list_payload_true() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/draft-article-list")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .with_status(200)
            .with_body(json!({ "statusCode": 200, "isSuccess": true, "payload": true }).to_string())
            .create_async()
            .await;

        let api = client(&server).await;
        assert!(api.drafts(&token(), 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pending_comments_null_payload() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/approval-due-comments")
            .with_status(200)
            .with_body(json!({ "statusCode": 200, "isSuccess": true, "payload": null }).to_string())
            .create_async()
            .await;

        let api = client(&server).await;
        assert!(api.approval_due_comments(&token()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_categories_are_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/category")
            .with_status(200)
            .with_body(
                json!({
                    "statusCode": 200,
                    "isSuccess": true,
                    "payload": [{ "id": 1, "name": "Politics", "slug": "politics" }]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let api = client(&server).await;
        let first = api.categories().await.unwrap();
        let second = api.categories().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].name, "Politics");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_comment_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/comment")
            .match_header("authorization", "Bearer tok")
            .match_body(Matcher::Json(json!({
                "article_id": 4,
                "user_name": "Rahim",
                "user_email": "rahim@example.com",
                "content": "Nice"
            })))
            .with_status(200)
            .with_body(json!({ "statusCode": 200, "isSuccess": true }).to_string())
            .create_async()
            .await;

        let api = client(&server).await;
        let form = CommentForm {
            user_name: "Rahim".into(),
            user_email: "rahim@example.com".into(),
            content: "Nice".into(),
        };
        let comment = NewComment::from_form(ArticleId::new(4), &form).unwrap();
        api.create_comment(&token(), &comment).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_moderation_endpoints() {
        let mut server = mockito::Server::new_async().await;
        let ok = json!({ "statusCode": 200, "isSuccess": true }).to_string();
        let publish = server
            .mock("GET", "/api/publish-article")
            .match_query(Matcher::UrlEncoded("id".into(), "8".into()))
            .with_body(&ok)
            .create_async()
            .await;
        let draft = server
            .mock("GET", "/api/draft-article")
            .match_query(Matcher::UrlEncoded("id".into(), "8".into()))
            .with_body(&ok)
            .create_async()
            .await;
        let activate = server
            .mock("GET", "/api/active-comment")
            .match_query(Matcher::UrlEncoded("comment_id".into(), "3".into()))
            .with_body(&ok)
            .create_async()
            .await;
        let disable = server
            .mock("GET", "/api/disable-comment")
            .match_query(Matcher::UrlEncoded("comment_id".into(), "3".into()))
            .with_body(&ok)
            .create_async()
            .await;

        let api = client(&server).await;
        api.publish_article(&token(), ArticleId::new(8)).await.unwrap();
        api.draft_article(&token(), ArticleId::new(8)).await.unwrap();
        api.activate_comment(&token(), CommentId::new(3)).await.unwrap();
        api.disable_comment(&token(), CommentId::new(3)).await.unwrap();

        publish.assert_async().await;
        draft.assert_async().await;
        activate.assert_async().await;
        disable.assert_async().await;
    }
}
