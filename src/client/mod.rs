//! Typed HTTP client for the collection and detail endpoints.
//!
//! One method family per entity type, all following the same contract:
//! page and filter structs serialize to query parameters, the bearer
//! token rides along when present, and non-2xx responses come back as a
//! `FailedResponse` ready for the transient error channel.

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::models::*;
use crate::sync::error::FailedResponse;
use crate::sync::query::{ListFilter, PageQuery};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed with status {}", .0.status)]
    Response(FailedResponse),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// Reduce to the descriptor the error channel holds. Transport
    /// failures carry status 0 and land in the unknown severity bucket.
    pub fn to_failed_response(&self) -> FailedResponse {
        match self {
            ApiError::Response(failed) => failed.clone(),
            ApiError::Transport(err) => FailedResponse {
                status: 0,
                status_text: err.to_string(),
                body: Value::Null,
            },
        }
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Attach the session token sent as a bearer credential.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(ref token) = self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let status_text = status.canonical_reason().unwrap_or_default().to_string();
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            Err(ApiError::Response(FailedResponse {
                status: status.as_u16(),
                status_text,
                body,
            }))
        }
    }

    // ==================== Auth ====================

    pub async fn register(&self, req: &RegisterRequest) -> Result<LoginResponse, ApiError> {
        self.send(self.request(Method::POST, "/api/auth/register").json(req))
            .await
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.send(self.request(Method::POST, "/api/auth/login").json(req))
            .await
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.send(self.request(Method::GET, "/api/auth/me")).await
    }

    // ==================== Questions ====================

    pub async fn list_questions(
        &self,
        page: &PageQuery,
        filter: &ListFilter,
    ) -> Result<Vec<Question>, ApiError> {
        self.send(
            self.request(Method::GET, "/api/questions")
                .query(&page.to_query_pairs())
                .query(&filter.to_query_pairs()),
        )
        .await
    }

    pub async fn popular_questions(&self, page: &PageQuery) -> Result<Vec<Question>, ApiError> {
        self.send(
            self.request(Method::GET, "/api/questions/popular")
                .query(&page.to_query_pairs()),
        )
        .await
    }

    pub async fn get_question(&self, id: &str) -> Result<Question, ApiError> {
        self.send(self.request(Method::GET, &format!("/api/questions/{}", id)))
            .await
    }

    pub async fn create_question(
        &self,
        req: &CreateQuestionRequest,
    ) -> Result<Question, ApiError> {
        self.send(self.request(Method::POST, "/api/questions").json(req))
            .await
    }

    /// Full-replacement update: the entire held entity is the payload.
    pub async fn update_question(&self, question: &Question) -> Result<Question, ApiError> {
        self.send(
            self.request(Method::PUT, &format!("/api/questions/{}", question.id))
                .json(question),
        )
        .await
    }

    pub async fn delete_question(&self, id: &str) -> Result<Question, ApiError> {
        self.send(self.request(Method::DELETE, &format!("/api/questions/{}", id)))
            .await
    }

    // ==================== Comments ====================

    pub async fn list_comments(
        &self,
        page: &PageQuery,
        filter: &ListFilter,
    ) -> Result<Vec<Comment>, ApiError> {
        self.send(
            self.request(Method::GET, "/api/comments")
                .query(&page.to_query_pairs())
                .query(&filter.to_query_pairs()),
        )
        .await
    }

    pub async fn create_comment(&self, req: &CreateCommentRequest) -> Result<Comment, ApiError> {
        self.send(self.request(Method::POST, "/api/comments").json(req))
            .await
    }

    pub async fn update_comment(&self, comment: &Comment) -> Result<Comment, ApiError> {
        self.send(
            self.request(Method::PUT, &format!("/api/comments/{}", comment.id))
                .json(comment),
        )
        .await
    }

    pub async fn delete_comment(&self, id: &str) -> Result<Comment, ApiError> {
        self.send(self.request(Method::DELETE, &format!("/api/comments/{}", id)))
            .await
    }

    // ==================== Communities ====================

    pub async fn list_communities(
        &self,
        page: &PageQuery,
        filter: &ListFilter,
    ) -> Result<Vec<Community>, ApiError> {
        self.send(
            self.request(Method::GET, "/api/communities")
                .query(&page.to_query_pairs())
                .query(&filter.to_query_pairs()),
        )
        .await
    }

    pub async fn get_community(&self, id: &str) -> Result<Community, ApiError> {
        self.send(self.request(Method::GET, &format!("/api/communities/{}", id)))
            .await
    }

    pub async fn create_community(
        &self,
        req: &CreateCommunityRequest,
    ) -> Result<Community, ApiError> {
        self.send(self.request(Method::POST, "/api/communities").json(req))
            .await
    }

    pub async fn update_community(&self, community: &Community) -> Result<Community, ApiError> {
        self.send(
            self.request(Method::PUT, &format!("/api/communities/{}", community.id))
                .json(community),
        )
        .await
    }

    pub async fn delete_community(&self, id: &str) -> Result<Community, ApiError> {
        self.send(self.request(Method::DELETE, &format!("/api/communities/{}", id)))
            .await
    }

    // ==================== Users ====================

    pub async fn get_user(&self, id: &str) -> Result<UserDetail, ApiError> {
        self.send(self.request(Method::GET, &format!("/api/users/{}", id)))
            .await
    }

    pub async fn update_user(&self, user: &User) -> Result<User, ApiError> {
        self.send(
            self.request(Method::PUT, &format!("/api/users/{}", user.id))
                .json(user),
        )
        .await
    }

    /// The session user's bookmarked questions.
    pub async fn favorite_questions(&self, page: &PageQuery) -> Result<Vec<Question>, ApiError> {
        self.send(
            self.request(Method::GET, "/api/users/favorites")
                .query(&page.to_query_pairs()),
        )
        .await
    }
}
