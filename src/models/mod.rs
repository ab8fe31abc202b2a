use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account. The bookmark list holds question ids the user saved;
/// followers holds user ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(default)]
    pub bookmark: Vec<String>,
    #[serde(default)]
    pub followers: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Question posted by a user, optionally inside a community.
///
/// The vote lists hold user ids. A user id appears in at most one of
/// upvotes/downvotes; the client computes vote switches as a single state
/// change and the server stores the replacement payload as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub name: String,
    pub content: String,
    pub created_by_id: String,
    #[serde(default)]
    pub community_id: Option<String>,
    #[serde(default)]
    pub upvotes: Vec<String>,
    #[serde(default)]
    pub downvotes: Vec<String>,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created_by: Option<Box<User>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub community: Option<Box<Community>>,
}

/// Answer to a question. The community is inherited from the question's
/// community when the comment is created without one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub created_by_id: String,
    pub question_id: String,
    #[serde(default)]
    pub community_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created_by: Option<Box<User>>,
}

/// Community of users. The name is unique; members holds user ids and the
/// creator is its first member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub members: Vec<String>,
    pub created_by_id: String,
    #[serde(default)]
    pub question_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created_by: Option<Box<User>>,
}

/// User detail response: the profile plus the communities they belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub communities: Vec<Community>,
}

// ==================== Request bodies ====================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    pub name: String,
    pub content: String,
    pub community_id: Option<String>,
}

/// Full-replacement update. Vote and like lists arrive as the complete next
/// state computed client-side, not as a diff.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionRequest {
    pub name: Option<String>,
    pub content: Option<String>,
    pub upvotes: Option<Vec<String>>,
    pub downvotes: Option<Vec<String>>,
    pub likes: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    pub question_id: String,
    pub community_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCommunityRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateCommunityRequest {
    pub name: Option<String>,
    pub members: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub bookmark: Option<Vec<String>>,
    pub followers: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

// ==================== Error payload ====================

/// JSON error body. `detail` is the field the client-side error channel
/// reads first when deriving a display message.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
