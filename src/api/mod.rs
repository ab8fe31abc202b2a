use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::{AuthService, AuthUser};
use crate::models::*;
use crate::store::{Store, StoreError};

pub struct AppState {
    pub store: Arc<Store>,
    pub auth_service: Arc<AuthService>,
}

/// Query parameters recognized by every collection endpoint.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    take: Option<i64>,
    skip: Option<i64>,
    #[serde(rename = "orderBy")]
    order_by: Option<String>,
    search: Option<String>,
    #[serde(rename = "communityId")]
    community_id: Option<String>,
    #[serde(rename = "createdById")]
    created_by_id: Option<String>,
    #[serde(rename = "questionId")]
    question_id: Option<String>,
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

impl ListQuery {
    fn take(&self) -> i64 {
        self.take.unwrap_or(9)
    }

    fn skip(&self) -> i64 {
        self.skip.unwrap_or(0)
    }

    fn order_by(&self) -> &str {
        self.order_by.as_deref().unwrap_or("createdAt")
    }
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorBody::new("Unauthorized"))
}

fn store_error(e: StoreError) -> HttpResponse {
    match e {
        StoreError::NotFound(msg) => HttpResponse::NotFound().json(ErrorBody::new(msg)),
        StoreError::Conflict(msg) => HttpResponse::BadRequest().json(ErrorBody::new(msg)),
        other => HttpResponse::InternalServerError().json(ErrorBody::new(other.to_string())),
    }
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(ErrorBody::new("Method not allowed"))
}

// ==================== Health Check ====================

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

// ==================== Auth Endpoints ====================

pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> impl Responder {
    let password_hash = match state.auth_service.hash_password(&body.password) {
        Ok(hash) => hash,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorBody::new("Failed to hash password"))
        }
    };

    let mut user = User {
        id: String::new(),
        name: body.name.clone(),
        email: body.email.clone(),
        image: body.image.clone().unwrap_or_default(),
        password_hash,
        bookmark: Vec::new(),
        followers: Vec::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    if let Err(e) = state.store.create_user(&mut user) {
        return store_error(e);
    }

    let token = match state.auth_service.generate_token(&user.id) {
        Ok(t) => t,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorBody::new("Failed to generate token"))
        }
    };

    HttpResponse::Created().json(LoginResponse { token, user })
}

pub async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> impl Responder {
    let user = match state.store.get_user_by_email(&body.email) {
        Ok(u) => u,
        Err(StoreError::NotFound(_)) => {
            return HttpResponse::Unauthorized().json(ErrorBody::new("Invalid credentials"));
        }
        Err(e) => return store_error(e),
    };

    let valid = state
        .auth_service
        .verify_password(&body.password, &user.password_hash)
        .unwrap_or(false);

    if !valid {
        return HttpResponse::Unauthorized().json(ErrorBody::new("Invalid credentials"));
    }

    let token = match state.auth_service.generate_token(&user.id) {
        Ok(t) => t,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorBody::new("Failed to generate token"))
        }
    };

    HttpResponse::Ok().json(LoginResponse { token, user })
}

pub async fn current_user(
    state: web::Data<AppState>,
    auth_user: Option<AuthUser>,
) -> impl Responder {
    let auth_user = match auth_user {
        Some(a) => a,
        None => return unauthorized(),
    };

    match state.store.get_user(&auth_user.user_id) {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => store_error(e),
    }
}

// ==================== Question Endpoints ====================

pub async fn list_questions(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> impl Responder {
    match state.store.list_questions(
        query.community_id.as_deref(),
        query.created_by_id.as_deref(),
        query.search.as_deref().unwrap_or(""),
        query.order_by(),
        query.take(),
        query.skip(),
    ) {
        Ok(questions) => HttpResponse::Ok().json(questions),
        Err(e) => store_error(e),
    }
}

pub async fn popular_questions(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> impl Responder {
    match state.store.list_popular_questions(query.take(), query.skip()) {
        Ok(questions) => HttpResponse::Ok().json(questions),
        Err(e) => store_error(e),
    }
}

pub async fn create_question(
    state: web::Data<AppState>,
    auth_user: Option<AuthUser>,
    body: web::Json<CreateQuestionRequest>,
) -> impl Responder {
    let auth_user = match auth_user {
        Some(a) => a,
        None => return unauthorized(),
    };

    let mut question = Question {
        id: String::new(),
        name: body.name.clone(),
        content: body.content.clone(),
        created_by_id: auth_user.user_id.clone(),
        community_id: body.community_id.clone(),
        upvotes: Vec::new(),
        downvotes: Vec::new(),
        likes: Vec::new(),
        comment_count: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        created_by: None,
        community: None,
    };

    match state.store.create_question(&mut question) {
        Ok(_) => HttpResponse::Created().json(question),
        Err(e) => store_error(e),
    }
}

pub async fn get_question(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    match state.store.get_question(&id) {
        Ok(question) => HttpResponse::Ok().json(question),
        Err(e) => store_error(e),
    }
}

pub async fn update_question(
    state: web::Data<AppState>,
    auth_user: Option<AuthUser>,
    path: web::Path<String>,
    body: web::Json<UpdateQuestionRequest>,
) -> impl Responder {
    let auth_user = match auth_user {
        Some(a) => a,
        None => return unauthorized(),
    };

    let id = path.into_inner();
    match state.store.update_question(&id, &auth_user.user_id, &body) {
        Ok(question) => HttpResponse::Ok().json(question),
        Err(e) => store_error(e),
    }
}

pub async fn delete_question(
    state: web::Data<AppState>,
    auth_user: Option<AuthUser>,
    path: web::Path<String>,
) -> impl Responder {
    let auth_user = match auth_user {
        Some(a) => a,
        None => return unauthorized(),
    };

    let id = path.into_inner();
    match state.store.delete_question(&id, &auth_user.user_id) {
        Ok(question) => HttpResponse::Ok().json(question),
        Err(e) => store_error(e),
    }
}

// ==================== Comment Endpoints ====================

pub async fn list_comments(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> impl Responder {
    match state.store.list_comments(
        query.question_id.as_deref(),
        query.community_id.as_deref(),
        query.take(),
        query.skip(),
    ) {
        Ok(comments) => HttpResponse::Ok().json(comments),
        Err(e) => store_error(e),
    }
}

pub async fn create_comment(
    state: web::Data<AppState>,
    auth_user: Option<AuthUser>,
    body: web::Json<CreateCommentRequest>,
) -> impl Responder {
    let auth_user = match auth_user {
        Some(a) => a,
        None => return unauthorized(),
    };

    let question = match state.store.get_question(&body.question_id) {
        Ok(q) => q,
        Err(e) => return store_error(e),
    };

    // Inherit the question's community unless one was given explicitly
    let community_id = body.community_id.clone().or(question.community_id);

    let mut comment = Comment {
        id: String::new(),
        content: body.content.clone(),
        created_by_id: auth_user.user_id.clone(),
        question_id: body.question_id.clone(),
        community_id,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        created_by: None,
    };

    match state.store.create_comment(&mut comment) {
        Ok(_) => HttpResponse::Created().json(comment),
        Err(e) => store_error(e),
    }
}

pub async fn get_comment(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    match state.store.get_comment(&id) {
        Ok(comment) => HttpResponse::Ok().json(comment),
        Err(e) => store_error(e),
    }
}

pub async fn update_comment(
    state: web::Data<AppState>,
    auth_user: Option<AuthUser>,
    path: web::Path<String>,
    body: web::Json<UpdateCommentRequest>,
) -> impl Responder {
    let auth_user = match auth_user {
        Some(a) => a,
        None => return unauthorized(),
    };

    let id = path.into_inner();
    match state
        .store
        .update_comment(&id, &auth_user.user_id, &body.content)
    {
        Ok(comment) => HttpResponse::Ok().json(comment),
        Err(e) => store_error(e),
    }
}

pub async fn delete_comment(
    state: web::Data<AppState>,
    auth_user: Option<AuthUser>,
    path: web::Path<String>,
) -> impl Responder {
    let auth_user = match auth_user {
        Some(a) => a,
        None => return unauthorized(),
    };

    let id = path.into_inner();
    match state.store.delete_comment(&id, &auth_user.user_id) {
        Ok(comment) => HttpResponse::Ok().json(comment),
        Err(e) => store_error(e),
    }
}

// ==================== Community Endpoints ====================

pub async fn list_communities(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> impl Responder {
    // Membership listing for a specific user is unpaginated
    if let Some(ref user_id) = query.user_id {
        return match state.store.list_communities_for_member(user_id) {
            Ok(communities) => HttpResponse::Ok().json(communities),
            Err(e) => store_error(e),
        };
    }

    match state.store.list_communities(
        query.search.as_deref().unwrap_or(""),
        query.take(),
        query.skip(),
    ) {
        Ok(communities) => HttpResponse::Ok().json(communities),
        Err(e) => store_error(e),
    }
}

pub async fn create_community(
    state: web::Data<AppState>,
    auth_user: Option<AuthUser>,
    body: web::Json<CreateCommunityRequest>,
) -> impl Responder {
    let auth_user = match auth_user {
        Some(a) => a,
        None => return unauthorized(),
    };

    let mut community = Community {
        id: String::new(),
        name: body.name.clone(),
        description: body.description.clone(),
        members: vec![auth_user.user_id.clone()],
        created_by_id: auth_user.user_id.clone(),
        question_count: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        created_by: None,
    };

    match state.store.create_community(&mut community) {
        Ok(_) => HttpResponse::Created().json(community),
        Err(e) => store_error(e),
    }
}

pub async fn get_community(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    match state.store.get_community(&id) {
        Ok(community) => HttpResponse::Ok().json(community),
        Err(e) => store_error(e),
    }
}

pub async fn update_community(
    state: web::Data<AppState>,
    auth_user: Option<AuthUser>,
    path: web::Path<String>,
    body: web::Json<UpdateCommunityRequest>,
) -> impl Responder {
    let auth_user = match auth_user {
        Some(a) => a,
        None => return unauthorized(),
    };

    let id = path.into_inner();
    match state.store.update_community(&id, &auth_user.user_id, &body) {
        Ok(community) => HttpResponse::Ok().json(community),
        Err(e) => store_error(e),
    }
}

pub async fn delete_community(
    state: web::Data<AppState>,
    auth_user: Option<AuthUser>,
    path: web::Path<String>,
) -> impl Responder {
    let auth_user = match auth_user {
        Some(a) => a,
        None => return unauthorized(),
    };

    let id = path.into_inner();
    match state.store.delete_community(&id, &auth_user.user_id) {
        Ok(community) => HttpResponse::Ok().json(community),
        Err(e) => store_error(e),
    }
}

// ==================== User Endpoints ====================

pub async fn favorite_questions(
    state: web::Data<AppState>,
    auth_user: Option<AuthUser>,
    query: web::Query<ListQuery>,
) -> impl Responder {
    let auth_user = match auth_user {
        Some(a) => a,
        None => return unauthorized(),
    };

    let user = match state.store.get_user(&auth_user.user_id) {
        Ok(u) => u,
        Err(e) => return store_error(e),
    };

    match state.store.list_bookmarked_questions(
        &user.bookmark,
        query.order_by(),
        query.take(),
        query.skip(),
    ) {
        Ok(questions) => HttpResponse::Ok().json(questions),
        Err(e) => store_error(e),
    }
}

pub async fn get_user(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    let user = match state.store.get_user(&id) {
        Ok(u) => u,
        Err(e) => return store_error(e),
    };

    let communities = match state.store.list_communities_for_member(&user.id) {
        Ok(c) => c,
        Err(e) => return store_error(e),
    };

    HttpResponse::Ok().json(UserDetail { user, communities })
}

/// Updates the session user's record. The path id is accepted for
/// uniformity but the authenticated user is the one updated.
pub async fn update_user(
    state: web::Data<AppState>,
    auth_user: Option<AuthUser>,
    _path: web::Path<String>,
    body: web::Json<UpdateUserRequest>,
) -> impl Responder {
    let auth_user = match auth_user {
        Some(a) => a,
        None => return unauthorized(),
    };

    let mut user = match state.store.get_user(&auth_user.user_id) {
        Ok(u) => u,
        Err(e) => return store_error(e),
    };

    if let Some(ref name) = body.name {
        user.name = name.clone();
    }
    if let Some(ref image) = body.image {
        user.image = image.clone();
    }
    if let Some(ref bookmark) = body.bookmark {
        user.bookmark = bookmark.clone();
    }
    if let Some(ref followers) = body.followers {
        user.followers = followers.clone();
    }

    match state.store.update_user(&mut user) {
        Ok(_) => HttpResponse::Ok().json(user),
        Err(e) => store_error(e),
    }
}

// ==================== Route Configuration ====================

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check
        .service(
            web::resource("/health")
                .route(web::get().to(health))
                .route(web::route().to(method_not_allowed)),
        )
        // Auth
        .service(
            web::resource("/api/auth/register")
                .route(web::post().to(register))
                .route(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/api/auth/login")
                .route(web::post().to(login))
                .route(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/api/auth/me")
                .route(web::get().to(current_user))
                .route(web::route().to(method_not_allowed)),
        )
        // Questions
        .service(
            web::resource("/api/questions")
                .route(web::get().to(list_questions))
                .route(web::post().to(create_question))
                .route(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/api/questions/popular")
                .route(web::get().to(popular_questions))
                .route(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/api/questions/{id}")
                .route(web::get().to(get_question))
                .route(web::put().to(update_question))
                .route(web::delete().to(delete_question))
                .route(web::route().to(method_not_allowed)),
        )
        // Comments
        .service(
            web::resource("/api/comments")
                .route(web::get().to(list_comments))
                .route(web::post().to(create_comment))
                .route(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/api/comments/{id}")
                .route(web::get().to(get_comment))
                .route(web::put().to(update_comment))
                .route(web::delete().to(delete_comment))
                .route(web::route().to(method_not_allowed)),
        )
        // Communities
        .service(
            web::resource("/api/communities")
                .route(web::get().to(list_communities))
                .route(web::post().to(create_community))
                .route(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/api/communities/{id}")
                .route(web::get().to(get_community))
                .route(web::put().to(update_community))
                .route(web::delete().to(delete_community))
                .route(web::route().to(method_not_allowed)),
        )
        // Users
        .service(
            web::resource("/api/users/favorites")
                .route(web::get().to(favorite_questions))
                .route(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/api/users/{id}")
                .route(web::get().to(get_user))
                .route(web::put().to(update_user))
                .route(web::route().to(method_not_allowed)),
        );
}
