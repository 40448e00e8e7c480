use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use agora_persist::{User, UserProfile};
use crate::{
    error::ApiResult,
    extract::ApiJson,
    routes::threads::{view_to_response, ThreadResponse},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpsertUserRequest {
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub user_id: String,
    pub username: String,
    pub name: String,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub onboarded: bool,
    pub threads: Vec<String>,
    pub communities: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserThreadsResponse {
    pub threads: Vec<ThreadResponse>,
}

/// Create or update a user profile
#[utoipa::path(
    put,
    path = "/users/{user_id}",
    params(
        ("user_id" = String, Path, description = "Identity provider user ID")
    ),
    request_body = UpsertUserRequest,
    responses(
        (status = 200, description = "Saved profile", body = UserResponse),
        (status = 400, description = "Invalid request")
    ),
    tag = "users"
)]
pub async fn upsert_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    ApiJson(req): ApiJson<UpsertUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .forum
        .upsert_user(UserProfile {
            id: user_id,
            username: req.username,
            name: req.name,
            image: req.image,
            bio: req.bio,
        })
        .await?;

    Ok(Json(user_to_response(user)))
}

#[utoipa::path(
    get,
    path = "/users/{user_id}",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.forum.fetch_user(&user_id).await?;
    Ok(Json(user_to_response(user)))
}

/// Top-level threads written by a user
#[utoipa::path(
    get,
    path = "/users/{user_id}/threads",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User threads, newest first", body = UserThreadsResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn list_user_threads(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserThreadsResponse>> {
    let threads = state.forum.fetch_user_posts(&user_id).await?;
    Ok(Json(UserThreadsResponse {
        threads: threads.into_iter().map(view_to_response).collect(),
    }))
}

/// Replies other users left on the user's threads
#[utoipa::path(
    get,
    path = "/users/{user_id}/activity",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Replies, newest first", body = UserThreadsResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_activity(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserThreadsResponse>> {
    let replies = state.forum.get_activity(&user_id).await?;
    Ok(Json(UserThreadsResponse {
        threads: replies.into_iter().map(view_to_response).collect(),
    }))
}

fn user_to_response(user: User) -> UserResponse {
    UserResponse {
        user_id: user.id,
        username: user.username,
        name: user.name,
        image: user.image,
        bio: user.bio,
        onboarded: user.onboarded,
        threads: user.threads,
        communities: user.communities,
        created_at: user.created_at,
    }
}
