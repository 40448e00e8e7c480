use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use agora_persist::{Community, NewCommunity};
use crate::{
    error::ApiResult,
    extract::{ApiJson, ApiQuery},
    routes::threads::{view_to_response, PageQuery, ThreadResponse},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCommunityRequest {
    pub id: String,
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    pub created_by: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MembershipRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommunityResponse {
    pub community_id: String,
    pub username: String,
    pub name: String,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub created_by: String,
    pub threads: Vec<String>,
    pub members: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommunitiesResponse {
    pub communities: Vec<CommunityResponse>,
    pub is_next: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommunityThreadsResponse {
    pub threads: Vec<ThreadResponse>,
}

#[utoipa::path(
    post,
    path = "/communities",
    request_body = CreateCommunityRequest,
    responses(
        (status = 201, description = "Community created", body = CommunityResponse),
        (status = 404, description = "Creator not found"),
        (status = 409, description = "Community already exists")
    ),
    tag = "communities"
)]
pub async fn create_community(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateCommunityRequest>,
) -> ApiResult<(StatusCode, Json<CommunityResponse>)> {
    let community = state
        .forum
        .create_community(NewCommunity {
            id: req.id,
            username: req.username,
            name: req.name,
            image: req.image,
            bio: req.bio,
            created_by: req.created_by,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(community_to_response(community))))
}

#[utoipa::path(
    get,
    path = "/communities",
    params(
        ("page" = Option<u64>, Query, description = "Page number, starting at 1 (default: 1)"),
        ("page_size" = Option<u64>, Query, description = "Communities per page (max 100)")
    ),
    responses(
        (status = 200, description = "Communities, newest first", body = CommunitiesResponse)
    ),
    tag = "communities"
)]
pub async fn list_communities(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<CommunitiesResponse>> {
    let page = query.to_page(state.config.feed.page_size);
    let result = state.forum.fetch_communities(page).await?;

    Ok(Json(CommunitiesResponse {
        communities: result.communities.into_iter().map(community_to_response).collect(),
        is_next: result.is_next,
    }))
}

#[utoipa::path(
    get,
    path = "/communities/{community_id}",
    params(
        ("community_id" = String, Path, description = "Community ID")
    ),
    responses(
        (status = 200, description = "Community details", body = CommunityResponse),
        (status = 404, description = "Community not found")
    ),
    tag = "communities"
)]
pub async fn get_community(
    State(state): State<Arc<AppState>>,
    Path(community_id): Path<String>,
) -> ApiResult<Json<CommunityResponse>> {
    let community = state.forum.fetch_community(&community_id).await?;
    Ok(Json(community_to_response(community)))
}

#[utoipa::path(
    get,
    path = "/communities/{community_id}/threads",
    params(
        ("community_id" = String, Path, description = "Community ID")
    ),
    responses(
        (status = 200, description = "Community threads, newest first", body = CommunityThreadsResponse),
        (status = 404, description = "Community not found")
    ),
    tag = "communities"
)]
pub async fn list_community_threads(
    State(state): State<Arc<AppState>>,
    Path(community_id): Path<String>,
) -> ApiResult<Json<CommunityThreadsResponse>> {
    let threads = state.forum.fetch_community_posts(&community_id).await?;
    Ok(Json(CommunityThreadsResponse {
        threads: threads.into_iter().map(view_to_response).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/communities/{community_id}/members",
    params(
        ("community_id" = String, Path, description = "Community ID")
    ),
    request_body = MembershipRequest,
    responses(
        (status = 200, description = "Membership added", body = CommunityResponse),
        (status = 404, description = "Community or user not found")
    ),
    tag = "communities"
)]
pub async fn join_community(
    State(state): State<Arc<AppState>>,
    Path(community_id): Path<String>,
    ApiJson(req): ApiJson<MembershipRequest>,
) -> ApiResult<Json<CommunityResponse>> {
    let community = state.forum.join_community(&community_id, &req.user_id).await?;
    Ok(Json(community_to_response(community)))
}

#[utoipa::path(
    delete,
    path = "/communities/{community_id}/members/{user_id}",
    params(
        ("community_id" = String, Path, description = "Community ID"),
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Membership removed", body = CommunityResponse),
        (status = 404, description = "Community or user not found")
    ),
    tag = "communities"
)]
pub async fn leave_community(
    State(state): State<Arc<AppState>>,
    Path((community_id, user_id)): Path<(String, String)>,
) -> ApiResult<Json<CommunityResponse>> {
    let community = state.forum.leave_community(&community_id, &user_id).await?;
    Ok(Json(community_to_response(community)))
}

fn community_to_response(community: Community) -> CommunityResponse {
    CommunityResponse {
        community_id: community.id,
        username: community.username,
        name: community.name,
        image: community.image,
        bio: community.bio,
        created_by: community.created_by,
        threads: community.threads,
        members: community.members,
        created_at: community.created_at,
    }
}
