use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use agora_persist::{
    likes_label, AuthorSummary, CommunitySummary, CreateThreadParams, DeletedThreads, LikeState,
    Page, Thread, ThreadView,
};
use crate::{error::ApiResult, extract::{ApiJson, ApiQuery}, state::AppState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateThreadRequest {
    pub text: String,
    /// Id of the posting user
    pub author: String,
    /// Community to post into; unknown ids produce a personal thread
    #[serde(default)]
    pub community_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    pub text: String,
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToggleLikeRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl PageQuery {
    pub fn to_page(&self, default_size: u64) -> Page {
        Page::new(self.page.unwrap_or(1), self.page_size.unwrap_or(default_size))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthorResponse {
    pub id: String,
    pub username: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommunitySummaryResponse {
    pub id: String,
    pub username: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A thread with author, community and expanded replies
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ThreadResponse {
    pub thread_id: String,
    pub text: String,
    pub parent_id: Option<String>,
    pub author: Option<AuthorResponse>,
    pub community: Option<CommunitySummaryResponse>,
    pub likes: Vec<String>,
    pub likes_count: usize,
    pub likes_label: Option<String>,
    pub children_count: usize,
    pub children: Vec<ThreadResponse>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A thread document as stored
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ThreadRecordResponse {
    pub thread_id: String,
    pub text: String,
    pub author: String,
    pub community: Option<String>,
    pub parent_id: Option<String>,
    pub children: Vec<String>,
    pub likes_count: usize,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PostsResponse {
    pub posts: Vec<ThreadResponse>,
    pub is_next: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DescendantsResponse {
    pub threads: Vec<ThreadRecordResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteThreadResponse {
    pub deleted_thread_ids: Vec<String>,
    pub updated_user_ids: Vec<String>,
    pub updated_community_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LikeResponse {
    pub liked: bool,
    pub likes_count: usize,
    pub likes_label: Option<String>,
}

/// Paginated feed of top-level threads
#[utoipa::path(
    get,
    path = "/threads",
    params(
        ("page" = Option<u64>, Query, description = "Page number, starting at 1 (default: 1)"),
        ("page_size" = Option<u64>, Query, description = "Posts per page (default from config, max 100)")
    ),
    responses(
        (status = 200, description = "Feed page", body = PostsResponse)
    ),
    tag = "threads"
)]
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<PostsResponse>> {
    let page = query.to_page(state.config.feed.page_size);
    let feed = state.forum.fetch_posts(page).await?;

    Ok(Json(PostsResponse {
        posts: feed.posts.into_iter().map(view_to_response).collect(),
        is_next: feed.is_next,
    }))
}

/// Create a new top-level thread
#[utoipa::path(
    post,
    path = "/threads",
    request_body = CreateThreadRequest,
    responses(
        (status = 201, description = "Thread created", body = ThreadRecordResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Author not found")
    ),
    tag = "threads"
)]
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateThreadRequest>,
) -> ApiResult<(StatusCode, Json<ThreadRecordResponse>)> {
    let thread = state
        .forum
        .create_thread(CreateThreadParams {
            text: req.text,
            author: req.author,
            community_id: req.community_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(thread_to_response(thread))))
}

/// Get a thread with two levels of replies
#[utoipa::path(
    get,
    path = "/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Thread details", body = ThreadResponse),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<ThreadResponse>> {
    let view = state.forum.fetch_thread_by_id(&thread_id).await?;
    Ok(Json(view_to_response(view)))
}

/// Delete a thread and all of its replies
#[utoipa::path(
    delete,
    path = "/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Thread deleted", body = DeleteThreadResponse),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<DeleteThreadResponse>> {
    let deleted = state.forum.delete_thread(&thread_id).await?;
    Ok(Json(deleted_to_response(deleted)))
}

/// Every descendant reply of a thread
#[utoipa::path(
    get,
    path = "/threads/{thread_id}/descendants",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Descendant threads", body = DescendantsResponse),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn list_descendants(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<DescendantsResponse>> {
    let threads = state.forum.fetch_all_child_threads(&thread_id).await?;
    Ok(Json(DescendantsResponse {
        threads: threads.into_iter().map(thread_to_response).collect(),
    }))
}

/// Reply to a thread
#[utoipa::path(
    post,
    path = "/threads/{thread_id}/comments",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = ThreadRecordResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Thread or user not found")
    ),
    tag = "threads"
)]
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    ApiJson(req): ApiJson<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<ThreadRecordResponse>)> {
    let comment = state
        .forum
        .add_comment_to_thread(&thread_id, &req.text, &req.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(thread_to_response(comment))))
}

/// Like a thread, or undo an existing like
#[utoipa::path(
    post,
    path = "/threads/{thread_id}/likes",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    request_body = ToggleLikeRequest,
    responses(
        (status = 200, description = "Like state after the toggle", body = LikeResponse),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn toggle_like(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    ApiJson(req): ApiJson<ToggleLikeRequest>,
) -> ApiResult<Json<LikeResponse>> {
    let like = state.forum.toggle_like(&thread_id, &req.user_id).await?;
    Ok(Json(like_to_response(like)))
}

pub(crate) fn view_to_response(view: ThreadView) -> ThreadResponse {
    let likes_count = view.likes_count();
    ThreadResponse {
        thread_id: view.id,
        text: view.text,
        parent_id: view.parent_id,
        author: view.author.map(author_to_response),
        community: view.community.map(community_summary_to_response),
        likes: view.likes,
        likes_count,
        likes_label: likes_label(likes_count),
        children_count: view.children_count,
        children: view.children.into_iter().map(view_to_response).collect(),
        created_at: view.created_at,
    }
}

pub(crate) fn thread_to_response(thread: Thread) -> ThreadRecordResponse {
    ThreadRecordResponse {
        thread_id: thread.id,
        text: thread.text,
        author: thread.author,
        community: thread.community,
        parent_id: thread.parent_id,
        children: thread.children,
        likes_count: thread.likes.len(),
        created_at: thread.created_at,
    }
}

fn author_to_response(author: AuthorSummary) -> AuthorResponse {
    AuthorResponse {
        id: author.id,
        username: author.username,
        name: author.name,
        image: author.image,
    }
}

fn community_summary_to_response(community: CommunitySummary) -> CommunitySummaryResponse {
    CommunitySummaryResponse {
        id: community.id,
        username: community.username,
        name: community.name,
        image: community.image,
    }
}

fn deleted_to_response(deleted: DeletedThreads) -> DeleteThreadResponse {
    DeleteThreadResponse {
        deleted_thread_ids: deleted.thread_ids,
        updated_user_ids: deleted.author_ids,
        updated_community_ids: deleted.community_ids,
    }
}

fn like_to_response(like: LikeState) -> LikeResponse {
    LikeResponse {
        liked: like.liked,
        likes_count: like.likes_count,
        likes_label: likes_label(like.likes_count),
    }
}
