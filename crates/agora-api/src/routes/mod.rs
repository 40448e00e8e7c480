pub mod communities;
pub mod health;
pub mod navigation;
pub mod threads;
pub mod users;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{config::Config, middleware::logging, state::AppState};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        threads::list_posts,
        threads::create_thread,
        threads::get_thread,
        threads::delete_thread,
        threads::list_descendants,
        threads::add_comment,
        threads::toggle_like,
        users::upsert_user,
        users::get_user,
        users::list_user_threads,
        users::get_activity,
        communities::create_community,
        communities::list_communities,
        communities::get_community,
        communities::list_community_threads,
        communities::join_community,
        communities::leave_community,
        navigation::navigation,
    ),
    components(schemas(
        health::HealthResponse,
        threads::CreateThreadRequest,
        threads::CreateCommentRequest,
        threads::ToggleLikeRequest,
        threads::AuthorResponse,
        threads::CommunitySummaryResponse,
        threads::ThreadResponse,
        threads::ThreadRecordResponse,
        threads::PostsResponse,
        threads::DescendantsResponse,
        threads::DeleteThreadResponse,
        threads::LikeResponse,
        users::UpsertUserRequest,
        users::UserResponse,
        users::UserThreadsResponse,
        communities::CreateCommunityRequest,
        communities::MembershipRequest,
        communities::CommunityResponse,
        communities::CommunitiesResponse,
        communities::CommunityThreadsResponse,
        navigation::SidebarLink,
        navigation::NavigationResponse,
    )),
    tags(
        (name = "health", description = "Service status"),
        (name = "threads", description = "Posts, replies and likes"),
        (name = "users", description = "User profiles and activity"),
        (name = "communities", description = "Communities and membership"),
        (name = "navigation", description = "Sidebar navigation")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Threads
        .route("/threads", get(threads::list_posts).post(threads::create_thread))
        .route("/threads/:thread_id", get(threads::get_thread).delete(threads::delete_thread))
        .route("/threads/:thread_id/descendants", get(threads::list_descendants))
        .route("/threads/:thread_id/comments", post(threads::add_comment))
        .route("/threads/:thread_id/likes", post(threads::toggle_like))
        // Users
        .route("/users/:user_id", put(users::upsert_user).get(users::get_user))
        .route("/users/:user_id/threads", get(users::list_user_threads))
        .route("/users/:user_id/activity", get(users::get_activity))
        // Communities
        .route(
            "/communities",
            get(communities::list_communities).post(communities::create_community),
        )
        .route("/communities/:community_id", get(communities::get_community))
        .route("/communities/:community_id/threads", get(communities::list_community_threads))
        .route("/communities/:community_id/members", post(communities::join_community))
        .route(
            "/communities/:community_id/members/:user_id",
            delete(communities::leave_community),
        )
        // Navigation
        .route("/navigation", get(navigation::navigation))
        // Docs
        .route("/api-docs/openapi.json", get(openapi_json));

    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    // Build full router with middleware
    Router::new()
        .merge(api_routes)
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors.allow_origin(Any)
        } else {
            let parsed_origins: Vec<axum::http::HeaderValue> = config.cors.origins
                .iter()
                .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
                .collect();

            cors.allow_origin(parsed_origins)
        }
    } else {
        CorsLayer::permissive()
    }
}
