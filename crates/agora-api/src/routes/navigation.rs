use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::extract::ApiQuery;

/// Route that gets the viewer's user id appended
const PROFILE_ROUTE: &str = "/profile";

/// (label, route, icon)
const SIDEBAR_LINKS: [(&str, &str, &str); 6] = [
    ("Home", "/", "/assets/home.svg"),
    ("Search", "/search", "/assets/search.svg"),
    ("Activity", "/activity", "/assets/heart.svg"),
    ("Create Thread", "/create-thread", "/assets/create.svg"),
    ("Communities", "/communities", "/assets/community.svg"),
    ("Profile", PROFILE_ROUTE, "/assets/user.svg"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SidebarLink {
    pub label: String,
    pub route: String,
    pub img_url: String,
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct NavigationQuery {
    pub pathname: String,
    pub user_id: Option<String>,
    /// Route that was active before this navigation
    pub previous: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NavigationResponse {
    pub links: Vec<SidebarLink>,
}

/// Sidebar links for a viewer, with the profile route pointing at their page
pub fn sidebar_links(user_id: Option<&str>) -> Vec<SidebarLink> {
    SIDEBAR_LINKS
        .iter()
        .map(|(label, route, img_url)| {
            let route = match user_id {
                Some(user_id) if *route == PROFILE_ROUTE => format!("{}/{}", route, user_id),
                _ => route.to_string(),
            };
            SidebarLink {
                label: label.to_string(),
                route,
                img_url: img_url.to_string(),
                active: false,
            }
        })
        .collect()
}

/// Mark the active link: the first whose route is contained in `pathname`
/// (ignoring the bare `/`), or that equals it. With no match the
/// `previous` route keeps its highlight.
pub fn mark_active(links: &mut [SidebarLink], pathname: &str, previous: Option<&str>) {
    let matched = links
        .iter()
        .position(|link| {
            (pathname.contains(link.route.as_str()) && link.route.len() > 1) || pathname == link.route
        })
        .or_else(|| previous.and_then(|prev| links.iter().position(|link| link.route == prev)));

    for (idx, link) in links.iter_mut().enumerate() {
        link.active = Some(idx) == matched;
    }
}

/// Sidebar navigation for the current path
#[utoipa::path(
    get,
    path = "/navigation",
    params(
        ("pathname" = String, Query, description = "Current page path"),
        ("user_id" = Option<String>, Query, description = "Signed-in user, expands the profile link"),
        ("previous" = Option<String>, Query, description = "Previously active route")
    ),
    responses(
        (status = 200, description = "Sidebar links", body = NavigationResponse)
    ),
    tag = "navigation"
)]
pub async fn navigation(ApiQuery(query): ApiQuery<NavigationQuery>) -> Json<NavigationResponse> {
    let mut links = sidebar_links(query.user_id.as_deref());
    mark_active(&mut links, &query.pathname, query.previous.as_deref());
    Json(NavigationResponse { links })
}
