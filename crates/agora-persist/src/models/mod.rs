mod community;
mod thread;
mod user;
mod views;

// Export database-agnostic models
pub use community::{Community, NewCommunity};
pub use thread::{likes_label, CreateThreadParams, DeletedThreads, LikeState, NewThread, Thread};
pub use user::{User, UserProfile};
pub use views::{AuthorSummary, CommunitiesPage, CommunitySummary, PostsPage, ThreadView};
