pub mod models;
pub mod dbs;
pub mod forum;
pub mod error;
pub mod builder;
pub mod trait_client;

pub use models::{
    likes_label, AuthorSummary, CommunitiesPage, Community, CommunitySummary, CreateThreadParams,
    DeletedThreads, LikeState, NewCommunity, NewThread, PostsPage, Thread, ThreadView, User,
    UserProfile,
};
pub use dbs::InMemoryPersistenceClient;
#[cfg(feature = "mongodb")]
pub use dbs::MongoPersistenceClient;
pub use forum::{Forum, Page, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use trait_client::PersistenceClient;
pub use error::{PersistError, Result};
pub use builder::ForumBuilder;
