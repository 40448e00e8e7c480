pub mod community;
pub mod thread;
pub mod user;

pub use community::MongoCommunityRepository;
pub use thread::MongoThreadRepository;
pub use user::MongoUserRepository;
