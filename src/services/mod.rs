//! Business logic services

pub mod authors;
pub mod cache;
pub mod catalog;
pub mod categories;
pub mod circulation;
pub mod lock;
pub mod redis;
pub mod users;


pub use authors::AuthorsService;
pub use cache::Cache;
pub use catalog::CatalogService;
pub use categories::CategoriesService;
pub use circulation::CirculationService;
pub use redis::RedisService;
pub use users::UsersService;
