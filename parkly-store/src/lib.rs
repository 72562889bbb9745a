pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod memory;
pub mod redis_repo;
pub mod slot_repo;
pub mod user_repo;

pub use booking_repo::StoreBookingRepository;
pub use database::DbClient;
pub use memory::{MemorySessionStore, MemoryStore, MemoryUserRepository};
pub use redis_repo::RedisSessionStore;
pub use slot_repo::StoreSlotRepository;
pub use user_repo::StoreUserRepository;
