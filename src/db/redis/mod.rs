pub mod storage;

pub use storage::create_redis_client;
pub use storage::RedisStorage;
