pub mod confirm_token;

pub use confirm_token::RedisTokenCache;
