pub mod image_store;
pub mod object_bucket;
pub mod token_blacklist;
pub mod user_repository;
