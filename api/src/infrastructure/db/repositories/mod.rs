pub mod token_blacklist_sqlx;
pub mod user_repository_sqlx;
