pub mod auth;
pub mod error;
pub mod health;
pub mod profile;

use axum::Router;
use tower_http::services::ServeDir;

use crate::bootstrap::app_context::AppContext;
use crate::infrastructure::storage::PUBLIC_UPLOADS_PATH;

/// Authenticated API plus the static mount that serves locally stored images.
pub fn api_router(ctx: AppContext) -> Router {
    let uploads = ServeDir::new(&ctx.cfg.storage_root);
    Router::new()
        .nest("/api/auth", auth::routes(ctx.clone()))
        .nest("/api", profile::routes(ctx))
        .nest_service(PUBLIC_UPLOADS_PATH, uploads)
}
