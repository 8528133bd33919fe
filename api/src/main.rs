use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{DefaultBodyLimit, MatchedPath};
use dotenvy::dotenv;
use http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use profile_api::application::ports::token_blacklist::TokenBlacklist;
use profile_api::application::ports::user_repository::UserRepository;
use profile_api::application::services::uploads::temp_file_gate::TempFileGate;
use profile_api::bootstrap::app_context::{AppContext, AppServices};
use profile_api::bootstrap::config::Config;
use profile_api::infrastructure::db::repositories::token_blacklist_sqlx::SqlxTokenBlacklist;
use profile_api::infrastructure::db::repositories::user_repository_sqlx::SqlxUserRepository;
use profile_api::presentation::http::health::HealthState;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            profile_api::presentation::http::auth::register,
            profile_api::presentation::http::auth::login,
            profile_api::presentation::http::auth::logout,
            profile_api::presentation::http::profile::get_profile,
            profile_api::presentation::http::profile::update_profile,
            profile_api::presentation::http::profile::update_user_info,
            profile_api::presentation::http::profile::upload_profile_image,
            profile_api::presentation::http::profile::update_password,
            profile_api::presentation::http::health::health,
        ),
        components(schemas(
            profile_api::presentation::http::auth::RegisterRequest,
            profile_api::presentation::http::auth::UserResponse,
            profile_api::presentation::http::auth::LoginRequest,
            profile_api::presentation::http::auth::LoginResponse,
            profile_api::presentation::http::error::ErrorBody,
            profile_api::presentation::http::profile::ProfileBody,
            profile_api::presentation::http::profile::ProfileResponse,
            profile_api::presentation::http::profile::UpdateProfileRequest,
            profile_api::presentation::http::profile::UpdateProfileResponse,
            profile_api::presentation::http::profile::UpdateUserInfoRequest,
            profile_api::presentation::http::profile::UserInfoResponse,
            profile_api::presentation::http::profile::ProfileImageResponse,
            profile_api::presentation::http::profile::UpdatePasswordRequest,
            profile_api::presentation::http::profile::UploadImageForm,
            profile_api::presentation::http::health::HealthResp,
            profile_api::presentation::http::health::RemoteStorageHealth,
        )),
        tags(
            (name = "Auth", description = "Authentication"),
            (name = "Profile", description = "Profile, profile image and password management"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "profile_api=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(?cfg, "Starting profile API");

    // Database
    let pool = profile_api::infrastructure::db::connect_pool(&cfg).await?;
    profile_api::infrastructure::db::migrate(&pool).await?;

    let user_repo: Arc<dyn UserRepository> = Arc::new(SqlxUserRepository::new(pool.clone()));
    let token_blacklist: Arc<dyn TokenBlacklist> =
        Arc::new(SqlxTokenBlacklist::new(pool.clone()));

    // Ensure the served root and the spool dir exist before the first upload
    for dir in [&cfg.storage_root, &cfg.upload_tmp_dir] {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            warn!(error = ?e, dir = %dir, "Failed to create upload dir");
        }
    }

    let image_storage =
        Arc::new(profile_api::infrastructure::storage::build_storage_fallback(&cfg).await);
    let services = AppServices::new(
        user_repo,
        token_blacklist,
        image_storage.clone(),
        Arc::new(TempFileGate::new()),
    );
    let ctx = AppContext::new(cfg.clone(), services);

    let methods = [
        http::Method::GET,
        http::Method::POST,
        http::Method::PUT,
        http::Method::DELETE,
        http::Method::OPTIONS,
    ];
    let headers = [http::header::CONTENT_TYPE, http::header::AUTHORIZATION];
    let cors = match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(v)) => CorsLayer::new()
            .allow_origin(v)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true),
        // Production requires FRONTEND_URL; an unparsable value denies every origin
        _ if cfg.is_production => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(HeaderValue::from_static("http://invalid")))
            .allow_methods(methods)
            .allow_headers(headers),
        _ => CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true),
    };

    let app = Router::new()
        .nest(
            "/api",
            profile_api::presentation::http::health::routes(HealthState {
                pool: pool.clone(),
                storage: image_storage,
            }),
        )
        .merge(profile_api::presentation::http::api_router(ctx))
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        // Multipart overhead on top of the largest accepted image
        .layer(DefaultBodyLimit::max(cfg.upload_max_bytes + 64 * 1024))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = ?e, "Failed to listen for shutdown signal");
    }
}
