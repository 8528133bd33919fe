use std::convert::Infallible;
use std::path::Path;

use axum::{
    Json, Router,
    extract::{FromRequestParts, Multipart, State},
    http::{StatusCode, request::Parts},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::services::uploads::temp_file_gate::{IncomingFile, TempUpload};
use crate::application::use_cases::profile::change_password::{
    ChangePassword, ChangePasswordRequest,
};
use crate::application::use_cases::profile::get_profile::GetProfile;
use crate::application::use_cases::profile::update_profile::UpdateProfile;
use crate::application::use_cases::profile::update_user_info::UpdateUserInfo;
use crate::application::use_cases::profile::upload_profile_image::UploadProfileImage;
use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::Config;
use crate::domain::users::user::{ProfileDetails, ProfilePatch, UserRecord};
use crate::presentation::http::auth::AuthUser;
use crate::presentation::http::error::{ApiError, ApiResponse, ErrorBody};

/// Multipart field names accepted for the image part.
const IMAGE_FIELD_NAMES: [&str; 2] = ["image", "file"];

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/profile/info", put(update_user_info))
        .route("/profile/image", post(upload_profile_image))
        .route("/password", put(update_password))
        .with_state(ctx)
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBody {
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub goal: Option<String>,
    pub activity_level: Option<String>,
    pub bmi: Option<f64>,
    #[schema(value_type = Vec<Object>)]
    pub activities: Vec<serde_json::Value>,
}

impl From<ProfileDetails> for ProfileBody {
    fn from(p: ProfileDetails) -> Self {
        Self {
            gender: p.gender,
            height: p.height,
            weight: p.weight,
            age: p.age,
            goal: p.goal,
            activity_level: p.activity_level,
            bmi: p.bmi,
            activities: p.activities,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub profile: ProfileBody,
    pub username: String,
    pub email: String,
    pub profile_image: Option<String>,
    #[schema(value_type = Vec<Object>)]
    pub activities: Vec<serde_json::Value>,
}

impl From<UserRecord> for ProfileResponse {
    fn from(user: UserRecord) -> Self {
        let activities = user.profile.activities.clone();
        Self {
            profile: user.profile.into(),
            username: user.user_name,
            email: user.email,
            profile_image: user.profile_image,
            activities,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub goal: Option<String>,
    pub activity_level: Option<String>,
    pub bmi: Option<f64>,
    pub user_name: Option<String>,
}

impl From<UpdateProfileRequest> for ProfilePatch {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            gender: req.gender,
            height: req.height,
            weight: req.weight,
            age: req.age,
            goal: req.goal,
            activity_level: req.activity_level,
            bmi: req.bmi,
            user_name: req.user_name,
            profile_image: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileResponse {
    pub profile: ProfileBody,
    pub user_name: String,
    pub email: String,
    pub profile_image: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInfoRequest {
    pub user_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    pub user_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileImageResponse {
    pub profile_image: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadImageForm {
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

/// Scheme and host the caller reached us on, used to build URLs for locally stored
/// images. `PUBLIC_BASE_URL` takes precedence inside the local store.
pub struct RequestOrigin(pub String);

#[axum::async_trait]
impl FromRequestParts<AppContext> for RequestOrigin {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        Ok(RequestOrigin(origin_from(parts, &ctx.cfg)))
    }
}

/// `X-Forwarded-*` is client-controlled unless a proxy rewrites it, so it is only read
/// when `TRUST_PROXY_HEADERS` is set.
fn origin_from(parts: &Parts, cfg: &Config) -> String {
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let forwarded = |name: &str| {
        if cfg.trust_proxy_headers {
            header(name)
        } else {
            None
        }
    };
    let scheme = match forwarded("x-forwarded-proto").as_deref() {
        Some("https") => "https",
        _ => "http",
    };
    let host = forwarded("x-forwarded-host")
        .or_else(|| header("host"))
        .or_else(|| parts.uri.authority().map(|a| a.to_string()))
        .filter(|h| is_plausible_host(h))
        .unwrap_or_else(|| format!("localhost:{}", cfg.api_port));
    format!("{scheme}://{host}")
}

fn is_plausible_host(host: &str) -> bool {
    host.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '[' | ']'))
}

#[utoipa::path(get, path = "/api/profile", tag = "Profile", responses(
    (status = 200, body = ProfileResponse),
    (status = 401, body = ErrorBody),
    (status = 404, body = ErrorBody)
))]
pub async fn get_profile(
    State(ctx): State<AppContext>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<ProfileResponse>>, ApiError> {
    let repo = ctx.user_repo();
    let uc = GetProfile {
        repo: repo.as_ref(),
    };
    let user = uc
        .execute(&auth.email)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(ApiResponse::ok(user.into())))
}

#[utoipa::path(put, path = "/api/profile", tag = "Profile", request_body = UpdateProfileRequest, responses(
    (status = 200, body = UpdateProfileResponse),
    (status = 400, body = ErrorBody),
    (status = 404, body = ErrorBody)
))]
pub async fn update_profile(
    State(ctx): State<AppContext>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UpdateProfileResponse>>, ApiError> {
    let repo = ctx.user_repo();
    let uc = UpdateProfile {
        repo: repo.as_ref(),
    };
    let user = uc.execute(&auth.email, req.into()).await?;
    Ok(Json(
        ApiResponse::ok(UpdateProfileResponse {
            profile: user.profile.into(),
            user_name: user.user_name,
            email: user.email,
            profile_image: user.profile_image,
        })
        .with_message("Update profile successfully"),
    ))
}

#[utoipa::path(put, path = "/api/profile/info", tag = "Profile", request_body = UpdateUserInfoRequest, responses(
    (status = 200, body = UserInfoResponse),
    (status = 400, body = ErrorBody),
    (status = 404, body = ErrorBody)
))]
pub async fn update_user_info(
    State(ctx): State<AppContext>,
    auth: AuthUser,
    Json(req): Json<UpdateUserInfoRequest>,
) -> Result<Json<ApiResponse<UserInfoResponse>>, ApiError> {
    let repo = ctx.user_repo();
    let uc = UpdateUserInfo {
        repo: repo.as_ref(),
    };
    let user = uc.execute(&auth.email, req.user_name).await?;
    Ok(Json(ApiResponse::ok(UserInfoResponse {
        user_name: user.user_name,
    })))
}

#[utoipa::path(post, path = "/api/profile/image", tag = "Profile",
    request_body(content = UploadImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = ProfileImageResponse),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
        (status = 413, body = ErrorBody),
        (status = 500, body = ErrorBody)
    ))]
pub async fn upload_profile_image(
    State(ctx): State<AppContext>,
    auth: AuthUser,
    RequestOrigin(origin): RequestOrigin,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ProfileImageResponse>>, ApiError> {
    let incoming = spool_image_field(&ctx.cfg, &mut multipart).await?;
    let repo = ctx.user_repo();
    let gate = ctx.upload_gate();
    let storage = ctx.image_storage();
    let uc = UploadProfileImage {
        repo: repo.as_ref(),
        gate: gate.as_ref(),
        storage: storage.as_ref(),
    };
    let saved = uc.execute(&auth.email, incoming, &origin).await?;
    Ok(Json(
        ApiResponse::ok(ProfileImageResponse {
            profile_image: saved.profile_image,
        })
        .with_message("Profile image uploaded and saved successfully"),
    ))
}

#[utoipa::path(put, path = "/api/password", tag = "Profile", request_body = UpdatePasswordRequest, responses(
    (status = 200, description = "Password changed; the presented token is revoked"),
    (status = 400, body = ErrorBody),
    (status = 404, body = ErrorBody)
))]
pub async fn update_password(
    State(ctx): State<AppContext>,
    auth: AuthUser,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let repo = ctx.user_repo();
    let blacklist = ctx.token_blacklist();
    let uc = ChangePassword {
        repo: repo.as_ref(),
        blacklist: blacklist.as_ref(),
    };
    let dto = ChangePasswordRequest {
        old_password: req.old_password,
        new_password: req.new_password,
    };
    uc.execute(&auth.email, &dto, Some(&auth.token)).await?;
    tracing::info!(user_id = %auth.user_id, "password_changed");
    Ok(Json(ApiResponse::message(
        "Password updated successfully. Please login again.",
    )))
}

/// Streams the first image part to a fresh file under the upload tmp dir. The returned
/// guard owns that file from the moment it exists.
async fn spool_image_field(
    cfg: &Config,
    multipart: &mut Multipart,
) -> Result<Option<IncomingFile>, ApiError> {
    let mut incoming = None;
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("Invalid multipart body"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if incoming.is_some() || !IMAGE_FIELD_NAMES.contains(&name.as_str()) {
            continue;
        }
        let original_name = field.file_name().unwrap_or_default().to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let dir = Path::new(&cfg.upload_tmp_dir);
        tokio::fs::create_dir_all(dir).await.map_err(|err| {
            tracing::error!(error = ?err, dir = %dir.display(), "upload_tmp_dir_unavailable");
            ApiError::internal("Failed to upload profile image")
        })?;
        let temp = TempUpload::new(dir.join(format!("upload-{}", Uuid::new_v4())));
        let mut file = tokio::fs::File::create(temp.path()).await.map_err(|err| {
            tracing::error!(error = ?err, "upload_spool_create_failed");
            ApiError::internal("Failed to upload profile image")
        })?;

        let mut size: u64 = 0;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|_| ApiError::bad_request("Invalid multipart body"))?
        {
            size += chunk.len() as u64;
            if size > cfg.upload_max_bytes as u64 {
                drop(file);
                temp.discard().await;
                return Err(ApiError::new(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "Uploaded file is too large",
                ));
            }
            file.write_all(&chunk).await.map_err(|err| {
                tracing::error!(error = ?err, "upload_spool_write_failed");
                ApiError::internal("Failed to upload profile image")
            })?;
        }
        file.flush().await.map_err(|err| {
            tracing::error!(error = ?err, "upload_spool_write_failed");
            ApiError::internal("Failed to upload profile image")
        })?;

        incoming = Some(IncomingFile {
            mime_type,
            original_name,
            size,
            temp,
        });
    }
    Ok(incoming)
}
