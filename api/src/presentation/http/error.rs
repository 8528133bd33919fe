use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::services::uploads::temp_file_gate::ValidationError;
use crate::application::use_cases::profile::change_password::ChangePasswordError;
use crate::application::use_cases::profile::update_profile::ProfileUpdateError;
use crate::application::use_cases::profile::upload_profile_image::UploadProfileImageError;

/// `{ success, data?, message? }` envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                success: false,
                message: self.message,
            }),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!(error = ?err, "unhandled_error");
        ApiError::internal("Internal server error")
    }
}

impl From<UploadProfileImageError> for ApiError {
    fn from(err: UploadProfileImageError) -> Self {
        match &err {
            UploadProfileImageError::Rejected(ValidationError::Unreadable(_)) => {
                tracing::error!(error = ?err, "upload_profile_image_unreadable");
                ApiError::internal(err.to_string())
            }
            UploadProfileImageError::Rejected(_) => ApiError::bad_request(err.to_string()),
            UploadProfileImageError::RecordNotFound => ApiError::not_found(err.to_string()),
            UploadProfileImageError::StorageFailed(_)
            | UploadProfileImageError::PersistenceFailed(_) => {
                tracing::error!(error = ?err, "upload_profile_image_failed");
                ApiError::internal(err.to_string())
            }
        }
    }
}

impl From<ProfileUpdateError> for ApiError {
    fn from(err: ProfileUpdateError) -> Self {
        match err {
            ProfileUpdateError::EmptyPatch | ProfileUpdateError::MissingUserName => {
                ApiError::bad_request(err.to_string())
            }
            ProfileUpdateError::NotFound => ApiError::not_found(err.to_string()),
            ProfileUpdateError::Repository(source) => source.into(),
        }
    }
}

impl From<ChangePasswordError> for ApiError {
    fn from(err: ChangePasswordError) -> Self {
        match &err {
            ChangePasswordError::MissingFields | ChangePasswordError::IncorrectPassword => {
                ApiError::bad_request(err.to_string())
            }
            ChangePasswordError::NotFound => ApiError::not_found(err.to_string()),
            ChangePasswordError::UpdateFailed | ChangePasswordError::Internal(_) => {
                tracing::error!(error = ?err, "update_password_failed");
                ApiError::internal(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::image_store::StorageError;
    use crate::domain::users::profile_image::ImageBackend;

    fn unavailable(backend: ImageBackend) -> StorageError {
        StorageError::Unavailable {
            backend,
            reason: "down".into(),
        }
    }

    #[test]
    fn upload_failures_map_to_status_codes() {
        let rejected: ApiError = UploadProfileImageError::Rejected(ValidationError::MissingFile).into();
        assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
        assert_eq!(rejected.message, "No image file uploaded");

        let exhausted: ApiError = UploadProfileImageError::StorageFailed(StorageError::Exhausted {
            remote: Box::new(unavailable(ImageBackend::Remote)),
            local: Box::new(unavailable(ImageBackend::Local)),
        })
        .into();
        assert_eq!(exhausted.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(exhausted.message, "Failed to upload file to any storage system");

        let missing: ApiError = UploadProfileImageError::RecordNotFound.into();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn unexpected_errors_hide_their_details() {
        let err: ApiError = anyhow::anyhow!("password authentication failed for user \"app\"").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
    }

    #[test]
    fn envelope_omits_absent_parts() {
        let body = serde_json::to_value(ApiResponse::message("done")).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "message": "done" }));
    }
}
