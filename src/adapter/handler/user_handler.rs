use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use validator::Validate;

use super::{validation_error_response, AppState, ErrorResponse};
use crate::adapter::middleware::auth::BearerToken;
use crate::domain::entity::user::{ProfileUpdate, UserProfile};
use crate::usecase::delete_account::DeleteAccountError;
use crate::usecase::get_profile::GetProfileError;
use crate::usecase::update_profile::UpdateProfileError;

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "User profile", body = UserProfile),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Failed to fetch user profile", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
) -> impl IntoResponse {
    match state.get_profile_uc.execute(&token.0).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(GetProfileError::ProviderUnavailable(msg)) => {
            tracing::error!(error = %msg, "profile fetch failed: provider unavailable");
            let err = ErrorResponse::new(
                "FIN_AUTH_PROVIDER_UNAVAILABLE",
                "Identity provider is unavailable",
            );
            (StatusCode::BAD_GATEWAY, Json(err)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "profile fetch failed");
            let err =
                ErrorResponse::new("FIN_USER_PROFILE_FETCH_FAILED", "Failed to fetch user profile");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(err)).into_response()
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Update rejected", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Json(req): Json<ProfileUpdate>,
) -> impl IntoResponse {
    match state.update_profile_uc.execute(&token.0, req).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(UpdateProfileError::ProviderUnavailable(msg)) => {
            tracing::error!(error = %msg, "profile update failed: provider unavailable");
            let err = ErrorResponse::new(
                "FIN_AUTH_PROVIDER_UNAVAILABLE",
                "Identity provider is unavailable",
            );
            (StatusCode::BAD_GATEWAY, Json(err)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "profile update rejected");
            let err = ErrorResponse::new("FIN_USER_UPDATE_FAILED", "Failed to update user");
            (StatusCode::BAD_REQUEST, Json(err)).into_response()
        }
    }
}

/// DELETE /api/v1/users/me のリクエストボディ。パスワード確認を必須とする。
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct DeleteAccountRequest {
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/me",
    request_body = DeleteAccountRequest,
    responses(
        (status = 200, description = "Account deleted"),
        (status = 400, description = "Deletion rejected", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Json(req): Json<DeleteAccountRequest>,
) -> impl IntoResponse {
    if let Err(errors) = req.validate() {
        return validation_error_response(&errors);
    }

    if let Some(reason) = &req.reason {
        tracing::info!(reason = %reason, "account deletion requested");
    }

    match state.delete_account_uc.execute(&token.0).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Account successfully deleted" })),
        )
            .into_response(),
        Err(DeleteAccountError::ProviderUnavailable(msg)) => {
            tracing::error!(error = %msg, "account deletion failed: provider unavailable");
            let err = ErrorResponse::new(
                "FIN_AUTH_PROVIDER_UNAVAILABLE",
                "Identity provider is unavailable",
            );
            (StatusCode::BAD_GATEWAY, Json(err)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "account deletion rejected");
            let err = ErrorResponse::new("FIN_USER_DELETE_FAILED", "Failed to delete account");
            (StatusCode::BAD_REQUEST, Json(err)).into_response()
        }
    }
}
