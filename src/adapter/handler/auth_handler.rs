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
use crate::domain::entity::identity::Identity;
use crate::usecase::sign_in::SignInError;
use crate::usecase::sign_up::SignUpError;

/// POST /api/v1/auth/signup のリクエストボディ。
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct SignUpRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 100))]
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "User registered"),
        (status = 400, description = "Signup rejected", body = ErrorResponse),
        (status = 502, description = "Identity provider unavailable", body = ErrorResponse),
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> impl IntoResponse {
    if let Err(errors) = req.validate() {
        return validation_error_response(&errors);
    }

    match state.sign_up_uc.execute(&req.email, &req.password).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(SignUpError::Rejected { code, message }) => {
            let err = ErrorResponse::new(&code, &message);
            (StatusCode::BAD_REQUEST, Json(err)).into_response()
        }
        Err(SignUpError::ProviderUnavailable(_)) => {
            let err = ErrorResponse::new(
                "FIN_AUTH_PROVIDER_UNAVAILABLE",
                "Identity provider is unavailable",
            );
            (StatusCode::BAD_GATEWAY, Json(err)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "signup failed");
            let err = ErrorResponse::new("FIN_AUTH_SIGNUP_FAILED", "Signup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(err)).into_response()
        }
    }
}

/// POST /api/v1/auth/signin のリクエストボディ。
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct SignInRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/signin",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in"),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 403, description = "Email not confirmed", body = ErrorResponse),
        (status = 404, description = "No account for this email", body = ErrorResponse),
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> impl IntoResponse {
    if let Err(errors) = req.validate() {
        return validation_error_response(&errors);
    }

    match state.sign_in_uc.execute(&req.email, &req.password).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(SignInError::EmailNotConfirmed(_)) => {
            let err = ErrorResponse::new(
                "FIN_AUTH_EMAIL_NOT_CONFIRMED",
                "Please verify your email first. Check your inbox for the verification link.",
            );
            (StatusCode::FORBIDDEN, Json(err)).into_response()
        }
        Err(SignInError::InvalidCredentials) => {
            let err =
                ErrorResponse::new("FIN_AUTH_INVALID_CREDENTIALS", "Invalid email or password");
            (StatusCode::UNAUTHORIZED, Json(err)).into_response()
        }
        Err(SignInError::UserNotFound) => {
            let err = ErrorResponse::new(
                "FIN_AUTH_USER_NOT_FOUND",
                "No account found with this email address",
            );
            (StatusCode::NOT_FOUND, Json(err)).into_response()
        }
        Err(SignInError::Rejected { code, message }) => {
            let err = ErrorResponse::new(&code, &message);
            (StatusCode::BAD_REQUEST, Json(err)).into_response()
        }
        Err(SignInError::ProviderUnavailable(_)) => {
            let err = ErrorResponse::new(
                "FIN_AUTH_PROVIDER_UNAVAILABLE",
                "Identity provider is unavailable",
            );
            (StatusCode::BAD_GATEWAY, Json(err)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "signin failed");
            let err = ErrorResponse::new("FIN_AUTH_SIGNIN_FAILED", "Sign in failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(err)).into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/signout",
    responses(
        (status = 200, description = "Signed out"),
        (status = 400, description = "Signout not accepted", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn sign_out(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
) -> impl IntoResponse {
    match state.sign_out_uc.execute(&token.0).await {
        Ok(true) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Signed out successfully" })),
        )
            .into_response(),
        Ok(false) => {
            let err = ErrorResponse::new("FIN_AUTH_SIGNOUT_FAILED", "Signout was not accepted");
            (StatusCode::BAD_REQUEST, Json(err)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "signout failed");
            let err = ErrorResponse::new(
                "FIN_AUTH_PROVIDER_UNAVAILABLE",
                "Identity provider is unavailable",
            );
            (StatusCode::BAD_GATEWAY, Json(err)).into_response()
        }
    }
}

/// POST /api/v1/auth/reset-password のリクエストボディ。
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(email)]
    pub email: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Reset email sent"),
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> impl IntoResponse {
    if let Err(errors) = req.validate() {
        return validation_error_response(&errors);
    }

    match state.reset_password_uc.execute(&req.email).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Password reset email sent" })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "password reset failed");
            let err = ErrorResponse::new("FIN_AUTH_RESET_FAILED", "Password reset failed");
            (StatusCode::BAD_REQUEST, Json(err)).into_response()
        }
    }
}

/// POST /api/v1/auth/verify-email のリクエストボディ。
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct VerifyEmailRequest {
    #[validate(length(min = 1))]
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/verify-email",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Email verified"),
        (status = 400, description = "Verification rejected", body = ErrorResponse),
    )
)]
pub async fn verify_email(
    State(state): State<AppState>,
    Json(req): Json<VerifyEmailRequest>,
) -> impl IntoResponse {
    if let Err(errors) = req.validate() {
        return validation_error_response(&errors);
    }

    match state.verify_email_uc.execute(&req.token).await {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => {
            tracing::debug!(error = %e, "email verification failed");
            let err =
                ErrorResponse::new("FIN_AUTH_VERIFY_FAILED", "Email verification failed");
            (StatusCode::BAD_REQUEST, Json(err)).into_response()
        }
    }
}

/// POST /api/v1/auth/resend-verification のリクエストボディ。
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct ResendVerificationRequest {
    #[validate(email)]
    pub email: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/resend-verification",
    request_body = ResendVerificationRequest,
    responses(
        (status = 200, description = "Verification email sent"),
    )
)]
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(req): Json<ResendVerificationRequest>,
) -> impl IntoResponse {
    if let Err(errors) = req.validate() {
        return validation_error_response(&errors);
    }

    match state.resend_verification_uc.execute(&req.email).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Verification email sent" })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "resend verification failed");
            let err = ErrorResponse::new(
                "FIN_AUTH_RESEND_FAILED",
                "Failed to resend verification email",
            );
            (StatusCode::BAD_REQUEST, Json(err)).into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Authenticated identity", body = Identity),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(Extension(identity): Extension<Identity>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": identity.subject_id,
        "role": identity.role
    }))
}
