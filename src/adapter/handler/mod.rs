pub mod auth_handler;
pub mod forecast_handler;
pub mod health_handler;
pub mod user_handler;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::adapter::middleware::auth::auth_middleware;
use crate::domain::repository::ForecastRepository;
use crate::infrastructure::{AuthProvider, TokenVerifier};
use crate::usecase::{
    DeleteAccountUseCase, GetProfileUseCase, LatestForecastsUseCase, ResendVerificationUseCase,
    ResetPasswordUseCase, SearchForecastsUseCase, SignInUseCase, SignOutUseCase, SignUpUseCase,
    UpdateProfileUseCase, UpsertForecastUseCase, VerifyEmailUseCase,
};

/// AppState はアプリケーション全体の共有状態を表す。
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn TokenVerifier>,
    pub sign_up_uc: Arc<SignUpUseCase>,
    pub sign_in_uc: Arc<SignInUseCase>,
    pub sign_out_uc: Arc<SignOutUseCase>,
    pub reset_password_uc: Arc<ResetPasswordUseCase>,
    pub verify_email_uc: Arc<VerifyEmailUseCase>,
    pub resend_verification_uc: Arc<ResendVerificationUseCase>,
    pub get_profile_uc: Arc<GetProfileUseCase>,
    pub update_profile_uc: Arc<UpdateProfileUseCase>,
    pub delete_account_uc: Arc<DeleteAccountUseCase>,
    pub upsert_forecast_uc: Arc<UpsertForecastUseCase>,
    pub latest_forecasts_uc: Arc<LatestForecastsUseCase>,
    pub search_forecasts_uc: Arc<SearchForecastsUseCase>,
    pub db_pool: Option<sqlx::PgPool>,
    pub provider_health_url: Option<String>,
}

impl AppState {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        provider: Arc<dyn AuthProvider>,
        forecast_repo: Arc<dyn ForecastRepository>,
        db_pool: Option<sqlx::PgPool>,
        provider_health_url: Option<String>,
    ) -> Self {
        Self {
            verifier,
            sign_up_uc: Arc::new(SignUpUseCase::new(provider.clone())),
            sign_in_uc: Arc::new(SignInUseCase::new(provider.clone())),
            sign_out_uc: Arc::new(SignOutUseCase::new(provider.clone())),
            reset_password_uc: Arc::new(ResetPasswordUseCase::new(provider.clone())),
            verify_email_uc: Arc::new(VerifyEmailUseCase::new(provider.clone())),
            resend_verification_uc: Arc::new(ResendVerificationUseCase::new(provider.clone())),
            get_profile_uc: Arc::new(GetProfileUseCase::new(provider.clone())),
            update_profile_uc: Arc::new(UpdateProfileUseCase::new(provider.clone())),
            delete_account_uc: Arc::new(DeleteAccountUseCase::new(provider)),
            upsert_forecast_uc: Arc::new(UpsertForecastUseCase::new(forecast_repo.clone())),
            latest_forecasts_uc: Arc::new(LatestForecastsUseCase::new(forecast_repo.clone())),
            search_forecasts_uc: Arc::new(SearchForecastsUseCase::new(forecast_repo)),
            db_pool,
            provider_health_url,
        }
    }
}

/// Build the REST API router.
pub fn router(state: AppState) -> Router {
    // Protected routes share auth_middleware for Bearer token validation
    let protected = Router::new()
        .route("/api/v1/auth/me", get(auth_handler::me))
        .route("/api/v1/auth/signout", post(auth_handler::sign_out))
        .route(
            "/api/v1/users/me",
            get(user_handler::get_profile)
                .put(user_handler::update_profile)
                .delete(user_handler::delete_account),
        )
        .route(
            "/api/v1/forecasts/upsert",
            post(forecast_handler::upsert),
        )
        .route(
            "/api/v1/forecasts/bulk_upsert",
            post(forecast_handler::bulk_upsert),
        )
        .route("/api/v1/forecasts/latest", get(forecast_handler::latest))
        .route("/api/v1/forecasts", get(forecast_handler::search))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Public endpoints (no auth required)
    let public = Router::new()
        .route("/healthz", get(health_handler::healthz))
        .route("/readyz", get(health_handler::readyz))
        .route("/api/v1/auth/signup", post(auth_handler::sign_up))
        .route("/api/v1/auth/signin", post(auth_handler::sign_in))
        .route(
            "/api/v1/auth/reset-password",
            post(auth_handler::reset_password),
        )
        .route(
            "/api/v1/auth/verify-email",
            post(auth_handler::verify_email),
        )
        .route(
            "/api/v1/auth/resend-verification",
            post(auth_handler::resend_verification),
        );

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// ErrorResponse は統一エラーレスポンス。
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub request_id: String,
    pub details: Vec<String>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            error: ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
                request_id: uuid::Uuid::new_v4().to_string(),
                details: vec![],
            },
        }
    }

    pub fn with_details(code: &str, message: &str, details: Vec<String>) -> Self {
        let mut resp = Self::new(code, message);
        resp.error.details = details;
        resp
    }
}

/// validator のエラーを 400 レスポンスへ変換する。
pub fn validation_error_response(errors: &validator::ValidationErrors) -> Response {
    let details = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter()
                .map(move |e| format!("{}: {}", field, e.code))
        })
        .collect();

    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::with_details(
            "FIN_VALIDATION_ERROR",
            "Request validation failed",
            details,
        )),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let resp = ErrorResponse::new("FIN_AUTH_TOKEN_INVALID", "Token validation failed");
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["error"]["code"], "FIN_AUTH_TOKEN_INVALID");
        assert_eq!(json["error"]["message"], "Token validation failed");
        assert!(json["error"]["request_id"].as_str().is_some());
        assert!(json["error"]["details"].as_array().unwrap().is_empty());
    }
}
