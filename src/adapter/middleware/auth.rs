use axum::{
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapter::handler::AppState;
use crate::infrastructure::VerifyError;

/// BearerToken は検証済みリクエストの生トークンを表すエクステンション。
/// プロバイダ委譲呼び出し（get_user / logout 等）がトークンを必要とする。
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Authorization ヘッダーから Bearer トークンを取り出すヘルパー。
/// 成功した場合はトークン文字列を返す。ヘッダーがない・形式が違う場合は None を返す。
pub fn extract_bearer_token<B>(req: &Request<B>) -> Option<String> {
    let auth_header = req.headers().get(axum::http::header::AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// auth_middleware は Bearer トークンを検証して、Request extension に
/// Identity と BearerToken を格納する axum ミドルウェア。
///
/// すべての検証失敗は 401 に収束する。分類済みの失敗理由はログ専用で、
/// レスポンスには検証内部を漏らさない汎用メッセージのみを返す。
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match extract_bearer_token(&req) {
        Some(t) => t,
        None => {
            return unauthorized(
                "FIN_AUTH_MISSING_TOKEN",
                "Authorization header with Bearer token is required",
            );
        }
    };

    match state.verifier.verify(&token).await {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            req.extensions_mut().insert(BearerToken(token));
            next.run(req).await
        }
        Err(e @ VerifyError::KeyFetchFailure(_)) => {
            // 鍵発見エンドポイント障害はクレーム不正と区別して高レベルで記録する
            tracing::error!(error = %e, "token verification failed: key set unavailable");
            unauthorized("FIN_AUTH_TOKEN_INVALID", "Token validation failed")
        }
        Err(VerifyError::TokenExpired) => {
            tracing::debug!("token verification failed: expired");
            unauthorized("FIN_AUTH_TOKEN_EXPIRED", "Token has expired, please sign in again")
        }
        Err(e) => {
            tracing::debug!(error = %e, "token verification failed");
            unauthorized("FIN_AUTH_TOKEN_INVALID", "Token validation failed")
        }
    }
}

fn unauthorized(code: &str, message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": {
                "code": code,
                "message": message
            }
        })),
    )
        .into_response()
}
