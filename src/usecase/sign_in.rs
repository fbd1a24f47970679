use std::sync::Arc;

use crate::domain::entity::user::Session;
use crate::infrastructure::{AuthProvider, AuthProviderError};

/// SignInError はサインインに関するエラーを表す。
/// 呼び出し側はエラー種別ごとに異なる HTTP ステータスとメッセージへ写像する。
#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    #[error("email not confirmed: {0}")]
    EmailNotConfirmed(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found")]
    UserNotFound,

    #[error("authentication failed ({code}): {message}")]
    Rejected { code: String, message: String },

    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// SignInUseCase はサインインユースケース。認証プロバイダへ委譲する。
pub struct SignInUseCase {
    provider: Arc<dyn AuthProvider>,
}

impl SignInUseCase {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    pub async fn execute(&self, email: &str, password: &str) -> Result<Session, SignInError> {
        self.provider
            .sign_in(email, password)
            .await
            .map_err(|e| match e {
                AuthProviderError::EmailNotConfirmed(msg) => SignInError::EmailNotConfirmed(msg),
                AuthProviderError::InvalidCredentials(_) => SignInError::InvalidCredentials,
                AuthProviderError::UserNotFound(_) => SignInError::UserNotFound,
                AuthProviderError::Auth { code, message } => {
                    SignInError::Rejected { code, message }
                }
                AuthProviderError::Transport(msg) => SignInError::ProviderUnavailable(msg),
                other => SignInError::Internal(other.to_string()),
            })
    }
}
