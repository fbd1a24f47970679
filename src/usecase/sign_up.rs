use std::sync::Arc;

use crate::domain::entity::user::SignUpResult;
use crate::infrastructure::{AuthProvider, AuthProviderError};

/// SignUpError はサインアップに関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum SignUpError {
    #[error("signup rejected ({code}): {message}")]
    Rejected { code: String, message: String },

    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// SignUpUseCase は新規ユーザー登録ユースケース。認証プロバイダへ委譲する。
pub struct SignUpUseCase {
    provider: Arc<dyn AuthProvider>,
}

impl SignUpUseCase {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    pub async fn execute(&self, email: &str, password: &str) -> Result<SignUpResult, SignUpError> {
        self.provider
            .sign_up(email, password)
            .await
            .map_err(|e| match e {
                AuthProviderError::Signup { code, message } => {
                    SignUpError::Rejected { code, message }
                }
                AuthProviderError::Transport(msg) => SignUpError::ProviderUnavailable(msg),
                other => SignUpError::Internal(other.to_string()),
            })
    }
}
