use std::sync::Arc;

use crate::infrastructure::{AuthProvider, AuthProviderError};

/// ResetPasswordError はパスワードリセットに関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum ResetPasswordError {
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("reset rejected: {0}")]
    Rejected(String),
}

/// ResetPasswordUseCase はパスワードリセットメール送信ユースケース。
pub struct ResetPasswordUseCase {
    provider: Arc<dyn AuthProvider>,
}

impl ResetPasswordUseCase {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    pub async fn execute(&self, email: &str) -> Result<(), ResetPasswordError> {
        self.provider
            .reset_password(email)
            .await
            .map_err(|e| match e {
                AuthProviderError::Transport(msg) => ResetPasswordError::ProviderUnavailable(msg),
                other => ResetPasswordError::Rejected(other.to_string()),
            })
    }
}
