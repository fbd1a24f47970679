use std::sync::Arc;

use crate::infrastructure::{AuthProvider, AuthProviderError};

/// SignOutError はサインアウトに関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum SignOutError {
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// SignOutUseCase はトークン失効ユースケース。
pub struct SignOutUseCase {
    provider: Arc<dyn AuthProvider>,
}

impl SignOutUseCase {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    /// アクセストークンを失効させる。プロバイダが受理した場合 true。
    pub async fn execute(&self, access_token: &str) -> Result<bool, SignOutError> {
        self.provider
            .sign_out(access_token)
            .await
            .map_err(|e| match e {
                AuthProviderError::Transport(msg) => SignOutError::ProviderUnavailable(msg),
                other => SignOutError::Internal(other.to_string()),
            })
    }
}
