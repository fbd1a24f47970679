use std::sync::Arc;

use crate::infrastructure::{AuthProvider, AuthProviderError};

/// VerifyEmailError はメール検証に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum VerifyEmailError {
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("verification rejected: {0}")]
    Rejected(String),
}

/// VerifyEmailUseCase は確認リンクトークンによるメール検証ユースケース。
pub struct VerifyEmailUseCase {
    provider: Arc<dyn AuthProvider>,
}

impl VerifyEmailUseCase {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    pub async fn execute(&self, token: &str) -> Result<serde_json::Value, VerifyEmailError> {
        self.provider.verify_email(token).await.map_err(|e| match e {
            AuthProviderError::Transport(msg) => VerifyEmailError::ProviderUnavailable(msg),
            other => VerifyEmailError::Rejected(other.to_string()),
        })
    }
}
