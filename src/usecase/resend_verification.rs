use std::sync::Arc;

use crate::infrastructure::{AuthProvider, AuthProviderError};

/// ResendVerificationError は確認メール再送に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum ResendVerificationError {
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("resend rejected: {0}")]
    Rejected(String),
}

/// ResendVerificationUseCase は確認メール再送ユースケース。
pub struct ResendVerificationUseCase {
    provider: Arc<dyn AuthProvider>,
}

impl ResendVerificationUseCase {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    pub async fn execute(&self, email: &str) -> Result<(), ResendVerificationError> {
        self.provider
            .resend_verification(email)
            .await
            .map_err(|e| match e {
                AuthProviderError::Transport(msg) => {
                    ResendVerificationError::ProviderUnavailable(msg)
                }
                other => ResendVerificationError::Rejected(other.to_string()),
            })
    }
}
