use std::sync::Arc;

use crate::infrastructure::{AuthProvider, AuthProviderError};

/// DeleteAccountError はアカウント削除に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum DeleteAccountError {
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("failed to delete account: {0}")]
    Rejected(String),
}

/// DeleteAccountUseCase はアカウント削除ユースケース。
/// パスワード確認はリクエストスキーマ側で必須化されている。
pub struct DeleteAccountUseCase {
    provider: Arc<dyn AuthProvider>,
}

impl DeleteAccountUseCase {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    pub async fn execute(&self, access_token: &str) -> Result<(), DeleteAccountError> {
        let deleted = self
            .provider
            .delete_user(access_token)
            .await
            .map_err(|e| match e {
                AuthProviderError::Transport(msg) => DeleteAccountError::ProviderUnavailable(msg),
                other => DeleteAccountError::Rejected(other.to_string()),
            })?;

        if deleted {
            Ok(())
        } else {
            Err(DeleteAccountError::Rejected(
                "provider did not accept the deletion".to_string(),
            ))
        }
    }
}
