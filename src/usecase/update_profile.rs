use std::sync::Arc;

use crate::domain::entity::user::{ProfileUpdate, UserProfile};
use crate::infrastructure::{AuthProvider, AuthProviderError};

/// UpdateProfileError はプロフィール更新に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum UpdateProfileError {
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("failed to update user: {0}")]
    Rejected(String),
}

/// UpdateProfileUseCase はプロフィール更新ユースケース。
/// 更新フィールドをプロバイダのメタデータ形式に変換して委譲する。
pub struct UpdateProfileUseCase {
    provider: Arc<dyn AuthProvider>,
}

impl UpdateProfileUseCase {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    pub async fn execute(
        &self,
        access_token: &str,
        update: ProfileUpdate,
    ) -> Result<UserProfile, UpdateProfileError> {
        let attributes = update.into_provider_attributes();

        let user = self
            .provider
            .update_user(access_token, &attributes)
            .await
            .map_err(|e| match e {
                AuthProviderError::Transport(msg) => UpdateProfileError::ProviderUnavailable(msg),
                other => UpdateProfileError::Rejected(other.to_string()),
            })?;

        Ok(UserProfile::from_auth_user(user))
    }
}
