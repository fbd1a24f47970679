use std::sync::Arc;

use crate::domain::entity::user::UserProfile;
use crate::infrastructure::{AuthProvider, AuthProviderError};

/// GetProfileError はプロフィール取得に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum GetProfileError {
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("failed to fetch user profile: {0}")]
    Internal(String),
}

/// GetProfileUseCase は認証済みユーザーのプロフィール取得ユースケース。
/// プロバイダのユーザーレコードをこの API のプロフィール形に組み立てる。
pub struct GetProfileUseCase {
    provider: Arc<dyn AuthProvider>,
}

impl GetProfileUseCase {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    pub async fn execute(&self, access_token: &str) -> Result<UserProfile, GetProfileError> {
        let user = self
            .provider
            .get_user(access_token)
            .await
            .map_err(|e| match e {
                AuthProviderError::Transport(msg) => GetProfileError::ProviderUnavailable(msg),
                other => GetProfileError::Internal(other.to_string()),
            })?;

        Ok(UserProfile::from_auth_user(user))
    }
}
