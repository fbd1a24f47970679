pub mod database;
pub mod jwks;
pub mod supabase_client;
pub mod telemetry;
pub mod token_verifier;

pub use token_verifier::{JwtTokenVerifier, VerifyError};

use async_trait::async_trait;

use crate::domain::entity::identity::Identity;
use crate::domain::entity::user::{AuthUser, Session, SignUpResult};

/// TokenVerifier は Bearer トークン検証のためのトレイト。
/// 宣言アルゴリズムの許可リスト判定・署名検証・audience 検証を行い、
/// 正規化済みの Identity を返す。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError>;
}

/// AuthProviderError は認証プロバイダ委譲呼び出しのエラーを表す。
/// サインイン失敗はプロバイダの msg / code を分類して返す。
#[derive(Debug, thiserror::Error)]
pub enum AuthProviderError {
    #[error("signup failed ({code}): {message}")]
    Signup { code: String, message: String },

    #[error("email not confirmed: {0}")]
    EmailNotConfirmed(String),

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("authentication failed ({code}): {message}")]
    Auth { code: String, message: String },

    #[error("identity provider request failed: {0}")]
    Transport(String),

    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for AuthProviderError {
    fn from(e: reqwest::Error) -> Self {
        AuthProviderError::Transport(e.to_string())
    }
}

/// AuthProvider は外部認証プロバイダ (GoTrue) への委譲を抽象化するトレイト。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// メールアドレスとパスワードで新規ユーザーを登録する。
    async fn sign_up(&self, email: &str, password: &str)
        -> Result<SignUpResult, AuthProviderError>;

    /// メールアドレスとパスワードでサインインし、セッショントークンを取得する。
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthProviderError>;

    /// トークンを失効させる。プロバイダが 204 を返した場合に true。
    async fn sign_out(&self, access_token: &str) -> Result<bool, AuthProviderError>;

    /// パスワードリセットメールを送信する。
    async fn reset_password(&self, email: &str) -> Result<(), AuthProviderError>;

    /// 確認リンクのトークンでメールアドレスを検証する。
    async fn verify_email(&self, token: &str) -> Result<serde_json::Value, AuthProviderError>;

    /// 確認メールを再送する。
    async fn resend_verification(&self, email: &str) -> Result<(), AuthProviderError>;

    /// アクセストークンに紐づくユーザーレコードを取得する。
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthProviderError>;

    /// ユーザーメタデータを更新する。
    async fn update_user(
        &self,
        access_token: &str,
        attributes: &serde_json::Value,
    ) -> Result<AuthUser, AuthProviderError>;

    /// ユーザーアカウントを削除する。プロバイダが 200 を返した場合に true。
    async fn delete_user(&self, access_token: &str) -> Result<bool, AuthProviderError>;
}
