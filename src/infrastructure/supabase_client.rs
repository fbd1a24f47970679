//! Supabase (GoTrue) Auth REST API クライアント。
//!
//! サインアップ・サインイン・トークン失効・パスワードリセット・
//! メール検証・ユーザー CRUD をプロバイダへ委譲する。

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::entity::user::{AuthUser, Session, SignUpResult};
use crate::infrastructure::{AuthProvider, AuthProviderError};

/// プロバイダ呼び出しのタイムアウト。
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// SupabaseConfig は Supabase 接続の設定を表す。
#[derive(Debug, serde::Deserialize)]
pub struct SupabaseConfig {
    pub base_url: String,
    pub anon_key: SecretString,
}

/// SupabaseAuthClient は GoTrue Auth API クライアント。
pub struct SupabaseAuthClient {
    config: SupabaseConfig,
    http_client: reqwest::Client,
}

/// プロバイダのエラーレスポンスボディ。
#[derive(Debug, Default, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl SupabaseAuthClient {
    pub fn new(config: SupabaseConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.base_url, path)
    }

    fn anon_key(&self) -> &str {
        self.config.anon_key.expose_secret()
    }

    /// エラーレスポンスから msg / code を取り出す。ボディが壊れていても失敗しない。
    async fn error_body(resp: reqwest::Response) -> ProviderErrorBody {
        resp.json::<ProviderErrorBody>().await.unwrap_or_default()
    }
}

/// サインイン失敗をプロバイダの msg / code から分類する。
fn classify_sign_in_error(code: Option<String>, msg: Option<String>) -> AuthProviderError {
    let message = msg.unwrap_or_else(|| "Sign in failed".to_string());
    let code = code.unwrap_or_else(|| "unknown".to_string());
    let msg_lower = message.to_lowercase();
    let code_lower = code.to_lowercase();

    if msg_lower.contains("email_not_confirmed") || msg_lower.contains("confirmation") {
        AuthProviderError::EmailNotConfirmed(message)
    } else if msg_lower.contains("invalid") || code_lower.contains("invalid") {
        AuthProviderError::InvalidCredentials(message)
    } else if msg_lower.contains("not_found") || code_lower.contains("not found") {
        AuthProviderError::UserNotFound(message)
    } else {
        AuthProviderError::Auth { code, message }
    }
}

/// サインアップレスポンスを正規化する。
/// プロバイダはユーザーオブジェクト単体か {user, ...tokens} のどちらも返しうる。
fn normalize_sign_up_response(value: serde_json::Value) -> Result<SignUpResult, AuthProviderError> {
    if value.get("user").is_some() {
        return serde_json::from_value(value)
            .map_err(|e| AuthProviderError::InvalidResponse(e.to_string()));
    }

    if value.get("id").is_some() && value.get("email").is_some() {
        let user: AuthUser = serde_json::from_value(value)
            .map_err(|e| AuthProviderError::InvalidResponse(e.to_string()))?;
        return Ok(SignUpResult {
            user,
            access_token: None,
            refresh_token: None,
            expires_in: None,
            token_type: None,
        });
    }

    Err(AuthProviderError::InvalidResponse(
        "unexpected signup response format".to_string(),
    ))
}

#[async_trait]
impl AuthProvider for SupabaseAuthClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignUpResult, AuthProviderError> {
        let resp = self
            .http_client
            .post(self.url("signup"))
            .header("apikey", self.anon_key())
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "gotrue_meta_security": { "captcha_token": null }
            }))
            .send()
            .await?;

        let status = resp.status();
        tracing::debug!(status = %status, "signup response received");

        if !matches!(status.as_u16(), 200 | 201) {
            let body = Self::error_body(resp).await;
            let message = body.msg.unwrap_or_else(|| "Signup failed".to_string());
            let code = body.code.unwrap_or_else(|| "signup_failed".to_string());
            tracing::warn!(code = %code, "signup rejected by provider");
            return Err(AuthProviderError::Signup { code, message });
        }

        let value: serde_json::Value = resp.json().await?;
        normalize_sign_up_response(value)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthProviderError> {
        let resp = self
            .http_client
            .post(self.url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", self.anon_key())
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "gotrue_meta_security": { "captcha_token": null }
            }))
            .send()
            .await?;

        if resp.status() != reqwest::StatusCode::OK {
            let body = Self::error_body(resp).await;
            let err = classify_sign_in_error(body.code, body.msg);
            tracing::debug!(error = %err, "signin rejected by provider");
            return Err(err);
        }

        Ok(resp.json::<Session>().await?)
    }

    async fn sign_out(&self, access_token: &str) -> Result<bool, AuthProviderError> {
        let resp = self
            .http_client
            .post(self.url("logout"))
            .header("apikey", self.anon_key())
            .bearer_auth(access_token)
            .send()
            .await?;

        Ok(resp.status() == reqwest::StatusCode::NO_CONTENT)
    }

    async fn reset_password(&self, email: &str) -> Result<(), AuthProviderError> {
        let resp = self
            .http_client
            .post(self.url("recover"))
            .header("apikey", self.anon_key())
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;

        if !matches!(resp.status().as_u16(), 200 | 204) {
            let body = Self::error_body(resp).await;
            return Err(AuthProviderError::Auth {
                code: body.code.unwrap_or_else(|| "recover_failed".to_string()),
                message: body
                    .msg
                    .unwrap_or_else(|| "Password reset failed".to_string()),
            });
        }
        Ok(())
    }

    async fn verify_email(&self, token: &str) -> Result<serde_json::Value, AuthProviderError> {
        let resp = self
            .http_client
            .get(self.url("verify"))
            .header("apikey", self.anon_key())
            .query(&[("token", token), ("type", "signup")])
            .send()
            .await?;

        if resp.status() != reqwest::StatusCode::OK {
            let body = Self::error_body(resp).await;
            return Err(AuthProviderError::Auth {
                code: body.code.unwrap_or_else(|| "verify_failed".to_string()),
                message: body
                    .msg
                    .unwrap_or_else(|| "Email verification failed".to_string()),
            });
        }

        Ok(resp.json().await?)
    }

    async fn resend_verification(&self, email: &str) -> Result<(), AuthProviderError> {
        let resp = self
            .http_client
            .post(self.url("recover"))
            .header("apikey", self.anon_key())
            .json(&serde_json::json!({
                "email": email,
                "gotrue_meta_security": { "captcha_token": null }
            }))
            .send()
            .await?;

        if !matches!(resp.status().as_u16(), 200 | 204) {
            let body = Self::error_body(resp).await;
            return Err(AuthProviderError::Auth {
                code: body.code.unwrap_or_else(|| "resend_failed".to_string()),
                message: body
                    .msg
                    .unwrap_or_else(|| "Failed to resend verification email".to_string()),
            });
        }
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthProviderError> {
        let resp = self
            .http_client
            .get(self.url("user"))
            .header("apikey", self.anon_key())
            .bearer_auth(access_token)
            .send()
            .await?;

        if resp.status() != reqwest::StatusCode::OK {
            let body = Self::error_body(resp).await;
            return Err(AuthProviderError::Auth {
                code: body.code.unwrap_or_else(|| "get_user_failed".to_string()),
                message: body.msg.unwrap_or_else(|| "Get user failed".to_string()),
            });
        }

        Ok(resp.json::<AuthUser>().await?)
    }

    async fn update_user(
        &self,
        access_token: &str,
        attributes: &serde_json::Value,
    ) -> Result<AuthUser, AuthProviderError> {
        let resp = self
            .http_client
            .put(self.url("user"))
            .header("apikey", self.anon_key())
            .bearer_auth(access_token)
            .json(attributes)
            .send()
            .await?;

        if resp.status() != reqwest::StatusCode::OK {
            let body = Self::error_body(resp).await;
            return Err(AuthProviderError::Auth {
                code: body.code.unwrap_or_else(|| "update_user_failed".to_string()),
                message: body.msg.unwrap_or_else(|| "Update user failed".to_string()),
            });
        }

        Ok(resp.json::<AuthUser>().await?)
    }

    async fn delete_user(&self, access_token: &str) -> Result<bool, AuthProviderError> {
        let resp = self
            .http_client
            .delete(self.url("admin/users"))
            .header("apikey", self.anon_key())
            .bearer_auth(access_token)
            .send()
            .await?;

        Ok(resp.status() == reqwest::StatusCode::OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_email_not_confirmed() {
        let err = classify_sign_in_error(
            Some("400".to_string()),
            Some("Email not confirmed, check your confirmation mail".to_string()),
        );
        assert!(matches!(err, AuthProviderError::EmailNotConfirmed(_)));
    }

    #[test]
    fn test_classify_invalid_credentials() {
        let err = classify_sign_in_error(
            Some("invalid_grant".to_string()),
            Some("Invalid login credentials".to_string()),
        );
        assert!(matches!(err, AuthProviderError::InvalidCredentials(_)));
    }

    #[test]
    fn test_classify_user_not_found() {
        let err = classify_sign_in_error(
            Some("400".to_string()),
            Some("user_not_found".to_string()),
        );
        assert!(matches!(err, AuthProviderError::UserNotFound(_)));
    }

    #[test]
    fn test_classify_generic_auth_error() {
        let err = classify_sign_in_error(
            Some("over_request_rate_limit".to_string()),
            Some("Request rate limit reached".to_string()),
        );
        match err {
            AuthProviderError::Auth { code, .. } => {
                assert_eq!(code, "over_request_rate_limit");
            }
            e => unreachable!("unexpected error in test: {:?}", e),
        }
    }

    #[test]
    fn test_normalize_signup_wrapped_user() {
        let value = serde_json::json!({
            "user": { "id": "u1", "email": "a@b.com" },
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 3600,
            "token_type": "bearer"
        });

        let result = normalize_sign_up_response(value).unwrap();
        assert_eq!(result.user.id, "u1");
        assert_eq!(result.access_token.as_deref(), Some("at"));
    }

    #[test]
    fn test_normalize_signup_direct_user_object() {
        let value = serde_json::json!({ "id": "u1", "email": "a@b.com" });

        let result = normalize_sign_up_response(value).unwrap();
        assert_eq!(result.user.id, "u1");
        assert_eq!(result.access_token, None);
    }

    #[test]
    fn test_normalize_signup_unexpected_shape() {
        let value = serde_json::json!({ "something": "else" });

        let result = normalize_sign_up_response(value);
        assert!(matches!(
            result,
            Err(AuthProviderError::InvalidResponse(_))
        ));
    }
}
