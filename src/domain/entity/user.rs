use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// AuthUser は認証プロバイダ (GoTrue) が返すユーザーレコードを表す。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub app_metadata: Option<serde_json::Value>,
}

/// Session はサインイン成功時にプロバイダが発行するトークン一式を表す。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub user: Option<AuthUser>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// SignUpResult はサインアップ結果を表す。
/// プロバイダの自動確認設定によってはトークンが同時に発行される。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SignUpResult {
    #[schema(value_type = Object)]
    pub user: AuthUser,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// UserProfile はこの API が返すユーザープロフィールのレスポンス形を表す。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub auth_type: String,
    pub subscription: Option<String>,
    pub is_active: bool,
    pub email_verified: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    #[schema(value_type = Object)]
    pub profile: serde_json::Value,
    pub favorites: Vec<String>,
    #[schema(value_type = Object)]
    pub settings: serde_json::Value,
}

impl UserProfile {
    /// プロバイダのユーザーレコードからプロフィールレスポンスを組み立てる。
    /// favorites / settings は user_metadata 配下に保存される。
    pub fn from_auth_user(user: AuthUser) -> Self {
        let metadata = user
            .user_metadata
            .unwrap_or_else(|| serde_json::json!({}));

        let favorites = metadata
            .get("favorites")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        let settings = metadata
            .get("settings")
            .cloned()
            .unwrap_or_else(|| serde_json::json!({}));

        let subscription = user
            .app_metadata
            .as_ref()
            .and_then(|m| m.get("subscription"))
            .and_then(|v| v.as_str())
            .map(str::to_string);

        UserProfile {
            id: user.id,
            email: user.email,
            auth_type: "email".to_string(),
            subscription,
            is_active: true,
            email_verified: user.email_confirmed_at.is_some(),
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login_at: user.last_sign_in_at,
            profile: metadata,
            favorites,
            settings,
        }
    }
}

/// ProfileUpdate はプロフィール更新リクエストを表す。
/// None のフィールドは変更しない。
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct ProfileUpdate {
    pub subscription: Option<String>,
    #[schema(value_type = Object)]
    pub profile: Option<serde_json::Value>,
    pub favorites: Option<Vec<String>>,
    #[schema(value_type = Object)]
    pub settings: Option<serde_json::Value>,
}

impl ProfileUpdate {
    /// 更新対象フィールドをプロバイダの user_metadata / app_metadata 形式に変換する。
    pub fn into_provider_attributes(self) -> serde_json::Value {
        let mut user_metadata = self.profile.unwrap_or_else(|| serde_json::json!({}));

        if let Some(favorites) = self.favorites {
            user_metadata["favorites"] = serde_json::json!(favorites);
        }
        if let Some(settings) = self.settings {
            user_metadata["settings"] = settings;
        }

        let mut attrs = serde_json::json!({});
        if user_metadata != serde_json::json!({}) {
            attrs["user_metadata"] = user_metadata;
        }
        if let Some(subscription) = self.subscription {
            attrs["app_metadata"] = serde_json::json!({ "subscription": subscription });
        }
        attrs
    }
}
