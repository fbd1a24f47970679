use serde::{Deserialize, Serialize};

/// TokenClaims は検証済み JWT のペイロードを表す。
/// Supabase (GoTrue) が発行するアクセストークンの形に合わせ、
/// sub を含む非必須クレームはすべて serde デフォルトで受ける。
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,

    /// GoTrue のロールクレーム（例: "authenticated", "admin"）
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    /// トークンの有効期限（Unix タイムスタンプ）
    pub exp: i64,

    #[serde(default)]
    pub iat: Option<i64>,

    /// ネストされたユーザーメタデータ（メール検証フラグ等）
    #[serde(default)]
    pub user_metadata: Option<UserMetadata>,
}

/// UserMetadata は user_metadata クレームのうちこのサービスが参照する部分を表す。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub email_verified: bool,
}

/// Identity は検証済みトークンから抽出した正規化済みユーザー情報を表す。
/// ダウンストリームのハンドラはこのレコードのみを参照し、生のクレームには触れない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default, utoipa::ToSchema)]
pub struct Identity {
    /// subject 識別子。欠落は拒否ではなく None として許容する。
    pub subject_id: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        let email_verified = claims
            .user_metadata
            .map(|m| m.email_verified)
            .unwrap_or(false);

        Identity {
            subject_id: claims.sub,
            role: claims.role,
            email: claims.email,
            email_verified,
        }
    }
}

impl Identity {
    /// subject 識別子を返す。未設定の場合は空文字列。
    pub fn subject_or_empty(&self) -> &str {
        self.subject_id.as_deref().unwrap_or("")
    }
}
