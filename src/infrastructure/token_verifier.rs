//! Bearer トークン検証コア。
//!
//! 未検証ヘッダーから宣言アルゴリズムを読み、起動時に固定した許可リスト
//! {HS256, RS256} に対して分岐する。トークン自身に検証経路を選ばせない。
//! 失敗はすべて分類済みエラーとして呼び出し側へ返し、panic しない。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};

use crate::domain::entity::identity::{Identity, TokenClaims};
use crate::infrastructure::jwks::{JwksFetcher, KeySetCache};
use crate::infrastructure::TokenVerifier;

/// VerifyError はトークン検証の分類済みエラーを表す。
/// 呼び出し側へはすべて 401 相当として伝搬し、詳細は内部ログ専用。
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("malformed token")]
    MalformedToken,

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("unknown key id: {0}")]
    UnknownKey(String),

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// 鍵発見エンドポイントへの到達失敗。クレーム不正と異なり
    /// インフラ障害を示すため、呼び出し側で高いログレベルを使うこと。
    #[error("key set fetch failed: {0}")]
    KeyFetchFailure(String),
}

/// VerifierConfig は JwtTokenVerifier の構築パラメータを表す。
#[derive(Debug)]
pub struct VerifierConfig {
    /// 鍵発見エンドポイント URL
    pub jwks_url: String,
    /// 期待する audience クレーム値
    pub audience: String,
    /// キーセットキャッシュの TTL
    pub cache_ttl: Duration,
    /// JWKS 取得のタイムアウト
    pub fetch_timeout: Duration,
    /// HS256 検証用の共有シークレット
    pub hs256_secret: Option<SecretString>,
    /// シークレット未設定時に署名検証なしのデコードを許可する（テスト専用モード）。
    /// 本番構成で有効化してはならない。
    pub insecure_allow_unverified: bool,
}

/// JwtTokenVerifier は許可リスト方式の JWT 検証器。
/// RS256 は KeySetCache 経由で解決した公開鍵、HS256 は設定済み共有
/// シークレットで署名を検証し、audience を確認して Identity を返す。
pub struct JwtTokenVerifier {
    allowed_algorithms: Vec<Algorithm>,
    audience: String,
    hs256_secret: Option<SecretString>,
    insecure_allow_unverified: bool,
    keys: KeySetCache,
}

impl JwtTokenVerifier {
    pub fn new(config: VerifierConfig) -> Self {
        let keys = KeySetCache::new(
            config.jwks_url.clone(),
            config.cache_ttl,
            config.fetch_timeout,
        );
        Self::with_key_set_cache(config, keys)
    }

    /// カスタムフェッチャーを使う JwtTokenVerifier を生成する（テスト用）。
    pub fn with_fetcher(config: VerifierConfig, fetcher: Arc<dyn JwksFetcher>) -> Self {
        let keys =
            KeySetCache::with_fetcher(config.jwks_url.clone(), config.cache_ttl, fetcher);
        Self::with_key_set_cache(config, keys)
    }

    fn with_key_set_cache(config: VerifierConfig, keys: KeySetCache) -> Self {
        Self {
            // 許可アルゴリズムは起動時固定。トークンの宣言値はこのリストとの
            // 照合にのみ使う（algorithm confusion 対策）。
            allowed_algorithms: vec![Algorithm::HS256, Algorithm::RS256],
            audience: config.audience,
            hs256_secret: config.hs256_secret,
            insecure_allow_unverified: config.insecure_allow_unverified,
            keys,
        }
    }

    /// キーセットキャッシュを無効化する。鍵ローテーション時に使用。
    pub async fn invalidate_key_cache(&self) {
        self.keys.invalidate().await;
    }

    fn validation(&self, alg: Algorithm) -> Validation {
        let mut validation = Validation::new(alg);
        validation.set_audience(&[&self.audience]);
        validation
    }

    fn verify_hs256(&self, token: &str) -> Result<TokenClaims, VerifyError> {
        match &self.hs256_secret {
            Some(secret) => {
                let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());
                let data = decode::<TokenClaims>(token, &key, &self.validation(Algorithm::HS256))
                    .map_err(map_jwt_error)?;
                Ok(data.claims)
            }
            None if self.insecure_allow_unverified => {
                // テスト専用の明示的オプトイン経路。使用のたびに警告を残す。
                tracing::warn!(
                    "HS256 secret not configured; decoding token WITHOUT signature verification \
                     (auth.insecure_allow_unverified=true)"
                );
                let mut validation = self.validation(Algorithm::HS256);
                validation.insecure_disable_signature_validation();
                let data =
                    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
                        .map_err(map_jwt_error)?;
                Ok(data.claims)
            }
            None => {
                tracing::error!(
                    "received HS256 token but auth.hs256_secret is not configured; \
                     rejecting (set the secret or enable the explicit test-only mode)"
                );
                Err(VerifyError::InvalidToken(
                    "HS256 secret not configured".to_string(),
                ))
            }
        }
    }

    async fn verify_rs256(
        &self,
        token: &str,
        kid: Option<String>,
    ) -> Result<TokenClaims, VerifyError> {
        let kid = kid.ok_or(VerifyError::MalformedToken)?;

        let keys = self
            .keys
            .get()
            .await
            .map_err(|e| VerifyError::KeyFetchFailure(e.to_string()))?;

        // 未知の kid は再フェッチせず即時失敗とする。ローテーション後の鍵は
        // TTL 経過時に取得されるため、攻撃者制御の kid で発見エンドポイントを
        // 叩き続けることはない。
        let jwk = keys
            .iter()
            .find(|k| k.kid == kid)
            .ok_or_else(|| VerifyError::UnknownKey(kid.clone()))?;

        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|e| VerifyError::InvalidToken(e.to_string()))?;

        let data = decode::<TokenClaims>(token, &key, &self.validation(Algorithm::RS256))
            .map_err(map_jwt_error)?;
        Ok(data.claims)
    }
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> VerifyError {
    use jsonwebtoken::errors::ErrorKind;

    match e.kind() {
        ErrorKind::ExpiredSignature => VerifyError::TokenExpired,
        _ => VerifyError::InvalidToken(e.to_string()),
    }
}

#[async_trait]
impl TokenVerifier for JwtTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError> {
        let header = decode_header(token).map_err(|_| VerifyError::MalformedToken)?;

        if !self.allowed_algorithms.contains(&header.alg) {
            return Err(VerifyError::UnsupportedAlgorithm(format!(
                "{:?}",
                header.alg
            )));
        }

        let claims = match header.alg {
            Algorithm::HS256 => self.verify_hs256(token)?,
            Algorithm::RS256 => self.verify_rs256(token, header.kid).await?,
            other => {
                return Err(VerifyError::UnsupportedAlgorithm(format!("{other:?}")));
            }
        };

        Ok(Identity::from(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn config(secret: Option<&str>) -> VerifierConfig {
        VerifierConfig {
            jwks_url: "https://example.com/jwks".to_string(),
            audience: "authenticated".to_string(),
            cache_ttl: Duration::from_secs(3600),
            fetch_timeout: Duration::from_secs(10),
            hs256_secret: secret.map(|s| SecretString::new(s.to_string())),
            insecure_allow_unverified: false,
        }
    }

    fn hs256_token(secret: &str, claims: &serde_json::Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn valid_claims() -> serde_json::Value {
        serde_json::json!({
            "sub": "u1",
            "role": "admin",
            "email": "a@b.com",
            "aud": "authenticated",
            "exp": chrono::Utc::now().timestamp() + 3600,
            "iat": chrono::Utc::now().timestamp(),
        })
    }

    #[tokio::test]
    async fn test_hs256_roundtrip() {
        let verifier = JwtTokenVerifier::new(config(Some("test-secret")));
        let token = hs256_token("test-secret", &valid_claims());

        let identity = verifier.verify(&token).await.unwrap();
        assert_eq!(identity.subject_id.as_deref(), Some("u1"));
        assert_eq!(identity.role.as_deref(), Some("admin"));
        assert_eq!(identity.email.as_deref(), Some("a@b.com"));
    }

    #[tokio::test]
    async fn test_hs256_wrong_secret_is_invalid_token() {
        let verifier = JwtTokenVerifier::new(config(Some("right-secret")));
        let token = hs256_token("wrong-secret", &valid_claims());

        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, VerifyError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_hs256_without_secret_rejected() {
        let verifier = JwtTokenVerifier::new(config(None));
        let token = hs256_token("whatever", &valid_claims());

        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, VerifyError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_hs256_insecure_mode_decodes_without_verification() {
        let mut cfg = config(None);
        cfg.insecure_allow_unverified = true;
        let verifier = JwtTokenVerifier::new(cfg);
        let token = hs256_token("any-secret", &valid_claims());

        let identity = verifier.verify(&token).await.unwrap();
        assert_eq!(identity.subject_id.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_expired_hs256_token() {
        let verifier = JwtTokenVerifier::new(config(Some("test-secret")));
        let mut claims = valid_claims();
        claims["exp"] = serde_json::json!(chrono::Utc::now().timestamp() - 3600);
        let token = hs256_token("test-secret", &claims);

        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, VerifyError::TokenExpired));
    }

    #[tokio::test]
    async fn test_audience_mismatch_is_invalid_token() {
        let verifier = JwtTokenVerifier::new(config(Some("test-secret")));
        let mut claims = valid_claims();
        claims["aud"] = serde_json::json!("other-audience");
        let token = hs256_token("test-secret", &claims);

        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, VerifyError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_unsupported_algorithm() {
        let verifier = JwtTokenVerifier::new(config(Some("test-secret")));
        let token = encode(
            &Header::new(Algorithm::HS384),
            &valid_claims(),
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let err = verifier.verify(&token).await.unwrap_err();
        match err {
            VerifyError::UnsupportedAlgorithm(alg) => assert_eq!(alg, "HS384"),
            e => unreachable!("unexpected error in test: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_malformed_token() {
        let verifier = JwtTokenVerifier::new(config(Some("test-secret")));

        let err = verifier.verify("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, VerifyError::MalformedToken));
    }

    #[tokio::test]
    async fn test_rs256_fetch_failure_is_key_fetch_failure() {
        use crate::infrastructure::jwks::{JwkKey, JwksFetchError, JwksFetcher};

        struct FailingFetcher;

        #[async_trait]
        impl JwksFetcher for FailingFetcher {
            async fn fetch_keys(&self, _url: &str) -> Result<Vec<JwkKey>, JwksFetchError> {
                Err(JwksFetchError("timeout".to_string()))
            }
        }

        let verifier =
            JwtTokenVerifier::with_fetcher(config(None), Arc::new(FailingFetcher));

        // 鍵取得が署名検証より先に失敗するため、署名部はダミーで良い
        let header = serde_json::json!({"alg": "RS256", "typ": "JWT", "kid": "key-1"});
        let token = format!(
            "{}.{}.sig",
            base64_url(&header.to_string()),
            base64_url(&valid_claims().to_string())
        );

        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, VerifyError::KeyFetchFailure(_)));
    }

    fn base64_url(input: &str) -> String {
        const TABLE: &[u8; 64] =
            b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
        let bytes = input.as_bytes();
        let mut out = String::new();
        for chunk in bytes.chunks(3) {
            let b = [
                chunk[0],
                chunk.get(1).copied().unwrap_or(0),
                chunk.get(2).copied().unwrap_or(0),
            ];
            out.push(TABLE[(b[0] >> 2) as usize] as char);
            out.push(TABLE[(((b[0] & 0x03) << 4) | (b[1] >> 4)) as usize] as char);
            if chunk.len() > 1 {
                out.push(TABLE[(((b[1] & 0x0f) << 2) | (b[2] >> 6)) as usize] as char);
            }
            if chunk.len() > 2 {
                out.push(TABLE[(b[2] & 0x3f) as usize] as char);
            }
        }
        out
    }
}
