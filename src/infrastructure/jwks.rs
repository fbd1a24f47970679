//! JWKS 取得とキーセットキャッシュ。
//!
//! 鍵発見エンドポイントから公開鍵一覧を取得し、TTL と容量上限付きの
//! キャッシュに保持する。TTL 内の再検証はネットワークを発生させない。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::Deserialize;

/// キーセット全体を単一スロットに保持するためのキャッシュキー。
const KEY_SET_SLOT: &str = "jwks";

/// キャッシュエントリ数の上限。キーセットは常に一括置換されるため実質 1 スロット。
const KEY_SET_CAPACITY: u64 = 2;

/// JwksFetchError は鍵発見エンドポイントへのアクセス失敗を表す。
#[derive(Debug, Clone, thiserror::Error)]
#[error("JWKS fetch failed: {0}")]
pub struct JwksFetchError(pub String);

/// JWKS レスポンスの構造体。
#[derive(Debug, Clone, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

/// 個々の JWK 鍵。
#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
    #[allow(dead_code)]
    kty: String,
    n: String,
    e: String,
}

/// JwkKey は取得した JWK 鍵の公開情報。
#[derive(Debug, Clone)]
pub struct JwkKey {
    pub kid: String,
    pub n: String,
    pub e: String,
}

/// JwksFetcher は JWKS エンドポイントからの鍵取得を抽象化するトレイト。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JwksFetcher: Send + Sync {
    async fn fetch_keys(&self, jwks_url: &str) -> Result<Vec<JwkKey>, JwksFetchError>;
}

/// HttpJwksFetcher は HTTPS GET で JWKS を取得するデフォルト実装。
pub struct HttpJwksFetcher {
    client: reqwest::Client,
}

impl HttpJwksFetcher {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

#[async_trait]
impl JwksFetcher for HttpJwksFetcher {
    async fn fetch_keys(&self, jwks_url: &str) -> Result<Vec<JwkKey>, JwksFetchError> {
        let resp: JwksResponse = self
            .client
            .get(jwks_url)
            .send()
            .await
            .map_err(|e| JwksFetchError(e.to_string()))?
            .error_for_status()
            .map_err(|e| JwksFetchError(e.to_string()))?
            .json()
            .await
            .map_err(|e| JwksFetchError(e.to_string()))?;

        Ok(resp
            .keys
            .into_iter()
            .map(|k| JwkKey {
                kid: k.kid,
                n: k.n,
                e: k.e,
            })
            .collect())
    }
}

/// KeySetCache は TTL・容量上限付きのキーセットキャッシュ。
/// Verifier インスタンスが所有する明示的なオブジェクトであり、
/// モジュールレベルのシングルトンではない。
///
/// 同時のキャッシュミスは多重フェッチを許容する（各リクエストは
/// 取得後に自分で解決を行うため、中途半端なエントリを観測しない）。
pub struct KeySetCache {
    url: String,
    cache: Cache<String, Arc<Vec<JwkKey>>>,
    fetcher: Arc<dyn JwksFetcher>,
}

impl KeySetCache {
    /// 指定 URL・TTL の KeySetCache を生成する。取得タイムアウトは fetch_timeout。
    pub fn new(url: String, ttl: Duration, fetch_timeout: Duration) -> Self {
        Self::with_fetcher(url, ttl, Arc::new(HttpJwksFetcher::new(fetch_timeout)))
    }

    /// カスタムフェッチャーを使う KeySetCache を生成する（テスト用）。
    pub fn with_fetcher(url: String, ttl: Duration, fetcher: Arc<dyn JwksFetcher>) -> Self {
        let cache = Cache::builder()
            .max_capacity(KEY_SET_CAPACITY)
            .time_to_live(ttl)
            .build();
        Self {
            url,
            cache,
            fetcher,
        }
    }

    /// キーセットを返す。TTL 内はキャッシュから、期限切れ・未取得時はリモートから取得する。
    pub async fn get(&self) -> Result<Arc<Vec<JwkKey>>, JwksFetchError> {
        if let Some(keys) = self.cache.get(KEY_SET_SLOT).await {
            return Ok(keys);
        }

        let keys = Arc::new(self.fetcher.fetch_keys(&self.url).await?);
        self.cache.insert(KEY_SET_SLOT.to_string(), keys.clone()).await;
        Ok(keys)
    }

    /// キャッシュを無効化する。鍵ローテーション時に使用。
    pub async fn invalidate(&self) {
        self.cache.invalidate(KEY_SET_SLOT).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 呼び出し回数を数えるテスト用フェッチャー。
    struct CountingFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl JwksFetcher for CountingFetcher {
        async fn fetch_keys(&self, _jwks_url: &str) -> Result<Vec<JwkKey>, JwksFetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![JwkKey {
                kid: "key-1".to_string(),
                n: "AQAB".to_string(),
                e: "AQAB".to_string(),
            }])
        }
    }

    #[tokio::test]
    async fn test_cache_hit_within_ttl_fetches_once() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
        });
        let cache = KeySetCache::with_fetcher(
            "https://example.com/jwks".to_string(),
            Duration::from_secs(3600),
            fetcher.clone(),
        );

        let first = cache.get().await.unwrap();
        let second = cache.get().await.unwrap();

        assert_eq!(first[0].kid, "key-1");
        assert_eq!(second[0].kid, "key-1");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_expiry_triggers_refetch() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
        });
        let cache = KeySetCache::with_fetcher(
            "https://example.com/jwks".to_string(),
            Duration::from_millis(50),
            fetcher.clone(),
        );

        let _ = cache.get().await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        let _ = cache.get().await.unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
        });
        let cache = KeySetCache::with_fetcher(
            "https://example.com/jwks".to_string(),
            Duration::from_secs(3600),
            fetcher.clone(),
        );

        let _ = cache.get().await.unwrap();
        cache.invalidate().await;
        let _ = cache.get().await.unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        struct FailingFetcher;

        #[async_trait]
        impl JwksFetcher for FailingFetcher {
            async fn fetch_keys(&self, _url: &str) -> Result<Vec<JwkKey>, JwksFetchError> {
                Err(JwksFetchError("connection refused".to_string()))
            }
        }

        let cache = KeySetCache::with_fetcher(
            "https://example.com/jwks".to_string(),
            Duration::from_secs(60),
            Arc::new(FailingFetcher),
        );

        let result = cache.get().await;
        assert!(result.is_err());
    }
}
