use async_trait::async_trait;

use crate::domain::entity::forecast::{Forecast, ForecastFilter, ForecastRecord};

/// ForecastRepository は予測レコード永続化のためのリポジトリトレイト。
/// 実装は PostgreSQL の forecasts / shares_master テーブルに対して操作する。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ForecastRepository: Send + Sync {
    /// 銘柄シンボルを share_id に解決する。未登録のシンボルは None。
    async fn find_share_id(&self, symbol: &str) -> anyhow::Result<Option<i64>>;

    /// (share_id, model_id, range_days, target_date) をキーに upsert し、行 ID を返す。
    async fn upsert(&self, record: &ForecastRecord) -> anyhow::Result<i32>;

    /// 指定銘柄の最新 forecast_date に属するレコード一覧を取得する。
    async fn latest(
        &self,
        share_id: i64,
        symbol: &str,
        range_days: Option<i32>,
    ) -> anyhow::Result<Vec<Forecast>>;

    /// 検索条件に一致するレコード一覧を取得する。
    async fn search(
        &self,
        share_id: i64,
        symbol: &str,
        filter: &ForecastFilter,
    ) -> anyhow::Result<Vec<Forecast>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_forecast_repository_find_share_id() {
        let mut mock = MockForecastRepository::new();
        mock.expect_find_share_id()
            .withf(|symbol| symbol == "AAPL")
            .returning(|_| Ok(Some(42)));

        let result = mock.find_share_id("AAPL").await.unwrap();
        assert_eq!(result, Some(42));
    }

    #[tokio::test]
    async fn test_mock_forecast_repository_unknown_symbol() {
        let mut mock = MockForecastRepository::new();
        mock.expect_find_share_id().returning(|_| Ok(None));

        let result = mock.find_share_id("UNKNOWN").await.unwrap();
        assert_eq!(result, None);
    }
}
