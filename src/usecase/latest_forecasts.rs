use std::sync::Arc;

use crate::domain::entity::forecast::Forecast;
use crate::domain::repository::ForecastRepository;

/// LatestForecastsError は最新予測取得に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum LatestForecastsError {
    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// LatestForecastsUseCase は銘柄ごとの最新 forecast_date に属する予測一覧を返す。
pub struct LatestForecastsUseCase {
    repo: Arc<dyn ForecastRepository>,
}

impl LatestForecastsUseCase {
    pub fn new(repo: Arc<dyn ForecastRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        symbol: &str,
        range_days: Option<i32>,
    ) -> Result<Vec<Forecast>, LatestForecastsError> {
        let share_id = self
            .repo
            .find_share_id(symbol)
            .await
            .map_err(|e| LatestForecastsError::Internal(e.to_string()))?
            .ok_or_else(|| LatestForecastsError::SymbolNotFound(symbol.to_string()))?;

        self.repo
            .latest(share_id, symbol, range_days)
            .await
            .map_err(|e| LatestForecastsError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::forecast_repository::MockForecastRepository;

    #[tokio::test]
    async fn test_latest_success() {
        let mut mock = MockForecastRepository::new();
        mock.expect_find_share_id().returning(|_| Ok(Some(42)));
        mock.expect_latest()
            .withf(|share_id, symbol, range_days| {
                *share_id == 42 && symbol == "AAPL" && *range_days == Some(30)
            })
            .returning(|_, _, _| Ok(vec![]));

        let uc = LatestForecastsUseCase::new(Arc::new(mock));
        let result = uc.execute("AAPL", Some(30)).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_latest_unknown_symbol() {
        let mut mock = MockForecastRepository::new();
        mock.expect_find_share_id().returning(|_| Ok(None));

        let uc = LatestForecastsUseCase::new(Arc::new(mock));
        let err = uc.execute("UNKNOWN", None).await.unwrap_err();
        assert!(matches!(err, LatestForecastsError::SymbolNotFound(_)));
    }
}
