use std::sync::Arc;

use crate::domain::entity::forecast::{Forecast, ForecastFilter};
use crate::domain::repository::ForecastRepository;

/// SearchForecastsError は予測検索に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum SearchForecastsError {
    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// SearchForecastsUseCase は検索条件による予測一覧取得ユースケース。
pub struct SearchForecastsUseCase {
    repo: Arc<dyn ForecastRepository>,
}

impl SearchForecastsUseCase {
    pub fn new(repo: Arc<dyn ForecastRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        symbol: &str,
        filter: ForecastFilter,
    ) -> Result<Vec<Forecast>, SearchForecastsError> {
        let share_id = self
            .repo
            .find_share_id(symbol)
            .await
            .map_err(|e| SearchForecastsError::Internal(e.to_string()))?
            .ok_or_else(|| SearchForecastsError::SymbolNotFound(symbol.to_string()))?;

        self.repo
            .search(share_id, symbol, &filter)
            .await
            .map_err(|e| SearchForecastsError::Internal(e.to_string()))
    }
}
