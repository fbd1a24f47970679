use std::sync::Arc;

use crate::domain::entity::forecast::ForecastCreate;
use crate::domain::repository::ForecastRepository;

/// UpsertForecastError は予測レコード upsert に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum UpsertForecastError {
    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// UpsertForecastUseCase は予測レコードの upsert ユースケース。
/// シンボルを share_id に解決し、(share_id, model_id, range_days, target_date)
/// をキーに書き込む。
pub struct UpsertForecastUseCase {
    repo: Arc<dyn ForecastRepository>,
}

impl UpsertForecastUseCase {
    pub fn new(repo: Arc<dyn ForecastRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, input: ForecastCreate) -> Result<i32, UpsertForecastError> {
        let share_id = self
            .repo
            .find_share_id(&input.symbol)
            .await
            .map_err(|e| UpsertForecastError::Internal(e.to_string()))?
            .ok_or_else(|| UpsertForecastError::SymbolNotFound(input.symbol.clone()))?;

        let record = input.into_record(share_id);
        self.repo
            .upsert(&record)
            .await
            .map_err(|e| UpsertForecastError::Internal(e.to_string()))
    }

    /// 複数レコードを順次 upsert する。未知のシンボルが現れた時点で中断する。
    pub async fn execute_bulk(
        &self,
        items: Vec<ForecastCreate>,
    ) -> Result<Vec<i32>, UpsertForecastError> {
        let mut ids = Vec::with_capacity(items.len());
        for item in items {
            ids.push(self.execute(item).await?);
        }
        Ok(ids)
    }
}
