use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::entity::forecast::{Direction, Forecast, ForecastFilter, ForecastRecord};
use crate::domain::repository::ForecastRepository;

/// ForecastPostgresRepository は PostgreSQL ベースの予測レコードリポジトリ。
/// shares_master / forecasts テーブルに対する操作を提供する。
pub struct ForecastPostgresRepository {
    pool: PgPool,
}

impl ForecastPostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// ForecastRow は forecasts テーブルの行を表す中間構造体。
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ForecastRow {
    pub id: i32,
    pub model_id: Option<i64>,
    pub forecast_date: chrono::NaiveDate,
    pub target_date: chrono::NaiveDate,
    pub range_days: i32,
    pub model_name: String,
    pub model_version: Option<String>,
    pub used_indicators: Option<Vec<String>>,
    pub feature_importance: Option<serde_json::Value>,
    pub prediction: Option<f64>,
    pub direction: Option<String>,
    pub confidence: Option<f64>,
    pub sl_target: Option<f64>,
    pub tp_target: Option<f64>,
}

impl ForecastRow {
    /// スキーマ互換のため symbol を付与して API モデルへ変換する。
    fn into_forecast(self, symbol: &str) -> Forecast {
        Forecast {
            id: self.id,
            symbol: symbol.to_string(),
            range_days: self.range_days,
            forecast_date: self.forecast_date,
            target_date: self.target_date,
            model_name: self.model_name,
            model_version: self.model_version,
            model_id: self.model_id,
            used_indicators: self.used_indicators.unwrap_or_default(),
            feature_importance: self.feature_importance,
            prediction: self.prediction,
            direction: self.direction.as_deref().and_then(Direction::parse),
            confidence: self.confidence,
            sl_target: self.sl_target,
            tp_target: self.tp_target,
        }
    }
}

const FORECAST_COLUMNS: &str = "id, model_id, forecast_date, target_date, range_days, \
     model_name, model_version, used_indicators, feature_importance, \
     prediction, direction, confidence, sl_target, tp_target";

#[async_trait]
impl ForecastRepository for ForecastPostgresRepository {
    async fn find_share_id(&self, symbol: &str) -> anyhow::Result<Option<i64>> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM shares_master WHERE symbol = $1")
                .bind(symbol)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(id,)| id))
    }

    async fn upsert(&self, record: &ForecastRecord) -> anyhow::Result<i32> {
        // UPSERT の一意キー: (share_id, model_id, range_days, target_date)
        let (id,): (i32,) = sqlx::query_as(
            r"
            INSERT INTO forecasts (
                share_id, model_id, forecast_date, target_date, range_days,
                model_name, model_version, used_indicators, feature_importance,
                prediction, direction, confidence, sl_target, tp_target
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (share_id, model_id, range_days, target_date) DO UPDATE SET
                forecast_date = EXCLUDED.forecast_date,
                model_name = EXCLUDED.model_name,
                model_version = EXCLUDED.model_version,
                used_indicators = EXCLUDED.used_indicators,
                feature_importance = EXCLUDED.feature_importance,
                prediction = EXCLUDED.prediction,
                direction = EXCLUDED.direction,
                confidence = EXCLUDED.confidence,
                sl_target = EXCLUDED.sl_target,
                tp_target = EXCLUDED.tp_target,
                updated_at = now()
            RETURNING id
            ",
        )
        .bind(record.share_id)
        .bind(record.model_id)
        .bind(record.forecast_date)
        .bind(record.target_date)
        .bind(record.range_days)
        .bind(&record.model_name)
        .bind(&record.model_version)
        .bind(&record.used_indicators)
        .bind(&record.feature_importance)
        .bind(record.prediction)
        .bind(record.direction.map(Direction::as_str))
        .bind(record.confidence)
        .bind(record.sl_target)
        .bind(record.tp_target)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn latest(
        &self,
        share_id: i64,
        symbol: &str,
        range_days: Option<i32>,
    ) -> anyhow::Result<Vec<Forecast>> {
        let sql = format!(
            r"
            SELECT {FORECAST_COLUMNS}
            FROM forecasts
            WHERE share_id = $1
              AND ($2::int IS NULL OR range_days = $2)
              AND forecast_date = (
                  SELECT MAX(forecast_date) FROM forecasts
                  WHERE share_id = $1 AND ($2::int IS NULL OR range_days = $2)
              )
            "
        );

        let rows: Vec<ForecastRow> = sqlx::query_as(&sql)
            .bind(share_id)
            .bind(range_days)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.into_forecast(symbol))
            .collect())
    }

    async fn search(
        &self,
        share_id: i64,
        symbol: &str,
        filter: &ForecastFilter,
    ) -> anyhow::Result<Vec<Forecast>> {
        let mut conditions = vec!["share_id = $1".to_string()];
        let mut bind_index = 2u32;

        if filter.range_days.is_some() {
            conditions.push(format!("range_days = ${bind_index}"));
            bind_index += 1;
        }
        if filter.date_from.is_some() {
            conditions.push(format!("target_date >= ${bind_index}"));
            bind_index += 1;
        }
        if filter.date_to.is_some() {
            conditions.push(format!("target_date <= ${bind_index}"));
        }

        let sql = format!(
            "SELECT {FORECAST_COLUMNS} FROM forecasts WHERE {} ORDER BY target_date, id",
            conditions.join(" AND ")
        );

        let mut query = sqlx::query_as::<_, ForecastRow>(&sql).bind(share_id);
        if let Some(range_days) = filter.range_days {
            query = query.bind(range_days);
        }
        if let Some(date_from) = filter.date_from {
            query = query.bind(date_from);
        }
        if let Some(date_to) = filter.date_to {
            query = query.bind(date_to);
        }

        let rows = query.fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|row| row.into_forecast(symbol))
            .collect())
    }
}
