use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Direction は予測方向を表す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

impl Direction {
    /// DB 格納値の文字列表現を返す。
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Neutral => "neutral",
        }
    }

    /// DB 格納値から変換する。既知の値以外は None。
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "neutral" => Some(Direction::Neutral),
            _ => None,
        }
    }
}

/// ForecastCreate は upsert リクエストの入力モデルを表す。
/// symbol は shares_master の登録シンボルであること。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct ForecastCreate {
    #[validate(length(min = 1))]
    pub symbol: String,
    #[validate(range(min = 1))]
    pub range_days: i32,
    pub forecast_date: NaiveDate,
    pub target_date: NaiveDate,
    pub model_name: String,
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub model_id: Option<i64>,
    #[serde(default)]
    pub used_indicators: Vec<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub feature_importance: Option<serde_json::Value>,
    #[serde(default)]
    pub prediction: Option<f64>,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub sl_target: Option<f64>,
    #[serde(default)]
    pub tp_target: Option<f64>,
}

impl ForecastCreate {
    /// 解決済み share_id を付与して書き込みモデルへ変換する。
    pub fn into_record(self, share_id: i64) -> ForecastRecord {
        ForecastRecord {
            share_id,
            model_id: self.model_id,
            forecast_date: self.forecast_date,
            target_date: self.target_date,
            range_days: self.range_days,
            model_name: self.model_name,
            model_version: self.model_version,
            used_indicators: self.used_indicators,
            feature_importance: self.feature_importance,
            prediction: self.prediction,
            direction: self.direction,
            confidence: self.confidence,
            sl_target: self.sl_target,
            tp_target: self.tp_target,
        }
    }
}

/// ForecastRecord は upsert の書き込みモデルを表す。
/// symbol は事前に share_id へ解決済みであること。
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRecord {
    pub share_id: i64,
    pub model_id: Option<i64>,
    pub forecast_date: NaiveDate,
    pub target_date: NaiveDate,
    pub range_days: i32,
    pub model_name: String,
    pub model_version: Option<String>,
    pub used_indicators: Vec<String>,
    pub feature_importance: Option<serde_json::Value>,
    pub prediction: Option<f64>,
    pub direction: Option<Direction>,
    pub confidence: Option<f64>,
    pub sl_target: Option<f64>,
    pub tp_target: Option<f64>,
}

/// Forecast は API が返す予測レコードを表す。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Forecast {
    pub id: i32,
    pub symbol: String,
    pub range_days: i32,
    pub forecast_date: NaiveDate,
    pub target_date: NaiveDate,
    pub model_name: String,
    pub model_version: Option<String>,
    pub model_id: Option<i64>,
    pub used_indicators: Vec<String>,
    #[schema(value_type = Object)]
    pub feature_importance: Option<serde_json::Value>,
    pub prediction: Option<f64>,
    pub direction: Option<Direction>,
    pub confidence: Option<f64>,
    pub sl_target: Option<f64>,
    pub tp_target: Option<f64>,
}

/// ForecastFilter は検索条件を表す。target_date の範囲で絞り込む。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastFilter {
    pub range_days: Option<i32>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}
