use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricType {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub color: String,
    pub order_index: i64,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricTypeSummary {
    #[serde(flatten)]
    pub metric_type: MetricType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_entry: Option<MetricPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricEntry {
    pub id: i64,
    pub metric_type_id: i64,
    pub entry_date: NaiveDate,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardMetric {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub color: String,
    pub entries: Vec<MetricPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMetricTypeInput {
    pub name: String,
    pub unit: String,
    pub color: String,
    #[serde(default)]
    pub order_index: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMetricTypeInput {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub color: Option<String>,
    pub order_index: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MetricOrder {
    pub id: i64,
    pub order_index: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMetricEntryInput {
    pub metric_type_id: i64,
    pub entry_date: NaiveDate,
    pub value: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMetricEntryInput {
    pub value: Option<f64>,
    pub entry_date: Option<NaiveDate>,
    pub notes: Option<String>,
}
