use chrono::NaiveDateTime;
use serde::Serialize;

/// A persisted record: surrogate id, business fields and timestamps.
///
/// Serializes as one flat JSON object: `id`, every canonical column of the
/// record, then `創建時間` / `更新時間`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity<T> {
    pub id: i64,
    #[serde(flatten)]
    pub data: T,
    #[serde(rename = "創建時間")]
    pub created_at: NaiveDateTime,
    #[serde(rename = "更新時間")]
    pub updated_at: NaiveDateTime,
}
