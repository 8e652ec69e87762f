use serde::Serialize;

use crate::db::entities::record;

/// A validated submission ready to be stored. `id` and `created_at` are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub school: String,
    pub name: String,
    pub record_time: f64,
    pub deviation: f64,
}

/// Public leaderboard view of a record. Field order is part of the JSON contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub school: String,
    pub name: String,
    pub record_time: f64,
    pub deviation: f64,
    pub created_at: String,
}

impl From<record::Model> for RankingEntry {
    fn from(model: record::Model) -> Self {
        Self {
            school: model.school,
            name: model.name,
            record_time: model.record_time,
            deviation: model.deviation,
            created_at: model.created_at,
        }
    }
}
