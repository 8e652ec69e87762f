use chrono::{SecondsFormat, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait,
};
use tracing::debug;

use crate::db::entities::record;
use crate::db::models::NewRecord;

/// How many records survive an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Retention {
    #[default]
    KeepAll,
    /// Keep the N most recently inserted records.
    KeepNewest(u64),
    /// Keep the N records that rank highest on the leaderboard.
    KeepBest(u64),
}

/// Leaderboard order: smallest deviation first, insertion order on ties.
fn leaderboard_query() -> Select<record::Entity> {
    record::Entity::find()
        .order_by_asc(record::Column::Deviation)
        .order_by_asc(record::Column::Id)
}

/// Stores a new record and applies the retention policy in the same
/// transaction. Returns the assigned id.
pub async fn insert_record(
    db: &DatabaseConnection,
    new_record: NewRecord,
    retention: Retention,
) -> Result<i32, DbErr> {
    let txn = db.begin().await?;

    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let model = record::ActiveModel {
        school: Set(new_record.school),
        name: Set(new_record.name),
        record_time: Set(new_record.record_time),
        deviation: Set(new_record.deviation),
        created_at: Set(created_at),
        ..Default::default() // id
    }
    .insert(&txn)
    .await?;

    let pruned = prune_records(&txn, retention).await?;
    txn.commit().await?;

    if pruned > 0 {
        debug!(record_id = model.id, pruned, "Retention removed records.");
    }
    Ok(model.id)
}

async fn prune_records<C: ConnectionTrait>(conn: &C, retention: Retention) -> Result<u64, DbErr> {
    match retention {
        Retention::KeepAll => Ok(0),
        Retention::KeepNewest(max_records) => {
            let Some(boundary) = record::Entity::find()
                .order_by_desc(record::Column::Id)
                .offset(max_records)
                .one(conn)
                .await?
            else {
                return Ok(0);
            };
            let result = record::Entity::delete_many()
                .filter(record::Column::Id.lte(boundary.id))
                .exec(conn)
                .await?;
            Ok(result.rows_affected)
        }
        Retention::KeepBest(max_records) => {
            let Some(boundary) = leaderboard_query().offset(max_records).one(conn).await? else {
                return Ok(0);
            };
            // The boundary row and everything ranked after it.
            let result = record::Entity::delete_many()
                .filter(
                    Condition::any()
                        .add(record::Column::Deviation.gt(boundary.deviation))
                        .add(
                            Condition::all()
                                .add(record::Column::Deviation.eq(boundary.deviation))
                                .add(record::Column::Id.gte(boundary.id)),
                        ),
                )
                .exec(conn)
                .await?;
            Ok(result.rows_affected)
        }
    }
}

/// Deletes every record. Returns how many rows were removed.
pub async fn clear_all_records(db: &DatabaseConnection) -> Result<u64, DbErr> {
    let result = record::Entity::delete_many().exec(db).await?;
    Ok(result.rows_affected)
}

/// Up to `limit` records in leaderboard order. An empty table yields an empty vec.
pub async fn get_top_records(db: &DatabaseConnection, limit: u64) -> Result<Vec<record::Model>, DbErr> {
    leaderboard_query().limit(limit).all(db).await
}

pub async fn count_records(db: &DatabaseConnection) -> Result<u64, DbErr> {
    record::Entity::find().count(db).await
}
