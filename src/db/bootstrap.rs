use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};
use tracing::info;

use crate::db::entities::record;
use crate::server::config::ServerConfig;

/// Opens the process-wide connection pool.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(max_connections).sqlx_logging(false);
    Database::connect(opt).await
}

/// Creates the `records` table and its index when they are absent. Safe to run
/// on every start.
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut create_table = schema.create_table_from_entity(record::Entity);
    create_table.if_not_exists();
    db.execute(backend.build(&create_table)).await?;

    for mut index in schema.create_index_from_entity(record::Entity) {
        index.if_not_exists();
        db.execute(backend.build(&index)).await?;
    }
    Ok(())
}

pub async fn init_db(config: &ServerConfig) -> Result<DatabaseConnection, DbErr> {
    let db = connect(&config.database_url, config.max_connections).await?;
    ensure_schema(&db).await?;
    info!(max_connections = config.max_connections, "Database ready.");
    Ok(db)
}
