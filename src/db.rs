use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use tracing::debug;

pub async fn connect_and_migrate(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    for pragma in ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL"] {
        db.execute(Statement::from_string(db.get_database_backend(), pragma.to_string())).await?;
    }

    Migrator::up(&db, None).await?;
    debug!("database migrated");
    Ok(db)
}

#[cfg(test)]
pub mod testing {
    use sea_orm::DatabaseConnection;
    use tempfile::TempDir;

    /// Fresh migrated database in a temporary directory. Keep the
    /// `TempDir` alive for as long as the connection is used.
    pub async fn temp_db() -> (TempDir, DatabaseConnection) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("catalog.db").display());
        let db = super::connect_and_migrate(&url).await.unwrap();
        (dir, db)
    }
}
