/*!
# SQL database setup

Connections are migrated on open, so a fresh SQLite file is usable right away.
[`new_scratch_db`] gives tests and demos a throwaway database backed by a
temporary file.
*/

use crate::error::{StoreError, StoreResult};
use nads_central_migrations::MigratorTrait as _;
use sea_orm::{Database, DatabaseConnection};
use std::path::Path;
use tracing::info;
use url::Url;

/// Connect to `url` and bring the schema up to date
pub async fn connect_and_migrate(url: &str) -> StoreResult<DatabaseConnection> {
    let conn = Database::connect(url).await?;
    migrate(&conn).await?;
    Ok(conn)
}

pub async fn migrate(conn: &DatabaseConnection) -> StoreResult<()> {
    nads_central_migrations::Migrator::up(conn, None).await?;
    info!("Database schema is up to date");
    Ok(())
}

/// `sqlite://` URL for a file, created if missing
pub fn sqlite_url<P: AsRef<Path>>(path: P) -> StoreResult<String> {
    let path = path.as_ref();
    let mut url = Url::parse("sqlite:///").map_err(|e| {
        StoreError::Config(format!("Invalid sqlite URL base: {}", e))
    })?;
    url.set_path(&path.to_string_lossy());
    url.set_query(Some("mode=rwc"));
    Ok(url.to_string())
}

/// A migrated database in a fresh file under the system temp directory
///
/// We use a file rather than `:memory:` so every pooled connection sees the
/// same database. The file is kept after the process exits.
pub async fn new_scratch_db() -> StoreResult<DatabaseConnection> {
    let path = tempfile::NamedTempFile::new()?
        .into_temp_path()
        .keep()
        .map_err(|e| e.error)?;
    connect_and_migrate(&sqlite_url(&path)?).await
}
