use diesel::Connection as _;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
#[cfg(test)] use tempfile::NamedTempFile;

use crate::core::GenericResult;

pub mod models;
pub mod schema;

pub use diesel::SqliteConnection as Connection;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub fn connect(url: &str) -> GenericResult<Connection> {
    let mut connection = Connection::establish(url).map_err(|e| format!(
        "Unable to connect to {url:?} database: {e}"))?;

    connection.run_pending_migrations(MIGRATIONS).map_err(|e| format!(
        "Failed to prepare the database: {e}"))?;

    Ok(connection)
}

#[cfg(test)]
pub fn new_temporary() -> (NamedTempFile, Connection) {
    let database = NamedTempFile::new().unwrap();
    let connection = connect(database.path().to_str().unwrap()).unwrap();
    (database, connection)
}
