use std::time::Duration;

use anyhow::anyhow;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;

use crate::{
    catalog::{error::CatalogError, schema},
    config::Database,
};

pub type CatalogPool = r2d2::Pool<SqliteConnectionManager>;

const POOL_SIZE: u32 = 8;

/// bounded wait for a pooled connection; on exhaustion the request fails
/// instead of queuing forever
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the catalog connection pool and makes sure the schema exists.
pub fn open_pool(config: &Database) -> Result<CatalogPool, CatalogError> {
    let manager = if config.in_memory {
        // a shared-cache URI keeps every pooled connection on the same
        // database; a plain :memory: open would give each connection its own
        SqliteConnectionManager::file("file:audiogate?mode=memory&cache=shared").with_flags(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI,
        )
    } else {
        let path = config
            .path
            .as_ref()
            .ok_or_else(|| anyhow!("database.path is required unless in_memory = true"))?;
        SqliteConnectionManager::file(path)
    };

    let pool = r2d2::Pool::builder()
        .max_size(POOL_SIZE)
        .connection_timeout(CHECKOUT_TIMEOUT)
        .build(manager)?;

    let conn = pool.get()?;
    schema::init(&conn)?;
    Ok(pool)
}
