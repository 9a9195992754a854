//! SQLite pool shared by the dashboard and the worker.
//!
//! Both binaries write to the same file (the worker records crawl results and
//! follow-up sends while the server handles requests), so every pooled
//! connection runs in WAL mode and waits on locks instead of failing.

use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError, PooledConnection};
use diesel::sqlite::SqliteConnection;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

const LOCK_WAIT: Duration = Duration::from_secs(30);

/// Pragmas run on every connection handed out by the pool.
#[derive(Debug, Clone)]
pub struct SqlitePragmas {
    pub wal: bool,
    /// Cascading deletes (templates to rules, companies to appointments) rely on this.
    pub foreign_keys: bool,
    pub lock_wait: Option<Duration>,
}

impl Default for SqlitePragmas {
    fn default() -> Self {
        Self {
            wal: true,
            foreign_keys: true,
            lock_wait: Some(LOCK_WAIT),
        }
    }
}

impl SqlitePragmas {
    fn statements(&self) -> String {
        let mut sql = String::new();
        if self.wal {
            sql.push_str("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;");
        }
        if self.foreign_keys {
            sql.push_str("PRAGMA foreign_keys = ON;");
        }
        if let Some(wait) = self.lock_wait {
            sql.push_str(&format!("PRAGMA busy_timeout = {};", wait.as_millis()));
        }
        sql
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        let sql = self.statements();
        if sql.is_empty() {
            return Ok(());
        }
        conn.batch_execute(&sql)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Opens the pool for `database_url` with the default pragmas.
pub fn establish_connection_pool(database_url: &str) -> Result<DbPool, PoolError> {
    Pool::builder()
        .connection_customizer(Box::new(SqlitePragmas::default()))
        .build(ConnectionManager::<SqliteConnection>::new(database_url))
}

/// Checks a connection out of the pool, logging when none is available.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, PoolError> {
    pool.get().inspect_err(|err| {
        log::error!("No database connection available: {err}");
    })
}
