/*!
 * Database connection management.
 *
 * The podcast library database belongs to another application, so it is
 * opened read-only. Access goes through a shared mutex, with an async
 * helper that runs queries on tokio's blocking pool.
 */

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Tables the metadata queries rely on
pub const REQUIRED_TABLES: [&str; 2] = ["ZMTEPISODE", "ZMTPODCAST"];

/// Database connection wrapper with thread-safe access
#[derive(Clone)]
pub struct DatabaseConnection {
    /// Path to the database file
    db_path: PathBuf,
    /// Thread-safe connection wrapped in Arc<Mutex>
    connection: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Open an existing database file without write access
    pub fn open_read_only<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if !db_path.is_file() {
            return Err(anyhow!("Database not found at: {:?}", db_path));
        }

        info!("Opening database at: {:?}", db_path);

        let conn = Connection::open_with_flags(
            &db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open database: {:?}", db_path))?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        debug!("Creating in-memory database");

        let conn =
            Connection::open_in_memory().context("Failed to create in-memory database")?;

        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Run `f` with the connection locked.
    ///
    /// Blocks the calling thread; async callers use [`Self::execute_async`].
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        with_locked(&self.connection, f)
    }

    /// Run `f` on tokio's blocking pool
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let connection = Arc::clone(&self.connection);

        tokio::task::spawn_blocking(move || with_locked(&connection, f))
            .await
            .context("Database task panicked")?
    }

    /// Fail unless every table in [`REQUIRED_TABLES`] exists
    pub fn verify_tables(&self) -> Result<()> {
        self.execute(|conn| {
            for table in REQUIRED_TABLES {
                let count: i64 = conn
                    .query_row(
                        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                        [table],
                        |row| row.get(0),
                    )
                    .with_context(|| format!("Failed to check for table {}", table))?;

                if count == 0 {
                    return Err(anyhow!(
                        "Database {:?} has no {} table; is this a podcast library?",
                        self.db_path,
                        table
                    ));
                }
            }
            Ok(())
        })
    }
}

fn with_locked<F, T>(connection: &Mutex<Connection>, f: F) -> Result<T>
where
    F: FnOnce(&Connection) -> Result<T>,
{
    let conn = connection
        .lock()
        .map_err(|e| anyhow!("Failed to acquire database lock: {}", e))?;
    f(&conn)
}
