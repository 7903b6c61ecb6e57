//! Local `SQLite` record store.
//!
//! Keeps the same contract as the MongoDB backend: ids are generated
//! object ids, dates are stored as `YYYY-MM-DD` text and the activity flag
//! as `Yes`/`No`. Useful offline and as the store tests run against.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::entry::{parse_date, EntryId, NewEntry, WeightEntry, DATE_FORMAT};
use crate::error::{Error, Result};

use super::document::check_weight;
use super::schema::SCHEMA_STATEMENTS;
use super::RecordStore;

/// `SQLite`-backed record store.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a store database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema
    /// cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn ping(&self) -> Result<()> {
        self.conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    fn insert(&self, entry: &NewEntry) -> Result<EntryId> {
        let weight = check_weight(entry.weight)?;
        let id = EntryId::generate();

        self.conn.execute(
            r"
            INSERT INTO entries (id, date, weight, sports_activity)
            VALUES (?1, ?2, ?3, ?4)
            ",
            params![
                id.to_string(),
                entry.date.format(DATE_FORMAT).to_string(),
                weight,
                entry.sports_activity.as_str(),
            ],
        )?;

        Ok(id)
    }

    fn fetch_all(&self) -> Result<Vec<WeightEntry>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, date, weight, sports_activity
            FROM entries ORDER BY date ASC, seq ASC
            ",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, date, weight, activity)| {
                Ok(WeightEntry {
                    id: id
                        .parse()
                        .map_err(|_| Error::invalid_document(format!("stored id {id:?} is malformed")))?,
                    date: parse_date(&date)?,
                    weight,
                    sports_activity: activity.parse()?,
                })
            })
            .collect()
    }

    fn delete(&self, id: &EntryId) -> Result<u64> {
        let affected = self
            .conn
            .execute("DELETE FROM entries WHERE id = ?1", [id.to_string()])?;
        Ok(u64::try_from(affected).unwrap_or(u64::MAX))
    }

    fn update_weight(&self, id: &EntryId, weight: f64) -> Result<u64> {
        let affected = self.conn.execute(
            "UPDATE entries SET weight = ?2 WHERE id = ?1 AND weight <> ?2",
            params![id.to_string(), weight],
        )?;
        Ok(u64::try_from(affected).unwrap_or(u64::MAX))
    }
}

/// Create the entries table and its index if they don't exist.
fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }
    Ok(())
}
