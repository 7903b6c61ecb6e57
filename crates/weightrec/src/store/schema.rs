//! `SQLite` schema definitions for the local record store.
//!
//! The table mirrors the stored document shape. `seq` only exists to keep
//! entries that share a date in insertion order.

/// SQL statement to create the entries table.
pub const CREATE_ENTRIES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS entries (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    date TEXT NOT NULL,
    weight REAL NOT NULL,
    sports_activity TEXT NOT NULL CHECK (sports_activity IN ('Yes', 'No'))
)
";

/// SQL statement to create an index on date for ordered reads.
pub const CREATE_DATE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_entries_date ON entries(date, seq)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_ENTRIES_TABLE, CREATE_DATE_INDEX];
