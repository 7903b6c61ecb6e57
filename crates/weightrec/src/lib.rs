//! `weightrec` - Record dated weigh-ins and view them as a trend
//!
//! This library provides the record store adapter (MongoDB, with a SQLite
//! backend behind the same contract), the view builder that sorts, filters
//! and smooths entries for display, and the session type tying both together
//! with a cache.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cache;
pub mod cli;
pub mod config;
pub mod entry;
pub mod error;
pub mod logging;
pub mod store;
pub mod tracker;
pub mod view;

pub use cache::EntryCache;
pub use config::Config;
pub use entry::{EntryId, NewEntry, SportsActivity, WeightEntry};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use store::{connect, Handle, RecordStore};
pub use tracker::Tracker;
pub use view::Dashboard;
