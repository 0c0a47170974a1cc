//! Persistence
//!
//! Folds parsed cutoff tables into a relational store of colleges, courses
//! and per-year cutoff ranks.
//!
//! ```text
//! ParseResult
//!     ↓
//! [Migrator] (one transaction per college)
//!     ↓
//! CutoffStore (colleges → courses → cutoffs)
//! ```
//!
//! Stage and percentile are not persisted; a stored cutoff is keyed by
//! `(course, year, category)` and holds the last rank written for it.

pub mod migrator;
pub mod sqlite;
pub mod store;

pub use migrator::{MigrationSummary, Migrator};
pub use sqlite::{SqliteStore, StoredCutoff};
pub use store::{CollegeId, CourseId, CutoffStore, UpsertOutcome};
