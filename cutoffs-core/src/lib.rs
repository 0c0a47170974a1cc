// Cutoffs Core Library
//
// Recovers per-college, per-branch cutoff tables from the linearized text of
// seat-allotment cutoff reports, and optionally folds them into a database.

pub mod types;
pub mod error;
pub mod config;
pub mod parsing;
pub mod parser;
pub mod sources;
pub mod serialization;
pub mod cache;
pub mod storage;
pub mod processor;
pub mod persistence;

// Re-export main types and functions for easy use
pub use types::*;
pub use error::CutoffError;
pub use config::ParsingConfig;
pub use parser::CutoffParser;
pub use processor::CutoffProcessor;
pub use serialization::ParseDocument;
pub use sources::{PlainTextSource, TextSource, TextSourceImpl};
pub use persistence::{CutoffStore, MigrationSummary, Migrator, SqliteStore};

#[cfg(feature = "pdf-backend")]
pub use sources::PdfTextSource;
