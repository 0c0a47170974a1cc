//! Text Sources
//!
//! This module provides the extraction layer that turns a report file into
//! the linearized text the parser works on.
//!
//! ## Architecture
//!
//! ```text
//! Report (PDF, TXT)
//!     ↓
//! [Format-specific TextSource]
//!     ↓
//! DocumentText (ordered lines, no page or column info)
//!     ↓
//! [CutoffParser]
//!     ↓
//! ParseResult
//! ```
//!
//! ## Available Sources
//!
//! - `PdfTextSource` - PDF reports via pdf-extract (pdf-backend feature)
//! - `PlainTextSource` - text already extracted by another tool

pub mod source;
#[cfg(feature = "pdf-backend")]
pub mod pdf;
pub mod plain_text;

// Re-export main types
pub use source::{TextSource, TextSourceImpl};
pub use plain_text::PlainTextSource;

#[cfg(feature = "pdf-backend")]
pub use pdf::PdfTextSource;
