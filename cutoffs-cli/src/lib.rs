// All parsing and persistence lives in cutoffs-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod runtime;

// Re-export core types for convenience
pub use cutoffs_core::*;

// Re-export CLI utilities
pub use runtime::{current_admission_year, default_cache_dir, init_tracing};
