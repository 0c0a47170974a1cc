use super::store::{CutoffStore, UpsertOutcome};
use crate::parser::CutoffParser;
use crate::sources::TextSource;
use crate::types::{CollegeRecord, ParseResult};
use anyhow::{anyhow, Result};
use std::path::Path;
use tracing::{error, info};

/// Counters for one migration run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub colleges: usize,
    pub branches: usize,
    pub cutoffs_inserted: usize,
    pub cutoffs_updated: usize,
    pub cutoffs_unchanged: usize,
    /// Colleges whose transaction was rolled back
    pub failed_colleges: usize,
}

impl MigrationSummary {
    pub fn cutoffs_written(&self) -> usize {
        self.cutoffs_inserted + self.cutoffs_updated + self.cutoffs_unchanged
    }
}

#[derive(Default)]
struct CollegeCounts {
    branches: usize,
    inserted: usize,
    updated: usize,
    unchanged: usize,
}

/// Drives a parse result into a `CutoffStore`, one transaction per college
pub struct Migrator<S: CutoffStore> {
    parser: CutoffParser,
    store: S,
}

impl<S: CutoffStore> Migrator<S> {
    pub fn new(parser: CutoffParser, store: S) -> Self {
        Self { parser, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Extract the report at `path` and migrate it for `year`
    pub fn migrate_source(&mut self, source: &dyn TextSource, path: &Path, year: i32) -> Result<MigrationSummary> {
        info!("Starting migration from {} for year {year}", path.display());
        let text = source.extract_text(path)?;
        self.migrate_text(&text, year)
    }

    pub fn migrate_text(&mut self, text: &str, year: i32) -> Result<MigrationSummary> {
        let result = self.parser.parse_text(text);
        self.migrate_result(&result, year)
    }

    /// Fails only when the parse itself failed; a college that cannot be
    /// written is rolled back and counted, and the run continues.
    pub fn migrate_result(&mut self, result: &ParseResult, year: i32) -> Result<MigrationSummary> {
        if !result.success {
            let reason = result.error.as_deref().unwrap_or("unknown parse failure");
            return Err(anyhow!("Parsing failed: {reason}"));
        }
        info!("Found {} colleges in report", result.colleges.len());

        let mut summary = MigrationSummary::default();
        let total = result.colleges.len();

        for (idx, college) in result.colleges.iter().enumerate() {
            match self.migrate_college(college, year) {
                Ok(counts) => {
                    summary.colleges += 1;
                    summary.branches += counts.branches;
                    summary.cutoffs_inserted += counts.inserted;
                    summary.cutoffs_updated += counts.updated;
                    summary.cutoffs_unchanged += counts.unchanged;
                    info!("Processed college {}/{total}: {}", idx + 1, college.name);
                }
                Err(e) => {
                    error!("Error processing college {}: {e:#}", college.name);
                    if let Err(rollback_err) = self.store.rollback() {
                        error!("Rollback failed for college {}: {rollback_err:#}", college.name);
                    }
                    summary.failed_colleges += 1;
                }
            }
        }

        info!(
            "Migration completed: {} colleges, {} branches, {} cutoffs ({} new, {} updated), {} failed",
            summary.colleges,
            summary.branches,
            summary.cutoffs_written(),
            summary.cutoffs_inserted,
            summary.cutoffs_updated,
            summary.failed_colleges
        );
        Ok(summary)
    }

    fn migrate_college(&mut self, college: &CollegeRecord, year: i32) -> Result<CollegeCounts> {
        self.store.begin()?;
        let college_id = self.store.find_or_create_college(&college.name)?;
        let mut counts = CollegeCounts::default();

        for branch in &college.branches {
            let course_id = self.store.find_or_create_course(college_id, &branch.name)?;
            counts.branches += 1;

            for cutoff in &branch.cutoffs {
                match self.store.upsert_cutoff(course_id, year, &cutoff.category, cutoff.rank)? {
                    UpsertOutcome::Inserted => counts.inserted += 1,
                    UpsertOutcome::Updated { .. } => counts.updated += 1,
                    UpsertOutcome::Unchanged => counts.unchanged += 1,
                }
            }
        }

        self.store.commit()?;
        Ok(counts)
    }
}
