//! SQLite cutoff store
//!
//! Schema:
//! - colleges: id, name (unique), location, type, rating, facilities, packages, recruiters
//! - courses: college_id -> name, duration, annual_fee
//! - cutoffs: course_id, year, category -> cutoff_rank (unique per triple)

use super::store::{CollegeId, CourseId, CutoffStore, UpsertOutcome};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, info};

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS colleges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    location TEXT,
    type TEXT,
    rating REAL,
    facilities TEXT NOT NULL DEFAULT '[]',
    average_package INTEGER,
    highest_package INTEGER,
    top_recruiters TEXT NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS courses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    college_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    duration TEXT,
    annual_fee INTEGER,
    FOREIGN KEY (college_id) REFERENCES colleges(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS cutoffs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    course_id INTEGER NOT NULL,
    year INTEGER NOT NULL,
    category TEXT NOT NULL,
    cutoff_rank INTEGER NOT NULL,
    FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE,
    UNIQUE(course_id, year, category)
);

CREATE INDEX IF NOT EXISTS idx_colleges_name ON colleges(name);
CREATE INDEX IF NOT EXISTS idx_courses_college_id ON courses(college_id);
CREATE INDEX IF NOT EXISTS idx_cutoffs_course_year ON cutoffs(course_id, year);
";

const PLACEHOLDER_LOCATION: &str = "Unknown";
const PLACEHOLDER_TYPE: &str = "Unknown";
const DEFAULT_COURSE_DURATION: &str = "4 years";

/// A persisted cutoff row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCutoff {
    pub year: i32,
    pub category: String,
    pub rank: u32,
}

/// Database connection wrapper
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create database at path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self { conn })
    }

    /// Open in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn college_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM colleges", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn course_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM courses", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn college_location(&self, id: CollegeId) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT location FROM colleges WHERE id = ?",
                params![id],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to get college")
            .map(Option::flatten)
    }

    /// Cutoffs stored for a course, ordered by year then category
    pub fn cutoffs_for_course(&self, course: CourseId) -> Result<Vec<StoredCutoff>> {
        let mut stmt = self.conn.prepare(
            "SELECT year, category, cutoff_rank FROM cutoffs
             WHERE course_id = ?
             ORDER BY year, category",
        )?;
        let rows = stmt.query_map(params![course], |row| {
            Ok(StoredCutoff {
                year: row.get(0)?,
                category: row.get(1)?,
                rank: row.get::<_, i64>(2)? as u32,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list cutoffs")
    }

    fn find_college_exact(&self, name: &str) -> Result<Option<CollegeId>> {
        self.conn
            .query_row(
                "SELECT id FROM colleges WHERE name = ?",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to look up college by name")
    }

    fn find_college_containing(&self, name: &str) -> Result<Option<CollegeId>> {
        let like_pattern = format!("%{}%", escape_like(name));
        self.conn
            .query_row(
                "SELECT id FROM colleges WHERE name LIKE ? ESCAPE '\\' ORDER BY id LIMIT 1",
                params![like_pattern],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to search colleges by name")
    }
}

impl CutoffStore for SqliteStore {
    fn begin(&mut self) -> Result<()> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    fn find_or_create_college(&mut self, name: &str) -> Result<CollegeId> {
        if let Some(id) = self.find_college_exact(name)? {
            return Ok(id);
        }
        if let Some(id) = self.find_college_containing(name)? {
            debug!("College '{name}' matched existing college {id} by substring");
            return Ok(id);
        }

        self.conn.execute(
            "INSERT INTO colleges (name, location, type, rating, facilities, average_package, highest_package, top_recruiters)
             VALUES (?, ?, ?, 0.0, '[]', 0, 0, '[]')",
            params![name, PLACEHOLDER_LOCATION, PLACEHOLDER_TYPE],
        )?;
        info!("Created new college: {name}");
        Ok(self.conn.last_insert_rowid())
    }

    fn find_or_create_course(&mut self, college: CollegeId, name: &str) -> Result<CourseId> {
        let existing: Option<CourseId> = self
            .conn
            .query_row(
                "SELECT id FROM courses WHERE college_id = ? AND name = ?",
                params![college, name],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to look up course")?;
        if let Some(id) = existing {
            return Ok(id);
        }

        self.conn.execute(
            "INSERT INTO courses (college_id, name, duration, annual_fee) VALUES (?, ?, ?, 0)",
            params![college, name, DEFAULT_COURSE_DURATION],
        )?;
        info!("Created new course: {name} for college {college}");
        Ok(self.conn.last_insert_rowid())
    }

    fn upsert_cutoff(&mut self, course: CourseId, year: i32, category: &str, rank: u32) -> Result<UpsertOutcome> {
        let existing: Option<(i64, i64)> = self
            .conn
            .query_row(
                "SELECT id, cutoff_rank FROM cutoffs WHERE course_id = ? AND year = ? AND category = ?",
                params![course, year, category],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .context("Failed to look up cutoff")?;

        match existing {
            Some((_, old)) if old == i64::from(rank) => Ok(UpsertOutcome::Unchanged),
            Some((id, old)) => {
                self.conn.execute(
                    "UPDATE cutoffs SET cutoff_rank = ? WHERE id = ?",
                    params![rank, id],
                )?;
                info!("Updated cutoff for course {course} ({category}): {old} -> {rank}");
                Ok(UpsertOutcome::Updated { old: old as u32 })
            }
            None => {
                self.conn.execute(
                    "INSERT INTO cutoffs (course_id, year, category, cutoff_rank) VALUES (?, ?, ?, ?)",
                    params![course, year, category, rank],
                )?;
                debug!("Added cutoff for course {course} ({category}): {rank}");
                Ok(UpsertOutcome::Inserted)
            }
        }
    }
}

/// Escape LIKE wildcards so a name matches only as a literal substring
fn escape_like(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
