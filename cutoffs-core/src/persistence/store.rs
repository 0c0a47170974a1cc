use anyhow::Result;

pub type CollegeId = i64;
pub type CourseId = i64;

/// What `upsert_cutoff` did to the row for `(course, year, category)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated { old: u32 },
    Unchanged,
}

/// Relational sink for parsed cutoffs
pub trait CutoffStore {
    fn begin(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;

    /// Exact name match, else substring match, else a placeholder college
    fn find_or_create_college(&mut self, name: &str) -> Result<CollegeId>;

    /// Exact name match within the college, else a new course
    fn find_or_create_course(&mut self, college: CollegeId, name: &str) -> Result<CourseId>;

    /// Insert or overwrite the rank stored for `(course, year, category)`
    fn upsert_cutoff(&mut self, course: CourseId, year: i32, category: &str, rank: u32) -> Result<UpsertOutcome>;
}
