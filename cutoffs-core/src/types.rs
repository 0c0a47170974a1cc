use serde::{Deserialize, Serialize};

use crate::error::CutoffError;

// ===== INPUT =====

/// The full linearized text of one report, split into lines.
///
/// Built once per invocation and never mutated; every range produced by the
/// segmenters indexes into this line sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentText {
    lines: Vec<String>,
}

impl DocumentText {
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True when the text carries no visible characters at all
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }

    pub fn full_range(&self) -> LineRange {
        LineRange::new(0, self.lines.len())
    }
}

/// Half-open range of line indices `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Zero for inverted ranges built as literals
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Range with the first (header) line removed
    pub fn body(&self) -> LineRange {
        LineRange::new((self.start + 1).min(self.end), self.end)
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }
}

// ===== RECOVERED TABLE =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeRecord {
    /// Five digit college code
    pub code: String,
    pub name: String,
    /// Branches in order of first appearance
    pub branches: Vec<BranchRecord>,
}

impl CollegeRecord {
    pub fn cutoff_count(&self) -> usize {
        self.branches.iter().map(|b| b.cutoffs.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchRecord {
    /// Ten digit branch code
    pub code: String,
    pub name: String,
    /// Free-text status line, `None` when the section carries none
    pub status: Option<String>,
    pub cutoffs: Vec<CutoffEntry>,
}

impl BranchRecord {
    pub const UNKNOWN_STATUS: &'static str = "Unknown";

    pub fn status_or_unknown(&self) -> &str {
        self.status.as_deref().unwrap_or(Self::UNKNOWN_STATUS)
    }
}

/// One recovered table cell: the closing rank of a category in a stage.
///
/// (stage, category) is not unique within a branch; the report sometimes
/// repeats a stage and both rows are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutoffEntry {
    /// Roman numeral admission round ("I", "II", ...)
    pub stage: String,
    pub category: String,
    pub rank: u32,
    /// Always within [0, 100]
    pub percentile: f64,
}

/// A rank and percentile bound together by the pairer, before a category is
/// assigned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankPercentile {
    pub rank: u32,
    pub percentile: f64,
}

// ===== RESULT =====

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseTotals {
    pub college_count: usize,
    pub branch_count: usize,
    pub cutoff_count: usize,
}

impl ParseTotals {
    pub fn from_colleges(colleges: &[CollegeRecord]) -> Self {
        Self {
            college_count: colleges.len(),
            branch_count: colleges.iter().map(|c| c.branches.len()).sum(),
            cutoff_count: colleges.iter().map(CollegeRecord::cutoff_count).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub colleges: Vec<CollegeRecord>,
    pub totals: ParseTotals,
    pub success: bool,
    pub error: Option<String>,
    /// Lossy edge cases absorbed during parsing. Never affects `success`.
    #[serde(default)]
    pub diagnostics: ParseDiagnostics,
}

impl ParseResult {
    pub fn success(colleges: Vec<CollegeRecord>, diagnostics: ParseDiagnostics) -> Self {
        Self {
            totals: ParseTotals::from_colleges(&colleges),
            colleges,
            success: true,
            error: None,
            diagnostics,
        }
    }

    /// Whole-document failure: no partial colleges are carried
    pub fn failure(error: &CutoffError) -> Self {
        Self {
            colleges: Vec::new(),
            totals: ParseTotals::default(),
            success: false,
            error: Some(error.to_string()),
            diagnostics: ParseDiagnostics::default(),
        }
    }

    pub fn branches(&self) -> impl Iterator<Item = (&CollegeRecord, &BranchRecord)> {
        self.colleges
            .iter()
            .flat_map(|college| college.branches.iter().map(move |branch| (college, branch)))
    }
}

// ===== DIAGNOSTICS =====

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseDiagnostics {
    pub warnings: Vec<ParseWarning>,
    /// Percentiles that found no unpaired rank in their stage block
    pub dropped_orphan_percentiles: usize,
    /// Ranks that never received a percentile
    pub dropped_unpaired_ranks: usize,
    /// Complete pairs beyond the number of category columns
    pub overflow_pairs: usize,
    /// Rank/percentile tokens that failed numeric conversion or range checks
    pub invalid_tokens: usize,
    pub skipped_colleges: usize,
}

impl ParseDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn push(&mut self, warning: ParseWarning) {
        match &warning {
            ParseWarning::CategoryOverflow { categories, pairs, .. } => {
                self.overflow_pairs += pairs.saturating_sub(*categories);
            }
            ParseWarning::OrphanPercentiles { count, .. } => {
                self.dropped_orphan_percentiles += count;
            }
            ParseWarning::UnpairedRanks { count, .. } => self.dropped_unpaired_ranks += count,
            ParseWarning::InvalidToken { .. } => self.invalid_tokens += 1,
            ParseWarning::CollegeSkipped { .. } => self.skipped_colleges += 1,
            ParseWarning::BranchCodeMismatch { .. } => {}
        }
        self.warnings.push(warning);
    }

    pub fn merge(&mut self, other: ParseDiagnostics) {
        self.warnings.extend(other.warnings);
        self.dropped_orphan_percentiles += other.dropped_orphan_percentiles;
        self.dropped_unpaired_ranks += other.dropped_unpaired_ranks;
        self.overflow_pairs += other.overflow_pairs;
        self.invalid_tokens += other.invalid_tokens;
        self.skipped_colleges += other.skipped_colleges;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// More complete pairs than category columns; the excess was dropped
    CategoryOverflow {
        branch: String,
        stage: String,
        categories: usize,
        pairs: usize,
    },
    OrphanPercentiles {
        branch: String,
        stage: String,
        count: usize,
    },
    UnpairedRanks {
        branch: String,
        stage: String,
        count: usize,
    },
    InvalidToken {
        branch: String,
        stage: String,
        token: String,
    },
    /// Branch code does not start with its college's code. Flagged only.
    BranchCodeMismatch { college: String, branch: String },
    CollegeSkipped { college: String, reason: String },
}
