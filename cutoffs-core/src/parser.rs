use crate::config::ParsingConfig;
use crate::error::CutoffError;
use crate::parsing::{
    assign_categories, extract_status, locate_category_header, segment_branches,
    segment_colleges, CategoryHeader, HeaderSegment, PatternSet, StageBlockCollector,
    TableLocation,
};
use crate::types::*;
use tracing::{debug, error, info, warn};

/// Stateless cutoff-table parser.
///
/// Holds its config and compiled patterns as immutable fields, so one value
/// can parse any number of documents and identical text always yields an
/// identical `ParseResult`.
#[derive(Debug, Clone)]
pub struct CutoffParser {
    config: ParsingConfig,
    patterns: PatternSet,
}

impl Default for CutoffParser {
    fn default() -> Self {
        Self::new(ParsingConfig::default()).expect("Default parsing config must compile")
    }
}

impl CutoffParser {
    pub fn new(config: ParsingConfig) -> Result<Self, CutoffError> {
        let patterns = PatternSet::new(&config)?;
        Ok(Self { config, patterns })
    }

    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn parse_text(&self, text: &str) -> ParseResult {
        self.parse_document(&DocumentText::from_text(text))
    }

    /// Parse a whole report. Structural failures become a failure result.
    pub fn parse_document(&self, document: &DocumentText) -> ParseResult {
        match self.try_parse_document(document) {
            Ok(result) => result,
            Err(e) => {
                error!("Error parsing PDF: {e}");
                ParseResult::failure(&e)
            }
        }
    }

    pub fn try_parse_document(&self, document: &DocumentText) -> Result<ParseResult, CutoffError> {
        if document.is_blank() {
            return Err(CutoffError::extraction("document text is empty"));
        }

        let lines = document.lines();
        let segments = segment_colleges(&self.patterns, lines);
        if segments.is_empty() {
            return Err(CutoffError::NoCollegesFound);
        }
        info!("Found {} college headers", segments.len());

        let mut colleges = Vec::with_capacity(segments.len());
        let mut diagnostics = ParseDiagnostics::default();

        for segment in &segments {
            let mut college_diagnostics = ParseDiagnostics::default();
            match self.parse_college(lines, segment, &mut college_diagnostics) {
                Ok(college) => {
                    info!(
                        "Found college: {} - {} with {} branches",
                        college.code,
                        college.name,
                        college.branches.len()
                    );
                    diagnostics.merge(college_diagnostics);
                    colleges.push(college);
                }
                Err(e) => {
                    // Partial warnings of a skipped college are discarded with it
                    error!("{e}");
                    diagnostics.push(ParseWarning::CollegeSkipped {
                        college: segment.code.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if colleges.is_empty() {
            return Err(CutoffError::AllCollegesFailed {
                count: segments.len(),
            });
        }

        let result = ParseResult::success(colleges, diagnostics);
        info!(
            "Parsed {} colleges, {} branches, {} cutoffs",
            result.totals.college_count, result.totals.branch_count, result.totals.cutoff_count
        );
        Ok(result)
    }

    fn parse_college(
        &self,
        lines: &[String],
        segment: &HeaderSegment,
        diagnostics: &mut ParseDiagnostics,
    ) -> Result<CollegeRecord, CutoffError> {
        // A numeric-only trailer means a stray table row matched the header shape
        if !segment.name.chars().any(char::is_alphabetic) {
            return Err(CutoffError::CollegeParseFailure {
                code: segment.code.clone(),
                reason: format!("header name '{}' has no letters", segment.name),
            });
        }

        let branches = segment_branches(&self.patterns, lines, segment.range)
            .iter()
            .map(|branch| {
                if !branch.code.starts_with(&segment.code) {
                    warn!(
                        "Branch {} does not carry college code {}",
                        branch.code, segment.code
                    );
                    diagnostics.push(ParseWarning::BranchCodeMismatch {
                        college: segment.code.clone(),
                        branch: branch.code.clone(),
                    });
                }
                self.parse_branch(lines, branch, diagnostics)
            })
            .collect();

        Ok(CollegeRecord {
            code: segment.code.clone(),
            name: segment.name.clone(),
            branches,
        })
    }

    fn parse_branch(
        &self,
        lines: &[String],
        segment: &HeaderSegment,
        diagnostics: &mut ParseDiagnostics,
    ) -> BranchRecord {
        let status = extract_status(&self.patterns, lines, segment.range);

        let cutoffs = match locate_category_header(
            &self.patterns,
            &self.config.table,
            lines,
            segment.range,
        ) {
            TableLocation::Located(header) => {
                debug!("Found categories at line {}: {:?}", header.line, header.categories);
                self.parse_table(&segment.code, lines, &header, segment.range.end, diagnostics)
            }
            TableLocation::NoAnchor => {
                debug!("No '{}' found for branch {}", self.config.table.anchor_phrase, segment.code);
                Vec::new()
            }
            TableLocation::NoCategoryRow { anchor_line } => {
                debug!(
                    "No categories found after anchor at line {anchor_line} for branch {}",
                    segment.code
                );
                Vec::new()
            }
        };

        debug!(
            "Found branch: {} - {} with {} cutoff entries",
            segment.code,
            segment.name,
            cutoffs.len()
        );

        BranchRecord {
            code: segment.code.clone(),
            name: segment.name.clone(),
            status,
            cutoffs,
        }
    }

    /// Stage blocks after `header`, up to `end`, assigned to its columns
    pub fn parse_table(
        &self,
        branch_code: &str,
        lines: &[String],
        header: &CategoryHeader,
        end: usize,
        diagnostics: &mut ParseDiagnostics,
    ) -> Vec<CutoffEntry> {
        let collector = StageBlockCollector::new(&self.patterns, &self.config.stages);
        let blocks = collector.collect(lines, LineRange::new(header.line + 1, end));

        let mut cutoffs = Vec::new();
        for block in blocks {
            for token in &block.invalid_tokens {
                debug!("Could not parse rank/percentage token {token} in stage {}", block.stage);
                diagnostics.push(ParseWarning::InvalidToken {
                    branch: branch_code.to_string(),
                    stage: block.stage.clone(),
                    token: token.clone(),
                });
            }
            if block.outcome.orphan_percentiles > 0 {
                diagnostics.push(ParseWarning::OrphanPercentiles {
                    branch: branch_code.to_string(),
                    stage: block.stage.clone(),
                    count: block.outcome.orphan_percentiles,
                });
            }
            if block.outcome.unpaired_ranks > 0 {
                diagnostics.push(ParseWarning::UnpairedRanks {
                    branch: branch_code.to_string(),
                    stage: block.stage.clone(),
                    count: block.outcome.unpaired_ranks,
                });
            }

            let assignment = assign_categories(&block.stage, &header.categories, block.pairs());
            if assignment.overflow > 0 {
                warn!(
                    "More rank-percentage pairs than categories in branch {branch_code} stage {}: {} vs {}",
                    block.stage,
                    block.pairs().len(),
                    header.categories.len()
                );
                diagnostics.push(ParseWarning::CategoryOverflow {
                    branch: branch_code.to_string(),
                    stage: block.stage.clone(),
                    categories: header.categories.len(),
                    pairs: block.pairs().len(),
                });
            }
            cutoffs.extend(assignment.entries);
        }
        cutoffs
    }

    /// Parse a bare table: the first non-empty line is taken as the category
    /// row and everything after it as stage blocks.
    pub fn parse_table_text(&self, text: &str) -> (Vec<CutoffEntry>, ParseDiagnostics) {
        let document = DocumentText::from_text(text);
        let lines = document.lines();
        let mut diagnostics = ParseDiagnostics::default();

        let Some(line) = lines.iter().position(|l| !l.trim().is_empty()) else {
            return (Vec::new(), diagnostics);
        };
        let header = CategoryHeader {
            line,
            categories: self.patterns.categories(&lines[line]),
        };
        let cutoffs = self.parse_table("", lines, &header, lines.len(), &mut diagnostics);
        (cutoffs, diagnostics)
    }
}
