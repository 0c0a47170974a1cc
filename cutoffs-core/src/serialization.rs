// JSON output document for a ParseResult
//
// The in-memory model keeps typed optionals and short field names; the
// emitted document uses the flat key layout downstream tools consume.

use crate::types::*;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseDocument {
    pub colleges: Vec<CollegeDocument>,
    pub total_colleges: usize,
    pub total_branches: usize,
    pub total_cutoffs: usize,
    pub parsing_success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    /// Present only when parsing absorbed lossy edge cases
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub diagnostics: Option<ParseDiagnostics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeDocument {
    pub college_code: String,
    pub college_name: String,
    pub branches: Vec<BranchDocument>,
    pub total_branches: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchDocument {
    pub branch_code: String,
    pub branch_name: String,
    pub status: String,
    pub cutoff_data: Vec<CutoffDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutoffDocument {
    pub stage: String,
    pub category: String,
    pub rank: u32,
    pub percentage: f64,
}

impl From<&CutoffEntry> for CutoffDocument {
    fn from(entry: &CutoffEntry) -> Self {
        Self {
            stage: entry.stage.clone(),
            category: entry.category.clone(),
            rank: entry.rank,
            percentage: entry.percentile,
        }
    }
}

impl From<&BranchRecord> for BranchDocument {
    fn from(branch: &BranchRecord) -> Self {
        Self {
            branch_code: branch.code.clone(),
            branch_name: branch.name.clone(),
            status: branch.status_or_unknown().to_string(),
            cutoff_data: branch.cutoffs.iter().map(CutoffDocument::from).collect(),
        }
    }
}

impl From<&CollegeRecord> for CollegeDocument {
    fn from(college: &CollegeRecord) -> Self {
        Self {
            college_code: college.code.clone(),
            college_name: college.name.clone(),
            branches: college.branches.iter().map(BranchDocument::from).collect(),
            total_branches: college.branches.len(),
        }
    }
}

impl ParseResult {
    pub fn to_document(&self) -> ParseDocument {
        ParseDocument {
            colleges: self.colleges.iter().map(CollegeDocument::from).collect(),
            total_colleges: self.totals.college_count,
            total_branches: self.totals.branch_count,
            total_cutoffs: self.totals.cutoff_count,
            parsing_success: self.success,
            error: self.error.clone(),
            diagnostics: (!self.diagnostics.is_clean()).then(|| self.diagnostics.clone()),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_document())
            .context("Failed to serialize parse result")
    }

    /// Write the pretty-printed JSON document to `path`, replacing any
    /// existing file.
    pub fn save_to_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json_pretty()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?;
        info!("Saved parse result to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CutoffError;

    fn sample() -> ParseResult {
        let college = CollegeRecord {
            code: "01002".to_string(),
            name: "Govt College, City".to_string(),
            branches: vec![BranchRecord {
                code: "0100219110".to_string(),
                name: "Civil Engineering".to_string(),
                status: None,
                cutoffs: vec![CutoffEntry {
                    stage: "I".to_string(),
                    category: "GOPENS".to_string(),
                    rank: 500,
                    percentile: 90.1,
                }],
            }],
        };
        ParseResult::success(vec![college], ParseDiagnostics::default())
    }

    #[test]
    fn test_document_keys() {
        let value = serde_json::to_value(sample().to_document()).unwrap();

        assert_eq!(value["total_colleges"], 1);
        assert_eq!(value["total_branches"], 1);
        assert_eq!(value["total_cutoffs"], 1);
        assert_eq!(value["parsing_success"], true);
        assert!(value.get("error").is_none());
        assert!(value.get("diagnostics").is_none());

        let college = &value["colleges"][0];
        assert_eq!(college["college_code"], "01002");
        assert_eq!(college["total_branches"], 1);

        let branch = &college["branches"][0];
        assert_eq!(branch["branch_code"], "0100219110");
        assert_eq!(branch["status"], "Unknown");

        let cutoff = &branch["cutoff_data"][0];
        assert_eq!(cutoff["stage"], "I");
        assert_eq!(cutoff["category"], "GOPENS");
        assert_eq!(cutoff["rank"], 500);
        assert_eq!(cutoff["percentage"], 90.1);
    }

    #[test]
    fn test_failure_document_carries_error() {
        let result = ParseResult::failure(&CutoffError::NoCollegesFound);
        let value = serde_json::to_value(result.to_document()).unwrap();

        assert_eq!(value["parsing_success"], false);
        assert_eq!(value["error"], "Could not extract any colleges from PDF");
        assert_eq!(value["colleges"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_diagnostics_emitted_when_present() {
        let mut result = sample();
        result.diagnostics.push(ParseWarning::OrphanPercentiles {
            branch: "0100219110".to_string(),
            stage: "I".to_string(),
            count: 2,
        });
        let value = serde_json::to_value(result.to_document()).unwrap();
        assert_eq!(value["diagnostics"]["dropped_orphan_percentiles"], 2);
        assert_eq!(value["diagnostics"]["warnings"][0]["kind"], "orphan_percentiles");
    }
}
