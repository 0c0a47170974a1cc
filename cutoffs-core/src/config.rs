use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

// Default value functions for serde
fn default_college_code_digits() -> usize {
    5
}

fn default_branch_code_digits() -> usize {
    10
}

fn default_header_separators() -> Vec<String> {
    vec!["-".to_string(), "–".to_string()]
}

fn default_status_marker() -> String {
    "Status:".to_string()
}

fn default_anchor_phrase() -> String {
    "State Level".to_string()
}

fn default_category_lookahead() -> usize {
    4 // Lines after the anchor searched for the category row
}

fn default_min_category_tokens() -> usize {
    3
}

fn default_min_full_line_categories() -> usize {
    2 // A row made only of codes may be shorter than min_category_tokens
}

fn default_stage_lookahead() -> usize {
    20 // Lines scanned per stage block, opening line included
}

fn default_stage_prefix() -> String {
    "Stage".to_string()
}

fn default_non_pwd_qualifier() -> String {
    "Non PWD".to_string()
}

fn default_rank_min_digits() -> usize {
    3
}

fn default_rank_max_digits() -> usize {
    6
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsingConfig {
    #[serde(default)]
    pub headers: HeaderConfig,
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub stages: StageConfig,
}

/// College and branch header recognition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderConfig {
    /// Exact width of the leading college code
    #[serde(default = "default_college_code_digits")]
    pub college_code_digits: usize,
    /// Exact width of the leading branch code
    #[serde(default = "default_branch_code_digits")]
    pub branch_code_digits: usize,
    /// Literal separators allowed between a code and its name
    #[serde(default = "default_header_separators")]
    pub separators: Vec<String>,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            college_code_digits: default_college_code_digits(),
            branch_code_digits: default_branch_code_digits(),
            separators: default_header_separators(),
        }
    }
}

/// Status line and category-row location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(default = "default_status_marker")]
    pub status_marker: String,
    /// Literal phrase that anchors a branch's cutoff table
    #[serde(default = "default_anchor_phrase")]
    pub anchor_phrase: String,
    #[serde(default = "default_category_lookahead")]
    pub category_lookahead: usize,
    /// Category codes a mixed line needs to count as the category row
    #[serde(default = "default_min_category_tokens")]
    pub min_category_tokens: usize,
    /// Category codes a line made only of codes needs
    #[serde(default = "default_min_full_line_categories")]
    pub min_full_line_categories: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            status_marker: default_status_marker(),
            anchor_phrase: default_anchor_phrase(),
            category_lookahead: default_category_lookahead(),
            min_category_tokens: default_min_category_tokens(),
            min_full_line_categories: default_min_full_line_categories(),
        }
    }
}

/// Stage-block collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(default = "default_stage_lookahead")]
    pub stage_lookahead: usize,
    /// Optional word before the roman numeral ("Stage I")
    #[serde(default = "default_stage_prefix")]
    pub stage_prefix: String,
    /// Qualifier that may follow the numeral ("I-Non PWD")
    #[serde(default = "default_non_pwd_qualifier")]
    pub non_pwd_qualifier: String,
    #[serde(default = "default_rank_min_digits")]
    pub rank_min_digits: usize,
    #[serde(default = "default_rank_max_digits")]
    pub rank_max_digits: usize,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            stage_lookahead: default_stage_lookahead(),
            stage_prefix: default_stage_prefix(),
            non_pwd_qualifier: default_non_pwd_qualifier(),
            rank_min_digits: default_rank_min_digits(),
            rank_max_digits: default_rank_max_digits(),
        }
    }
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            headers: HeaderConfig::default(),
            table: TableConfig::default(),
            stages: StageConfig::default(),
        }
    }
}

impl ParsingConfig {
    /// Load config from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: ParsingConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                warn!("Failed to load config from {p}, using defaults: {e:#}");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.headers.college_code_digits == 0 || self.headers.branch_code_digits == 0 {
            anyhow::bail!("header code widths must be positive");
        }
        if self.headers.college_code_digits == self.headers.branch_code_digits {
            anyhow::bail!("college and branch code widths must differ");
        }
        if self.headers.separators.is_empty() {
            anyhow::bail!("at least one header separator is required");
        }
        if self.stages.rank_min_digits == 0
            || self.stages.rank_min_digits > self.stages.rank_max_digits
        {
            anyhow::bail!(
                "invalid rank digit bounds {}..={}",
                self.stages.rank_min_digits,
                self.stages.rank_max_digits
            );
        }
        // u32 ranks
        if self.stages.rank_max_digits > 9 {
            anyhow::bail!("rank_max_digits cannot exceed 9");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_report_layout() {
        let config = ParsingConfig::default();
        assert_eq!(config.headers.college_code_digits, 5);
        assert_eq!(config.headers.branch_code_digits, 10);
        assert_eq!(config.table.anchor_phrase, "State Level");
        assert_eq!(config.table.category_lookahead, 4);
        assert_eq!(config.stages.stage_lookahead, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "stages:\n  stage_lookahead: 30\n";
        let config: ParsingConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.stages.stage_lookahead, 30);
        assert_eq!(config.stages.rank_min_digits, 3);
        assert_eq!(config.table, TableConfig::default());
    }

    #[test]
    fn test_rejects_inverted_rank_bounds() {
        let mut config = ParsingConfig::default();
        config.stages.rank_min_digits = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_with_fallback_on_missing_file() {
        let config = ParsingConfig::load_with_fallback(Some("/nonexistent/cutoffs.yaml"));
        assert_eq!(config, ParsingConfig::default());
    }

    #[test]
    fn test_shipped_default_config_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../configs/default.yaml");
        assert_eq!(ParsingConfig::load_from_file(path).unwrap(), ParsingConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parsing.yaml");
        std::fs::write(&path, "table:\n  anchor_phrase: \"All India\"\n").unwrap();

        let config = ParsingConfig::load_from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.table.anchor_phrase, "All India");
        assert_eq!(config.table.status_marker, "Status:");
    }
}
