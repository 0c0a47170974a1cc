use crate::config::ParsingConfig;
use crate::error::CutoffError;
use regex::Regex;

/// A line-level token inside a stage block, in encounter order
#[derive(Debug, Clone, PartialEq)]
pub enum TableToken {
    /// Bare number outside parentheses
    Number(String),
    /// Content of a parenthesized number
    Percentile(String),
}

/// Every regex the parser needs, compiled once from a `ParsingConfig`.
///
/// Immutable after construction and shared by reference across all stages.
#[derive(Debug, Clone)]
pub struct PatternSet {
    college_header: Regex,
    branch_header: Regex,
    branch_boundary: Regex,
    status: Regex,
    category: Regex,
    stage: Regex,
    table_token: Regex,
    status_marker: String,
    anchor_phrase: String,
}

fn compile(pattern: String) -> Result<Regex, CutoffError> {
    Regex::new(&pattern).map_err(|e| CutoffError::InvalidPattern {
        reason: e.to_string(),
        pattern,
    })
}

impl PatternSet {
    pub fn new(config: &ParsingConfig) -> Result<Self, CutoffError> {
        let separators = config
            .headers
            .separators
            .iter()
            .map(|s| regex::escape(s))
            .collect::<Vec<_>>()
            .join("|");
        let college_digits = config.headers.college_code_digits;
        let branch_digits = config.headers.branch_code_digits;

        // Words of the qualifier may be split by any whitespace after extraction
        let qualifier = config
            .stages
            .non_pwd_qualifier
            .split_whitespace()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(r"\s+");
        let prefix = regex::escape(config.stages.stage_prefix.trim());

        Ok(Self {
            college_header: compile(format!(
                r"^(\d{{{college_digits}}})\s*(?:{separators})\s*(.+)$"
            ))?,
            branch_header: compile(format!(
                r"^(\d{{{branch_digits}}})\s*(?:{separators})\s*(.+)$"
            ))?,
            branch_boundary: compile(format!(r"^\d{{{branch_digits}}}(?:[^0-9]|$)"))?,
            status: compile(format!(
                r"{}\s*(.+)",
                regex::escape(&config.table.status_marker)
            ))?,
            category: compile(r"\b[A-Z][A-Z0-9]{3,5}\b".to_string())?,
            stage: compile(format!(
                r"\b(?:{prefix}\s*)?([IVX]+)(?:\s*-\s*{qualifier})?\b"
            ))?,
            table_token: compile(
                r"\(\s*(?P<pct>[0-9.]+)\s*\)|(?P<num>\b[0-9]+(?:\.[0-9]+)?\b)".to_string(),
            )?,
            status_marker: config.table.status_marker.clone(),
            anchor_phrase: config.table.anchor_phrase.clone(),
        })
    }

    /// `(code, name)` of a college header line
    pub fn college_header(&self, line: &str) -> Option<(String, String)> {
        Self::header(&self.college_header, line)
    }

    /// `(code, name)` of a branch header line
    pub fn branch_header(&self, line: &str) -> Option<(String, String)> {
        Self::header(&self.branch_header, line)
    }

    fn header(regex: &Regex, line: &str) -> Option<(String, String)> {
        let caps = regex.captures(line.trim())?;
        let code = caps.get(1)?.as_str().to_string();
        let name = caps.get(2)?.as_str().trim();
        if name.is_empty() {
            return None;
        }
        Some((code, name.to_string()))
    }

    /// Any line opening with a branch-width code, separator or not
    pub fn is_branch_boundary(&self, line: &str) -> bool {
        self.branch_boundary.is_match(line.trim())
    }

    pub fn is_status_line(&self, line: &str) -> bool {
        line.contains(&self.status_marker)
    }

    pub fn status(&self, line: &str) -> Option<String> {
        let caps = self.status.captures(line)?;
        let status = caps.get(1)?.as_str().trim();
        (!status.is_empty()).then(|| status.to_string())
    }

    pub fn is_anchor(&self, line: &str) -> bool {
        line.contains(&self.anchor_phrase)
    }

    /// Category codes on a line, in column order
    pub fn categories(&self, line: &str) -> Vec<String> {
        self.category
            .find_iter(line)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// True when every whitespace-separated word of the line is a category code
    pub fn is_category_only_line(&self, line: &str) -> bool {
        let mut words = line.split_whitespace().peekable();
        words.peek().is_some()
            && words.all(|word| {
                self.category
                    .find(word)
                    .is_some_and(|m| m.start() == 0 && m.end() == word.len())
            })
    }

    /// Roman numeral of the first stage token on the line
    pub fn stage(&self, line: &str) -> Option<String> {
        self.stage
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Rank and percentile candidates in left-to-right order
    pub fn table_tokens(&self, line: &str) -> Vec<TableToken> {
        self.table_token
            .captures_iter(line)
            .filter_map(|caps| {
                if let Some(pct) = caps.name("pct") {
                    Some(TableToken::Percentile(pct.as_str().to_string()))
                } else {
                    caps.name("num")
                        .map(|num| TableToken::Number(num.as_str().to_string()))
                }
            })
            .collect()
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::new(&ParsingConfig::default()).expect("Default patterns must compile")
    }
}
