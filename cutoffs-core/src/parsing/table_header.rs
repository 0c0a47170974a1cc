// Status line and category-row location within one branch section.
//
// Both lookups are expected to come up empty for some branches: a missing
// anchor or category row means the branch published no cutoffs.

use super::patterns::PatternSet;
use crate::config::TableConfig;
use crate::types::LineRange;

/// Ordered category codes that define the columns of a branch's table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryHeader {
    /// Index of the category row
    pub line: usize,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableLocation {
    Located(CategoryHeader),
    /// No anchor phrase in the section
    NoAnchor,
    /// Anchor found but no category row within the lookahead window
    NoCategoryRow { anchor_line: usize },
}

impl TableLocation {
    pub fn header(&self) -> Option<&CategoryHeader> {
        match self {
            TableLocation::Located(header) => Some(header),
            _ => None,
        }
    }
}

/// First status line in the branch body (header line excluded)
pub fn extract_status(patterns: &PatternSet, lines: &[String], branch: LineRange) -> Option<String> {
    let body = branch.body();
    let end = body.end.min(lines.len());
    lines[body.start.min(end)..end]
        .iter()
        .find_map(|line| patterns.status(line))
}

pub fn locate_category_header(
    patterns: &PatternSet,
    config: &TableConfig,
    lines: &[String],
    branch: LineRange,
) -> TableLocation {
    let end = branch.end.min(lines.len());
    let Some(anchor_line) = (branch.start..end).find(|&i| patterns.is_anchor(&lines[i])) else {
        return TableLocation::NoAnchor;
    };

    let window_end = (anchor_line + 1 + config.category_lookahead).min(end);
    for index in anchor_line + 1..window_end {
        let line = lines[index].trim();
        if line.is_empty() {
            continue;
        }

        let categories = patterns.categories(line);
        let qualifies = categories.len() >= config.min_category_tokens
            || (categories.len() >= config.min_full_line_categories
                && patterns.is_category_only_line(line));
        if qualifies {
            return TableLocation::Located(CategoryHeader {
                line: index,
                categories,
            });
        }
    }

    TableLocation::NoCategoryRow { anchor_line }
}
