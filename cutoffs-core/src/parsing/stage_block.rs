use super::pairing::{bind_percentile, complete_pairs, push_rank, PairingOutcome, Slot};
use super::patterns::{PatternSet, TableToken};
use crate::config::StageConfig;
use crate::types::{LineRange, RankPercentile};
use tracing::debug;

/// Why a stage block stopped collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockBoundary {
    /// Another stage token on a later line
    NextStage(usize),
    StatusLine(usize),
    BranchHeader(usize),
    /// Lookahead window exhausted
    Lookahead,
    /// Table range exhausted before the window
    RangeEnd,
}

/// Tokens collected after one stage marker, already paired
#[derive(Debug, Clone, PartialEq)]
pub struct StageBlock {
    pub stage: String,
    pub opened_at: usize,
    pub closed_by: BlockBoundary,
    pub outcome: PairingOutcome,
    /// Rank/percentile candidates that failed numeric conversion
    pub invalid_tokens: Vec<String>,
}

impl StageBlock {
    pub fn pairs(&self) -> &[RankPercentile] {
        &self.outcome.pairs
    }
}

enum RankCandidate {
    Rank(u32),
    /// Not a rank-shaped number (decimal, wrong width)
    Ignored,
    Invalid,
}

pub struct StageBlockCollector<'a> {
    patterns: &'a PatternSet,
    config: &'a StageConfig,
}

impl<'a> StageBlockCollector<'a> {
    pub fn new(patterns: &'a PatternSet, config: &'a StageConfig) -> Self {
        Self { patterns, config }
    }

    /// Open one block per stage-token line in `table` (the lines after the
    /// category row) and collect each block independently.
    pub fn collect(&self, lines: &[String], table: LineRange) -> Vec<StageBlock> {
        let end = table.end.min(lines.len());
        let mut blocks = Vec::new();

        for index in table.start.min(end)..end {
            let line = lines[index].trim();
            if line.is_empty() {
                continue;
            }
            if let Some(stage) = self.patterns.stage(line) {
                debug!("Found stage: {stage} at line {index}");
                blocks.push(self.collect_block(lines, index, end, stage));
            }
        }

        blocks
    }

    pub fn collect_block(
        &self,
        lines: &[String],
        opened_at: usize,
        end: usize,
        stage: String,
    ) -> StageBlock {
        let end = end.min(lines.len());
        let window_end = opened_at.saturating_add(self.config.stage_lookahead).min(end);
        let mut closed_by = if window_end == end {
            BlockBoundary::RangeEnd
        } else {
            BlockBoundary::Lookahead
        };

        let mut slots: Vec<Slot> = Vec::new();
        let mut invalid_tokens = Vec::new();

        for index in opened_at..window_end {
            let line = lines[index].trim();
            if line.is_empty() {
                continue;
            }

            if index > opened_at && self.patterns.stage(line).is_some() {
                closed_by = BlockBoundary::NextStage(index);
                break;
            }
            if self.patterns.is_status_line(line) {
                closed_by = BlockBoundary::StatusLine(index);
                break;
            }
            if self.patterns.is_branch_boundary(line) {
                closed_by = BlockBoundary::BranchHeader(index);
                break;
            }

            for token in self.patterns.table_tokens(line) {
                match token {
                    TableToken::Number(raw) => match self.rank_candidate(&raw) {
                        RankCandidate::Rank(rank) => slots = push_rank(slots, rank),
                        RankCandidate::Ignored => {}
                        RankCandidate::Invalid => invalid_tokens.push(raw),
                    },
                    TableToken::Percentile(raw) => match parse_percentile(&raw) {
                        Some(value) => slots = bind_percentile(slots, value),
                        None => invalid_tokens.push(format!("({raw})")),
                    },
                }
            }
        }

        let outcome = complete_pairs(&slots);
        debug!(
            "Stage {stage}: {} slots, {} complete, closed by {closed_by:?}",
            slots.len(),
            outcome.pairs.len()
        );

        StageBlock {
            stage,
            opened_at,
            closed_by,
            outcome,
            invalid_tokens,
        }
    }

    fn rank_candidate(&self, raw: &str) -> RankCandidate {
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return RankCandidate::Ignored;
        }
        if raw.len() < self.config.rank_min_digits || raw.len() > self.config.rank_max_digits {
            return RankCandidate::Ignored;
        }
        match raw.parse::<u32>() {
            Ok(0) | Err(_) => RankCandidate::Invalid,
            Ok(rank) => RankCandidate::Rank(rank),
        }
    }
}

/// Percentile in [0, 100], or `None` when the token is not a usable number
pub fn parse_percentile(raw: &str) -> Option<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && (0.0..=100.0).contains(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    fn collect(text: &str) -> Vec<StageBlock> {
        let doc = lines(text);
        let patterns = PatternSet::default();
        let config = StageConfig::default();
        StageBlockCollector::new(&patterns, &config).collect(&doc, LineRange::new(0, doc.len()))
    }

    fn pair(rank: u32, percentile: f64) -> RankPercentile {
        RankPercentile { rank, percentile }
    }

    #[test]
    fn test_single_block_literal_row() {
        let blocks = collect("I\n33717 (88.60) 40210 (85.12) 51090 (79.00)");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].stage, "I");
        assert_eq!(
            blocks[0].pairs(),
            &[pair(33717, 88.60), pair(40210, 85.12), pair(51090, 79.00)]
        );
        assert_eq!(blocks[0].closed_by, BlockBoundary::RangeEnd);
    }

    #[test]
    fn test_tokens_split_across_lines() {
        let blocks = collect("II-Non PWD\n33717\n(88.60) 40210\n(85.12)");
        assert_eq!(blocks[0].stage, "II");
        assert_eq!(blocks[0].pairs(), &[pair(33717, 88.60), pair(40210, 85.12)]);
    }

    #[test]
    fn test_next_stage_closes_block() {
        let blocks = collect("I\n1111 (90.0)\nII\n2222 (80.0)\n3333 (70.0)");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].closed_by, BlockBoundary::NextStage(2));
        assert_eq!(blocks[0].pairs(), &[pair(1111, 90.0)]);
        assert_eq!(blocks[1].pairs(), &[pair(2222, 80.0), pair(3333, 70.0)]);
    }

    #[test]
    fn test_status_and_branch_lines_close_block() {
        let blocks = collect("I\n1111 (90.0)\nStatus: Private\n2222 (80.0)");
        assert_eq!(blocks[0].closed_by, BlockBoundary::StatusLine(2));
        assert_eq!(blocks[0].pairs().len(), 1);

        let blocks = collect("I\n1111 (90.0)\n0100229310 - Mechanical\n2222 (80.0)");
        assert_eq!(blocks[0].closed_by, BlockBoundary::BranchHeader(2));
        assert_eq!(blocks[0].pairs().len(), 1);
    }

    #[test]
    fn test_unmatched_rank_is_dropped() {
        let blocks = collect("I\n1000 2000 (90.0) 3000 (80.0)");
        assert_eq!(blocks[0].pairs(), &[pair(2000, 90.0), pair(3000, 80.0)]);
        assert_eq!(blocks[0].outcome.unpaired_ranks, 1);
    }

    #[test]
    fn test_invalid_tokens_are_dropped_not_fatal() {
        let blocks = collect("I\n1234 (9.9.9) 5678 (45.5) 9999 (120.0)");
        assert_eq!(blocks[0].pairs(), &[pair(5678, 45.5)]);
        assert_eq!(blocks[0].invalid_tokens, vec!["(9.9.9)", "(120.0)"]);
        assert_eq!(blocks[0].outcome.unpaired_ranks, 2);
    }

    #[test]
    fn test_lookahead_bounds_block() {
        let mut text = String::from("I\n");
        for _ in 0..25 {
            text.push_str("\n");
        }
        text.push_str("4444 (50.0)\n");
        let blocks = collect(&text);
        assert_eq!(blocks[0].closed_by, BlockBoundary::Lookahead);
        assert!(blocks[0].pairs().is_empty());
    }

    #[test]
    fn test_out_of_width_numbers_are_not_ranks() {
        let blocks = collect("I\n12 1234567 4321 (66.6)");
        assert_eq!(blocks[0].pairs(), &[pair(4321, 66.6)]);
        assert!(blocks[0].invalid_tokens.is_empty());
    }

    #[test]
    fn test_parse_percentile_range() {
        assert_eq!(parse_percentile("88.6037289"), Some(88.6037289));
        assert_eq!(parse_percentile("100"), Some(100.0));
        assert_eq!(parse_percentile("100.01"), None);
        assert_eq!(parse_percentile("."), None);
    }
}
