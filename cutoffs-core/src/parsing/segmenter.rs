use super::patterns::PatternSet;
use crate::types::LineRange;
use tracing::debug;

/// A header line plus the lines it owns, up to the next header of its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSegment {
    pub code: String,
    pub name: String,
    /// Starts at the header line itself
    pub range: LineRange,
}

/// Partition the whole document into one segment per college header.
///
/// Lines before the first header belong to no college and are ignored.
pub fn segment_colleges(patterns: &PatternSet, lines: &[String]) -> Vec<HeaderSegment> {
    let segments = segment_by(lines, LineRange::new(0, lines.len()), |line| {
        patterns.college_header(line)
    });
    debug!("Found {} potential college lines", segments.len());
    segments
}

/// Partition one college's range into one segment per branch header
pub fn segment_branches(
    patterns: &PatternSet,
    lines: &[String],
    college: LineRange,
) -> Vec<HeaderSegment> {
    segment_by(lines, college, |line| patterns.branch_header(line))
}

fn segment_by<F>(lines: &[String], within: LineRange, matcher: F) -> Vec<HeaderSegment>
where
    F: Fn(&str) -> Option<(String, String)>,
{
    let end = within.end.min(lines.len());
    let headers: Vec<(usize, String, String)> = (within.start..end)
        .filter_map(|index| matcher(&lines[index]).map(|(code, name)| (index, code, name)))
        .collect();

    headers
        .iter()
        .enumerate()
        .map(|(i, (start, code, name))| {
            let next = headers.get(i + 1).map(|(index, _, _)| *index).unwrap_or(end);
            HeaderSegment {
                code: code.clone(),
                name: name.clone(),
                range: LineRange::new(*start, next),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_colleges_partition_in_header_order() {
        let doc = lines(
            "Cutoff List 2024\n\
             01002 - Govt College, Amravati\n\
             0100219110 - Civil Engineering\n\
             01005 - Sipna College\n\
             0100524210 - Computer Engineering\n\
             footer",
        );
        let patterns = PatternSet::default();
        let colleges = segment_colleges(&patterns, &doc);

        assert_eq!(colleges.len(), 2);
        assert_eq!(colleges[0].code, "01002");
        assert_eq!(colleges[0].name, "Govt College, Amravati");
        assert_eq!(colleges[0].range, LineRange::new(1, 3));
        assert_eq!(colleges[1].code, "01005");
        assert_eq!(colleges[1].range, LineRange::new(3, 6));
    }

    #[test]
    fn test_no_headers_yields_nothing() {
        let doc = lines("State Level\nGOPENS GSCS GNT3S\nI\n33717 (88.60)");
        assert!(segment_colleges(&PatternSet::default(), &doc).is_empty());
    }

    #[test]
    fn test_branches_nested_in_college_range() {
        let doc = lines(
            "01002 - Govt College\n\
             0100219110 - Civil Engineering\n\
             Status: Government Autonomous\n\
             0100229310 - Computer Engineering\n\
             State Level\n\
             01005 - Other College\n\
             0100524210 - Not Ours",
        );
        let patterns = PatternSet::default();
        let branches = segment_branches(&patterns, &doc, LineRange::new(0, 5));

        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].code, "0100219110");
        assert_eq!(branches[0].range, LineRange::new(1, 3));
        assert_eq!(branches[1].name, "Computer Engineering");
        assert_eq!(branches[1].range, LineRange::new(3, 5));
    }

    #[test]
    fn test_college_without_branches() {
        let doc = lines("01002 - Govt College\nNo seats published");
        let branches = segment_branches(&PatternSet::default(), &doc, LineRange::new(0, 2));
        assert!(branches.is_empty());
    }
}
