use crate::types::{CutoffEntry, RankPercentile};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    pub entries: Vec<CutoffEntry>,
    /// Pairs left without a category column
    pub overflow: usize,
}

/// Zip category columns with a stage block's complete pairs, positionally.
///
/// The j-th pair gets the j-th category; pairs past the last column are
/// dropped and counted in `overflow`.
pub fn assign_categories(stage: &str, categories: &[String], pairs: &[RankPercentile]) -> Assignment {
    let entries = categories
        .iter()
        .zip(pairs)
        .map(|(category, pair)| CutoffEntry {
            stage: stage.to_string(),
            category: category.clone(),
            rank: pair.rank,
            percentile: pair.percentile,
        })
        .collect();

    Assignment {
        entries,
        overflow: pairs.len().saturating_sub(categories.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    fn pairs(values: &[(u32, f64)]) -> Vec<RankPercentile> {
        values
            .iter()
            .map(|&(rank, percentile)| RankPercentile { rank, percentile })
            .collect()
    }

    #[test]
    fn test_positional_assignment() {
        let assignment = assign_categories(
            "I",
            &categories(&["GOPENS", "GSCS", "GNT3S"]),
            &pairs(&[(33717, 88.60), (40210, 85.12), (51090, 79.00)]),
        );
        let got: Vec<(&str, u32, f64)> = assignment
            .entries
            .iter()
            .map(|e| (e.category.as_str(), e.rank, e.percentile))
            .collect();
        assert_eq!(
            got,
            vec![("GOPENS", 33717, 88.60), ("GSCS", 40210, 85.12), ("GNT3S", 51090, 79.00)]
        );
        assert!(assignment.entries.iter().all(|e| e.stage == "I"));
        assert_eq!(assignment.overflow, 0);
    }

    #[test]
    fn test_overflow_pairs_are_dropped() {
        let assignment = assign_categories(
            "II",
            &categories(&["GOPENS", "GSCS", "GNT3S"]),
            &pairs(&[(1000, 90.0), (2000, 80.0), (3000, 70.0), (4000, 60.0)]),
        );
        assert_eq!(assignment.entries.len(), 3);
        assert_eq!(assignment.entries[2].rank, 3000);
        assert_eq!(assignment.overflow, 1);
    }

    #[test]
    fn test_fewer_pairs_than_categories() {
        let assignment = assign_categories(
            "I",
            &categories(&["GOPENS", "GSCS", "GNT3S"]),
            &pairs(&[(1000, 90.0)]),
        );
        assert_eq!(assignment.entries.len(), 1);
        assert_eq!(assignment.entries[0].category, "GOPENS");
        assert_eq!(assignment.overflow, 0);
    }
}
