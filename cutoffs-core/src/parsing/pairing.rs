// Rank–percentile pairing for one stage block.
//
// Extraction interleaves a table row's ranks and parenthesized percentiles
// out of left-to-right order, but recency survives: a percentile belongs to
// the nearest preceding rank that has not received one yet. Slots are filled
// by two pure transitions, `push_rank` and `bind_percentile`, and read out
// once the block closes with `complete_pairs`.

use crate::types::RankPercentile;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub rank: Option<u32>,
    pub percentile: Option<f64>,
}

impl Slot {
    pub fn rank(rank: u32) -> Self {
        Self {
            rank: Some(rank),
            percentile: None,
        }
    }

    pub fn orphan(percentile: f64) -> Self {
        Self {
            rank: None,
            percentile: Some(percentile),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.rank.is_some() && self.percentile.is_some()
    }
}

/// Append a new unpaired rank
pub fn push_rank(mut slots: Vec<Slot>, rank: u32) -> Vec<Slot> {
    slots.push(Slot::rank(rank));
    slots
}

/// Bind `value` to the most recently added slot whose percentile is empty,
/// or append an orphan slot when every slot is already paired.
pub fn bind_percentile(mut slots: Vec<Slot>, value: f64) -> Vec<Slot> {
    match slots.iter_mut().rev().find(|slot| slot.percentile.is_none()) {
        Some(slot) => slot.percentile = Some(value),
        None => slots.push(Slot::orphan(value)),
    }
    slots
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairingOutcome {
    /// Complete pairs in slot order
    pub pairs: Vec<RankPercentile>,
    /// Percentiles that never found a rank
    pub orphan_percentiles: usize,
    /// Ranks that never received a percentile
    pub unpaired_ranks: usize,
}

/// Keep only complete slots, counting what was dropped
pub fn complete_pairs(slots: &[Slot]) -> PairingOutcome {
    let mut outcome = PairingOutcome::default();
    for slot in slots {
        match (slot.rank, slot.percentile) {
            (Some(rank), Some(percentile)) => outcome.pairs.push(RankPercentile { rank, percentile }),
            (Some(_), None) => outcome.unpaired_ranks += 1,
            (None, Some(_)) => outcome.orphan_percentiles += 1,
            (None, None) => {}
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(rank: u32, percentile: f64) -> RankPercentile {
        RankPercentile { rank, percentile }
    }

    #[test]
    fn test_interleaved_tokens_pair_in_order() {
        let mut slots = Vec::new();
        slots = push_rank(slots, 33717);
        slots = bind_percentile(slots, 88.60);
        slots = push_rank(slots, 40210);
        slots = bind_percentile(slots, 85.12);

        let outcome = complete_pairs(&slots);
        assert_eq!(outcome.pairs, vec![pair(33717, 88.60), pair(40210, 85.12)]);
        assert_eq!(outcome.orphan_percentiles, 0);
        assert_eq!(outcome.unpaired_ranks, 0);
    }

    #[test]
    fn test_percentile_binds_most_recent_unpaired_rank() {
        // ranks of a row arrive first, percentiles trail on a later line
        let mut slots = Vec::new();
        for rank in [1200, 1300, 1400] {
            slots = push_rank(slots, rank);
        }
        slots = bind_percentile(slots, 70.0);
        slots = bind_percentile(slots, 80.0);

        assert_eq!(slots[2].percentile, Some(70.0));
        assert_eq!(slots[1].percentile, Some(80.0));
        assert_eq!(slots[0].percentile, None);
    }

    #[test]
    fn test_three_ranks_two_percentiles_leave_one_unpaired() {
        let mut slots = Vec::new();
        slots = push_rank(slots, 1000);
        slots = push_rank(slots, 2000);
        slots = bind_percentile(slots, 90.0);
        slots = push_rank(slots, 3000);
        slots = bind_percentile(slots, 80.0);

        let outcome = complete_pairs(&slots);
        assert_eq!(outcome.pairs, vec![pair(2000, 90.0), pair(3000, 80.0)]);
        assert_eq!(outcome.unpaired_ranks, 1);
    }

    #[test]
    fn test_surplus_percentile_becomes_orphan() {
        let mut slots = push_rank(Vec::new(), 500);
        slots = bind_percentile(slots, 90.1);
        slots = bind_percentile(slots, 85.3);

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1], Slot::orphan(85.3));

        let outcome = complete_pairs(&slots);
        assert_eq!(outcome.pairs, vec![pair(500, 90.1)]);
        assert_eq!(outcome.orphan_percentiles, 1);
    }

    #[test]
    fn test_orphan_does_not_absorb_later_percentile() {
        // an orphan slot already holds a percentile, so the next one skips it
        let mut slots = bind_percentile(Vec::new(), 10.0);
        slots = push_rank(slots, 4321);
        slots = bind_percentile(slots, 20.0);

        let outcome = complete_pairs(&slots);
        assert_eq!(outcome.pairs, vec![pair(4321, 20.0)]);
        assert_eq!(outcome.orphan_percentiles, 1);
    }
}
