// Parsing stages - delegates to one module per step of the table recovery:
// - patterns.rs: compiled regex set shared by every stage
// - segmenter.rs: college and branch line ranges
// - table_header.rs: status line, "State Level" anchor and category row
// - stage_block.rs: stage markers and their rank/percentile tokens
// - pairing.rs: greedy backward rank-percentile matching
// - assigner.rs: positional category assignment

pub mod assigner;
pub mod pairing;
pub mod patterns;
pub mod segmenter;
pub mod stage_block;
pub mod table_header;

pub use assigner::{assign_categories, Assignment};
pub use pairing::{bind_percentile, complete_pairs, push_rank, PairingOutcome, Slot};
pub use patterns::{PatternSet, TableToken};
pub use segmenter::{segment_branches, segment_colleges, HeaderSegment};
pub use stage_block::{BlockBoundary, StageBlock, StageBlockCollector};
pub use table_header::{extract_status, locate_category_header, CategoryHeader, TableLocation};
