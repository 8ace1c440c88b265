use std::num::NonZeroUsize;

use crate::models::record::{Report, SizeMetric};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankOptions {
    /// Records below this size are dropped before sorting.
    pub min_size: u64,
    pub top_n: Option<NonZeroUsize>,
}

pub struct Ranker;

impl Ranker {
    /// Filter, sort descending by size, then truncate.
    ///
    /// The sort is stable, so equal sizes keep traversal order.
    pub fn rank<R: SizeMetric>(mut records: Vec<R>, options: RankOptions) -> Vec<R> {
        if options.min_size > 0 {
            records.retain(|r| r.size_metric() >= options.min_size);
        }
        records.sort_by(|a, b| b.size_metric().cmp(&a.size_metric()));
        if let Some(n) = options.top_n {
            records.truncate(n.get());
        }
        records
    }

    pub fn rank_report(report: Report, options: RankOptions) -> Report {
        match report {
            Report::Files(records) => Report::Files(Self::rank(records, options)),
            Report::Folders(records) => Report::Folders(Self::rank(records, options)),
        }
    }
}
