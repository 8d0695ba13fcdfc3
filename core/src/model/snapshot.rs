/// Cumulative totals as currently reported by a source. Carries no date.
/// Values returned by [`SnapshotSource::snapshot`](crate::source::SnapshotSource::snapshot)
/// fit in `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub tested: u64,
    pub positive: u64,
    pub recovered: u64,
    pub dead: u64,
}

impl Snapshot {
    pub fn new(tested: u64, positive: u64, recovered: u64, dead: u64) -> Self {
        Self {
            tested,
            positive,
            recovered,
            dead,
        }
    }
}
