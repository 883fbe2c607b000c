/// Smallest grant issued while any budget remains.
pub(super) const MIN_GRANT: u64 = 2;

/// Replication budget ledger.
///
/// Every simulate call is charged here, together with the configured per-call
/// overhead. Once the expended budget reaches the limit, further requests are
/// refused, so the total can exceed the limit by at most one call's overshoot.
#[derive(Debug, Clone)]
pub(super) struct Budget {
    limit: u64,
    overhead: u64,
    expended: u64,
    calls: u64,
}

impl Budget {
    pub(super) fn new(limit: u64, overhead: u64) -> Self {
        Self {
            limit,
            overhead,
            expended: 0,
            calls: 0,
        }
    }

    pub(super) fn expended(&self) -> u64 {
        self.expended
    }

    pub(super) fn calls(&self) -> u64 {
        self.calls
    }

    pub(super) fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.expended)
    }

    pub(super) fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns how many of `requested` replications may run, or `None` once
    /// the budget is spent.
    pub(super) fn grant(&self, requested: u64) -> Option<u64> {
        if self.is_exhausted() {
            return None;
        }
        Some(requested.min(self.remaining().max(MIN_GRANT)))
    }

    /// Charges one simulate call of `reps` replications.
    pub(super) fn charge(&mut self, reps: u64) {
        self.expended += reps + self.overhead;
        self.calls += 1;
    }
}
