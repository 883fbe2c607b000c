use super::visited::PointId;

/// A recommended point and the budget expended when it was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Checkpoint {
    pub(super) point: PointId,
    pub(super) budget: u64,
}

/// Trust-region state carried from one iteration to the next.
#[derive(Debug, Clone)]
pub(super) struct TrustRegionState {
    pub(super) k: usize,
    pub(super) center: PointId,
    pub(super) radius: f64,
    pub(super) max_radius: f64,
    pub(super) kappa: f64,
    trace: Vec<Checkpoint>,
}

impl TrustRegionState {
    pub(super) fn new(center: PointId, radius: f64, max_radius: f64, kappa: f64) -> Self {
        Self {
            k: 1,
            center,
            radius,
            max_radius,
            kappa,
            trace: Vec::new(),
        }
    }

    pub(super) fn trace(&self) -> &[Checkpoint] {
        &self.trace
    }

    /// Makes `point` the incumbent and logs it at `budget`.
    pub(super) fn accept(&mut self, point: PointId, budget: u64) {
        self.center = point;
        self.trace.push(Checkpoint { point, budget });
    }

    /// Re-expresses the trace relative to a new budget origin.
    ///
    /// Every checkpoint moves by `offset - origin`, and the first one is
    /// pinned to zero so the trace always starts at the initial solution.
    pub(super) fn rebase(&mut self, origin: u64, offset: u64) {
        for checkpoint in &mut self.trace {
            checkpoint.budget = checkpoint.budget.saturating_sub(origin) + offset;
        }
        if let Some(first) = self.trace.first_mut() {
            first.budget = 0;
        }
    }

    /// Logs the incumbent once more if budget was spent after the last checkpoint.
    pub(super) fn close(&mut self, expended: u64) {
        if self.trace.last().is_none_or(|c| c.budget < expended) {
            self.trace.push(Checkpoint {
                point: self.center,
                budget: expended,
            });
        }
    }
}
