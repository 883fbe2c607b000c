/// Actions an observer can take during an ASTRO-DF search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the solver early and return the recommendations made so far.
    StopEarly,
}
