/// Where the interpolation nodes of a pass are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Placement {
    /// `±δ` along the coordinate axes.
    FreshCoordinate,

    /// Rotated toward a visited point, with the node nearest the variance
    /// surrogate's minimizer moved onto it.
    ReuseWithVarianceModel,

    /// Rotated toward a visited point.
    ReusePlain,
}

/// What the variance surrogate produced for this pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum VarianceOutcome {
    /// No surrogate during the first iteration.
    Unavailable,

    /// The regression was rank deficient.
    FitFailed,

    /// The fit succeeded but its minimizer is unusable or redundant.
    MinimizerDegenerate,

    Usable,
}

/// Chooses the node placement for one model-construction pass.
pub(super) fn decide(
    first_iteration: bool,
    reuse_enabled: bool,
    has_reusable: bool,
    variance: VarianceOutcome,
) -> Placement {
    if first_iteration || !reuse_enabled || !has_reusable {
        return Placement::FreshCoordinate;
    }
    match variance {
        VarianceOutcome::Unavailable | VarianceOutcome::FitFailed => Placement::FreshCoordinate,
        VarianceOutcome::MinimizerDegenerate => Placement::ReusePlain,
        VarianceOutcome::Usable => Placement::ReuseWithVarianceModel,
    }
}
