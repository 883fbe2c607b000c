use nalgebra::{DMatrix, DVector};

use super::Error;

/// A separable quadratic `m(s) = c + g·s + Σ hᵢ sᵢ²`.
///
/// Both the local objective model and the variance surrogate take this form.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct LocalModel {
    coefficients: DVector<f64>,
    dim: usize,
}

/// How well the interpolation system determined the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Conditioning {
    WellPosed,

    /// The pseudo-inverse was used on a singular system.
    RankDeficient { rank: usize },
}

#[derive(Debug, Clone)]
pub(super) struct ModelFit {
    pub(super) model: LocalModel,
    pub(super) conditioning: Conditioning,
}

/// Outcome of a least-squares variance regression.
#[derive(Debug, Clone)]
pub(super) enum VarianceFit {
    Usable(LocalModel),

    /// Too few or too collinear points to determine every coefficient.
    Degenerate { rank: usize },
}

impl LocalModel {
    /// Interpolates `values` at `offsets` from the center.
    ///
    /// The system is solved with an SVD pseudo-inverse, so a singular set
    /// still yields a model, flagged as rank deficient.
    ///
    /// # Errors
    ///
    /// Returns an error only if the decomposition cannot be applied.
    pub(super) fn fit(offsets: &[DVector<f64>], values: &[f64]) -> Result<ModelFit, Error> {
        let (coefficients, rank) =
            least_squares(offsets, values).ok_or(Error::LinearAlgebra("SVD solve failed"))?;
        let dim = offsets.first().map_or(0, DVector::len);
        let conditioning = if rank < 2 * dim + 1 {
            Conditioning::RankDeficient { rank }
        } else {
            Conditioning::WellPosed
        };
        Ok(ModelFit {
            model: Self { coefficients, dim },
            conditioning,
        })
    }

    pub(super) fn value(&self, s: &DVector<f64>) -> f64 {
        let c = self.coefficients[0];
        let g = self.gradient();
        let h = self.hessian();
        c + g.dot(s) + h.dot(&s.component_mul(s))
    }

    pub(super) fn gradient(&self) -> DVector<f64> {
        self.coefficients.rows(1, self.dim).into_owned()
    }

    /// Returns the diagonal coefficients `h`.
    pub(super) fn hessian(&self) -> DVector<f64> {
        self.coefficients.rows(1 + self.dim, self.dim).into_owned()
    }
}

/// Fits the variance surrogate by ordinary least squares.
pub(super) fn fit_variance(offsets: &[DVector<f64>], values: &[f64]) -> VarianceFit {
    let dim = offsets.first().map_or(0, DVector::len);
    let unknowns = 2 * dim + 1;
    match least_squares(offsets, values) {
        Some((coefficients, rank))
            if rank == unknowns && coefficients.iter().all(|c| c.is_finite()) =>
        {
            VarianceFit::Usable(LocalModel { coefficients, dim })
        }
        Some((_, rank)) => VarianceFit::Degenerate { rank },
        None => VarianceFit::Degenerate { rank: 0 },
    }
}

/// Minimum-norm least-squares coefficients and the numerical rank of the
/// design matrix `[1, s, s²]`.
fn least_squares(offsets: &[DVector<f64>], values: &[f64]) -> Option<(DVector<f64>, usize)> {
    let rows = offsets.len();
    let dim = offsets.first().map_or(0, DVector::len);
    let cols = 2 * dim + 1;

    let design = DMatrix::from_fn(rows, cols, |i, j| match j {
        0 => 1.0,
        j if j <= dim => offsets[i][j - 1],
        j => offsets[i][j - 1 - dim].powi(2),
    });
    let rhs = DVector::from_column_slice(values);

    let svd = design.svd(true, true);
    let largest = svd.singular_values.max();
    let eps = largest * rows.max(cols) as f64 * f64::EPSILON;
    let rank = svd.rank(eps);
    let coefficients = svd.solve(&rhs, eps).ok()?;
    Some((coefficients, rank))
}
