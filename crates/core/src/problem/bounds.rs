use thiserror::Error;

/// Per-coordinate box bounds on the decision variables.
///
/// Bounds may be infinite, which is how an unconstrained coordinate is
/// expressed. Construction guarantees `lower[i] < upper[i]` for every `i`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

/// Errors that can occur when constructing [`Bounds`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BoundsError {
    #[error("lower and upper bounds have different lengths ({lower} vs {upper})")]
    LengthMismatch { lower: usize, upper: usize },

    #[error("bounds must have at least one coordinate")]
    Empty,

    #[error("coordinate {index} has lower bound {lower} not below upper bound {upper}")]
    Inverted { index: usize, lower: f64, upper: f64 },

    #[error("coordinate {index} has a NaN bound")]
    NotANumber { index: usize },
}

impl Bounds {
    /// Creates validated box bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if the vectors differ in length, are empty, contain
    /// NaN, or if any lower bound is not strictly below its upper bound.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self, BoundsError> {
        if lower.len() != upper.len() {
            return Err(BoundsError::LengthMismatch {
                lower: lower.len(),
                upper: upper.len(),
            });
        }
        if lower.is_empty() {
            return Err(BoundsError::Empty);
        }
        for (index, (&lo, &hi)) in lower.iter().zip(&upper).enumerate() {
            if lo.is_nan() || hi.is_nan() {
                return Err(BoundsError::NotANumber { index });
            }
            if lo >= hi {
                return Err(BoundsError::Inverted {
                    index,
                    lower: lo,
                    upper: hi,
                });
            }
        }
        Ok(Self { lower, upper })
    }

    /// Creates bounds that leave every coordinate unconstrained.
    ///
    /// # Panics
    ///
    /// Panics if `dim` is zero.
    #[must_use]
    pub fn unbounded(dim: usize) -> Self {
        assert!(dim > 0, "bounds must have at least one coordinate");
        Self {
            lower: vec![f64::NEG_INFINITY; dim],
            upper: vec![f64::INFINITY; dim],
        }
    }

    /// Creates bounds with the same interval on every coordinate.
    ///
    /// # Errors
    ///
    /// Returns an error if `dim` is zero or the interval is invalid.
    pub fn uniform(dim: usize, lower: f64, upper: f64) -> Result<Self, BoundsError> {
        Self::new(vec![lower; dim], vec![upper; dim])
    }

    /// Returns the number of coordinates.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    #[must_use]
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    #[must_use]
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Returns `upper[i] - lower[i]`, which is infinite for open coordinates.
    #[must_use]
    pub fn width(&self, i: usize) -> f64 {
        self.upper[i] - self.lower[i]
    }

    /// Returns true if `x` lies inside the closed box.
    #[must_use]
    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.dim()
            && x
                .iter()
                .zip(self.lower.iter().zip(&self.upper))
                .all(|(&v, (&lo, &hi))| lo <= v && v <= hi)
    }

    /// Pulls every coordinate that touches or crosses a bound back inside the
    /// box by `margin`.
    ///
    /// A coordinate at or below `lower[i]` becomes `lower[i] + margin`, and one
    /// at or above `upper[i]` becomes `upper[i] - margin`. Coordinates strictly
    /// inside the box are left alone.
    pub fn clip_inward(&self, x: &mut [f64], margin: f64) {
        for ((v, &lo), &hi) in x.iter_mut().zip(&self.lower).zip(&self.upper) {
            if *v <= lo {
                *v = lo + margin;
            } else if *v >= hi {
                *v = hi - margin;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn rejects_mismatched_lengths() {
        let err = Bounds::new(vec![0.0], vec![1.0, 2.0]).unwrap_err();
        assert_eq!(err, BoundsError::LengthMismatch { lower: 1, upper: 2 });
    }

    #[test]
    fn rejects_inverted_coordinate() {
        let err = Bounds::new(vec![0.0, 3.0], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, BoundsError::Inverted { index: 1, .. }));
    }

    #[test]
    fn rejects_empty_and_nan() {
        assert_eq!(Bounds::new(vec![], vec![]), Err(BoundsError::Empty));
        assert!(matches!(
            Bounds::new(vec![f64::NAN], vec![1.0]),
            Err(BoundsError::NotANumber { index: 0 })
        ));
    }

    #[test]
    fn clip_inward_moves_violations_inside() {
        let bounds = Bounds::uniform(3, -1.0, 1.0).unwrap();
        let mut x = [-1.5, 0.25, 1.0];

        bounds.clip_inward(&mut x, 0.01);

        assert_relative_eq!(x[0], -0.99);
        assert_relative_eq!(x[1], 0.25);
        assert_relative_eq!(x[2], 0.99);
        assert!(bounds.contains(&x));
    }

    #[test]
    fn unbounded_never_clips() {
        let bounds = Bounds::unbounded(2);
        let mut x = [1e300, -1e300];

        bounds.clip_inward(&mut x, 0.01);

        assert_relative_eq!(x[0], 1e300);
        assert_relative_eq!(x[1], -1e300);
        assert!(bounds.width(0).is_infinite());
    }
}
