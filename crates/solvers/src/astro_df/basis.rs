use nalgebra::DVector;

use astrolabe_core::Bounds;

/// Inward margin applied to any node or candidate that touches a bound.
pub(super) const BOUND_MARGIN: f64 = 0.01;

/// Norm below which a Gram–Schmidt residual counts as dependent.
const DEPENDENCE_TOL: f64 = 1e-10;

/// The `2d+1` interpolation nodes around a center.
///
/// Node 0 is the center; nodes `2i+1` and `2i+2` lie at `+δ` and `-δ` along
/// the `i`-th basis direction, clipped inward at violated bounds.
#[derive(Debug, Clone)]
pub(super) struct InterpolationSet {
    center: DVector<f64>,
    nodes: Vec<DVector<f64>>,
    reuses_first: bool,
}

impl InterpolationSet {
    /// Builds the set along the coordinate axes.
    pub(super) fn coordinate(center: &DVector<f64>, radius: f64, bounds: &Bounds) -> Self {
        let basis = coordinate_basis(center.len());
        Self::along(center, radius, bounds, &basis, None)
    }

    /// Builds the set along a basis rotated toward a previously visited point.
    ///
    /// The first `+` node is `reused` itself, unclipped, so its existing
    /// replications stay valid.
    pub(super) fn rotated(
        center: &DVector<f64>,
        radius: f64,
        bounds: &Bounds,
        reused: &DVector<f64>,
    ) -> Self {
        let basis = rotated_basis(&(reused - center));
        Self::along(center, radius, bounds, &basis, Some(reused))
    }

    fn along(
        center: &DVector<f64>,
        radius: f64,
        bounds: &Bounds,
        basis: &[DVector<f64>],
        reused: Option<&DVector<f64>>,
    ) -> Self {
        let clipped = |mut x: DVector<f64>| {
            bounds.clip_inward(x.as_mut_slice(), BOUND_MARGIN);
            x
        };

        let mut nodes = Vec::with_capacity(2 * basis.len() + 1);
        nodes.push(center.clone());
        for (i, direction) in basis.iter().enumerate() {
            let plus = match reused {
                Some(x) if i == 0 => x.clone(),
                _ => clipped(center + direction * radius),
            };
            nodes.push(plus);
            nodes.push(clipped(center - direction * radius));
        }

        Self {
            center: center.clone(),
            nodes,
            reuses_first: reused.is_some(),
        }
    }

    pub(super) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(super) fn nodes(&self) -> &[DVector<f64>] {
        &self.nodes
    }

    /// Returns the offsets `node - center` the local model is fit on.
    pub(super) fn offsets(&self) -> Vec<DVector<f64>> {
        self.nodes.iter().map(|x| x - &self.center).collect()
    }

    /// Returns true if node `index` is a visited point whose replications
    /// should be reused.
    pub(super) fn reuses(&self, index: usize) -> bool {
        self.reuses_first && index == 1
    }

    /// Replaces the non-center node closest to `x` with `x`.
    pub(super) fn replace_closest(&mut self, x: DVector<f64>) {
        let closest = self
            .nodes
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, node)| (i, (node - &x).norm()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i);

        if let Some(i) = closest {
            if i == 1 {
                self.reuses_first = false;
            }
            self.nodes[i] = x;
        }
    }
}

fn unit(dim: usize, i: usize) -> DVector<f64> {
    let mut e = DVector::zeros(dim);
    e[i] = 1.0;
    e
}

pub(super) fn coordinate_basis(dim: usize) -> Vec<DVector<f64>> {
    (0..dim).map(|i| unit(dim, i)).collect()
}

/// Builds an orthonormal basis whose first vector points along `direction`.
///
/// Each further nonzero coordinate of the direction contributes a planar
/// rotation of it, and each zero coordinate contributes its axis. The
/// candidates are orthonormalised by modified Gram–Schmidt, with coordinate
/// axes standing in for any candidate that turns out to be dependent.
pub(super) fn rotated_basis(direction: &DVector<f64>) -> Vec<DVector<f64>> {
    let dim = direction.len();
    let first = direction.normalize();

    let nonzero: Vec<usize> = (0..dim).filter(|&i| first[i] != 0.0).collect();
    let mut candidates = vec![first.clone()];
    if let Some((&pivot, rest)) = nonzero.split_first() {
        for &i in rest {
            let mut rotated = first.clone();
            rotated[pivot] = -first[i];
            rotated[i] = first[pivot];
            candidates.push(rotated);
        }
    }
    candidates.extend((0..dim).filter(|&i| first[i] == 0.0).map(|i| unit(dim, i)));
    candidates.extend(coordinate_basis(dim));

    let mut basis: Vec<DVector<f64>> = Vec::with_capacity(dim);
    for mut v in candidates {
        if basis.len() == dim {
            break;
        }
        for b in &basis {
            let projection = b.dot(&v);
            v.axpy(-projection, b, 1.0);
        }
        let norm = v.norm();
        if norm > DEPENDENCE_TOL {
            basis.push(v / norm);
        }
    }
    basis
}
