use astrolabe_core::DesignPoint;

/// Growth factor applied to the pool radius when collecting regression points.
const POOL_GROWTH: f64 = 1.5;

/// Index of a point in the [`VisitedLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(super) struct PointId(usize);

/// Append-only arena of every point the solver has simulated.
///
/// Points are never removed, and only gain replications after creation, so a
/// [`PointId`] stays valid for the whole search.
#[derive(Debug, Default)]
pub(super) struct VisitedLog {
    points: Vec<DesignPoint>,
}

impl VisitedLog {
    pub(super) fn push(&mut self, point: DesignPoint) -> PointId {
        self.points.push(point);
        PointId(self.points.len() - 1)
    }

    pub(super) fn get(&self, id: PointId) -> &DesignPoint {
        &self.points[id.0]
    }

    pub(super) fn get_mut(&mut self, id: PointId) -> &mut DesignPoint {
        &mut self.points[id.0]
    }

    pub(super) fn len(&self) -> usize {
        self.points.len()
    }

    fn distances<'a>(&'a self, center: &'a [f64]) -> impl Iterator<Item = (PointId, f64)> + 'a {
        self.points
            .iter()
            .enumerate()
            .map(move |(i, p)| (PointId(i), distance(p.x(), center)))
    }

    /// Returns the visited point farthest from `center` within `radius`.
    ///
    /// Points sitting exactly on the center are ignored, and ties go to the
    /// earliest visited point.
    pub(super) fn farthest_within(&self, center: &[f64], radius: f64) -> Option<PointId> {
        let mut best: Option<(PointId, f64)> = None;
        for (id, d) in self.distances(center) {
            if d > 0.0 && d <= radius && best.is_none_or(|(_, far)| d > far) {
                best = Some((id, d));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Collects distinct visited points around `center` for a regression.
    ///
    /// The pool starts at `radius` and grows by half again until it holds at
    /// least `min_count` points or every off-center point is included.
    pub(super) fn neighborhood(
        &self,
        center: &[f64],
        radius: f64,
        min_count: usize,
    ) -> Vec<PointId> {
        let off_center: Vec<(PointId, f64)> =
            self.distances(center).filter(|&(_, d)| d > 0.0).collect();

        let mut pool_radius = radius;
        loop {
            let pool: Vec<PointId> = off_center
                .iter()
                .filter(|&&(_, d)| d <= pool_radius)
                .map(|&(id, _)| id)
                .collect();
            if pool.len() >= min_count || pool.len() == off_center.len() {
                return pool;
            }
            pool_radius *= POOL_GROWTH;
        }
    }
}

/// Euclidean distance between two decision vectors.
pub(super) fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
