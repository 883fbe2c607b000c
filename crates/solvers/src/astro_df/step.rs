use nalgebra::DVector;

use super::surrogate::LocalModel;

const BISECTION_ITERS: usize = 200;

/// Curvature magnitude treated as zero when detecting the hard case.
const CURVATURE_TOL: f64 = 1e-12;

/// Minimizes the local model inside the trust region.
pub(super) fn solve_subproblem(model: &LocalModel, radius: f64, simple: bool) -> DVector<f64> {
    let g = model.gradient();
    let h = model.hessian();
    if simple {
        cauchy_step(&g, &h, radius)
    } else {
        exact_step(&g, &h, radius)
    }
}

/// Returns the Cauchy point of `g·s + Σ hᵢsᵢ²` along `-g`.
///
/// The full radius is taken when the curvature along `g` is non-positive.
pub(super) fn cauchy_step(g: &DVector<f64>, h: &DVector<f64>, radius: f64) -> DVector<f64> {
    let g_norm = g.norm();
    if g_norm == 0.0 {
        return DVector::zeros(g.len());
    }

    let curvature = g.dot(&h.component_mul(g));
    let tau = if curvature <= 0.0 {
        1.0
    } else {
        (g_norm.powi(3) / (radius * curvature)).min(1.0)
    };
    g * (-tau * radius / g_norm)
}

/// Returns the global minimizer of `g·s + Σ hᵢsᵢ²` over `‖s‖ ≤ radius`.
///
/// With `D = 2·diag(h)`, the minimizer is `s(λ) = -(D + λI)⁻¹g` for the
/// smallest `λ ≥ max(0, -min D)` with `‖s(λ)‖ ≤ radius`. The boundary
/// multiplier is found by bisection on `‖s(λ)‖ = radius`. When `g` has no
/// component along the most negative curvature and `s` falls short of the
/// boundary, the step is completed along that eigenvector.
pub(super) fn exact_step(g: &DVector<f64>, h: &DVector<f64>, radius: f64) -> DVector<f64> {
    let n = g.len();
    let d = h * 2.0;
    let d_min = d.min();
    let shifted = |lambda: f64| DVector::from_fn(n, |i, _| -g[i] / (d[i] + lambda));

    if d_min > 0.0 {
        let newton = shifted(0.0);
        if newton.norm() <= radius {
            return newton;
        }
    }

    let lower = (-d_min).max(0.0);
    let g_norm = g.norm();

    let flat: Vec<usize> = (0..n)
        .filter(|&i| d[i] + lower <= CURVATURE_TOL)
        .collect();
    if !flat.is_empty() && flat.iter().all(|&i| g[i].abs() <= CURVATURE_TOL) {
        let mut s = DVector::from_fn(n, |i, _| {
            if flat.contains(&i) {
                0.0
            } else {
                -g[i] / (d[i] + lower)
            }
        });
        let slack = radius.powi(2) - s.norm_squared();
        if slack >= 0.0 {
            s[flat[0]] = slack.sqrt();
            return s;
        }
    }

    if g_norm == 0.0 {
        return DVector::zeros(n);
    }

    // ‖s(λ)‖ ≤ ‖g‖/(min D + λ), so this upper end is on or inside the boundary.
    let mut lo = lower;
    let mut hi = (g_norm / radius - d_min).max(lower) + f64::EPSILON;
    for _ in 0..BISECTION_ITERS {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        if shifted(mid).norm() > radius {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    shifted(hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn v(xs: &[f64]) -> DVector<f64> {
        DVector::from_column_slice(xs)
    }

    fn model_value(g: &DVector<f64>, h: &DVector<f64>, s: &DVector<f64>) -> f64 {
        g.dot(s) + h.dot(&s.component_mul(s))
    }

    #[test]
    fn cauchy_step_scales_with_curvature() {
        let g = v(&[3.0, 4.0]);

        let step = cauchy_step(&g, &v(&[1.0, 1.0]), 10.0);
        assert_relative_eq!(step, v(&[-3.0, -4.0]), epsilon = 1e-12);

        let step = cauchy_step(&g, &v(&[-1.0, 0.0]), 2.0);
        assert_relative_eq!(step.norm(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn cauchy_step_is_zero_without_gradient() {
        let step = cauchy_step(&v(&[0.0, 0.0]), &v(&[1.0, 1.0]), 1.0);
        assert_relative_eq!(step, v(&[0.0, 0.0]));
    }

    #[test]
    fn exact_step_takes_interior_newton_step() {
        let g = v(&[1.0, -2.0]);
        let h = v(&[2.0, 1.0]);
        let step = exact_step(&g, &h, 10.0);
        assert_relative_eq!(step, v(&[-0.25, 1.0]), epsilon = 1e-12);
    }

    #[test]
    fn exact_step_hits_boundary_for_long_steps() {
        let g = v(&[4.0, 0.0]);
        let h = v(&[0.5, 0.5]);
        let step = exact_step(&g, &h, 1.0);
        assert_relative_eq!(step, v(&[-1.0, 0.0]), epsilon = 1e-9);
    }

    #[test]
    fn exact_step_follows_negative_curvature() {
        let g = v(&[0.1, 0.2]);
        let h = v(&[1.0, -1.0]);
        let step = exact_step(&g, &h, 1.0);

        assert_relative_eq!(step.norm(), 1.0, epsilon = 1e-9);
        let cauchy = cauchy_step(&g, &h, 1.0);
        assert!(model_value(&g, &h, &step) <= model_value(&g, &h, &cauchy) + 1e-12);
    }

    #[test]
    fn exact_step_handles_the_hard_case() {
        let g = v(&[0.5, 0.0]);
        let h = v(&[1.0, -1.0]);
        let step = exact_step(&g, &h, 1.0);

        // λ = 2 makes D + λ singular in the second coordinate.
        assert_relative_eq!(step[0], -0.125, epsilon = 1e-12);
        assert_relative_eq!(step.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn dispatch_follows_simple_flag() {
        let fit = crate::astro_df::surrogate::LocalModel::fit(
            &[v(&[0.0]), v(&[1.0]), v(&[-1.0])],
            &[0.0, 2.0, 0.0],
        )
        .unwrap();
        // m(s) = s + s², minimized at s = -0.5.
        let exact = solve_subproblem(&fit.model, 2.0, false);
        assert_relative_eq!(exact[0], -0.5, epsilon = 1e-9);

        // τ = min(1, ‖g‖³/(δ·gᵀhg)) = 1/2 of the full radius.
        let cauchy = solve_subproblem(&fit.model, 2.0, true);
        assert_relative_eq!(cauchy[0], -1.0, epsilon = 1e-9);
    }
}
