/// Evaluates the Lagrange polynomial ℓ_b(t) associated with node b
///
/// ```text
///            p     t - x_i
/// ℓ_b(t) =   Π   ———————————
///          i ≠ b  x_b - x_i
/// ```
///
/// # Input
///
/// * `b` -- basis index in `[0, nodes.len())`
/// * `nodes` -- the (p + 1) distinct interpolation nodes
/// * `t` -- evaluation point (any real)
pub fn lagrange_basis(b: usize, nodes: &[f64], t: f64) -> f64 {
    let mut numerator = 1.0;
    let mut denominator = 1.0;
    for (i, xi) in nodes.iter().enumerate() {
        if i != b {
            numerator *= t - xi;
            denominator *= nodes[b] - xi;
        }
    }
    numerator / denominator
}

/// Evaluates the derivative ℓ'_b(t) of the Lagrange polynomial associated with node b
///
/// ```text
///              p      p
///              Σ      Π   (t - x_i)
///            j ≠ b  i ∉ {b,j}
/// ℓ'_b(t) =  ——————————————————————
///                  p
///                  Π   (x_b - x_i)
///                i ≠ b
/// ```
///
/// The sum-of-products form is valid at any t, including the nodes themselves.
pub fn lagrange_basis_deriv(b: usize, nodes: &[f64], t: f64) -> f64 {
    let mut denominator = 1.0;
    for (i, xi) in nodes.iter().enumerate() {
        if i != b {
            denominator *= nodes[b] - xi;
        }
    }
    let mut numerator = 0.0;
    for j in 0..nodes.len() {
        if j != b {
            let mut product = 1.0;
            for (i, xi) in nodes.iter().enumerate() {
                if i != b && i != j {
                    product *= t - xi;
                }
            }
            numerator += product;
        }
    }
    numerator / denominator
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{lagrange_basis, lagrange_basis_deriv};
    use crate::GllQuadrature;
    use russell_lab::approx_eq;

    #[test]
    fn basis_is_kronecker_delta_at_nodes() {
        let gll = GllQuadrature::unit_interval(4).unwrap();
        let x = gll.nodes();
        for b in 0..x.len() {
            for (i, xi) in x.iter().enumerate() {
                let correct = if i == b { 1.0 } else { 0.0 };
                approx_eq(lagrange_basis(b, x, *xi), correct, 1e-14);
            }
        }
    }

    #[test]
    fn quadratic_basis_matches_closed_form() {
        // nodes 0, 1/2, 1
        //   ℓ0 = (2t - 1)(t - 1),  ℓ1 = -4t(t - 1),  ℓ2 = t(2t - 1)
        let x = &[0.0, 0.5, 1.0];
        for t in [-0.3, 0.1, 0.25, 0.8, 1.7] {
            approx_eq(lagrange_basis(0, x, t), (2.0 * t - 1.0) * (t - 1.0), 1e-14);
            approx_eq(lagrange_basis(1, x, t), -4.0 * t * (t - 1.0), 1e-14);
            approx_eq(lagrange_basis(2, x, t), t * (2.0 * t - 1.0), 1e-14);
            approx_eq(lagrange_basis_deriv(0, x, t), 4.0 * t - 3.0, 1e-14);
            approx_eq(lagrange_basis_deriv(1, x, t), -8.0 * t + 4.0, 1e-14);
            approx_eq(lagrange_basis_deriv(2, x, t), 4.0 * t - 1.0, 1e-14);
        }
    }

    #[test]
    fn basis_is_a_partition_of_unity() {
        // Σ ℓ_b = 1 and Σ ℓ'_b = 0 everywhere
        for p in 1..8 {
            let gll = GllQuadrature::unit_interval(p).unwrap();
            let x = gll.nodes();
            for t in [0.0, 0.13, 0.5, 0.77, 1.0] {
                let sum: f64 = (0..(p + 1)).map(|b| lagrange_basis(b, x, t)).sum();
                let dsum: f64 = (0..(p + 1)).map(|b| lagrange_basis_deriv(b, x, t)).sum();
                approx_eq(sum, 1.0, 1e-12);
                approx_eq(dsum, 0.0, 1e-10);
            }
        }
    }

    #[test]
    fn derivative_matches_central_difference() {
        let gll = GllQuadrature::unit_interval(5).unwrap();
        let x = gll.nodes();
        let d = 1e-6;
        for b in 0..x.len() {
            for t in [0.05, 0.31, 0.62, 0.94] {
                let numerical = (lagrange_basis(b, x, t + d) - lagrange_basis(b, x, t - d)) / (2.0 * d);
                approx_eq(lagrange_basis_deriv(b, x, t), numerical, 1e-6);
            }
        }
    }
}
