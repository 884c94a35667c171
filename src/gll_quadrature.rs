use crate::StrError;
use russell_lab::Vector;
use std::f64::consts::PI;

/// Defines the tolerance on the difference between successive Newton iterates
pub const GLL_TOLERANCE: f64 = 3.0e-11;

/// Defines the maximum number of Newton iterations allowed for each root
pub const GLL_MAX_ITERATIONS: usize = 100;

/// Holds the Gauss-Lobatto-Legendre (GLL) nodes and weights mapped onto [x1, x2]
///
/// The rule with `order + 1` points includes both endpoints and integrates
/// polynomials up to degree `2 order - 1` exactly.
///
/// ```text
///   x1                                x2
///   o-------o-----------o-------------o   order = 3
///   x[0]    x[1]        x[2]          x[3]
/// ```
#[derive(Clone, Debug)]
pub struct GllQuadrature {
    order: usize,    // polynomial order n (number of points = n + 1)
    nodes: Vector,   // (n + 1) ascending abscissas in [x1, x2]
    weights: Vector, // (n + 1) positive weights summing to (x2 - x1)
}

impl GllQuadrature {
    /// Computes the GLL rule of the given order on [x1, x2]
    ///
    /// # Input
    ///
    /// * `order` -- polynomial order n ≥ 1
    /// * `x1`, `x2` -- range of integration (x1 < x2)
    ///
    /// The interior roots of `q(z) = L_{n+1}(z) - L_{n-1}(z)` are found by Newton's method
    /// starting from an asymptotic approximation. Only the first half of the roots is
    /// computed; the other half is mirrored about the midpoint.
    pub fn new(order: usize, x1: f64, x2: f64) -> Result<Self, StrError> {
        GllQuadrature::new_with_max_iterations(order, x1, x2, GLL_MAX_ITERATIONS)
    }

    /// Computes the GLL rule with at most `max_iterations` Newton steps per root
    pub(crate) fn new_with_max_iterations(
        order: usize,
        x1: f64,
        x2: f64,
        max_iterations: usize,
    ) -> Result<Self, StrError> {
        if order < 1 {
            return Err("GLL quadrature requires order ≥ 1");
        }
        if x2 <= x1 {
            return Err("GLL quadrature requires x1 < x2");
        }
        let n = order;
        let nf = n as f64;
        let mut x = Vector::new(n + 1);
        let mut w = Vector::new(n + 1);

        // endpoints (for n = 1 this is the complete two-point rule)
        let w_end = 2.0 / (nf * (nf + 1.0));
        x[0] = x1;
        x[n] = x2;
        w[0] = w_end;
        w[n] = w_end;

        // interior roots come in symmetric pairs
        let xm = 0.5 * (x2 + x1);
        let xl = 0.5 * (x2 - x1);
        let half = (n + 1) / 2;
        for j in 1..half {
            let jj = j as f64 + 0.25;
            let mut z = -f64::cos(PI * jj / nf - (3.0 / (8.0 * nf * PI)) * (1.0 / jj));
            let mut converged = false;
            for _ in 0..max_iterations {
                let (q, qp, _) = q_and_legendre(n, z);
                let z_old = z;
                z = z_old - q / qp;
                if f64::abs(z - z_old) <= GLL_TOLERANCE {
                    converged = true;
                    break;
                }
            }
            if !converged {
                return Err("GLL quadrature: Newton iteration did not converge");
            }
            let (_, _, ln) = q_and_legendre(n, z);
            x[j] = xm + xl * z;
            x[n - j] = xm - xl * z;
            w[j] = 2.0 / (nf * (nf + 1.0) * ln * ln);
            w[n - j] = w[j];
        }

        // the midpoint is a root when n is even
        if n % 2 == 0 {
            let (_, _, ln) = q_and_legendre(n, 0.0);
            x[n / 2] = xm;
            w[n / 2] = 2.0 / (nf * (nf + 1.0) * ln * ln);
        }

        // map the weights from [-1, 1] onto [x1, x2]
        for j in 0..(n + 1) {
            w[j] *= xl;
        }
        tracing::debug!(order, "computed GLL nodes and weights");
        Ok(GllQuadrature {
            order,
            nodes: x,
            weights: w,
        })
    }

    /// Computes the GLL rule of the given order on [0, 1]
    pub fn unit_interval(order: usize) -> Result<Self, StrError> {
        GllQuadrature::new(order, 0.0, 1.0)
    }

    /// Returns the polynomial order n (the rule has n + 1 points)
    pub fn order(&self) -> usize {
        self.order
    }

    /// Returns the number of points (n + 1)
    pub fn npoint(&self) -> usize {
        self.order + 1
    }

    /// Returns the ascending nodes
    pub fn nodes(&self) -> &[f64] {
        self.nodes.as_data()
    }

    /// Returns the weights (parallel to the nodes)
    pub fn weights(&self) -> &[f64] {
        self.weights.as_data()
    }

    /// Approximates the integral of f over the mapped interval
    pub fn integrate<F>(&self, f: F) -> f64
    where
        F: Fn(f64) -> f64,
    {
        self.nodes()
            .iter()
            .zip(self.weights())
            .fold(0.0, |acc, (x, w)| acc + w * f(*x))
    }
}

/// Evaluates q(x) = L_{n+1}(x) - L_{n-1}(x), its derivative q'(x), and L_n(x)
///
/// Uses the three-term recurrences (see Kopriva's "Implementing Spectral Methods for PDEs"):
///
/// ```text
/// L_k  = ((2k - 1) x L_{k-1} - (k - 1) L_{k-2}) / k
/// L'_k = L'_{k-2} + (2k - 1) L_{k-1}
/// ```
///
/// Returns `(q, q', L_n)`
pub fn q_and_legendre(n: usize, x: f64) -> (f64, f64, f64) {
    let mut l_nm1 = 1.0; // L_{k-1}
    let mut l_n = x; // L_k
    let mut dl_nm1 = 0.0; // L'_{k-1}
    let mut dl_n = 1.0; // L'_k
    for k in 2..(n + 1) {
        let kk = k as f64;
        let l_nm2 = l_nm1;
        let dl_nm2 = dl_nm1;
        l_nm1 = l_n;
        dl_nm1 = dl_n;
        l_n = (2.0 * kk - 1.0) / kk * x * l_nm1 - (kk - 1.0) / kk * l_nm2;
        dl_n = dl_nm2 + (2.0 * kk - 1.0) * l_nm1;
    }
    let kk = (n + 1) as f64;
    let l_np1 = (2.0 * kk - 1.0) / kk * x * l_n - (kk - 1.0) / kk * l_nm1;
    let dl_np1 = dl_nm1 + (2.0 * kk - 1.0) * l_n;
    (l_np1 - l_nm1, dl_np1 - dl_nm1, l_n)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{q_and_legendre, GllQuadrature, GLL_MAX_ITERATIONS};
    use russell_lab::{approx_eq, vec_approx_eq};

    #[test]
    fn new_captures_errors() {
        assert_eq!(
            GllQuadrature::new(0, 0.0, 1.0).err(),
            Some("GLL quadrature requires order ≥ 1")
        );
        assert_eq!(
            GllQuadrature::new(2, 1.0, 1.0).err(),
            Some("GLL quadrature requires x1 < x2")
        );
    }

    #[test]
    fn newton_cap_is_reported() {
        // the asymptotic initial guess is not a root; one step cannot reach the tolerance
        assert_eq!(
            GllQuadrature::new_with_max_iterations(4, 0.0, 1.0, 1).err(),
            Some("GLL quadrature: Newton iteration did not converge")
        );
        let gll = GllQuadrature::new_with_max_iterations(4, 0.0, 1.0, GLL_MAX_ITERATIONS).unwrap();
        vec_approx_eq(gll.nodes(), GllQuadrature::unit_interval(4).unwrap().nodes(), 1e-15);
    }

    #[test]
    fn q_and_legendre_works() {
        // n = 2, x = 0.3
        //   L1 = x, L2 = (3x² - 1)/2, L3 = (5x³ - 3x)/2
        let (q, qp, ln) = q_and_legendre(2, 0.3);
        approx_eq(ln, -0.365, 1e-15);
        approx_eq(q, -0.3825 - 0.3, 1e-15);
        approx_eq(qp, -0.825 - 1.0, 1e-15);

        // n = 1 uses no loop: q = L2 - L0
        let (q, qp, ln) = q_and_legendre(1, 0.5);
        approx_eq(ln, 0.5, 1e-15);
        approx_eq(q, (3.0 * 0.25 - 1.0) / 2.0 - 1.0, 1e-15);
        approx_eq(qp, 1.5, 1e-15);
    }

    #[test]
    fn low_orders_match_closed_form() {
        let gll = GllQuadrature::unit_interval(1).unwrap();
        vec_approx_eq(gll.nodes(), &[0.0, 1.0], 1e-15);
        vec_approx_eq(gll.weights(), &[0.5, 0.5], 1e-15);

        let gll = GllQuadrature::unit_interval(2).unwrap();
        vec_approx_eq(gll.nodes(), &[0.0, 0.5, 1.0], 1e-15);
        vec_approx_eq(gll.weights(), &[1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0], 1e-15);

        // interior roots at ±1/√5 on [-1, 1]
        let gll = GllQuadrature::unit_interval(3).unwrap();
        let a = 0.5 / f64::sqrt(5.0);
        vec_approx_eq(gll.nodes(), &[0.0, 0.5 - a, 0.5 + a, 1.0], 1e-14);
        vec_approx_eq(gll.weights(), &[1.0 / 12.0, 5.0 / 12.0, 5.0 / 12.0, 1.0 / 12.0], 1e-14);

        // interior roots at 0 and ±√(3/7) on [-1, 1]
        let gll = GllQuadrature::new(4, -1.0, 1.0).unwrap();
        let b = f64::sqrt(3.0 / 7.0);
        vec_approx_eq(gll.nodes(), &[-1.0, -b, 0.0, b, 1.0], 1e-14);
        vec_approx_eq(gll.weights(), &[0.1, 49.0 / 90.0, 32.0 / 45.0, 49.0 / 90.0, 0.1], 1e-14);
    }

    #[test]
    fn nodes_and_weights_have_the_expected_structure() {
        for p in 1..13 {
            let gll = GllQuadrature::unit_interval(p).unwrap();
            let (x, w) = (gll.nodes(), gll.weights());
            assert_eq!(gll.order(), p);
            assert_eq!(x.len(), p + 1);
            assert_eq!(w.len(), p + 1);
            assert_eq!(x[0], 0.0);
            assert_eq!(x[p], 1.0);
            for i in 0..p {
                assert!(x[i] < x[i + 1], "nodes must be strictly increasing (p = {})", p);
            }
            for i in 0..(p + 1) {
                assert!(w[i] > 0.0);
                approx_eq(x[i] + x[p - i], 1.0, 1e-13);
                approx_eq(w[i], w[p - i], 1e-13);
            }
            approx_eq(w.iter().sum(), 1.0, 1e-13);
        }
    }

    #[test]
    fn interior_nodes_are_roots_of_q() {
        for p in 2..10 {
            let gll = GllQuadrature::new(p, -1.0, 1.0).unwrap();
            for z in &gll.nodes()[1..p] {
                let (q, _, _) = q_and_legendre(p, *z);
                assert!(f64::abs(q) < 1e-12, "q({}) = {} for p = {}", z, q, p);
            }
        }
    }

    #[test]
    fn integrate_is_exact_up_to_degree_2p_minus_1() {
        for p in 1..8 {
            let gll = GllQuadrature::unit_interval(p).unwrap();
            for k in 0..(2 * p) {
                let approx = gll.integrate(|x| x.powi(k as i32));
                approx_eq(approx, 1.0 / ((k + 1) as f64), 1e-13);
            }
        }
    }
}
