use crate::{lagrange_basis, lagrange_basis_deriv, GllQuadrature, StrError};
use russell_lab::Matrix;

/// Holds the 1D element mass and stiffness matrices of a spectral element
///
/// ```text
/// M[i,j] =   H   Σ_k w_k ℓ_i(x_k)  ℓ_j(x_k)
/// K[i,j] = (1/H) Σ_k w_k ℓ'_i(x_k) ℓ'_j(x_k)
/// ```
///
/// **Note:** The quadrature points coincide with the basis nodes (GLL/GLL); hence,
/// the mass matrix comes out diagonal.
#[derive(Clone, Debug)]
pub struct ElementMatrices1d {
    /// Element width H
    pub h: f64,

    /// (p + 1) × (p + 1) mass matrix
    pub mass: Matrix,

    /// (p + 1) × (p + 1) stiffness matrix
    pub stiffness: Matrix,
}

impl ElementMatrices1d {
    /// Computes the 1D element matrices
    ///
    /// # Input
    ///
    /// * `h` -- element width (> 0)
    /// * `quadrature` -- GLL rule on [0, 1]; its nodes also define the Lagrange basis
    pub fn new(h: f64, quadrature: &GllQuadrature) -> Result<Self, StrError> {
        if h <= 0.0 {
            return Err("element width must be positive");
        }
        let x = quadrature.nodes();
        let w = quadrature.weights();
        let n = x.len();

        // basis values and derivatives at the quadrature points: phi[k][i] = ℓ_i(x_k)
        let phi: Vec<Vec<f64>> = x
            .iter()
            .map(|xk| (0..n).map(|i| lagrange_basis(i, x, *xk)).collect())
            .collect();
        let dphi: Vec<Vec<f64>> = x
            .iter()
            .map(|xk| (0..n).map(|i| lagrange_basis_deriv(i, x, *xk)).collect())
            .collect();

        let mut mass = Matrix::new(n, n);
        let mut stiffness = Matrix::new(n, n);
        for i in 0..n {
            for j in 0..n {
                let mut mij = 0.0;
                let mut kij = 0.0;
                for k in 0..n {
                    mij += w[k] * phi[k][i] * phi[k][j];
                    kij += w[k] * dphi[k][i] * dphi[k][j];
                }
                mass.set(i, j, h * mij);
                stiffness.set(i, j, kij / h);
            }
        }
        Ok(ElementMatrices1d { h, mass, stiffness })
    }

    /// Returns the number of local nodes (p + 1)
    pub fn nnode(&self) -> usize {
        self.mass.nrow()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
