use crate::ElementMatrices1d;
use russell_lab::Matrix;

/// Holds the 2D (tensor-product) element mass and stiffness matrices
///
/// Local nodes are numbered row-major over the (p + 1) × (p + 1) grid:
///
/// ```text
///  l (y)
///  ↑
///  6---7---8
///  |   |   |     local index = l (p + 1) + k
///  3---4---5
///  |   |   |
///  0---1---2 → k (x)
/// ```
///
/// With (i1, j1) along x and (i2, j2) along y:
///
/// ```text
///      Mass2D[(i2,i1),(j2,j1)] = M[i1,j1] M[i2,j2]
/// Stiffness2D[(i2,i1),(j2,j1)] = K[i1,j1] M[i2,j2] + M[i1,j1] K[i2,j2]
/// ```
#[derive(Clone, Debug)]
pub struct ElementMatrices2d {
    /// (p + 1)² × (p + 1)² mass matrix
    pub mass: Matrix,

    /// (p + 1)² × (p + 1)² stiffness matrix (negative Laplacian)
    pub stiffness: Matrix,
}

impl ElementMatrices2d {
    /// Extends the 1D element matrices into 2D via tensor products
    pub fn new(e1d: &ElementMatrices1d) -> Self {
        let n = e1d.nnode();
        let dim = n * n;
        let (mm, kk) = (&e1d.mass, &e1d.stiffness);
        let mut mass = Matrix::new(dim, dim);
        let mut stiffness = Matrix::new(dim, dim);
        for i2 in 0..n {
            for i1 in 0..n {
                let row = i2 * n + i1;
                for j2 in 0..n {
                    for j1 in 0..n {
                        let col = j2 * n + j1;
                        mass.set(row, col, mm.get(i1, j1) * mm.get(i2, j2));
                        stiffness.set(
                            row,
                            col,
                            kk.get(i1, j1) * mm.get(i2, j2) + mm.get(i1, j1) * kk.get(i2, j2),
                        );
                    }
                }
            }
        }
        ElementMatrices2d { mass, stiffness }
    }

    /// Returns the number of local degrees of freedom (p + 1)²
    pub fn ndof(&self) -> usize {
        self.mass.nrow()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
