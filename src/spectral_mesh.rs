use crate::{GllQuadrature, ProblemConfig, StrError};

/// Maps element-local nodes onto the global (p m + 1) × (p m + 1) nodal grid
///
/// ```text
///  global node g  ⟷  (col, row) = (g mod (p m + 1), g div (p m + 1))
///
///  element e, local node (k, l) in [0, p] × [0, p]:
///
///  g = p (p m + 1) (e div m) + p (e mod m) + l (p m + 1) + k
/// ```
///
/// Neighboring elements share the nodes on their common edges and corners.
#[derive(Clone, Debug)]
pub struct SpectralMesh {
    m: usize,        // number of elements along each direction
    p: usize,        // polynomial order
    h: f64,          // element width
    nodes: Vec<f64>, // (p + 1) GLL nodes on [0, 1]
}

impl SpectralMesh {
    /// Allocates a new instance
    ///
    /// # Input
    ///
    /// * `config` -- mesh size and polynomial order
    /// * `quadrature` -- GLL rule on [0, 1] whose order must equal `config.p`
    pub fn new(config: &ProblemConfig, quadrature: &GllQuadrature) -> Result<Self, StrError> {
        if quadrature.order() != config.p {
            return Err("the quadrature order must equal the polynomial order");
        }
        Ok(SpectralMesh {
            m: config.m,
            p: config.p,
            h: config.h(),
            nodes: quadrature.nodes().to_vec(),
        })
    }

    /// Returns the number of elements along each direction
    pub fn m(&self) -> usize {
        self.m
    }

    /// Returns the polynomial order
    pub fn p(&self) -> usize {
        self.p
    }

    /// Returns the element width
    pub fn h(&self) -> f64 {
        self.h
    }

    /// Returns the total number of elements
    pub fn n_element(&self) -> usize {
        self.m * self.m
    }

    /// Returns the number of global nodes along each side (p m + 1)
    pub fn nodes_per_side(&self) -> usize {
        self.p * self.m + 1
    }

    /// Returns the total number of global nodes (p m + 1)²
    pub fn ndof(&self) -> usize {
        self.nodes_per_side() * self.nodes_per_side()
    }

    /// Returns the number of local nodes per element (p + 1)²
    pub fn ndof_local(&self) -> usize {
        (self.p + 1) * (self.p + 1)
    }

    /// Returns the global index of the local node (k, l) of element e
    pub fn global_index(&self, e: usize, k: usize, l: usize) -> usize {
        let (m, p) = (self.m, self.p);
        let n = self.nodes_per_side();
        p * n * (e / m) + p * (e % m) + l * n + k
    }

    /// Returns the global indices of all local nodes of element e
    ///
    /// The list follows the local numbering `l (p + 1) + k`, i.e., k runs fastest.
    pub fn element_dofs(&self, e: usize) -> Vec<usize> {
        let mut dofs = Vec::with_capacity(self.ndof_local());
        for l in 0..(self.p + 1) {
            for k in 0..(self.p + 1) {
                dofs.push(self.global_index(e, k, l));
            }
        }
        dofs
    }

    /// Returns the physical coordinate of the grid line c in [0, p m]
    ///
    /// ```text
    /// coord(c) = (c div p + node[c mod p]) / m
    /// ```
    pub fn grid_coordinate(&self, c: usize) -> f64 {
        ((c / self.p) as f64 + self.nodes[c % self.p]) / (self.m as f64)
    }

    /// Returns the physical coordinates (x, y) of global node g
    pub fn node_coordinates(&self, g: usize) -> (f64, f64) {
        let n = self.nodes_per_side();
        (self.grid_coordinate(g % n), self.grid_coordinate(g / n))
    }

    /// Returns the lower-left corner (x, y) of element e
    pub fn element_origin(&self, e: usize) -> (f64, f64) {
        (self.h * ((e % self.m) as f64), self.h * ((e / self.m) as f64))
    }

    /// Returns the physical coordinates of all local nodes of element e
    ///
    /// The points equal `(x + h node[k], y + h node[l])` where (x, y) is the element origin;
    /// they are computed through the global grid so that shared nodes get identical values.
    pub fn element_points(&self, e: usize) -> Vec<(f64, f64)> {
        self.element_dofs(e)
            .iter()
            .map(|g| self.node_coordinates(*g))
            .collect()
    }

    /// Returns the sorted list of unique (row, col) pairs touched by the element blocks
    pub fn sparsity_pattern(&self) -> Vec<(usize, usize)> {
        let nl = self.ndof_local();
        let mut pattern = Vec::with_capacity(self.n_element() * nl * nl);
        for e in 0..self.n_element() {
            let dofs = self.element_dofs(e);
            for i in &dofs {
                for j in &dofs {
                    pattern.push((*i, *j));
                }
            }
        }
        pattern.sort_unstable();
        pattern.dedup();
        pattern
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
