use crate::{FnSpace2d, GlobalOperator, GlobalVector, SpectralMesh, StrError};

/// Specifies the (boundary) side of the unit square
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Bottom,
    Top,
}

/// Holds the global nodes on the perimeter of the unit square and their coordinates
///
/// Each boundary node is listed exactly once; corners belong to the bottom and top edges:
///
/// ```text
///  T   T   T   T   T     bottom: row 0,     all columns
///  L   .   .   .   R     top:    row p m,   all columns
///  L   .   .   .   R     left:   column 0,   rows 1 ..= p m - 1
///  L   .   .   .   R     right:  column p m, rows 1 ..= p m - 1
///  B   B   B   B   B
/// ```
///
/// Total: 2 (p m + 1) + 2 (p m - 1) = 4 p m nodes.
#[derive(Clone, Debug)]
pub struct BoundaryNodes {
    bottom: Vec<usize>, // indices of nodes on the bottom edge (with corners)
    top: Vec<usize>,    // indices of nodes on the top edge (with corners)
    left: Vec<usize>,   // indices of nodes on the left edge (without corners)
    right: Vec<usize>,  // indices of nodes on the right edge (without corners)

    /// All boundary nodes: bottom, left, right, top
    pub dofs: Vec<usize>,

    /// Physical coordinates (x, y) of each entry in `dofs`
    pub coords: Vec<(f64, f64)>,
}

impl BoundaryNodes {
    /// Collects the boundary nodes of the mesh
    pub fn new(mesh: &SpectralMesh) -> Self {
        let n = mesh.nodes_per_side();
        let last = n - 1; // = p m
        let bottom: Vec<usize> = (0..n).collect();
        let top: Vec<usize> = ((last * n)..(n * n)).collect();
        let left: Vec<usize> = (1..last).map(|row| row * n).collect();
        let right: Vec<usize> = (1..last).map(|row| row * n + last).collect();
        let dofs: Vec<usize> = bottom
            .iter()
            .chain(left.iter())
            .chain(right.iter())
            .chain(top.iter())
            .copied()
            .collect();
        let coords = dofs.iter().map(|g| mesh.node_coordinates(*g)).collect();
        BoundaryNodes {
            bottom,
            top,
            left,
            right,
            dofs,
            coords,
        }
    }

    /// Returns the number of boundary nodes (4 p m)
    pub fn len(&self) -> usize {
        self.dofs.len()
    }

    /// Tells whether there are no boundary nodes (never, for a valid mesh)
    pub fn is_empty(&self) -> bool {
        self.dofs.is_empty()
    }

    /// Returns the nodes on one side
    ///
    /// **Note:** The corners are only listed by the bottom and top sides.
    pub fn side(&self, side: Side) -> &[usize] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
            Side::Bottom => &self.bottom,
            Side::Top => &self.top,
        }
    }

    /// Evaluates the boundary function at every boundary node
    pub fn values(&self, g: FnSpace2d) -> Vec<f64> {
        self.coords.iter().map(|(x, y)| g(*x, *y)).collect()
    }
}

/// Imposes the Dirichlet condition u = g on the boundary (lifting)
///
/// For every boundary node i:
///
/// * `rhs[i] = guess[i] = g(x_i, y_i)`
/// * row i of the stiffness operator is zeroed and 1 is put on the diagonal
///
/// **Note:** The stiffness operator must have been finalized. The vectors must be
/// finalized by the caller afterwards.
pub fn apply_dirichlet<A, V>(
    boundary: &BoundaryNodes,
    g: FnSpace2d,
    stiffness: &mut A,
    rhs: &mut V,
    guess: &mut V,
) -> Result<(), StrError>
where
    A: GlobalOperator,
    V: GlobalVector,
{
    let values = boundary.values(g);
    rhs.set_values(&boundary.dofs, &values)?;
    guess.set_values(&boundary.dofs, &values)?;
    stiffness.zero_rows(&boundary.dofs, 1.0)?;
    tracing::debug!(n_boundary = boundary.len(), "imposed Dirichlet conditions");
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
