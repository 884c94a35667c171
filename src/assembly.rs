use crate::{ElementMatrices2d, FnSpace2d, GlobalOperator, GlobalVector, OwnedRange, SpectralMesh, StrError};
use russell_lab::Matrix;

/// Holds the contribution of one element to the global operators
///
/// This is pure data: the global indices plus references to the (shared) element matrices.
pub struct ElementContribution<'a> {
    /// Element index
    pub element: usize,

    /// Global indices of the local nodes (local order)
    pub dofs: Vec<usize>,

    /// Element mass matrix
    pub mass: &'a Matrix,

    /// Element stiffness matrix
    pub stiffness: &'a Matrix,
}

/// Returns the contributions of all elements in the owned range
///
/// All elements are congruent squares; hence, they share the same local matrices.
pub fn element_contributions<'a>(
    mesh: &'a SpectralMesh,
    matrices: &'a ElementMatrices2d,
    range: OwnedRange,
) -> impl Iterator<Item = ElementContribution<'a>> + 'a {
    range.elements().map(move |e| ElementContribution {
        element: e,
        dofs: mesh.element_dofs(e),
        mass: &matrices.mass,
        stiffness: &matrices.stiffness,
    })
}

/// Accumulates a sequence of element contributions into the global operators
pub fn accumulate<'a, A, B, I>(contributions: I, stiffness: &mut A, mass: &mut B) -> Result<usize, StrError>
where
    A: GlobalOperator,
    B: GlobalOperator,
    I: IntoIterator<Item = ElementContribution<'a>>,
{
    let mut count = 0;
    for c in contributions {
        stiffness.add_block(&c.dofs, &c.dofs, c.stiffness)?;
        mass.add_block(&c.dofs, &c.dofs, c.mass)?;
        count += 1;
    }
    Ok(count)
}

/// Assembles the global stiffness and mass operators over the owned range
///
/// **Note:** The operators must still be finalized by the caller (all workers must finish first).
pub fn assemble_operators<A, B>(
    mesh: &SpectralMesh,
    matrices: &ElementMatrices2d,
    range: OwnedRange,
    stiffness: &mut A,
    mass: &mut B,
) -> Result<(), StrError>
where
    A: GlobalOperator,
    B: GlobalOperator,
{
    let count = accumulate(element_contributions(mesh, matrices, range), stiffness, mass)?;
    tracing::debug!(start = range.start, end = range.end, count, "assembled element operators");
    Ok(())
}

/// Samples f at the local nodes of element e (local order)
pub fn element_samples(mesh: &SpectralMesh, e: usize, f: FnSpace2d) -> Vec<f64> {
    mesh.element_points(e).iter().map(|(x, y)| f(*x, *y)).collect()
}

/// Inserts point samples of f at the nodes of every element in the owned range
///
/// Shared nodes receive the same value from each neighbor (insert semantics).
pub fn sample_nodal_values<V>(
    mesh: &SpectralMesh,
    range: OwnedRange,
    f: FnSpace2d,
    vector: &mut V,
) -> Result<(), StrError>
where
    V: GlobalVector,
{
    for e in range.elements() {
        let dofs = mesh.element_dofs(e);
        let values = element_samples(mesh, e, f);
        vector.set_values(&dofs, &values)?;
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{assemble_operators, element_contributions, element_samples, sample_nodal_values};
    use crate::{
        partition_elements, ElementMatrices1d, ElementMatrices2d, GllQuadrature, GlobalOperator, GlobalVector,
        NodalVector, OwnedRange, ProblemConfig, SparseOperator, SpectralMesh,
    };
    use russell_lab::{approx_eq, vec_approx_eq};

    fn setup(m: usize, p: usize) -> (SpectralMesh, ElementMatrices2d) {
        let config = ProblemConfig::new(m, p).unwrap();
        let gll = GllQuadrature::unit_interval(p).unwrap();
        let mesh = SpectralMesh::new(&config, &gll).unwrap();
        let e1d = ElementMatrices1d::new(config.h(), &gll).unwrap();
        (mesh, ElementMatrices2d::new(&e1d))
    }

    #[test]
    fn element_contributions_work() {
        let (mesh, matrices) = setup(3, 2);
        let range = OwnedRange { start: 2, end: 5 };
        let all: Vec<_> = element_contributions(&mesh, &matrices, range).collect();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].element, 2);
        assert_eq!(all[0].dofs, mesh.element_dofs(2));
        assert_eq!(all[2].dofs.len(), 9);
        assert_eq!(all[1].mass.dims(), (9, 9));
    }

    #[test]
    fn assembled_operators_conserve_constants() {
        let (m, p) = (3, 3);
        let (mesh, matrices) = setup(m, p);
        let n = mesh.ndof();
        let mut kk = SparseOperator::new(n).unwrap();
        let mut mm = SparseOperator::new(n).unwrap();
        assemble_operators(&mesh, &matrices, OwnedRange::all(mesh.n_element()), &mut kk, &mut mm).unwrap();
        kk.finalize().unwrap();
        mm.finalize().unwrap();

        // K 1 = 0 and 1ᵀ M 1 = area of the unit square
        let mut ones = NodalVector::new(n).unwrap();
        ones.set_values(&(0..n).collect::<Vec<_>>(), &vec![1.0; n]).unwrap();
        ones.finalize().unwrap();
        let mut res = NodalVector::new(n).unwrap();
        kk.mat_vec_mul(&mut res, &ones).unwrap();
        vec_approx_eq(res.values().unwrap().as_data(), &vec![0.0; n], 1e-10);
        mm.mat_vec_mul(&mut res, &ones).unwrap();
        let area: f64 = res.values().unwrap().as_data().iter().sum();
        approx_eq(area, 1.0, 1e-13);

        // symmetric
        for (i, j, v) in kk.triplets().unwrap() {
            approx_eq(kk.get(j, i).unwrap(), v, 1e-10);
        }
    }

    #[test]
    fn assembly_does_not_depend_on_the_partition() {
        let (mesh, matrices) = setup(4, 2);
        let n = mesh.ndof();
        let mut kk_one = SparseOperator::new(n).unwrap();
        let mut mm_one = SparseOperator::new(n).unwrap();
        assemble_operators(&mesh, &matrices, OwnedRange::all(16), &mut kk_one, &mut mm_one).unwrap();
        kk_one.finalize().unwrap();
        let mut kk_many = SparseOperator::new(n).unwrap();
        let mut mm_many = SparseOperator::new(n).unwrap();
        for range in partition_elements(16, 3).unwrap() {
            assemble_operators(&mesh, &matrices, range, &mut kk_many, &mut mm_many).unwrap();
        }
        kk_many.finalize().unwrap();
        let one: Vec<_> = kk_one.triplets().unwrap().collect();
        let many: Vec<_> = kk_many.triplets().unwrap().collect();
        assert_eq!(one, many);
        assert_eq!(kk_one.nnz(), mesh.sparsity_pattern().len());
    }

    #[test]
    fn sample_nodal_values_work() {
        let (mesh, _) = setup(2, 2);
        let f = |x: f64, y: f64| x + 10.0 * y;
        let samples = element_samples(&mesh, 3, f);
        vec_approx_eq(&samples[0..3], &[5.5, 5.75, 6.0], 1e-14);
        let mut q = NodalVector::new(mesh.ndof()).unwrap();
        sample_nodal_values(&mesh, OwnedRange::all(4), f, &mut q).unwrap();
        q.finalize().unwrap();
        for g in 0..mesh.ndof() {
            let (x, y) = mesh.node_coordinates(g);
            assert_eq!(q.values().unwrap()[g], f(x, y));
        }
    }
}
