use crate::{
    accumulate, apply_dirichlet, assemble_operators, element_contributions, partition_elements, sample_nodal_values,
    BoundaryNodes, ElementMatrices1d, ElementMatrices2d, Failure, FnSpace2d, GllQuadrature, GlobalOperator,
    GlobalVector, LinearSolver, ManufacturedSolution, NodalVector, OwnedRange, ProblemConfig, SparseOperator,
    SpectralMesh, StrError, WithStage,
};
use rayon::prelude::*;
use russell_sparse::Genie;

/// Holds the results of a manufactured-solution run
#[derive(Clone, Debug)]
pub struct SolutionReport {
    /// Discrete error ‖u - u*‖₂ h
    pub error_norm: f64,

    /// Iterations reported by the linear solver
    pub iterations: usize,

    /// Number of global nodes
    pub ndof: usize,

    /// Number of boundary nodes
    pub n_boundary: usize,

    /// Nodal values of the discrete solution
    pub solution: Vec<f64>,
}

/// Implements the spectral-element solution of -Δu = f on the unit square with u = u* on the boundary
///
/// The element-local data is computed once and shared (read-only) by all workers.
pub struct SpectralPoisson {
    /// Mesh size and polynomial order
    pub config: ProblemConfig,

    /// GLL rule on [0, 1]
    pub quadrature: GllQuadrature,

    /// 1D element matrices
    pub element_1d: ElementMatrices1d,

    /// 2D element matrices
    pub element: ElementMatrices2d,

    /// Local-to-global map and node coordinates
    pub mesh: SpectralMesh,

    /// Nodes on the perimeter
    pub boundary: BoundaryNodes,
}

impl SpectralPoisson {
    /// Builds the element-local operators and the mesh
    pub fn new(config: ProblemConfig) -> Result<Self, Failure> {
        let quadrature = GllQuadrature::unit_interval(config.p).stage("quadrature")?;
        let element_1d = ElementMatrices1d::new(config.h(), &quadrature).stage("element matrices")?;
        let element = ElementMatrices2d::new(&element_1d);
        let mesh = SpectralMesh::new(&config, &quadrature).stage("mesh")?;
        let boundary = BoundaryNodes::new(&mesh);
        tracing::info!(m = config.m, p = config.p, ndof = mesh.ndof(), "built element operators");
        Ok(SpectralPoisson {
            config,
            quadrature,
            element_1d,
            element,
            mesh,
            boundary,
        })
    }

    /// Returns the number of global nodes
    pub fn ndof(&self) -> usize {
        self.mesh.ndof()
    }

    /// Accumulates the element operators of the owned range into the global stiffness and mass operators
    pub fn assemble<A, B>(&self, range: OwnedRange, stiffness: &mut A, mass: &mut B) -> Result<(), StrError>
    where
        A: GlobalOperator,
        B: GlobalOperator,
    {
        assemble_operators(&self.mesh, &self.element, range, stiffness, mass)
    }

    /// Inserts the point samples of f at the nodes of the owned elements
    pub fn sample<V>(&self, range: OwnedRange, f: FnSpace2d, vector: &mut V) -> Result<(), StrError>
    where
        V: GlobalVector,
    {
        sample_nodal_values(&self.mesh, range, f, vector)
    }

    /// Computes rhs = M q
    pub fn form_rhs<B, V>(&self, mass: &B, source: &V, rhs: &mut V) -> Result<(), StrError>
    where
        B: GlobalOperator,
        V: GlobalVector,
    {
        mass.mat_vec_mul(rhs, source)
    }

    /// Imposes u = g on the boundary (see [apply_dirichlet])
    pub fn apply_boundary_conditions<A, V>(
        &self,
        g: FnSpace2d,
        stiffness: &mut A,
        rhs: &mut V,
        guess: &mut V,
    ) -> Result<(), StrError>
    where
        A: GlobalOperator,
        V: GlobalVector,
    {
        apply_dirichlet(&self.boundary, g, stiffness, rhs, guess)?;
        rhs.finalize()?;
        guess.finalize()
    }

    /// Returns ‖u - u*‖₂ h
    pub fn error_norm<V>(&self, solution: &V, exact: &V) -> Result<f64, StrError>
    where
        V: GlobalVector + Clone,
    {
        let mut diff = solution.clone();
        diff.axpy(-1.0, exact)?;
        Ok(diff.norm()? * self.config.h())
    }

    /// Runs the full pipeline in-process with `n_worker` element ranges assembled in parallel
    ///
    /// The per-worker contributions are gathered concurrently and then accumulated in rank
    /// order; hence, the assembled operators do not depend on `n_worker`.
    pub fn solve_serial(
        &self,
        pair: &ManufacturedSolution,
        n_worker: usize,
        genie: Genie,
    ) -> Result<SolutionReport, Failure> {
        let ndof = self.ndof();
        let ranges = partition_elements(self.mesh.n_element(), n_worker).stage("partition")?;

        // assembly
        let mut stiffness = SparseOperator::new(ndof).stage("allocation")?;
        let mut mass = SparseOperator::new(ndof).stage("allocation")?;
        let parts: Vec<Vec<_>> = ranges
            .par_iter()
            .map(|range| element_contributions(&self.mesh, &self.element, *range).collect())
            .collect();
        for part in parts {
            accumulate(part, &mut stiffness, &mut mass).stage("assembly")?;
        }
        stiffness.finalize().stage("assembly")?;
        mass.finalize().stage("assembly")?;
        tracing::info!(n_worker, nnz = stiffness.nnz(), "assembled global operators");

        // source and exact solution samples
        let mut source = NodalVector::new(ndof).stage("allocation")?;
        let mut exact = NodalVector::new(ndof).stage("allocation")?;
        for range in &ranges {
            self.sample(*range, pair.source, &mut source).stage("sampling")?;
            self.sample(*range, pair.exact, &mut exact).stage("sampling")?;
        }
        source.finalize().stage("sampling")?;
        exact.finalize().stage("sampling")?;

        // right-hand side and boundary conditions
        let mut rhs = NodalVector::new(ndof).stage("allocation")?;
        let mut solution = NodalVector::new(ndof).stage("allocation")?;
        self.form_rhs(&mass, &source, &mut rhs).stage("right-hand side")?;
        self.apply_boundary_conditions(pair.exact, &mut stiffness, &mut rhs, &mut solution)
            .stage("boundary conditions")?;

        // solution and error
        let solver = LinearSolver::new(genie);
        let report = solver.solve(&stiffness, &rhs, &mut solution).stage("solve")?;
        let error_norm = self.error_norm(&solution, &exact).stage("error norm")?;
        tracing::info!(error_norm, iterations = report.iterations, "solved {}", pair.name);
        Ok(SolutionReport {
            error_norm,
            iterations: report.iterations,
            ndof,
            n_boundary: self.boundary.len(),
            solution: solution.values().stage("error norm")?.as_data().to_vec(),
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
