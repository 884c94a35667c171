use crate::{GlobalOperator, GlobalVector, SparseOperator, StrError};
use russell_lab::Vector;
use russell_sparse::{Genie, LinSolver};

/// Holds information about a completed linear solve
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolveReport {
    /// Number of iterations performed (a direct solver reports 1)
    pub iterations: usize,
}

/// Solves A x = b for a finalized global operator
///
/// The guess vector carries the initial solution (with the Dirichlet values already in place)
/// and receives the computed solution.
#[derive(Clone, Copy, Debug)]
pub struct LinearSolver {
    genie: Genie,
}

impl LinearSolver {
    /// Allocates a new instance
    pub fn new(genie: Genie) -> Self {
        LinearSolver { genie }
    }

    /// Returns the underlying sparse solver kind
    pub fn genie(&self) -> Genie {
        self.genie
    }

    /// Factorizes the operator and solves the system
    pub fn solve<V>(&self, operator: &SparseOperator, rhs: &V, solution: &mut V) -> Result<SolveReport, StrError>
    where
        V: GlobalVector,
    {
        if rhs.dim() != operator.dim() || solution.dim() != operator.dim() {
            return Err("vector dimensions are incompatible with the operator");
        }
        let one_based = self.genie == Genie::Mumps;
        let mut mat = operator.to_sparse_matrix(one_based)?;
        let mut solver = LinSolver::new(self.genie)?;
        solver.actual.factorize(&mut mat, None)?;
        let mut x: Vector = solution.values()?.clone();
        solver.actual.solve(&mut x, &mat, rhs.values()?, false)?;
        solution.assign(x)?;
        tracing::debug!(genie = ?self.genie, dim = operator.dim(), "solved linear system");
        Ok(SolveReport { iterations: 1 })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::LinearSolver;
    use crate::{GlobalOperator, GlobalVector, NodalVector, SparseOperator};
    use russell_lab::{vec_approx_eq, Matrix};
    use russell_sparse::Genie;

    #[test]
    fn solve_works() {
        //  2  -1   0       x0       1
        // -1   2  -1   ×   x1   =   0
        //  0  -1   2       x2       1
        let mut aa = SparseOperator::new(3).unwrap();
        let block = Matrix::from(&[[1.0, -1.0], [-1.0, 1.0]]);
        aa.add_block(&[0, 1], &[0, 1], &block).unwrap();
        aa.add_block(&[1, 2], &[1, 2], &block).unwrap();
        aa.add_block(&[0], &[0], &Matrix::from(&[[1.0]])).unwrap();
        aa.add_block(&[2], &[2], &Matrix::from(&[[1.0]])).unwrap();
        aa.finalize().unwrap();
        let mut b = NodalVector::new(3).unwrap();
        b.set_values(&[0, 2], &[1.0, 1.0]).unwrap();
        b.finalize().unwrap();
        let mut x = NodalVector::new(3).unwrap();
        let solver = LinearSolver::new(Genie::Umfpack);
        let report = solver.solve(&aa, &b, &mut x).unwrap();
        assert_eq!(report.iterations, 1);
        vec_approx_eq(x.values().unwrap().as_data(), &[1.0, 1.0, 1.0], 1e-14);
    }

    #[test]
    fn solve_captures_errors() {
        let mut aa = SparseOperator::new(2).unwrap();
        aa.add_block(&[0, 1], &[0, 1], &Matrix::from(&[[2.0, 0.0], [0.0, 2.0]]))
            .unwrap();
        let b = NodalVector::new(2).unwrap();
        let mut x = NodalVector::new(2).unwrap();
        let solver = LinearSolver::new(Genie::Umfpack);
        assert_eq!(
            solver.solve(&aa, &b, &mut x).err(),
            Some("operator must be finalized before it can be read")
        );
        aa.finalize().unwrap();
        let mut wrong = NodalVector::new(3).unwrap();
        assert_eq!(
            solver.solve(&aa, &b, &mut wrong).err(),
            Some("vector dimensions are incompatible with the operator")
        );
    }
}
