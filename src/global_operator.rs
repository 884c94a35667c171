use crate::StrError;
use russell_lab::{vec_norm, vec_update, Matrix, Norm, Vector};
use russell_sparse::{CooMatrix, SparseMatrix};
use std::collections::{BTreeMap, HashSet};

/// Defines the contract of a (possibly distributed) global operator
///
/// **Notes:**
///
/// * `add_block` accumulates: repeated (row, col) pairs are summed, never overwritten
/// * Reads (`mat_vec_mul`) and `zero_rows` require a preceding `finalize` (the assembly fence)
/// * Any write after `finalize` requires another `finalize`
pub trait GlobalOperator {
    /// Returns the dimension of the (square) operator
    fn dim(&self) -> usize;

    /// Adds the dense block `values` at rows × cols
    fn add_block(&mut self, rows: &[usize], cols: &[usize], values: &Matrix) -> Result<(), StrError>;

    /// Completes the assembly; afterwards, reads are consistent
    fn finalize(&mut self) -> Result<(), StrError>;

    /// Zeroes the selected rows and puts `diagonal` on their diagonal entries
    fn zero_rows(&mut self, rows: &[usize], diagonal: f64) -> Result<(), StrError>;

    /// Computes v = A u
    fn mat_vec_mul<V: GlobalVector>(&self, v: &mut V, u: &V) -> Result<(), StrError>;
}

/// Defines the contract of a (possibly distributed) global vector
///
/// `set_values` inserts (overwrites); values written by different workers to the same
/// index must agree.
pub trait GlobalVector {
    /// Returns the dimension of the vector
    fn dim(&self) -> usize;

    /// Sets values[i] at indices[i]
    fn set_values(&mut self, indices: &[usize], values: &[f64]) -> Result<(), StrError>;

    /// Completes the assembly; afterwards, reads are consistent
    fn finalize(&mut self) -> Result<(), StrError>;

    /// Replaces all values with an already consistent vector (e.g., a product or a solution)
    fn assign(&mut self, values: Vector) -> Result<(), StrError>;

    /// Returns the finalized values
    fn values(&self) -> Result<&Vector, StrError>;

    /// Returns the Euclidean norm
    fn norm(&self) -> Result<f64, StrError>;

    /// Computes self ← self + alpha x
    fn axpy(&mut self, alpha: f64, x: &Self) -> Result<(), StrError>;
}

/// Implements an in-process global operator with accumulate semantics
///
/// Entries are kept sorted by (row, col); hence, the assembly order does not affect the layout.
#[derive(Clone, Debug)]
pub struct SparseOperator {
    dim: usize,                             // number of rows (and columns)
    entries: BTreeMap<(usize, usize), f64>, // (row, col) ⇒ accumulated value
    finalized: bool,                        // assembly fence passed and no write since
}

impl SparseOperator {
    /// Allocates a new (empty) instance
    pub fn new(dim: usize) -> Result<Self, StrError> {
        if dim < 1 {
            return Err("dim must be ≥ 1");
        }
        Ok(SparseOperator {
            dim,
            entries: BTreeMap::new(),
            finalized: false,
        })
    }

    /// Adds a value to entry (i, j)
    pub fn put(&mut self, i: usize, j: usize, value: f64) -> Result<(), StrError> {
        if i >= self.dim {
            return Err("row index is out of range");
        }
        if j >= self.dim {
            return Err("column index is out of range");
        }
        *self.entries.entry((i, j)).or_insert(0.0) += value;
        self.finalized = false;
        Ok(())
    }

    /// Returns the number of stored entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Returns the value at (i, j) (zero if not stored)
    pub fn get(&self, i: usize, j: usize) -> Result<f64, StrError> {
        if !self.finalized {
            return Err("operator must be finalized before it can be read");
        }
        Ok(self.entries.get(&(i, j)).copied().unwrap_or(0.0))
    }

    /// Returns an iterator over the stored (row, col, value) triplets in (row, col) order
    pub fn triplets(&self) -> Result<impl Iterator<Item = (usize, usize, f64)> + '_, StrError> {
        if !self.finalized {
            return Err("operator must be finalized before it can be read");
        }
        Ok(self.entries.iter().map(|((i, j), v)| (*i, *j, *v)))
    }

    /// Returns a dense copy (useful for small systems and tests)
    pub fn as_dense(&self) -> Result<Matrix, StrError> {
        let mut dense = Matrix::new(self.dim, self.dim);
        for (i, j, v) in self.triplets()? {
            dense.set(i, j, v);
        }
        Ok(dense)
    }

    /// Copies the finalized entries into a COO matrix
    ///
    /// Use `one_based = true` with MUMPS.
    pub fn to_coo(&self, one_based: bool) -> Result<CooMatrix, StrError> {
        if !self.finalized {
            return Err("operator must be finalized before it can be read");
        }
        let mut coo = CooMatrix::new(self.dim, self.dim, usize::max(1, self.nnz()), None, one_based)?;
        for ((i, j), v) in &self.entries {
            coo.put(*i, *j, *v)?;
        }
        Ok(coo)
    }

    /// Converts the finalized operator into a sparse matrix for the linear solver
    ///
    /// Use `one_based = true` with MUMPS.
    pub fn to_sparse_matrix(&self, one_based: bool) -> Result<SparseMatrix, StrError> {
        Ok(SparseMatrix::from_coo(self.to_coo(one_based)?))
    }
}

impl GlobalOperator for SparseOperator {
    fn dim(&self) -> usize {
        self.dim
    }

    fn add_block(&mut self, rows: &[usize], cols: &[usize], values: &Matrix) -> Result<(), StrError> {
        if values.dims() != (rows.len(), cols.len()) {
            return Err("block dimensions are incompatible with the index lists");
        }
        for (a, i) in rows.iter().enumerate() {
            for (b, j) in cols.iter().enumerate() {
                self.put(*i, *j, values.get(a, b))?;
            }
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), StrError> {
        self.finalized = true;
        Ok(())
    }

    fn zero_rows(&mut self, rows: &[usize], diagonal: f64) -> Result<(), StrError> {
        if !self.finalized {
            return Err("operator must be finalized before zeroing rows");
        }
        if rows.iter().any(|i| *i >= self.dim) {
            return Err("row index is out of range");
        }
        let selected: HashSet<usize> = rows.iter().copied().collect();
        self.entries.retain(|(i, _), _| !selected.contains(i));
        for i in selected {
            self.entries.insert((i, i), diagonal);
        }
        Ok(())
    }

    fn mat_vec_mul<V: GlobalVector>(&self, v: &mut V, u: &V) -> Result<(), StrError> {
        if !self.finalized {
            return Err("operator must be finalized before it can be read");
        }
        if u.dim() != self.dim || v.dim() != self.dim {
            return Err("vector dimensions are incompatible with the operator");
        }
        let coo = self.to_coo(false)?;
        let mut vv = Vector::new(self.dim);
        coo.mat_vec_mul(&mut vv, 1.0, u.values()?)?;
        v.assign(vv)
    }
}

/// Implements an in-process global vector with insert semantics
#[derive(Clone, Debug)]
pub struct NodalVector {
    values: Vector,  // current values
    finalized: bool, // assembly fence passed and no write since
}

impl NodalVector {
    /// Allocates a new zeroed instance
    ///
    /// A zeroed vector is consistent; hence, it starts finalized.
    pub fn new(dim: usize) -> Result<Self, StrError> {
        if dim < 1 {
            return Err("dim must be ≥ 1");
        }
        Ok(NodalVector {
            values: Vector::new(dim),
            finalized: true,
        })
    }
}

impl GlobalVector for NodalVector {
    fn dim(&self) -> usize {
        self.values.dim()
    }

    fn set_values(&mut self, indices: &[usize], values: &[f64]) -> Result<(), StrError> {
        if indices.len() != values.len() {
            return Err("indices and values must have the same length");
        }
        let dim = self.values.dim();
        for (i, v) in indices.iter().zip(values) {
            if *i >= dim {
                return Err("vector index is out of range");
            }
            self.values[*i] = *v;
        }
        self.finalized = false;
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), StrError> {
        self.finalized = true;
        Ok(())
    }

    fn assign(&mut self, values: Vector) -> Result<(), StrError> {
        if values.dim() != self.values.dim() {
            return Err("vector dimensions are incompatible");
        }
        self.values = values;
        self.finalized = true;
        Ok(())
    }

    fn values(&self) -> Result<&Vector, StrError> {
        if !self.finalized {
            return Err("vector must be finalized before it can be read");
        }
        Ok(&self.values)
    }

    fn norm(&self) -> Result<f64, StrError> {
        Ok(vec_norm(self.values()?, Norm::Euc))
    }

    fn axpy(&mut self, alpha: f64, x: &Self) -> Result<(), StrError> {
        if x.dim() != self.dim() {
            return Err("vector dimensions are incompatible");
        }
        let xx = x.values()?;
        if !self.finalized {
            return Err("vector must be finalized before it can be read");
        }
        vec_update(&mut self.values, alpha, xx)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
