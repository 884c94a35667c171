use crate::{GlobalOperator, SparseOperator, StrError};
use russell_lab::Vector;

/// Packs the finalized local entries into a buffer parallel to the sparsity pattern
///
/// Summing these buffers over all ranks (e.g., by an allreduce) yields the global values.
/// The pattern must be sorted and shared by all ranks.
pub fn pack_entries(pattern: &[(usize, usize)], local: &SparseOperator) -> Result<Vec<f64>, StrError> {
    let mut buffer = vec![0.0; pattern.len()];
    for (i, j, v) in local.triplets()? {
        let k = pattern
            .binary_search(&(i, j))
            .map_err(|_| "entry is outside of the sparsity pattern")?;
        buffer[k] = v;
    }
    Ok(buffer)
}

/// Rebuilds the (finalized) global operator from the buffer summed over all ranks
pub fn unpack_entries(dim: usize, pattern: &[(usize, usize)], summed: &[f64]) -> Result<SparseOperator, StrError> {
    if summed.len() != pattern.len() {
        return Err("the summed buffer must be parallel to the sparsity pattern");
    }
    let mut global = SparseOperator::new(dim)?;
    for ((i, j), v) in pattern.iter().zip(summed) {
        global.put(*i, *j, *v)?;
    }
    global.finalize()?;
    Ok(global)
}

/// Records the values inserted by one rank between two fences
///
/// The merge over all ranks happens in two reductions:
///
/// 1. `claims` reduced with min gives the owner of each index (the lowest inserting rank)
/// 2. `contributions` reduced with sum gives each owned value exactly once
#[derive(Clone, Debug)]
pub struct InsertBuffer {
    values: Vec<f64>, // last inserted value of each index
    flags: Vec<bool>, // index was inserted since the last clear
}

impl InsertBuffer {
    /// Allocates a new (empty) instance
    pub fn new(dim: usize) -> Self {
        InsertBuffer {
            values: vec![0.0; dim],
            flags: vec![false; dim],
        }
    }

    /// Returns the dimension
    pub fn dim(&self) -> usize {
        self.values.len()
    }

    /// Sets values[i] at indices[i]
    pub fn insert(&mut self, indices: &[usize], values: &[f64]) -> Result<(), StrError> {
        if indices.len() != values.len() {
            return Err("indices and values must have the same length");
        }
        for (i, v) in indices.iter().zip(values) {
            if *i >= self.values.len() {
                return Err("vector index is out of range");
            }
            self.values[*i] = *v;
            self.flags[*i] = true;
        }
        Ok(())
    }

    /// Returns the rank for inserted indices and `size` (no claim) otherwise
    pub fn claims(&self, rank: u32, size: u32) -> Vec<u32> {
        self.flags.iter().map(|set| if *set { rank } else { size }).collect()
    }

    /// Returns the inserted values of the indices owned by this rank and zero elsewhere
    pub fn contributions(&self, owners: &[u32], rank: u32) -> Result<Vec<f64>, StrError> {
        if owners.len() != self.values.len() {
            return Err("owners must have the same length as the buffer");
        }
        Ok(owners
            .iter()
            .zip(&self.values)
            .map(|(owner, v)| if *owner == rank { *v } else { 0.0 })
            .collect())
    }

    /// Forgets all insertions
    pub fn clear(&mut self) {
        self.flags.iter_mut().for_each(|set| *set = false);
    }
}

/// Combines the previous values with the summed contributions of the owned indices
///
/// Indices nobody claimed (owner = size) keep their previous values.
pub fn merge_owned_values(previous: &Vector, owners: &[u32], size: u32, summed: &[f64]) -> Result<Vector, StrError> {
    if owners.len() != previous.dim() || summed.len() != previous.dim() {
        return Err("merge buffers must have the same length as the vector");
    }
    let mut merged = previous.clone();
    for (i, owner) in owners.iter().enumerate() {
        if *owner < size {
            merged[i] = summed[i];
        }
    }
    Ok(merged)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{merge_owned_values, pack_entries, unpack_entries, InsertBuffer};
    use crate::{
        assemble_operators, element_samples, partition_elements, ElementMatrices1d, ElementMatrices2d, GllQuadrature,
        GlobalOperator, GlobalVector, NodalVector, OwnedRange, ProblemConfig, SparseOperator, SpectralMesh,
    };
    use russell_lab::{approx_eq, Vector};

    // stands in for an allreduce with sum
    fn reduce_sum(buffers: &[Vec<f64>]) -> Vec<f64> {
        let mut sum = vec![0.0; buffers[0].len()];
        for buffer in buffers {
            for (s, v) in sum.iter_mut().zip(buffer) {
                *s += v;
            }
        }
        sum
    }

    // stands in for an allreduce with min
    fn reduce_min(claims: &[Vec<u32>]) -> Vec<u32> {
        let mut min = claims[0].clone();
        for claim in claims {
            for (m, c) in min.iter_mut().zip(claim) {
                *m = u32::min(*m, *c);
            }
        }
        min
    }

    fn setup(m: usize, p: usize) -> (SpectralMesh, ElementMatrices2d) {
        let config = ProblemConfig::new(m, p).unwrap();
        let gll = GllQuadrature::unit_interval(p).unwrap();
        let mesh = SpectralMesh::new(&config, &gll).unwrap();
        let e1d = ElementMatrices1d::new(config.h(), &gll).unwrap();
        (mesh, ElementMatrices2d::new(&e1d))
    }

    #[test]
    fn merged_operator_equals_the_single_worker_operator() {
        let (mesh, matrices) = setup(3, 2);
        let n = mesh.ndof();
        let pattern = mesh.sparsity_pattern();

        let mut kk_one = SparseOperator::new(n).unwrap();
        let mut mm_one = SparseOperator::new(n).unwrap();
        assemble_operators(&mesh, &matrices, OwnedRange::all(9), &mut kk_one, &mut mm_one).unwrap();
        kk_one.finalize().unwrap();

        let size = 3;
        let mut buffers = Vec::new();
        for range in partition_elements(9, size).unwrap() {
            let mut kk = SparseOperator::new(n).unwrap();
            let mut mm = SparseOperator::new(n).unwrap();
            assemble_operators(&mesh, &matrices, range, &mut kk, &mut mm).unwrap();
            kk.finalize().unwrap();
            buffers.push(pack_entries(&pattern, &kk).unwrap());
        }
        let kk_all = unpack_entries(n, &pattern, &reduce_sum(&buffers)).unwrap();

        assert_eq!(kk_all.nnz(), kk_one.nnz());
        for (i, j, v) in kk_one.triplets().unwrap() {
            approx_eq(kk_all.get(i, j).unwrap(), v, 1e-14);
        }
    }

    #[test]
    fn pack_and_unpack_capture_errors() {
        let pattern = [(0, 0), (1, 1)];
        let mut aa = SparseOperator::new(2).unwrap();
        aa.put(0, 1, 1.0).unwrap();
        assert_eq!(pack_entries(&pattern, &aa).err(), Some("operator must be finalized before it can be read"));
        aa.finalize().unwrap();
        assert_eq!(pack_entries(&pattern, &aa).err(), Some("entry is outside of the sparsity pattern"));
        assert_eq!(
            unpack_entries(2, &pattern, &[1.0]).err(),
            Some("the summed buffer must be parallel to the sparsity pattern")
        );
    }

    #[test]
    fn overlapping_inserts_are_taken_once() {
        // rank 0 inserts 0, 1, 2; rank 1 inserts 2, 3; rank 2 inserts nothing
        let (dim, size) = (5, 3);
        let mut buffers = vec![InsertBuffer::new(dim), InsertBuffer::new(dim), InsertBuffer::new(dim)];
        buffers[0].insert(&[0, 1, 2], &[1.0, 2.0, 3.0]).unwrap();
        buffers[1].insert(&[2, 3], &[3.0, 4.0]).unwrap();

        let claims: Vec<_> = (0..size).map(|r| buffers[r].claims(r as u32, size as u32)).collect();
        let owners = reduce_min(&claims);
        assert_eq!(owners, &[0, 0, 0, 1, 3]);

        let contributions: Vec<_> = (0..size)
            .map(|r| buffers[r].contributions(&owners, r as u32).unwrap())
            .collect();
        let previous = Vector::from(&[9.0, 9.0, 9.0, 9.0, 9.0]);
        let merged = merge_owned_values(&previous, &owners, size as u32, &reduce_sum(&contributions)).unwrap();
        assert_eq!(merged.as_data(), &[1.0, 2.0, 3.0, 4.0, 9.0]);

        buffers[0].clear();
        assert_eq!(buffers[0].claims(0, 3), &[3, 3, 3, 3, 3]);
    }

    #[test]
    fn merged_samples_equal_the_single_worker_samples() {
        let (mesh, _) = setup(4, 3);
        let n = mesh.ndof();
        let f = |x: f64, y: f64| f64::sin(3.0 * x) + x * y;

        let mut serial = NodalVector::new(n).unwrap();
        crate::sample_nodal_values(&mesh, OwnedRange::all(16), f, &mut serial).unwrap();
        serial.finalize().unwrap();

        let size = 3;
        let ranges = partition_elements(16, size).unwrap();
        let mut buffers = Vec::new();
        for range in &ranges {
            let mut buffer = InsertBuffer::new(n);
            for e in range.elements() {
                buffer.insert(&mesh.element_dofs(e), &element_samples(&mesh, e, f)).unwrap();
            }
            buffers.push(buffer);
        }
        let claims: Vec<_> = (0..size).map(|r| buffers[r].claims(r as u32, size as u32)).collect();
        let owners = reduce_min(&claims);
        assert!(owners.iter().all(|owner| *owner < size as u32));
        let contributions: Vec<_> = (0..size)
            .map(|r| buffers[r].contributions(&owners, r as u32).unwrap())
            .collect();
        let merged = merge_owned_values(&Vector::new(n), &owners, size as u32, &reduce_sum(&contributions)).unwrap();
        assert_eq!(merged.as_data(), serial.values().unwrap().as_data());
    }

    #[test]
    fn insert_buffer_captures_errors() {
        let mut buffer = InsertBuffer::new(2);
        assert_eq!(buffer.dim(), 2);
        assert_eq!(buffer.insert(&[2], &[1.0]).err(), Some("vector index is out of range"));
        assert_eq!(buffer.insert(&[0, 1], &[1.0]).err(), Some("indices and values must have the same length"));
        assert_eq!(buffer.contributions(&[0], 0).err(), Some("owners must have the same length as the buffer"));
        assert_eq!(
            merge_owned_values(&Vector::new(2), &[0], 1, &[1.0, 2.0]).err(),
            Some("merge buffers must have the same length as the vector")
        );
    }
}
