use crate::StrError;

/// Holds the validated parameters of the spectral-element problem on the unit square
///
/// ```text
///  y=1 ┌────┬────┬────┐
///      │ 6  │ 7  │ 8  │   m × m square elements (m = 3 here)
///      ├────┼────┼────┤   element e sits at column (e mod m), row (e div m)
///      │ 3  │ 4  │ 5  │   each element carries (p + 1)² nodes
///      ├────┼────┼────┤
///      │ 0  │ 1  │ 2  │
///  y=0 └────┴────┴────┘
///     x=0             x=1
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProblemConfig {
    /// Number of elements along each direction (≥ 1)
    pub m: usize,

    /// Polynomial order of each element (≥ 1)
    pub p: usize,
}

impl ProblemConfig {
    /// Allocates a new instance
    ///
    /// # Input
    ///
    /// * `m` -- mesh size: number of elements in each direction (≥ 1)
    /// * `p` -- polynomial order of the tensor-product basis (≥ 1)
    pub fn new(m: usize, p: usize) -> Result<Self, StrError> {
        if p < 1 {
            return Err("polynomial order p must be ≥ 1");
        }
        if m < 1 {
            return Err("mesh size m must be ≥ 1");
        }
        Ok(ProblemConfig { m, p })
    }

    /// Returns the element width h = 1/m
    pub fn h(&self) -> f64 {
        1.0 / (self.m as f64)
    }

    /// Returns the total number of elements m²
    pub fn n_element(&self) -> usize {
        self.m * self.m
    }

    /// Returns the number of global nodes along each side: p m + 1
    pub fn nodes_per_side(&self) -> usize {
        self.p * self.m + 1
    }

    /// Returns the dimension of the global system (p m + 1)²
    pub fn ndof(&self) -> usize {
        self.nodes_per_side() * self.nodes_per_side()
    }

    /// Returns the number of local nodes per element (p + 1)²
    pub fn ndof_local(&self) -> usize {
        (self.p + 1) * (self.p + 1)
    }
}

impl Default for ProblemConfig {
    /// Returns the default problem: m = 5 and p = 2
    fn default() -> Self {
        ProblemConfig { m: 5, p: 2 }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::ProblemConfig;

    #[test]
    fn new_captures_errors() {
        assert_eq!(ProblemConfig::new(5, 0).err(), Some("polynomial order p must be ≥ 1"));
        assert_eq!(ProblemConfig::new(0, 2).err(), Some("mesh size m must be ≥ 1"));
    }

    #[test]
    fn derived_quantities_work() {
        let config = ProblemConfig::default();
        assert_eq!(config, ProblemConfig::new(5, 2).unwrap());
        assert_eq!(config.h(), 0.2);
        assert_eq!(config.n_element(), 25);
        assert_eq!(config.nodes_per_side(), 11);
        assert_eq!(config.ndof(), 121);
        assert_eq!(config.ndof_local(), 9);

        let config = ProblemConfig::new(3, 4).unwrap();
        assert_eq!(config.nodes_per_side(), 13);
        assert_eq!(config.ndof(), 169);
        assert_eq!(config.ndof_local(), 25);
    }
}
