//! Spectral-element (Gauss-Lobatto-Legendre) discretization of the Poisson problem on the unit square
//!
//! The element-local mass and stiffness matrices are built once from tensor products of 1D
//! Lagrange bases on the GLL nodes and then accumulated into global operators over a
//! range-partitioned set of congruent square elements.

/// Defines a type alias for the error type as a static string
pub type StrError = &'static str;

mod assembly;
mod boundary;
mod diagnostics;
mod element_matrices_1d;
mod element_matrices_2d;
mod gll_quadrature;
mod global_operator;
mod lagrange_basis;
mod linear_solver;
mod manufactured;
mod partition;
mod problem_config;
mod rank_merge;
mod simulation;
mod spectral_mesh;
pub use crate::assembly::*;
pub use crate::boundary::*;
pub use crate::diagnostics::*;
pub use crate::element_matrices_1d::*;
pub use crate::element_matrices_2d::*;
pub use crate::gll_quadrature::*;
pub use crate::global_operator::*;
pub use crate::lagrange_basis::*;
pub use crate::linear_solver::*;
pub use crate::manufactured::*;
pub use crate::partition::*;
pub use crate::problem_config::*;
pub use crate::rank_merge::*;
pub use crate::simulation::*;
pub use crate::spectral_mesh::*;
