use std::f64::consts::PI;

/// Defines a function of (x, y)
pub type FnSpace2d = fn(f64, f64) -> f64;

/// Holds an exact solution u* and the matching source term f = -Δu*
///
/// The exact solution also provides the Dirichlet data on the boundary.
#[derive(Clone, Copy, Debug)]
pub struct ManufacturedSolution {
    /// Short description
    pub name: &'static str,

    /// Exact solution u*(x, y), also used as boundary function
    pub exact: FnSpace2d,

    /// Source term f(x, y) = -Δu*(x, y)
    pub source: FnSpace2d,
}

impl ManufacturedSolution {
    /// Returns the pair u* = x² y² and f = -2 y² - 2 x²
    pub fn quadratic_product() -> Self {
        ManufacturedSolution {
            name: "x²y²",
            exact: |x, y| x * x * y * y,
            source: |x, y| -2.0 * y * y - 2.0 * x * x,
        }
    }

    /// Returns the pair u* = sin(πx) sin(πy) and f = 2π² sin(πx) sin(πy)
    pub fn sine_product() -> Self {
        ManufacturedSolution {
            name: "sin(πx)sin(πy)",
            exact: |x, y| f64::sin(PI * x) * f64::sin(PI * y),
            source: |x, y| 2.0 * PI * PI * f64::sin(PI * x) * f64::sin(PI * y),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
