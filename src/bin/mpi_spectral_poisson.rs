use msgpass::{mpi_finalize, mpi_init_thread, Communicator, MpiOpInt, MpiOpReal, MpiThread};
use russell_lab::{Matrix, Stopwatch, Vector};
use russell_sparse::Genie;
use spectral_laplacian::{
    merge_owned_values, pack_entries, unpack_entries, DiagnosticContext, Failure, GlobalOperator, GlobalVector,
    InsertBuffer, LinearSolver, ManufacturedSolution, NodalVector, OutputTarget, OwnedRange, ProblemConfig,
    SparseOperator, SpectralPoisson, StrError, WithStage,
};
use std::cell::RefCell;
use std::rc::Rc;
use structopt::StructOpt;

// Solves (with the Spectral Element Method) the Poisson problem
//
//   ∂²u   ∂²u
// - ——— - ——— = -2 y² - 2 x²      u = x² y² on the boundary
//   ∂x²   ∂y²
//
// on a (1.0 × 1.0) square. Each processor assembles a contiguous range of elements;
// the finalize calls are the fences where the contributions are combined.

const ROOT: usize = 0;

type SharedComm = Rc<RefCell<Communicator>>;

/// Operator whose local contributions are summed over all processors on finalize
///
/// Every processor ends up with the complete (replicated) operator.
struct MpiOperator {
    comm: SharedComm,
    pattern: Rc<Vec<(usize, usize)>>, // sorted (row, col) pairs, identical on all processors
    local: SparseOperator,
    global: Option<SparseOperator>,
}

impl MpiOperator {
    fn new(comm: &SharedComm, pattern: &Rc<Vec<(usize, usize)>>, dim: usize) -> Result<Self, StrError> {
        Ok(MpiOperator {
            comm: comm.clone(),
            pattern: pattern.clone(),
            local: SparseOperator::new(dim)?,
            global: None,
        })
    }

    fn global(&self) -> Result<&SparseOperator, StrError> {
        self.global
            .as_ref()
            .ok_or("operator must be finalized before it can be read")
    }
}

impl GlobalOperator for MpiOperator {
    fn dim(&self) -> usize {
        self.local.dim()
    }

    fn add_block(&mut self, rows: &[usize], cols: &[usize], values: &Matrix) -> Result<(), StrError> {
        self.global = None;
        self.local.add_block(rows, cols, values)
    }

    fn finalize(&mut self) -> Result<(), StrError> {
        self.local.finalize()?;
        let values = pack_entries(&self.pattern, &self.local)?;
        let mut sum = vec![0.0; values.len()];
        self.comm.borrow_mut().allreduce_f64(&mut sum, &values, MpiOpReal::Sum)?;
        self.global = Some(unpack_entries(self.dim(), &self.pattern, &sum)?);
        Ok(())
    }

    fn zero_rows(&mut self, rows: &[usize], diagonal: f64) -> Result<(), StrError> {
        match self.global.as_mut() {
            Some(global) => global.zero_rows(rows, diagonal),
            None => Err("operator must be finalized before zeroing rows"),
        }
    }

    fn mat_vec_mul<V: GlobalVector>(&self, v: &mut V, u: &V) -> Result<(), StrError> {
        self.global()?.mat_vec_mul(v, u)
    }
}

/// Vector whose local insertions are merged over all processors on finalize
///
/// When several processors insert the same index, the lowest rank wins.
#[derive(Clone)]
struct MpiVector {
    comm: SharedComm,
    rank: u32,
    size: u32,
    inserted: InsertBuffer,
    pending: bool,
    global: NodalVector,
}

impl MpiVector {
    fn new(comm: &SharedComm, rank: usize, size: usize, dim: usize) -> Result<Self, StrError> {
        Ok(MpiVector {
            comm: comm.clone(),
            rank: rank as u32,
            size: size as u32,
            inserted: InsertBuffer::new(dim),
            pending: false,
            global: NodalVector::new(dim)?,
        })
    }
}

impl GlobalVector for MpiVector {
    fn dim(&self) -> usize {
        self.global.dim()
    }

    fn set_values(&mut self, indices: &[usize], values: &[f64]) -> Result<(), StrError> {
        self.inserted.insert(indices, values)?;
        self.pending = true;
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), StrError> {
        let dim = self.dim();
        let mut comm = self.comm.borrow_mut();
        let mut owners = vec![0; dim];
        comm.allreduce_u32(&mut owners, &self.inserted.claims(self.rank, self.size), MpiOpInt::Min)?;
        let mut merged = vec![0.0; dim];
        comm.allreduce_f64(&mut merged, &self.inserted.contributions(&owners, self.rank)?, MpiOpReal::Sum)?;
        drop(comm);
        let values = merge_owned_values(self.global.values()?, &owners, self.size, &merged)?;
        self.global.assign(values)?;
        self.inserted.clear();
        self.pending = false;
        Ok(())
    }

    fn assign(&mut self, values: Vector) -> Result<(), StrError> {
        self.global.assign(values)?;
        self.inserted.clear();
        self.pending = false;
        Ok(())
    }

    fn values(&self) -> Result<&Vector, StrError> {
        if self.pending {
            return Err("vector must be finalized before it can be read");
        }
        self.global.values()
    }

    fn norm(&self) -> Result<f64, StrError> {
        self.values()?;
        self.global.norm()
    }

    fn axpy(&mut self, alpha: f64, x: &Self) -> Result<(), StrError> {
        if self.pending || x.pending {
            return Err("vector must be finalized before it can be read");
        }
        self.global.axpy(alpha, &x.global)
    }
}

#[derive(StructOpt)]
struct Options {
    /// Number of elements along each direction
    #[structopt(short = "m", long, default_value = "5")]
    m: usize,

    /// Polynomial order of the GLL basis
    #[structopt(short = "p", long, default_value = "2")]
    p: usize,

    /// Sparse solver (Umfpack or Mumps)
    #[structopt(long, default_value = "Umfpack")]
    genie: String,

    /// Where errors are reported (stderr, stdout, none)
    #[structopt(long, default_value = "stderr")]
    error_output: OutputTarget,
}

fn run(opt: &Options, comm: &SharedComm, rank: usize, size: usize) -> Result<(f64, usize), Failure> {
    let config = ProblemConfig::new(opt.m, opt.p).stage("configuration")?;
    let genie = Genie::from(&opt.genie);
    let sim = SpectralPoisson::new(config)?;
    let pair = ManufacturedSolution::quadratic_product();
    let dim = sim.ndof();
    if rank == ROOT {
        println!(
            "size = {}, m = {}, p = {}, dim = {}, genie = {:?}",
            size, config.m, config.p, dim, genie
        );
    }

    // assembly over the owned range
    let range = OwnedRange::new(sim.mesh.n_element(), rank, size).stage("partition")?;
    let pattern = Rc::new(sim.mesh.sparsity_pattern());
    let mut stiffness = MpiOperator::new(comm, &pattern, dim).stage("allocation")?;
    let mut mass = MpiOperator::new(comm, &pattern, dim).stage("allocation")?;
    sim.assemble(range, &mut stiffness, &mut mass).stage("assembly")?;
    stiffness.finalize().stage("assembly")?;
    mass.finalize().stage("assembly")?;

    // source and exact solution samples
    let mut source = MpiVector::new(comm, rank, size, dim).stage("allocation")?;
    let mut exact = MpiVector::new(comm, rank, size, dim).stage("allocation")?;
    sim.sample(range, pair.source, &mut source).stage("sampling")?;
    sim.sample(range, pair.exact, &mut exact).stage("sampling")?;
    source.finalize().stage("sampling")?;
    exact.finalize().stage("sampling")?;

    // right-hand side and boundary conditions
    let mut rhs = MpiVector::new(comm, rank, size, dim).stage("allocation")?;
    let mut solution = MpiVector::new(comm, rank, size, dim).stage("allocation")?;
    sim.form_rhs(&mass, &source, &mut rhs).stage("right-hand side")?;
    sim.apply_boundary_conditions(pair.exact, &mut stiffness, &mut rhs, &mut solution)
        .stage("boundary conditions")?;

    // solution and error
    let solver = LinearSolver::new(genie);
    let operator = stiffness.global().stage("solve")?;
    let report = solver.solve(operator, &rhs, &mut solution).stage("solve")?;
    let error_norm = sim.error_norm(&solution, &exact).stage("error norm")?;
    Ok((error_norm, report.iterations))
}

fn main() -> Result<(), StrError> {
    tracing_subscriber::fmt::init();

    // initialize the MPI engine
    mpi_init_thread(MpiThread::Serialized)?;

    // start stopwatch
    let mut stopwatch = Stopwatch::new("");

    // allocate MPI communicator and determine this processor's rank
    let comm = Rc::new(RefCell::new(Communicator::new()?));
    let rank = comm.borrow_mut().rank()?;
    let size = comm.borrow_mut().size()?;

    // parse command line arguments
    let opt = Options::from_args();
    let mut diagnostics = DiagnosticContext::new("mpi_spectral_poisson", rank, size, opt.error_output);

    let success = match run(&opt, &comm, rank, size) {
        Ok((error_norm, iterations)) => {
            if rank == ROOT {
                println!("Norm of error {:e} Iterations {}", error_norm, iterations);
            }
            true
        }
        Err(failure) => {
            diagnostics.report(&failure);
            diagnostics.report(&Failure {
                stage: "main",
                error: failure.error,
            });
            diagnostics.finish();
            false
        }
    };

    // finalize the MPI engine
    mpi_finalize()?;
    if rank == ROOT {
        stopwatch.stop();
        println!("elapsed time = {}", stopwatch);
    }
    if !success {
        std::process::exit(1);
    }
    Ok(())
}
