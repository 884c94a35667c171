use russell_lab::Stopwatch;
use russell_sparse::Genie;
use spectral_laplacian::{
    DiagnosticContext, Failure, ManufacturedSolution, OutputTarget, ProblemConfig, SolutionReport, SpectralPoisson,
    WithStage,
};
use structopt::StructOpt;

// Approximate (with the Spectral Element Method) the solution of
//
//   ∂²u   ∂²u
// - ——— - ——— = -2 y² - 2 x²
//   ∂x²   ∂y²
//
// on a (1.0 × 1.0) square with u = x² y² on the boundary.
//
// The analytical solution is:
//
// u(x, y) = x² y²

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

    /// Number of workers sharing the assembly
    #[structopt(long, default_value = "1")]
    workers: usize,

    /// Where errors are reported (stderr, stdout, none)
    #[structopt(long, default_value = "stderr")]
    error_output: OutputTarget,
}

fn run(opt: &Options) -> Result<SolutionReport, Failure> {
    let config = ProblemConfig::new(opt.m, opt.p).stage("configuration")?;
    let genie = Genie::from(&opt.genie);
    println!(
        "m = {}, p = {}, dim = {}, workers = {}, genie = {:?}",
        config.m,
        config.p,
        config.ndof(),
        opt.workers,
        genie
    );
    let sim = SpectralPoisson::new(config)?;
    sim.solve_serial(&ManufacturedSolution::quadratic_product(), opt.workers, genie)
}

fn main() {
    tracing_subscriber::fmt::init();

    // parse command line arguments
    let opt = Options::from_args();
    let mut diagnostics = DiagnosticContext::new("spectral_laplacian", 0, 1, opt.error_output);

    // start stopwatch
    let mut stopwatch = Stopwatch::new("");

    match run(&opt) {
        Ok(report) => {
            println!("Norm of error {:e} Iterations {}", report.error_norm, report.iterations);
            stopwatch.stop();
            println!("elapsed time = {}", stopwatch);
        }
        Err(failure) => {
            diagnostics.report(&failure);
            diagnostics.report(&Failure {
                stage: "main",
                error: failure.error,
            });
            diagnostics.finish();
            std::process::exit(1);
        }
    }
}
