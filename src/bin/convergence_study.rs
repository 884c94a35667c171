use plotpy::{Curve, Plot};
use russell_lab::StrError;
use russell_sparse::Genie;
use spectral_laplacian::{Failure, ManufacturedSolution, ProblemConfig, SpectralPoisson, WithStage};
use structopt::StructOpt;

// Measures the discretization error ‖u - u*‖₂ h under p-refinement (fixed m)
// and under m-refinement (fixed p).

#[derive(StructOpt)]
struct Options {
    /// Number of elements along each direction for the p-refinement
    #[structopt(short = "m", long, default_value = "4")]
    m: usize,

    /// Highest polynomial order for the p-refinement
    #[structopt(long, default_value = "6")]
    max_p: usize,

    /// Polynomial order for the m-refinement
    #[structopt(short = "p", long, default_value = "2")]
    p: usize,

    /// Number of halvings of the element width for the m-refinement (starting at m = 2)
    #[structopt(long, default_value = "4")]
    n_refine: usize,

    /// Use u = sin(πx) sin(πy) instead of u = x² y²
    #[structopt(long)]
    sine: bool,

    /// Saves the error curves as SVG figures into this directory
    #[structopt(long)]
    plot: Option<String>,
}

fn error_norm(pair: &ManufacturedSolution, m: usize, p: usize) -> Result<f64, Failure> {
    let config = ProblemConfig::new(m, p).stage("configuration")?;
    let sim = SpectralPoisson::new(config)?;
    let report = sim.solve_serial(pair, 1, Genie::Umfpack)?;
    Ok(report.error_norm)
}

fn run(opt: &Options) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>), Failure> {
    let pair = if opt.sine {
        ManufacturedSolution::sine_product()
    } else {
        ManufacturedSolution::quadratic_product()
    };
    println!("u = {}", pair.name);

    // p-refinement
    println!("\n{:>4} {:>4} {:>14}", "m", "p", "error");
    let (mut pp, mut p_errors): (Vec<f64>, Vec<f64>) = (Vec::new(), Vec::new());
    for p in 1..(opt.max_p + 1) {
        let error = error_norm(&pair, opt.m, p)?;
        println!("{:>4} {:>4} {:>14.6e}", opt.m, p, error);
        pp.push(p as f64);
        p_errors.push(error);
    }

    // m-refinement
    println!("\n{:>4} {:>4} {:>14} {:>8}", "m", "p", "error", "rate");
    let (mut hh, mut m_errors): (Vec<f64>, Vec<f64>) = (Vec::new(), Vec::new());
    let mut m = 2;
    for _ in 0..opt.n_refine {
        let error = error_norm(&pair, m, opt.p)?;
        let h = 1.0 / (m as f64);
        match (hh.last(), m_errors.last()) {
            (Some(h_prev), Some(e_prev)) => {
                let rate = f64::ln(e_prev / error) / f64::ln(h_prev / h);
                println!("{:>4} {:>4} {:>14.6e} {:>8.3}", m, opt.p, error, rate);
            }
            _ => println!("{:>4} {:>4} {:>14.6e} {:>8}", m, opt.p, error, "-"),
        }
        hh.push(h);
        m_errors.push(error);
        m *= 2;
    }
    Ok((pp, p_errors, hh, m_errors))
}

fn plot_errors(dir: &str, pp: &[f64], p_errors: &[f64], hh: &[f64], m_errors: &[f64]) -> Result<(), StrError> {
    // errors may be zero (to machine precision) for exactly representable solutions
    let log10 = |values: &[f64]| -> Vec<f64> { values.iter().map(|v| f64::log10(f64::max(*v, 1e-16))).collect() };

    let mut curve_p = Curve::new();
    curve_p.set_label("p-refinement").set_marker_style("o");
    curve_p.draw(&pp.to_vec(), &log10(p_errors));
    let mut plot_p = Plot::new();
    plot_p.add(&curve_p).grid_and_labels("polynomial order p", "log10(error)");
    plot_p.save(&format!("{}/convergence_p.svg", dir))?;

    let mut curve_m = Curve::new();
    curve_m.set_label("m-refinement").set_marker_style("s");
    curve_m.draw(&log10(hh), &log10(m_errors));
    let mut plot_m = Plot::new();
    plot_m.add(&curve_m).grid_and_labels("log10(h)", "log10(error)");
    plot_m.save(&format!("{}/convergence_m.svg", dir))
}

fn main() -> Result<(), StrError> {
    tracing_subscriber::fmt::init();
    let opt = Options::from_args();
    let (pp, p_errors, hh, m_errors) = run(&opt).map_err(|failure| failure.error)?;
    if let Some(dir) = &opt.plot {
        plot_errors(dir, &pp, &p_errors, &hh, &m_errors)?;
        println!("\nfigures saved to {}", dir);
    }
    Ok(())
}
