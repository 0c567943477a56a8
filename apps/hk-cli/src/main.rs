mod error;
mod interactive;

use clap::{Parser, Subcommand, ValueEnum};
use error::{CliError, CliResult};
use hk_core::units::us;
use hk_flow::{
    ConvergencePolicy, FrictionEquation, FrictionFactorSolver, MoodyDiagram, MoodyOptions,
    MoodyPoint, Pipe, PipeOperatingPoint, RegimeClassifier, regime,
};
use hk_project::ProjectConfig;
use hk_sim::{IntegratorType, simulate_piston};
use interactive::PipeQuery;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "hk-cli")]
#[command(
    about = "HydroKit CLI - pipe friction, Moody chart data and piston transients",
    long_about = None
)]
struct Cli {
    /// Configuration file (YAML or JSON); reference values when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum EquationArg {
    Laminar,
    Colebrook,
}

impl From<EquationArg> for FrictionEquation {
    fn from(e: EquationArg) -> Self {
        match e {
            EquationArg::Laminar => FrictionEquation::Laminar,
            EquationArg::Colebrook => FrictionEquation::Colebrook,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Darcy friction factor from one friction law
    Friction {
        /// Reynolds number
        #[arg(long)]
        re: f64,
        /// Relative roughness (roughness / diameter)
        #[arg(long, default_value_t = 0.0)]
        rr: f64,
        #[arg(long, value_enum, default_value = "colebrook")]
        equation: EquationArg,
        /// Fail instead of warning when the Colebrook solve does not converge
        #[arg(long)]
        strict: bool,
    },
    /// Friction factor by flow regime, drawn at random in the transition band
    Classify {
        /// Reynolds number
        #[arg(long)]
        re: f64,
        /// Relative roughness (roughness / diameter)
        #[arg(long, default_value_t = 0.0)]
        rr: f64,
        /// RNG seed for transition draws
        #[arg(long)]
        seed: Option<u64>,
        /// Number of evaluations
        #[arg(long, default_value_t = 1)]
        count: usize,
        #[arg(long)]
        strict: bool,
    },
    /// Pipe operating point; prompts for the parameters unless all three are given
    Pipe {
        /// Inner diameter (in)
        #[arg(long)]
        diameter_in: Option<f64>,
        /// Absolute roughness (micro-inches)
        #[arg(long)]
        roughness_uin: Option<f64>,
        /// Volumetric flow (US gpm)
        #[arg(long)]
        flow_gpm: Option<f64>,
        /// RNG seed for transition draws
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        strict: bool,
        /// Also write Moody diagram CSV with the latest point overlaid
        #[arg(long)]
        moody: Option<PathBuf>,
    },
    /// Export Moody diagram data
    Moody {
        /// Reynolds number of an overlay point
        #[arg(long, requires = "point_f")]
        point_re: Option<f64>,
        /// Friction factor of an overlay point
        #[arg(long, requires = "point_re")]
        point_f: Option<f64>,
        #[arg(long, value_enum, default_value = "csv")]
        format: Format,
        /// Output file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Simulate the hydraulic piston/valve system
    Piston {
        /// rk4, forward_euler or dormand_prince45
        #[arg(long)]
        integrator: Option<IntegratorType>,
        /// Number of output samples
        #[arg(long)]
        samples: Option<usize>,
        /// End time in seconds
        #[arg(long)]
        t_end: Option<f64>,
        #[arg(long, value_enum, default_value = "csv")]
        format: Format,
        /// Output file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a configuration file filled with reference values
    InitConfig {
        /// Destination (.yaml, .yml or .json)
        path: PathBuf,
        #[arg(long, default_value = "hydrokit")]
        name: String,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Friction {
            re,
            rr,
            equation,
            strict,
        } => cmd_friction(&config, re, rr, equation.into(), strict),
        Commands::Classify {
            re,
            rr,
            seed,
            count,
            strict,
        } => cmd_classify(&config, re, rr, seed, count, strict),
        Commands::Pipe {
            diameter_in,
            roughness_uin,
            flow_gpm,
            seed,
            strict,
            moody,
        } => {
            let query = match (diameter_in, roughness_uin, flow_gpm) {
                (Some(diameter_in), Some(roughness_microinch), Some(flow_gpm)) => Some(PipeQuery {
                    diameter_in,
                    roughness_microinch,
                    flow_gpm,
                }),
                (None, None, None) => None,
                _ => {
                    return Err(CliError::InvalidInput(
                        "give all of --diameter-in, --roughness-uin and --flow-gpm, or none"
                            .to_string(),
                    ));
                }
            };
            cmd_pipe(&config, query, seed, strict, moody.as_deref())
        }
        Commands::Moody {
            point_re,
            point_f,
            format,
            output,
        } => cmd_moody(&config, point_re.zip(point_f), format, output.as_deref()),
        Commands::Piston {
            integrator,
            samples,
            t_end,
            format,
            output,
        } => cmd_piston(&config, integrator, samples, t_end, format, output.as_deref()),
        Commands::InitConfig { path, name } => cmd_init_config(&path, &name),
    }
}

fn load_config(path: Option<&Path>) -> CliResult<ProjectConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            Ok(hk_project::load(path)?)
        }
        None => Ok(ProjectConfig::new("default")),
    }
}

fn friction_solver(config: &ProjectConfig, strict: bool) -> FrictionFactorSolver {
    let policy = if strict {
        ConvergencePolicy::Strict
    } else {
        config.friction.policy
    };
    FrictionFactorSolver::new().with_policy(policy)
}

/// `--seed` wins over the configured seed; entropy otherwise.
fn transition_rng(config: &ProjectConfig, seed: Option<u64>) -> StdRng {
    match seed.or(config.transition.seed) {
        Some(seed) => {
            info!(seed, "seeded transition draws");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    }
}

fn write_output(output: Option<&Path>, content: &str) -> CliResult<()> {
    match output {
        Some(path) => std::fs::write(path, content)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn cmd_friction(
    config: &ProjectConfig,
    re: f64,
    rr: f64,
    equation: FrictionEquation,
    strict: bool,
) -> CliResult<()> {
    let solver = friction_solver(config, strict);
    match equation {
        FrictionEquation::Laminar => {
            let f = solver.friction_factor(re, rr, equation)?;
            println!("✓ f = {f:.6} (laminar, Re = {re})");
        }
        FrictionEquation::Colebrook => {
            let sol = solver.colebrook(re, rr)?;
            println!("✓ f = {:.6} (Colebrook, Re = {re}, rr = {rr})", sol.friction_factor);
            println!(
                "  residual = {:.3e}, iterations = {}, converged = {}",
                sol.residual, sol.iterations, sol.converged
            );
        }
    }
    Ok(())
}

fn cmd_classify(
    config: &ProjectConfig,
    re: f64,
    rr: f64,
    seed: Option<u64>,
    count: usize,
    strict: bool,
) -> CliResult<()> {
    let classifier = RegimeClassifier::with_solver(friction_solver(config, strict));
    let mut rng = transition_rng(config, seed);
    println!("Re = {re}, rr = {rr}: {} regime", regime(re));
    for i in 0..count.max(1) {
        let f = classifier.classify(re, rr, &mut rng)?;
        println!("  [{i}] f = {f:.6}");
    }
    Ok(())
}

fn format_operating_point(op: &PipeOperatingPoint) -> String {
    format!(
        "Reynolds number:    {:.0} ({})\n\
         Relative roughness: {:.3e}\n\
         Velocity:           {:.4} m/s\n\
         Friction factor:    {:.5}\n\
         Head loss per foot: {:.5} ft/ft",
        op.reynolds,
        op.regime,
        op.relative_roughness,
        op.velocity_mps,
        op.friction_factor,
        op.head_loss_per_length
    )
}

fn cmd_pipe(
    config: &ProjectConfig,
    query: Option<PipeQuery>,
    seed: Option<u64>,
    strict: bool,
    moody: Option<&Path>,
) -> CliResult<()> {
    let classifier = RegimeClassifier::with_solver(friction_solver(config, strict));
    let mut rng = transition_rng(config, seed);
    let nu = config.fluid.kinematic_viscosity_m2_s;
    let chart = match moody {
        Some(_) => Some(MoodyDiagram::build(
            classifier.solver(),
            &MoodyOptions::default(),
        )?),
        None => None,
    };

    let mut evaluate = |q: &PipeQuery| -> CliResult<String> {
        let pipe =
            Pipe::from_us_customary("pipe".to_string(), q.diameter_in, q.roughness_microinch)?;
        let op = pipe.operating_point(us::gpm(q.flow_gpm), nu, &classifier, &mut rng)?;
        if let (Some(path), Some(chart)) = (moody, &chart) {
            let with_point = chart
                .clone()
                .with_point(MoodyPoint::new(op.reynolds, op.friction_factor));
            std::fs::write(path, with_point.to_csv())?;
            info!(path = %path.display(), "wrote Moody diagram");
        }
        Ok(format_operating_point(&op))
    };

    match query {
        Some(q) => println!("{}", evaluate(&q)?),
        None => {
            let mut input = io::stdin().lock();
            let mut out = io::stdout();
            interactive::run_session(&mut input, &mut out, evaluate)?;
        }
    }
    Ok(())
}

fn cmd_moody(
    config: &ProjectConfig,
    point: Option<(f64, f64)>,
    format: Format,
    output: Option<&Path>,
) -> CliResult<()> {
    let solver = friction_solver(config, false);
    let mut chart = MoodyDiagram::build(&solver, &MoodyOptions::default())?;
    if let Some((re, f)) = point {
        chart = chart.with_point(MoodyPoint::new(re, f));
    }
    let content = match format {
        Format::Csv => chart.to_csv(),
        Format::Json => chart.to_json()?,
    };
    write_output(output, &content)?;
    if let Some(path) = output {
        println!("✓ Wrote {} series to {}", chart.series.len(), path.display());
    }
    Ok(())
}

fn cmd_piston(
    config: &ProjectConfig,
    integrator: Option<IntegratorType>,
    samples: Option<usize>,
    t_end: Option<f64>,
    format: Format,
    output: Option<&Path>,
) -> CliResult<()> {
    let mut sim = config.simulation;
    if let Some(integrator) = integrator {
        sim.integrator = integrator;
    }
    if let Some(samples) = samples {
        sim.samples = samples;
    }
    if let Some(t_end) = t_end {
        sim.t_end_s = t_end;
    }

    let trajectory = simulate_piston(&config.piston, &sim.window(), &sim.options())?;
    let content = match format {
        Format::Csv => trajectory.to_csv(),
        Format::Json => trajectory.to_json()?,
    };
    write_output(output, &content)?;

    if let (Some(path), Some(end)) = (output, trajectory.last()) {
        println!(
            "✓ Wrote {} samples ({}) to {}",
            trajectory.len(),
            sim.integrator,
            path.display()
        );
        println!("  x      = {:.4e} m", end.x);
        println!("  xdot   = {:.4e} m/s", end.xdot);
        println!("  p1     = {:.3} Pa", end.p1);
        println!("  p2     = {:.3} Pa", end.p2);
    }
    Ok(())
}

fn cmd_init_config(path: &Path, name: &str) -> CliResult<()> {
    let config = ProjectConfig::new(name);
    hk_project::save(path, &config)?;
    println!("✓ Wrote configuration to {}", path.display());
    Ok(())
}
