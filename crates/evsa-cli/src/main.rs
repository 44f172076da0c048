use std::fs;
use std::io::{self, Write};
use std::path::Path;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use evsa_algo::{AllocationProblem, AllocationSolver, RoundingMode};
use evsa_cli::cli::{Cli, Commands, ReportFormat};
use evsa_cli::report;
use evsa_core::Scenario;

fn load_scenario(path: &Path) -> anyhow::Result<Scenario> {
    let json = fs::read_to_string(path)?;
    Ok(Scenario::from_json(&json)?)
}

fn run_solve(
    path: &Path,
    max_iterations: Option<usize>,
    tolerance: Option<f64>,
    rounding: RoundingMode,
    format: ReportFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let scenario = load_scenario(path)?;
    info!(
        "solving scenario: {} zones, budget {}",
        scenario.zones, scenario.budget
    );

    let mut solver = AllocationSolver::new().with_rounding(rounding);
    if let Some(max_iter) = max_iterations {
        solver = solver.with_max_iterations(max_iter);
    }
    if let Some(tol) = tolerance {
        solver = solver.with_tolerance(tol);
    }

    let solution = solver.solve(&scenario)?;
    info!(
        "solved in {} ms ({} iterations), social cost {:.4}",
        solution.solve_time_ms, solution.iterations, solution.objective_value
    );

    match format {
        ReportFormat::Text => print!("{}", report::text_report(&scenario, &solution)?),
        ReportFormat::Json => println!("{}", report::json_report(&solution)?),
    }

    if let Some(out) = output {
        fs::write(out, report::json_report(&solution)?)?;
        info!("wrote JSON report to {}", out.display());
    }

    Ok(())
}

fn run_validate(path: &Path) -> anyhow::Result<()> {
    let scenario = load_scenario(path)?;
    let problem = AllocationProblem::from_scenario(&scenario)?;
    println!(
        "scenario OK: {} zones, budget {}, total demand {:.2}",
        problem.n_zones,
        problem.budget,
        problem.demand.iter().sum::<f64>()
    );
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Solve {
            scenario,
            max_iterations,
            tolerance,
            rounding,
            format,
            output,
        } => run_solve(
            &scenario,
            max_iterations,
            tolerance,
            rounding,
            format,
            output.as_deref(),
        ),
        Commands::Validate { scenario } => run_validate(&scenario),
        Commands::Completions { shell, out } => {
            let mut cmd = Cli::command();
            match out {
                Some(path) => {
                    let mut file = fs::File::create(path)?;
                    generate(shell, &mut cmd, "evsa", &mut file);
                }
                None => {
                    generate(shell, &mut cmd, "evsa", &mut io::stdout());
                }
            }
            io::stdout().flush()?;
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if let Err(err) = run(cli) {
        error!("{err:#}");
        std::process::exit(1);
    }
}
