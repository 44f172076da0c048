use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use evsa_algo::RoundingMode;

#[derive(Parser, Debug)]
#[command(author, version, about = "EV charging-station allocation toolkit", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Solve a scenario and report the optimal allocation
    Solve {
        /// Path to the scenario JSON file
        #[arg(long)]
        scenario: PathBuf,

        /// Iteration budget for the constrained search
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Convergence tolerance on constraint violation
        #[arg(long)]
        tolerance: Option<f64>,

        /// Integerization policy for the continuous optimum
        #[arg(long, default_value = "nearest")]
        rounding: RoundingMode,

        /// Report format
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,

        /// Also write the JSON report to a file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a scenario file without solving
    Validate {
        /// Path to the scenario JSON file
        #[arg(long)]
        scenario: PathBuf,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

/// Output format for solve reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Per-zone table with share percentages
    Text,
    /// Machine-readable solution JSON
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_solve_args_parse() {
        let cli = Cli::try_parse_from([
            "evsa",
            "solve",
            "--scenario",
            "city.json",
            "--rounding",
            "largest-remainder",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Solve {
                scenario,
                rounding,
                format,
                ..
            } => {
                assert_eq!(scenario, PathBuf::from("city.json"));
                assert_eq!(rounding, RoundingMode::LargestRemainder);
                assert_eq!(format, ReportFormat::Json);
            }
            other => panic!("expected solve command, got {other:?}"),
        }
    }
}
