use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;

const ABOUT: &str =
    "A command-line tool for equilibrating partial atomic charges across batches of molecules.";
const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser)]
#[command(version, about = ABOUT, help_template = HELP_TEMPLATE)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Input file describing the batch in TOML format.
    ///
    /// Use '-' to read from standard input. The file contains one
    /// [[molecules]] table per molecule, each with a `total_charge` and an
    /// `atoms` array of inline tables carrying `e` (electronegativity) and
    /// `s` (hardness).
    #[arg(value_name = "INPUT")]
    pub input: String,

    #[command(flatten)]
    pub output: OutputOptions,

    #[command(flatten)]
    pub equilibration: EquilibrationArgs,
}

/// Options for controlling the output format and destination.
#[derive(Args)]
#[command(next_help_heading = "Output Options")]
pub struct OutputOptions {
    /// Output file path.
    ///
    /// If not specified, results are written to standard output.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format for the results.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Number of decimal places to display for floating-point values.
    #[arg(short, long, default_value_t = 6)]
    pub precision: usize,

    /// Print a timing summary to standard error after the run.
    #[arg(long)]
    pub timings: bool,
}

/// Options for controlling the equilibration behavior.
#[derive(Args)]
#[command(next_help_heading = "Equilibration Options")]
pub struct EquilibrationArgs {
    /// Reject zero or near-zero hardness with an error instead of emitting
    /// non-finite charges.
    #[arg(long)]
    pub strict: bool,

    /// Hardness magnitude threshold used by strict validation.
    #[arg(long, default_value_t = 0.0, value_name = "EPS")]
    pub hardness_epsilon: f64,
}

/// Output format for the equilibration results.
#[derive(Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed tables with per-atom charges and per-molecule totals.
    Pretty,
    /// Comma-separated values with columns: index, molecule, e, s, charge.
    Csv,
    /// JSON object containing atoms and molecules arrays plus metadata.
    Json,
}
