use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "premium-rules")]
#[command(about = "Insurance premium rule-script engine")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    /// Price a JSON premium request.
    Rate(RateArgs),
    /// Compile every rule script and report how many are ready.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
pub(crate) struct RateArgs {
    #[arg(long = "request")]
    pub(crate) request: String,
    #[arg(long = "scripts-dir")]
    pub(crate) scripts_dir: Option<String>,
    #[arg(long = "current-year")]
    pub(crate) current_year: Option<i32>,
    #[arg(long = "max-operations")]
    pub(crate) max_operations: Option<u64>,
}

#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    #[arg(long = "scripts-dir")]
    pub(crate) scripts_dir: Option<String>,
    #[arg(long = "max-operations")]
    pub(crate) max_operations: Option<u64>,
}
