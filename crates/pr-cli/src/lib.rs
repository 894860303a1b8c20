use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use pr_api::{RatingEngine, RatingEngineOptions};
use pr_compiler::{DirectoryBundle, EmbeddedBundle, SandboxPolicy, ScriptBundle};
use pr_core::RatingError;
use tracing::info;

mod cli_args;
mod config;
mod error_map;
mod logging;
mod request_loader;

pub(crate) use cli_args::{CheckArgs, Cli, Mode, RateArgs};
pub(crate) use config::CliConfig;
pub(crate) use error_map::{emit_error, map_config, map_request_read, map_result_encode};
pub(crate) use logging::init_logging;
pub(crate) use request_loader::{load_request, resolve_path};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, RatingError> {
    let config = CliConfig::load().map_err(map_config)?;
    init_logging(&config.log_level);

    match cli.command {
        Mode::Rate(args) => run_rate(args, &config),
        Mode::Check(args) => run_check(args, &config),
    }
}

fn run_rate(args: RateArgs, config: &CliConfig) -> Result<i32, RatingError> {
    let request = load_request(&args.request)?;
    let engine = build_engine(
        config,
        args.scripts_dir.as_deref(),
        args.max_operations,
        args.current_year,
    )?;

    let result = engine.rate_request(request)?;
    let payload = serde_json::to_string(&result).map_err(map_result_encode)?;

    println!("RESULT:OK");
    println!("ITEMS:{}", result.objects.len());
    println!("PREMIUM:{}", result.premium);
    println!("PREMIUM_JSON:{}", payload);
    Ok(0)
}

fn run_check(args: CheckArgs, config: &CliConfig) -> Result<i32, RatingError> {
    let engine = build_engine(config, args.scripts_dir.as_deref(), args.max_operations, None)?;
    let compiled = engine.compiler().warm_up()?;
    info!(compiled, scripts = %engine.compiler().bundle().describe(), "All rule scripts compiled");

    println!("RESULT:OK");
    println!("SCRIPTS:{}", engine.compiler().bundle().describe());
    println!("COMPILED:{}", compiled);
    Ok(0)
}

fn build_engine(
    config: &CliConfig,
    scripts_dir: Option<&str>,
    max_operations: Option<u64>,
    current_year: Option<i32>,
) -> Result<RatingEngine, RatingError> {
    let scripts_dir = scripts_dir
        .map(PathBuf::from)
        .or_else(|| config.scripts_dir.clone());
    let bundle = open_bundle(scripts_dir.as_deref())?;
    let policy = SandboxPolicy::default()
        .with_max_operations(max_operations.unwrap_or(config.max_operations));

    Ok(RatingEngine::new(RatingEngineOptions {
        bundle: Some(bundle),
        policy: Some(policy),
        current_year: current_year.or(config.current_year),
    }))
}

fn open_bundle(scripts_dir: Option<&Path>) -> Result<Arc<dyn ScriptBundle>, RatingError> {
    match scripts_dir {
        Some(dir) => {
            let bundle = DirectoryBundle::open(resolve_path(dir)?)?;
            Ok(Arc::new(bundle))
        }
        None => Ok(Arc::new(EmbeddedBundle)),
    }
}
