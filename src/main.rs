//! tscell - a notebook-cell interpreter for time-series database scripts.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};
use tscell::cli::Cli;
use tscell::config::Config;
use tscell::coordinator::{FailurePolicy, Interpreter, StatementOutcome};
use tscell::engine;
use tscell::error::{CellError, Result};
use tscell::output::CellOutput;
use tscell::script::segment;

/// Exit code when the script ran but a statement failed.
const EXIT_STATEMENT_FAILED: u8 = 1;

/// Exit code for configuration, input and seed errors.
const EXIT_USAGE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is not an error
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    tscell::logging::init(cli.log_file.as_deref());

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}: {}", e.category(), e);
            eprintln!("{e}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

async fn run(cli: &Cli) -> Result<ExitCode> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    config.apply_env_overrides()?;
    cli.apply_overrides(&mut config)?;

    let script = cli.read_script()?;

    if cli.split_only {
        for statement in segment(&script) {
            println!("{statement}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let render_options = config.output.render_options()?;
    let engine = Arc::new(engine::open(&config.engine));
    let interpreter = Interpreter::new(engine, config.interpreter.on_error);
    info!(
        "Interpreting with on_error = {}",
        config.interpreter.on_error.as_str()
    );

    if let Some(seed) = cli.read_seed()? {
        seed_engine(&interpreter, &seed).await?;
    }

    let result = interpreter.interpret(&script).await;
    let output = CellOutput::from_result(&result, &render_options);
    let rendered = output.render(config.output.format)?;
    if !rendered.is_empty() {
        println!("{rendered}");
    }

    interpreter.close().await?;

    if result.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        warn!("{} statement(s) failed", result.failures().count());
        Ok(ExitCode::from(EXIT_STATEMENT_FAILED))
    }
}

/// Runs the seed script with stop-on-error, failing on its first error.
async fn seed_engine(interpreter: &Interpreter, seed: &str) -> Result<()> {
    let seeder = Interpreter::new(Arc::clone(interpreter.engine()), FailurePolicy::StopOnError);
    let result = seeder.interpret(seed).await;

    let first_failure = result.failures().next();
    match first_failure {
        Some(StatementOutcome::Failure {
            statement,
            diagnostic,
            ..
        }) => Err(CellError::config(format!(
            "Seed statement '{statement}' failed: {diagnostic}"
        ))),
        _ => {
            info!("Seeded engine with {} statement(s)", result.outcomes.len());
            Ok(())
        }
    }
}
