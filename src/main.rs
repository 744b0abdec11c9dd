mod cli;
mod shutdown;

use clap::Parser;
use std::io::IsTerminal;
use std::process::ExitCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use cli::Cli;
use zipline::{Config, Preprocessor, observability};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    observability::init_tracing(cli.log_level());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("zipline: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AnyError> {
    let config = load_config(&cli)?;
    let input = read_input(&cli).await?;

    let cancel = CancellationToken::new();
    shutdown::cancel_on_signal(cancel.clone());

    let preprocessor = Preprocessor::from_config(&config)?;
    let output = preprocessor.process(&input, &cli.source_name(), &cancel).await;
    // stop the signal watcher
    cancel.cancel();
    let mut output = output?;
    output.push('\n');

    match &cli.output {
        Some(path) => tokio::fs::write(path, output).await?,
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(output.as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config, AnyError> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path.clone())?,
        None => Config::load()?,
    };

    if let Some(max_concurrent) = cli.max_concurrent {
        config.fetch.max_concurrent = max_concurrent;
    }
    if let Some(min_interval) = cli.min_interval {
        config.fetch.min_interval = min_interval;
    }
    config.validate()?;

    debug!(
        max_concurrent = config.fetch.max_concurrent,
        min_interval = %config.fetch.min_interval.to_human_readable(),
        "Configuration loaded"
    );
    Ok(config)
}

async fn read_input(cli: &Cli) -> Result<String, AnyError> {
    match &cli.input {
        Some(path) => Ok(tokio::fs::read_to_string(path).await?),
        None => {
            if std::io::stdin().is_terminal() {
                return Err("no input provided".into());
            }
            let mut input = String::new();
            tokio::io::stdin().read_to_string(&mut input).await?;
            Ok(input)
        }
    }
}
