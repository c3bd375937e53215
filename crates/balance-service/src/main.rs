mod cli;

use balance_config::{Config, LogFormat, load_config};
use balance_service::{AppState, StartupError, serve};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}

fn init_tracing(verbosity: u8, config: &Config) {
    let filter = match verbosity {
        0 if config.debug => "debug",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(false)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init(),
    }
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    let config = load_config(cli.config.as_deref(), &cli.overrides())?;

    if cli.print_config {
        print!("{}", config.render_toml()?);
        return Ok(());
    }

    init_tracing(cli.verbose, &config);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.listen,
        dry_run = config.dry_run,
        show_passwords = config.show_passwords,
        "balance starting"
    );

    let addr = config.listen_addr()?;
    serve(addr, AppState::from_config(&config)).await
}
