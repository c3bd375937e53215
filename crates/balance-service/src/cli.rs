//! Command-line arguments. Everything here overrides the config file and
//! environment.

use std::path::PathBuf;

use balance_config::{ConfigOverrides, LogFormat};
use clap::{ArgAction, Parser};

#[derive(Debug, Parser)]
#[command(
    name = "balance",
    version,
    about = "HTTP adapter for A10 and F5 load balancers",
    long_about = "Serves the virtual-server topology of A10 (axAPI v2.1) and F5 (iControl REST) \
                  appliances over HTTP and reconciles A10 appliances toward a declared rule set.\n\n\
                  Callers authenticate with the appliance's own credentials via HTTP Basic auth."
)]
pub struct Cli {
    /// Config file (default: platform config dir, balance/config.toml)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Listen address, host:port or :port
    #[arg(long, short = 'l', value_name = "ADDR")]
    pub listen: Option<String>,

    /// Send mutations to appliances instead of only logging them
    #[arg(long)]
    pub no_dry: bool,

    /// Only log mutations, even if the config enables them
    #[arg(long, conflicts_with = "no_dry")]
    pub dry_run: bool,

    /// Verbose wire logging
    #[arg(long)]
    pub debug: bool,

    /// Log line format
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        let dry_run = if self.no_dry {
            Some(false)
        } else if self.dry_run {
            Some(true)
        } else {
            None
        };
        ConfigOverrides {
            listen: self.listen.clone(),
            dry_run,
            debug: self.debug.then_some(true),
            log_format: self.log_format,
        }
    }
}
