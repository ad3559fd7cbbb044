mod calc;
mod data;
mod psychro;
mod server;

use anyhow::Result;
use calc::{HumidityCalculator, Strategy};
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

/// Web service that calculates absolute humidity from temperature and
/// relative humidity.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Address to bind the HTTP server to.
    #[arg(long, default_value = "0.0.0.0", env = "HUMCALC_HOST")]
    host: String,

    /// Port to bind the HTTP server to.
    #[arg(long, default_value_t = 8000, env = "HUMCALC_PORT")]
    port: u16,

    /// Calculation strategy used for all requests.
    #[arg(long, value_enum, default_value_t = StrategyArg::Magnus, env = "HUMCALC_STRATEGY")]
    strategy: StrategyArg,

    /// Log level.
    #[arg(long, default_value = "info", env = "HUMCALC_LOG")]
    log_level: LevelFilter,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Closed-form Magnus approximation.
    Magnus,
    /// ASHRAE psychrometric relations.
    Psychrometric,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Magnus => Strategy::Magnus,
            StrategyArg::Psychrometric => Strategy::Psychrometric,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    TermLogger::init(
        args.log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let calculator = HumidityCalculator::new(args.strategy.into());
    log::info!("using the {} calculation strategy", calculator.strategy());

    server::run(&format!("{}:{}", args.host, args.port), calculator)
}
