use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;
use tracing::{debug, info, warn};

use scoreline::backtest::{run_backtest, BacktestConfig};
use scoreline::config::Config;
use scoreline::data;
use scoreline::print;
use scoreline::rates::RateSource;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// match history to replay
    file: Option<PathBuf>,

    /// JSON config file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// prior venue matches needed before a fixture is evaluated
    #[clap(short, long)]
    min_games: Option<usize>,

    /// rate estimator: `xg` or `form`
    #[clap(short, long, default_value = "xg")]
    source: RateSource,

    /// print every evaluated fixture
    #[clap(short, long)]
    details: bool,

    /// render tables as Markdown
    #[clap(long)]
    plain: bool,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        self.file
            .as_ref()
            .ok_or(anyhow!("match history must be specified"))?;
        Ok(())
    }

    fn config(&self) -> anyhow::Result<BacktestConfig> {
        let mut config = match &self.config {
            Some(path) => Config::read_json_file(path)?,
            None => Config::default(),
        };
        if let Some(min_games) = self.min_games {
            config.min_games = min_games;
        }
        Ok(BacktestConfig::new(self.source, &config))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");
    let config = args.config()?;
    debug!("config: {config:?}");

    let file = args.file.as_ref().ok_or(anyhow!("match history must be specified"))?;
    let fixtures = data::read_fixtures_file(file)?;
    info!("read {} fixtures from {}", fixtures.len(), file.display());
    if let RateSource::XgRatio = config.source {
        if fixtures.iter().all(|fixture| fixture.xg().is_none()) {
            warn!("no fixture carries xG figures; every rate will fall back to the league averages");
        }
    }

    let report = run_backtest(&fixtures, &config)?;
    if args.details {
        println!(
            "Fixtures:\n{}",
            print::render(&print::tabulate_records(&report.records), args.plain)
        );
    }
    println!(
        "Backtest ({} source, min games {}):\n{}",
        config.source,
        config.min_games,
        print::render(&print::tabulate_report(&report), args.plain)
    );

    Ok(())
}
