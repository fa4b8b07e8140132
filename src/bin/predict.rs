use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::{anyhow, bail};
use clap::Parser;
use tracing::{debug, info, warn};

use scoreline::config::Config;
use scoreline::data;
use scoreline::model::{Correction, ScorelineModel};
use scoreline::print;
use scoreline::rates::{FormEstimator, RateEstimator, XgRatioEstimator};

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// home team
    #[clap(long)]
    home: String,

    /// away team
    #[clap(long)]
    away: String,

    /// `;`-separated league table of cumulative xG and xGA
    #[clap(short, long)]
    table: Option<PathBuf>,

    /// match history to derive recent form from
    #[clap(long)]
    history: Option<PathBuf>,

    /// JSON config file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Dixon-Coles rho
    #[clap(long)]
    rho: Option<f64>,

    /// plain independent Poisson, without the Dixon-Coles correction
    #[clap(long, conflicts_with = "rho")]
    independent: bool,

    /// largest goal count per side in the scoregrid
    #[clap(short, long)]
    max_goals: Option<u8>,

    /// number of recent venue matches that make up a team's form
    #[clap(short, long)]
    window: Option<usize>,

    /// print the full scoregrid
    #[clap(short, long)]
    grid: bool,

    /// render tables as Markdown
    #[clap(long)]
    plain: bool,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        match (&self.table, &self.history) {
            (None, None) => bail!("either a league table or a match history must be specified"),
            (Some(_), Some(_)) => bail!("a league table and a match history are mutually exclusive"),
            _ => {}
        }
        if self.home == self.away {
            bail!("home and away teams must differ");
        }
        Ok(())
    }

    fn config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::read_json_file(path)?,
            None => Config::default(),
        };
        if let Some(window) = self.window {
            config.form_window = window;
        }
        if let Some(max_goals) = self.max_goals {
            config.model.max_goals = max_goals;
        }
        if let Some(rho) = self.rho {
            config.model.correction = Correction::DixonColes { rho };
        }
        if self.independent {
            config.model.correction = Correction::None;
        }
        config.validate()?;
        Ok(config)
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

    let expected_goals = match (&args.table, &args.history) {
        (Some(path), _) => {
            let rows = data::read_league_table_file(path)?;
            info!("read {} teams from {}", rows.len(), path.display());
            for team in [&args.home, &args.away] {
                if !rows.iter().any(|row| &row.team == team) {
                    warn!("{team} is not in the league table; using league averages");
                }
            }
            let estimator = XgRatioEstimator::from_league_table(&rows, &config.fallbacks);
            debug!("league averages: {:?}", estimator.league_averages());
            estimator.estimate(&args.home, &args.away)
        }
        (None, Some(path)) => {
            let fixtures = data::read_fixtures_file(path)?;
            info!("read {} fixtures from {}", fixtures.len(), path.display());
            FormEstimator::new(&fixtures, config.form_window, &config.fallbacks).estimate(&args.home, &args.away)
        }
        (None, None) => return Err(anyhow!("no rate source").into()),
    };

    let model = ScorelineModel::try_from(config.model)?;
    let prediction = model.predict_expected(&expected_goals)?;
    println!(
        "{} v {}:\n{}",
        args.home,
        args.away,
        print::render(&print::tabulate_prediction(&args.home, &args.away, &prediction), args.plain)
    );
    if args.grid {
        println!(
            "Scoregrid:\n{}",
            print::render(&print::tabulate_scoregrid(&prediction.probability_matrix), args.plain)
        );
    }
    info!("predicted result: {}", prediction.predicted_result());

    Ok(())
}
