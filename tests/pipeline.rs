use assert_float_eq::*;

use scoreline::backtest::{run_backtest, BacktestConfig};
use scoreline::config::Config;
use scoreline::data;
use scoreline::domain::{MatchResult, Score};
use scoreline::model::ScorelineModel;
use scoreline::probs::SliceExt;
use scoreline::rates::{FormEstimator, RateEstimator, RateSource, XgRatioEstimator};

const HISTORY: &str = "\
Date,HomeTeam,AwayTeam,FTHG,FTAG,home_xg,away_xg
19/08/2023,Chelsea,Arsenal,1,1,1.2,1.4
12/08/2023,Arsenal,Chelsea,2,0,2.1,0.7
26/08/2023,Arsenal,Everton,3,1,2.4,0.9
02/09/2023,Everton,Chelsea,0,2,0.8,1.9
09/09/2023,Everton,Arsenal,1,2,1.0,1.6
16/09/2023,Chelsea,Everton,1,1,1.5,1.1
23/09/2023,Arsenal,Chelsea,1,0,1.7,0.9
30/09/2023,Chelsea,Arsenal,2,2,1.3,1.5
07/10/2023,Arsenal,Everton,4,0,2.8,0.4
14/10/2023,Everton,Chelsea,1,3,0.9,2.2
";

const LEAGUE_TABLE: &str = r#""team";"matches";"xG";"xGA"
"Arsenal";"10";"20.0";"10.0"
"Chelsea";"10";"15.0";"12.5"
"Everton";"10";"10.0";"20.0"
"#;

#[test]
fn predict_from_league_table() {
    let rows = data::read_league_table(LEAGUE_TABLE.as_bytes()).unwrap();
    let config = Config::default();
    let estimator = XgRatioEstimator::from_league_table(&rows, &config.fallbacks);
    let expected_goals = estimator.estimate("Arsenal", "Everton");

    // league xGA per match: (1.0 + 1.25 + 2.0) / 3
    let avg_xga = 4.25 / 3.0;
    assert_float_relative_eq!(2.0 * 2.0 / avg_xga, expected_goals.home, 1e-9);
    assert_float_relative_eq!(1.0 * 1.0 / avg_xga, expected_goals.away, 1e-9);

    let prediction = ScorelineModel::try_from(config.model)
        .unwrap()
        .predict_expected(&expected_goals)
        .unwrap();
    assert_float_absolute_eq!(1.0, prediction.outcome_probs().sum(), 1e-9);
    assert_eq!(MatchResult::HomeWin, prediction.predicted_result());
    assert!(prediction.home_win_prob > 0.6);
}

#[test]
fn predict_from_history() {
    let fixtures = data::read_fixtures(HISTORY.as_bytes()).unwrap();
    assert_eq!("Arsenal", fixtures[0].home_team);
    assert_eq!(Score::new(2, 0), fixtures[0].score());

    let config = Config::default();
    let expected_goals = FormEstimator::new(&fixtures, config.form_window, &config.fallbacks).estimate("Arsenal", "Chelsea");
    // Arsenal at home: scored (2 + 3 + 1 + 4) / 4, conceded (0 + 1 + 0 + 0) / 4.
    // Chelsea away: scored (0 + 2 + 0 + 3) / 4, conceded (2 + 0 + 1 + 1) / 4.
    assert_float_absolute_eq!((2.5 + 1.0) / 2.0, expected_goals.home, 1e-12);
    assert_float_absolute_eq!((1.25 + 0.25) / 2.0, expected_goals.away, 1e-12);
}

#[test]
fn backtest_from_history() {
    let fixtures = data::read_fixtures(HISTORY.as_bytes()).unwrap();
    for source in [RateSource::Form, RateSource::XgRatio] {
        let config = BacktestConfig {
            source,
            min_games: 1,
            ..BacktestConfig::default()
        };
        let report = run_backtest(&fixtures, &config).unwrap();
        assert_eq!(fixtures.len(), report.total_matches + report.skipped);
        assert!(report.total_matches > 0);
        assert!((0.0..=1.0).contains(&report.accuracy));
        assert_eq!(
            report.total_matches,
            report.actual_counts.iter().sum::<usize>()
        );
        for record in &report.records {
            assert!(record.index > 0, "the opening fixture has no history");
        }
    }
}

#[test]
fn default_config_file_matches_defaults() {
    let config = Config::read_json_file("config/default.json").unwrap();
    assert_eq!(Config::default(), config);
}
