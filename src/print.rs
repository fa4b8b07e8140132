//! Console tables for predictions and backtest reports.

use stanza::renderer::console::Console;
use stanza::renderer::markdown::Markdown;
use stanza::renderer::Renderer;
use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Cell, Col, Row, Table};
use strum::IntoEnumIterator;

use crate::backtest::{BacktestRecord, BacktestReport};
use crate::domain::MatchResult;
use crate::linear::Matrix;
use crate::model::MatchPrediction;

/// Renders to the console with box-drawing borders, or as plain Markdown.
pub fn render(table: &Table, plain: bool) -> String {
    if plain {
        Markdown::default().render(table).to_string()
    } else {
        Console::default().render(table).to_string()
    }
}

fn fair_price(probability: f64) -> String {
    if probability > 0.0 {
        format!("{:.2}", 1.0 / probability)
    } else {
        "-".into()
    }
}

fn right(text: String) -> Cell {
    Cell::new(Styles::default().with(HAlign::Right), text.into())
}

pub fn tabulate_prediction(home_team: &str, away_team: &str, prediction: &MatchPrediction) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(24))),
            Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["".into(), "Probability".into(), "Fair price".into()],
        ))
        .with_row(Row::new(
            Styles::default().with(Separator(true)),
            vec![
                "Expected goals".into(),
                right(format!("{:.3}", prediction.lambda_home)),
                right(format!("{:.3}", prediction.lambda_away)),
            ],
        ));

    for (label, probability) in [
        (format!("{home_team} win"), prediction.home_win_prob),
        ("Draw".to_string(), prediction.draw_prob),
        (format!("{away_team} win"), prediction.away_win_prob),
        (
            format!("Most likely {}", prediction.most_likely_score),
            prediction.most_likely_score_prob,
        ),
    ] {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                label.into(),
                right(format!("{:.6}", probability)),
                right(fair_price(probability)),
            ],
        ));
    }
    table
}

/// The scoregrid with home goals down the rows and away goals across the columns.
pub fn tabulate_scoregrid(scoregrid: &Matrix<f64>) -> Table {
    let mut table = Table::default()
        .with_cols({
            let mut cols = vec![Col::new(
                Styles::default()
                    .with(Separator(true))
                    .with(MinWidth(6))
                    .with(HAlign::Centred),
            )];
            for _ in 0..scoregrid.cols() {
                cols.push(Col::new(
                    Styles::default().with(MinWidth(8)).with(HAlign::Right),
                ));
            }
            cols
        })
        .with_row({
            let mut header_cells = vec!["H \\ A".into()];
            for away_goals in 0..scoregrid.cols() {
                header_cells.push(format!("{away_goals}").into());
            }
            Row::new(Styles::default().with(Header(true)), header_cells)
        });

    for home_goals in 0..scoregrid.rows() {
        let mut row_cells = vec![format!("{home_goals}").into()];
        for probability in scoregrid.row_slice(home_goals) {
            row_cells.push(format!("{probability:.4}").into());
        }
        table.push_row(Row::new(Styles::default(), row_cells));
    }
    table
}

pub fn tabulate_report(report: &BacktestReport) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(28))),
            Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Metric".into(), "Value".into()],
        ));

    let mut rows = vec![
        ("Fixtures evaluated".to_string(), report.total_matches.to_string()),
        ("Fixtures skipped".to_string(), report.skipped.to_string()),
        ("Correct results".to_string(), report.correct_predictions.to_string()),
        ("Result accuracy".to_string(), format!("{:.2}%", report.accuracy * 100.0)),
    ];
    for result in MatchResult::iter() {
        rows.push((
            format!("Precision ({result})"),
            format!("{:.2}%", report.precision_of(&result) * 100.0),
        ));
    }
    rows.extend([
        (
            "Exact score (truncated rates)".to_string(),
            format!("{:.2}%", report.score_accuracy * 100.0),
        ),
        (
            "Exact score (most likely)".to_string(),
            format!("{:.2}%", report.modal_score_accuracy * 100.0),
        ),
        (
            "Total goals".to_string(),
            format!("{:.2}%", report.total_goals_accuracy * 100.0),
        ),
        ("Total goals MAE".to_string(), format!("{:.3}", report.mae)),
    ]);
    if let Some(averages) = &report.league_averages {
        rows.push(("League xG per match".to_string(), format!("{:.3}", averages.avg_goals_for)));
        rows.push((
            "League xGA per match".to_string(),
            format!("{:.3}", averages.avg_goals_against),
        ));
    }

    table.push_rows(
        rows.into_iter()
            .map(|(metric, value)| Row::new(Styles::default(), vec![metric.into(), right(value)])),
    );
    table
}

pub fn tabulate_records(records: &[BacktestRecord]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(20))),
            Col::new(Styles::default().with(MinWidth(20))),
            Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Centred)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "Index".into(),
                "Home".into(),
                "Away".into(),
                "Rates".into(),
                "P(H)".into(),
                "P(D)".into(),
                "P(A)".into(),
                "Modal".into(),
                "Score".into(),
                "Pick".into(),
                "Result".into(),
            ],
        ));
    table.push_rows(records.iter().map(|record| {
        let [home_win, draw, away_win] = record.outcome_probs;
        Row::new(
            Styles::default(),
            vec![
                format!("{}", record.index).into(),
                record.home_team.clone().into(),
                record.away_team.clone().into(),
                format!("{:.2}:{:.2}", record.expected_goals.home, record.expected_goals.away).into(),
                format!("{home_win:.3}").into(),
                format!("{draw:.3}").into(),
                format!("{away_win:.3}").into(),
                format!("{}", record.most_likely_score).into(),
                format!("{}", record.actual_score).into(),
                format!("{}", record.predicted).into(),
                format!("{}", record.actual).into(),
            ],
        )
    }));
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScorelineModel;

    #[test]
    fn prediction_table_dimensions() {
        let prediction = ScorelineModel::default().predict(1.5, 1.2).unwrap();
        let table = tabulate_prediction("Arsenal", "Chelsea", &prediction);
        assert_eq!(3, table.num_cols());
        assert_eq!(6, table.num_rows());
        let rendered = render(&table, true);
        assert!(rendered.contains("Arsenal win"));
        assert!(rendered.contains("Most likely 1:1"));
    }

    #[test]
    fn scoregrid_table_dimensions() {
        let prediction = ScorelineModel::default().predict(1.5, 1.2).unwrap();
        let table = tabulate_scoregrid(&prediction.probability_matrix);
        assert_eq!(8, table.num_cols());
        assert_eq!(8, table.num_rows());
    }

    #[test]
    fn report_table_lists_league_averages_when_known() {
        let mut report = BacktestReport::from_records(vec![], 4);
        let rows = tabulate_report(&report).num_rows();
        report.league_averages = Some(crate::domain::LeagueAverages::new(1.3, 1.3).unwrap());
        assert_eq!(rows + 2, tabulate_report(&report).num_rows());
        assert!(render(&tabulate_report(&report), false).contains("Fixtures skipped"));
    }
}
