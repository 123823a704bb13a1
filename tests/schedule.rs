use matchday_stats::fixtures::MatchColumns;
use matchday_stats::metric_table::{Cell, MetricTable};
use matchday_stats::schedule::{adjust_for_sos, opponent_strength, sos_rating};
use matchday_stats::StatsError;

/// `points_per_game_home` / `_away` hold each side's strength going in.
fn matches() -> MetricTable {
    MetricTable::from_columns(vec![
        (
            "home_team_id",
            vec![Cell::from(1), Cell::from(2), Cell::from(3), Cell::from(1)],
        ),
        (
            "away_team_id",
            vec![Cell::from(2), Cell::from(1), Cell::from(4), Cell::from(3)],
        ),
        (
            "points_per_game_home",
            vec![Cell::from(2.0), Cell::from(1.5), Cell::from(1.0), Cell::from(2.0)],
        ),
        (
            "points_per_game_away",
            vec![Cell::from(1.5), Cell::from(2.0), Cell::from(0.5), Cell::from(1.0)],
        ),
    ])
    .expect("table")
}

#[test]
fn opponent_strength_reads_the_other_side() {
    let out = opponent_strength(&matches(), 1, "points_per_game", &MatchColumns::default())
        .expect("columns exist");
    assert_eq!(out, vec![Some(1.5), Some(1.5), None, Some(1.0)]);
}

#[test]
fn opponent_strength_needs_both_side_columns() {
    assert_eq!(
        opponent_strength(&matches(), 1, "elo", &MatchColumns::default()),
        Err(StatsError::UnknownColumn("elo_away".to_string()))
    );
}

#[test]
fn sos_rating_is_the_mean_opponent_strength() {
    let rating = sos_rating(&matches(), 1, "points_per_game", &MatchColumns::default())
        .expect("columns exist");
    assert_eq!(rating, 1.33);
}

#[test]
fn sos_rating_without_matches_is_zero() {
    let rating = sos_rating(&matches(), 42, "points_per_game", &MatchColumns::default())
        .expect("columns exist");
    assert_eq!(rating, 0.0);
}

#[test]
fn adjustment_scales_by_relative_strength() {
    let table = MetricTable::from_columns(vec![
        ("goals", vec![Cell::from(2), Cell::from(2), Cell::Null]),
        ("opp", vec![Cell::from(1.5), Cell::from(0.5), Cell::from(1.0)]),
    ])
    .expect("table");

    let implied = adjust_for_sos(&table, "goals", "opp", None).expect("columns exist");
    assert_eq!(implied, vec![Some(3.0), Some(1.0), None]);

    let explicit = adjust_for_sos(&table, "goals", "opp", Some(0.5)).expect("columns exist");
    assert_eq!(explicit, vec![Some(6.0), Some(2.0), None]);

    let unchanged = adjust_for_sos(&table, "goals", "opp", Some(0.0)).expect("columns exist");
    assert_eq!(unchanged, vec![Some(2.0), Some(2.0), None]);
}
