use std::fs;
use std::path::PathBuf;

use matchday_stats::config::EngineConfig;
use matchday_stats::metric_table::{Direction, EntityMetrics, MetricTable};
use matchday_stats::report::build_team_report;
use matchday_stats::stat_type::StatType;
use matchday_stats::StatsError;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn attack_population() -> MetricTable {
    let records: Vec<EntityMetrics> =
        serde_json::from_str(&read_fixture("attack_season.json")).expect("fixture should parse");
    MetricTable::from_records(&records)
}

#[test]
fn attack_report_for_the_top_side() {
    let report = build_team_report(
        &attack_population(),
        1,
        StatType::Attack,
        &EngineConfig::default(),
    )
    .expect("team 1 is in the population");

    assert_eq!(report.team_name.as_deref(), Some("Arsenal"));
    assert_eq!(report.population_size, 4);

    let goals = report.line("goals_per_game").expect("goals reported");
    assert_eq!(goals.value, Some(2.1));
    assert_eq!(goals.percentile, Some(100.0));
    assert_eq!(goals.direction, Direction::HigherIsBetter);
    assert!((goals.league_average.expect("average") - 1.6).abs() < 1e-9);
    assert!(report.line("team_name").is_none());

    assert_eq!(report.radar.len(), StatType::Attack.radar_axes().len());
    let axis = &report.radar[0];
    assert_eq!(axis.metric, "goals_per_game");
    assert_eq!(axis.label, "Goals/Game");
    // Scale (0.95, 2.25).
    assert!((axis.team_radius - 0.885).abs() < 1e-9);
    assert!((axis.league_radius - 0.5).abs() < 1e-9);
    assert!(report.radar.iter().all(|a| (0.0..=1.0).contains(&a.team_radius)));
}

#[test]
fn missing_team_is_an_error() {
    let err = build_team_report(
        &attack_population(),
        77,
        StatType::Attack,
        &EngineConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err, StatsError::EntityNotFound(77));
}

#[test]
fn category_directions_are_applied() {
    let records = vec![
        EntityMetrics::new()
            .with("team_id", 1)
            .with("fouls_per_game", 9.0)
            .with("total_red_cards", 0),
        EntityMetrics::new()
            .with("team_id", 2)
            .with("fouls_per_game", 13.0)
            .with("total_red_cards", 4),
    ];
    let population = MetricTable::from_records(&records);
    let report = build_team_report(&population, 1, StatType::Discipline, &EngineConfig::default())
        .expect("team 1 is in the population");

    let fouls = report.line("fouls_per_game").expect("fouls reported");
    assert_eq!(fouls.direction, Direction::LowerIsBetter);
    assert_eq!(fouls.percentile, Some(100.0));

    let reds = report
        .radar
        .iter()
        .find(|a| a.metric == "total_red_cards")
        .expect("red cards axis");
    assert!(reds.team_radius > reds.league_radius);
}

#[test]
fn report_serializes_for_the_cli() {
    let report = build_team_report(
        &attack_population(),
        3,
        StatType::Attack,
        &EngineConfig::default(),
    )
    .expect("team 3 is in the population");
    let json = serde_json::to_value(&report).expect("serializes");
    assert_eq!(json["stat_type"], "attack");
    assert_eq!(json["team_name"], "Chelsea");
}
