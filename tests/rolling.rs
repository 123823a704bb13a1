use matchday_stats::metric_table::{Cell, MetricTable};
use matchday_stats::rolling::{
    ewma, ewma_grouped, rolling_mean, rolling_mean_column, rolling_mean_grouped, rolling_sum,
    rolling_sum_column,
};
use matchday_stats::StatsError;

fn dense(xs: &[f64]) -> Vec<Option<f64>> {
    xs.iter().copied().map(Some).collect()
}

fn assert_close(actual: &[Option<f64>], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        let a = a.expect("value should be present");
        assert!((a - e).abs() < 1e-9, "expected {e}, got {a}");
    }
}

#[test]
fn rolling_mean_uses_partial_windows_at_the_start() {
    let out = rolling_mean(&dense(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3, 1).expect("valid window");
    assert_close(&out, &[1.0, 1.5, 2.0, 3.0, 4.0]);
}

#[test]
fn rolling_sum_over_three() {
    let out = rolling_sum(&dense(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3, 1).expect("valid window");
    assert_close(&out, &[1.0, 3.0, 6.0, 9.0, 12.0]);
}

#[test]
fn window_of_one_is_identity() {
    let values = dense(&[4.0, -1.5, 0.0, 9.25]);
    assert_eq!(rolling_mean(&values, 1, 1).expect("valid window"), values);
}

#[test]
fn min_periods_holds_back_early_values() {
    let out = rolling_mean(&dense(&[2.0, 4.0, 6.0]), 3, 3).expect("valid window");
    assert_eq!(out, vec![None, None, Some(4.0)]);
}

#[test]
fn empty_input_gives_empty_output() {
    assert!(rolling_mean(&[], 3, 1).expect("valid window").is_empty());
    assert!(rolling_sum(&[], 3, 1).expect("valid window").is_empty());
    assert!(ewma(&[], 3.0).expect("valid span").is_empty());
}

#[test]
fn grouped_windows_reset_per_group() {
    let keys = [1, 1, 1, 2, 2];
    let values = dense(&[1.0, 2.0, 3.0, 10.0, 20.0]);
    let out = rolling_mean_grouped(&keys, &values, 2, 1).expect("valid window");
    assert_close(&out, &[1.0, 1.5, 2.5, 10.0, 15.0]);
}

#[test]
fn grouped_windows_handle_interleaved_rows() {
    let keys = ["a", "b", "a", "b"];
    let values = dense(&[1.0, 10.0, 3.0, 30.0]);
    let out = rolling_mean_grouped(&keys, &values, 2, 1).expect("valid window");
    assert_close(&out, &[1.0, 10.0, 2.0, 20.0]);
}

#[test]
fn grouped_length_mismatch_is_rejected() {
    let err = rolling_mean_grouped(&[1, 2], &dense(&[1.0]), 2, 1).unwrap_err();
    assert_eq!(err, StatsError::GroupLengthMismatch { keys: 2, values: 1 });
}

#[test]
fn ewma_follows_the_recursive_definition() {
    let span = 4.0;
    let alpha = 2.0 / (span + 1.0);
    let xs = [3.0, 5.0, 4.0, 8.0];
    let mut expected = vec![xs[0]];
    for x in &xs[1..] {
        let prev = *expected.last().expect("seeded");
        expected.push(alpha * x + (1.0 - alpha) * prev);
    }
    let out = ewma(&dense(&xs), span).expect("valid span");
    assert_close(&out, &expected);
}

#[test]
fn ewma_grouped_seeds_each_group() {
    let out = ewma_grouped(&[1, 2, 1], &dense(&[2.0, 100.0, 4.0]), 3.0).expect("valid span");
    assert_close(&out, &[2.0, 100.0, 3.0]);
}

#[test]
fn column_variants_group_by_team() {
    let table = MetricTable::from_columns(vec![
        ("team_id", vec![Cell::from(7), Cell::from(7), Cell::from(8), Cell::from(7)]),
        (
            "goals",
            vec![Cell::from(1), Cell::from(3), Cell::from(0), Cell::Null],
        ),
    ])
    .expect("table");

    let means = rolling_mean_column(&table, "goals", 2, 1, Some("team_id")).expect("known column");
    assert_eq!(means, vec![Some(1.0), Some(2.0), Some(0.0), Some(3.0)]);

    let sums = rolling_sum_column(&table, "goals", 3, 1, None).expect("known column");
    assert_eq!(sums, vec![Some(1.0), Some(4.0), Some(4.0), Some(3.0)]);

    assert_eq!(
        rolling_mean_column(&table, "shots", 2, 1, None),
        Err(StatsError::UnknownColumn("shots".to_string()))
    );
}

#[test]
fn repeated_calls_are_identical() {
    let values = dense(&[0.3, 0.1, 0.7, 0.2]);
    assert_eq!(
        rolling_mean(&values, 2, 1).expect("valid"),
        rolling_mean(&values, 2, 1).expect("valid")
    );
}

#[test]
fn window_of_one_keeps_inexact_decimals() {
    let values = dense(&[0.1, 0.7, 0.3, 1.9, 2.2]);
    assert_eq!(rolling_mean(&values, 1, 1).expect("valid window"), values);
    assert_eq!(rolling_sum(&values, 1, 1).expect("valid window"), values);
}

#[test]
fn large_value_leaving_the_window_does_not_skew_later_sums() {
    let mut values = vec![Some(1e16)];
    values.extend(std::iter::repeat_n(Some(1.0), 10));
    let out = rolling_sum(&values, 3, 1).expect("valid window");
    assert_eq!(&out[8..], &[Some(3.0), Some(3.0), Some(3.0)]);
}
