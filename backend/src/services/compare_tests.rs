use super::*;

fn row(id: i64, name: &str, period: &str, price: Option<f64>) -> PriceObservation {
    PriceObservation::new(id, name, period, price, 1)
}

fn snapshot() -> Vec<PriceObservation> {
    vec![
        row(1, "Campus Café", "Maksimir", Some(4.0)),
        row(2, "Coffee Corner", "Centar", Some(5.0)),
        row(3, "The Green Bean", "Centar", Some(6.0)),
        row(4, "Student Union Grill", "Trnje", Some(7.0)),
        row(5, "Pizza Palace", "Trešnjevka", Some(8.0)),
        row(6, "Burger Hub", "Dubrava", Some(9.0)),
        row(7, "Pekara", "Dubrava", None),
    ]
}

#[test]
fn test_compute_compare_data() {
    let rows = snapshot();
    let data = compute_compare_data(
        &rows,
        None,
        &CompareQuery::default(),
        &CompareSettings::default(),
    );

    assert_eq!(data.total_rows, 7);
    assert_eq!(data.thresholds, TierThresholds::new(5.0, 7.0));
    assert_eq!(data.tier_counts.low, 2);
    assert_eq!(data.tier_counts.mid, 2);
    assert_eq!(data.tier_counts.high, 2);
    assert_eq!(data.rows.len(), 7);
    assert_eq!(data.rows[6].tier, None);

    assert_eq!(data.periods.len(), 5);
    assert_eq!(data.periods[0].period, "Dubrava");
    assert_eq!(data.periods[0].restaurant_count, 1);

    let min_max = data.min_max.unwrap();
    assert_eq!(min_max.cheapest.period, "Maksimir");
    assert_eq!(min_max.most_expensive.period, "Dubrava");
    assert_eq!(min_max.diff, 5.0);
}

#[test]
fn test_query_and_tier_filter() {
    let rows = snapshot();
    let query = CompareQuery {
        text_query: "centar".to_string(),
        tier: Some(Tier::Mid),
        limit: None,
    };
    let data = compute_compare_data(&rows, None, &query, &CompareSettings::default());

    assert_eq!(data.rows.len(), 1);
    assert_eq!(data.rows[0].row.restaurant_name, "The Green Bean");
    // counts are over the whole snapshot, not the filtered table
    assert_eq!(data.tier_counts.total(), 6);
}

#[test]
fn test_limit_override() {
    let rows = snapshot();
    let query = CompareQuery {
        limit: Some(2),
        ..Default::default()
    };
    let data = compute_compare_data(&rows, None, &query, &CompareSettings::default());

    assert_eq!(data.rows.len(), 2);
    assert_eq!(data.rows[0].row.restaurant_id.value(), 1);
}

#[test]
fn test_pre_aggregated_summaries_are_sorted() {
    let summaries = vec![
        PeriodSummary::new("Trnje", 6.0, 10),
        PeriodSummary::new("Centar", 9.0, 20),
    ];
    let data = compute_compare_data(
        &snapshot(),
        Some(summaries),
        &CompareQuery::default(),
        &CompareSettings::default(),
    );

    assert_eq!(data.periods.len(), 2);
    assert_eq!(data.periods[0].period, "Centar");
    assert_eq!(data.top_periods[0].period, "Trnje");
    assert_eq!(data.best_value[0].period, "Centar");
}

#[test]
fn test_empty_snapshot() {
    let data = compute_compare_data(
        &[],
        None,
        &CompareQuery::default(),
        &CompareSettings::default(),
    );

    assert!(data.thresholds.is_degenerate());
    assert_eq!(data.tier_counts.total(), 0);
    assert!(data.rows.is_empty());
    assert!(data.periods.is_empty());
    assert!(data.min_max.is_none());
    assert!(data.best_value.is_empty());
    assert_eq!(data.overview.mean_of_periods, None);
}

#[cfg(feature = "mock-source")]
#[tokio::test]
async fn test_load_compare_data_from_mock() {
    let source = crate::sources::MockSource::new().with_rows(snapshot());
    let data = load_compare_data(&source, &CompareQuery::default(), &CompareSettings::default())
        .await
        .unwrap();

    assert_eq!(data.total_rows, 7);
    assert_eq!(data.fingerprint, snapshot_fingerprint(&snapshot()));
}
