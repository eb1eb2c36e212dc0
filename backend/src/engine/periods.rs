//! District-level aggregation and rankings.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::{PeriodSummary, PriceObservation};

/// Number of districts shown in the bar chart.
pub const DEFAULT_TOP_PERIODS: usize = 12;
/// Number of districts in the best value list.
pub const DEFAULT_BEST_VALUE_LIMIT: usize = 8;

const SCATTER_MIN_SIZE: u32 = 1;
const SCATTER_MAX_SIZE: u32 = 120;

/// Cheapest and most expensive district of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxPeriod {
    pub cheapest: PeriodSummary,
    pub most_expensive: PeriodSummary,
    /// `most_expensive - cheapest`, never negative.
    pub diff: f64,
}

/// District ranked by restaurants per euro.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestValueEntry {
    pub period: String,
    pub score: f64,
    pub restaurant_count: u32,
    pub average_of_averages: f64,
}

/// Mean over all district averages and how many districts sit on each side of it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PeriodOverview {
    pub mean_of_periods: Option<f64>,
    pub above_mean: usize,
    pub below_mean: usize,
}

/// One point of the district scatter plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    /// 1 is the most expensive district.
    pub rank: usize,
    pub period: String,
    pub average: f64,
    pub restaurants: u32,
    /// Marker size, the restaurant count clamped to `[1, 120]`.
    pub size: u32,
}

/// Descending by average, ties by period name.
fn display_order(a: &PeriodSummary, b: &PeriodSummary) -> Ordering {
    b.average_of_averages
        .total_cmp(&a.average_of_averages)
        .then_with(|| a.period.cmp(&b.period))
}

/// Group rows by period and average the valid prices of each group.
///
/// Periods without a single valid price are omitted. The result is in display
/// order: most expensive first, ties broken by period name.
pub fn summarize_periods(rows: &[PriceObservation]) -> Vec<PeriodSummary> {
    // period -> (running mean, count)
    let mut groups: BTreeMap<&str, (f64, u32)> = BTreeMap::new();

    for row in rows {
        if let Some(price) = row.valid_price() {
            let (mean, count) = groups.entry(row.period.as_str()).or_insert((0.0, 0));
            *count += 1;
            *mean += (price - *mean) / f64::from(*count);
        }
    }

    let mut summaries: Vec<PeriodSummary> = groups
        .into_iter()
        .map(|(period, (mean, count))| PeriodSummary::new(period, mean, count))
        .collect();

    sort_for_display(&mut summaries);
    summaries
}

/// Sort summaries most expensive first (ties by period name).
pub fn sort_for_display(summaries: &mut [PeriodSummary]) {
    summaries.sort_by(display_order);
}

/// The `n` most expensive districts, reversed so the chart reads cheapest to
/// most expensive.
pub fn top_periods(summaries: &[PeriodSummary], n: usize) -> Vec<PeriodSummary> {
    let mut sorted = summaries.to_vec();
    sort_for_display(&mut sorted);
    sorted.truncate(n);
    sorted.reverse();
    sorted
}

/// Cheapest and most expensive district; `None` when there are none.
///
/// Equal averages resolve to the lexicographically smallest period name on
/// both ends. Summaries with a non-finite average are ignored.
pub fn min_max_period(summaries: &[PeriodSummary]) -> Option<MinMaxPeriod> {
    let finite = || summaries.iter().filter(|s| s.average_of_averages.is_finite());

    let cheapest = finite().min_by(|a, b| {
        a.average_of_averages
            .total_cmp(&b.average_of_averages)
            .then_with(|| a.period.cmp(&b.period))
    })?;
    let most_expensive = finite().min_by(|a, b| display_order(a, b))?;

    Some(MinMaxPeriod {
        diff: most_expensive.average_of_averages - cheapest.average_of_averages,
        cheapest: cheapest.clone(),
        most_expensive: most_expensive.clone(),
    })
}

/// Rank districts by `restaurant_count / average_of_averages`, best first.
///
/// Districts whose average is not a finite positive number are excluded. The
/// sort is stable, so equal scores keep their input order.
pub fn best_value_ranking(summaries: &[PeriodSummary], limit: usize) -> Vec<BestValueEntry> {
    let mut ranked: Vec<BestValueEntry> = summaries
        .iter()
        .filter(|s| s.average_of_averages.is_finite() && s.average_of_averages > 0.0)
        .map(|s| BestValueEntry {
            period: s.period.clone(),
            score: s.restaurant_count as f64 / s.average_of_averages,
            restaurant_count: s.restaurant_count,
            average_of_averages: s.average_of_averages,
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(limit);
    ranked
}

fn running_mean(values: &[f64]) -> f64 {
    values
        .iter()
        .enumerate()
        .fold(0.0, |mean, (i, v)| mean + (v - mean) / (i + 1) as f64)
}

/// Mean of the finite district averages with above/below counts.
pub fn period_overview(summaries: &[PeriodSummary]) -> PeriodOverview {
    let values: Vec<f64> = summaries
        .iter()
        .map(|s| s.average_of_averages)
        .filter(|v| v.is_finite())
        .collect();

    if values.is_empty() {
        return PeriodOverview::default();
    }

    let mean = running_mean(&values);
    let above_mean = values.iter().filter(|v| **v >= mean).count();

    PeriodOverview {
        mean_of_periods: Some(mean),
        above_mean,
        below_mean: values.len() - above_mean,
    }
}

/// Scatter points in display order.
pub fn scatter_points(summaries: &[PeriodSummary]) -> Vec<ScatterPoint> {
    let mut sorted = summaries.to_vec();
    sort_for_display(&mut sorted);

    sorted
        .into_iter()
        .enumerate()
        .map(|(idx, s)| ScatterPoint {
            rank: idx + 1,
            size: s.restaurant_count.clamp(SCATTER_MIN_SIZE, SCATTER_MAX_SIZE),
            average: s.average_of_averages,
            restaurants: s.restaurant_count,
            period: s.period,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(period: &str, avg: f64, count: u32) -> PeriodSummary {
        PeriodSummary::new(period, avg, count)
    }

    #[test]
    fn test_summarize_periods() {
        let rows = vec![
            PriceObservation::new(1, "A", "Trnje", Some(6.0), 4),
            PriceObservation::new(2, "B", "Centar", Some(10.0), 4),
            PriceObservation::new(3, "C", "Trnje", Some(8.0), 4),
            PriceObservation::new(4, "D", "Trnje", None, 0),
            PriceObservation::new(5, "E", "Dubrava", Some(f64::NAN), 3),
        ];
        let summaries = summarize_periods(&rows);

        assert_eq!(
            summaries,
            vec![summary("Centar", 10.0, 1), summary("Trnje", 7.0, 2)]
        );
    }

    #[test]
    fn test_summarize_periods_huge_prices_stay_finite() {
        let rows = vec![
            PriceObservation::new(1, "A", "Centar", Some(1e308), 1),
            PriceObservation::new(2, "B", "Centar", Some(1e308), 1),
            PriceObservation::new(3, "C", "Trnje", Some(f64::MAX), 1),
            PriceObservation::new(4, "D", "Trnje", Some(f64::MAX / 2.0), 1),
        ];
        let summaries = summarize_periods(&rows);

        let centar = summaries.iter().find(|s| s.period == "Centar").unwrap();
        assert_eq!(centar.average_of_averages, 1e308);
        assert_eq!(centar.restaurant_count, 2);

        let trnje = summaries.iter().find(|s| s.period == "Trnje").unwrap();
        assert!(trnje.average_of_averages.is_finite());
        assert!(trnje.average_of_averages > f64::MAX / 2.0);

        let overview = period_overview(&summaries);
        assert!(overview.mean_of_periods.unwrap().is_finite());
        assert!(min_max_period(&summaries).is_some());
    }

    #[test]
    fn test_summarize_periods_empty() {
        assert!(summarize_periods(&[]).is_empty());
    }

    #[test]
    fn test_top_periods_reversed() {
        let summaries = vec![
            summary("A", 5.0, 1),
            summary("B", 9.0, 1),
            summary("C", 7.0, 1),
            summary("D", 3.0, 1),
        ];
        let top: Vec<String> = top_periods(&summaries, 3)
            .into_iter()
            .map(|s| s.period)
            .collect();
        assert_eq!(top, vec!["A", "C", "B"]);
    }

    #[test]
    fn test_min_max_period() {
        let summaries = vec![
            summary("Trnje", 7.5, 10),
            summary("Centar", 11.0, 20),
            summary("Dubrava", 5.25, 3),
        ];
        let mm = min_max_period(&summaries).unwrap();

        assert_eq!(mm.cheapest.period, "Dubrava");
        assert_eq!(mm.most_expensive.period, "Centar");
        assert_eq!(mm.diff, 5.75);
    }

    #[test]
    fn test_min_max_ties_use_period_name() {
        let summaries = vec![
            summary("Zaprudje", 4.0, 1),
            summary("Borongaj", 4.0, 1),
            summary("Sesvete", 9.0, 1),
            summary("Maksimir", 9.0, 1),
        ];
        let mm = min_max_period(&summaries).unwrap();

        assert_eq!(mm.cheapest.period, "Borongaj");
        assert_eq!(mm.most_expensive.period, "Maksimir");
    }

    #[test]
    fn test_min_max_empty() {
        assert!(min_max_period(&[]).is_none());
    }

    #[test]
    fn test_best_value_tie_keeps_input_order() {
        let summaries = vec![summary("A", 5.0, 10), summary("B", 2.0, 4)];
        let ranked = best_value_ranking(&summaries, 8);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].period, "A");
        assert_eq!(ranked[1].period, "B");
        assert_eq!(ranked[0].score, 2.0);
        assert_eq!(ranked[1].score, 2.0);
    }

    #[test]
    fn test_best_value_excludes_non_positive_averages() {
        let summaries = vec![
            summary("Zero", 0.0, 10),
            summary("Negative", -3.0, 10),
            summary("Nan", f64::NAN, 10),
            summary("Cheap", 4.0, 8),
            summary("Dear", 8.0, 8),
        ];
        let ranked = best_value_ranking(&summaries, 1);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].period, "Cheap");
        assert_eq!(ranked[0].score, 2.0);
    }

    #[test]
    fn test_period_overview() {
        let summaries = vec![summary("A", 4.0, 1), summary("B", 6.0, 1), summary("C", 8.0, 1)];
        let overview = period_overview(&summaries);

        assert_eq!(overview.mean_of_periods, Some(6.0));
        assert_eq!(overview.above_mean, 2);
        assert_eq!(overview.below_mean, 1);
        assert_eq!(period_overview(&[]), PeriodOverview::default());
    }

    #[test]
    fn test_scatter_points() {
        let summaries = vec![summary("A", 4.0, 0), summary("B", 6.0, 500)];
        let points = scatter_points(&summaries);

        assert_eq!(points[0].period, "B");
        assert_eq!(points[0].rank, 1);
        assert_eq!(points[0].size, 120);
        assert_eq!(points[1].rank, 2);
        assert_eq!(points[1].size, 1);
    }
}
