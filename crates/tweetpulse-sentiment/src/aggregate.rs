//! Turns per-post verdicts into label counts and percentages.
//!
//! Percentages always divide by the number of *classified* posts, i.e.
//! `count_total - count_unclassified`. Without a confidence threshold nothing
//! is unclassified, so the denominator is simply `count_total`. Values are
//! rounded half away from zero to two decimal places and always carry two
//! decimals (`50.00`, not `50`).

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{ClassificationResult, LabelSet, SentimentLabel, SentimentSummary};

/// Default cutoff for threshold backends.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.60;

/// Counts `results` per label and derives percentages.
///
/// With `confidence_threshold` set, a result whose confidence is at or below
/// the threshold is counted as unclassified and excluded from every label.
/// Every label of `label_set` appears in the output, zero-filled.
#[must_use]
pub fn aggregate(
    results: &[ClassificationResult],
    label_set: LabelSet,
    confidence_threshold: Option<f64>,
) -> SentimentSummary {
    let mut counts: BTreeMap<SentimentLabel, usize> =
        label_set.labels().iter().map(|&label| (label, 0)).collect();
    let mut count_unclassified = 0;

    for result in results {
        match confidence_threshold {
            Some(threshold) if result.confidence <= threshold => count_unclassified += 1,
            _ => *counts.entry(result.label).or_insert(0) += 1,
        }
    }

    let count_total = results.len();
    let classified = count_total - count_unclassified;
    let percentages = counts
        .iter()
        .map(|(&label, &count)| (label, percentage(count, classified)))
        .collect();

    tracing::debug!(
        total = count_total,
        unclassified = count_unclassified,
        threshold = ?confidence_threshold,
        "aggregated classification results"
    );

    SentimentSummary {
        percentages,
        counts,
        count_unclassified,
        count_total,
        confidence_threshold,
    }
}

/// `100 * count / denominator`, two decimals, half away from zero.
/// A zero denominator yields `0.00`.
fn percentage(count: usize, denominator: usize) -> Decimal {
    if denominator == 0 {
        return Decimal::new(0, 2);
    }
    let mut value = (Decimal::from(count) * Decimal::ONE_HUNDRED / Decimal::from(denominator))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    value.rescale(2);
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use SentimentLabel::{Mixed, Negative, Neutral, Positive};

    fn results(pairs: &[(SentimentLabel, f64)]) -> Vec<ClassificationResult> {
        pairs
            .iter()
            .map(|&(label, confidence)| ClassificationResult::new(label, confidence))
            .collect()
    }

    fn assert_counts_balance(summary: &SentimentSummary) {
        let labelled: usize = summary.counts.values().sum();
        assert_eq!(labelled + summary.count_unclassified, summary.count_total);
    }

    #[test]
    fn threshold_excludes_low_confidence_results() {
        let input = results(&[(Positive, 0.9), (Negative, 0.55), (Positive, 0.7)]);
        let summary = aggregate(&input, LabelSet::TwoClass, Some(DEFAULT_CONFIDENCE_THRESHOLD));

        assert_eq!(summary.count_unclassified, 1);
        assert_eq!(summary.count(Positive), 2);
        assert_eq!(summary.count(Negative), 0);
        assert_eq!(summary.count_total, 3);
        assert_eq!(summary.percentage(Positive).to_string(), "100.00");
        assert_eq!(summary.percentage(Negative).to_string(), "0.00");
        assert_counts_balance(&summary);
    }

    #[test]
    fn confidence_equal_to_threshold_is_unclassified() {
        let input = results(&[(Positive, 0.60), (Negative, 0.61)]);
        let summary = aggregate(&input, LabelSet::TwoClass, Some(0.60));
        assert_eq!(summary.count_unclassified, 1);
        assert_eq!(summary.count(Negative), 1);
        assert_eq!(summary.count(Positive), 0);
    }

    #[test]
    fn four_class_results_without_threshold() {
        let input = results(&[(Positive, 1.0), (Positive, 1.0), (Neutral, 1.0), (Mixed, 1.0)]);
        let summary = aggregate(&input, LabelSet::FourClass, None);

        assert_eq!(summary.percentage(Positive).to_string(), "50.00");
        assert_eq!(summary.percentage(Neutral).to_string(), "25.00");
        assert_eq!(summary.percentage(Mixed).to_string(), "25.00");
        assert_eq!(summary.percentage(Negative).to_string(), "0.00");
        assert_eq!(summary.count_unclassified, 0);
        assert_counts_balance(&summary);
    }

    #[test]
    fn no_threshold_counts_low_confidence_results() {
        let input = results(&[(Negative, 0.1), (Negative, 0.2)]);
        let summary = aggregate(&input, LabelSet::FourClass, None);
        assert_eq!(summary.count(Negative), 2);
        assert_eq!(summary.count_unclassified, 0);
    }

    #[test]
    fn every_label_of_the_set_is_reported() {
        let summary = aggregate(&[], LabelSet::ThreeClass, Some(0.6));
        let labels: Vec<SentimentLabel> = summary.percentages.keys().copied().collect();
        assert_eq!(labels, vec![Positive, Neutral, Negative]);
        assert_eq!(summary.count_total, 0);
    }

    #[test]
    fn all_unclassified_yields_zero_percentages() {
        let input = results(&[(Positive, 0.5), (Negative, 0.3)]);
        let summary = aggregate(&input, LabelSet::TwoClass, Some(0.6));
        assert_eq!(summary.count_unclassified, 2);
        assert!(summary.percentages.values().all(Decimal::is_zero));
        assert_counts_balance(&summary);
    }

    #[test]
    fn percentages_sum_to_one_hundred_within_rounding() {
        let input = results(&[(Positive, 1.0), (Neutral, 1.0), (Negative, 1.0)]);
        let summary = aggregate(&input, LabelSet::FourClass, None);
        let sum: Decimal = summary.percentages.values().sum();
        let epsilon = Decimal::new(1, 2) * Decimal::from(summary.percentages.len());
        assert!((sum - Decimal::ONE_HUNDRED).abs() <= epsilon, "sum was {sum}");
        assert_eq!(summary.percentage(Positive).to_string(), "33.33");
    }

    #[test]
    fn midpoint_rounds_away_from_zero() {
        // 1 of 32 is exactly 3.125%.
        let mut pairs = vec![(Positive, 1.0)];
        pairs.extend(std::iter::repeat_n((Negative, 1.0), 31));
        let summary = aggregate(&results(&pairs), LabelSet::TwoClass, None);
        assert_eq!(summary.percentage(Positive).to_string(), "3.13");
        assert_eq!(summary.percentage(Negative).to_string(), "96.88");
    }

    #[test]
    fn threshold_percentages_use_classified_denominator() {
        let input = results(&[
            (Positive, 0.9),
            (Negative, 0.8),
            (Neutral, 0.2),
            (Neutral, 0.3),
        ]);
        let summary = aggregate(&input, LabelSet::ThreeClass, Some(0.6));
        assert_eq!(summary.classified_count(), 2);
        assert_eq!(summary.percentage(Positive).to_string(), "50.00");
        assert_eq!(summary.percentage(Negative).to_string(), "50.00");
        assert_eq!(summary.percentage(Neutral).to_string(), "0.00");
    }

    #[test]
    fn result_order_does_not_change_the_summary() {
        let forward = results(&[(Positive, 0.9), (Negative, 0.4), (Neutral, 0.8), (Positive, 0.7)]);
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(
            aggregate(&forward, LabelSet::ThreeClass, Some(0.6)),
            aggregate(&reversed, LabelSet::ThreeClass, Some(0.6))
        );
    }
}
