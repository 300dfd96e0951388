//! Trade-space analysis: weighted scores and the SUE / coordination-cost Pareto front.

use std::cmp::Ordering;

use crate::metrics::ExperimentResult;

/// Weights for the combined trade score.
///
/// SUE counts positively; cost, blocking and interference are inverted so
/// lower raw values score higher.
#[derive(Debug, Clone, Copy)]
pub struct TradeWeights {
    pub sue_weight: f64,
    pub coordination_cost_weight: f64,
    pub blocking_weight: f64,
    pub interference_weight: f64,
}

impl Default for TradeWeights {
    fn default() -> Self {
        Self {
            sue_weight: 0.4,
            coordination_cost_weight: 0.3,
            blocking_weight: 0.2,
            interference_weight: 0.1,
        }
    }
}

/// Min-max normalization into [0, 1]. If min == max, returns 0.5.
fn normalize_metric(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        0.5
    } else {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    }
}

fn range(results: &[ExperimentResult], metric: impl Fn(&ExperimentResult) -> f64) -> (f64, f64) {
    results
        .iter()
        .map(metric)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
            (min.min(v), max.max(v))
        })
}

/// Scores normalized across `results`, in input order.
pub fn calculate_trade_scores(results: &[ExperimentResult], weights: &TradeWeights) -> Vec<f64> {
    if results.is_empty() {
        return vec![];
    }

    let (sue_min, sue_max) = range(results, |r| r.sue);
    let (cost_min, cost_max) = range(results, |r| r.coordination_cost);
    let (block_min, block_max) = range(results, |r| r.blocking_probability);
    let (intf_min, intf_max) = range(results, |r| r.interference_rate);

    results
        .iter()
        .map(|r| {
            let sue = normalize_metric(r.sue, sue_min, sue_max);
            let cost = 1.0 - normalize_metric(r.coordination_cost, cost_min, cost_max);
            let blocking = 1.0 - normalize_metric(r.blocking_probability, block_min, block_max);
            let interference = 1.0 - normalize_metric(r.interference_rate, intf_min, intf_max);

            sue * weights.sue_weight
                + cost * weights.coordination_cost_weight
                + blocking * weights.blocking_weight
                + interference * weights.interference_weight
        })
        .collect()
}

/// Index of the highest-scoring result; ties keep the earliest.
pub fn find_best_result_index(results: &[ExperimentResult], weights: &TradeWeights) -> Option<usize> {
    calculate_trade_scores(results, weights)
        .into_iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, score)| match best {
            Some((_, top)) if score.partial_cmp(&top) != Some(Ordering::Greater) => best,
            _ => Some((i, score)),
        })
        .map(|(i, _)| i)
}

fn dominates(a: &ExperimentResult, b: &ExperimentResult) -> bool {
    a.sue >= b.sue
        && a.coordination_cost <= b.coordination_cost
        && (a.sue > b.sue || a.coordination_cost < b.coordination_cost)
}

/// Indices of the non-dominated results (maximize SUE, minimize coordination
/// cost), sorted by ascending coordination cost.
pub fn pareto_front(results: &[ExperimentResult]) -> Vec<usize> {
    let mut front: Vec<usize> = (0..results.len())
        .filter(|&i| {
            !results
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && dominates(other, &results[i]))
        })
        .collect();
    front.sort_by(|&a, &b| {
        results[a]
            .coordination_cost
            .partial_cmp(&results[b].coordination_cost)
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    front
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures::result;

    #[test]
    fn test_normalize_metric() {
        assert_eq!(normalize_metric(5.0, 5.0, 5.0), 0.5);
        assert_eq!(normalize_metric(0.0, 0.0, 10.0), 0.0);
        assert_eq!(normalize_metric(10.0, 0.0, 10.0), 1.0);
        assert_eq!(normalize_metric(5.0, 0.0, 10.0), 0.5);
    }

    #[test]
    fn test_trade_scores() {
        let results = vec![result("cheap", 0.1, 1.0), result("efficient", 0.5, 10.0)];
        let scores = calculate_trade_scores(&results, &TradeWeights::default());
        assert_eq!(scores.len(), 2);
        // Equal blocking and interference contribute 0.5 each.
        assert!((scores[0] - (0.3 + 0.1 + 0.05)).abs() < 1e-12);
        assert!((scores[1] - (0.4 + 0.1 + 0.05)).abs() < 1e-12);
        assert_eq!(find_best_result_index(&results, &TradeWeights::default()), Some(1));
    }

    #[test]
    fn test_best_index_of_empty_is_none() {
        assert_eq!(find_best_result_index(&[], &TradeWeights::default()), None);
    }

    #[test]
    fn test_pareto_front_drops_dominated() {
        let results = vec![
            result("a", 0.2, 5.0),
            result("b", 0.1, 6.0),
            result("c", 0.4, 9.0),
            result("d", 0.05, 1.0),
            result("e", 0.4, 9.0),
        ];
        // b is dominated by a; c and e tie and both stay.
        assert_eq!(pareto_front(&results), vec![3, 0, 2, 4]);
    }
}
