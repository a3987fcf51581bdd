//! Classification metrics at a decision threshold

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Metrics for one evaluation of the classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub auc_roc: f64,
    /// Decision threshold the binary metrics were computed at
    pub threshold: f64,
    pub n_samples: usize,
    /// Training time in seconds (filled in by the training engine)
    pub training_time_secs: f64,
}

impl ModelMetrics {
    /// Compute all metrics from true labels and predicted probabilities.
    ///
    /// The binary prediction is `probability >= threshold`; AUC is computed
    /// from the probabilities directly and does not depend on the threshold.
    pub fn compute(y_true: &Array1<f64>, y_prob: &Array1<f64>, threshold: f64) -> Self {
        let n = y_true.len();
        let y_pred: Vec<f64> = y_prob
            .iter()
            .map(|&p| if p >= threshold { 1.0 } else { 0.0 })
            .collect();

        let (tp, fp, tn, fn_) = confusion_counts(y_true, &y_pred);

        let accuracy = if n > 0 {
            (tp + tn) as f64 / n as f64
        } else {
            0.0
        };
        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            0.0
        };
        let recall = if tp + fn_ > 0 {
            tp as f64 / (tp + fn_) as f64
        } else {
            0.0
        };
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            accuracy,
            precision,
            recall,
            f1_score,
            auc_roc: roc_auc(y_true, y_prob),
            threshold,
            n_samples: n,
            training_time_secs: 0.0,
        }
    }

    /// Number of positive predictions at a threshold. Monotonically
    /// non-increasing in the threshold.
    pub fn positive_count(y_prob: &Array1<f64>, threshold: f64) -> usize {
        y_prob.iter().filter(|&&p| p >= threshold).count()
    }
}

fn confusion_counts(y_true: &Array1<f64>, y_pred: &[f64]) -> (usize, usize, usize, usize) {
    let mut tp = 0;
    let mut fp = 0;
    let mut tn = 0;
    let mut fn_ = 0;

    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        let t_bool = *t > 0.5;
        let p_bool = *p > 0.5;

        match (t_bool, p_bool) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (false, false) => tn += 1,
            (true, false) => fn_ += 1,
        }
    }

    (tp, fp, tn, fn_)
}

/// Rank-based ROC-AUC (Mann-Whitney U with averaged tie ranks).
/// A test partition with a single class has no ranking to measure; reports 0.5.
fn roc_auc(y_true: &Array1<f64>, y_prob: &Array1<f64>) -> f64 {
    let n = y_true.len();
    let n_pos = y_true.iter().filter(|&&t| t > 0.5).count();
    let n_neg = n - n_pos;

    if n_pos == 0 || n_neg == 0 {
        return 0.5;
    }

    // Sort sample indices by probability, then assign average ranks to ties
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        y_prob[a]
            .partial_cmp(&y_prob[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0f64; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && y_prob[order[j + 1]] == y_prob[order[i]] {
            j += 1;
        }
        // Ranks are 1-based; ties share the average rank of their span
        let avg_rank = (i + j + 2) as f64 / 2.0;
        for k in i..=j {
            ranks[order[k]] = avg_rank;
        }
        i = j + 1;
    }

    let pos_rank_sum: f64 = y_true
        .iter()
        .zip(ranks.iter())
        .filter(|(&t, _)| t > 0.5)
        .map(|(_, &r)| r)
        .sum();

    (pos_rank_sum - (n_pos * (n_pos + 1)) as f64 / 2.0) / (n_pos * n_neg) as f64
}
