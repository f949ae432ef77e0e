//! Метрики бинарной классификации

use serde::{Deserialize, Serialize};

use crate::error::{RiskError, RiskResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    /// [[tn, fp], [fn, tp]]
    pub confusion_matrix: [[usize; 2]; 2],
}

pub fn calculate_metrics(y_true: &[u8], y_pred: &[u8]) -> RiskResult<ClassificationMetrics> {
    if y_true.len() != y_pred.len() {
        return Err(RiskError::DimensionMismatch {
            expected: y_true.len(),
            actual: y_pred.len(),
        });
    }

    let (mut tp, mut fp, mut tn, mut fn_) = (0, 0, 0, 0);
    for (&actual, &predicted) in y_true.iter().zip(y_pred) {
        match (actual, predicted) {
            (1, 1) => tp += 1,
            (0, 1) => fp += 1,
            (0, 0) => tn += 1,
            (1, 0) => fn_ += 1,
            _ => {
                return Err(RiskError::InvalidParameter(format!(
                    "labels must be 0 or 1, got ({}, {})",
                    actual, predicted
                )))
            }
        }
    }

    let total = tp + fp + tn + fn_;
    let accuracy = ratio(tp + tn, total);
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1_score = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    Ok(ClassificationMetrics {
        tp,
        fp,
        tn,
        fn_,
        accuracy,
        precision,
        recall,
        f1_score,
        confusion_matrix: [[tn, fp], [fn_, tp]],
    })
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
