//! Поиск выбросов по правилу IQR

use ndarray::{Array2, Axis};

/// Строка считается выбросом, если хотя бы один признак вне [Q1 - 1.5·IQR, Q3 + 1.5·IQR].
///
/// `contamination` пока только логируется и на порог не влияет.
pub fn detect_outliers(data: &Array2<f64>, contamination: f64) -> Vec<bool> {
    let mut outliers = vec![false; data.nrows()];
    if data.nrows() == 0 {
        return outliers;
    }

    for (feature, column) in data.axis_iter(Axis(1)).enumerate() {
        let mut values = column.to_vec();
        values.sort_by(|a, b| a.total_cmp(b));
        let n = values.len() as f64;
        let q1 = values[(n * 0.25).floor() as usize];
        let q3 = values[(n * 0.75).floor() as usize];
        let iqr = q3 - q1;
        let lower = q1 - 1.5 * iqr;
        let upper = q3 + 1.5 * iqr;

        for (flag, &value) in outliers.iter_mut().zip(column.iter()) {
            if value < lower || value > upper {
                *flag = true;
            }
        }
        tracing::trace!(feature, q1, q3, "IQR bounds [{}, {}]", lower, upper);
    }

    tracing::debug!(
        "Outlier scan: {} of {} rows flagged (contamination hint {})",
        outliers.iter().filter(|&&o| o).count(),
        data.nrows(),
        contamination
    );
    outliers
}
