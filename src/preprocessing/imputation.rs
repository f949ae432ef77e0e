//! Заполнение пропущенных значений (аналог SimpleImputer)

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    Mean,
    Median,
    MostFrequent,
}

/// Значение заполнения для каждого столбца. Столбец без значений дает NaN.
pub fn impute_values(data: &Array2<Option<f64>>, strategy: ImputeStrategy) -> Array1<f64> {
    data.axis_iter(Axis(1))
        .map(|column| {
            let values: Vec<f64> = column.iter().filter_map(|v| *v).collect();
            match strategy {
                ImputeStrategy::Mean => mean(&values),
                ImputeStrategy::Median => median(values),
                ImputeStrategy::MostFrequent => most_frequent(&values),
            }
        })
        .collect()
}

pub fn impute_missing_values(data: &Array2<Option<f64>>, strategy: ImputeStrategy) -> Array2<f64> {
    let fill = impute_values(data, strategy);
    Array2::from_shape_fn(data.dim(), |(i, j)| data[[i, j]].unwrap_or(fill[j]))
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

/// При равенстве частот побеждает значение, встреченное первым
fn most_frequent(values: &[f64]) -> f64 {
    let mut counts: Vec<(f64, usize)> = Vec::new();
    for &value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(f64, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map_or(f64::NAN, |(value, _)| value)
}
