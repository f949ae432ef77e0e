//! Отбор признаков по корреляции с целевой переменной (аналог SelectKBest)

use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::error::{RiskError, RiskResult};

/// Корреляция Пирсона. Для константного ряда возвращает 0.
pub fn pearson_correlation(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    let n = x.len().min(y.len()) as f64;
    if n == 0.0 {
        return 0.0;
    }

    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2, mut sum_y2) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        sum_x += xi;
        sum_y += yi;
        sum_xy += xi * yi;
        sum_x2 += xi * xi;
        sum_y2 += yi * yi;
    }

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();

    if denominator == 0.0 || !denominator.is_finite() {
        0.0
    } else {
        numerator / denominator
    }
}

/// Топ-k признаков по |r|; индексы в порядке рейтинга
pub fn select_k_best(
    features: &Array2<f64>,
    targets: &Array1<f64>,
    k: usize,
) -> RiskResult<(Array2<f64>, Vec<usize>)> {
    if features.nrows() != targets.len() {
        return Err(RiskError::DimensionMismatch {
            expected: features.nrows(),
            actual: targets.len(),
        });
    }

    let mut ranking: Vec<(usize, f64)> = features
        .axis_iter(Axis(1))
        .enumerate()
        .map(|(i, column)| (i, pearson_correlation(column, targets.view()).abs()))
        .collect();

    // Стабильная сортировка: при равенстве сохраняется исходный порядок
    ranking.sort_by(|a, b| b.1.total_cmp(&a.1));

    let selected: Vec<usize> = ranking.iter().take(k).map(|(i, _)| *i).collect();
    Ok((features.select(Axis(1), &selected), selected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn perfect_and_constant_correlation() {
        let x = array![1.0, 2.0, 3.0, 4.0];
        let y = array![2.0, 4.0, 6.0, 8.0];
        assert!((pearson_correlation(x.view(), y.view()) - 1.0).abs() < 1e-12);

        let neg = array![4.0, 3.0, 2.0, 1.0];
        assert!((pearson_correlation(neg.view(), y.view()) + 1.0).abs() < 1e-12);

        let constant = array![5.0, 5.0, 5.0, 5.0];
        assert_eq!(pearson_correlation(constant.view(), y.view()), 0.0);
    }

    #[test]
    fn selects_by_absolute_correlation() {
        let features = array![
            [1.0, 7.0, 4.0, 1.0],
            [2.0, 7.0, 3.0, 0.0],
            [3.0, 7.0, 2.0, 1.0],
            [4.0, 7.0, 1.0, 0.0],
        ];
        let targets = array![10.0, 20.0, 30.0, 41.0];
        let (selected, indices) = select_k_best(&features, &targets, 2).unwrap();

        assert_eq!(indices.len(), 2);
        assert!(indices.contains(&0) && indices.contains(&2));
        assert_eq!(selected.dim(), (4, 2));
        assert_eq!(selected.column(0), features.column(indices[0]));
    }

    #[test]
    fn k_larger_than_feature_count() {
        let features = array![[1.0, 2.0], [2.0, 1.0]];
        let targets = array![0.0, 1.0];
        let (selected, indices) = select_k_best(&features, &targets, 5).unwrap();
        assert_eq!(indices.len(), 2);
        assert_eq!(selected.ncols(), 2);
    }

    #[test]
    fn mismatched_targets() {
        let features = array![[1.0], [2.0]];
        let targets = array![1.0];
        assert!(select_k_best(&features, &targets, 1).is_err());
    }
}
