//! Нормализация данных

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis};

use crate::error::{RiskError, RiskResult};

/// Z-score нормализатор с сохраненными параметрами (аналог StandardScaler)
pub struct DataNormalizer {
    mean: Option<Array1<f64>>,
    std: Option<Array1<f64>>,
    is_fitted: bool,
}

impl DataNormalizer {
    pub fn new() -> Self {
        Self {
            mean: None,
            std: None,
            is_fitted: false,
        }
    }

    pub fn fit(&mut self, X: &Array2<f64>) -> RiskResult<()> {
        if X.nrows() == 0 {
            return Err(RiskError::EmptyDataset);
        }

        // Среднее и стандартное отклонение по каждому признаку
        self.mean = X.mean_axis(Axis(0));
        let mut std = X.std_axis(Axis(0), 0.0);

        // Избегаем деления на ноль
        for val in std.iter_mut() {
            if *val < 1e-10 {
                *val = 1.0;
            }
        }
        self.std = Some(std);

        self.is_fitted = true;
        Ok(())
    }

    pub fn transform(&self, X: &Array2<f64>) -> RiskResult<Array2<f64>> {
        let (Some(mean), Some(std)) = (self.mean.as_ref(), self.std.as_ref()) else {
            return Err(RiskError::InvalidParameter("Normalizer not fitted".to_string()));
        };
        if X.ncols() != mean.len() {
            return Err(RiskError::DimensionMismatch {
                expected: mean.len(),
                actual: X.ncols(),
            });
        }

        Ok((X - mean) / std)
    }

    pub fn fit_transform(&mut self, X: &Array2<f64>) -> RiskResult<Array2<f64>> {
        self.fit(X)?;
        self.transform(X)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

impl Default for DataNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Min-max нормализация в [0, 1]. Константный столбец превращается в нули.
pub fn min_max_normalize(X: &Array2<f64>) -> Array2<f64> {
    let mut normalized = X.clone();
    for mut column in normalized.axis_iter_mut(Axis(1)) {
        let min = column.iter().copied().fold(f64::INFINITY, f64::min);
        let max = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        column.mapv_inplace(|v| if range > 0.0 { (v - min) / range } else { 0.0 });
    }
    normalized
}

/// Z-score без сохранения параметров (дисперсия по генеральной совокупности)
pub fn standardize(X: &Array2<f64>) -> RiskResult<Array2<f64>> {
    DataNormalizer::new().fit_transform(X)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn min_max_bounds() {
        let X = array![[1.0, 10.0, 3.0], [3.0, 20.0, 3.0], [2.0, 15.0, 3.0]];
        let n = min_max_normalize(&X);
        assert_eq!(n.column(0).to_vec(), vec![0.0, 1.0, 0.5]);
        assert_eq!(n.column(1).to_vec(), vec![0.0, 1.0, 0.5]);
        assert_eq!(n.column(2).to_vec(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn standardize_zero_mean_unit_std() {
        let X = array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0], [4.0, 5.0]];
        let z = standardize(&X).unwrap();
        let mean = z.mean_axis(Axis(0)).unwrap();
        assert!(mean.iter().all(|m| m.abs() < 1e-12));
        assert!((z.column(0).std(0.0) - 1.0).abs() < 1e-12);
        // константный признак не делится на ноль
        assert!(z.column(1).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn transform_uses_fitted_parameters() {
        let mut normalizer = DataNormalizer::new();
        assert!(normalizer.transform(&array![[1.0]]).is_err());

        normalizer.fit(&array![[0.0], [2.0]]).unwrap();
        assert!(normalizer.is_fitted());
        let out = normalizer.transform(&array![[4.0]]).unwrap();
        assert!((out[[0, 0]] - 3.0).abs() < 1e-12);
        assert!(normalizer.transform(&array![[1.0, 2.0]]).is_err());
    }
}
