//! Feature engineering для ML моделей

use ndarray::{Array1, Array2};

use crate::types::{HeartDiseaseRecord, PatientFeatures, PatientRecord, SmokingStatus, FEATURE_COUNT};

pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Признаки модели риска и метки по правилу факторов риска
    pub fn extract_risk_features(records: &[PatientRecord]) -> (Array2<f64>, Array1<f64>) {
        let mut features = Array2::zeros((records.len(), FEATURE_COUNT));
        let mut targets = Array1::zeros(records.len());

        for (i, record) in records.iter().enumerate() {
            features
                .row_mut(i)
                .assign(&PatientFeatures::from(record).to_vector());
            targets[i] = Self::risk_label(record);
        }

        (features, targets)
    }

    /// 1.0, если сумма факторов риска больше 0.6
    pub fn risk_label(record: &PatientRecord) -> f64 {
        let factors = [
            (record.age > 60.0, 0.3),
            (record.systolic > 140.0, 0.25),
            (record.diastolic > 90.0, 0.2),
            (record.heart_rate > 100.0, 0.15),
            (record.cholesterol > 240.0, 0.2),
            (record.blood_sugar > 140.0, 0.25),
            (record.bmi > 30.0, 0.2),
            (record.smoking == SmokingStatus::Current, 0.3),
        ];
        let score: f64 = factors
            .iter()
            .filter(|(present, _)| *present)
            .map(|(_, weight)| weight)
            .sum();

        if score > 0.6 {
            1.0
        } else {
            0.0
        }
    }

    /// 8 признаков записи Heart Disease и цель `target`
    pub fn extract_heart_disease_features(
        records: &[HeartDiseaseRecord],
    ) -> (Array2<f64>, Array1<f64>) {
        let mut features = Array2::zeros((records.len(), FEATURE_COUNT));
        let mut targets = Array1::zeros(records.len());

        for (i, r) in records.iter().enumerate() {
            let row = [
                r.age as f64 / 100.0,
                r.sex.encode(),
                r.cp as f64 / 3.0,
                r.trestbps as f64 / 200.0,
                r.chol as f64 / 600.0,
                r.fbs as f64,
                r.restecg as f64 / 2.0,
                r.thalach as f64 / 220.0,
            ];
            for (j, value) in row.into_iter().enumerate() {
                features[[i, j]] = value;
            }
            targets[i] = r.target as f64;
        }

        (features, targets)
    }

    /// 11 числовых полей Heart Disease без масштабирования (под min-max)
    pub fn heart_disease_matrix(records: &[HeartDiseaseRecord]) -> Array2<f64> {
        let mut matrix = Array2::zeros((records.len(), 11));
        for (i, r) in records.iter().enumerate() {
            let row = [
                r.age as f64,
                r.trestbps as f64,
                r.chol as f64,
                r.fbs as f64,
                r.restecg as f64,
                r.thalach as f64,
                r.exang as f64,
                r.oldpeak,
                r.slope as f64,
                r.ca as f64,
                r.thal as f64,
            ];
            for (j, value) in row.into_iter().enumerate() {
                matrix[[i, j]] = value;
            }
        }
        matrix
    }

    /// Полиномиальные признаки.
    ///
    /// Исходные столбцы, затем квадраты, затем попарные произведения (i < j).
    /// Для degree > 2 далее идут мономы степеней 3..=degree в лексикографическом порядке.
    pub fn polynomial_features(data: &Array2<f64>, degree: usize) -> Array2<f64> {
        let n = data.ncols();
        let mut terms: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();

        if degree >= 2 {
            terms.extend((0..n).map(|i| vec![i, i]));
            for i in 0..n {
                for j in (i + 1)..n {
                    terms.push(vec![i, j]);
                }
            }
            for d in 3..=degree {
                terms.extend(combinations_with_replacement(n, d));
            }
        }

        Array2::from_shape_fn((data.nrows(), terms.len()), |(row, t)| {
            terms[t].iter().map(|&col| data[[row, col]]).product()
        })
    }
}

fn combinations_with_replacement(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut result = Vec::new();
    if n == 0 {
        return result;
    }
    let mut current = vec![0; k];
    loop {
        result.push(current.clone());
        // Последняя позиция, которую можно увеличить
        let Some(pos) = (0..k).rev().find(|&p| current[p] < n - 1) else {
            return result;
        };
        let next = current[pos] + 1;
        for value in current.iter_mut().skip(pos) {
            *value = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sex;
    use ndarray::array;

    fn patient(age: f64, systolic: f64, smoking: SmokingStatus) -> PatientRecord {
        PatientRecord {
            age,
            sex: Sex::Female,
            systolic,
            diastolic: 80.0,
            heart_rate: 70.0,
            cholesterol: 180.0,
            blood_sugar: 90.0,
            bmi: 22.0,
            smoking,
        }
    }

    #[test]
    fn risk_label_rule() {
        assert_eq!(FeatureEngineer::risk_label(&patient(30.0, 120.0, SmokingStatus::Never)), 0.0);
        // 0.3 + 0.25 = 0.55, не больше 0.6
        assert_eq!(FeatureEngineer::risk_label(&patient(70.0, 150.0, SmokingStatus::Never)), 0.0);
        assert_eq!(FeatureEngineer::risk_label(&patient(70.0, 150.0, SmokingStatus::Current)), 1.0);
        assert_eq!(FeatureEngineer::risk_label(&patient(70.0, 150.0, SmokingStatus::Former)), 0.0);
    }

    #[test]
    fn risk_features_use_inference_scaling() {
        let (features, targets) =
            FeatureEngineer::extract_risk_features(&[patient(50.0, 100.0, SmokingStatus::Current)]);
        assert_eq!(features.dim(), (1, FEATURE_COUNT));
        assert_eq!(features[[0, 0]], 0.5);
        assert_eq!(features[[0, 1]], 0.5);
        assert_eq!(features[[0, 7]], 1.0);
        assert_eq!(targets[0], 0.0);
    }

    #[test]
    fn polynomial_degree_two_layout() {
        let data = array![[2.0, 3.0, 5.0]];
        let poly = FeatureEngineer::polynomial_features(&data, 2);
        assert_eq!(
            poly.row(0).to_vec(),
            vec![2.0, 3.0, 5.0, 4.0, 9.0, 25.0, 6.0, 10.0, 15.0]
        );
    }

    #[test]
    fn polynomial_degree_one_is_identity() {
        let data = array![[2.0, 3.0], [1.0, 4.0]];
        assert_eq!(FeatureEngineer::polynomial_features(&data, 1), data);
    }

    #[test]
    fn polynomial_degree_three_appends_cubic_terms() {
        let data = array![[2.0, 3.0]];
        let poly = FeatureEngineer::polynomial_features(&data, 3);
        // 2 + 2 + 1 + 4 (x0^3, x0^2x1, x0x1^2, x1^3)
        assert_eq!(
            poly.row(0).to_vec(),
            vec![2.0, 3.0, 4.0, 9.0, 6.0, 8.0, 12.0, 18.0, 27.0]
        );
    }
}
