//! Разбиение данных: train/test и k-fold

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{RiskError, RiskResult};
use crate::preprocessing::random::SineRng;

#[derive(Debug, Clone, PartialEq)]
pub struct Split<T> {
    pub train: Vec<T>,
    pub test: Vec<T>,
}

/// Случайное разбиение: `round(n * (1 - test_size))` строк в train, остальные в test.
///
/// С `random_state` перемешивание идет от локального `SineRng`, переданный `rng` не используется.
pub fn train_test_split<T: Clone, R: Rng + ?Sized>(
    data: &[T],
    test_size: f64,
    random_state: Option<i64>,
    rng: &mut R,
) -> RiskResult<Split<T>> {
    if !(0.0..=1.0).contains(&test_size) {
        return Err(RiskError::InvalidParameter(format!(
            "test_size must be within [0, 1], got {}",
            test_size
        )));
    }

    let mut shuffled = data.to_vec();
    match random_state {
        Some(seed) => shuffled.shuffle(&mut SineRng::new(seed)),
        None => shuffled.shuffle(rng),
    }

    let split_idx = ((data.len() as f64 * (1.0 - test_size)).round() as usize).min(data.len());
    let test = shuffled.split_off(split_idx);

    Ok(Split {
        train: shuffled,
        test,
    })
}

/// Последовательные фолды без перемешивания; последний забирает остаток
pub fn k_fold_split<T: Clone>(data: &[T], folds: usize) -> RiskResult<Vec<Split<T>>> {
    if folds == 0 {
        return Err(RiskError::InvalidParameter(
            "folds must be positive".to_string(),
        ));
    }

    let fold_size = data.len() / folds;
    let splits = (0..folds)
        .map(|i| {
            let test_start = i * fold_size;
            let test_end = if i == folds - 1 {
                data.len()
            } else {
                (i + 1) * fold_size
            };

            let mut train = data[..test_start].to_vec();
            train.extend_from_slice(&data[test_end..]);

            Split {
                train,
                test: data[test_start..test_end].to_vec(),
            }
        })
        .collect();

    Ok(splits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn train_test_sizes() {
        let data: Vec<usize> = (0..10).collect();
        let mut rng = rand::thread_rng();
        let split = train_test_split(&data, 0.2, None, &mut rng).unwrap();
        assert_eq!(split.train.len(), 8);
        assert_eq!(split.test.len(), 2);

        let mut all = split.train.clone();
        all.extend(split.test);
        all.sort_unstable();
        assert_eq!(all, data);
    }

    #[test]
    fn rounding_of_train_size() {
        let data: Vec<usize> = (0..7).collect();
        let split = train_test_split(&data, 0.25, Some(1), &mut rand::thread_rng()).unwrap();
        // round(7 * 0.75) = round(5.25) = 5
        assert_eq!(split.train.len(), 5);
        assert_eq!(split.test.len(), 2);
    }

    #[test]
    fn seeded_split_is_reproducible() {
        let data: Vec<usize> = (0..100).collect();
        let mut rng = rand::thread_rng();
        let a = train_test_split(&data, 0.3, Some(42), &mut rng).unwrap();
        let b = train_test_split(&data, 0.3, Some(42), &mut rng).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.train, data[..70].to_vec());
    }

    #[test]
    fn rejects_bad_test_size() {
        let data = vec![1, 2, 3];
        assert!(train_test_split(&data, 1.5, None, &mut rand::thread_rng()).is_err());
    }

    #[test]
    fn k_fold_covers_every_row_once() {
        let data: Vec<usize> = (0..23).collect();
        let splits = k_fold_split(&data, 5).unwrap();
        assert_eq!(splits.len(), 5);

        let mut seen: Vec<usize> = splits.iter().flat_map(|s| s.test.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, data);

        for split in &splits {
            assert_eq!(split.train.len() + split.test.len(), data.len());
            assert!(split.test.iter().all(|x| !split.train.contains(x)));
        }
        // последний фолд забирает остаток: 4 + 3
        assert_eq!(splits[4].test.len(), 7);
        assert_eq!(splits[1].test, vec![4, 5, 6, 7]);
    }

    #[test]
    fn k_fold_rejects_zero_folds() {
        assert!(k_fold_split(&[1, 2, 3], 0).is_err());
    }
}
