/// Модуль предобработки данных

pub mod feature_engineering;
pub mod feature_selection;
pub mod imputation;
pub mod metrics;
pub mod normalization;
pub mod outliers;
pub mod random;
pub mod split;

pub use feature_engineering::FeatureEngineer;
pub use feature_selection::{pearson_correlation, select_k_best};
pub use imputation::{impute_missing_values, ImputeStrategy};
pub use metrics::{calculate_metrics, ClassificationMetrics};
pub use normalization::{min_max_normalize, standardize, DataNormalizer};
pub use outliers::detect_outliers;
pub use random::SineRng;
pub use split::{k_fold_split, train_test_split, Split};
