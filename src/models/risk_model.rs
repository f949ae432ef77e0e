//! Модель риска прогрессирования заболевания

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::TrainingConfig;
use crate::datasets::generate;
use crate::error::{RiskError, RiskResult};
use crate::models::network::{Activation, AdamConfig, FeedForwardNetwork};
use crate::preprocessing::{calculate_metrics, train_test_split, ClassificationMetrics, FeatureEngineer};
use crate::types::{Dataset, PatientRecord, FEATURE_COUNT};

const HIDDEN_UNITS: [usize; 3] = [64, 32, 16];
const DROPOUT_RATE: f64 = 0.2;

#[derive(Debug, Clone, Serialize)]
pub struct EpochStats {
    pub epoch: usize,
    pub loss: f64,
    pub val_loss: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub train_samples: usize,
    pub validation_samples: usize,
    pub test_samples: usize,
    pub epochs: Vec<EpochStats>,
    pub test_metrics: Option<ClassificationMetrics>,
}

impl TrainingReport {
    pub fn final_loss(&self) -> Option<f64> {
        self.epochs.last().map(|e| e.loss)
    }
}

/// 8 → Dense(64, ReLU) → Dropout → Dense(32, ReLU) → Dropout → Dense(16, ReLU) → Dense(1, Sigmoid)
pub struct RiskModel {
    network: FeedForwardNetwork,
    is_trained: bool,
}

impl RiskModel {
    pub fn new<R: Rng + ?Sized>(learning_rate: f64, rng: &mut R) -> Self {
        let network = FeedForwardNetwork::new(FEATURE_COUNT, AdamConfig::new(learning_rate))
            .dense(HIDDEN_UNITS[0], Activation::Relu, rng)
            .dropout(DROPOUT_RATE)
            .dense(HIDDEN_UNITS[1], Activation::Relu, rng)
            .dropout(DROPOUT_RATE)
            .dense(HIDDEN_UNITS[2], Activation::Relu, rng)
            .dense(1, Activation::Sigmoid, rng);

        Self {
            network,
            is_trained: false,
        }
    }

    /// Обучение с фиксированным числом эпох.
    ///
    /// Хвост `validation_split` отводится под валидацию: её loss логируется, но на
    /// остановку обучения не влияет.
    pub fn fit<R: Rng + ?Sized>(
        &mut self,
        dataset: &Dataset,
        config: &TrainingConfig,
        rng: &mut R,
    ) -> RiskResult<Vec<EpochStats>> {
        if dataset.n_features() != FEATURE_COUNT {
            return Err(RiskError::DimensionMismatch {
                expected: FEATURE_COUNT,
                actual: dataset.n_features(),
            });
        }
        if config.batch_size == 0 {
            return Err(RiskError::InvalidParameter(
                "batch_size must be positive".to_string(),
            ));
        }

        let (fit, validation) = dataset.split_tail(config.validation_split);
        if fit.is_empty() {
            return Err(RiskError::EmptyDataset);
        }

        let mut history = Vec::with_capacity(config.epochs);
        let mut order: Vec<usize> = (0..fit.len()).collect();

        for epoch in 1..=config.epochs {
            order.shuffle(rng);
            let mut loss_sum = 0.0;

            for batch in order.chunks(config.batch_size) {
                let x = fit.features.select(Axis(0), batch);
                let y = fit.labels.select(Axis(0), batch);
                loss_sum += self.network.train_batch(&x, &y, rng)? * batch.len() as f64;
            }

            let loss = loss_sum / fit.len() as f64;
            if !loss.is_finite() {
                return Err(RiskError::TrainingFailure(format!(
                    "loss diverged at epoch {}",
                    epoch
                )));
            }

            let val_loss = (!validation.is_empty())
                .then(|| self.network.loss(&validation.features, &validation.labels));
            tracing::debug!(epoch, loss, ?val_loss, "Risk model epoch finished");

            history.push(EpochStats {
                epoch,
                loss,
                val_loss,
            });
        }

        self.is_trained = true;
        Ok(history)
    }

    /// Один прямой проход, вероятность в [0, 1]
    pub fn predict(&self, features: &Array1<f64>) -> RiskResult<f64> {
        let batch = features.view().insert_axis(Axis(0)).to_owned();
        Ok(self.predict_batch(&batch)?[0])
    }

    pub fn predict_batch(&self, features: &Array2<f64>) -> RiskResult<Array1<f64>> {
        if !self.is_trained {
            return Err(RiskError::NotTrained);
        }
        if features.ncols() != FEATURE_COUNT {
            return Err(RiskError::DimensionMismatch {
                expected: FEATURE_COUNT,
                actual: features.ncols(),
            });
        }
        Ok(self.network.predict_proba(features))
    }

    /// Метрики при пороге 0.5
    pub fn evaluate(&self, dataset: &Dataset) -> RiskResult<ClassificationMetrics> {
        let probs = self.predict_batch(&dataset.features)?;
        let y_pred: Vec<u8> = probs.iter().map(|&p| u8::from(p >= 0.5)).collect();
        let y_true: Vec<u8> = dataset.labels.iter().map(|&y| u8::from(y >= 0.5)).collect();
        calculate_metrics(&y_true, &y_pred)
    }

    pub fn is_trained(&self) -> bool {
        self.is_trained
    }
}

/// Полный цикл обучения на синтетических пациентах: генерация, признаки,
/// детерминированный split 80/20, обучение и оценка на отложенной части.
pub fn train_risk_model(config: &TrainingConfig) -> RiskResult<(RiskModel, TrainingReport)> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    let records: Vec<PatientRecord> = generate(config.samples, &mut rng);
    let (features, labels) = FeatureEngineer::extract_risk_features(&records);
    let dataset = Dataset::new(features, labels)?;

    train_on_dataset(&dataset, config, &mut rng)
}

pub fn train_on_dataset<R: Rng + ?Sized>(
    dataset: &Dataset,
    config: &TrainingConfig,
    rng: &mut R,
) -> RiskResult<(RiskModel, TrainingReport)> {
    if dataset.is_empty() {
        return Err(RiskError::EmptyDataset);
    }

    tracing::info!(
        "Training risk model: {} samples, {} epochs, batch {}",
        dataset.len(),
        config.epochs,
        config.batch_size
    );

    let indices: Vec<usize> = (0..dataset.len()).collect();
    let split = train_test_split(&indices, config.test_size, Some(config.split_seed), rng)?;
    let train = dataset.select(&split.train);
    let test = dataset.select(&split.test);

    let mut model = RiskModel::new(config.learning_rate, rng);
    let epochs = model.fit(&train, config, rng)?;

    let test_metrics = if test.is_empty() {
        None
    } else {
        Some(model.evaluate(&test)?)
    };

    let validation_samples = (train.len() as f64 * config.validation_split).round() as usize;
    let report = TrainingReport {
        train_samples: train.len() - validation_samples.min(train.len()),
        validation_samples,
        test_samples: test.len(),
        epochs,
        test_metrics,
    };

    match &report.test_metrics {
        Some(m) => tracing::info!(
            "Risk model trained. loss: {:.4}, test accuracy: {:.3}, f1: {:.3}",
            report.final_loss().unwrap_or(f64::NAN),
            m.accuracy,
            m.f1_score
        ),
        None => tracing::info!(
            "Risk model trained. loss: {:.4}",
            report.final_loss().unwrap_or(f64::NAN)
        ),
    }

    Ok((model, report))
}
