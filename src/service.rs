//! Фасад инференса: анкета пациента → оценка риска
//!
//! Модель создается лениво и обучается ровно один раз на процесс. Конкурентные
//! первые запросы ждут одно и то же обучение через `OnceCell`.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::OnceCell;

use crate::config::TrainingConfig;
use crate::error::{RiskError, RiskResult};
use crate::models::{train_risk_model, RiskModel, TrainingReport};
use crate::types::{ModelState, PatientFeatures, PatientInput, RiskAssessment};

pub struct TrainedModel {
    pub model: RiskModel,
    pub report: TrainingReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub state: ModelState,
    pub training_runs: usize,
    pub config: TrainingConfig,
    pub report: Option<TrainingReport>,
}

pub struct RiskService {
    inner: Arc<Inner>,
}

struct Inner {
    config: TrainingConfig,
    model: OnceCell<Arc<TrainedModel>>,
    state: AtomicU8,
    training_runs: AtomicUsize,
}

impl RiskService {
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                model: OnceCell::new(),
                state: AtomicU8::new(encode_state(ModelState::Uninitialized)),
                training_runs: AtomicUsize::new(0),
            }),
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.inner.config
    }

    /// `Ready` только когда модель уже лежит в ячейке
    pub fn state(&self) -> ModelState {
        if self.inner.model.initialized() {
            ModelState::Ready
        } else {
            self.inner.pending_state()
        }
    }

    /// Сколько раз запускалось обучение
    pub fn training_runs(&self) -> usize {
        self.inner.training_runs.load(Ordering::Acquire)
    }

    pub fn status(&self) -> ModelStatus {
        let report = self.inner.model.get().map(|trained| trained.report.clone());
        ModelStatus {
            state: if report.is_some() {
                ModelState::Ready
            } else {
                self.inner.pending_state()
            },
            training_runs: self.training_runs(),
            config: self.inner.config.clone(),
            report,
        }
    }

    /// Явная инициализация (прогрев) модели
    pub async fn initialize(&self) -> RiskResult<()> {
        self.ensure_ready().await.map(|_| ())
    }

    /// Готовая модель; первый вызов запускает обучение, остальные ждут его результата.
    /// После ошибки ячейка остается пустой и следующий вызов обучает заново.
    ///
    /// Инициализация идет в отдельной задаче: отмена вызывающего не прерывает
    /// обучение, и результат все равно попадает в ячейку.
    pub async fn ensure_ready(&self) -> RiskResult<Arc<TrainedModel>> {
        if let Some(trained) = self.inner.model.get() {
            return Ok(Arc::clone(trained));
        }
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.initialize().await }).await?
    }

    pub async fn assess_patient(&self, input: &PatientInput) -> RiskResult<RiskAssessment> {
        let features = PatientFeatures::from_input(input)?;
        let vector = features.to_vector();

        let trained = self.ensure_ready().await?;
        let probability = trained.model.predict(&vector)?;

        let assessment = RiskAssessment::from_probability(probability);
        tracing::info!(
            "Assessment: score {:.1}, level {:?}",
            assessment.risk_score,
            assessment.risk_level
        );
        Ok(assessment)
    }
}

impl Inner {
    async fn initialize(&self) -> RiskResult<Arc<TrainedModel>> {
        let trained = Arc::clone(self.model.get_or_try_init(|| self.train()).await?);
        self.set_state(ModelState::Ready);
        Ok(trained)
    }

    async fn train(&self) -> RiskResult<Arc<TrainedModel>> {
        self.set_state(ModelState::Training);
        let run = self.training_runs.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::info!("Starting risk model training (run {})", run);

        let config = self.config.clone();
        let result = tokio::task::spawn_blocking(move || train_risk_model(&config))
            .await
            .map_err(RiskError::from)
            .and_then(|trained| trained);

        match result {
            Ok((model, report)) => Ok(Arc::new(TrainedModel { model, report })),
            Err(e) => {
                tracing::error!("Risk model training failed: {}", e);
                self.set_state(ModelState::Uninitialized);
                Err(e)
            }
        }
    }

    /// Состояние без готовой модели в ячейке
    fn pending_state(&self) -> ModelState {
        match decode_state(self.state.load(Ordering::Acquire)) {
            ModelState::Ready => ModelState::Training,
            state => state,
        }
    }

    fn set_state(&self, state: ModelState) {
        self.state.store(encode_state(state), Ordering::Release);
    }
}

impl Default for RiskService {
    fn default() -> Self {
        Self::new(TrainingConfig::default())
    }
}

fn encode_state(state: ModelState) -> u8 {
    match state {
        ModelState::Uninitialized => 0,
        ModelState::Training => 1,
        ModelState::Ready => 2,
    }
}

fn decode_state(raw: u8) -> ModelState {
    match raw {
        1 => ModelState::Training,
        2 => ModelState::Ready,
        _ => ModelState::Uninitialized,
    }
}
