/// Синтетические медицинские датасеты

pub mod generator;
pub mod metadata;

pub use generator::{generate, FieldDistribution, SyntheticRecord};
pub use metadata::{DatasetMetadata, DATASET_METADATA};

use rand::Rng;

use crate::error::{RiskError, RiskResult};
use crate::types::{ChestXRayRecord, DiabetesRecord, HeartDiseaseRecord, PatientRecord};

pub const MAX_GENERATED_RECORDS: usize = 10_000;

/// Генерация по имени датасета, записи отдаются как JSON
pub fn generate_named<R: Rng + ?Sized>(
    name: &str,
    count: usize,
    rng: &mut R,
) -> RiskResult<serde_json::Value> {
    if count > MAX_GENERATED_RECORDS {
        return Err(RiskError::InvalidParameter(format!(
            "count must not exceed {}, got {}",
            MAX_GENERATED_RECORDS, count
        )));
    }

    let value = match name {
        "heart-disease" => serde_json::to_value(generate::<HeartDiseaseRecord, _>(count, rng)),
        "diabetes" => serde_json::to_value(generate::<DiabetesRecord, _>(count, rng)),
        "patients" => serde_json::to_value(generate::<PatientRecord, _>(count, rng)),
        "chest-xray" => serde_json::to_value(generate::<ChestXRayRecord, _>(count, rng)),
        other => {
            return Err(RiskError::InvalidParameter(format!(
                "unknown dataset: {}",
                other
            )))
        }
    };

    Ok(value?)
}
