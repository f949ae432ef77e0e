/// Типы данных для ML пайплайна оценки риска

use chrono::{DateTime, Utc};
use ndarray::{s, Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{RiskError, RiskResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    pub fn encode(self) -> f64 {
        match self {
            Sex::Male => 1.0,
            Sex::Female => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmokingStatus {
    Current,
    Former,
    Never,
}

impl SmokingStatus {
    /// Всё, что не "current"/"former", считается "never"
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("current") => SmokingStatus::Current,
            Some("former") => SmokingStatus::Former,
            _ => SmokingStatus::Never,
        }
    }

    pub fn encode(self) -> f64 {
        match self {
            SmokingStatus::Current => 1.0,
            SmokingStatus::Former => 0.5,
            SmokingStatus::Never => 0.0,
        }
    }
}

/// Запись в форме UCI Heart Disease
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartDiseaseRecord {
    pub age: u32,
    pub sex: Sex,
    pub cp: u8, // тип боли в груди (0-3)
    pub trestbps: u32, // давление в покое
    pub chol: u32,
    pub fbs: u8, // сахар натощак > 120
    pub restecg: u8, // ЭКГ в покое (0-2)
    pub thalach: u32, // максимальный пульс
    pub exang: u8,
    pub oldpeak: f64,
    pub slope: u8,
    pub ca: u8,
    pub thal: u8,
    pub target: u8,
}

/// Показатели пациента в форме анкеты, на них обучается модель риска
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    pub age: f64,
    pub sex: Sex,
    pub systolic: f64,
    pub diastolic: f64,
    pub heart_rate: f64,
    pub cholesterol: f64,
    pub blood_sugar: f64,
    pub bmi: f64,
    pub smoking: SmokingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiabetesRecord {
    pub high_bp: u8,
    pub high_chol: u8,
    pub chol_check: u8,
    pub bmi: f64,
    pub smoker: u8,
    pub stroke: u8,
    pub heart_disease_or_attack: u8,
    pub phys_activity: u8,
    pub fruits: u8,
    pub veggies: u8,
    pub hvy_alcohol_consump: u8,
    pub any_healthcare: u8,
    pub no_docbc_cost: u8,
    pub gen_hlth: u8, // 1-5
    pub ment_hlth: u8, // 0-30 дней
    pub phys_hlth: u8, // 0-30 дней
    pub diff_walk: u8,
    pub sex: u8,
    pub age: u8, // 1-13 категорий
    pub education: u8, // 1-6
    pub income: u8, // 1-8
    pub diabetes: u8, // 0, 1 или 2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum XRayDiagnosis {
    Normal,
    Pneumonia,
}

/// Проекция снимка: передне-задняя или задне-передняя
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ViewPosition {
    Ap,
    Pa,
}

/// Метаданные рентгенограммы грудной клетки (сами снимки не генерируются)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChestXRayRecord {
    pub image_id: String, // chest_xray_NNNNN
    pub diagnosis: XRayDiagnosis,
    pub patient_age: u32,
    pub patient_sex: Sex,
    pub view_position: ViewPosition,
    pub confidence: f64, // уверенность разметки 0.7-1.0
}

/// Поле анкеты: число или строка из формы
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Number(f64),
    Text(String),
}

impl RawField {
    /// `None` для пустой строки и нечисловых значений
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawField::Number(v) => Some(*v),
            RawField::Text(s) => s.trim().parse::<f64>().ok(),
        }
        .filter(|v| v.is_finite())
    }
}

impl From<f64> for RawField {
    fn from(value: f64) -> Self {
        RawField::Number(value)
    }
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        RawField::Text(value.to_string())
    }
}

/// Входные данные пациента от UI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInput {
    pub age: Option<RawField>,
    pub gender: Option<String>,
    pub blood_pressure_systolic: Option<RawField>,
    pub blood_pressure_diastolic: Option<RawField>,
    pub heart_rate: Option<RawField>,
    pub cholesterol: Option<RawField>,
    pub blood_sugar: Option<RawField>,
    pub bmi: Option<RawField>,
    pub smoking_status: Option<String>,
}

/// Размерность входа модели риска
pub const FEATURE_COUNT: usize = 8;

/// Делители нормализации, порядок совпадает с индексами вектора признаков
pub const FEATURE_SCALING: [(&str, f64); FEATURE_COUNT] = [
    ("age", 100.0),
    ("systolic", 200.0),
    ("diastolic", 120.0),
    ("heart_rate", 150.0),
    ("cholesterol", 400.0),
    ("blood_sugar", 300.0),
    ("bmi", 50.0),
    ("smoking", 1.0),
];

pub const DEFAULT_CHOLESTEROL: f64 = 200.0;
pub const DEFAULT_BLOOD_SUGAR: f64 = 100.0;
pub const DEFAULT_BMI: f64 = 25.0;

/// Сырые (ненормализованные) признаки пациента
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientFeatures {
    pub age: f64,
    pub systolic: f64,
    pub diastolic: f64,
    pub heart_rate: f64,
    pub cholesterol: f64,
    pub blood_sugar: f64,
    pub bmi: f64,
    pub smoking: SmokingStatus,
}

impl PatientFeatures {
    pub fn from_input(input: &PatientInput) -> RiskResult<Self> {
        Ok(Self {
            age: required("age", input.age.as_ref())?,
            systolic: required("bloodPressureSystolic", input.blood_pressure_systolic.as_ref())?,
            diastolic: required("bloodPressureDiastolic", input.blood_pressure_diastolic.as_ref())?,
            heart_rate: required("heartRate", input.heart_rate.as_ref())?,
            cholesterol: optional("cholesterol", input.cholesterol.as_ref(), DEFAULT_CHOLESTEROL),
            blood_sugar: optional("bloodSugar", input.blood_sugar.as_ref(), DEFAULT_BLOOD_SUGAR),
            bmi: optional("bmi", input.bmi.as_ref(), DEFAULT_BMI),
            smoking: SmokingStatus::parse(input.smoking_status.as_deref()),
        })
    }

    pub fn to_vector(&self) -> Array1<f64> {
        let raw = [
            self.age,
            self.systolic,
            self.diastolic,
            self.heart_rate,
            self.cholesterol,
            self.blood_sugar,
            self.bmi,
            self.smoking.encode(),
        ];
        raw.iter()
            .zip(FEATURE_SCALING.iter())
            .map(|(value, (_, divisor))| value / divisor)
            .collect()
    }
}

impl From<&PatientRecord> for PatientFeatures {
    fn from(record: &PatientRecord) -> Self {
        Self {
            age: record.age,
            systolic: record.systolic,
            diastolic: record.diastolic,
            heart_rate: record.heart_rate,
            cholesterol: record.cholesterol,
            blood_sugar: record.blood_sugar,
            bmi: record.bmi,
            smoking: record.smoking,
        }
    }
}

fn required(field: &'static str, value: Option<&RawField>) -> RiskResult<f64> {
    match value {
        None => Err(RiskError::MalformedInput {
            field,
            reason: "is missing".to_string(),
        }),
        Some(raw) => raw.as_f64().ok_or_else(|| RiskError::MalformedInput {
            field,
            reason: format!("is not a number: {:?}", raw),
        }),
    }
}

fn optional(field: &'static str, value: Option<&RawField>, default: f64) -> f64 {
    let Some(raw) = value else {
        return default;
    };
    match raw.as_f64() {
        Some(v) if v > 0.0 => v,
        _ => {
            if !matches!(raw, RawField::Text(s) if s.trim().is_empty()) {
                tracing::warn!("Substituting default {} for {}: {:?}", default, field, raw);
            }
            default
        }
    }
}

/// Размеченный набор: строки признаков и метки 0/1
#[derive(Debug, Clone)]
pub struct Dataset {
    pub features: Array2<f64>,
    pub labels: Array1<f64>,
}

impl Dataset {
    pub fn new(features: Array2<f64>, labels: Array1<f64>) -> RiskResult<Self> {
        if features.nrows() != labels.len() {
            return Err(RiskError::DimensionMismatch {
                expected: features.nrows(),
                actual: labels.len(),
            });
        }
        Ok(Self { features, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
        }
    }

    /// Отделяет последние `fraction` строк (как validationSplit в keras)
    pub fn split_tail(&self, fraction: f64) -> (Self, Self) {
        let tail = (self.len() as f64 * fraction).round() as usize;
        let head = self.len() - tail.min(self.len());
        (
            Self {
                features: self.features.slice(s![..head, ..]).to_owned(),
                labels: self.labels.slice(s![..head]).to_owned(),
            },
            Self {
                features: self.features.slice(s![head.., ..]).to_owned(),
                labels: self.labels.slice(s![head..]).to_owned(),
            },
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressionLikelihood {
    Likely,
    Unlikely,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_score: f64, // 0-100
    pub risk_level: RiskLevel,
    pub progression_likelihood: ProgressionLikelihood,
    pub confidence: f64,
    pub assessed_at: DateTime<Utc>,
}

impl RiskAssessment {
    /// Строит оценку по выходу сигмоиды модели (0-1)
    pub fn from_probability(probability: f64) -> Self {
        let risk_score = (probability * 100.0).clamp(0.0, 100.0);

        let risk_level = if risk_score > 70.0 {
            RiskLevel::High
        } else if risk_score > 40.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        let progression_likelihood = if risk_score > 60.0 {
            ProgressionLikelihood::Likely
        } else {
            ProgressionLikelihood::Unlikely
        };

        // Уверенность растет с удалением от 0.5: [70, 95]
        let certainty = (2.0 * probability - 1.0).abs().min(1.0);
        let confidence = 70.0 + 25.0 * certainty;

        Self {
            risk_score,
            risk_level,
            progression_likelihood,
            confidence,
            assessed_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelState {
    Uninitialized,
    Training,
    Ready,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(age: RawField) -> PatientInput {
        PatientInput {
            age: Some(age),
            gender: Some("female".to_string()),
            blood_pressure_systolic: Some("120".into()),
            blood_pressure_diastolic: Some(80.0.into()),
            heart_rate: Some("72".into()),
            ..Default::default()
        }
    }

    #[test]
    fn risk_thresholds() {
        let high = RiskAssessment::from_probability(0.75);
        assert_eq!(high.risk_level, RiskLevel::High);
        assert_eq!(high.progression_likelihood, ProgressionLikelihood::Likely);
        assert!((high.risk_score - 75.0).abs() < 1e-9);

        let medium = RiskAssessment::from_probability(0.5);
        assert_eq!(medium.risk_level, RiskLevel::Medium);
        assert_eq!(medium.progression_likelihood, ProgressionLikelihood::Unlikely);

        let low = RiskAssessment::from_probability(0.3);
        assert_eq!(low.risk_level, RiskLevel::Low);
        assert_eq!(low.progression_likelihood, ProgressionLikelihood::Unlikely);
    }

    #[test]
    fn thresholds_are_strict() {
        let at_40 = RiskAssessment::from_probability(0.4);
        assert_eq!(at_40.risk_score, 40.0);
        assert_eq!(at_40.risk_level, RiskLevel::Low);

        let at_60 = RiskAssessment::from_probability(0.6);
        assert_eq!(at_60.risk_score, 60.0);
        assert_eq!(at_60.risk_level, RiskLevel::Medium);
        assert_eq!(at_60.progression_likelihood, ProgressionLikelihood::Unlikely);
        assert_eq!(
            RiskAssessment::from_probability(0.61).progression_likelihood,
            ProgressionLikelihood::Likely
        );

        let at_70 = RiskAssessment::from_probability(0.7);
        assert_eq!(at_70.risk_score, 70.0);
        assert_eq!(at_70.risk_level, RiskLevel::Medium);
        assert_eq!(
            RiskAssessment::from_probability(0.7001).risk_level,
            RiskLevel::High
        );
        assert_eq!(
            RiskAssessment::from_probability(0.4001).risk_level,
            RiskLevel::Medium
        );
    }

    #[test]
    fn confidence_tracks_certainty() {
        assert!((RiskAssessment::from_probability(0.5).confidence - 70.0).abs() < 1e-9);
        assert!((RiskAssessment::from_probability(1.0).confidence - 95.0).abs() < 1e-9);
        assert!((RiskAssessment::from_probability(0.0).confidence - 95.0).abs() < 1e-9);
    }

    #[test]
    fn optional_fields_use_defaults() {
        let features = PatientFeatures::from_input(&input("45".into())).unwrap();
        assert_eq!(features.cholesterol, DEFAULT_CHOLESTEROL);
        assert_eq!(features.blood_sugar, DEFAULT_BLOOD_SUGAR);
        assert_eq!(features.bmi, DEFAULT_BMI);
        assert_eq!(features.smoking, SmokingStatus::Never);

        let v = features.to_vector();
        assert_eq!(v.len(), FEATURE_COUNT);
        assert!((v[0] - 0.45).abs() < 1e-12);
        assert!((v[1] - 0.6).abs() < 1e-12);
        assert!((v[4] - 0.5).abs() < 1e-12);
        assert!(v.iter().all(|x| (0.0..=1.0).contains(x)));
    }

    #[test]
    fn unparseable_optional_field_falls_back() {
        let mut patient = input(50.0.into());
        patient.cholesterol = Some("n/a".into());
        patient.smoking_status = Some("former".to_string());
        let features = PatientFeatures::from_input(&patient).unwrap();
        assert_eq!(features.cholesterol, DEFAULT_CHOLESTEROL);
        assert_eq!(features.to_vector()[7], 0.5);
    }

    #[test]
    fn mandatory_field_is_validated() {
        let err = PatientFeatures::from_input(&input("abc".into())).unwrap_err();
        assert!(matches!(err, RiskError::MalformedInput { field: "age", .. }));

        let mut patient = input(50.0.into());
        patient.heart_rate = None;
        let err = PatientFeatures::from_input(&patient).unwrap_err();
        assert!(matches!(err, RiskError::MalformedInput { field: "heartRate", .. }));
    }

    #[test]
    fn patient_input_accepts_mixed_json() {
        let json = r#"{"age":"61","gender":"male","bloodPressureSystolic":150,
            "bloodPressureDiastolic":"95","heartRate":"88","bmi":"","smokingStatus":"current"}"#;
        let patient: PatientInput = serde_json::from_str(json).unwrap();
        let features = PatientFeatures::from_input(&patient).unwrap();
        assert_eq!(features.age, 61.0);
        assert_eq!(features.systolic, 150.0);
        assert_eq!(features.bmi, DEFAULT_BMI);
        assert_eq!(features.smoking, SmokingStatus::Current);
    }

    #[test]
    fn dataset_split_tail() {
        let features = Array2::from_shape_fn((10, 2), |(i, j)| (i * 2 + j) as f64);
        let labels = Array1::from_iter((0..10).map(|i| (i % 2) as f64));
        let dataset = Dataset::new(features, labels).unwrap();
        let (fit, validation) = dataset.split_tail(0.2);
        assert_eq!(fit.len(), 8);
        assert_eq!(validation.len(), 2);
        assert_eq!(validation.features[[0, 0]], 16.0);
    }
}
