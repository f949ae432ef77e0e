//! Генерация синтетических медицинских записей
//!
//! Каждое поле выбирается независимо из объявленного распределения, поэтому
//! значения всегда попадают в свой домен и валидация не нужна.

use rand::Rng;

use crate::types::{
    ChestXRayRecord, DiabetesRecord, HeartDiseaseRecord, PatientRecord, Sex, SmokingStatus,
    ViewPosition, XRayDiagnosis,
};
use FieldDistribution::{Bernoulli, Categorical, Uniform, UniformInt};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDistribution {
    /// Равномерно на [low, high)
    Uniform { low: f64, high: f64 },
    /// Равномерно по целым low..=high
    UniformInt { low: i64, high: i64 },
    /// 1 с вероятностью p, иначе 0
    Bernoulli { p: f64 },
    /// Индекс категории по весам
    Categorical(&'static [f64]),
}

impl FieldDistribution {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            FieldDistribution::Uniform { low, high } => rng.gen_range(low..high),
            FieldDistribution::UniformInt { low, high } => rng.gen_range(low..=high) as f64,
            FieldDistribution::Bernoulli { p } => {
                if rng.gen_bool(p) {
                    1.0
                } else {
                    0.0
                }
            }
            FieldDistribution::Categorical(weights) => {
                let total: f64 = weights.iter().sum();
                let mut u = rng.gen::<f64>() * total;
                for (i, w) in weights.iter().enumerate() {
                    if u < *w {
                        return i as f64;
                    }
                    u -= w;
                }
                weights.len().saturating_sub(1) as f64
            }
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        let is_int = value.fract() == 0.0;
        match *self {
            FieldDistribution::Uniform { low, high } => (low..=high).contains(&value),
            FieldDistribution::UniformInt { low, high } => {
                is_int && (low as f64..=high as f64).contains(&value)
            }
            FieldDistribution::Bernoulli { .. } => value == 0.0 || value == 1.0,
            FieldDistribution::Categorical(weights) => {
                is_int && value >= 0.0 && (value as usize) < weights.len()
            }
        }
    }
}

pub type Schema = &'static [(&'static str, FieldDistribution)];

/// Запись, которую можно сгенерировать по схеме полей
pub trait SyntheticRecord: Sized {
    fn schema() -> Schema;

    /// `values` идут в порядке схемы, `index` - номер записи в выборке
    fn from_values(index: usize, values: &[f64]) -> Self;

    fn values(&self) -> Vec<f64>;
}

/// Ровно `count` независимых записей
pub fn generate<T: SyntheticRecord, R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<T> {
    let schema = T::schema();
    (0..count)
        .map(|index| {
            let values: Vec<f64> = schema.iter().map(|(_, dist)| dist.sample(rng)).collect();
            T::from_values(index, &values)
        })
        .collect()
}

// Распределения по статистике UCI Heart Disease (~68% мужчин, ~46% с болезнью)
const HEART_DISEASE_SCHEMA: Schema = &[
    ("age", UniformInt { low: 29, high: 78 }),
    ("sex", Bernoulli { p: 0.68 }),
    ("cp", UniformInt { low: 0, high: 3 }),
    ("trestbps", UniformInt { low: 94, high: 173 }),
    ("chol", UniformInt { low: 126, high: 542 }),
    ("fbs", Bernoulli { p: 0.15 }),
    ("restecg", UniformInt { low: 0, high: 2 }),
    ("thalach", UniformInt { low: 71, high: 201 }),
    ("exang", Bernoulli { p: 0.33 }),
    ("oldpeak", Uniform { low: 0.0, high: 6.2 }),
    ("slope", UniformInt { low: 0, high: 2 }),
    ("ca", UniformInt { low: 0, high: 3 }),
    ("thal", UniformInt { low: 1, high: 3 }),
    ("target", Bernoulli { p: 0.46 }),
];

impl SyntheticRecord for HeartDiseaseRecord {
    fn schema() -> Schema {
        HEART_DISEASE_SCHEMA
    }

    fn from_values(_index: usize, v: &[f64]) -> Self {
        Self {
            age: v[0] as u32,
            sex: if v[1] == 1.0 { Sex::Male } else { Sex::Female },
            cp: v[2] as u8,
            trestbps: v[3] as u32,
            chol: v[4] as u32,
            fbs: v[5] as u8,
            restecg: v[6] as u8,
            thalach: v[7] as u32,
            exang: v[8] as u8,
            oldpeak: (v[9] * 10.0).round() / 10.0,
            slope: v[10] as u8,
            ca: v[11] as u8,
            thal: v[12] as u8,
            target: v[13] as u8,
        }
    }

    fn values(&self) -> Vec<f64> {
        vec![
            self.age as f64,
            self.sex.encode(),
            self.cp as f64,
            self.trestbps as f64,
            self.chol as f64,
            self.fbs as f64,
            self.restecg as f64,
            self.thalach as f64,
            self.exang as f64,
            self.oldpeak,
            self.slope as f64,
            self.ca as f64,
            self.thal as f64,
            self.target as f64,
        ]
    }
}

// Порядок категорий курения: never, former, current
const SMOKING_WEIGHTS: &[f64] = &[0.5, 0.25, 0.25];

const PATIENT_SCHEMA: Schema = &[
    ("age", Uniform { low: 20.0, high: 100.0 }),
    ("sex", Bernoulli { p: 0.5 }),
    ("systolic", Uniform { low: 90.0, high: 170.0 }),
    ("diastolic", Uniform { low: 60.0, high: 100.0 }),
    ("heart_rate", Uniform { low: 60.0, high: 120.0 }),
    ("cholesterol", Uniform { low: 150.0, high: 350.0 }),
    ("blood_sugar", Uniform { low: 70.0, high: 220.0 }),
    ("bmi", Uniform { low: 18.0, high: 38.0 }),
    ("smoking", Categorical(SMOKING_WEIGHTS)),
];

impl SyntheticRecord for PatientRecord {
    fn schema() -> Schema {
        PATIENT_SCHEMA
    }

    fn from_values(_index: usize, v: &[f64]) -> Self {
        let smoking = match v[8] as usize {
            2 => SmokingStatus::Current,
            1 => SmokingStatus::Former,
            _ => SmokingStatus::Never,
        };
        Self {
            age: v[0],
            sex: if v[1] == 1.0 { Sex::Male } else { Sex::Female },
            systolic: v[2],
            diastolic: v[3],
            heart_rate: v[4],
            cholesterol: v[5],
            blood_sugar: v[6],
            bmi: v[7],
            smoking,
        }
    }

    fn values(&self) -> Vec<f64> {
        let smoking = match self.smoking {
            SmokingStatus::Never => 0.0,
            SmokingStatus::Former => 1.0,
            SmokingStatus::Current => 2.0,
        };
        vec![
            self.age,
            self.sex.encode(),
            self.systolic,
            self.diastolic,
            self.heart_rate,
            self.cholesterol,
            self.blood_sugar,
            self.bmi,
            smoking,
        ]
    }
}

// ~25% пневмоний, ~30% снимков в проекции AP
const CHEST_XRAY_SCHEMA: Schema = &[
    ("diagnosis", Bernoulli { p: 0.25 }),
    ("patient_age", UniformInt { low: 1, high: 80 }),
    ("patient_sex", Bernoulli { p: 0.5 }),
    ("view_position", Bernoulli { p: 0.3 }),
    ("confidence", Uniform { low: 0.7, high: 1.0 }),
];

impl SyntheticRecord for ChestXRayRecord {
    fn schema() -> Schema {
        CHEST_XRAY_SCHEMA
    }

    fn from_values(index: usize, v: &[f64]) -> Self {
        Self {
            image_id: format!("chest_xray_{:05}", index),
            diagnosis: if v[0] == 1.0 {
                XRayDiagnosis::Pneumonia
            } else {
                XRayDiagnosis::Normal
            },
            patient_age: v[1] as u32,
            patient_sex: if v[2] == 1.0 { Sex::Male } else { Sex::Female },
            view_position: if v[3] == 1.0 {
                ViewPosition::Ap
            } else {
                ViewPosition::Pa
            },
            confidence: v[4],
        }
    }

    fn values(&self) -> Vec<f64> {
        vec![
            f64::from(u8::from(self.diagnosis == XRayDiagnosis::Pneumonia)),
            self.patient_age as f64,
            self.patient_sex.encode(),
            f64::from(u8::from(self.view_position == ViewPosition::Ap)),
            self.confidence,
        ]
    }
}

// Распределения по Diabetes Health Indicators (BRFSS)
const DIABETES_SCHEMA: Schema = &[
    ("high_bp", Bernoulli { p: 0.4 }),
    ("high_chol", Bernoulli { p: 0.4 }),
    ("chol_check", Bernoulli { p: 0.95 }),
    ("bmi", Uniform { low: 15.0, high: 55.0 }),
    ("smoker", Bernoulli { p: 0.2 }),
    ("stroke", Bernoulli { p: 0.05 }),
    ("heart_disease_or_attack", Bernoulli { p: 0.1 }),
    ("phys_activity", Bernoulli { p: 0.75 }),
    ("fruits", Bernoulli { p: 0.6 }),
    ("veggies", Bernoulli { p: 0.8 }),
    ("hvy_alcohol_consump", Bernoulli { p: 0.05 }),
    ("any_healthcare", Bernoulli { p: 0.95 }),
    ("no_docbc_cost", Bernoulli { p: 0.15 }),
    ("gen_hlth", UniformInt { low: 1, high: 5 }),
    ("ment_hlth", UniformInt { low: 0, high: 30 }),
    ("phys_hlth", UniformInt { low: 0, high: 30 }),
    ("diff_walk", Bernoulli { p: 0.2 }),
    ("sex", Bernoulli { p: 0.5 }),
    ("age", UniformInt { low: 1, high: 13 }),
    ("education", UniformInt { low: 1, high: 6 }),
    ("income", UniformInt { low: 1, high: 8 }),
    ("diabetes", Categorical(&[0.85, 0.075, 0.075])),
];

impl SyntheticRecord for DiabetesRecord {
    fn schema() -> Schema {
        DIABETES_SCHEMA
    }

    fn from_values(_index: usize, v: &[f64]) -> Self {
        Self {
            high_bp: v[0] as u8,
            high_chol: v[1] as u8,
            chol_check: v[2] as u8,
            bmi: (v[3] * 100.0).round() / 100.0,
            smoker: v[4] as u8,
            stroke: v[5] as u8,
            heart_disease_or_attack: v[6] as u8,
            phys_activity: v[7] as u8,
            fruits: v[8] as u8,
            veggies: v[9] as u8,
            hvy_alcohol_consump: v[10] as u8,
            any_healthcare: v[11] as u8,
            no_docbc_cost: v[12] as u8,
            gen_hlth: v[13] as u8,
            ment_hlth: v[14] as u8,
            phys_hlth: v[15] as u8,
            diff_walk: v[16] as u8,
            sex: v[17] as u8,
            age: v[18] as u8,
            education: v[19] as u8,
            income: v[20] as u8,
            diabetes: v[21] as u8,
        }
    }

    fn values(&self) -> Vec<f64> {
        let flags = [
            self.high_bp,
            self.high_chol,
            self.chol_check,
        ];
        let rest = [
            self.smoker,
            self.stroke,
            self.heart_disease_or_attack,
            self.phys_activity,
            self.fruits,
            self.veggies,
            self.hvy_alcohol_consump,
            self.any_healthcare,
            self.no_docbc_cost,
            self.gen_hlth,
            self.ment_hlth,
            self.phys_hlth,
            self.diff_walk,
            self.sex,
            self.age,
            self.education,
            self.income,
            self.diabetes,
        ];
        flags
            .iter()
            .map(|&v| v as f64)
            .chain(std::iter::once(self.bmi))
            .chain(rest.iter().map(|&v| v as f64))
            .collect()
    }
}
