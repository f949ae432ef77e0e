//! Описание исходных датасетов Kaggle, на которые похожи синтетические данные

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DatasetMetadata {
    pub key: &'static str,
    pub name: &'static str,
    pub kaggle_url: &'static str,
    pub description: &'static str,
    pub features: Option<usize>,
    pub samples: usize,
    pub classes: &'static [&'static str],
    pub target: Option<&'static str>,
    pub image_size: Option<&'static str>,
    pub citation: &'static str,
}

pub static DATASET_METADATA: [DatasetMetadata; 3] = [
    DatasetMetadata {
        key: "heart-disease",
        name: "Heart Disease UCI",
        kaggle_url: "https://www.kaggle.com/datasets/ronitf/heart-disease-uci",
        description: "Heart disease dataset for binary classification",
        features: Some(13),
        samples: 303,
        classes: &[],
        target: Some("Heart disease presence (0/1)"),
        image_size: None,
        citation: "Dua, D. and Graff, C. (2019). UCI Machine Learning Repository",
    },
    DatasetMetadata {
        key: "chest-xray",
        name: "Chest X-Ray Images (Pneumonia)",
        kaggle_url: "https://www.kaggle.com/datasets/paultimothymooney/chest-xray-pneumonia",
        description: "Chest X-ray images for pneumonia detection",
        features: None,
        samples: 5863,
        classes: &["NORMAL", "PNEUMONIA"],
        target: None,
        image_size: Some("224x224 pixels"),
        citation: "Kermany, Daniel; Zhang, Kang; Goldbaum, Michael (2018)",
    },
    DatasetMetadata {
        key: "diabetes",
        name: "Diabetes Health Indicators Dataset",
        kaggle_url: "https://www.kaggle.com/datasets/alexteboul/diabetes-health-indicators-dataset",
        description: "CDC survey data for diabetes prediction",
        features: Some(21),
        samples: 253680,
        classes: &["No diabetes", "Prediabetes", "Diabetes"],
        target: None,
        image_size: None,
        citation: "CDC Behavioral Risk Factor Surveillance System (BRFSS)",
    },
];

pub fn find(key: &str) -> Option<&'static DatasetMetadata> {
    DATASET_METADATA.iter().find(|m| m.key == key)
}
