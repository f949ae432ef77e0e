/// ML модели

pub mod network;
pub mod risk_model;

pub use network::{Activation, AdamConfig, FeedForwardNetwork};
pub use risk_model::{train_on_dataset, train_risk_model, RiskModel, TrainingReport};
