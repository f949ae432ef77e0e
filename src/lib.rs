//! Health Risk ML - синтетические данные, предобработка и модель риска

pub mod api;
pub mod config;
pub mod datasets;
pub mod error;
pub mod models;
pub mod preprocessing;
pub mod service;
pub mod types;

pub use error::{RiskError, RiskResult};
pub use types::*;

// Re-export для удобства
pub use models::RiskModel;
pub use service::RiskService;
