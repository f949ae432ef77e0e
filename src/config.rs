//! Конфигурация обучения и сервера

use std::net::SocketAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Количество синтетических записей для обучения
    pub samples: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Доля train-части, отводимая под валидацию (только мониторинг)
    pub validation_split: f64,
    pub test_size: f64,
    /// Seed для детерминированного train/test split
    pub split_seed: i64,
    /// Seed для генерации данных, инициализации весов и dropout
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            samples: 1000,
            epochs: 50,
            batch_size: 32,
            learning_rate: 0.001,
            validation_split: 0.2,
            test_size: 0.2,
            split_seed: 42,
            seed: 42,
        }
    }
}

impl TrainingConfig {
    /// Значения по умолчанию с переопределением из окружения
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(samples) = env_var("HEALTH_RISK_SAMPLES") {
            config.samples = samples;
        }
        if let Some(epochs) = env_var("HEALTH_RISK_EPOCHS") {
            config.epochs = epochs;
        }
        if let Some(seed) = env_var("HEALTH_RISK_SEED") {
            config.seed = seed;
        }
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(addr) = env_var("HEALTH_RISK_ADDR") {
            config.bind_addr = addr;
        }
        config
    }
}

fn env_var<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparseable {}={:?}", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_training_contract() {
        let config = TrainingConfig::default();
        assert_eq!(config.samples, 1000);
        assert_eq!(config.batch_size, 32);
        assert!((config.learning_rate - 0.001).abs() < 1e-12);
        assert!((config.validation_split - 0.2).abs() < 1e-12);
        assert_eq!(ServerConfig::default().bind_addr.port(), 8000);
    }
}
