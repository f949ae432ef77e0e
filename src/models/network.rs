//! Полносвязная сеть на ndarray
//!
//! Слои Dense/Dropout, активации ReLU/Sigmoid, бинарная кросс-энтропия и Adam.
//! Выходной слой бинарного классификатора: Dense(1, Sigmoid).

use ndarray::{Array1, Array2, Axis};
use rand::Rng;

use crate::error::{RiskError, RiskResult};

const BCE_EPSILON: f64 = 1e-7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Relu,
    Sigmoid,
}

impl Activation {
    fn apply(self, z: Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Relu => z.mapv_into(|v| v.max(0.0)),
            Activation::Sigmoid => z.mapv_into(sigmoid),
        }
    }

    /// Производная, выраженная через выход активации
    fn derivative(self, output: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Relu => output.mapv(|a| if a > 0.0 { 1.0 } else { 0.0 }),
            Activation::Sigmoid => output.mapv(|a| a * (1.0 - a)),
        }
    }
}

pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

pub fn binary_cross_entropy(predictions: &Array1<f64>, targets: &Array1<f64>) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    let total: f64 = predictions
        .iter()
        .zip(targets.iter())
        .map(|(&p, &y)| {
            let p = p.clamp(BCE_EPSILON, 1.0 - BCE_EPSILON);
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum();
    total / predictions.len() as f64
}

#[derive(Debug, Clone, Copy)]
pub struct AdamConfig {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
}

impl AdamConfig {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
        }
    }
}

pub struct Dense {
    pub weights: Array2<f64>,
    pub bias: Array1<f64>,
    pub activation: Activation,
    // Моменты Adam
    m_w: Array2<f64>,
    v_w: Array2<f64>,
    m_b: Array1<f64>,
    v_b: Array1<f64>,
}

impl Dense {
    /// Инициализация Glorot uniform
    fn new<R: Rng + ?Sized>(input: usize, output: usize, activation: Activation, rng: &mut R) -> Self {
        let limit = (6.0 / (input + output) as f64).sqrt();
        Self {
            weights: Array2::from_shape_fn((input, output), |_| rng.gen_range(-limit..limit)),
            bias: Array1::zeros(output),
            activation,
            m_w: Array2::zeros((input, output)),
            v_w: Array2::zeros((input, output)),
            m_b: Array1::zeros(output),
            v_b: Array1::zeros(output),
        }
    }

    fn forward(&self, x: &Array2<f64>) -> Array2<f64> {
        self.activation.apply(x.dot(&self.weights) + &self.bias)
    }

    fn apply_adam(&mut self, dw: &Array2<f64>, db: &Array1<f64>, opt: &AdamConfig, step: i32) {
        let bc1 = 1.0 - opt.beta1.powi(step);
        let bc2 = 1.0 - opt.beta2.powi(step);

        self.m_w = &self.m_w * opt.beta1 + dw * (1.0 - opt.beta1);
        self.v_w = &self.v_w * opt.beta2 + dw.mapv(|g| g * g) * (1.0 - opt.beta2);
        let update_w = (&self.m_w / bc1) / ((&self.v_w / bc2).mapv(f64::sqrt) + opt.epsilon);
        self.weights -= &(update_w * opt.learning_rate);

        self.m_b = &self.m_b * opt.beta1 + db * (1.0 - opt.beta1);
        self.v_b = &self.v_b * opt.beta2 + db.mapv(|g| g * g) * (1.0 - opt.beta2);
        let update_b = (&self.m_b / bc1) / ((&self.v_b / bc2).mapv(f64::sqrt) + opt.epsilon);
        self.bias -= &(update_b * opt.learning_rate);
    }
}

pub enum Layer {
    Dense(Dense),
    Dropout { rate: f64 },
}

enum LayerCache {
    Dense {
        input: Array2<f64>,
        output: Array2<f64>,
    },
    Dropout {
        mask: Array2<f64>,
    },
}

pub struct FeedForwardNetwork {
    layers: Vec<Layer>,
    input_dim: usize,
    optimizer: AdamConfig,
    step: i32,
}

impl FeedForwardNetwork {
    pub fn new(input_dim: usize, optimizer: AdamConfig) -> Self {
        Self {
            layers: Vec::new(),
            input_dim,
            optimizer,
            step: 0,
        }
    }

    pub fn dense<R: Rng + ?Sized>(mut self, units: usize, activation: Activation, rng: &mut R) -> Self {
        let input = self.output_dim();
        self.layers
            .push(Layer::Dense(Dense::new(input, units, activation, rng)));
        self
    }

    pub fn dropout(mut self, rate: f64) -> Self {
        self.layers.push(Layer::Dropout {
            rate: rate.clamp(0.0, 0.99),
        });
        self
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn output_dim(&self) -> usize {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| match layer {
                Layer::Dense(dense) => Some(dense.bias.len()),
                Layer::Dropout { .. } => None,
            })
            .unwrap_or(self.input_dim)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    fn is_binary_classifier(&self) -> bool {
        matches!(
            self.layers.last(),
            Some(Layer::Dense(dense)) if dense.activation == Activation::Sigmoid && dense.bias.len() == 1
        )
    }

    /// Прямой проход без dropout и без изменения параметров
    pub fn forward(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut activations = x.to_owned();
        for layer in &self.layers {
            if let Layer::Dense(dense) = layer {
                activations = dense.forward(&activations);
            }
        }
        activations
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Array1<f64> {
        self.forward(x).column(0).to_owned()
    }

    pub fn loss(&self, x: &Array2<f64>, y: &Array1<f64>) -> f64 {
        binary_cross_entropy(&self.predict_proba(x), y)
    }

    fn forward_train<R: Rng + ?Sized>(
        &self,
        x: &Array2<f64>,
        rng: &mut R,
    ) -> (Array2<f64>, Vec<LayerCache>) {
        let mut activations = x.to_owned();
        let mut caches = Vec::with_capacity(self.layers.len());

        for layer in &self.layers {
            match layer {
                Layer::Dense(dense) => {
                    let output = dense.forward(&activations);
                    caches.push(LayerCache::Dense {
                        input: activations,
                        output: output.clone(),
                    });
                    activations = output;
                }
                Layer::Dropout { rate } => {
                    // Inverted dropout: масштабируем выжившие нейроны
                    let keep = 1.0 - rate;
                    let mask = Array2::from_shape_fn(activations.raw_dim(), |_| {
                        if rng.gen::<f64>() < *rate {
                            0.0
                        } else {
                            1.0 / keep
                        }
                    });
                    activations = activations * &mask;
                    caches.push(LayerCache::Dropout { mask });
                }
            }
        }

        (activations, caches)
    }

    /// Один шаг Adam на батче, возвращает BCE батча до обновления
    pub fn train_batch<R: Rng + ?Sized>(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        rng: &mut R,
    ) -> RiskResult<f64> {
        if !self.is_binary_classifier() {
            return Err(RiskError::InvalidParameter(
                "output layer must be Dense(1, Sigmoid)".to_string(),
            ));
        }
        if x.ncols() != self.input_dim {
            return Err(RiskError::DimensionMismatch {
                expected: self.input_dim,
                actual: x.ncols(),
            });
        }
        if x.nrows() != y.len() {
            return Err(RiskError::DimensionMismatch {
                expected: x.nrows(),
                actual: y.len(),
            });
        }
        if x.nrows() == 0 {
            return Err(RiskError::EmptyDataset);
        }

        let n = x.nrows() as f64;
        let (output, caches) = self.forward_train(x, rng);
        let loss = binary_cross_entropy(&output.column(0).to_owned(), y);

        // Для sigmoid + BCE градиент по логиту: (p - y) / n
        let targets = y.view().insert_axis(Axis(1));
        let mut grad = (&output - &targets) / n;
        let mut grad_is_logit = true;

        self.step += 1;
        let step = self.step;
        let optimizer = self.optimizer;

        for (layer, cache) in self.layers.iter_mut().zip(caches.iter()).rev() {
            match (layer, cache) {
                (Layer::Dense(dense), LayerCache::Dense { input, output }) => {
                    let dz = if grad_is_logit {
                        grad
                    } else {
                        grad * dense.activation.derivative(output)
                    };
                    grad_is_logit = false;

                    let dw = input.t().dot(&dz);
                    let db = dz.sum_axis(Axis(0));
                    grad = dz.dot(&dense.weights.t());
                    dense.apply_adam(&dw, &db, &optimizer, step);
                }
                (Layer::Dropout { .. }, LayerCache::Dropout { mask }) => {
                    grad = grad * mask;
                }
                _ => {
                    return Err(RiskError::TrainingFailure(
                        "layer cache out of sync".to_string(),
                    ))
                }
            }
        }

        Ok(loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn classifier(rng: &mut StdRng) -> FeedForwardNetwork {
        FeedForwardNetwork::new(2, AdamConfig::new(0.05))
            .dense(8, Activation::Relu, rng)
            .dense(1, Activation::Sigmoid, rng)
    }

    #[test]
    fn sigmoid_is_stable() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(-1000.0) >= 0.0);
        assert!(sigmoid(1000.0) <= 1.0);
        assert!(sigmoid(-1000.0).is_finite());
    }

    #[test]
    fn bce_is_clipped() {
        let loss = binary_cross_entropy(&array![0.0, 1.0], &array![1.0, 0.0]);
        assert!(loss.is_finite());
        assert!(loss > 10.0);
        assert!(binary_cross_entropy(&array![0.9], &array![1.0]) < 0.2);
    }

    #[test]
    fn output_shape_and_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let net = FeedForwardNetwork::new(3, AdamConfig::new(0.001))
            .dense(4, Activation::Relu, &mut rng)
            .dropout(0.5)
            .dense(1, Activation::Sigmoid, &mut rng);
        assert_eq!(net.output_dim(), 1);
        assert_eq!(net.layers().len(), 3);
        let probs = net.predict_proba(&Array2::from_elem((5, 3), 0.3));
        assert_eq!(probs.len(), 5);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn learns_linearly_separable_data() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut net = classifier(&mut rng);
        let x = array![[0.0, 0.1], [0.1, 0.0], [0.2, 0.1], [0.9, 1.0], [1.0, 0.8], [0.8, 0.9]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let initial = net.loss(&x, &y);
        for _ in 0..300 {
            net.train_batch(&x, &y, &mut rng).unwrap();
        }
        let trained = net.loss(&x, &y);
        assert!(trained < initial);

        let probs = net.predict_proba(&x);
        assert!(probs[0] < 0.5 && probs[3] > 0.5);
    }

    #[test]
    fn rejects_wrong_width() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut net = classifier(&mut rng);
        let err = net
            .train_batch(&Array2::zeros((2, 3)), &array![0.0, 1.0], &mut rng)
            .unwrap_err();
        assert!(matches!(err, RiskError::DimensionMismatch { expected: 2, actual: 3 }));
    }

    #[test]
    fn requires_sigmoid_output() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut net = FeedForwardNetwork::new(2, AdamConfig::new(0.01)).dense(1, Activation::Relu, &mut rng);
        assert!(net
            .train_batch(&Array2::zeros((1, 2)), &array![1.0], &mut rng)
            .is_err());
    }
}
