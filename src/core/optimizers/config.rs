use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Optimizer 전체 구성
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// 복소 학습률 (직렬화 형식: [re, im])
    pub learning_rate: Complex64,
    /// 전역 그래디언트 클리핑 노름
    pub max_norm: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            learning_rate: Complex64::new(0.3, 0.3),
            max_norm: 1.0,
        }
    }
}

impl OptimizerConfig {
    /// 새 구성 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 학습률 설정
    pub fn with_learning_rate(mut self, lr: Complex64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// 그래디언트 클리핑 설정
    pub fn with_max_norm(mut self, max_norm: f64) -> Self {
        self.max_norm = max_norm;
        self
    }
}
