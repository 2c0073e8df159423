//! 전역 L2 클리핑 복소 경사하강법
//!
//! 학습률이 복소수이므로 실수 방향의 그래디언트도 복소 평면에서 회전된 스텝이 된다.
//! 성분별 크기 조절이 아니라 복소 곱셈이다.

use super::config::OptimizerConfig;
use crate::core::matrix::ComplexMatrixSet;
use num_complex::Complex64;

/// 한 스텝의 클리핑 결과
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// 클리핑 전 전체 그래디언트 L2 노름
    pub gradient_norm: f64,
    /// 적용된 스케일 (노름 ≤ max_norm 이면 정확히 1)
    pub scale: f64,
}

/// 기본 경사하강법 옵티마이저
#[derive(Debug, Clone)]
pub struct GradientDescent {
    pub learning_rate: Complex64,
    pub max_norm: f64,
}

impl Default for GradientDescent {
    fn default() -> Self {
        Self::from_config(&OptimizerConfig::default())
    }
}

impl GradientDescent {
    pub fn new(learning_rate: Complex64, max_norm: f64) -> Self {
        Self {
            learning_rate,
            max_norm,
        }
    }

    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new(config.learning_rate, config.max_norm)
    }

    /// 집합 내 모든 변수, 모든 그래디언트 원소에 대한 L2 노름
    ///
    /// 최대 성분으로 나눈 뒤 제곱합을 구하므로 원소가 모두 유한하면 결과도
    /// (f64 범위 안에서) 유한하다. 유한하지 않은 원소가 있으면 inf 또는 NaN.
    pub fn gradient_norm(set: &ComplexMatrixSet) -> f64 {
        let peak = set
            .iter()
            .map(|v| v.gradient_peak())
            .fold(0.0_f64, |peak, x| if peak.is_nan() || x.is_nan() { f64::NAN } else { peak.max(x) });
        if peak == 0.0 || !peak.is_finite() {
            return peak;
        }
        let scaled: f64 = set.iter().map(|v| v.scaled_gradient_norm_sqr(peak)).sum();
        peak * scaled.sqrt()
    }

    /// 전역 클리핑 스케일
    pub fn clip_scale(norm: f64, max_norm: f64) -> f64 {
        if norm > max_norm {
            max_norm / norm
        } else {
            1.0
        }
    }

    /// value[l] -= η · gradient[l] · scale
    ///
    /// 그래디언트는 직전 `CostGraph::gradient()` 호출 결과여야 한다.
    pub fn step(&self, set: &mut ComplexMatrixSet) -> StepReport {
        let gradient_norm = Self::gradient_norm(set);
        let scale = Self::clip_scale(gradient_norm, self.max_norm);
        let scaling = Complex64::new(scale, 0.0);

        for variable in set.iter_mut() {
            let (values, gradients) = variable.values_and_gradients_mut();
            for (value, gradient) in values.iter_mut().zip(gradients) {
                *value -= self.learning_rate * gradient * scaling;
            }
        }

        StepReport {
            gradient_norm,
            scale,
        }
    }
}
