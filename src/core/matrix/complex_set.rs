//! # 복소 행렬 변수 집합
//!
//! 이름이 붙은 복소 행렬 변수(계산 그래프의 잎)와 그래디언트 버퍼를 소유

use crate::core::error::{Result, TrainingError};
use num_complex::Complex64;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// 이름이 붙은 복소 행렬 + 같은 형태의 그래디언트 버퍼 (row-major)
///
/// 두 버퍼의 길이는 항상 rows * cols 이다. 외부에는 슬라이스로만 노출한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub rows: usize,
    pub cols: usize,
    values: Vec<Complex64>,
    gradients: Vec<Complex64>,
}

impl Variable {
    pub fn new(name: &str, rows: usize, cols: usize) -> Self {
        Self {
            name: name.to_string(),
            rows,
            cols,
            values: vec![ZERO; rows * cols],
            gradients: vec![ZERO; rows * cols],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn values(&self) -> &[Complex64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [Complex64] {
        &mut self.values
    }

    pub fn gradients(&self) -> &[Complex64] {
        &self.gradients
    }

    pub fn gradients_mut(&mut self) -> &mut [Complex64] {
        &mut self.gradients
    }

    /// 값 버퍼(쓰기)와 그래디언트 버퍼(읽기)를 동시에 빌림
    pub fn values_and_gradients_mut(&mut self) -> (&mut [Complex64], &[Complex64]) {
        (&mut self.values, &self.gradients)
    }

    /// 값 버퍼 전체 교체. 길이가 다르면 ShapeMismatch
    pub fn set_values(&mut self, values: &[Complex64]) -> Result<()> {
        if values.len() != self.values.len() {
            return Err(TrainingError::ShapeMismatch {
                expected: self.shape(),
                actual: (values.len(), 1),
            });
        }
        self.values.copy_from_slice(values);
        Ok(())
    }

    /// 그래디언트 성분(실수부/허수부) 절댓값의 최댓값. NaN 이 있으면 NaN
    pub fn gradient_peak(&self) -> f64 {
        self.gradients
            .iter()
            .flat_map(|g| [g.re.abs(), g.im.abs()])
            .fold(0.0_f64, |peak, x| if peak.is_nan() || x.is_nan() { f64::NAN } else { peak.max(x) })
    }

    /// Σ |g / scale|² (오버플로 없는 전역 노름 계산용)
    pub fn scaled_gradient_norm_sqr(&self, scale: f64) -> f64 {
        self.gradients.iter().map(|g| (*g / scale).norm_sqr()).sum()
    }
}

/// 변수 이름 → 변수의 순서 있는 매핑
///
/// 삽입 순서를 유지하며 (관례상 `a`, `b`, `c`), 모든 변수는 같은 형태를 공유한다.
#[derive(Debug, Clone, Default)]
pub struct ComplexMatrixSet {
    variables: Vec<Variable>,
    by_name: HashMap<String, usize>,
    initialized: bool,
}

impl ComplexMatrixSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 0으로 초기화된 변수 등록, 등록 순서의 인덱스를 반환
    pub fn add(&mut self, name: &str, rows: usize, cols: usize) -> Result<usize> {
        if self.by_name.contains_key(name) {
            return Err(TrainingError::DuplicateName(name.to_string()));
        }
        if let Some(first) = self.variables.first() {
            if first.shape() != (rows, cols) {
                return Err(TrainingError::ShapeMismatch {
                    expected: first.shape(),
                    actual: (rows, cols),
                });
            }
        }

        let index = self.variables.len();
        self.variables.push(Variable::new(name, rows, cols));
        self.by_name.insert(name.to_string(), index);
        Ok(index)
    }

    /// 모든 값 버퍼를 실수부/허수부 각각 독립적인 균등분포 [low, high)에서 채움
    ///
    /// 학습 시작 전 정확히 한 번 호출되어야 한다.
    pub fn initialize_random<R: Rng + ?Sized>(&mut self, rng: &mut R, low: f64, high: f64) -> Result<()> {
        if self.initialized {
            return Err(TrainingError::AlreadyInitialized);
        }

        let span = high - low;
        for variable in &mut self.variables {
            for value in variable.values.iter_mut() {
                // 실수부를 먼저, 허수부를 나중에 뽑는다 (시드 재현성)
                let re = span * rng.gen::<f64>() + low;
                let im = span * rng.gen::<f64>() + low;
                *value = Complex64::new(re, im);
            }
        }
        self.initialized = true;
        Ok(())
    }

    /// 외부에서 값을 직접 채운 집합을 초기화된 것으로 표시
    pub fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// 모든 그래디언트 버퍼를 0+0i로 리셋
    pub fn zero_gradients(&mut self) {
        for variable in &mut self.variables {
            variable.gradients.fill(ZERO);
        }
    }

    pub fn get(&self, name: &str) -> Result<&Variable> {
        let index = self.index_of(name)?;
        Ok(&self.variables[index])
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Variable> {
        let index = self.index_of(name)?;
        Ok(&mut self.variables[index])
    }

    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| TrainingError::NotFound(name.to_string()))
    }

    /// 등록 순서 인덱스로 접근
    pub fn variable(&self, index: usize) -> Option<&Variable> {
        self.variables.get(index)
    }

    pub fn variable_mut(&mut self, index: usize) -> Option<&mut Variable> {
        self.variables.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Variable> {
        self.variables.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// 공유 형태 (변수가 없으면 None)
    pub fn shape(&self) -> Option<(usize, usize)> {
        self.variables.first().map(Variable::shape)
    }
}
