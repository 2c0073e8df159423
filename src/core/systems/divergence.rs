//! # 발산 감지기
//!
//! 프로브 값(비용, 행렬식)이 무한대이거나 유한하지 않으면 학습 중단을 알린다.

use num_complex::Complex64;

/// 감지 결과
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// 계속 진행, 기록할 크기 |value|
    Continue { magnitude: f64 },
    Stop,
}

impl Verdict {
    pub fn is_stop(&self) -> bool {
        matches!(self, Verdict::Stop)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DivergenceGuard;

impl DivergenceGuard {
    /// 실수부/허수부 중 하나라도 무한대이거나, 크기가 유한하지 않으면 Stop
    pub fn check(value: Complex64) -> Verdict {
        if value.re.is_infinite() || value.im.is_infinite() {
            return Verdict::Stop;
        }
        let magnitude = value.norm();
        if !magnitude.is_finite() {
            return Verdict::Stop;
        }
        Verdict::Continue { magnitude }
    }
}
