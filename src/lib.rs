//! Trifecta: 복소 행렬 삼중 일관성 학습 라이브러리
//!
//! 세 복소 행렬 a, b, c 를 `b·c ≈ a`, `a·c ≈ b`, `a·b ≈ c` 가 되도록 경사하강으로
//! 학습하면서 행렬식 프로브로 수치적 퇴화를 감시하고, 두 유닛을 임계값 기반
//! 결합으로 연결한다.

pub mod core;

// 핵심 모듈들 재수출
pub use core::{
    // 변수 및 비용 그래프
    ComplexMatrixSet, Variable, CostGraph, TapeOp,
    // 수치 도구
    determinant, GradientDescent, OptimizerConfig,
    // 학습 시스템
    TrainingLoop, TickOutcome, LoopState, DivergenceGuard, DivergenceReport, Verdict,
    CouplingController, FusionEvent, ExperimentConfig, UnitConfig, ProbeMapping,
    SeriesRecorder, UnitSummary, RunReport, COST_ABS, COST_PHASE, GRADIENT_NORM,
    // 오류
    TrainingError, Result,
};

// 편의 타입 별칭들
pub type Complex = num_complex::Complex64;
