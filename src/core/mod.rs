//! # 삼중 일관성 학습 핵심 모듈
//!
//! 복소 행렬 변수, 비용 그래프, 경사하강, 행렬식 프로브, 학습 루프와 이중 유닛 결합

pub mod error;
pub mod matrix;
pub mod math;
pub mod differential;
pub mod optimizers;
pub mod systems;

// 주요 타입들 재수출
pub use error::{Result, TrainingError};
pub use matrix::*;
pub use math::*;
pub use differential::*;
pub use optimizers::{GradientDescent, OptimizerConfig, StepReport};
pub use systems::{
    fuse_average, CouplingController, DivergenceGuard, DivergenceReport, ExperimentConfig,
    FusionEvent, LoopState, ProbeMapping, ProbeSeries, ProbeTarget, RunReport, SeriesPoint,
    SeriesRecorder, TickOutcome, TickReport, TrainingLoop, UnitConfig, UnitSummary, Verdict,
    COST_ABS, COST_PHASE, GRADIENT_NORM,
};
