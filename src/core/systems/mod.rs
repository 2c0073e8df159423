//! # 학습 시스템 모듈
//!
//! 학습 루프, 발산 감지, 이중 유닛 결합, 시계열 기록과 실험 설정

pub mod config;
pub mod divergence;
pub mod recorder;
pub mod state_management;
pub mod training_loop;
pub mod coupling;
pub mod report;

// 설정 관련 재수출
pub use config::{ExperimentConfig, ProbeMapping, ProbeTarget, UnitConfig};

// 발산 감지 재수출
pub use divergence::{DivergenceGuard, Verdict};

// 시계열 재수출
pub use recorder::{ProbeSeries, SeriesPoint, SeriesRecorder, COST_ABS, COST_PHASE, GRADIENT_NORM};

// 상태 관리 재수출
pub use state_management::{DivergenceReport, LoopState, UnitSummary};

// 학습 루프 / 결합 재수출
pub use training_loop::{TickOutcome, TrainingLoop};
pub use coupling::{fuse_average, CouplingController, FusionEvent, TickReport};
pub use report::RunReport;

// 테스트 모듈들
#[cfg(test)]
pub mod __tests__;
