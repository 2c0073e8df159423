//! # 학습 상태 관리
//!
//! 학습 루프 상태 기계: Init → Running → {Completed | Diverged}

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// 발산 시점 기록
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivergenceReport {
    /// 발산이 감지된 반복 번호
    pub iteration: usize,
    /// 처음 Stop을 보고한 프로브 라벨
    pub probe: String,
    /// 문제의 프로브 값
    pub value: Complex64,
}

/// 학습 루프 상태
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LoopState {
    /// 생성 직후
    Init,
    /// 학습 중
    Running,
    /// 반복 예산 소진
    Completed,
    /// 발산 (종료 상태, Running으로 돌아가지 않음)
    Diverged(DivergenceReport),
}

impl LoopState {
    pub fn is_running(&self) -> bool {
        matches!(self, LoopState::Running)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopState::Completed | LoopState::Diverged(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoopState::Init => "init",
            LoopState::Running => "running",
            LoopState::Completed => "completed",
            LoopState::Diverged(_) => "diverged",
        }
    }
}

/// 유닛 하나의 실행 요약 (보고서 직렬화용)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSummary {
    pub id: usize,
    pub state: LoopState,
    /// 완료된 반복 수
    pub iterations: usize,
    pub budget: usize,
    /// 마지막으로 기록된 비용
    pub final_cost: Option<Complex64>,
}
