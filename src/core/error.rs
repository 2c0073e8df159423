//! # 학습 오류 타입
//!
//! 설정 단계의 오용, 발산 감지, 계산 그래프 실패를 하나의 열거형으로 표현

use thiserror::Error;

/// 라이브러리 전역 결과 타입
pub type Result<T> = std::result::Result<T, TrainingError>;

#[derive(Debug, Error)]
pub enum TrainingError {
    /// 같은 이름의 변수가 이미 등록됨
    #[error("변수 '{0}'가 이미 존재합니다")]
    DuplicateName(String),

    /// 이름으로 변수를 찾지 못함
    #[error("변수 '{0}'를 찾을 수 없습니다")]
    NotFound(String),

    /// 집합 내 모든 변수는 같은 (rows, cols)를 가져야 함
    #[error("형태 불일치: 기대 {expected:?}, 실제 {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// 프로브 라벨은 서로 달라야 하며 비용/위상/노름 라벨과 겹칠 수 없음
    #[error("프로브 라벨 '{0}'가 중복되었거나 예약된 라벨입니다")]
    DuplicateProbeLabel(String),

    #[error("무작위 초기화는 한 번만 허용됩니다")]
    AlreadyInitialized,

    #[error("변수 집합이 아직 초기화되지 않았습니다")]
    NotInitialized,

    /// 행렬식은 1 ≤ n ≤ max 범위에서만 정의
    #[error("지원하지 않는 행렬 차원 {n} (허용 범위 1..={max})")]
    InvalidDimension { n: usize, max: usize },

    /// 발산 감지기가 유한하지 않은 프로브 값을 보고함
    #[error("반복 {iteration}에서 프로브 '{probe}'가 유한하지 않음")]
    NonFiniteProbe { probe: String, iteration: usize },

    /// 계산 그래프(순전파/역전파) 실패: 프로세스 전체에 치명적
    #[error("계산 그래프 오류: {0}")]
    Collaborator(String),

    /// 시계열은 반복 번호가 감소하지 않는 순서로만 추가 가능
    #[error("시계열 '{label}' 순서 위반: 마지막 {last}, 입력 {got}")]
    SeriesOrder { label: String, last: usize, got: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
