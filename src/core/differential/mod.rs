//! # 복소 행렬 미분 시스템
//!
//! Multiply / Quadratic / Average / Add 네 가지 연산만 다루는 작은 테이프 기반
//! 역방향 자동미분

pub mod cost_graph;

// 핵심 타입들 재수출
pub use cost_graph::{CostGraph, NodeId, TapeOp};
