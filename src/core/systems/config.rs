//! # 실험 구성 설정
//!
//! 행렬 차원, 학습률, 반복 예산, 시드, 결합 임계값 등 고정 상수들을 모은 설정.
//! 기본값은 기준 실험 구성이며, JSON 파일과 CLI 플래그로 덮어쓸 수 있다.

use crate::core::error::{Result, TrainingError};
use crate::core::optimizers::OptimizerConfig;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

/// 행렬식 프로브 하나: 시계열 라벨 ← 변수 이름
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeTarget {
    pub label: String,
    pub variable: String,
}

impl ProbeTarget {
    pub fn new(label: &str, variable: &str) -> Self {
        Self {
            label: label.to_string(),
            variable: variable.to_string(),
        }
    }
}

/// 행렬식 프로브 대상 매핑
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeMapping {
    /// 관측된 동작 그대로: det_c 도 두 번째 변수를 읽는다
    Legacy,
    /// det_a, det_b, det_c 가 각각 다른 변수를 읽는다
    Distinct,
    Custom(Vec<ProbeTarget>),
}

impl ProbeMapping {
    /// 변수 이름 목록(등록 순서)에 대해 프로브 목록을 구체화
    pub fn targets(&self, variables: &[String]) -> Result<Vec<ProbeTarget>> {
        let name = |index: usize| -> Result<&str> {
            variables
                .get(index)
                .map(String::as_str)
                .ok_or_else(|| TrainingError::NotFound(format!("변수 인덱스 {}", index)))
        };

        match self {
            ProbeMapping::Legacy => Ok(vec![
                ProbeTarget::new("det_a", name(0)?),
                ProbeTarget::new("det_b", name(1)?),
                ProbeTarget::new("det_c", name(1)?),
            ]),
            ProbeMapping::Distinct => Ok(vec![
                ProbeTarget::new("det_a", name(0)?),
                ProbeTarget::new("det_b", name(1)?),
                ProbeTarget::new("det_c", name(2)?),
            ]),
            ProbeMapping::Custom(targets) => Ok(targets.clone()),
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "legacy" => Some(ProbeMapping::Legacy),
            "distinct" => Some(ProbeMapping::Distinct),
            _ => None,
        }
    }
}

/// 학습 유닛 하나의 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitConfig {
    /// 정사각 행렬 차원 N
    pub dimension: usize,
    /// 변수 이름 (등록 순서, 비용 식의 a, b, c)
    pub variables: [String; 3],
    /// 초기화 균등분포 하한
    pub init_low: f64,
    /// 초기화 균등분포 상한
    pub init_high: f64,
    /// 반복 예산
    pub iterations: usize,
    pub optimizer: OptimizerConfig,
    pub probe_mapping: ProbeMapping,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            dimension: 3,
            variables: ["a".to_string(), "b".to_string(), "c".to_string()],
            init_low: -1.0,
            init_high: 1.0,
            iterations: 1024,
            optimizer: OptimizerConfig::default(),
            probe_mapping: ProbeMapping::Legacy,
        }
    }
}

/// 전체 실험 설정 (단일/이중 유닛 공통)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub unit: UnitConfig,
    /// 유닛별 시드 (unit0, unit1). 단일 유닛 구성은 첫 번째만 사용
    pub seeds: [u64; 2],
    /// 비용 크기가 이 값을 넘으면 결합 발생
    pub fusion_threshold: f64,
    /// 평균으로 결합되는 변수 이름
    pub fused_variable: String,
    /// 한 틱 안에서 두 유닛을 병렬로 진행
    pub parallel_ticks: bool,
    /// 시계열/요약 출력 디렉토리
    pub output_dir: PathBuf,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            unit: UnitConfig::default(),
            seeds: [1, 2],
            fusion_threshold: 128.0,
            fused_variable: "a".to_string(),
            parallel_ticks: true,
            output_dir: PathBuf::from("./output"),
        }
    }
}

impl ExperimentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// JSON 파일에서 로드 (누락된 필드는 기본값)
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.unit.iterations = iterations;
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.unit.dimension = dimension;
        self
    }

    pub fn with_seeds(mut self, seeds: [u64; 2]) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn with_optimizer(mut self, optimizer: OptimizerConfig) -> Self {
        self.unit.optimizer = optimizer;
        self
    }

    pub fn with_probe_mapping(mut self, mapping: ProbeMapping) -> Self {
        self.unit.probe_mapping = mapping;
        self
    }

    pub fn with_fusion_threshold(mut self, threshold: f64) -> Self {
        self.fusion_threshold = threshold;
        self
    }

    pub fn with_parallel_ticks(mut self, parallel: bool) -> Self {
        self.parallel_ticks = parallel;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }
}
