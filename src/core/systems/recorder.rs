//! # 프로브 시계열 기록기
//!
//! 반복마다 (iteration, value) 점을 추가만 하는 시계열. 렌더링은 범위 밖이며,
//! 기록된 시계열은 JSON 으로 내보낸다.

use crate::core::error::{Result, TrainingError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 비용 크기 시계열 라벨
pub const COST_ABS: &str = "cost";
/// 비용 위상 시계열 라벨
pub const COST_PHASE: &str = "phase";
/// 그래디언트 노름 발산 라벨 (시계열로는 기록하지 않음)
pub const GRADIENT_NORM: &str = "gradient_norm";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub iteration: usize,
    pub value: f64,
}

/// 추가 전용 시계열
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeSeries {
    pub label: String,
    points: Vec<SeriesPoint>,
}

impl ProbeSeries {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            points: Vec::with_capacity(8),
        }
    }

    /// 반복 번호가 감소하지 않는 순서로만 추가
    pub fn push(&mut self, iteration: usize, value: f64) -> Result<()> {
        if let Some(last) = self.points.last() {
            if iteration < last.iteration {
                return Err(TrainingError::SeriesOrder {
                    label: self.label.clone(),
                    last: last.iteration,
                    got: iteration,
                });
            }
        }
        self.points.push(SeriesPoint { iteration, value });
        Ok(())
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// 라벨 → 시계열, 등록 순서 유지
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesRecorder {
    series: Vec<ProbeSeries>,
}

impl SeriesRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 라벨 목록으로 빈 시계열들을 미리 만든다 (중복 라벨은 한 번만)
    pub fn with_labels<'a, I: IntoIterator<Item = &'a str>>(labels: I) -> Self {
        let mut recorder = Self::new();
        for label in labels {
            recorder.ensure(label);
        }
        recorder
    }

    pub fn push(&mut self, label: &str, iteration: usize, value: f64) -> Result<()> {
        self.ensure(label).push(iteration, value)
    }

    pub fn get(&self, label: &str) -> Option<&ProbeSeries> {
        self.series.iter().find(|s| s.label == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProbeSeries> {
        self.series.iter()
    }

    /// 모든 시계열 점 개수 합
    pub fn total_points(&self) -> usize {
        self.series.iter().map(ProbeSeries::len).sum()
    }

    /// `<dir>/<prefix>_series.json` 으로 저장하고 경로를 반환
    pub fn export_json(&self, dir: &Path, prefix: &str) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}_series.json", prefix));
        let json_string = serde_json::to_string_pretty(self)?;
        fs::write(&path, json_string)?;
        Ok(path)
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn ensure(&mut self, label: &str) -> &mut ProbeSeries {
        let index = match self.series.iter().position(|s| s.label == label) {
            Some(index) => index,
            None => {
                self.series.push(ProbeSeries::new(label));
                self.series.len() - 1
            }
        };
        &mut self.series[index]
    }
}
