//! # 실행 보고서
//!
//! 유닛별 시계열 JSON 과 실행 요약(summary.json)을 출력 디렉토리에 쓴다.

use super::coupling::{CouplingController, FusionEvent};
use super::state_management::UnitSummary;
use super::training_loop::TrainingLoop;
use crate::core::error::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// RFC-3339 생성 시각
    pub generated_at: String,
    /// "single" 또는 "dual"
    pub mode: String,
    pub fusion_threshold: Option<f64>,
    pub units: Vec<UnitSummary>,
    pub fusion_events: Vec<FusionEvent>,
}

impl RunReport {
    pub fn single(unit: &TrainingLoop) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            mode: "single".to_string(),
            fusion_threshold: None,
            units: vec![unit.summary()],
            fusion_events: Vec::new(),
        }
    }

    pub fn dual(controller: &CouplingController) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            mode: "dual".to_string(),
            fusion_threshold: Some(controller.threshold()),
            units: controller.summaries(),
            fusion_events: controller.events().to_vec(),
        }
    }

    /// 보고서와 각 유닛의 시계열을 저장하고 쓰인 파일 경로들을 반환
    pub fn export(&self, dir: &Path, units: &[&TrainingLoop]) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(units.len() + 1);
        for unit in units {
            let prefix = format!("unit{}", unit.id());
            written.push(unit.recorder().export_json(dir, &prefix)?);
        }

        let path = dir.join("summary.json");
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        written.push(path);
        Ok(written)
    }
}
