//! # 이중 유닛 결합 제어기
//!
//! 두 학습 루프를 한 틱에 한 반복씩 같은 보폭으로 진행시키고, 한 유닛의 비용 크기가
//! 임계값을 넘으면 지정된 변수를 상대 유닛 쪽으로 평균 결합한다.
//!
//! 두 유닛의 변수 집합은 서로 공유되지 않으므로 틱 내부 진행은 병렬로 수행하고,
//! 결합은 양쪽 결과가 모두 나온 뒤 호출 스레드에서 결합 전 스냅샷으로 수행한다.

use super::config::ExperimentConfig;
use super::state_management::UnitSummary;
use super::training_loop::{TickOutcome, TrainingLoop};
use crate::core::error::{Result, TrainingError};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// target[i] = (target[i] + source[i]) / 2
///
/// 숨은 상태가 없는 순수 함수. source 는 변경하지 않는다.
pub fn fuse_average(target: &mut [Complex64], source: &[Complex64]) -> Result<()> {
    if target.len() != source.len() {
        return Err(TrainingError::ShapeMismatch {
            expected: (target.len(), 1),
            actual: (source.len(), 1),
        });
    }
    for (t, s) in target.iter_mut().zip(source) {
        *t = (*t + *s) / 2.0;
    }
    Ok(())
}

/// 결합 한 건: source 유닛의 비용이 임계값을 넘어 target 유닛의 변수가 평균됨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionEvent {
    pub tick: usize,
    pub source: usize,
    pub target: usize,
}

/// 틱 한 번의 결과
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: usize,
    pub outcomes: [TickOutcome; 2],
    pub fusions: Vec<FusionEvent>,
}

#[derive(Debug, Clone)]
pub struct CouplingController {
    units: [TrainingLoop; 2],
    threshold: f64,
    fused_variable: String,
    parallel: bool,
    budget: usize,
    tick: usize,
    events: Vec<FusionEvent>,
}

impl CouplingController {
    /// 설정의 두 시드로 두 유닛을 만들어 결합
    pub fn new(config: &ExperimentConfig) -> Result<Self> {
        let unit0 = TrainingLoop::new(0, config.seeds[0], &config.unit)?;
        let unit1 = TrainingLoop::new(1, config.seeds[1], &config.unit)?;
        Self::from_units(
            unit0,
            unit1,
            config.fusion_threshold,
            &config.fused_variable,
            config.parallel_ticks,
        )
    }

    pub fn from_units(
        unit0: TrainingLoop,
        unit1: TrainingLoop,
        threshold: f64,
        fused_variable: &str,
        parallel: bool,
    ) -> Result<Self> {
        let len0 = unit0.set().get(fused_variable)?.len();
        let len1 = unit1.set().get(fused_variable)?.len();
        if len0 != len1 {
            return Err(TrainingError::ShapeMismatch {
                expected: (len0, 1),
                actual: (len1, 1),
            });
        }

        let budget = unit0.budget().max(unit1.budget());
        Ok(Self {
            units: [unit0, unit1],
            threshold,
            fused_variable: fused_variable.to_string(),
            parallel,
            budget,
            tick: 0,
            events: Vec::new(),
        })
    }

    /// 두 유닛을 한 반복씩 진행한 뒤 결합 판단
    ///
    /// 두 결합 모두 틱 시작 시점(결합 전)의 값을 사용하므로 적용 순서에 무관하다.
    pub fn tick(&mut self) -> Result<TickReport> {
        let [unit0, unit1] = &mut self.units;
        let (r0, r1) = if self.parallel {
            rayon::join(|| unit0.tick(), || unit1.tick())
        } else {
            (unit0.tick(), unit1.tick())
        };
        let outcomes = [r0?, r1?];

        // 결합 전 스냅샷
        let snapshots = [
            self.units[0].set().get(&self.fused_variable)?.values().to_vec(),
            self.units[1].set().get(&self.fused_variable)?.values().to_vec(),
        ];

        let mut fusions = Vec::new();
        for (source, target) in [(0usize, 1usize), (1, 0)] {
            let fired = outcomes[source]
                .cost_magnitude()
                .map_or(false, |m| m > self.threshold);
            let receiving = outcomes[target].cost_magnitude().is_some();
            if !(fired && receiving) {
                continue;
            }

            let variable = self.units[target].set_mut().get_mut(&self.fused_variable)?;
            fuse_average(variable.values_mut(), &snapshots[source])?;

            log::warn!(
                "틱 {}: 유닛 {} 비용이 임계값 {} 초과, 유닛 {}의 '{}' 결합",
                self.tick,
                source,
                self.threshold,
                target,
                self.fused_variable
            );
            let event = FusionEvent {
                tick: self.tick,
                source,
                target,
            };
            fusions.push(event);
            self.events.push(event);
        }

        let report = TickReport {
            tick: self.tick,
            outcomes,
            fusions,
        };
        self.tick += 1;
        Ok(report)
    }

    /// 두 유닛 모두 종료되었거나 예산만큼 틱을 진행했으면 끝
    pub fn is_finished(&self) -> bool {
        self.tick >= self.budget || self.units.iter().all(|u| u.state().is_terminal())
    }

    pub fn run(&mut self) -> Result<Vec<UnitSummary>> {
        while !self.is_finished() {
            self.tick()?;
        }
        Ok(self.summaries())
    }

    pub fn summaries(&self) -> Vec<UnitSummary> {
        self.units.iter().map(TrainingLoop::summary).collect()
    }

    pub fn unit(&self, index: usize) -> Option<&TrainingLoop> {
        self.units.get(index)
    }

    pub fn unit_mut(&mut self, index: usize) -> Option<&mut TrainingLoop> {
        self.units.get_mut(index)
    }

    pub fn units(&self) -> &[TrainingLoop; 2] {
        &self.units
    }

    pub fn events(&self) -> &[FusionEvent] {
        &self.events
    }

    pub fn ticks(&self) -> usize {
        self.tick
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}
