//! # 학습 루프
//!
//! 반복마다 그래디언트 초기화 → 비용 그래프 순전파/역전파 → 경사하강 스텝 →
//! 그래디언트 노름 검사 → 행렬식 프로브 → 비용 검사 → 시계열 기록 순서로 진행한다.

use super::config::UnitConfig;
use super::divergence::{DivergenceGuard, Verdict};
use super::recorder::{SeriesRecorder, COST_ABS, COST_PHASE, GRADIENT_NORM};
use super::state_management::{DivergenceReport, LoopState, UnitSummary};
use crate::core::differential::CostGraph;
use crate::core::error::{Result, TrainingError};
use crate::core::math::{determinant, MAX_DIM};
use crate::core::matrix::ComplexMatrixSet;
use crate::core::optimizers::{GradientDescent, StepReport};
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// 변수 인덱스까지 해석된 행렬식 프로브
#[derive(Debug, Clone)]
struct ResolvedProbe {
    label: String,
    variable: usize,
}

/// `tick()` 한 번의 결과
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// 반복 하나 완료
    Advanced {
        iteration: usize,
        cost: Complex64,
        /// 이번 반복에 기록된 |cost|
        magnitude: f64,
        step: StepReport,
    },
    /// 이번 틱에서 반복 예산이 이미 소진됨
    Completed,
    /// 이번 틱에서 발산 감지
    Diverged(DivergenceReport),
    /// 이미 종료 상태라 아무것도 하지 않음
    Halted,
}

impl TickOutcome {
    /// 이번 틱에 기록된 비용 크기 (결합 판단용)
    pub fn cost_magnitude(&self) -> Option<f64> {
        match self {
            TickOutcome::Advanced { magnitude, .. } => Some(*magnitude),
            _ => None,
        }
    }
}

/// 학습 유닛 하나: 변수 집합 + 비용 그래프 + 프로브 시계열 + 반복 카운터
#[derive(Debug, Clone)]
pub struct TrainingLoop {
    id: usize,
    set: ComplexMatrixSet,
    graph: CostGraph,
    optimizer: GradientDescent,
    probes: Vec<ResolvedProbe>,
    recorder: SeriesRecorder,
    dimension: usize,
    iteration: usize,
    budget: usize,
    state: LoopState,
    last_cost: Option<Complex64>,
}

impl TrainingLoop {
    /// Init: 시드 고정 난수로 변수 초기화, 비용 그래프 구성, Running 진입
    pub fn new(id: usize, seed: u64, config: &UnitConfig) -> Result<Self> {
        let mut set = Self::build_set(config)?;
        let mut rng = StdRng::seed_from_u64(seed);
        set.initialize_random(&mut rng, config.init_low, config.init_high)?;
        Self::with_initialized_set(id, set, config)
    }

    /// 설정의 변수 이름과 차원으로 0 초기화된 집합 생성
    pub fn build_set(config: &UnitConfig) -> Result<ComplexMatrixSet> {
        let n = config.dimension;
        if n == 0 || n > MAX_DIM {
            return Err(TrainingError::InvalidDimension { n, max: MAX_DIM });
        }

        let mut set = ComplexMatrixSet::new();
        for name in &config.variables {
            set.add(name, n, n)?;
        }
        Ok(set)
    }

    /// 이미 값이 채워진 집합으로 유닛 구성
    pub fn with_initialized_set(id: usize, set: ComplexMatrixSet, config: &UnitConfig) -> Result<Self> {
        if !set.is_initialized() {
            return Err(TrainingError::NotInitialized);
        }
        let n = config.dimension;
        if set.shape() != Some((n, n)) {
            return Err(TrainingError::ShapeMismatch {
                expected: (n, n),
                actual: set.shape().unwrap_or((0, 0)),
            });
        }

        let names = [
            config.variables[0].as_str(),
            config.variables[1].as_str(),
            config.variables[2].as_str(),
        ];
        let graph = CostGraph::trifecta(&set, names)?;

        let mut probes: Vec<ResolvedProbe> = Vec::new();
        for target in config.probe_mapping.targets(&config.variables)? {
            let reserved = [COST_ABS, COST_PHASE, GRADIENT_NORM].contains(&target.label.as_str());
            if reserved || probes.iter().any(|p| p.label == target.label) {
                return Err(TrainingError::DuplicateProbeLabel(target.label));
            }
            let variable = set.index_of(&target.variable)?;
            probes.push(ResolvedProbe {
                label: target.label,
                variable,
            });
        }

        let mut labels = vec![COST_ABS, COST_PHASE];
        labels.extend(probes.iter().map(|p| p.label.as_str()));
        let recorder = SeriesRecorder::with_labels(labels);

        let mut training = Self {
            id,
            set,
            graph,
            optimizer: GradientDescent::from_config(&config.optimizer),
            probes,
            recorder,
            dimension: n,
            iteration: 0,
            budget: config.iterations,
            state: LoopState::Init,
            last_cost: None,
        };
        training.state = LoopState::Running;
        log::info!(
            "유닛 {} 시작: {}×{} 변수 {}개, 예산 {} 반복",
            id,
            n,
            n,
            training.set.len(),
            training.budget
        );
        Ok(training)
    }

    /// 반복 하나 수행. 종료 상태에서는 아무것도 바꾸지 않는다.
    ///
    /// 계산 그래프 오류는 `Err`로 전파되며 복구하지 않는다.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        if !self.state.is_running() {
            return Ok(TickOutcome::Halted);
        }
        if self.iteration >= self.budget {
            self.state = LoopState::Completed;
            return Ok(TickOutcome::Completed);
        }

        let t = self.iteration;
        self.set.zero_gradients();
        let cost = self.graph.gradient(&mut self.set)?;
        let step = self.optimizer.step(&mut self.set);
        let norm = Complex64::new(step.gradient_norm, 0.0);
        if DivergenceGuard::check(norm).is_stop() {
            return Ok(self.diverge(t, GRADIENT_NORM.to_string(), norm));
        }

        for index in 0..self.probes.len() {
            let variable = self.probes[index].variable;
            let values = self
                .set
                .variable(variable)
                .ok_or_else(|| TrainingError::NotFound(format!("변수 인덱스 {}", variable)))?
                .values();
            let det = determinant(values, self.dimension)?;
            match DivergenceGuard::check(det) {
                Verdict::Continue { magnitude } => {
                    self.recorder.push(&self.probes[index].label, t, magnitude)?;
                }
                Verdict::Stop => {
                    let label = self.probes[index].label.clone();
                    return Ok(self.diverge(t, label, det));
                }
            }
        }

        let magnitude = match DivergenceGuard::check(cost) {
            Verdict::Continue { magnitude } => magnitude,
            Verdict::Stop => return Ok(self.diverge(t, COST_ABS.to_string(), cost)),
        };
        self.recorder.push(COST_ABS, t, magnitude)?;
        self.recorder.push(COST_PHASE, t, cost.arg())?;

        log::debug!(
            "유닛 {} 반복 {}: |cost|={:.6e}, 노름={:.4}, 스케일={:.4}",
            self.id,
            t,
            magnitude,
            step.gradient_norm,
            step.scale
        );

        self.iteration += 1;
        self.last_cost = Some(cost);
        if self.iteration >= self.budget {
            self.state = LoopState::Completed;
            log::info!("유닛 {} 완료: {} 반복", self.id, self.iteration);
        }

        Ok(TickOutcome::Advanced {
            iteration: t,
            cost,
            magnitude,
            step,
        })
    }

    /// 종료 상태에 도달할 때까지 반복
    pub fn run(&mut self) -> Result<&LoopState> {
        while self.state.is_running() {
            self.tick()?;
        }
        Ok(&self.state)
    }

    fn diverge(&mut self, iteration: usize, probe: String, value: Complex64) -> TickOutcome {
        let error = TrainingError::NonFiniteProbe {
            probe: probe.clone(),
            iteration,
        };
        log::warn!("유닛 {} 발산: {} (값 {})", self.id, error, value);
        let report = DivergenceReport {
            iteration,
            probe,
            value,
        };
        self.state = LoopState::Diverged(report.clone());
        TickOutcome::Diverged(report)
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    /// 완료된 반복 수 (다음 반복 번호)
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn set(&self) -> &ComplexMatrixSet {
        &self.set
    }

    pub fn set_mut(&mut self) -> &mut ComplexMatrixSet {
        &mut self.set
    }

    pub fn recorder(&self) -> &SeriesRecorder {
        &self.recorder
    }

    pub fn last_cost(&self) -> Option<Complex64> {
        self.last_cost
    }

    pub fn probe_labels(&self) -> Vec<&str> {
        self.probes.iter().map(|p| p.label.as_str()).collect()
    }

    pub fn summary(&self) -> UnitSummary {
        UnitSummary {
            id: self.id,
            state: self.state.clone(),
            iterations: self.iteration,
            budget: self.budget,
            final_cost: self.last_cost,
        }
    }
}
