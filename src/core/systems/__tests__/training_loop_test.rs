use crate::core::error::TrainingError;
use crate::core::matrix::ComplexMatrixSet;
use crate::core::systems::{
    LoopState, ProbeMapping, ProbeTarget, TickOutcome, TrainingLoop, UnitConfig, COST_ABS,
    COST_PHASE, GRADIENT_NORM,
};
use num_complex::Complex64;

fn short_config(iterations: usize) -> UnitConfig {
    UnitConfig {
        iterations,
        ..UnitConfig::default()
    }
}

fn scaled_identity_set(n: usize, scale: f64) -> ComplexMatrixSet {
    let mut set = ComplexMatrixSet::new();
    for name in ["a", "b", "c"] {
        set.add(name, n, n).unwrap();
        let variable = set.get_mut(name).unwrap();
        for i in 0..n {
            variable.values_mut()[i * n + i] = Complex64::new(scale, 0.0);
        }
    }
    set.mark_initialized();
    set
}

fn identity_set(n: usize) -> ComplexMatrixSet {
    let mut set = ComplexMatrixSet::new();
    for name in ["a", "b", "c"] {
        set.add(name, n, n).unwrap();
        let variable = set.get_mut(name).unwrap();
        for i in 0..n {
            variable.values_mut()[i * n + i] = Complex64::new(1.0, 0.0);
        }
    }
    set.mark_initialized();
    set
}

#[test]
fn 반복_예산_완료_테스트() {
    let mut unit = TrainingLoop::new(0, 1, &short_config(5)).unwrap();
    assert!(unit.state().is_running());

    for t in 0..5 {
        match unit.tick().unwrap() {
            TickOutcome::Advanced { iteration, magnitude, cost, .. } => {
                assert_eq!(iteration, t);
                assert_eq!(magnitude, cost.norm());
            }
            other => panic!("반복 {}에서 예상치 못한 결과: {:?}", t, other),
        }
    }

    assert_eq!(unit.state(), &LoopState::Completed);
    assert_eq!(unit.iteration(), 5);
    assert_eq!(unit.tick().unwrap(), TickOutcome::Halted, "종료 후에는 아무것도 하지 않음");
    assert_eq!(unit.iteration(), 5);

    println!("✅ 반복 예산 완료 테스트 통과");
}

#[test]
fn 빈_예산_즉시완료_테스트() {
    let mut unit = TrainingLoop::new(0, 1, &short_config(0)).unwrap();

    assert_eq!(unit.tick().unwrap(), TickOutcome::Completed);
    assert_eq!(unit.state(), &LoopState::Completed);
    assert_eq!(unit.recorder().total_points(), 0);

    println!("✅ 빈 예산 즉시완료 테스트 통과");
}

#[test]
fn 시계열_길이_일치_테스트() {
    let mut unit = TrainingLoop::new(0, 3, &short_config(12)).unwrap();
    unit.run().unwrap();

    let recorder = unit.recorder();
    for label in [COST_ABS, COST_PHASE, "det_a", "det_b", "det_c"] {
        let series = recorder.get(label).unwrap();
        assert_eq!(series.len(), 12, "'{}' 시계열 길이", label);
        let iterations: Vec<usize> = series.points().iter().map(|p| p.iteration).collect();
        assert_eq!(iterations, (0..12).collect::<Vec<_>>());
    }

    // 위상은 (-π, π]
    for phase in recorder.get(COST_PHASE).unwrap().values() {
        assert!(phase > -std::f64::consts::PI && phase <= std::f64::consts::PI);
    }

    println!("✅ 시계열 길이 일치 테스트 통과");
}

#[test]
fn 레거시_중복프로브_테스트() {
    let mut unit = TrainingLoop::new(0, 1, &short_config(8)).unwrap();
    unit.run().unwrap();

    let recorder = unit.recorder();
    assert_eq!(
        recorder.get("det_b").unwrap().values(),
        recorder.get("det_c").unwrap().values(),
        "레거시 매핑에서 det_c 는 det_b 와 같은 변수를 읽는다"
    );

    println!("✅ 레거시 중복프로브 테스트 통과");
}

#[test]
fn 구분_프로브_매핑_테스트() {
    let config = UnitConfig {
        probe_mapping: ProbeMapping::Distinct,
        ..short_config(8)
    };
    let mut unit = TrainingLoop::new(0, 1, &config).unwrap();
    unit.run().unwrap();

    let recorder = unit.recorder();
    assert_ne!(
        recorder.get("det_b").unwrap().values(),
        recorder.get("det_c").unwrap().values()
    );

    println!("✅ 구분 프로브 매핑 테스트 통과");
}

#[test]
fn 동일시드_재현성_테스트() {
    let mut first = TrainingLoop::new(0, 42, &short_config(32)).unwrap();
    let mut second = TrainingLoop::new(0, 42, &short_config(32)).unwrap();
    first.run().unwrap();
    second.run().unwrap();

    for (s1, s2) in first.recorder().iter().zip(second.recorder().iter()) {
        assert_eq!(s1, s2, "'{}' 시계열이 달라짐", s1.label);
    }
    assert_eq!(first.last_cost(), second.last_cost());

    let mut other = TrainingLoop::new(0, 43, &short_config(32)).unwrap();
    other.run().unwrap();
    assert_ne!(
        first.recorder().get(COST_ABS).unwrap().values(),
        other.recorder().get(COST_ABS).unwrap().values()
    );

    println!("✅ 동일시드 재현성 테스트 통과");
}

#[test]
fn 단위행렬_고정점_테스트() {
    let config = short_config(10);
    let mut unit = TrainingLoop::with_initialized_set(0, identity_set(3), &config).unwrap();
    unit.run().unwrap();

    assert_eq!(unit.state(), &LoopState::Completed);
    let recorder = unit.recorder();
    assert!(recorder.get(COST_ABS).unwrap().values().iter().all(|&v| v == 0.0));
    assert!(recorder.get("det_a").unwrap().values().iter().all(|&v| v == 1.0));
    assert_eq!(unit.set().get("a").unwrap().values(), identity_set(3).get("a").unwrap().values());

    println!("✅ 단위행렬 고정점 테스트 통과");
}

#[test]
fn 무한대_입력_발산_테스트() {
    let mut set = identity_set(3);
    set.get_mut("a").unwrap().values_mut()[0] = Complex64::new(f64::INFINITY, 0.0);
    let mut unit = TrainingLoop::with_initialized_set(0, set, &short_config(10)).unwrap();

    let outcome = unit.tick().unwrap();
    let report = match outcome {
        TickOutcome::Diverged(report) => report,
        other => panic!("발산을 기대했지만 {:?}", other),
    };
    assert_eq!(report.iteration, 0);
    // 무한대 원소의 그래디언트는 유한하지 않으므로 스텝 직후 노름 검사에서 멈춘다
    assert_eq!(report.probe, GRADIENT_NORM);

    // 발산한 반복에서는 아무 점도 추가되지 않는다
    assert_eq!(unit.recorder().total_points(), 0);
    assert!(matches!(unit.state(), LoopState::Diverged(_)));

    // 종료 상태는 유지
    assert_eq!(unit.tick().unwrap(), TickOutcome::Halted);
    assert_eq!(unit.iteration(), 0);
    assert_eq!(unit.summary().iterations, 0);

    println!("✅ 무한대 입력 발산 테스트 통과");
}

#[test]
fn 잘못된_차원_거부_테스트() {
    for dimension in [0usize, 7] {
        let config = UnitConfig {
            dimension,
            ..UnitConfig::default()
        };
        let result = TrainingLoop::new(0, 1, &config);
        assert!(matches!(result, Err(TrainingError::InvalidDimension { .. })));
    }

    println!("✅ 잘못된 차원 거부 테스트 통과");
}

#[test]
fn 미초기화_집합_거부_테스트() {
    let config = short_config(4);
    let set = TrainingLoop::build_set(&config).unwrap();

    let result = TrainingLoop::with_initialized_set(0, set, &config);
    assert!(matches!(result, Err(TrainingError::NotInitialized)));

    let wrong = identity_set(2);
    let result = TrainingLoop::with_initialized_set(0, wrong, &config);
    assert!(matches!(result, Err(TrainingError::ShapeMismatch { .. })));

    println!("✅ 미초기화 집합 거부 테스트 통과");
}

#[test]
fn 다양한_차원_학습_테스트() {
    for dimension in 1..=6 {
        let config = UnitConfig {
            dimension,
            ..short_config(4)
        };
        let mut unit = TrainingLoop::new(0, 9, &config).unwrap();
        unit.run().unwrap();
        assert!(unit.state().is_terminal(), "N={}", dimension);
    }

    println!("✅ 다양한 차원 학습 테스트 통과");
}

#[test]
fn 비용_발산시_행렬식_점_유지_테스트() {
    // 행렬식 (1e80)³ 은 유한하지만 비용 ½(1e160)² 은 넘친다
    let set = scaled_identity_set(3, 1e80);
    let mut unit = TrainingLoop::with_initialized_set(0, set, &short_config(10)).unwrap();

    let report = match unit.tick().unwrap() {
        TickOutcome::Diverged(report) => report,
        other => panic!("비용 발산을 기대했지만 {:?}", other),
    };
    assert_eq!(report.iteration, 0);
    assert_eq!(report.probe, COST_ABS);
    assert!(report.value.re.is_infinite());

    let recorder = unit.recorder();
    for label in ["det_a", "det_b", "det_c"] {
        let series = recorder.get(label).unwrap();
        assert_eq!(series.len(), 1, "'{}' 는 통과한 반복의 점을 유지", label);
        assert!(series.values()[0].is_finite());
    }
    assert!(recorder.get(COST_ABS).unwrap().is_empty());
    assert!(recorder.get(COST_PHASE).unwrap().is_empty());
    assert!(matches!(unit.state(), LoopState::Diverged(_)));

    println!("✅ 비용 발산시 행렬식 점 유지 테스트 통과");
}

#[test]
fn 큰_그래디언트_스텝_유지_테스트() {
    // 원소별로는 유한하지만 제곱합은 f64 를 넘는 그래디언트
    let set = scaled_identity_set(3, 1e52);
    let mut unit = TrainingLoop::with_initialized_set(0, set, &short_config(5)).unwrap();

    match unit.tick().unwrap() {
        TickOutcome::Advanced { step, cost, .. } => {
            assert!(cost.norm().is_finite());
            assert!(step.gradient_norm.is_finite(), "노름 {}", step.gradient_norm);
            assert!(step.gradient_norm > 1e150);
            assert!(step.scale > 0.0, "클리핑 스케일이 0 으로 무너지면 안 된다");
        }
        other => panic!("정상 반복을 기대했지만 {:?}", other),
    }

    unit.run().unwrap();
    assert_eq!(unit.state(), &LoopState::Completed);

    println!("✅ 큰 그래디언트 스텝 유지 테스트 통과");
}

#[test]
fn 사용자_프로브_라벨_검증_테스트() {
    let with_targets = |targets: Vec<ProbeTarget>| UnitConfig {
        probe_mapping: ProbeMapping::Custom(targets),
        ..short_config(2)
    };

    for reserved in [COST_ABS, COST_PHASE, GRADIENT_NORM] {
        let config = with_targets(vec![ProbeTarget::new(reserved, "a")]);
        let result = TrainingLoop::new(0, 1, &config);
        assert!(
            matches!(result, Err(TrainingError::DuplicateProbeLabel(ref label)) if label == reserved),
            "예약 라벨 '{}' 거부",
            reserved
        );
    }

    let repeated = with_targets(vec![ProbeTarget::new("det_x", "a"), ProbeTarget::new("det_x", "b")]);
    assert!(matches!(
        TrainingLoop::new(0, 1, &repeated),
        Err(TrainingError::DuplicateProbeLabel(_))
    ));

    let unknown = with_targets(vec![ProbeTarget::new("det_z", "z")]);
    assert!(matches!(TrainingLoop::new(0, 1, &unknown), Err(TrainingError::NotFound(_))));

    // 올바른 사용자 매핑은 프로브마다 독립 시계열을 가진다
    let valid = with_targets(vec![ProbeTarget::new("det_x", "a"), ProbeTarget::new("det_y", "a")]);
    let mut unit = TrainingLoop::new(0, 1, &valid).unwrap();
    unit.run().unwrap();
    assert_eq!(unit.probe_labels(), vec!["det_x", "det_y"]);
    assert_eq!(unit.recorder().get(COST_ABS).unwrap().len(), 2);
    assert_eq!(unit.recorder().get("det_x").unwrap().len(), 2);

    println!("✅ 사용자 프로브 라벨 검증 테스트 통과");
}
