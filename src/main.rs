use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process;
use trifecta::{
    Complex, CouplingController, ExperimentConfig, LoopState, ProbeMapping, RunReport,
    TickOutcome, TrainingLoop,
};

fn main() {
    env_logger::init();

    let matches = with_dual_args(with_common_args(
        Command::new("trifecta")
            .version("0.1.0")
            .about("복소 행렬 삼중 일관성 학습 실험 (기본: 이중 유닛)"),
    ))
    .subcommand(with_common_args(
        Command::new("single").about("단일 유닛 학습"),
    ))
    .subcommand(with_dual_args(with_common_args(
        Command::new("dual").about("두 유닛 학습 + 임계값 결합"),
    )))
    .get_matches();

    let result = match matches.subcommand() {
        Some(("single", sub_matches)) => handle_single(sub_matches),
        Some(("dual", sub_matches)) => handle_dual(sub_matches),
        _ => handle_dual(&matches),
    };

    if let Err(e) = result {
        eprintln!("❌ 오류: {:#}", e);
        process::exit(1);
    }
}

fn with_common_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("JSON 실험 설정 파일"),
        )
        .arg(
            Arg::new("iterations")
                .long("iterations")
                .short('i')
                .value_name("COUNT")
                .value_parser(clap::value_parser!(usize))
                .help("반복 예산 (기본 1024)"),
        )
        .arg(
            Arg::new("dimension")
                .long("dimension")
                .short('n')
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .help("정사각 행렬 차원 (기본 3)"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("SEED")
                .value_parser(clap::value_parser!(u64))
                .help("유닛 0 시드 (기본 1)"),
        )
        .arg(
            Arg::new("lr-re")
                .long("lr-re")
                .value_name("RE")
                .value_parser(clap::value_parser!(f64))
                .allow_negative_numbers(true)
                .help("복소 학습률 실수부 (기본 0.3)"),
        )
        .arg(
            Arg::new("lr-im")
                .long("lr-im")
                .value_name("IM")
                .value_parser(clap::value_parser!(f64))
                .allow_negative_numbers(true)
                .help("복소 학습률 허수부 (기본 0.3)"),
        )
        .arg(
            Arg::new("probe-mapping")
                .long("probe-mapping")
                .value_name("MAPPING")
                .value_parser(["legacy", "distinct"])
                .help("행렬식 프로브 매핑 (legacy: det_c 가 b 를 읽음)"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("DIR")
                .help("시계열/요약 출력 디렉토리"),
        )
        .arg(
            Arg::new("no-progress")
                .long("no-progress")
                .action(ArgAction::SetTrue)
                .help("진행률 표시 끄기"),
        )
}

fn with_dual_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("seed1")
                .long("seed1")
                .value_name("SEED")
                .value_parser(clap::value_parser!(u64))
                .help("유닛 1 시드 (기본 2)"),
        )
        .arg(
            Arg::new("threshold")
                .long("threshold")
                .short('t')
                .value_name("VALUE")
                .value_parser(clap::value_parser!(f64))
                .help("결합 임계값 (기본 128)"),
        )
        .arg(
            Arg::new("sequential")
                .long("sequential")
                .action(ArgAction::SetTrue)
                .help("한 틱 안에서 두 유닛을 순차 진행"),
        )
}

/// 설정 파일(또는 기본값) 위에 CLI 플래그를 덮어쓴다
fn load_config(matches: &ArgMatches) -> Result<ExperimentConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => {
            let path = PathBuf::from(path);
            ExperimentConfig::from_json_file(&path)
                .map_err(|e| anyhow::anyhow!("설정 파일 로드 실패 ({}): {}", path.display(), e))?
        }
        None => ExperimentConfig::default(),
    };

    if let Some(&iterations) = matches.get_one::<usize>("iterations") {
        config.unit.iterations = iterations;
    }
    if let Some(&dimension) = matches.get_one::<usize>("dimension") {
        config.unit.dimension = dimension;
    }
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        config.seeds[0] = seed;
    }
    if let Some(&re) = matches.get_one::<f64>("lr-re") {
        config.unit.optimizer.learning_rate.re = re;
    }
    if let Some(&im) = matches.get_one::<f64>("lr-im") {
        config.unit.optimizer.learning_rate.im = im;
    }
    if let Some(name) = matches.get_one::<String>("probe-mapping") {
        config.unit.probe_mapping = ProbeMapping::parse(name)
            .ok_or_else(|| anyhow::anyhow!("알 수 없는 프로브 매핑: {}", name))?;
    }
    if let Some(dir) = matches.get_one::<String>("output") {
        config.output_dir = PathBuf::from(dir);
    }
    Ok(config)
}

fn progress_bar(len: u64, enabled: bool) -> Result<ProgressBar> {
    if !enabled {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {percent}% 반복 {pos}/{len} ({elapsed_precise})")?
            .progress_chars("=> "),
    );
    Ok(pb)
}

fn handle_single(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    print_config("단일 유닛", &config);

    let mut unit = TrainingLoop::new(0, config.seeds[0], &config.unit)?;
    let pb = progress_bar(unit.budget() as u64, !matches.get_flag("no-progress"))?;
    while unit.state().is_running() {
        if let TickOutcome::Advanced { .. } = unit.tick()? {
            pb.inc(1);
        }
    }
    pb.finish_and_clear();

    print_unit(&unit);

    let report = RunReport::single(&unit);
    let written = report.export(&config.output_dir, &[&unit])?;
    print_written(&written);
    Ok(())
}

fn handle_dual(matches: &ArgMatches) -> Result<()> {
    let mut config = load_config(matches)?;
    if let Some(&seed) = matches.get_one::<u64>("seed1") {
        config.seeds[1] = seed;
    }
    if let Some(&threshold) = matches.get_one::<f64>("threshold") {
        config.fusion_threshold = threshold;
    }
    if matches.get_flag("sequential") {
        config.parallel_ticks = false;
    }
    print_config("이중 유닛", &config);
    println!("   - 결합 임계값: {}", config.fusion_threshold);
    println!("   - 결합 변수: '{}'", config.fused_variable);

    let mut controller = CouplingController::new(&config)?;
    let pb = progress_bar(controller.budget() as u64, !matches.get_flag("no-progress"))?;
    while !controller.is_finished() {
        let report = controller.tick()?;
        for event in &report.fusions {
            pb.println(format!("🔥 fire {} (틱 {})", event.source, event.tick));
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    for unit in controller.units() {
        print_unit(unit);
    }
    println!("🔗 결합 이벤트: {}회", controller.events().len());

    let report = RunReport::dual(&controller);
    let [unit0, unit1] = controller.units();
    let written = report.export(&config.output_dir, &[unit0, unit1])?;
    print_written(&written);
    Ok(())
}

fn print_config(mode: &str, config: &ExperimentConfig) {
    let lr: Complex = config.unit.optimizer.learning_rate;
    println!("🚀 {} 학습 시작", mode);
    println!("   - 행렬 크기: {}×{}", config.unit.dimension, config.unit.dimension);
    println!("   - 학습률: {}", lr);
    println!("   - 반복 예산: {}", config.unit.iterations);
    println!("   - 시드: {:?}", config.seeds);
}

fn print_unit(unit: &TrainingLoop) {
    match unit.state() {
        LoopState::Completed => {
            println!("✅ 유닛 {}: {} 반복 완료", unit.id(), unit.iteration());
        }
        LoopState::Diverged(report) => {
            println!(
                "⚠️ 유닛 {}: 반복 {}에서 발산 (프로브 '{}' = {})",
                unit.id(),
                report.iteration,
                report.probe,
                report.value
            );
        }
        state => {
            println!("⏸️ 유닛 {}: 상태 {}", unit.id(), state.label());
        }
    }
    if let Some(cost) = unit.last_cost() {
        println!("   - 마지막 비용: |{:.6e}| ∠ {:.4}", cost.norm(), cost.arg());
    }
}

fn print_written(paths: &[PathBuf]) {
    println!("💾 출력 파일:");
    for path in paths {
        println!("   - {}", path.display());
    }
}
