pub mod belief;
pub mod domains;
pub mod entropy;
pub mod error;
pub mod ftable;
pub mod harness;
pub mod history;
pub mod params;
pub mod planner;
pub mod random;
pub mod simulator;

/// Initialize combined terminal + file logging for the CLI binary. Library
/// code never calls this itself — it only emits `log::{debug,info,warn,error}!`
/// (spec `[AMBIENT] Logging`).
pub fn init() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves forward")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
