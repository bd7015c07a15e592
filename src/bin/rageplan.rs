//! CLI entry point (spec §6 "Command-line (harness)"). Parses the one-shot
//! form, builds the selected domain's simulator, and runs the experiment
//! harness for `--runs` episodes.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use rageplan::domains::assembly::AssemblyPomdp;
use rageplan::domains::hotel::HotelPomdp;
use rageplan::harness;
use rageplan::params::{CommandLine, Problem};
use rageplan::planner::{PlannerParams, RolloutKnowledge, TreeKnowledge};
use rageplan::simulator::Simulator;

fn main() -> ExitCode {
    rageplan::init();
    let cli = CommandLine::parse();

    let problem = match cli.resolve_problem() {
        Ok(p) => p,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::from(1);
        }
    };

    let sim_doubles = cli.min_doubles.unwrap_or(8);
    let runs = cli.runs.unwrap_or(1);
    let num_steps = cli.num_steps.unwrap_or(50);
    let timeout = Duration::from_millis(cli.timeout.unwrap_or(1000));
    let tree_knowledge = match cli.tree_knowledge.unwrap_or(1) {
        0 => TreeKnowledge::Plain,
        _ => TreeKnowledge::Pgs,
    };
    let rollout_knowledge = match cli.rollout_knowledge.unwrap_or(2) {
        0 => RolloutKnowledge::Random,
        1 => RolloutKnowledge::Preferred,
        3 => RolloutKnowledge::PgsShaping,
        _ => RolloutKnowledge::Pgs,
    };

    let planner_params = PlannerParams {
        sim_doubles,
        transform_doubles: 1,
        transform_attempts: 4,
        timeout,
        exploration_c: None,
        accuracy: 0.01,
        tree_knowledge,
        rollout_knowledge,
        pgs_alpha: 10.0,
    };

    match problem {
        Problem::Assembly => {
            let sim = match &cli.domain_file {
                Some(path) => match load_domain(path).map(|d| AssemblyPomdp::new(d, Default::default())) {
                    Ok(sim) => sim,
                    Err(err) => {
                        log::error!("{err}");
                        return ExitCode::from(1);
                    }
                },
                None => AssemblyPomdp::demo(),
            };
            run(&sim, planner_params, runs, num_steps);
        }
        Problem::Hotel => {
            let sim = match &cli.domain_file {
                Some(path) => match load_hotel_domain(path).map(|d| HotelPomdp::new(d, Default::default())) {
                    Ok(sim) => sim,
                    Err(err) => {
                        log::error!("{err}");
                        return ExitCode::from(1);
                    }
                },
                None => HotelPomdp::demo(),
            };
            run(&sim, planner_params, runs, num_steps);
        }
    }

    ExitCode::SUCCESS
}

fn load_domain(path: &str) -> Result<rageplan::domains::assembly::config::Domain, rageplan::error::ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| rageplan::error::ConfigError::Io { path: path.to_string(), source })?;
    rageplan::domains::assembly::config::Domain::from_json_str(path, &text)
}

fn load_hotel_domain(path: &str) -> Result<rageplan::domains::hotel::config::Domain, rageplan::error::ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| rageplan::error::ConfigError::Io { path: path.to_string(), source })?;
    rageplan::domains::hotel::config::Domain::from_json_str(path, &text)
}

fn run<Sim: Simulator>(sim: &Sim, planner_params: PlannerParams, runs: u32, num_steps: u32) {
    let (stats, results) = harness::run_batch(sim, planner_params, -6.0, 1.0, runs, num_steps, 0);
    log::info!(
        "{runs} runs complete: mean return {:.3} (stddev {:.3})",
        stats.mean(),
        stats.stddev()
    );
    for (i, result) in results.iter().enumerate() {
        println!("run {i}: return={:.3} steps={} end={:?}", result.total_reward, result.steps, result.end);
    }
}
