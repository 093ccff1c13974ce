use hazard_route::bench::run_benchmark;
use hazard_route::config::{Cli, Config};
use hazard_route::map::Map;
use hazard_route::report::write_report;
use hazard_route::scenario::Scenario;
use hazard_route::solver::compose_route;
use hazard_route::stat::Stats;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("cannot read config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        info!("No config file specified, using default config");
        Config::default()
    }
    .override_from_command_line(&cli)?;

    let mut rng = StdRng::seed_from_u64(config.seed);

    if config.bench_runs.is_some() {
        let report = run_benchmark(&config, &mut rng)?;
        info!(
            "Benchmarked {} algorithm(s), {} disagreement(s)",
            report.summaries.len(),
            report.disagreements
        );
        return Ok(());
    }

    let scenario = match config.input.as_ref() {
        Some(input) => Scenario::load_from_file(input)
            .with_context(|| format!("error loading scenario: {input}"))?,
        None => {
            let map = Map::generate(
                config.rows,
                config.columns,
                &mut rng,
                config.max_placement_attempts,
            )?;
            Scenario::from_map(&map, config.perception)
        }
    };
    let map = scenario
        .build_map(config.rows, config.columns)
        .context("invalid scenario")?;
    info!("Perception scenario {}, board:\n{map}", scenario.perception);

    if let Some(path) = config.save_scenario.as_ref() {
        scenario
            .write_to_yaml(path)
            .with_context(|| format!("error saving scenario: {path}"))?;
        info!("Scenario saved to {path}");
    }

    for solver in config.algorithm.solvers() {
        let mut stats = Stats::default();
        let outcome = compose_route(&map, solver.as_ref(), config.tie_policy, &mut stats)?;
        stats.print(solver.name());
        write_report(&config.output_dir, solver.name(), &outcome, &map, stats.elapsed)?;
    }

    Ok(())
}
