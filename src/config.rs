use anyhow::{anyhow, Context};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::scenario::PerceptionScenario;
use crate::solver::{Algorithm, TiePolicy};

#[derive(Parser, Debug)]
#[command(
    name = "hazard_route",
    about = "Shortest routes across a hazard grid with A* and backtracking.",
    version = "0.1"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(
        long,
        help = "Scenario file to load (text format, or YAML for .yaml/.yml); a random map is generated when absent"
    )]
    pub input: Option<String>,

    #[arg(long, help = "Number of board rows")]
    pub rows: Option<usize>,

    #[arg(long, help = "Number of board columns")]
    pub columns: Option<usize>,

    #[arg(long, help = "Seed for the random number generator")]
    pub seed: Option<u64>,

    #[arg(long, value_enum, help = "Search algorithm to run")]
    pub algorithm: Option<Algorithm>,

    #[arg(long, value_enum, help = "Route to keep when direct and waypoint routes cost the same")]
    pub tie_policy: Option<TiePolicy>,

    #[arg(
        long,
        value_parser = clap::value_parser!(u8).range(1..=2),
        help = "Perception scenario for generated maps (1 or 2)"
    )]
    pub perception: Option<u8>,

    #[arg(long, help = "Directory for report files")]
    pub output_dir: Option<String>,

    #[arg(long, help = "Benchmark over this many random maps instead of solving one")]
    pub bench_runs: Option<usize>,

    #[arg(long, help = "Save the solved map as a YAML scenario")]
    pub save_scenario: Option<String>,

    #[arg(long, help = "Random attempts per actor before generation gives up")]
    pub max_placement_attempts: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: Option<String>,
    pub rows: usize,
    pub columns: usize,
    pub seed: u64,
    pub algorithm: Algorithm,
    pub tie_policy: TiePolicy,
    pub perception: PerceptionScenario,
    pub output_dir: String,
    pub bench_runs: Option<usize>,
    pub save_scenario: Option<String>,
    pub max_placement_attempts: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input: None,
            rows: 9,
            columns: 9,
            seed: 0,
            algorithm: Algorithm::default(),
            tie_policy: TiePolicy::default(),
            perception: PerceptionScenario::default(),
            output_dir: ".".to_string(),
            bench_runs: None,
            save_scenario: None,
            max_placement_attempts: 10_000,
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("invalid YAML config")
    }

    /// Values given on the command line replace the ones from the file.
    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(input) = &cli.input {
            self.input = Some(input.clone());
        }
        if let Some(rows) = cli.rows {
            self.rows = rows;
        }
        if let Some(columns) = cli.columns {
            self.columns = columns;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(algorithm) = cli.algorithm {
            self.algorithm = algorithm;
        }
        if let Some(tie_policy) = cli.tie_policy {
            self.tie_policy = tie_policy;
        }
        if let Some(perception) = cli.perception {
            self.perception = PerceptionScenario::try_from(perception).map_err(|e| anyhow!(e))?;
        }
        if let Some(output_dir) = &cli.output_dir {
            self.output_dir = output_dir.clone();
        }
        if let Some(bench_runs) = cli.bench_runs {
            self.bench_runs = Some(bench_runs);
        }
        if let Some(save_scenario) = &cli.save_scenario {
            self.save_scenario = Some(save_scenario.clone());
        }
        if let Some(max_placement_attempts) = cli.max_placement_attempts {
            self.max_placement_attempts = max_placement_attempts;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rows == 0 || self.columns == 0 {
            return Err(anyhow!(
                "Board must have at least one row and one column, got {}x{}",
                self.rows,
                self.columns
            ));
        }
        if self.max_placement_attempts == 0 {
            return Err(anyhow!("Max placement attempts must be positive"));
        }
        if self.bench_runs == Some(0) {
            return Err(anyhow!("Benchmark runs must be positive"));
        }
        if self.bench_runs.is_some() && self.input.is_some() {
            return Err(anyhow!(
                "Benchmark mode generates its own maps and cannot take an input scenario"
            ));
        }
        Ok(())
    }
}
