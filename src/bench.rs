use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use rand::Rng;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::Result;
use crate::map::Map;
use crate::solver::compose_route;
use crate::stat::{RunRecord, Stats, Summary};

#[derive(Debug, Clone)]
pub struct BenchReport {
    pub summaries: Vec<Summary>,
    /// Maps on which the selected algorithms found different route costs.
    pub disagreements: usize,
}

/// Composes routes on `config.bench_runs` random maps with every selected algorithm,
/// then writes a run log and a JSON summary per algorithm into `config.output_dir`.
#[instrument(skip_all, name = "benchmark", fields(runs = ?config.bench_runs), level = "debug")]
pub fn run_benchmark<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> Result<BenchReport> {
    let runs = config.bench_runs.unwrap_or_default();
    let solvers = config.algorithm.solvers();
    let mut records: Vec<Vec<RunRecord>> = vec![Vec::with_capacity(runs); solvers.len()];
    let mut disagreements = 0;

    for run in 0..runs {
        let map = Map::generate(config.rows, config.columns, rng, config.max_placement_attempts)?;

        let mut costs = Vec::with_capacity(solvers.len());
        for (solver, solver_records) in solvers.iter().zip(records.iter_mut()) {
            let mut stats = Stats::default();
            let outcome = compose_route(&map, solver.as_ref(), config.tie_policy, &mut stats)?;
            solver_records.push(RunRecord {
                elapsed_ns: stats.elapsed.as_nanos(),
                won: outcome.is_win(),
            });
            costs.push(outcome.cost());
        }

        if costs.windows(2).any(|pair| pair[0] != pair[1]) {
            disagreements += 1;
            warn!(
                "run {run}: algorithms disagree on {:?}, costs {costs:?}",
                map.placements()
            );
        }
    }

    let output_dir = Path::new(&config.output_dir);
    let mut summaries = Vec::with_capacity(solvers.len());
    for (solver, solver_records) in solvers.iter().zip(&records) {
        write_run_log(&output_dir.join(format!("bench_{}.txt", solver.name())), solver_records)?;
        let Some(summary) = Summary::from_records(solver.name(), solver_records) else {
            continue;
        };
        let file = File::create(output_dir.join(format!("bench_{}.json", solver.name())))?;
        let mut writer = io::BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &summary)?;
        writer.flush()?;
        summary.print();
        summaries.push(summary);
    }

    info!("benchmark finished, {disagreements} disagreement(s)");
    Ok(BenchReport {
        summaries,
        disagreements,
    })
}

fn write_run_log(path: &Path, records: &[RunRecord]) -> Result<()> {
    let mut writer = io::BufWriter::new(File::create(path)?);
    for record in records {
        writeln!(writer, "{}", record.to_line())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::Algorithm;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("info")
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn test_benchmark_writes_logs_and_summaries() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            bench_runs: Some(12),
            output_dir: dir.path().display().to_string(),
            algorithm: Algorithm::Both,
            ..Config::default()
        };
        let mut rng = StdRng::seed_from_u64(3);

        let report = run_benchmark(&config, &mut rng).unwrap();
        assert_eq!(report.disagreements, 0);
        assert_eq!(report.summaries.len(), 2);
        for summary in &report.summaries {
            assert_eq!(summary.runs, 12);
            assert_eq!(summary.wins + summary.losses, 12);

            let log =
                std::fs::read_to_string(dir.path().join(format!("bench_{}.txt", summary.algorithm)))
                    .unwrap();
            assert_eq!(log.lines().count(), 12);
            assert!(log
                .lines()
                .all(|line| line.ends_with(" W") || line.ends_with(" L")));

            let json = std::fs::read_to_string(
                dir.path().join(format!("bench_{}.json", summary.algorithm)),
            )
            .unwrap();
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value["runs"], 12);
            assert_eq!(value["algorithm"], summary.algorithm.as_str());
        }
        assert_eq!(report.summaries[0].wins, report.summaries[1].wins);
    }
}
