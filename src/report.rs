use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use crate::common::{Position, RouteOutcome};
use crate::error::Result;
use crate::map::Map;

const FRAME: &str = "-------------------\n";
const PATH_MARK: char = '*';
const BLANK_MARK: char = '-';

/// `outputAStar.txt`, `outputBacktracking.txt`, ...
pub fn report_file_name(solver: &str) -> String {
    format!("output{solver}.txt")
}

/// Renders the result of one route composition in the plain-text report layout.
pub fn render_outcome(outcome: &RouteOutcome, map: &Map, elapsed: Duration) -> String {
    let RouteOutcome::Win { path, cost, .. } = outcome else {
        return "Lose\n".to_string();
    };

    let mut out = format!("Win\n{cost}\n");
    for (x, y) in path {
        let _ = write!(out, "[{x},{y}] ");
    }
    out.push('\n');
    out.push_str(&render_path_map(path, map.rows, map.columns));
    let _ = writeln!(out, "{:.6} ms", elapsed.as_secs_f64() * 1e3);
    out
}

/// Marks every path cell on an otherwise blank board, framed and indexed by row and column.
pub fn render_path_map(path: &[Position], rows: usize, columns: usize) -> String {
    let mut grid = vec![vec![BLANK_MARK; columns]; rows];
    for &(x, y) in path {
        if let Some(cell) = grid.get_mut(x).and_then(|row| row.get_mut(y)) {
            *cell = PATH_MARK;
        }
    }

    let mut out = String::from(FRAME);
    out.push_str("  ");
    for y in 0..columns {
        let _ = write!(out, "{y} ");
    }
    out.push('\n');
    for (x, row) in grid.iter().enumerate() {
        let _ = write!(out, "{x} ");
        for mark in row {
            let _ = write!(out, "{mark} ");
        }
        out.push('\n');
    }
    out.push_str(FRAME);
    out
}

/// Writes the report for `solver` into `output_dir` and returns the file path.
pub fn write_report(
    output_dir: impl AsRef<Path>,
    solver: &str,
    outcome: &RouteOutcome,
    map: &Map,
    elapsed: Duration,
) -> Result<PathBuf> {
    let path = output_dir.as_ref().join(report_file_name(solver));
    let mut writer = io::BufWriter::new(File::create(&path)?);
    writer.write_all(render_outcome(outcome, map, elapsed).as_bytes())?;
    writer.flush()?;

    info!("{solver} report written to {}", path.display());
    Ok(path)
}
