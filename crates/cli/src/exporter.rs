//! Writes simulation results to disk.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use unisim_simulation::engine::PoolReport;

/// `<dir>/<pool>_<agents>_<steps>.json`, with the pool name lowercased.
pub fn output_path(dir: &Path, pool: &str, agents: usize, steps: u64) -> PathBuf {
    dir.join(format!("{}_{agents}_{steps}.json", pool.to_lowercase()))
}

/// Saves each pool's records as pretty-printed JSON, one file per pool.
pub fn save_reports(
    dir: &Path,
    reports: &[PoolReport<'_>],
    agents: usize,
    steps: u64,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(reports.len());
    for report in reports {
        let path = output_path(dir, report.pool, agents, steps);
        let file =
            File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, report)
            .with_context(|| format!("writing {}", path.display()))?;
        writer.flush()?;
        written.push(path);
    }
    Ok(written)
}
