use sqlx::PgPool;
use tracing::{error, info};

use kith_dedup::DedupConfig;

/// Periodic duplicate scans across every workspace. One full pass per
/// interval; a failing workspace is logged and the loop moves on. Scans are
/// idempotent, so an overlap with a user-triggered scan is harmless — the
/// last batch to commit wins.
pub fn start_scan_interval(pool: PgPool, config: DedupConfig, interval_hours: u64) {
    info!(interval_hours, "Starting duplicate scan interval loop");

    tokio::spawn(async move {
        loop {
            let workspaces = match kith_store::workspaces::list(&pool).await {
                Ok(list) => list,
                Err(e) => {
                    error!(error = %e, "Scan interval: failed to list workspaces");
                    Vec::new()
                }
            };

            for workspace in &workspaces {
                match kith_dedup::scan_workspace(&pool, workspace.id, &config).await {
                    Ok(stats) => {
                        info!(workspace = %workspace.id, %stats, "Scan interval: workspace scanned")
                    }
                    Err(e) => {
                        error!(workspace = %workspace.id, error = %e, "Scan interval: scan failed")
                    }
                }
            }

            tokio::time::sleep(std::time::Duration::from_secs(interval_hours * 3600)).await;
        }
    });
}
