//! `statusgrid poll`: run one aggregation pass, or keep watching.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use statusgrid_core::config::parse_duration;
use statusgrid_core::{CancelToken, Config, StatusReport};
use statusgrid_engine::StatusAggregator;
use statusgrid_http::HttpStatusTransport;

pub async fn run(config_path: &Path, format: &str, watch: bool, interval: &str) -> anyhow::Result<()> {
    let config = Config::from_file(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    config.validate()?;

    let targets = config.target_queries();
    let transport = Arc::new(HttpStatusTransport::from_config(&config)?);
    let aggregator = StatusAggregator::new(transport, config.retry_policy()?);

    // Ctrl-C raises the shared cancel signal; in-flight fetches stop
    // promptly instead of running out their retry budgets.
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, cancelling poll");
                cancel.cancel();
            }
        });
    }

    if !watch {
        let report = match aggregator.aggregate(&targets, &cancel).await {
            Ok(report) => report,
            Err(_) => anyhow::bail!("status poll cancelled"),
        };
        render(&report, format)?;
        let failed = report.errors.len();
        if failed > 0 {
            anyhow::bail!("{failed} of {} targets failed", report.target_count());
        }
        return Ok(());
    }

    let every = parse_duration(interval)
        .ok_or_else(|| anyhow::anyhow!("invalid --interval {interval:?}"))?;
    loop {
        match aggregator.aggregate(&targets, &cancel).await {
            Ok(report) => {
                render(&report, format)?;
                println!();
            }
            Err(_) => {
                info!("status poll cancelled");
                return Ok(());
            }
        }
        tokio::select! {
            _ = tokio::time::sleep(every) => {}
            _ = cancel.cancelled() => return Ok(()),
        }
    }
}

fn render(report: &StatusReport, format: &str) -> anyhow::Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(report)?),
        "text" => print!("{}", render_text(report)),
        other => anyhow::bail!("unknown format {other:?} (expected text or json)"),
    }
    Ok(())
}

fn render_text(report: &StatusReport) -> String {
    let mut out = String::new();
    for record in &report.statuses {
        let mark = if record.is_ready() { '✓' } else { '·' };
        let _ = writeln!(
            out,
            "{mark} {}  ready {}/{}  {}",
            record.key(),
            record.ready_replicas,
            record.desired_replicas,
            record.phase,
        );
    }
    for err in &report.errors {
        let _ = writeln!(out, "✗ {}  {}", err.target.key(), err.message);
    }
    let _ = writeln!(
        out,
        "{} ok, {} failed ({} targets)",
        report.statuses.len(),
        report.errors.len(),
        report.target_count(),
    );
    out
}
