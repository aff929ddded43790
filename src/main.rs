use anyhow::Result;
use hostmon::builder::SnapshotBuilder;
use hostmon::config::AppConfig;
use hostmon::models::Snapshot;
use hostmon::provider::SysinfoProvider;
use hostmon::server::SamplingServer;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

fn print_snapshot(snapshot: &Snapshot, pretty: bool) -> Result<()> {
    let json = if pretty {
        snapshot.to_json_pretty()?
    } else {
        snapshot.to_json()?
    };
    println!("{}", json);
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only snapshots.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let once = std::env::args().any(|arg| arg == "--once");
    let app_config = AppConfig::load()?;
    let sampling = app_config.sampling_config();
    let builder = SnapshotBuilder::new(Arc::new(SysinfoProvider::new()));

    if once {
        let snapshot = builder.build(sampling.interval).await?;
        return print_snapshot(&snapshot, app_config.output.pretty);
    }

    let (server, mut subscription) = SamplingServer::new(builder, sampling);
    server.start()?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        interval_ms = app_config.sampling.interval_ms,
        "sampling started"
    );

    let mut printed: u64 = 0;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            snapshot = subscription.snapshots.recv() => {
                let Some(snapshot) = snapshot else { break };
                print_snapshot(&snapshot, app_config.output.pretty)?;
                printed += 1;
                if app_config.output.limit.is_some_and(|limit| printed >= limit) {
                    break;
                }
            }
            Some(failure) = subscription.failures.recv() => {
                tracing::debug!(
                    error = %failure.error,
                    consecutive_failures = failure.consecutive_failures,
                    retry_in_ms = failure.retry_in.as_millis() as u64,
                    "failure event received"
                );
            }
            _ = &mut shutdown => {
                tracing::info!("Received shutdown signal");
                break;
            }
        }
    }

    server.shutdown().await;
    tracing::info!(snapshots = printed, "sampling stopped");
    Ok(())
}
