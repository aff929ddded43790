// Snapshot builder: queries the provider section by section and assembles one Snapshot.
// Every section is fail-fast except disk, where a bad partition is skipped.

use crate::error::{ProviderError, SnapshotError};
use crate::models::*;
use crate::provider::MetricsProvider;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::instrument;

/// Current wall-clock time as Unix nanoseconds.
pub fn now_unix_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, operation = "get_timestamp", "system time error");
            0
        })
}

/// Memory and CPU sections are all-or-nothing, so an undefined percent fails the build.
fn finite(field: &'static str, value: f64) -> Result<f64, SnapshotError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SnapshotError::NonFinitePercent { field })
    }
}

#[derive(Clone)]
pub struct SnapshotBuilder {
    provider: Arc<dyn MetricsProvider>,
}

impl SnapshotBuilder {
    pub fn new(provider: Arc<dyn MetricsProvider>) -> Self {
        Self { provider }
    }

    /// Runs one provider call on the blocking pool.
    async fn blocking<T, F>(&self, operation: &'static str, f: F) -> Result<T, SnapshotError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn MetricsProvider) -> Result<T, ProviderError> + Send + 'static,
    {
        let provider = self.provider.clone();
        tokio::task::spawn_blocking(move || f(provider.as_ref()))
            .await
            .map_err(|e| SnapshotError::Join {
                operation,
                reason: e.to_string(),
            })?
            .map_err(SnapshotError::from)
    }

    /// Builds a snapshot stamped with the current time.
    pub async fn build(&self, sampling_interval: Duration) -> Result<Snapshot, SnapshotError> {
        self.build_at(sampling_interval, now_unix_nanos()).await
    }

    /// Builds a snapshot stamped with `captured_at` (Unix nanoseconds).
    #[instrument(skip(self), fields(operation = "build_snapshot"))]
    pub async fn build_at(
        &self,
        sampling_interval: Duration,
        captured_at: i64,
    ) -> Result<Snapshot, SnapshotError> {
        let host = self.blocking("host_info", |p| p.host_info()).await?;

        let virt = self
            .blocking("virtual_memory", |p| p.virtual_memory())
            .await?;
        let swap = self.blocking("swap_memory", |p| p.swap_memory()).await?;
        finite("memory.usedPercent", virt.used_percent)?;
        finite("memory.swapUsedPercent", swap.used_percent)?;
        let memory = MemoryStats::new(virt, swap);

        let cpu = self.build_cpu(sampling_interval).await?;

        let network = self
            .blocking("net_io_counters", |p| p.net_io_counters())
            .await?;

        let disk = self.blocking("disk_usage", collect_disk_usage).await?;

        Ok(Snapshot::new(
            captured_at,
            sampling_interval,
            host,
            memory,
            cpu,
            network,
            disk,
        ))
    }

    async fn build_cpu(&self, sampling_interval: Duration) -> Result<CpuStats, SnapshotError> {
        let info = self.blocking("cpu_info", |p| p.cpu_info()).await?;
        let model_name = info
            .first()
            .map(|c| c.model_name.clone())
            .ok_or(SnapshotError::EmptyCpuInfo)?;

        let times = self.blocking("cpu_times", |p| p.cpu_times(true)).await?;
        let global_times = self.blocking("cpu_times", |p| p.cpu_times(false)).await?;

        // Both observations cover the same wall-clock window.
        let (percent, global_percent) = tokio::join!(
            self.blocking("cpu_percent", move |p| p.cpu_percent(sampling_interval, true)),
            self.blocking("cpu_percent", move |p| p.cpu_percent(sampling_interval, false)),
        );
        let percent = percent?;
        for &value in &percent {
            finite("cpu.percent", value)?;
        }
        let global_percent = global_percent?
            .first()
            .copied()
            .ok_or(SnapshotError::MissingAggregatePercent)?;
        let global_percent = finite("cpu.globalPercent", global_percent)?;

        let physical_cores = self.blocking("cpu_counts", |p| p.cpu_counts(false)).await?;
        let logical_cores = self.blocking("cpu_counts", |p| p.cpu_counts(true)).await?;

        Ok(CpuStats {
            model_name,
            info,
            times,
            global_times,
            global_percent,
            percent,
            physical_cores,
            logical_cores,
        })
    }
}

/// Usage for every real partition. Only enumeration failure is an error; a
/// partition whose usage query fails or whose percent is NaN is left out.
fn collect_disk_usage(
    provider: &dyn MetricsProvider,
) -> Result<BTreeMap<String, DiskUsage>, ProviderError> {
    let partitions = provider.disk_partitions()?;
    let mut disk = BTreeMap::new();
    for partition in partitions.into_iter().filter(|p| !p.is_pseudo()) {
        match provider.disk_usage(&partition.mount_point) {
            Ok(usage) if usage.used_percent.is_nan() => {
                tracing::debug!(
                    device = %partition.device,
                    mount_point = %partition.mount_point,
                    "skipping partition with undefined usage percent"
                );
            }
            Ok(usage) => {
                disk.insert(partition.device, usage);
            }
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    device = %partition.device,
                    mount_point = %partition.mount_point,
                    "skipping partition: usage query failed"
                );
            }
        }
    }
    Ok(disk)
}
