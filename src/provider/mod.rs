// Metrics provider: the raw OS measurements a snapshot is assembled from

mod linux;
mod sysinfo_provider;

pub use sysinfo_provider::SysinfoProvider;

use crate::error::ProviderError;
use crate::models::{
    CpuInfo, CpuTimes, DiskUsage, HostInfo, NetIoCounters, Partition, SwapMemory, VirtualMemory,
};
use std::time::Duration;

/// Source of host measurements.
///
/// Methods are blocking: `cpu_percent` sleeps for the observation interval and
/// the others may hit the filesystem. Callers on a Tokio runtime run them via
/// `spawn_blocking`.
pub trait MetricsProvider: Send + Sync + 'static {
    fn host_info(&self) -> Result<HostInfo, ProviderError>;

    fn virtual_memory(&self) -> Result<VirtualMemory, ProviderError>;

    fn swap_memory(&self) -> Result<SwapMemory, ProviderError>;

    /// Static info, one entry per logical core.
    fn cpu_info(&self) -> Result<Vec<CpuInfo>, ProviderError>;

    /// Time counters per core, or a single aggregate entry when `per_cpu` is false.
    fn cpu_times(&self, per_cpu: bool) -> Result<Vec<CpuTimes>, ProviderError>;

    /// Utilization observed over `interval`: one value per core, or a single
    /// aggregate value when `per_cpu` is false.
    fn cpu_percent(&self, interval: Duration, per_cpu: bool) -> Result<Vec<f64>, ProviderError>;

    fn cpu_counts(&self, logical: bool) -> Result<usize, ProviderError>;

    fn net_io_counters(&self) -> Result<Vec<NetIoCounters>, ProviderError>;

    fn disk_partitions(&self) -> Result<Vec<Partition>, ProviderError>;

    fn disk_usage(&self, mount_point: &str) -> Result<DiskUsage, ProviderError>;
}
