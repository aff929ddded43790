// Metrics provider backed by sysinfo, with /proc readers for what sysinfo lacks

use super::{MetricsProvider, linux};
use crate::error::ProviderError;
use crate::models::*;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use sysinfo::{Disks, Networks, ProcessesToUpdate, System};
use tracing::instrument;

pub struct SysinfoProvider {
    sys: Mutex<System>,
    disks: Mutex<Disks>,
    networks: Mutex<Networks>,
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<'a, T>(m: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, ProviderError> {
    m.lock()
        .map_err(|e| ProviderError::LockPoisoned(format!("{}: {}", what, e)))
}

fn percent(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

impl SysinfoProvider {
    pub fn new() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        let disks = Disks::new_with_refreshed_list();
        let networks = Networks::new_with_refreshed_list();
        Self {
            sys: Mutex::new(sys),
            disks: Mutex::new(disks),
            networks: Mutex::new(networks),
        }
    }
}

impl MetricsProvider for SysinfoProvider {
    #[instrument(skip(self), fields(provider = "sysinfo", operation = "host_info"))]
    fn host_info(&self) -> Result<HostInfo, ProviderError> {
        let hostname = System::host_name()
            .ok_or_else(|| ProviderError::unavailable("hostname", "not reported by the OS"))?;
        let mut sys = lock(&self.sys, "system")?;
        sys.refresh_processes(ProcessesToUpdate::All, true);
        let platform = linux::read_os_release("ID").unwrap_or_else(System::distribution_id);
        let platform_family = linux::read_os_release("ID_LIKE")
            .and_then(|like| like.split_whitespace().next().map(str::to_string))
            .unwrap_or_else(|| platform.clone());
        Ok(HostInfo {
            hostname,
            os: std::env::consts::OS.to_string(),
            platform,
            platform_family,
            process_count: sys.processes().len() as u64,
        })
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "virtual_memory"))]
    fn virtual_memory(&self) -> Result<VirtualMemory, ProviderError> {
        let mut sys = lock(&self.sys, "system")?;
        sys.refresh_memory();
        let total = sys.total_memory();
        if total == 0 {
            return Err(ProviderError::unavailable(
                "virtual memory",
                "total memory reported as 0",
            ));
        }
        let used = sys.used_memory();
        Ok(VirtualMemory {
            total,
            available: sys.available_memory(),
            used,
            free: sys.free_memory(),
            shared: linux::read_shared_memory(),
            used_percent: percent(used, total),
        })
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "swap_memory"))]
    fn swap_memory(&self) -> Result<SwapMemory, ProviderError> {
        let mut sys = lock(&self.sys, "system")?;
        sys.refresh_memory();
        let total = sys.total_swap();
        let used = sys.used_swap();
        Ok(SwapMemory {
            total,
            used,
            free: sys.free_swap(),
            used_percent: percent(used, total),
        })
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "cpu_info"))]
    fn cpu_info(&self) -> Result<Vec<CpuInfo>, ProviderError> {
        let mut sys = lock(&self.sys, "system")?;
        sys.refresh_cpu_all();
        let fallback_model = linux::read_cpu_model();
        Ok(sys
            .cpus()
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let brand = c.brand().trim();
                let model_name = if brand.is_empty() {
                    fallback_model.clone().unwrap_or_default()
                } else {
                    brand.to_string()
                };
                CpuInfo {
                    cpu: i as u32,
                    vendor_id: c.vendor_id().to_string(),
                    model_name,
                    mhz: c.frequency(),
                }
            })
            .collect())
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "cpu_times"))]
    fn cpu_times(&self, per_cpu: bool) -> Result<Vec<CpuTimes>, ProviderError> {
        linux::read_cpu_times(per_cpu)
    }

    /// Uses a private `System` so concurrent observations do not contend on the
    /// shared lock while sleeping.
    #[instrument(skip(self), fields(provider = "sysinfo", operation = "cpu_percent"))]
    fn cpu_percent(&self, interval: Duration, per_cpu: bool) -> Result<Vec<f64>, ProviderError> {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        std::thread::sleep(interval.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL));
        sys.refresh_cpu_usage();
        if sys.cpus().is_empty() {
            return Err(ProviderError::unavailable("cpu percent", "no cpus reported"));
        }
        let clamp = |v: f32| (v as f64).clamp(0.0, 100.0);
        if per_cpu {
            Ok(sys.cpus().iter().map(|c| clamp(c.cpu_usage())).collect())
        } else {
            Ok(vec![clamp(sys.global_cpu_usage())])
        }
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "cpu_counts"))]
    fn cpu_counts(&self, logical: bool) -> Result<usize, ProviderError> {
        if logical {
            let sys = lock(&self.sys, "system")?;
            match sys.cpus().len() {
                0 => Err(ProviderError::unavailable("logical cores", "no cpus reported")),
                n => Ok(n),
            }
        } else {
            System::physical_core_count()
                .ok_or_else(|| ProviderError::unavailable("physical cores", "not reported by the OS"))
        }
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "net_io_counters"))]
    fn net_io_counters(&self) -> Result<Vec<NetIoCounters>, ProviderError> {
        let mut networks = lock(&self.networks, "networks")?;
        networks.refresh(true);
        let mut counters: Vec<NetIoCounters> = networks
            .list()
            .iter()
            .map(|(name, data)| NetIoCounters {
                name: name.clone(),
                bytes_sent: data.total_transmitted(),
                bytes_recv: data.total_received(),
                packets_sent: data.total_packets_transmitted(),
                packets_recv: data.total_packets_received(),
                errors_in: data.total_errors_on_received(),
                errors_out: data.total_errors_on_transmitted(),
            })
            .collect();
        counters.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(counters)
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "disk_partitions"))]
    fn disk_partitions(&self) -> Result<Vec<Partition>, ProviderError> {
        let mut disks = lock(&self.disks, "disks")?;
        disks.refresh(true);
        Ok(disks
            .list()
            .iter()
            .map(|d| Partition {
                device: d.name().to_string_lossy().into_owned(),
                mount_point: d.mount_point().to_string_lossy().into_owned(),
                fs_type: d.file_system().to_string_lossy().into_owned(),
            })
            .collect())
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "disk_usage"))]
    fn disk_usage(&self, mount_point: &str) -> Result<DiskUsage, ProviderError> {
        let disks = lock(&self.disks, "disks")?;
        let disk = disks
            .list()
            .iter()
            .find(|d| d.mount_point() == std::path::Path::new(mount_point))
            .ok_or_else(|| {
                ProviderError::unavailable("disk usage", format!("no filesystem mounted at {}", mount_point))
            })?;
        Ok(DiskUsage::from_space(
            mount_point.to_string(),
            disk.file_system().to_string_lossy().into_owned(),
            disk.total_space(),
            disk.available_space(),
        ))
    }
}
