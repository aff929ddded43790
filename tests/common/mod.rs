// Shared test helpers: a scriptable in-memory metrics provider

#![allow(dead_code)]

use hostmon::error::ProviderError;
use hostmon::models::*;
use hostmon::provider::MetricsProvider;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn provider_error(metric: &'static str) -> ProviderError {
    ProviderError::unavailable(metric, "simulated failure")
}

pub fn usage(path: &str, total: u64, free: u64) -> DiskUsage {
    DiskUsage::from_space(path.to_string(), "ext4".to_string(), total, free)
}

pub fn partition(device: &str, mount_point: &str) -> Partition {
    Partition {
        device: device.to_string(),
        mount_point: mount_point.to_string(),
        fs_type: "ext4".to_string(),
    }
}

fn cpu_times(name: &str) -> CpuTimes {
    CpuTimes {
        cpu: name.to_string(),
        user: 10.0,
        system: 5.0,
        idle: 100.0,
        ..Default::default()
    }
}

/// Provider returning fixed values. `fail` names the operations that error,
/// plus tags (`*_nan`, `cpu_percent_aggregate`) that corrupt a single value;
/// `cpu_percent` sleeps for the requested interval like a real observation.
pub struct FakeProvider {
    pub cpu_info: Vec<CpuInfo>,
    pub partitions: Vec<Partition>,
    pub usages: HashMap<String, DiskUsage>,
    pub fail: Mutex<HashSet<&'static str>>,
    /// Number of initial `host_info` calls that fail before succeeding.
    pub host_failures_remaining: AtomicUsize,
    pub host_calls: AtomicUsize,
    pub usage_queries: Mutex<Vec<String>>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        let cpu_info = (0..4)
            .map(|i| CpuInfo {
                cpu: i,
                vendor_id: "GenuineIntel".into(),
                model_name: format!("Test CPU {}", i),
                mhz: 2400,
            })
            .collect();
        let mut usages = HashMap::new();
        usages.insert("/".to_string(), usage("/", 1000, 250));
        Self {
            cpu_info,
            partitions: vec![partition("/dev/sda1", "/")],
            usages,
            fail: Mutex::new(HashSet::new()),
            host_failures_remaining: AtomicUsize::new(0),
            host_calls: AtomicUsize::new(0),
            usage_queries: Mutex::new(Vec::new()),
        }
    }
}

impl FakeProvider {
    pub fn failing(operation: &'static str) -> Self {
        let p = Self::default();
        p.set_failing(operation, true);
        p
    }

    pub fn set_failing(&self, operation: &'static str, failing: bool) {
        let mut fail = self.fail.lock().unwrap();
        if failing {
            fail.insert(operation);
        } else {
            fail.remove(operation);
        }
    }

    fn flagged(&self, tag: &str) -> bool {
        self.fail.lock().unwrap().contains(tag)
    }

    fn check(&self, operation: &'static str) -> Result<(), ProviderError> {
        if self.flagged(operation) {
            Err(provider_error(operation))
        } else {
            Ok(())
        }
    }
}

impl MetricsProvider for FakeProvider {
    fn host_info(&self) -> Result<HostInfo, ProviderError> {
        self.host_calls.fetch_add(1, Ordering::SeqCst);
        self.check("host_info")?;
        let remaining = self.host_failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.host_failures_remaining
                .store(remaining - 1, Ordering::SeqCst);
            return Err(provider_error("host_info"));
        }
        Ok(HostInfo {
            hostname: "testhost".into(),
            os: "linux".into(),
            platform: "ubuntu".into(),
            platform_family: "debian".into(),
            process_count: 42,
        })
    }

    fn virtual_memory(&self) -> Result<VirtualMemory, ProviderError> {
        self.check("virtual_memory")?;
        Ok(VirtualMemory {
            total: 16_000,
            available: 6_000,
            used: 10_000,
            free: 4_000,
            shared: 500,
            used_percent: if self.flagged("memory_nan") {
                f64::NAN
            } else {
                62.5
            },
        })
    }

    fn swap_memory(&self) -> Result<SwapMemory, ProviderError> {
        self.check("swap_memory")?;
        Ok(SwapMemory {
            total: 2_000,
            used: 500,
            free: 1_500,
            used_percent: if self.flagged("swap_nan") {
                f64::NAN
            } else {
                25.0
            },
        })
    }

    fn cpu_info(&self) -> Result<Vec<CpuInfo>, ProviderError> {
        self.check("cpu_info")?;
        Ok(self.cpu_info.clone())
    }

    fn cpu_times(&self, per_cpu: bool) -> Result<Vec<CpuTimes>, ProviderError> {
        self.check("cpu_times")?;
        if per_cpu {
            Ok((0..4).map(|i| cpu_times(&format!("cpu{}", i))).collect())
        } else {
            Ok(vec![cpu_times("cpu-total")])
        }
    }

    fn cpu_percent(&self, interval: Duration, per_cpu: bool) -> Result<Vec<f64>, ProviderError> {
        std::thread::sleep(interval);
        self.check("cpu_percent")?;
        if per_cpu && self.flagged("cpu_percent_nan") {
            Ok(vec![10.0, f64::NAN, 30.0, 40.0])
        } else if per_cpu {
            Ok(vec![10.0, 20.0, 30.0, 40.0])
        } else if self.flagged("cpu_percent_aggregate") {
            Ok(vec![])
        } else if self.flagged("global_percent_nan") {
            Ok(vec![f64::INFINITY])
        } else {
            Ok(vec![25.0])
        }
    }

    fn cpu_counts(&self, logical: bool) -> Result<usize, ProviderError> {
        self.check("cpu_counts")?;
        Ok(if logical { 4 } else { 2 })
    }

    fn net_io_counters(&self) -> Result<Vec<NetIoCounters>, ProviderError> {
        self.check("net_io_counters")?;
        Ok(vec![
            NetIoCounters {
                name: "eth0".into(),
                bytes_sent: 1_000,
                bytes_recv: 2_000,
                packets_sent: 10,
                packets_recv: 20,
                errors_in: 0,
                errors_out: 1,
            },
            NetIoCounters {
                name: "lo".into(),
                bytes_sent: 300,
                bytes_recv: 300,
                packets_sent: 3,
                packets_recv: 3,
                errors_in: 0,
                errors_out: 0,
            },
        ])
    }

    fn disk_partitions(&self) -> Result<Vec<Partition>, ProviderError> {
        self.check("disk_partitions")?;
        Ok(self.partitions.clone())
    }

    fn disk_usage(&self, mount_point: &str) -> Result<DiskUsage, ProviderError> {
        self.usage_queries
            .lock()
            .unwrap()
            .push(mount_point.to_string());
        self.usages
            .get(mount_point)
            .cloned()
            .ok_or_else(|| provider_error("disk_usage"))
    }
}
