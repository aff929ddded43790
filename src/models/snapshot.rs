// One point-in-time sample and its JSON representation

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::de::Error as _;
use serde::{Deserialize, Serialize};

use super::{CpuStats, DiskUsage, HostInfo, MemoryStats, NetIoCounters, PSEUDO_DEVICE};

/// Immutable sample of host, memory, CPU, network and disk facts.
///
/// Fields are private; a snapshot is only read after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Unix time in nanoseconds.
    captured_at: i64,
    sampling_interval: Duration,
    host: HostInfo,
    memory: MemoryStats,
    cpu: CpuStats,
    network: Vec<NetIoCounters>,
    /// Keyed by device identifier, ordered for stable output.
    disk: BTreeMap<String, DiskUsage>,
}

impl Snapshot {
    pub fn new(
        captured_at: i64,
        sampling_interval: Duration,
        host: HostInfo,
        memory: MemoryStats,
        cpu: CpuStats,
        network: Vec<NetIoCounters>,
        disk: BTreeMap<String, DiskUsage>,
    ) -> Self {
        Self {
            captured_at,
            sampling_interval,
            host,
            memory,
            cpu,
            network,
            disk,
        }
    }

    pub fn captured_at(&self) -> i64 {
        self.captured_at
    }

    pub fn sampling_interval(&self) -> Duration {
        self.sampling_interval
    }

    pub fn host(&self) -> &HostInfo {
        &self.host
    }

    pub fn memory(&self) -> &MemoryStats {
        &self.memory
    }

    pub fn cpu(&self) -> &CpuStats {
        &self.cpu
    }

    pub fn network(&self) -> &[NetIoCounters] {
        &self.network
    }

    pub fn disk(&self) -> &BTreeMap<String, DiskUsage> {
        &self.disk
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parses a snapshot and rejects anything a builder could not have produced:
    /// a pseudo-device disk key or a non-finite percent.
    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        let snapshot: Self = serde_json::from_str(s)?;
        if snapshot.disk.contains_key(PSEUDO_DEVICE) {
            return Err(serde_json::Error::custom(format!(
                "disk contains pseudo device {:?}",
                PSEUDO_DEVICE
            )));
        }
        let percents = [
            ("memory.usedPercent", snapshot.memory.used_percent),
            ("memory.swapUsedPercent", snapshot.memory.swap_used_percent),
            ("cpu.globalPercent", snapshot.cpu.global_percent),
        ]
        .into_iter()
        .chain(snapshot.cpu.percent.iter().map(|&p| ("cpu.percent", p)))
        .chain(snapshot.disk.values().map(|u| ("disk.usedPercent", u.used_percent)));
        for (field, value) in percents {
            if !value.is_finite() {
                return Err(serde_json::Error::custom(format!("non-finite {}", field)));
            }
        }
        Ok(snapshot)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = self.to_json().map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
