// Partition and disk usage models

use serde::{Deserialize, Serialize};

/// Device identifier the provider uses for mounts with no backing device.
pub const PSEUDO_DEVICE: &str = "none";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    pub device: String,
    pub mount_point: String,
    pub fs_type: String,
}

impl Partition {
    pub fn is_pseudo(&self) -> bool {
        self.device == PSEUDO_DEVICE
    }
}

/// Usage of one mounted filesystem. `used_percent` is NaN when the
/// filesystem reports zero capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskUsage {
    pub path: String,
    pub fs_type: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
}

impl DiskUsage {
    /// Computes used percent from total/free; 0/0 deliberately yields NaN.
    pub fn from_space(path: String, fs_type: String, total: u64, free: u64) -> Self {
        let used = total.saturating_sub(free);
        Self {
            path,
            fs_type,
            total,
            used,
            free,
            used_percent: used as f64 / total as f64 * 100.0,
        }
    }
}
