// Virtual memory and swap models

use serde::{Deserialize, Serialize};

/// Physical memory as reported by the provider, in bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMemory {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub free: u64,
    pub shared: u64,
    pub used_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapMemory {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
}

/// Memory section of a snapshot: virtual memory and swap flattened together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub free: u64,
    pub shared: u64,
    pub used_percent: f64,
    pub swap_total: u64,
    pub swap_used: u64,
    pub swap_free: u64,
    pub swap_used_percent: f64,
}

impl MemoryStats {
    pub fn new(virt: VirtualMemory, swap: SwapMemory) -> Self {
        Self {
            total: virt.total,
            available: virt.available,
            used: virt.used,
            free: virt.free,
            shared: virt.shared,
            used_percent: virt.used_percent,
            swap_total: swap.total,
            swap_used: swap.used,
            swap_free: swap.free,
            swap_used_percent: swap.used_percent,
        }
    }
}
