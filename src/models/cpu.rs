// CPU models: static info, time accounting and the snapshot CPU section

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuInfo {
    pub cpu: u32,
    pub vendor_id: String,
    pub model_name: String,
    pub mhz: u64,
}

/// Time spent in each mode since boot, in seconds. `cpu` is "cpu-total" for
/// the aggregate line and "cpuN" per core.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuTimes {
    pub cpu: String,
    pub user: f64,
    pub nice: f64,
    pub system: f64,
    pub idle: f64,
    pub iowait: f64,
    pub irq: f64,
    pub softirq: f64,
    pub steal: f64,
    pub guest: f64,
    pub guest_nice: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuStats {
    pub model_name: String,
    pub info: Vec<CpuInfo>,
    pub times: Vec<CpuTimes>,
    pub global_times: Vec<CpuTimes>,
    pub global_percent: f64,
    pub percent: Vec<f64>,
    pub physical_cores: usize,
    pub logical_cores: usize,
}
