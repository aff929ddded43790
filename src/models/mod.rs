// Snapshot models: raw provider facts and the assembled sample

mod cpu;
mod disk;
mod host;
mod memory;
mod network;
mod snapshot;

pub use cpu::{CpuInfo, CpuStats, CpuTimes};
pub use disk::{DiskUsage, PSEUDO_DEVICE, Partition};
pub use host::HostInfo;
pub use memory::{MemoryStats, SwapMemory, VirtualMemory};
pub use network::NetIoCounters;
pub use snapshot::Snapshot;
