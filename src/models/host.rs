// Host identity model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostInfo {
    pub hostname: String,
    /// Kernel family as reported by the runtime (e.g. "linux").
    pub os: String,
    /// Distribution id (e.g. "ubuntu").
    pub platform: String,
    /// Distribution family (e.g. "debian").
    pub platform_family: String,
    pub process_count: u64,
}
