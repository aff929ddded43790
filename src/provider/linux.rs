// Linux-specific readers: /proc/stat, /proc/meminfo, /proc/cpuinfo, /etc/os-release.

use crate::error::ProviderError;
use crate::models::CpuTimes;

/// Kernel USER_HZ; /proc/stat counters are in these ticks.
#[cfg(any(target_os = "linux", test))]
const CLOCK_TICKS: f64 = 100.0;

/// Read first "model name" from /proc/cpuinfo. Used when sysinfo reports an empty brand.
pub(super) fn read_cpu_model() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/cpuinfo").ok()?;
        for line in content.lines() {
            if line.starts_with("model name") {
                let name = line
                    .find(": ")
                    .map(|i| line[i + 2..].trim())
                    .filter(|s| !s.is_empty())?;
                return Some(name.to_string());
            }
        }
    }
    None
}

/// Read a `KEY=value` entry from /etc/os-release, quotes stripped.
pub(super) fn read_os_release(key: &str) -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/etc/os-release").ok()?;
        parse_os_release(&content, key)
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = key;
        None
    }
}

#[cfg(any(target_os = "linux", test))]
fn parse_os_release(content: &str, key: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let v = line.strip_prefix(key)?.strip_prefix('=')?.trim().trim_matches('"');
        if v.is_empty() { None } else { Some(v.to_string()) }
    })
}

/// Shared memory (Shmem) in bytes from /proc/meminfo; 0 where unavailable.
pub(super) fn read_shared_memory() -> u64 {
    #[cfg(target_os = "linux")]
    {
        if let Ok(content) = std::fs::read_to_string("/proc/meminfo") {
            return parse_meminfo_kb(&content, "Shmem").unwrap_or(0) * 1024;
        }
    }
    0
}

#[cfg(any(target_os = "linux", test))]
fn parse_meminfo_kb(content: &str, field: &str) -> Option<u64> {
    content.lines().find_map(|line| {
        let rest = line.strip_prefix(field)?.strip_prefix(':')?;
        rest.split_whitespace().next()?.parse().ok()
    })
}

/// CPU time counters from /proc/stat: the aggregate line when `per_cpu` is
/// false, otherwise one entry per core.
pub(super) fn read_cpu_times(per_cpu: bool) -> Result<Vec<CpuTimes>, ProviderError> {
    #[cfg(target_os = "linux")]
    {
        let content =
            std::fs::read_to_string("/proc/stat").map_err(|e| ProviderError::Io {
                path: "/proc/stat".into(),
                reason: e.to_string(),
            })?;
        let times = parse_proc_stat(&content, per_cpu);
        if times.is_empty() {
            return Err(ProviderError::unavailable(
                "cpu times",
                "no cpu lines in /proc/stat",
            ));
        }
        Ok(times)
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = per_cpu;
        Err(ProviderError::Unsupported {
            metric: "cpu times",
        })
    }
}

#[cfg(any(target_os = "linux", test))]
fn parse_proc_stat(content: &str, per_cpu: bool) -> Vec<CpuTimes> {
    let mut out = Vec::new();
    for line in content.lines() {
        if !line.starts_with("cpu") {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        // cpu + at least user..steal
        if parts.len() < 9 {
            continue;
        }
        let is_total = parts[0] == "cpu";
        if is_total == per_cpu {
            continue;
        }
        let field = |i: usize| -> f64 {
            parts
                .get(i)
                .and_then(|v| v.parse::<u64>().ok())
                .map(|ticks| ticks as f64 / CLOCK_TICKS)
                .unwrap_or(0.0)
        };
        out.push(CpuTimes {
            cpu: if is_total {
                "cpu-total".to_string()
            } else {
                parts[0].to_string()
            },
            user: field(1),
            nice: field(2),
            system: field(3),
            idle: field(4),
            iowait: field(5),
            irq: field(6),
            softirq: field(7),
            steal: field(8),
            guest: field(9),
            guest_nice: field(10),
        });
    }
    out
}
