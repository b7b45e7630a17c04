//! Probe set — one isolated read per metric domain.
//!
//! Every probe builds its own `sysinfo` state for the call, so nothing is
//! shared between concurrent requests. OS reads can block (a hung network
//! mount stalls `statvfs`), so they run on the blocking pool via
//! [`run_blocking`] and never hold up the task polling the other probes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use sysinfo::{
    CpuRefreshKind, Disks, MemoryRefreshKind, Networks, RefreshKind, System,
    MINIMUM_CPU_UPDATE_INTERVAL,
};

use super::error::ProbeError;
use super::types::*;
use crate::config::PrimaryVolume;

/// A read of one metric domain. All-or-nothing: either a complete value or
/// an error, never a partially filled value.
#[async_trait]
pub trait Probe: Send + Sync {
    type Output: Default + Send;

    fn name(&self) -> &'static str;

    async fn measure(&self) -> Result<Self::Output, ProbeError>;
}

pub type BoxedProbe<T> = Box<dyn Probe<Output = T>>;

/// Run a synchronous OS read on the blocking pool.
pub(crate) async fn run_blocking<T, F>(read: F) -> Result<T, ProbeError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ProbeError> + Send + 'static,
{
    tokio::task::spawn_blocking(read)
        .await
        .map_err(|e| ProbeError::Unavailable(format!("probe worker failed: {e}")))?
}

/// The five probes a system snapshot is assembled from.
pub struct ProbeSet {
    pub cpu: BoxedProbe<CpuStats>,
    pub memory: BoxedProbe<MemoryStats>,
    pub disk: BoxedProbe<DiskStats>,
    pub network: BoxedProbe<NetworkStats>,
    pub host: BoxedProbe<HostStats>,
}

impl ProbeSet {
    /// Probes backed by the local operating system.
    pub fn local(cpu_window: Duration, deadline: Duration, volume: PrimaryVolume) -> Self {
        Self {
            cpu: Box::new(CpuProbe::new(cpu_window, deadline)),
            memory: Box::new(MemoryProbe),
            disk: Box::new(DiskProbe::new(volume)),
            network: Box::new(NetworkProbe),
            host: Box::new(HostProbe),
        }
    }
}

// ── CPU ────────────────────────────────────────────────

pub struct CpuProbe {
    window: Duration,
    deadline: Duration,
}

impl CpuProbe {
    pub fn new(window: Duration, deadline: Duration) -> Self {
        Self {
            window: window.max(MINIMUM_CPU_UPDATE_INTERVAL),
            deadline,
        }
    }

    async fn sample(window: Duration) -> Result<CpuStats, ProbeError> {
        let mut sys = run_blocking(|| {
            Ok(System::new_with_specifics(
                RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing().with_cpu_usage()),
            ))
        })
        .await?;
        tokio::time::sleep(window).await;

        run_blocking(move || {
            sys.refresh_cpu_usage();

            let cpus = sys.cpus();
            if cpus.is_empty() {
                return Err(ProbeError::Unavailable("no CPUs reported".into()));
            }

            Ok(CpuStats {
                usage_percent: f64::from(sys.global_cpu_usage()),
                core_count: cpus.len() as u32,
                model_name: cpus[0].brand().trim().to_string(),
            })
        })
        .await
    }
}

#[async_trait]
impl Probe for CpuProbe {
    type Output = CpuStats;

    fn name(&self) -> &'static str {
        "cpu"
    }

    async fn measure(&self) -> Result<CpuStats, ProbeError> {
        tokio::time::timeout(self.deadline, Self::sample(self.window))
            .await
            .map_err(|_| ProbeError::TimedOut(self.deadline))?
    }
}

// ── Memory ─────────────────────────────────────────────

pub struct MemoryProbe;

#[async_trait]
impl Probe for MemoryProbe {
    type Output = MemoryStats;

    fn name(&self) -> &'static str {
        "memory"
    }

    async fn measure(&self) -> Result<MemoryStats, ProbeError> {
        run_blocking(|| {
            let sys = System::new_with_specifics(
                RefreshKind::nothing().with_memory(MemoryRefreshKind::nothing().with_ram()),
            );

            let total = sys.total_memory();
            if total == 0 {
                return Err(ProbeError::Unavailable("total memory reported as zero".into()));
            }
            let used = sys.used_memory();

            Ok(MemoryStats {
                total_bytes: total,
                available_bytes: sys.available_memory(),
                used_bytes: used,
                used_percent: percent_of(used, total),
            })
        })
        .await
    }
}

// ── Disk ───────────────────────────────────────────────

pub struct DiskProbe {
    volume: PrimaryVolume,
}

impl DiskProbe {
    pub fn new(volume: PrimaryVolume) -> Self {
        Self { volume }
    }
}

#[async_trait]
impl Probe for DiskProbe {
    type Output = DiskStats;

    fn name(&self) -> &'static str {
        "disk"
    }

    async fn measure(&self) -> Result<DiskStats, ProbeError> {
        let target = self.volume.path().to_path_buf();
        run_blocking(move || {
            let disks = Disks::new_with_refreshed_list();
            let mounts: Vec<Mount> = disks
                .list()
                .iter()
                .map(|d| Mount {
                    mount_point: d.mount_point().to_path_buf(),
                    total_bytes: d.total_space(),
                    free_bytes: d.available_space(),
                })
                .collect();

            volume_usage(&mounts, &target).ok_or_else(|| {
                ProbeError::Unavailable(format!("no mounted volume holds {}", target.display()))
            })
        })
        .await
    }
}

#[derive(Debug, Clone)]
struct Mount {
    mount_point: PathBuf,
    total_bytes: u64,
    free_bytes: u64,
}

/// Usage of the volume holding `target`: an exact mount point match, else
/// the mount with the longest prefix of `target`.
fn volume_usage(mounts: &[Mount], target: &Path) -> Option<DiskStats> {
    let mount = mounts
        .iter()
        .find(|m| m.mount_point == target)
        .or_else(|| {
            mounts
                .iter()
                .filter(|m| target.starts_with(&m.mount_point))
                .max_by_key(|m| m.mount_point.components().count())
        })?;

    let used = mount.total_bytes.saturating_sub(mount.free_bytes);
    Some(DiskStats {
        total_bytes: mount.total_bytes,
        free_bytes: mount.free_bytes,
        used_bytes: used,
        used_percent: percent_of(used, mount.total_bytes),
    })
}

// ── Network ────────────────────────────────────────────

pub struct NetworkProbe;

#[async_trait]
impl Probe for NetworkProbe {
    type Output = NetworkStats;

    fn name(&self) -> &'static str {
        "network"
    }

    async fn measure(&self) -> Result<NetworkStats, ProbeError> {
        run_blocking(|| {
            let networks = Networks::new_with_refreshed_list();
            if networks.list().is_empty() {
                return Err(ProbeError::Unavailable("no network interfaces".into()));
            }

            Ok(sum_counters(networks.list().values().map(|data| NetworkStats {
                bytes_sent: data.total_transmitted(),
                bytes_recv: data.total_received(),
                packets_sent: data.total_packets_transmitted(),
                packets_recv: data.total_packets_received(),
            })))
        })
        .await
    }
}

fn sum_counters(per_interface: impl Iterator<Item = NetworkStats>) -> NetworkStats {
    per_interface.fold(NetworkStats::default(), |acc, n| NetworkStats {
        bytes_sent: acc.bytes_sent.saturating_add(n.bytes_sent),
        bytes_recv: acc.bytes_recv.saturating_add(n.bytes_recv),
        packets_sent: acc.packets_sent.saturating_add(n.packets_sent),
        packets_recv: acc.packets_recv.saturating_add(n.packets_recv),
    })
}

// ── Host ───────────────────────────────────────────────

pub struct HostProbe;

#[async_trait]
impl Probe for HostProbe {
    type Output = HostStats;

    fn name(&self) -> &'static str {
        "host"
    }

    async fn measure(&self) -> Result<HostStats, ProbeError> {
        run_blocking(|| {
            let hostname = hostname::get()
                .map_err(|e| ProbeError::Unavailable(format!("reading hostname: {e}")))?
                .to_string_lossy()
                .to_string();
            let kernel_version = System::kernel_version()
                .ok_or_else(|| ProbeError::Unavailable("kernel version not reported".into()))?;

            // Rolling distributions have no version id; that is not a failure.
            Ok(HostStats {
                hostname,
                os: std::env::consts::OS.to_string(),
                platform: System::distribution_id(),
                platform_version: System::os_version().unwrap_or_default(),
                kernel_version,
                uptime_seconds: System::uptime(),
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mount(path: &str, total: u64, free: u64) -> Mount {
        Mount {
            mount_point: PathBuf::from(path),
            total_bytes: total,
            free_bytes: free,
        }
    }

    #[test]
    fn volume_exact_match() {
        let mounts = vec![mount("/boot", 100, 50), mount("/", 1000, 250)];
        let stats = volume_usage(&mounts, Path::new("/")).unwrap();
        assert_eq!(stats.total_bytes, 1000);
        assert_eq!(stats.free_bytes, 250);
        assert_eq!(stats.used_bytes, 750);
        assert_eq!(stats.used_percent, 75.0);
    }

    #[test]
    fn volume_longest_prefix() {
        let mounts = vec![mount("/", 1000, 500), mount("/srv", 400, 100)];
        let stats = volume_usage(&mounts, Path::new("/srv/data")).unwrap();
        assert_eq!(stats.total_bytes, 400);
    }

    #[test]
    fn volume_missing() {
        let mounts = vec![mount("/mnt/usb", 10, 5)];
        assert!(volume_usage(&mounts, Path::new("/")).is_none());
        assert!(volume_usage(&[], Path::new("/")).is_none());
    }

    #[test]
    fn counters_are_summed() {
        let total = sum_counters(
            vec![
                NetworkStats {
                    bytes_sent: 10,
                    bytes_recv: 20,
                    packets_sent: 1,
                    packets_recv: 2,
                },
                NetworkStats {
                    bytes_sent: 5,
                    bytes_recv: 5,
                    packets_sent: 3,
                    packets_recv: 4,
                },
            ]
            .into_iter(),
        );
        assert_eq!(total.bytes_sent, 15);
        assert_eq!(total.bytes_recv, 25);
        assert_eq!(total.packets_sent, 4);
        assert_eq!(total.packets_recv, 6);
    }

    #[test]
    fn cpu_window_is_clamped() {
        let probe = CpuProbe::new(Duration::ZERO, Duration::from_secs(1));
        assert_eq!(probe.window, MINIMUM_CPU_UPDATE_INTERVAL);
    }

    #[tokio::test]
    async fn cpu_probe_times_out() {
        let probe = CpuProbe::new(Duration::from_secs(2), Duration::from_millis(10));
        match probe.measure().await {
            Err(ProbeError::TimedOut(d)) => assert_eq!(d, Duration::from_millis(10)),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn blocking_read_leaves_runtime_free() {
        let started = std::time::Instant::now();
        let (slow, tick) = tokio::join!(
            run_blocking(|| {
                std::thread::sleep(Duration::from_millis(300));
                Ok(1)
            }),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                started.elapsed()
            }
        );
        assert_eq!(slow.unwrap(), 1);
        assert!(tick < Duration::from_millis(250), "ticked after {tick:?}");
    }

    #[tokio::test]
    async fn memory_probe_reads_host() {
        let stats = MemoryProbe.measure().await.unwrap();
        assert!(stats.total_bytes > 0);
        assert!(stats.used_percent >= 0.0 && stats.used_percent <= 100.0);
    }
}
