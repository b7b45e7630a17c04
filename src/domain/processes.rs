//! Process enumerator — bounded inspection of the live process table.

use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System};

use super::error::EnumerationError;
use super::types::*;

/// Per-field reads on one opened process. `None` means the field could not
/// be read; the caller substitutes a default.
pub trait ProcessHandle {
    fn name(&self) -> Option<String>;
    fn cpu_percent(&self) -> Option<f64>;
    fn resident_memory(&self) -> Option<u64>;
    fn status(&self) -> Option<String>;
}

pub trait ProcessSource {
    /// Live process ids in enumeration order.
    fn pids(&mut self) -> Result<Vec<i32>, EnumerationError>;

    /// Open a process for inspection. `None` when it has already exited or
    /// cannot be accessed. Only pids within the cap are ever opened.
    fn open(&mut self, pid: i32) -> Option<Box<dyn ProcessHandle + '_>>;
}

/// Inspect the first `cap` enumerated pids.
///
/// A pid that cannot be opened still consumes its slot and is dropped from
/// the result, so the walk never reaches past the first `cap` pids.
pub fn enumerate(
    source: &mut dyn ProcessSource,
    cap: usize,
) -> Result<ProcessSnapshot, EnumerationError> {
    let pids = source.pids()?;

    let processes = pids
        .into_iter()
        .take(cap)
        .filter_map(|pid| {
            let handle = source.open(pid)?;
            Some(ProcessRecord {
                pid,
                name: handle.name().unwrap_or_else(|| UNKNOWN.to_string()),
                cpu_percent: handle.cpu_percent().unwrap_or(0.0),
                resident_memory_bytes: handle.resident_memory().unwrap_or(0),
                status: handle.status().unwrap_or_else(|| UNKNOWN.to_string()),
            })
        })
        .collect();

    Ok(ProcessSnapshot { processes })
}

// ── sysinfo-backed source ──────────────────────────────

pub struct SysinfoProcessSource {
    sys: System,
}

impl SysinfoProcessSource {
    pub fn new() -> Self {
        Self { sys: System::new() }
    }
}

impl Default for SysinfoProcessSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSource for SysinfoProcessSource {
    fn pids(&mut self) -> Result<Vec<i32>, EnumerationError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(EnumerationError::Listing(format!(
                "process listing is not supported on {}",
                std::env::consts::OS
            )));
        }

        // Listing only; per-process reads happen in `open`.
        self.sys
            .refresh_processes_specifics(ProcessesToUpdate::All, true, ProcessRefreshKind::nothing());

        let mut pids: Vec<i32> = self
            .sys
            .processes()
            .keys()
            .filter_map(|pid| i32::try_from(pid.as_u32()).ok())
            .collect();
        // The process table is a map; list it the way the kernel does.
        pids.sort_unstable();
        Ok(pids)
    }

    fn open(&mut self, pid: i32) -> Option<Box<dyn ProcessHandle + '_>> {
        let pid = Pid::from_u32(u32::try_from(pid).ok()?);
        let refreshed = self.sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );
        if refreshed == 0 {
            return None;
        }
        self.sys
            .process(pid)
            .map(|p| Box::new(SysinfoHandle(p)) as Box<dyn ProcessHandle + '_>)
    }
}

struct SysinfoHandle<'a>(&'a Process);

impl ProcessHandle for SysinfoHandle<'_> {
    fn name(&self) -> Option<String> {
        let name = self.0.name().to_string_lossy();
        if name.is_empty() {
            None
        } else {
            Some(name.into_owned())
        }
    }

    /// Lifetime average: CPU time consumed over wall time since start.
    fn cpu_percent(&self) -> Option<f64> {
        let run_time = self.0.run_time();
        if run_time == 0 {
            return None;
        }
        let cpu_secs = self.0.accumulated_cpu_time() as f64 / 1000.0;
        Some(cpu_secs / run_time as f64 * 100.0)
    }

    fn resident_memory(&self) -> Option<u64> {
        Some(self.0.memory())
    }

    fn status(&self) -> Option<String> {
        status_label(self.0.status())
    }
}

fn status_label(status: ProcessStatus) -> Option<String> {
    let label = match status {
        ProcessStatus::Run => "running".to_string(),
        ProcessStatus::Sleep => "sleeping".to_string(),
        ProcessStatus::Stop => "stopped".to_string(),
        ProcessStatus::Zombie => "zombie".to_string(),
        ProcessStatus::Idle => "idle".to_string(),
        ProcessStatus::Dead => "dead".to_string(),
        ProcessStatus::Unknown(_) => return None,
        other => other.to_string().to_lowercase(),
    };
    Some(label)
}
