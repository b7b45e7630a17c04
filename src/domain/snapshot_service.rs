//! Snapshot service — fans out to the probe set and process enumerator.
//!
//! Each call produces a fresh value. Nothing is cached or shared between
//! calls, so concurrent requests are isolated from each other.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::error::{EnumerationError, ProbeError};
use super::probes::{Probe, ProbeSet};
use super::processes::{self, ProcessSource, SysinfoProcessSource};
use super::types::*;
use crate::config::Config;

type SourceFactory = dyn Fn() -> Box<dyn ProcessSource> + Send + Sync;

pub struct SnapshotService {
    probes: ProbeSet,
    process_source: Arc<SourceFactory>,
    process_cap: usize,
    probe_deadline: Duration,
}

impl SnapshotService {
    pub fn new(
        probes: ProbeSet,
        process_source: impl Fn() -> Box<dyn ProcessSource> + Send + Sync + 'static,
    ) -> Self {
        Self {
            probes,
            process_source: Arc::new(process_source),
            process_cap: PROCESS_CAP,
            probe_deadline: Config::default().request_timeout(),
        }
    }

    /// Bound on each probe. A probe still running at the deadline reports
    /// its zero value.
    pub fn with_probe_deadline(mut self, deadline: Duration) -> Self {
        self.probe_deadline = deadline;
        self
    }

    /// Service reading the local host, configured from `config`.
    pub fn from_config(config: &Config) -> Arc<Self> {
        let probes = ProbeSet::local(
            config.cpu_sample_window(),
            config.request_timeout(),
            config.primary_volume.clone(),
        );
        let service = Self::new(probes, || {
            Box::new(SysinfoProcessSource::new()) as Box<dyn ProcessSource>
        })
        .with_probe_deadline(config.request_timeout());
        Arc::new(service)
    }

    /// Collect all five probes concurrently. Never fails: a probe that errors
    /// or misses the deadline contributes its zero value.
    pub async fn collect_system_snapshot(&self) -> SystemSnapshot {
        let deadline = self.probe_deadline;
        let (cpu, memory, disk, network, host) = tokio::join!(
            measure_or_default(self.probes.cpu.as_ref(), deadline),
            measure_or_default(self.probes.memory.as_ref(), deadline),
            measure_or_default(self.probes.disk.as_ref(), deadline),
            measure_or_default(self.probes.network.as_ref(), deadline),
            measure_or_default(self.probes.host.as_ref(), deadline),
        );

        SystemSnapshot {
            cpu,
            memory,
            disk,
            network,
            host,
        }
    }

    /// Enumerate up to the process cap on a blocking worker.
    pub async fn collect_process_snapshot(&self) -> Result<ProcessSnapshot, EnumerationError> {
        let factory = self.process_source.clone();
        let cap = self.process_cap;

        let snapshot = tokio::task::spawn_blocking(move || {
            let mut source = factory();
            processes::enumerate(source.as_mut(), cap)
        })
        .await
        .map_err(|e| EnumerationError::Worker(e.to_string()))??;

        debug!(count = snapshot.len(), "process snapshot collected");
        Ok(snapshot)
    }
}

async fn measure_or_default<T: Default + Send>(
    probe: &dyn Probe<Output = T>,
    deadline: Duration,
) -> T {
    let result = tokio::time::timeout(deadline, probe.measure())
        .await
        .unwrap_or(Err(ProbeError::TimedOut(deadline)));

    result.unwrap_or_else(|e| {
        warn!(probe = probe.name(), error = %e, "probe failed, reporting zero value");
        T::default()
    })
}
