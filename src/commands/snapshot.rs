//! `sysara snapshot` — take one local snapshot and print it.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use super::OutputFormat;
use crate::config;
use crate::domain::snapshot_service::SnapshotService;
use crate::domain::types::{ProcessSnapshot, SystemSnapshot};
use crate::format::{format_bytes, format_percent, format_uptime};

#[derive(Serialize)]
struct LocalSnapshot {
    system: SystemSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    processes: Option<ProcessSnapshot>,
}

pub fn run(format: OutputFormat, processes: bool, config_path: Option<&str>) -> Result<()> {
    let cfg = config::load(config_path.map(Path::new))?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let service = SnapshotService::from_config(&cfg);
        let system = service.collect_system_snapshot().await;
        let processes = if processes {
            Some(service.collect_process_snapshot().await?)
        } else {
            None
        };

        match format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&LocalSnapshot { system, processes })?;
                println!("{}", json);
            }
            OutputFormat::Table => {
                print_system(&system);
                if let Some(ref p) = processes {
                    println!();
                    print_processes(p);
                }
            }
        }
        Ok::<_, anyhow::Error>(())
    })
}

fn colored_percent(pct: f64) -> String {
    let s = format_percent(pct);
    if pct > 90.0 {
        s.red().to_string()
    } else if pct > 75.0 {
        s.yellow().to_string()
    } else {
        s
    }
}

pub fn print_system(snap: &SystemSnapshot) {
    println!("{}", "═══ System Snapshot ═══".cyan().bold());
    println!("  Hostname:      {}", snap.host.hostname.bold());
    println!();

    println!("{}", "── Host ──".yellow());
    println!("  OS:              {}", snap.host.os);
    println!(
        "  Platform:        {} {}",
        snap.host.platform, snap.host.platform_version
    );
    println!("  Kernel:          {}", snap.host.kernel_version);
    println!("  Uptime:          {}", format_uptime(snap.host.uptime_seconds));

    println!();
    println!("{}", "── CPU ──".yellow());
    println!("  Model:           {}", snap.cpu.model_name);
    println!("  Cores:           {}", snap.cpu.core_count);
    println!("  Usage:           {}", colored_percent(snap.cpu.usage_percent));

    println!();
    println!("{}", "── Memory ──".yellow());
    println!(
        "  Used:            {} / {} ({})",
        format_bytes(snap.memory.used_bytes),
        format_bytes(snap.memory.total_bytes),
        colored_percent(snap.memory.used_percent)
    );
    println!("  Available:       {}", format_bytes(snap.memory.available_bytes));

    println!();
    println!("{}", "── Disk ──".yellow());
    println!(
        "  Used:            {} / {} ({})",
        format_bytes(snap.disk.used_bytes),
        format_bytes(snap.disk.total_bytes),
        colored_percent(snap.disk.used_percent)
    );
    println!("  Free:            {}", format_bytes(snap.disk.free_bytes));

    println!();
    println!("{}", "── Network ──".yellow());
    println!(
        "  Sent:            {} ({} packets)",
        format_bytes(snap.network.bytes_sent),
        snap.network.packets_sent
    );
    println!(
        "  Received:        {} ({} packets)",
        format_bytes(snap.network.bytes_recv),
        snap.network.packets_recv
    );
}

pub fn print_processes(snap: &ProcessSnapshot) {
    println!("{}", "═══ Processes ═══".cyan().bold());
    if snap.is_empty() {
        println!("  {}", "no processes".dimmed());
        return;
    }

    println!(
        "  {:>7}  {:<24} {:>7} {:>10}  {}",
        "PID".dimmed(),
        "NAME".dimmed(),
        "CPU".dimmed(),
        "MEMORY".dimmed(),
        "STATUS".dimmed()
    );
    for p in &snap.processes {
        let status = match p.status.as_str() {
            "running" => p.status.green().to_string(),
            "zombie" => p.status.yellow().to_string(),
            "stopped" => p.status.red().to_string(),
            _ => p.status.clone(),
        };
        println!(
            "  {:>7}  {:<24} {:>7} {:>10}  {}",
            p.pid,
            truncate(&p.name, 24),
            format_percent(p.cpu_percent),
            format_bytes(p.resident_memory_bytes),
            status
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max - 1).collect();
        out.push('…');
        out
    }
}
