//! HTML fragments for in-place dashboard refresh.
//!
//! Every value is shown human-formatted and also carried raw in a
//! `data-value` attribute, so a fragment holds exactly the fields of the
//! JSON form it was rendered alongside.

use std::fmt::{Display, Write};

use crate::domain::types::{ProcessSnapshot, SystemSnapshot};
use crate::format::{format_bytes, format_percent, format_uptime, status_class};

pub trait Fragment {
    fn render_fragment(&self) -> String;
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

struct Cards {
    out: String,
}

impl Cards {
    fn section(&mut self, key: &str, title: &str, body: impl FnOnce(&mut Self)) {
        let _ = write!(
            self.out,
            r#"<section class="stat-card rounded-lg bg-white p-4 shadow" data-section="{key}"><h3 class="text-lg font-semibold">{title}</h3><dl>"#
        );
        body(self);
        self.out.push_str("</dl></section>");
    }

    fn field(&mut self, key: &str, label: &str, raw: impl Display, shown: &str) {
        let _ = write!(
            self.out,
            r#"<dt>{label}</dt><dd data-field="{key}" data-value="{}">{}</dd>"#,
            escape_html(&raw.to_string()),
            escape_html(shown),
        );
    }
}

impl Fragment for SystemSnapshot {
    fn render_fragment(&self) -> String {
        let mut c = Cards {
            out: String::from(
                r#"<div id="system-stats" class="grid grid-cols-1 gap-4 md:grid-cols-2 xl:grid-cols-3">"#,
            ),
        };

        let cpu = &self.cpu;
        c.section("cpu", "CPU", |c| {
            c.field("usage_percent", "Usage", cpu.usage_percent, &format_percent(cpu.usage_percent));
            c.field("core_count", "Cores", cpu.core_count, &cpu.core_count.to_string());
            c.field("model_name", "Model", &cpu.model_name, &cpu.model_name);
        });

        let mem = &self.memory;
        c.section("memory", "Memory", |c| {
            c.field("total_bytes", "Total", mem.total_bytes, &format_bytes(mem.total_bytes));
            c.field("available_bytes", "Available", mem.available_bytes, &format_bytes(mem.available_bytes));
            c.field("used_bytes", "Used", mem.used_bytes, &format_bytes(mem.used_bytes));
            c.field("used_percent", "Used %", mem.used_percent, &format_percent(mem.used_percent));
        });

        let disk = &self.disk;
        c.section("disk", "Disk", |c| {
            c.field("total_bytes", "Total", disk.total_bytes, &format_bytes(disk.total_bytes));
            c.field("free_bytes", "Free", disk.free_bytes, &format_bytes(disk.free_bytes));
            c.field("used_bytes", "Used", disk.used_bytes, &format_bytes(disk.used_bytes));
            c.field("used_percent", "Used %", disk.used_percent, &format_percent(disk.used_percent));
        });

        let net = &self.network;
        c.section("network", "Network", |c| {
            c.field("bytes_sent", "Sent", net.bytes_sent, &format_bytes(net.bytes_sent));
            c.field("bytes_recv", "Received", net.bytes_recv, &format_bytes(net.bytes_recv));
            c.field("packets_sent", "Packets sent", net.packets_sent, &net.packets_sent.to_string());
            c.field("packets_recv", "Packets received", net.packets_recv, &net.packets_recv.to_string());
        });

        let host = &self.host;
        c.section("host", "Host", |c| {
            c.field("hostname", "Hostname", &host.hostname, &host.hostname);
            c.field("os", "OS", &host.os, &host.os);
            c.field("platform", "Platform", &host.platform, &host.platform);
            c.field("platform_version", "Version", &host.platform_version, &host.platform_version);
            c.field("kernel_version", "Kernel", &host.kernel_version, &host.kernel_version);
            c.field("uptime_seconds", "Uptime", host.uptime_seconds, &format_uptime(host.uptime_seconds));
        });

        c.out.push_str("</div>");
        c.out
    }
}

impl Fragment for ProcessSnapshot {
    fn render_fragment(&self) -> String {
        let mut out = String::from(
            r#"<table id="process-list" class="min-w-full divide-y divide-gray-200"><thead><tr><th>PID</th><th>Name</th><th>CPU</th><th>Memory</th><th>Status</th></tr></thead><tbody>"#,
        );

        if self.processes.is_empty() {
            out.push_str(r#"<tr><td colspan="5">No processes found</td></tr>"#);
        }

        for p in &self.processes {
            let name = escape_html(&p.name);
            let status = escape_html(&p.status);
            let _ = write!(
                out,
                concat!(
                    r#"<tr data-pid="{pid}">"#,
                    r#"<td data-field="pid" data-value="{pid}">{pid}</td>"#,
                    r#"<td data-field="name" data-value="{name}">{name}</td>"#,
                    r#"<td data-field="cpu_percent" data-value="{cpu}">{cpu_shown}</td>"#,
                    r#"<td data-field="resident_memory_bytes" data-value="{mem}">{mem_shown}</td>"#,
                    r#"<td data-field="status" data-value="{status}"><span class="rounded-full px-2 text-xs {class}">{status}</span></td>"#,
                    "</tr>"
                ),
                pid = p.pid,
                name = name,
                cpu = p.cpu_percent,
                cpu_shown = format_percent(p.cpu_percent),
                mem = p.resident_memory_bytes,
                mem_shown = format_bytes(p.resident_memory_bytes),
                status = status,
                class = status_class(&p.status),
            );
        }

        out.push_str("</tbody></table>");
        out
    }
}
