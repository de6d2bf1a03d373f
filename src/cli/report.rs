use colored::Colorize;
use std::fmt::Write;

use super::OutputFormat;
use crate::core::{HostRecord, Selection};
use crate::errors::SelectorResult;

/// What goes to stdout: the bare name, or the full JSON report.
pub fn render(selection: &Selection, format: OutputFormat) -> SelectorResult<String> {
    match format {
        OutputFormat::Fqdn => Ok(selection.selected_host.name.clone()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(selection)?),
    }
}

/// Human-readable rundown for stderr, hosts sorted by name.
pub fn verbose_summary(selection: &Selection) -> String {
    let mut hosts: Vec<&HostRecord> = selection.all_hosts.iter().collect();
    hosts.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = String::new();
    let _ = writeln!(out, "\n{}", "=== All Hosts ===".bold());
    for host in hosts {
        let _ = writeln!(out, "\nHost: {}", host.name.bold());
        let _ = writeln!(
            out,
            "  CPU Available: {:.0} MHz ({:.1}%)",
            host.cpu_available_mhz, host.cpu_available_percent
        );
        let _ = writeln!(
            out,
            "  Memory Available: {:.0} MB ({:.1}%)",
            host.memory_available_mb, host.memory_available_percent
        );
        let _ = writeln!(out, "  VMs: {}", host.num_vms);
        if let Some(score) = host.balanced_score {
            let _ = writeln!(out, "  Balanced Score: {:.1}%", score);
        }
    }
    let _ = writeln!(
        out,
        "\n=== Selected Best Host: {} ===\n",
        selection.selected_host.name.green().bold()
    );
    out
}
