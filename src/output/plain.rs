//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::discovery::{DiscoveryResult, ScanLog, ScanReport};
use crate::registry::{MeterInstance, MeterTemplate};
use crate::types::ProbeTarget;
use console::style;
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Print a scan report in human-readable form.
pub fn print_report(report: &ScanReport) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let log = &report.log;

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(
        out,
        "                  {} Discovery Results",
        style("meterscan").cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    writeln!(out, "  {} {}", style("Range:").bold(), log.ip_range)?;
    writeln!(out, "  {} {}", style("Ports:").bold(), log.ports)?;
    writeln!(
        out,
        "  {} {}",
        style("Scan ID:").bold(),
        style(log.scan_id.short()).dim()
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "  {} {} targets probed in {:.2}s",
        style("Statistics:").bold(),
        log.total_targets,
        log.duration().num_milliseconds() as f64 / 1000.0
    )?;
    writeln!(
        out,
        "               {} reachable, {} identified",
        style(log.discovered).green().bold(),
        style(report.identified_count()).cyan()
    )?;
    if log.cancelled {
        writeln!(out, "               {}", style("scan was cancelled").yellow())?;
    }
    writeln!(out)?;

    if report.results.is_empty() {
        writeln!(out, "  {}", style("No reachable endpoints.").dim())?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:<22}  {:<16}  {:<8}  {:<5}  {}",
            style("ENDPOINT").bold(),
            style("VENDOR").bold(),
            style("MODEL").bold(),
            style("AUTH").bold(),
            style("METER ID").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for result in &report.results {
            print_result_row(&mut out, result)?;
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

fn print_result_row(out: &mut impl Write, result: &DiscoveryResult) -> io::Result<()> {
    let endpoint = result.target().to_string();
    if result.is_identified() {
        writeln!(
            out,
            "  {:<22}  {:<16}  {:<8}  {:<5}  {}",
            style(endpoint).green().bold(),
            truncate_string(result.vendor.as_deref().unwrap_or_default(), 16),
            truncate_string(result.model.as_deref().unwrap_or_default(), 8),
            result
                .authentication
                .map(|a| a.to_string())
                .unwrap_or_default(),
            style(result.meter_id).dim()
        )
    } else {
        writeln!(
            out,
            "  {:<22}  {:<16}  {:<8}  {:<5}  {}",
            style(endpoint).yellow(),
            style("unidentified").dim(),
            "",
            "",
            style(result.meter_id).dim()
        )
    }
}

/// Print scan logs as a table, newest first.
pub fn print_logs(logs: &[ScanLog]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if logs.is_empty() {
        writeln!(out, "{}", style("No scans recorded.").dim())?;
        return Ok(());
    }

    writeln!(
        out,
        "{:<8}  {:<19}  {}",
        style("ID").bold(),
        style("STARTED").bold(),
        style("SUMMARY").bold()
    )?;
    for log in logs {
        writeln!(
            out,
            "{:<8}  {:<19}  {}",
            style(log.scan_id.short()).dim(),
            log.started_at.format("%Y-%m-%d %H:%M:%S"),
            log.summary()
        )?;
    }

    Ok(())
}

/// Print registered meter instances.
pub fn print_instances(instances: &[MeterInstance]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if instances.is_empty() {
        writeln!(out, "{}", style("No meter instances registered.").dim())?;
        return Ok(());
    }

    for instance in instances {
        writeln!(
            out,
            "{}  {:<22}  {} {}  auth={} suite={}",
            style(instance.meter_id).dim(),
            ProbeTarget::new(instance.ip_address, instance.port).to_string(),
            style(&instance.vendor).bold(),
            instance.model,
            instance.authentication,
            instance.security_suite
        )?;
    }

    Ok(())
}

/// Print registered meter templates.
pub fn print_templates(templates: &[MeterTemplate]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for template in templates {
        let auth: Vec<String> = template
            .authentication_modes
            .iter()
            .map(|a| a.to_string())
            .collect();
        let suites: Vec<String> = template
            .security_suites
            .iter()
            .map(|s| s.to_string())
            .collect();

        writeln!(
            out,
            "{} {}  ({:?})  auth=[{}] suites=[{}]",
            style(&template.vendor).bold(),
            template.model,
            template.referencing,
            auth.join(", "),
            suites.join(", ")
        )?;
        for object in &template.obis_objects {
            writeln!(
                out,
                "    {:<12} {} {}",
                object.code,
                object.description,
                style(object.unit.as_deref().unwrap_or_default()).dim()
            )?;
        }
    }

    Ok(())
}

/// Print a header before scanning begins.
pub fn print_scan_header(range: &str, ports: &str, targets: usize) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("meterscan").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{} Range: {}", style("•").dim(), style(range).white().bold());
    println!("{} Ports: {}", style("•").dim(), style(ports).yellow());
    println!(
        "{} Probing {} targets...",
        style("•").dim(),
        style(targets).white().bold()
    );
    println!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate a string to a maximum length in characters, adding ellipsis if truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
