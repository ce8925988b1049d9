//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of discovery
//! results, scan logs and registry contents.

mod csv_format;
mod json_format;
mod plain;

pub use json_format::print_json;
pub use plain::{print_error, print_info, print_scan_header, print_success, print_warning};

use crate::cli::OutputFormat;
use crate::discovery::{ScanLog, ScanReport};
use crate::registry::{MeterInstance, MeterTemplate};
use std::io;

/// Print a scan report in the requested format.
///
/// JSON carries the log and results together; CSV carries only the results.
pub fn print_report(report: &ScanReport, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::print_report(report),
        OutputFormat::Json => print_json(report),
        OutputFormat::Csv => csv_format::write_results(io::stdout().lock(), &report.results),
    }
}

/// Print scan logs in the requested format.
pub fn print_logs(logs: &[ScanLog], format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::print_logs(logs),
        OutputFormat::Json => print_json(logs),
        OutputFormat::Csv => csv_format::write_logs(io::stdout().lock(), logs),
    }
}

/// Print registered meter instances in the requested format.
pub fn print_instances(instances: &[MeterInstance], format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::print_instances(instances),
        OutputFormat::Json => print_json(instances),
        OutputFormat::Csv => csv_format::write_instances(io::stdout().lock(), instances),
    }
}

/// Print meter templates. Templates are nested, so CSV falls back to JSON.
pub fn print_templates(templates: &[MeterTemplate], format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::print_templates(templates),
        OutputFormat::Json | OutputFormat::Csv => print_json(templates),
    }
}
