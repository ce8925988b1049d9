//! CSV output formatting.
//!
//! Unset optional fields are written as empty cells.

use crate::discovery::{DiscoveryResult, ScanLog};
use crate::registry::MeterInstance;
use std::io;

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map_or(String::new(), |v| v.to_string())
}

/// Write discovery results as CSV.
pub fn write_results<W: io::Write>(writer: W, results: &[DiscoveryResult]) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "meter_id",
        "ip_address",
        "port",
        "discovered_at",
        "vendor",
        "model",
        "authentication",
        "security_suite",
    ])?;

    for result in results {
        wtr.write_record([
            result.meter_id.to_string(),
            result.ip_address.to_string(),
            result.port.to_string(),
            result.discovered_at.to_rfc3339(),
            opt(result.vendor.as_deref()),
            opt(result.model.as_deref()),
            opt(result.authentication),
            opt(result.security_suite),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write scan logs as CSV.
pub fn write_logs<W: io::Write>(writer: W, logs: &[ScanLog]) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "scan_id",
        "ip_range",
        "ports",
        "total_targets",
        "discovered",
        "started_at",
        "completed_at",
        "cancelled",
    ])?;

    for log in logs {
        wtr.write_record([
            log.scan_id.to_string(),
            log.ip_range.to_string(),
            log.ports.to_string(),
            log.total_targets.to_string(),
            log.discovered.to_string(),
            log.started_at.to_rfc3339(),
            log.completed_at.to_rfc3339(),
            log.cancelled.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write registered meter instances as CSV.
pub fn write_instances<W: io::Write>(writer: W, instances: &[MeterInstance]) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "meter_id",
        "vendor",
        "model",
        "ip_address",
        "port",
        "authentication",
        "security_suite",
    ])?;

    for instance in instances {
        wtr.write_record([
            instance.meter_id.to_string(),
            instance.vendor.clone(),
            instance.model.clone(),
            instance.ip_address.to_string(),
            instance.port.to_string(),
            instance.authentication.to_string(),
            instance.security_suite.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Port, ProbeTarget};
    use chrono::Utc;

    #[test]
    fn test_unidentified_result_has_empty_cells() {
        let target = ProbeTarget::new("10.0.0.9".parse().unwrap(), Port::DLMS);
        let result = DiscoveryResult::unidentified(target, Utc::now());

        let mut buf = Vec::new();
        write_results(&mut buf, &[result]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let row = text.lines().nth(1).unwrap();

        assert!(row.contains(",10.0.0.9,4059,"));
        assert!(row.ends_with(",,,,"));
    }
}
