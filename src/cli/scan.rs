//! Scan subcommand implementation.
//!
//! Handles the `meterscan scan <range>` command.

use super::{AppContext, OutputFormat};
use crate::discovery::{DiscoveryEngine, ScanRequest};
use crate::error::CliResult;
use crate::output;
use crate::storage::ScanLogBook;
use crate::types::PortList;
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Scan an address range for metering devices.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Address range in CIDR notation
    ///
    /// Examples:
    ///   192.168.1.0/24     IPv4 network
    ///   10.0.0.7           Single host
    ///   2001:db8::/120     IPv6 network
    #[arg(value_name = "RANGE")]
    pub range: String,

    /// Ports to probe (e.g. "4059", "4059,4063", "4059-4070")
    #[arg(short, long, env = "METERSCAN_PORTS")]
    pub ports: Option<String>,

    /// Maximum number of probes in flight for this scan
    #[arg(short = 'c', long, env = "METERSCAN_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Connect timeout in seconds (fractions allowed)
    #[arg(short = 't', long, env = "METERSCAN_TIMEOUT")]
    pub timeout: Option<f64>,

    /// Number of connection attempts per target
    #[arg(short = 'r', long)]
    pub retries: Option<u32>,

    /// Output format for results
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Don't write the scan log to disk
    #[arg(long)]
    pub no_save: bool,
}

impl ScanCommand {
    /// Build the request from flags, falling back to settings.
    pub fn request(&self, ctx: &AppContext) -> CliResult<ScanRequest> {
        let settings = &ctx.settings;

        let ports: PortList = match &self.ports {
            Some(spec) => spec.parse()?,
            None => settings.default_ports.clone(),
        };

        let request = ScanRequest::parse(&self.range)?
            .with_ports(ports)
            .with_concurrency(self.concurrency.unwrap_or(settings.default_concurrency))
            .with_retries(self.retries.unwrap_or(settings.default_retries));

        let request = match self.timeout {
            Some(secs) => request.with_timeout_secs(secs)?,
            None => request.with_timeout(settings.default_timeout()),
        };

        request.validate()?;
        Ok(request)
    }

    /// Execute the scan command.
    pub async fn execute(&self, ctx: &AppContext, quiet: bool) -> CliResult<()> {
        let request = self.request(ctx)?;
        let format = ctx.output_format(self.output);

        let registry = Arc::new(ctx.open_registry()?);
        let logs = if self.no_save {
            ScanLogBook::in_memory()
        } else {
            ctx.open_logs()
        };
        let engine =
            DiscoveryEngine::new(registry, logs).with_inflight_limit(ctx.settings.inflight_limit);

        debug!(
            worst_case_ms = request.worst_case_duration().as_millis() as u64,
            "Scan bounds computed"
        );

        if !quiet && format == OutputFormat::Plain {
            output::print_scan_header(
                &request.range.to_string(),
                &request.ports.to_string(),
                request.target_count(),
            );
        }

        let cancel = CancellationToken::new();
        let interrupt = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            }
        });

        let result = engine.run(&request, cancel).await;
        interrupt.abort();

        let mut report = result?;
        report.sort();

        output::print_report(&report, format)?;

        if !quiet && format == OutputFormat::Plain {
            if report.log.cancelled {
                output::print_warning("Scan interrupted, results are partial");
            }
            if !self.no_save {
                output::print_info(&format!("Scan logged as {}", report.log.scan_id.short()));
            }
        }

        Ok(())
    }
}
