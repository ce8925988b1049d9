//! Logs subcommand implementation.
//!
//! Lists, shows and prunes recorded scan logs.

use super::{AppContext, OutputFormat};
use crate::error::{CliError, CliResult};
use crate::output;
use crate::storage::JsonLogStore;
use clap::Parser;

/// View scan history.
#[derive(Parser, Debug)]
pub struct LogsCommand {
    /// Number of logs to show
    #[arg(short = 'n', long, default_value = "10")]
    pub count: usize,

    /// Show a single scan log by ID or ID prefix
    #[arg(long, value_name = "ID")]
    pub show: Option<String>,

    /// Delete logs older than this many days
    #[arg(long, value_name = "DAYS")]
    pub prune: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

impl LogsCommand {
    /// Execute the logs command.
    pub fn execute(&self, ctx: &AppContext, quiet: bool) -> CliResult<()> {
        let format = ctx.output_format(self.output);

        if let Some(days) = self.prune {
            let store = JsonLogStore::open(&ctx.log_dir)?;
            let removed = store.prune(chrono::Duration::days(i64::from(days)))?;
            if !quiet {
                output::print_success(&format!("Removed {} scan log(s)", removed));
            }
            return Ok(());
        }

        if let Some(prefix) = &self.show {
            if prefix.is_empty() {
                return Err(CliError::Other("scan ID prefix is empty".to_string()));
            }
            let store = JsonLogStore::open(&ctx.log_dir)?;
            let log = store.find_by_prefix(prefix)?;
            return Ok(output::print_logs(std::slice::from_ref(&log), format)?);
        }

        let mut logs = ctx.open_logs().list();
        logs.truncate(self.count);
        output::print_logs(&logs, format)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppSettings;
    use crate::discovery::ScanLog;
    use crate::types::{AddressRange, PortList, ScanId};
    use chrono::Utc;

    fn context(dir: &std::path::Path) -> AppContext {
        AppContext {
            settings: AppSettings::default(),
            log_dir: dir.join("scans"),
            registry_file: dir.join("registry.json"),
        }
    }

    fn write_log(ctx: &AppContext, age_days: i64) -> ScanLog {
        let started = Utc::now() - chrono::Duration::days(age_days);
        let log = ScanLog {
            scan_id: ScanId::new(),
            ip_range: AddressRange::parse("192.0.2.0/30").unwrap(),
            ports: PortList::default(),
            total_targets: 2,
            discovered: 0,
            started_at: started,
            completed_at: started,
            cancelled: false,
        };
        JsonLogStore::open(&ctx.log_dir).unwrap().save(&log).unwrap();
        log
    }

    #[test]
    fn test_prune_removes_old_logs() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        write_log(&ctx, 30);
        let recent = write_log(&ctx, 0);

        let cmd = LogsCommand::try_parse_from(["logs", "--prune", "7"]).unwrap();
        cmd.execute(&ctx, true).unwrap();

        let remaining = ctx.open_logs().list();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].scan_id, recent.scan_id);
    }

    #[test]
    fn test_show_unknown_prefix_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        write_log(&ctx, 0);

        let cmd = LogsCommand::try_parse_from(["logs", "--show", "zzzzzzzz"]).unwrap();
        assert!(cmd.execute(&ctx, true).is_err());
    }
}
