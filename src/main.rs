use anyhow::{Context, Result};
use clap::Parser;
use meterscan::cli::{AppContext, Cli, Commands};
use meterscan::output;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` wins over the verbosity flags.
fn init_tracing(verbose: bool, quiet: bool) {
    let default = if verbose {
        "meterscan=debug"
    } else if quiet {
        "meterscan=warn"
    } else {
        "meterscan=info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = AppContext::load(cli.config.as_deref()).context("failed to load configuration")?;

    match &cli.command {
        Commands::Scan(cmd) => cmd.execute(&ctx, cli.quiet).await.context("scan failed")?,
        Commands::Logs(cmd) => cmd.execute(&ctx, cli.quiet).context("logs command failed")?,
        Commands::Registry(cmd) => cmd
            .execute(&ctx, cli.quiet)
            .context("registry command failed")?,
    }

    Ok(())
}
