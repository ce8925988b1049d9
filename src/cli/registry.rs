//! Registry subcommand implementation.
//!
//! Lists templates and instances, and creates instances from templates.

use super::{AppContext, OutputFormat};
use crate::error::CliResult;
use crate::output;
use crate::types::Port;
use clap::{Parser, Subcommand};
use std::net::IpAddr;

/// Manage meter templates and instances.
#[derive(Parser, Debug)]
pub struct RegistryCommand {
    #[command(subcommand)]
    pub action: RegistryAction,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,
}

#[derive(Subcommand, Debug)]
pub enum RegistryAction {
    /// List meter templates
    Templates,

    /// List meter instances
    Instances,

    /// Create one instance of a template
    Add {
        /// Template vendor
        vendor: String,
        /// Template model
        model: String,
        /// Address the instance answers on
        ip: IpAddr,
        /// Port the instance answers on
        #[arg(short, long, default_value_t = Port::DLMS)]
        port: Port,
    },

    /// Create instances of a template on consecutive ports
    Bulk {
        /// Template vendor
        vendor: String,
        /// Template model
        model: String,
        /// Address every instance answers on
        base_ip: IpAddr,
        /// First port
        #[arg(short = 's', long, default_value_t = Port::DLMS)]
        start_port: Port,
        /// Number of instances
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },
}

impl RegistryCommand {
    /// Execute the registry command.
    pub fn execute(&self, ctx: &AppContext, quiet: bool) -> CliResult<()> {
        let format = ctx.output_format(self.output);
        let registry = ctx.open_registry()?;

        match &self.action {
            RegistryAction::Templates => {
                output::print_templates(&registry.list_templates(), format)?;
            }
            RegistryAction::Instances => {
                output::print_instances(&registry.list_instances(), format)?;
            }
            RegistryAction::Add {
                vendor,
                model,
                ip,
                port,
            } => {
                let instance = registry.create_instance(vendor, model, *ip, *port)?;
                ctx.save_registry(&registry)?;
                if !quiet && format == OutputFormat::Plain {
                    output::print_success(&format!("Created meter {}", instance.meter_id));
                } else {
                    output::print_instances(std::slice::from_ref(&instance), format)?;
                }
            }
            RegistryAction::Bulk {
                vendor,
                model,
                base_ip,
                start_port,
                count,
            } => {
                let created = registry.create_bulk(vendor, model, *base_ip, *start_port, *count)?;
                ctx.save_registry(&registry)?;
                if !quiet && format == OutputFormat::Plain {
                    output::print_success(&format!(
                        "Created {} meters of {} {}",
                        created.len(),
                        vendor,
                        model
                    ));
                } else {
                    output::print_instances(&created, format)?;
                }
            }
        }

        Ok(())
    }
}
