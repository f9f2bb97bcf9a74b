//! Contractors command.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::{Context, print_empty, print_header, print_json};
use crate::client::Connection;

/// Arguments for the contractors command.
#[derive(Args, Debug)]
pub struct ContractorsArgs {
    /// Only contractors with this status (e.g. Active)
    #[arg(long)]
    pub status: Option<String>,
}

/// Run the contractors command.
pub async fn run(args: ContractorsArgs, ctx: &Context) -> Result<()> {
    let conn = Connection::open(ctx)?;
    let mut contractors = conn.client.contractors().list().await?;
    if let Some(status) = &args.status {
        contractors.retain(|c| c.status.eq_ignore_ascii_case(status));
    }

    if ctx.json_output {
        return print_json(&contractors);
    }

    let dim = Style::new().dim();
    print_header("Contractors");
    if contractors.is_empty() {
        print_empty("contractors");
    }
    for contractor in &contractors {
        println!(
            "{} {} {} {}",
            dim.apply_to(format!("[{}]", contractor.id)),
            contractor.name,
            dim.apply_to(contractor.specialization.as_deref().unwrap_or("")),
            contractor.status,
        );
    }
    Ok(())
}
