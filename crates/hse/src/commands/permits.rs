//! Permits command - work permits.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::{Context, print_empty, print_header, print_json};
use crate::client::Connection;

/// Arguments for the permits command.
#[derive(Args, Debug)]
pub struct PermitsArgs {
    /// Only permits for this station
    #[arg(long)]
    pub station: Option<String>,
}

/// Run the permits command.
pub async fn run(args: PermitsArgs, ctx: &Context) -> Result<()> {
    let conn = Connection::open(ctx)?;
    let permits = conn
        .client
        .work_permits()
        .list(args.station.as_deref())
        .await?;

    if ctx.json_output {
        return print_json(&permits);
    }

    let dim = Style::new().dim();
    print_header("Work Permits");
    if permits.is_empty() {
        print_empty("work permits");
    }
    for permit in &permits {
        println!(
            "{} {} {} {}",
            dim.apply_to(format!("[{}]", permit.id)),
            permit.permit_type,
            permit.status,
            dim.apply_to(format!("{} → {}", permit.valid_from, permit.valid_to)),
        );
    }
    Ok(())
}
