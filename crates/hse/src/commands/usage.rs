//! Usage command.

use anyhow::Result;
use clap::Args;
use serde_json::Value;

use super::{Context, print_header, print_json};
use crate::client::Connection;

/// Arguments for the usage command.
#[derive(Args, Debug)]
pub struct UsageArgs {}

/// Run the usage command.
pub async fn run(_args: UsageArgs, ctx: &Context) -> Result<()> {
    let conn = Connection::open(ctx)?;
    let usage = conn.client.usage().current().await?;

    if ctx.json_output {
        return print_json(&usage);
    }

    print_header("Usage");
    match &usage {
        Value::Object(map) => {
            for (key, value) in map {
                println!("  {:<20} {}", key, render(value));
            }
        }
        Value::Null => super::print_empty("usage data"),
        other => println!("{}", render(other)),
    }
    Ok(())
}

/// One-line rendering of a usage value.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => match (map.get("used"), map.get("limit")) {
            (Some(used), Some(limit)) => format!("{} / {}", render(used), render(limit)),
            _ => value.to_string(),
        },
        other => other.to_string(),
    }
}
