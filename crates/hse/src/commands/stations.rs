//! Stations command - station management.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use hse_client::{CreateStationRequest, Station};

use super::{Context, print_empty, print_field, print_header, print_json, print_success};
use crate::client::Connection;

/// Arguments for the stations command.
#[derive(Args, Debug)]
pub struct StationsArgs {
    #[command(subcommand)]
    pub command: StationsCommand,
}

#[derive(Subcommand, Debug)]
pub enum StationsCommand {
    /// List stations
    List {
        /// Only stations in this region
        #[arg(short, long)]
        region: Option<String>,
    },

    /// Show a station
    Show {
        /// Station ID
        id: String,
    },

    /// Register a station
    Create {
        /// Station name
        #[arg(long)]
        name: String,

        /// Fuel brand
        #[arg(long)]
        brand: Option<String>,

        /// Region
        #[arg(long)]
        region: Option<String>,

        /// Street address
        #[arg(long)]
        address: Option<String>,

        /// Risk category (e.g. Low, Medium, High)
        #[arg(long)]
        risk_category: Option<String>,

        /// Audit frequency (e.g. Monthly, Quarterly)
        #[arg(long)]
        audit_frequency: Option<String>,
    },

    /// Delete a station
    Delete {
        /// Station ID
        id: String,
    },
}

/// Run the stations command.
pub async fn run(args: StationsArgs, ctx: &Context) -> Result<()> {
    let conn = Connection::open(ctx)?;
    let stations = conn.client.stations();

    match args.command {
        StationsCommand::List { region } => {
            let list = stations.list(region.as_deref()).await?;
            if ctx.json_output {
                return print_json(&list);
            }
            print_header("Stations");
            if list.is_empty() {
                print_empty("stations");
            }
            for station in &list {
                print_row(station);
            }
        }
        StationsCommand::Show { id } => {
            let station = stations.get(&id).await?;
            if ctx.json_output {
                return print_json(&station);
            }
            print_details(&station);
        }
        StationsCommand::Create {
            name,
            brand,
            region,
            address,
            risk_category,
            audit_frequency,
        } => {
            let station = stations
                .create(CreateStationRequest {
                    name,
                    brand,
                    region,
                    address,
                    risk_category,
                    audit_frequency,
                })
                .await?;
            if ctx.json_output {
                return print_json(&station);
            }
            print_success(&format!("Station created: {}", station.id));
        }
        StationsCommand::Delete { id } => {
            stations.delete(&id).await?;
            if ctx.json_output {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            print_success(&format!("Station deleted: {}", id));
        }
    }

    Ok(())
}

fn print_row(station: &Station) {
    let dim = Style::new().dim();
    let status = if station.is_active { "" } else { " (inactive)" };
    println!(
        "{} {}{} {}",
        dim.apply_to(format!("[{}]", station.id)),
        station.name,
        dim.apply_to(status),
        dim.apply_to(station.region.as_deref().unwrap_or("")),
    );
}

fn print_details(station: &Station) {
    print_header(&station.name);
    print_field("ID", Some(&station.id));
    print_field("Brand", station.brand.as_deref());
    print_field("Region", station.region.as_deref());
    print_field("Address", station.address.as_deref());
    print_field("Risk", station.risk_category.as_deref());
    print_field("Audits", station.audit_frequency.as_deref());
    print_field(
        "Active",
        Some(if station.is_active { "yes" } else { "no" }),
    );
}
