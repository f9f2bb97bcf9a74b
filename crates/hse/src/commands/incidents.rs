//! Incidents command - incident reporting and follow-up.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use console::Style;
use hse_client::{CreateIncidentRequest, Incident, ListIncidentsQuery, UpdateIncidentRequest};

use super::{
    Context, print_empty, print_field, print_header, print_json, print_success, truncate,
};
use crate::client::Connection;

/// Arguments for the incidents command.
#[derive(Args, Debug)]
pub struct IncidentsArgs {
    #[command(subcommand)]
    pub command: IncidentsCommand,
}

#[derive(Subcommand, Debug)]
pub enum IncidentsCommand {
    /// List incidents, one page at a time
    List {
        /// Only incidents at this station
        #[arg(long)]
        station: Option<String>,

        /// Only incidents of this severity
        #[arg(long)]
        severity: Option<String>,

        /// Only incidents with this status
        #[arg(long)]
        status: Option<String>,

        /// Cursor from a previous page
        #[arg(long)]
        cursor: Option<String>,

        /// Page size
        #[arg(short, long, default_value_t = hse_client::api::DEFAULT_PAGE_LIMIT)]
        limit: u32,
    },

    /// Show an incident
    Show {
        /// Incident ID
        id: String,
    },

    /// Report an incident
    Create {
        /// Station where it happened
        #[arg(long)]
        station: String,

        /// Incident type (e.g. Spill, Fire, Injury)
        #[arg(long = "type")]
        incident_type: String,

        /// Severity (e.g. Low, Medium, High, Critical)
        #[arg(long)]
        severity: String,

        /// What happened
        #[arg(long)]
        description: String,
    },

    /// Update an incident's status, severity or description
    Update {
        /// Incident ID
        id: String,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        severity: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Resolution timestamp (RFC 3339)
        #[arg(long)]
        resolved_at: Option<String>,
    },

    /// Delete an incident
    Delete {
        /// Incident ID
        id: String,
    },
}

/// Run the incidents command.
pub async fn run(args: IncidentsArgs, ctx: &Context) -> Result<()> {
    let conn = Connection::open(ctx)?;
    let incidents = conn.client.incidents();

    match args.command {
        IncidentsCommand::List {
            station,
            severity,
            status,
            cursor,
            limit,
        } => {
            let page = incidents
                .list(ListIncidentsQuery {
                    station_id: station,
                    severity,
                    status,
                    cursor,
                    limit,
                })
                .await?;
            if ctx.json_output {
                return print_json(&page);
            }

            let dim = Style::new().dim();
            print_header("Incidents");
            if page.data.is_empty() {
                print_empty("incidents");
            }
            for incident in &page.data {
                println!(
                    "{} {} {} {}",
                    dim.apply_to(format!("[{}]", incident.id)),
                    severity_style(&incident.severity).apply_to(&incident.severity),
                    incident.status,
                    truncate(&incident.description, 50),
                );
            }
            if let Some(next) = page.pagination.next_cursor.as_deref()
                && page.pagination.has_more
            {
                println!();
                println!("{}", dim.apply_to(format!("More results: --cursor {}", next)));
            }
        }
        IncidentsCommand::Show { id } => {
            let incident = incidents.get(&id).await?;
            if ctx.json_output {
                return print_json(&incident);
            }
            print_details(&incident);
        }
        IncidentsCommand::Create {
            station,
            incident_type,
            severity,
            description,
        } => {
            let incident = incidents
                .create(CreateIncidentRequest {
                    station_id: station,
                    incident_type,
                    severity,
                    description,
                })
                .await?;
            if ctx.json_output {
                return print_json(&incident);
            }
            print_success(&format!("Incident reported: {}", incident.id));
        }
        IncidentsCommand::Update {
            id,
            status,
            severity,
            description,
            resolved_at,
        } => {
            let request = UpdateIncidentRequest {
                status,
                severity,
                description,
                resolved_at,
            };
            if request.status.is_none()
                && request.severity.is_none()
                && request.description.is_none()
                && request.resolved_at.is_none()
            {
                bail!("Nothing to update; pass at least one of --status, --severity, --description, --resolved-at");
            }
            let incident = incidents.update(&id, request).await?;
            if ctx.json_output {
                return print_json(&incident);
            }
            print_success(&format!("Incident updated: {} ({})", incident.id, incident.status));
        }
        IncidentsCommand::Delete { id } => {
            incidents.delete(&id).await?;
            if ctx.json_output {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            print_success(&format!("Incident deleted: {}", id));
        }
    }

    Ok(())
}

fn severity_style(severity: &str) -> Style {
    match severity {
        "Critical" | "High" => Style::new().red().bold(),
        "Medium" => Style::new().yellow(),
        _ => Style::new(),
    }
}

fn print_details(incident: &Incident) {
    print_header(&format!("Incident {}", incident.id));
    print_field("Type", Some(&incident.incident_type));
    print_field("Severity", Some(&incident.severity));
    print_field("Status", Some(&incident.status));
    let station = incident
        .station
        .as_ref()
        .map(|s| s.name.clone())
        .unwrap_or_else(|| incident.station_id.clone());
    print_field("Station", Some(&station));
    let reporter = incident.reporter.as_ref().map(|u| u.name.as_str());
    print_field("Reporter", reporter);
    print_field("Reported", Some(&incident.reported_at));
    print_field("Resolved", incident.resolved_at.as_deref());
    println!();
    println!("{}", incident.description);
}
