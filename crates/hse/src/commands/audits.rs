//! Audits command - audit scheduling and results.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use hse_client::{Audit, CreateAuditRequest, ListAuditsQuery, Page};

use super::{Context, print_empty, print_field, print_header, print_json, print_success};
use crate::client::Connection;

/// Arguments for the audits command.
#[derive(Args, Debug)]
pub struct AuditsArgs {
    #[command(subcommand)]
    pub command: AuditsCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuditsCommand {
    /// List audits, one page at a time
    List {
        /// Only audits for this station
        #[arg(long)]
        station: Option<String>,

        /// Only audits by this auditor
        #[arg(long)]
        auditor: Option<String>,

        /// Only audits with this status
        #[arg(long)]
        status: Option<String>,

        /// Cursor from a previous page
        #[arg(long)]
        cursor: Option<String>,

        /// Page size
        #[arg(short, long, default_value_t = hse_client::api::DEFAULT_PAGE_LIMIT)]
        limit: u32,
    },

    /// Show an audit
    Show {
        /// Audit ID
        id: String,
    },

    /// Schedule an audit
    Create {
        /// Station to audit
        #[arg(long)]
        station: String,

        /// Auditor user ID
        #[arg(long)]
        auditor: String,

        /// Scheduled date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Checklist form ID
        #[arg(long)]
        form: String,
    },

    /// Delete an audit
    Delete {
        /// Audit ID
        id: String,
    },
}

/// Run the audits command.
pub async fn run(args: AuditsArgs, ctx: &Context) -> Result<()> {
    let conn = Connection::open(ctx)?;
    let audits = conn.client.audits();

    match args.command {
        AuditsCommand::List {
            station,
            auditor,
            status,
            cursor,
            limit,
        } => {
            let page = audits
                .list(ListAuditsQuery {
                    station_id: station,
                    auditor_id: auditor,
                    status,
                    cursor,
                    limit,
                })
                .await?;
            if ctx.json_output {
                return print_json(&page);
            }
            print_page(&page);
        }
        AuditsCommand::Show { id } => {
            let audit = audits.get(&id).await?;
            if ctx.json_output {
                return print_json(&audit);
            }
            print_details(&audit);
        }
        AuditsCommand::Create {
            station,
            auditor,
            date,
            form,
        } => {
            let audit = audits
                .create(CreateAuditRequest {
                    station_id: station,
                    auditor_id: auditor,
                    scheduled_date: date,
                    form_id: form,
                })
                .await?;
            if ctx.json_output {
                return print_json(&audit);
            }
            print_success(&format!("Audit scheduled: {}", audit.id));
        }
        AuditsCommand::Delete { id } => {
            audits.delete(&id).await?;
            if ctx.json_output {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            print_success(&format!("Audit deleted: {}", id));
        }
    }

    Ok(())
}

fn print_page(page: &Page<Audit>) {
    let dim = Style::new().dim();
    print_header("Audits");
    if page.data.is_empty() {
        print_empty("audits");
    }
    for audit in &page.data {
        let score = audit
            .overall_score
            .map(|s| format!(" score {:.1}", s))
            .unwrap_or_default();
        println!(
            "{} {} {} {}{}",
            dim.apply_to(format!("[{}]", audit.id)),
            audit.scheduled_date,
            audit.status,
            dim.apply_to(&audit.station_id),
            score,
        );
    }
    if let Some(next) = page.pagination.next_cursor.as_deref()
        && page.pagination.has_more
    {
        println!();
        println!("{}", dim.apply_to(format!("More results: --cursor {}", next)));
    }
}

fn print_details(audit: &Audit) {
    let title = if audit.audit_number.is_empty() {
        format!("Audit {}", audit.id)
    } else {
        format!("Audit {}", audit.audit_number)
    };
    print_header(&title);
    print_field("ID", Some(&audit.id));
    print_field("Status", Some(&audit.status));
    print_field("Scheduled", Some(&audit.scheduled_date));
    print_field("Completed", audit.completed_date.as_deref());
    let station = audit
        .station
        .as_ref()
        .map(|s| s.name.clone())
        .unwrap_or_else(|| audit.station_id.clone());
    print_field("Station", Some(&station));
    let auditor = audit
        .auditor
        .as_ref()
        .map(|u| u.name.clone())
        .unwrap_or_else(|| audit.auditor_id.clone());
    print_field("Auditor", Some(&auditor));
    let score = audit.overall_score.map(|s| format!("{:.1}", s));
    print_field("Score", score.as_deref());
    if !audit.findings.is_empty() {
        print_field("Findings", Some(&audit.findings.len().to_string()));
    }
}
