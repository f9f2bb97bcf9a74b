//! CLI command handlers.

pub mod audits;
pub mod auth;
pub mod config;
pub mod contractors;
pub mod incidents;
pub mod permits;
pub mod stations;
pub mod usage;
pub mod users;

use anyhow::Result;
use console::{Style, style};
use serde::Serialize;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Server URL override.
    pub server_url: Option<String>,
    /// Named connection context.
    pub context_name: Option<String>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

/// A follow-up suggestion for well-known failures.
pub fn hint_for(error: &anyhow::Error) -> Option<&'static str> {
    let api = error.downcast_ref::<hse_client::Error>()?;
    if api.is_auth_error() {
        Some("Run 'hse auth login' to start a new session.")
    } else if api.is_rate_limited() {
        Some("The server is throttling requests; try again shortly.")
    } else {
        None
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output helpers
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn print_header(title: &str) {
    println!("{}", style(title).bold());
    println!("{}", Style::new().dim().apply_to("─".repeat(50)));
}

pub(crate) fn print_success(message: &str) {
    println!("{} {}", Style::new().green().apply_to("✓"), message);
}

pub(crate) fn print_empty(what: &str) {
    println!("{}", Style::new().dim().apply_to(format!("No {} found", what)));
}

/// A `label: value` line, skipped when the value is absent.
pub(crate) fn print_field(label: &str, value: Option<&str>) {
    if let Some(value) = value {
        println!("  {:<14} {}", Style::new().dim().apply_to(label), value);
    }
}

pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= max_len {
        s
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
