//! Users command.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::{Context, print_empty, print_header, print_json};
use crate::client::Connection;

/// Arguments for the users command.
#[derive(Args, Debug)]
pub struct UsersArgs {
    /// Only users with this role
    #[arg(long)]
    pub role: Option<String>,
}

/// Run the users command.
pub async fn run(args: UsersArgs, ctx: &Context) -> Result<()> {
    let conn = Connection::open(ctx)?;
    let mut users = conn.client.users().list().await?;
    if let Some(role) = &args.role {
        users.retain(|u| u.role.eq_ignore_ascii_case(role));
    }

    if ctx.json_output {
        return print_json(&users);
    }

    let dim = Style::new().dim();
    print_header("Users");
    if users.is_empty() {
        print_empty("users");
    }
    for user in &users {
        println!(
            "{} {} <{}> {}",
            dim.apply_to(format!("[{}]", user.id)),
            user.name,
            user.email,
            dim.apply_to(&user.role),
        );
    }
    Ok(())
}
