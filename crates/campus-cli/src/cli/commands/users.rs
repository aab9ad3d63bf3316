//! User management screens.

use anyhow::{Context, Result};
use campus_core::api::users::{self, UserAction, UserFilter};
use campus_core::gateway::GatewayError;

use super::{table, yes_no};
use crate::cli::App;

pub async fn search(app: &App, query: &str, filter: UserFilter, json: bool) -> Result<()> {
    let found = users::search(app.gateway(), query, filter).await?;

    if json {
        let rows: Vec<_> = found
            .iter()
            .map(|u| {
                serde_json::json!({
                    "uid": u.uid,
                    "name": u.full_name(),
                    "email": u.email,
                    "is_admin": u.is_admin,
                    "is_blocked": u.is_blocked,
                    "is_active": u.is_active,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).context("encode users")?
        );
        return Ok(());
    }

    if found.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    let mut table = table(["Name", "Email", "Phone", "Admin", "Blocked", "Active"]);
    for user in &found {
        table.add_row([
            user.full_name(),
            user.email.clone(),
            user.phone.clone().unwrap_or_else(|| "-".to_string()),
            yes_no(user.is_admin).to_string(),
            yes_no(user.is_blocked).to_string(),
            yes_no(user.is_active).to_string(),
        ]);
    }
    println!("{table}");
    println!("{} user(s)", found.len());
    Ok(())
}

/// Blocks, unblocks or promotes the user with `email`.
pub async fn act(app: &App, action: UserAction, email: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        anyhow::bail!("Email is required");
    }

    let result = match action {
        UserAction::Block => users::block(app.gateway(), email).await,
        UserAction::Unblock => users::unblock(app.gateway(), email).await,
        UserAction::Promote => users::promote_to_admin(app.gateway(), email).await,
    };

    match result {
        Ok(_) => {
            println!("{}", success_message(action, email));
            Ok(())
        }
        // the gateway already redirected; keep the typed error for main
        Err(e @ GatewayError::AuthFailure { .. }) => Err(e.into()),
        Err(e) => {
            tracing::warn!(action = action.verb(), error = %e, "user action failed");
            anyhow::bail!(users::action_failure_message(action, &e))
        }
    }
}

fn success_message(action: UserAction, email: &str) -> String {
    match action {
        UserAction::Block => format!("User {email} has been blocked."),
        UserAction::Unblock => format!("User {email} has been unblocked."),
        UserAction::Promote => format!("User {email} is now an admin."),
    }
}

pub async fn stats(app: &App) -> Result<()> {
    let stats = users::stats(app.gateway()).await?;

    let mut table = table(["Users", "Count", "Share"]);
    let rows = [
        ("Total", stats.total_users),
        ("Active", stats.active_users),
        ("Inactive", stats.inactive_users),
        ("Blocked", stats.blocked_users),
        ("Admins", stats.admin_users),
        ("With phone", stats.users_with_phone),
        ("Without phone", stats.users_without_phone),
        ("With location", stats.users_with_location),
        ("Without location", stats.users_without_location),
    ];
    for (label, value) in rows {
        table.add_row([
            label.to_string(),
            value.to_string(),
            format!("{}%", stats.share(value)),
        ]);
    }
    println!("{table}");
    Ok(())
}
