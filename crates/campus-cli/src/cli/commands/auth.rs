//! Login, logout and session status.

use std::io::{self, BufRead, Read, Write};

use anyhow::{Context, Result};
use campus_core::api::auth;
use campus_core::config::paths;
use campus_core::session::redact_token;

use super::yes_no;
use crate::cli::App;

pub async fn login(app: &App, email: &str, password_stdin: bool) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        anyhow::bail!("Email is required");
    }

    let password = read_password(password_stdin)?;
    if password.is_empty() {
        anyhow::bail!("Password is required");
    }

    let outcome = match auth::sign_in(app.gateway(), email, &password).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(error = %e, "sign-in failed");
            anyhow::bail!(auth::sign_in_failure_message(&e));
        }
    };

    let who = match outcome.user.display_name() {
        name if name.is_empty() => email.to_string(),
        name => name,
    };
    if outcome.user.is_admin {
        println!("Signed in as {who}.");
    } else {
        println!("Signed in as {who}, without admin privileges.");
    }
    Ok(())
}

pub fn logout(app: &App) -> Result<()> {
    if auth::sign_out(app.gateway())? {
        println!("Signed out.");
    } else {
        println!("No active session.");
    }
    Ok(())
}

pub fn status(app: &App) -> Result<()> {
    println!("Backend:    {}", app.gateway().base_url());
    println!("Session:    {}", paths::session_path().display());

    match app.store().load().context("read session")? {
        Some(session) => {
            println!("Signed in:  yes");
            println!("Token:      {}", redact_token(&session.token));
            println!("Admin:      {}", yes_no(session.is_admin));
        }
        None => println!("Signed in:  no"),
    }

    match app.config().validation_path() {
        Some(path) => println!("Validation: remote ({path})"),
        None => println!("Validation: local"),
    }
    Ok(())
}

fn read_password(from_stdin: bool) -> Result<String> {
    let mut password = String::new();
    if from_stdin {
        io::stdin()
            .read_to_string(&mut password)
            .context("read password from stdin")?;
    } else {
        eprint!("Password: ");
        io::stderr().flush().context("flush prompt")?;
        io::stdin()
            .lock()
            .read_line(&mut password)
            .context("read password")?;
    }
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}
