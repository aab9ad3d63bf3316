//! Shared helpers for CLI integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Creates a temp CAMPUS_ADMIN_HOME directory for test isolation.
pub fn temp_home() -> TempDir {
    TempDir::new().expect("create temp admin home")
}

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

pub fn session_path(home: &Path) -> PathBuf {
    home.join("session.json")
}

/// Writes a session file the way the CLI persists it.
pub fn write_session(home: &Path, token: &str, is_admin: bool) {
    let body = serde_json::json!({
        "id_token": token,
        "is_admin": is_admin.to_string(),
    });
    fs::write(session_path(home), body.to_string()).expect("write session");
}

/// `campus-admin` pointed at `api_url` with an isolated home.
pub fn admin(home: &Path, api_url: &str) -> Command {
    let mut cmd = cargo_bin_cmd!("campus-admin");
    cmd.env("CAMPUS_ADMIN_HOME", home)
        .env("CAMPUS_ADMIN_API_URL", api_url)
        .env_remove("CAMPUS_ADMIN_LOG");
    cmd
}
