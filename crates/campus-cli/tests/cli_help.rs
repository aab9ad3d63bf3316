use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("campus-admin")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("users"))
        .stdout(predicate::str::contains("courses"))
        .stdout(predicate::str::contains("stats"))
        .stdout(predicate::str::contains("--api-url"));
}

#[test]
fn test_users_help_shows_subcommands() {
    cargo_bin_cmd!("campus-admin")
        .args(["users", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("block"))
        .stdout(predicate::str::contains("unblock"))
        .stdout(predicate::str::contains("promote"));
}

#[test]
fn test_stats_help_shows_subcommands() {
    cargo_bin_cmd!("campus-admin")
        .args(["stats", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("general"))
        .stdout(predicate::str::contains("assignments"));
}

#[test]
fn test_login_requires_email() {
    cargo_bin_cmd!("campus-admin")
        .arg("login")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--email"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("campus-admin")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
