//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod courses;
pub mod stats;
pub mod users;

use comfy_table::{ContentArrangement, Table};

/// A table sized to the terminal.
fn table<I, S>(header: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<comfy_table::Cell>,
{
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
