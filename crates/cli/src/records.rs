// Record subcommands: member, inventory, event, attendance.
// Each prints its result as JSON on stdout.

use std::io::{self, Read};

use chrono::{Datelike, Local, NaiveDateTime};
use clap::{Args, Subcommand};
use serde_json::{json, Value};

use jlife_records::value::DATETIME_FORMAT;
use jlife_store::PageRequest;

use crate::error::CliError;
use crate::output::print_json;
use crate::snapshot;
use crate::Context;

/// `--page` / `--per-page` shared by the list commands.
#[derive(Args, Debug, Clone, Copy)]
pub struct PageArgs {
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Items per page [default: page.defaultSize]
    #[arg(long)]
    per_page: Option<u32>,
}

impl PageArgs {
    fn request(&self, ctx: &Context) -> PageRequest {
        PageRequest::new(self.page, self.per_page.unwrap_or(ctx.settings.page_size))
    }
}

#[derive(Subcommand)]
pub enum MemberCommands {
    /// List members in insertion order
    List(PageArgs),

    /// Show one member by member number
    Get { number: String },

    /// Create a member from a JSON object keyed by column name ("-" reads stdin)
    #[command(after_help = "\
Example:
  jlife member add '{\"會員編號\":\"M001\",\"中文姓名\":\"陳大文\",\"性別\":\"男\",\"身份證號\":\"A1234567\",
                    \"經濟狀況\":\"綜援\",\"地址\":\"旺角\",\"婚姻狀況\":\"已婚\"}'")]
    Add { payload: String },

    /// Change fields of a member; unknown columns are rejected
    Update { number: String, payload: String },

    /// Delete a member by member number
    Delete { number: String },

    /// Substring search over number, names, phone, national ID and address
    Search { term: String },

    /// Age, district and economic-status breakdowns
    Stats,
}

#[derive(Subcommand)]
pub enum InventoryCommands {
    List(PageArgs),

    /// Show one item by id
    Get { id: i64 },

    /// Create an item from a JSON object keyed by column name ("-" reads stdin)
    Add { payload: String },

    Update { id: i64, payload: String },

    Delete { id: i64 },

    /// Monthly weights, product totals and amounts by source for one year
    Stats {
        /// Calendar year [default: current year]
        #[arg(long)]
        year: Option<i32>,
    },
}

#[derive(Subcommand)]
pub enum EventCommands {
    List(PageArgs),

    /// Show one event by event code
    Get { code: String },

    /// Create an event from a JSON object keyed by column name ("-" reads stdin)
    Add { payload: String },

    Update { code: String, payload: String },

    Delete { code: String },
}

#[derive(Subcommand)]
pub enum AttendanceCommands {
    List {
        #[command(flatten)]
        page: PageArgs,

        /// Only marks for this event code
        #[arg(long)]
        event: Option<String>,
    },

    /// Mark a member present at an event (marking again updates check-in time)
    Mark {
        member: String,
        event: String,

        /// Check-in time, YYYY-MM-DD HH:MM:SS [default: now]
        #[arg(long)]
        at: Option<String>,
    },

    /// Registered and present counts for an event
    Stats { event: String },
}

// ============================================================================
// member
// ============================================================================

pub fn run_member(ctx: &Context, cmd: MemberCommands) -> Result<(), CliError> {
    let mut store = ctx.open_store()?;
    match cmd {
        MemberCommands::List(page) => print_json(&store.list_members(page.request(ctx))?),
        MemberCommands::Get { number } => print_json(&store.get_member(&number)?),
        MemberCommands::Add { payload } => {
            let member = store.create_member(&parse_payload(&payload)?)?;
            if ctx.settings.snapshot_auto_sync {
                if let Err(e) = snapshot::sync_snapshot(&store, &ctx.settings.snapshot_path, &ctx.settings) {
                    tracing::warn!(error = %e.message, "snapshot sync after member add failed");
                }
            }
            print_json(&member)
        }
        MemberCommands::Update { number, payload } => {
            print_json(&store.update_member(&number, &parse_payload(&payload)?)?)
        }
        MemberCommands::Delete { number } => {
            store.delete_member(&number)?;
            print_json(&json!({ "deleted": number }))
        }
        MemberCommands::Search { term } => print_json(&store.search_members(&term)?),
        MemberCommands::Stats => print_json(&store.member_stats()?),
    }
}

// ============================================================================
// inventory
// ============================================================================

pub fn run_inventory(ctx: &Context, cmd: InventoryCommands) -> Result<(), CliError> {
    let mut store = ctx.open_store()?;
    match cmd {
        InventoryCommands::List(page) => print_json(&store.list_items(page.request(ctx))?),
        InventoryCommands::Get { id } => print_json(&store.get_item(id)?),
        InventoryCommands::Add { payload } => print_json(&store.create_item(&parse_payload(&payload)?)?),
        InventoryCommands::Update { id, payload } => {
            print_json(&store.update_item(id, &parse_payload(&payload)?)?)
        }
        InventoryCommands::Delete { id } => {
            store.delete_item(id)?;
            print_json(&json!({ "deleted": id }))
        }
        InventoryCommands::Stats { year } => {
            let year = year.unwrap_or_else(|| Local::now().year());
            print_json(&store.inventory_yearly_stats(year)?)
        }
    }
}

// ============================================================================
// event
// ============================================================================

pub fn run_event(ctx: &Context, cmd: EventCommands) -> Result<(), CliError> {
    let mut store = ctx.open_store()?;
    match cmd {
        EventCommands::List(page) => print_json(&store.list_events(page.request(ctx))?),
        EventCommands::Get { code } => print_json(&store.get_event(&code)?),
        EventCommands::Add { payload } => print_json(&store.create_event(&parse_payload(&payload)?)?),
        EventCommands::Update { code, payload } => {
            print_json(&store.update_event(&code, &parse_payload(&payload)?)?)
        }
        EventCommands::Delete { code } => {
            store.delete_event(&code)?;
            print_json(&json!({ "deleted": code }))
        }
    }
}

// ============================================================================
// attendance
// ============================================================================

pub fn run_attendance(ctx: &Context, cmd: AttendanceCommands) -> Result<(), CliError> {
    let mut store = ctx.open_store()?;
    match cmd {
        AttendanceCommands::List { page, event } => {
            print_json(&store.list_attendance(page.request(ctx), event.as_deref())?)
        }
        AttendanceCommands::Mark { member, event, at } => {
            let at = match at {
                Some(text) => parse_datetime(&text)?,
                None => Local::now().naive_local(),
            };
            print_json(&store.mark_attendance(&member, &event, at)?)
        }
        AttendanceCommands::Stats { event } => print_json(&store.attendance_stats(&event)?),
    }
}

// ============================================================================
// argument parsing
// ============================================================================

/// Parse a JSON payload argument, or stdin when the argument is `-`.
/// Shape (must be an object, known columns only) is checked by the store.
fn parse_payload(arg: &str) -> Result<Value, CliError> {
    let text = if arg == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::io(format!("stdin: {}", e)))?;
        buf
    } else {
        arg.to_string()
    };
    serde_json::from_str(&text).map_err(|e| {
        CliError::args(format!("invalid JSON payload: {}", e))
            .with_hint("pass one JSON object keyed by column name, e.g. '{\"電話\":\"91234567\"}'")
    })
}

fn parse_datetime(text: &str) -> Result<NaiveDateTime, CliError> {
    NaiveDateTime::parse_from_str(text.trim(), DATETIME_FORMAT).map_err(|_| {
        CliError::args(format!("invalid --at value: {}", text)).with_hint("use YYYY-MM-DD HH:MM:SS")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payload_object() {
        let value = parse_payload(r#"{"電話":"91234567"}"#).unwrap();
        assert_eq!(value["電話"], "91234567");
    }

    #[test]
    fn test_parse_payload_rejects_bad_json() {
        let err = parse_payload("{not json").unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_USAGE);
    }

    #[test]
    fn test_parse_datetime() {
        let at = parse_datetime("2024-09-17 18:45:00").unwrap();
        assert_eq!(at.to_string(), "2024-09-17 18:45:00");
        assert!(parse_datetime("17/09/2024").is_err());
    }
}
