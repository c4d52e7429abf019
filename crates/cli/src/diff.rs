// diff: keyed comparison of two spreadsheets
// Reads both files, builds CompareOptions from the profile and flags, and
// prints the divergence report. Exit 1 when the files differ.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;

use jlife_recon::{compare_tables, CompareOptions, CompareProfile, DivergenceReport, RowStatus};

use crate::error::CliError;
use crate::exit_codes::EXIT_DIFF_FOUND;
use crate::output::print_json;

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Left file (.xlsx .xls .xlsb .ods .csv .tsv)
    pub left: PathBuf,

    /// Right file
    pub right: PathBuf,

    /// Key column joining the two files (overrides the profile's key)
    #[arg(long)]
    pub key: Option<String>,

    /// Rename a left column before comparing, FROM=TO (repeatable)
    #[arg(long, value_name = "FROM=TO")]
    pub rename_left: Vec<String>,

    /// Rename a right column before comparing, FROM=TO (repeatable)
    #[arg(long, value_name = "FROM=TO")]
    pub rename_right: Vec<String>,

    /// Leave a column out of the comparison (repeatable)
    #[arg(long, value_name = "COL")]
    pub ignore: Vec<String>,

    /// Strip trailing characters from a column on both sides, COL=CHARS (repeatable)
    #[arg(long, value_name = "COL=CHARS")]
    pub rstrip: Vec<String>,

    /// Numeric values within this distance are equal
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// TOML profile with key, rename, ignore, rstrip and tolerance
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn cmd_diff(args: DiffArgs) -> Result<(), CliError> {
    let options = build_options(&args)?;

    let left = jlife_io::read_table(&args.left)?;
    let right = jlife_io::read_table(&args.right)?;
    let report = compare_tables(&left, &right, &options)?;

    if args.json {
        print_json(&report)?;
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write_text_report(&mut handle, &report, &args)?;
    }

    if report.has_differences() {
        return Err(CliError::silent(EXIT_DIFF_FOUND));
    }
    Ok(())
}

/// Profile first, then flags on top: `--key` and `--tolerance` replace,
/// the repeatable flags add entries.
fn build_options(args: &DiffArgs) -> Result<CompareOptions, CliError> {
    let mut options = match &args.profile {
        Some(path) => CompareProfile::load(path)?.options(),
        None => CompareOptions::default(),
    };

    if let Some(key) = &args.key {
        options.key_column = key.trim().to_string();
    }
    if options.key_column.is_empty() {
        return Err(CliError::args("no key column given")
            .with_hint("pass --key COLUMN or set key in the --profile file"));
    }

    for spec in &args.rename_left {
        let (from, to) = parse_pair(spec, "--rename-left")?;
        options.rename_left.insert(from.trim(), to.trim());
    }
    for spec in &args.rename_right {
        let (from, to) = parse_pair(spec, "--rename-right")?;
        options.rename_right.insert(from.trim(), to.trim());
    }
    options.ignore.extend(args.ignore.iter().map(|c| c.trim().to_string()));
    for spec in &args.rstrip {
        // Characters are taken as typed; a space is a valid character to strip.
        let (column, chars) = parse_pair(spec, "--rstrip")?;
        options.rstrip.push((column.trim().to_string(), chars.to_string()));
    }

    if let Some(tolerance) = args.tolerance {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(CliError::args(format!("--tolerance must be a non-negative number, got {}", tolerance)));
        }
        options.tolerance = tolerance;
    }

    Ok(options)
}

/// Split `A=B`. Both sides must be non-empty.
fn parse_pair<'a>(spec: &'a str, flag: &str) -> Result<(&'a str, &'a str), CliError> {
    match spec.split_once('=') {
        Some((a, b)) if !a.trim().is_empty() && !b.is_empty() => Ok((a, b)),
        _ => Err(CliError::args(format!("invalid {} value: {:?}", flag, spec)).with_hint(format!("use {} NAME=VALUE", flag))),
    }
}

fn write_text_report(out: &mut impl Write, report: &DivergenceReport, args: &DiffArgs) -> Result<(), CliError> {
    let s = &report.summary;
    writeln!(out, "key:        {}", report.key_column)?;
    writeln!(out, "left:       {} rows ({})", s.left_rows, args.left.display())?;
    writeln!(out, "right:      {} rows ({})", s.right_rows, args.right.display())?;
    writeln!(out, "matched:    {}", s.matched)?;
    writeln!(out, "diff:       {}", s.diff)?;
    writeln!(out, "only_left:  {}", s.only_left)?;
    writeln!(out, "only_right: {}", s.only_right)?;
    if s.blank_keys > 0 {
        writeln!(out, "blank_keys: {}", s.blank_keys)?;
    }
    for (side, renamed) in [("left", &report.left_renamed), ("right", &report.right_renamed)] {
        for rename in renamed {
            writeln!(out, "renamed {}: {} -> {}", side, rename.from, rename.to)?;
        }
    }
    if !report.left_only_columns.is_empty() {
        writeln!(out, "columns only in left:  {}", report.left_only_columns.join(", "))?;
    }
    if !report.right_only_columns.is_empty() {
        writeln!(out, "columns only in right: {}", report.right_only_columns.join(", "))?;
    }

    for row in report.rows.iter().filter(|r| r.status != RowStatus::Matched) {
        writeln!(out, "{:<10} {}", row.status.as_str(), row.key)?;
        for diff in &row.diffs {
            match diff.delta {
                Some(delta) => writeln!(out, "    {}: {:?} -> {:?} (delta {})", diff.column, diff.left, diff.right, delta)?,
                None => writeln!(out, "    {}: {:?} -> {:?}", diff.column, diff.left, diff.right)?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> DiffArgs {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            diff: DiffArgs,
        }

        let mut argv = vec!["diff", "a.csv", "b.csv"];
        argv.extend_from_slice(extra);
        Wrapper::parse_from(argv).diff
    }

    #[test]
    fn test_key_required() {
        let err = build_options(&args(&[])).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_USAGE);
    }

    #[test]
    fn test_flags_build_options() {
        let options = build_options(&args(&[
            "--key", "id",
            "--rename-right", "member_id=id",
            "--ignore", "notes",
            "--rstrip", "phone= -",
            "--tolerance", "0.01",
        ]))
        .unwrap();
        assert_eq!(options.key_column, "id");
        assert_eq!(options.rename_right.canonical("member_id"), Some("id"));
        assert_eq!(options.ignore, vec!["notes".to_string()]);
        assert_eq!(options.rstrip, vec![("phone".to_string(), " -".to_string())]);
        assert_eq!(options.tolerance, 0.01);
    }

    #[test]
    fn test_bad_pair_rejected() {
        assert!(parse_pair("novalue", "--rename-left").is_err());
        assert!(parse_pair("=x", "--rename-left").is_err());
        assert_eq!(parse_pair("a=b=c", "--rename-left").unwrap(), ("a", "b=c"));
    }

    #[test]
    fn test_profile_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let profile = dir.path().join("recon.toml");
        std::fs::write(&profile, "key = \"會員編號\"\nignore = [\"備註\"]\ntolerance = 0.5\n").unwrap();
        let profile_arg = profile.to_string_lossy().to_string();

        let options = build_options(&args(&["--profile", &profile_arg, "--ignore", "電話"])).unwrap();
        assert_eq!(options.key_column, "會員編號");
        assert_eq!(options.ignore, vec!["備註".to_string(), "電話".to_string()]);
        assert_eq!(options.tolerance, 0.5);
    }
}
