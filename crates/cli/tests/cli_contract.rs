// Integration tests for the jlife binary: stdout JSON and exit codes.
//
// Each test runs against its own scratch directory holding the database,
// a (missing) settings file and any input spreadsheets.
//
// Run with: cargo test -p jlife-cli --test cli_contract -- --nocapture

use std::path::{Path, PathBuf};
use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self { dir: tempfile::tempdir().unwrap() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn jlife(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_jlife"));
        cmd.current_dir(self.dir.path())
            .env_remove("RUST_LOG")
            .env_remove("JLIFE_DB")
            .arg("--db")
            .arg(self.path("test.db"))
            .arg("--config")
            .arg(self.path("settings.json"));
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.jlife().args(args).output().expect("run jlife")
    }

    fn run_with_stdin(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .jlife()
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn jlife");
        child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
        child.wait_with_output().expect("wait for jlife")
    }
}

/// Assert stdout is a single, parseable JSON value with no extra lines.
fn assert_single_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let trimmed = stdout.trim();
    assert!(!trimmed.is_empty(), "stdout should not be empty\nstderr: {}", stderr(output));
    serde_json::from_str(trimmed)
        .unwrap_or_else(|e| panic!("stdout must be valid JSON.\nParse error: {}\nstdout:\n{}", e, trimmed))
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn assert_code(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        stderr(output)
    );
}

const MEMBERS_CSV: &str = "\
會籍,中文姓名,性別,出生日期,身份證號,家庭人數
M001,陳大文,男,1950-06-15,A1234567,2
M002,李美玲,女,1962-01-03,B7654321,4
";

const MEMBER_JSON: &str = r#"{
    "會員編號": "M001",
    "中文姓名": "陳大文",
    "性別": "男",
    "身份證號": "A1234567",
    "經濟狀況": "綜援",
    "地址": "旺角",
    "婚姻狀況": "已婚"
}"#;

fn str_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ===========================================================================
// import / export
// ===========================================================================

#[test]
fn import_members_then_list_and_export() {
    let sb = Sandbox::new();
    sb.write("members.csv", MEMBERS_CSV);

    let output = sb.run(&["import", "members.csv"]);
    assert_code(&output, 0);
    let report = assert_single_json(&output);
    assert_eq!(report["kind"], "member");
    assert_eq!(report["imported"], 2);
    assert!(stderr(&output).contains("imported 2 member records"));

    let output = sb.run(&["member", "list"]);
    assert_code(&output, 0);
    let page = assert_single_json(&output);
    assert_eq!(page["total"], 2);
    assert_eq!(page["items"][0]["會員編號"], "M001");
    assert_eq!(page["items"][1]["家庭人數"], 4);

    let out_file = sb.path("out/members.xlsx");
    let output = sb.run(&["export", "member", "-o", str_arg(&out_file)]);
    assert_code(&output, 0);
    assert_eq!(assert_single_json(&output)["rows"], 2);
    assert!(out_file.exists());
}

#[test]
fn import_rejects_whole_file_on_bad_row() {
    let sb = Sandbox::new();
    sb.write(
        "members.csv",
        "會員編號,中文姓名,家庭人數\nM001,陳大文,2\nM002,李美玲,3\nM003,王小明,四口\n",
    );

    let output = sb.run(&["import", "members.csv"]);
    assert_code(&output, 4);
    assert!(stderr(&output).contains("error: row 2:"), "stderr: {}", stderr(&output));

    let output = sb.run(&["member", "list"]);
    assert_code(&output, 0);
    assert_eq!(assert_single_json(&output)["total"], 0);
}

#[test]
fn import_needs_kind_when_name_says_nothing() {
    let sb = Sandbox::new();
    sb.write("book1.csv", MEMBERS_CSV);

    let output = sb.run(&["import", "book1.csv"]);
    assert_code(&output, 2);
    assert!(stderr(&output).contains("--kind"));

    let output = sb.run(&["import", "book1.csv", "--kind", "member"]);
    assert_code(&output, 0);
}

#[test]
fn import_without_file_picks_from_directory() {
    let sb = Sandbox::new();
    sb.write("members.csv", MEMBERS_CSV);
    assert_code(&sb.run(&["import", "members.csv"]), 0);
    assert_code(&sb.run(&["export", "member", "-o", "members.xlsx"]), 0);
    assert_code(&sb.run(&["member", "delete", "M001"]), 0);
    assert_code(&sb.run(&["member", "delete", "M002"]), 0);

    // 0 leaves without importing
    let output = sb.run_with_stdin(&["import"], "0\n");
    assert_code(&output, 0);
    assert!(stderr(&output).contains("1. members.xlsx"), "stderr: {}", stderr(&output));
    assert!(output.stdout.is_empty());
    assert_eq!(assert_single_json(&sb.run(&["member", "list"]))["total"], 0);

    // the kind comes from the picked file name
    let output = sb.run_with_stdin(&["import"], "1\n");
    assert_code(&output, 0);
    let report = assert_single_json(&output);
    assert_eq!(report["kind"], "member");
    assert_eq!(report["imported"], 2);
    assert_eq!(assert_single_json(&sb.run(&["member", "list"]))["total"], 2);
}

#[test]
fn import_missing_file_is_io_error() {
    let sb = Sandbox::new();
    let output = sb.run(&["import", "nowhere_members.csv"]);
    assert_code(&output, 3);
}

// ===========================================================================
// member CRUD
// ===========================================================================

#[test]
fn member_add_get_update_delete() {
    let sb = Sandbox::new();

    let output = sb.run(&["member", "add", MEMBER_JSON]);
    assert_code(&output, 0);
    let member = assert_single_json(&output);
    assert_eq!(member["會員編號"], "M001");
    assert!(member["id"].is_number());
    assert_eq!(member["創建時間"], member["更新時間"]);

    let output = sb.run(&["member", "get", "M001"]);
    assert_code(&output, 0);
    assert_eq!(assert_single_json(&output)["中文姓名"], "陳大文");

    let output = sb.run(&["member", "update", "M001", r#"{"電話":"91234567"}"#]);
    assert_code(&output, 0);
    assert_eq!(assert_single_json(&output)["電話"], "91234567");

    let output = sb.run(&["member", "search", "9123"]);
    assert_code(&output, 0);
    assert_eq!(assert_single_json(&output).as_array().unwrap().len(), 1);

    let output = sb.run(&["member", "delete", "M001"]);
    assert_code(&output, 0);

    let output = sb.run(&["member", "get", "M001"]);
    assert_code(&output, 6);
}

#[test]
fn member_errors_have_exit_codes() {
    let sb = Sandbox::new();
    assert_code(&sb.run(&["member", "add", MEMBER_JSON]), 0);

    // duplicate member number
    let output = sb.run(&["member", "add", MEMBER_JSON]);
    assert_code(&output, 5);

    // unknown column
    let output = sb.run(&["member", "update", "M001", r#"{"favourite_colour":"blue"}"#]);
    assert_code(&output, 5);

    // missing required fields
    let output = sb.run(&["member", "add", r#"{"中文姓名":"王小明"}"#]);
    assert_code(&output, 5);

    // not JSON at all
    let output = sb.run(&["member", "add", "{oops"]);
    assert_code(&output, 2);

    let output = sb.run(&["member", "get", "M404"]);
    assert_code(&output, 6);
    assert!(stderr(&output).contains("error: member 'M404' not found"));
}

#[test]
fn paging_bounds() {
    let sb = Sandbox::new();
    assert_code(&sb.run(&["member", "add", MEMBER_JSON]), 0);

    assert_code(&sb.run(&["member", "list", "--page", "0"]), 5);
    assert_code(&sb.run(&["member", "list", "--page", "2"]), 6);

    let output = sb.run(&["member", "list", "--per-page", "1"]);
    assert_code(&output, 0);
    let page = assert_single_json(&output);
    assert_eq!(page["pages"], 1);
    assert_eq!(page["current_page"], 1);
}

// ===========================================================================
// attendance
// ===========================================================================

#[test]
fn marking_twice_keeps_one_row() {
    let sb = Sandbox::new();
    let event = r#"{"活動編號":"E001","活動名稱":"中秋晚會","活動日期":"2024-09-17"}"#;
    assert_code(&sb.run(&["event", "add", event]), 0);

    assert_code(&sb.run(&["attendance", "mark", "M001", "E001", "--at", "2024-09-17 18:30:00"]), 0);
    let output = sb.run(&["attendance", "mark", "M001", "E001", "--at", "2024-09-17 18:45:00"]);
    assert_code(&output, 0);
    assert_eq!(assert_single_json(&output)["簽到時間"], "2024-09-17 18:45:00");

    let output = sb.run(&["attendance", "list", "--event", "E001"]);
    assert_code(&output, 0);
    assert_eq!(assert_single_json(&output)["total"], 1);

    let output = sb.run(&["attendance", "stats", "E001"]);
    assert_code(&output, 0);
    let stats = assert_single_json(&output);
    assert_eq!(stats["total_registered"], 1);
    assert_eq!(stats["total_present"], 1);

    assert_code(&sb.run(&["attendance", "stats", "E404"]), 6);
}

// ===========================================================================
// snapshot
// ===========================================================================

#[test]
fn snapshot_merges_into_existing_sheet() {
    let sb = Sandbox::new();
    sb.write("members.csv", MEMBERS_CSV);
    assert_code(&sb.run(&["import", "members.csv"]), 0);

    let snapshot = sb.write("update.csv", "會員編號,中文姓名\nM001,舊名\nM900,保留\n");
    let output = sb.run(&["snapshot", "--path", str_arg(&snapshot)]);
    assert_code(&output, 0);
    let report = assert_single_json(&output);
    assert_eq!(report["existing_rows"], 2);
    assert_eq!(report["written_rows"], 3);
}

#[test]
fn member_add_refreshes_snapshot_when_auto_sync_is_on() {
    let sb = Sandbox::new();
    sb.write("settings.json", r#"{ "snapshot.autoSync": true, "snapshot.path": "update.csv" }"#);

    let output = sb.run(&["member", "add", MEMBER_JSON]);
    assert_code(&output, 0);
    assert_eq!(assert_single_json(&output)["會員編號"], "M001");

    let snapshot = std::fs::read_to_string(sb.path("update.csv")).unwrap();
    assert!(snapshot.starts_with("會員編號"), "snapshot: {}", snapshot);
    assert!(snapshot.contains("M001"));
}

#[test]
fn failed_auto_sync_still_adds_member() {
    let sb = Sandbox::new();
    // a directory where the snapshot file should be cannot be written
    std::fs::create_dir(sb.path("update.csv")).unwrap();
    sb.write("settings.json", r#"{ "snapshot.autoSync": true, "snapshot.path": "update.csv" }"#);

    let output = sb.run(&["member", "add", MEMBER_JSON]);
    assert_code(&output, 0);
    assert_eq!(assert_single_json(&output)["會員編號"], "M001");
    assert!(stderr(&output).contains("snapshot sync after member add failed"), "stderr: {}", stderr(&output));

    assert_code(&sb.run(&["member", "get", "M001"]), 0);
}

#[test]
fn snapshot_without_members_is_not_found() {
    let sb = Sandbox::new();
    let output = sb.run(&["snapshot", "--path", "update.xlsx"]);
    assert_code(&output, 6);
    assert!(!sb.path("update.xlsx").exists());
}

// ===========================================================================
// diff
// ===========================================================================

#[test]
fn diff_identical_files_exit_zero() {
    let sb = Sandbox::new();
    let left = sb.write("left.csv", "id,name,amount\n1,Alice,100\n2,Bob,200\n");
    let right = sb.write("right.csv", "id,name,amount\n2,Bob,200\n1,Alice,100\n");

    let output = sb.run(&["diff", str_arg(&left), str_arg(&right), "--key", "id"]);
    assert_code(&output, 0);
    assert!(String::from_utf8_lossy(&output.stdout).contains("matched:    2"));
}

#[test]
fn diff_reports_differences_exit_one() {
    let sb = Sandbox::new();
    let left = sb.write("left.csv", "id,name,amount\n1,Alice,100\n2,Bob,200\n");
    let right = sb.write("right.csv", "member_id,name,amount\n1,Alice,150\n3,Cara,300\n");

    let output = sb.run(&[
        "diff", str_arg(&left), str_arg(&right),
        "--key", "id",
        "--rename-right", "member_id=id",
        "--json",
    ]);
    assert_code(&output, 1);
    let report = assert_single_json(&output);
    assert_eq!(report["summary"]["diff"], 1);
    assert_eq!(report["summary"]["only_left"], 1);
    assert_eq!(report["summary"]["only_right"], 1);
    assert_eq!(report["right_renamed"][0]["from"], "member_id");
    assert_eq!(report["right_renamed"][0]["to"], "id");
}

#[test]
fn diff_tolerance_and_ignore() {
    let sb = Sandbox::new();
    let left = sb.write("left.csv", "id,amount,note\n1,100.00,a\n");
    let right = sb.write("right.csv", "id,amount,note\n1,100.004,b\n");

    let output = sb.run(&[
        "diff", str_arg(&left), str_arg(&right),
        "--key", "id", "--tolerance", "0.01", "--ignore", "note",
    ]);
    assert_code(&output, 0);
}

#[test]
fn diff_duplicate_keys_exit_five() {
    let sb = Sandbox::new();
    let left = sb.write("left.csv", "id,name\n1,Alice\n1,Alicia\n");
    let right = sb.write("right.csv", "id,name\n1,Alice\n");

    let output = sb.run(&["diff", str_arg(&left), str_arg(&right), "--key", "id"]);
    assert_code(&output, 5);
    assert!(stderr(&output).contains("duplicate keys"));
}

#[test]
fn diff_without_key_is_usage_error() {
    let sb = Sandbox::new();
    let left = sb.write("left.csv", "id\n1\n");
    let output = sb.run(&["diff", str_arg(&left), str_arg(&left)]);
    assert_code(&output, 2);
}

// ===========================================================================
// config
// ===========================================================================

#[test]
fn config_write_saves_effective_settings() {
    let sb = Sandbox::new();
    assert!(!sb.path("settings.json").exists());

    let output = sb.run(&["config", "--write"]);
    assert_code(&output, 0);
    let shown = assert_single_json(&output);
    assert_eq!(shown["page.defaultSize"], 10);

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(sb.path("settings.json")).unwrap()).unwrap();
    assert_eq!(saved, shown);
    assert_eq!(saved["store.databasePath"], str_arg(&sb.path("test.db")));
}
