//! End-to-end tests for the `advisor` binary against a temporary data
//! directory. Each run gets its own config home so no user config leaks in.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{Value, json};
use tempfile::TempDir;

use advisor_test_utils::{TranscriptBuilder, requirement, write_data_dir};

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

struct Workspace {
    data: TempDir,
    home: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let degree = json!({
            "name": "Bachelor of Science in Computer Science",
            "content": {
                "Core 12 s.h.": { "requirements": [
                    { "type": "and", "courses": [
                        requirement("CS 01100", "Introduction to Programming", 3.0),
                        requirement("CS 01101", "Data Structures", 3.0),
                        requirement("CS 02100", "Algorithms", 3.0),
                        requirement("CS 02200", "Computer Organization", 3.0)
                    ]}
                ]},
                "Writing 3 s.h.": { "requirements": [
                    { "type": "or", "courses": [
                        requirement("ENG 01101", "College Composition I", 3.0)
                    ]}
                ]}
            }
        });
        Self {
            data: write_data_dir(&[("bachelor_of_science_in_computer_science.json", degree)]),
            home: TempDir::new().unwrap(),
        }
    }

    fn advisor(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_advisor"))
            .arg("--data-dir")
            .arg(self.data.path())
            .args(args)
            .env("XDG_CONFIG_HOME", self.home.path())
            .env("RUST_LOG", "warn")
            .env_remove("ADVISOR_DATA_DIR")
            .env_remove("ADVISOR_GENERATOR")
            .output()
            .expect("failed to run advisor binary")
    }

    fn transcript(&self) -> PathBuf {
        let record = TranscriptBuilder::new("Sam Student")
            .program("BS", "Computer Science")
            .earned_credits(30.0)
            .term(
                "Fall 2024",
                &[
                    ("CS 01100", "Introduction to Programming", 3.0, "A"),
                    ("MATH 01130", "Calculus I", 4.0, "B+"),
                ],
            )
            .build();
        let path = self.home.path().join("transcript.json");
        std::fs::write(&path, serde_json::to_string_pretty(&record).unwrap()).unwrap();
        path
    }

    /// A generator script that never reads its stdin and prints `reply`.
    fn generator(&self, reply: &str) -> String {
        let script = self.home.path().join("generator.sh");
        let body = format!("cat <<'REPLY'\n{reply}\nREPLY\n");
        std::fs::write(&script, body).unwrap();
        format!("sh {}", script.display())
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

// -----------------------------------------------------------------------
// Lookup and export
// -----------------------------------------------------------------------

#[test]
fn course_looks_up_by_code_and_title() {
    let ws = Workspace::new();

    let by_code = ws.advisor(&["course", "CS", "02100"]);
    assert!(by_code.status.success(), "stderr: {}", stderr(&by_code));
    assert!(stdout(&by_code).contains("Prerequisites: CS 01101 and MATH 01131"));

    let by_title = ws.advisor(&["course", "data", "structures"]);
    assert!(stdout(&by_title).starts_with("CS 01101 - Data Structures"));

    let missing = ws.advisor(&["course", "underwater", "basket", "weaving"]);
    assert!(!missing.status.success());
    assert!(stderr(&missing).contains("no course matches"));
}

#[test]
fn export_prereqs_writes_json() {
    let ws = Workspace::new();
    let output = ws.advisor(&["export-prereqs"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let exported: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(exported["CS 01101"]["expr"], "CS 01100 and (MATH 01130 or MATH 01131)");
    assert_eq!(exported["PHYS 01200"]["not_found"], json!(["PHYS 00220"]));
}

// -----------------------------------------------------------------------
// Transcript commands
// -----------------------------------------------------------------------

#[test]
fn prereq_with_transcript_reports_status() {
    let ws = Workspace::new();
    let transcript = ws.transcript();
    let output = ws.advisor(&["prereq", "CS 01101", "--transcript", path_arg(&transcript)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("STATUS: You have met all prerequisites for this course"));
}

#[test]
fn audit_resolves_degree_from_transcript() {
    let ws = Workspace::new();
    let transcript = ws.transcript();
    let output = ws.advisor(&["audit", "--transcript", path_arg(&transcript)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    assert!(text.contains("(bachelor_of_science_in_computer_science) =="));
    assert!(text.contains("[open] Core 12 s.h. (3 of 12 credits)"));
    assert!(text.contains("    CS 02200 - Computer Organization (3 credits)"));
    assert!(text.contains("[open] Writing 3 s.h. (0 of 3 credits)"));
}

#[test]
fn validate_accepts_and_rejects() {
    let ws = Workspace::new();
    let transcript = ws.transcript();
    let t = path_arg(&transcript);

    let accepted = ws.advisor(&[
        "validate", "--transcript", t, "--credits", "12",
        "CS 01101", "ENG 01101", "ART 01100", "HIST 01100",
    ]);
    assert!(accepted.status.success(), "stderr: {}", stderr(&accepted));
    assert!(stdout(&accepted).starts_with("Plan accepted: 12 credits (target 12)"));

    let rejected = ws.advisor(&["validate", "--transcript", t, "--credits", "6", "CS 01100", "ART 01100"]);
    assert!(!rejected.status.success());
    assert!(stderr(&rejected).contains("course (CS 01100) already completed"));
}

#[test]
fn recommend_accepts_generator_plan() {
    let ws = Workspace::new();
    let transcript = ws.transcript();
    let generator = ws.generator(
        "Here is a balanced semester.\n<recommendation>\nCS 01101 - Data Structures\nENG 01101\nART 01100\nHIST 01100\n</recommendation>",
    );

    let output = ws.advisor(&[
        "recommend", "--transcript", path_arg(&transcript), "--credits", "12",
        "--generator", &generator, "--json",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let outcome: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(outcome["outcome"], "accepted");
    assert_eq!(outcome["attempts"], 1);
    assert_eq!(
        outcome["courses"],
        json!(["CS 01101", "ENG 01101", "ART 01100", "HIST 01100"])
    );
}

#[test]
fn recommend_exhausts_retry_budget() {
    let ws = Workspace::new();
    let transcript = ws.transcript();
    let generator = ws.generator("<recommendation>\nCS 01100\n</recommendation>");

    let output = ws.advisor(&[
        "recommend", "--transcript", path_arg(&transcript), "--credits", "12",
        "--generator", &generator, "--retries", "2",
    ]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("Exceeded the retry budget of 2 attempts"), "stderr: {err}");
    assert!(err.contains("course (CS 01100) already completed"), "stderr: {err}");
}

#[test]
fn recommend_without_generator_fails_fast() {
    let ws = Workspace::new();
    let transcript = ws.transcript();
    let output = ws.advisor(&["recommend", "--transcript", path_arg(&transcript), "--credits", "12"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no plan generator configured"));
}

// -----------------------------------------------------------------------
// Config and completions
// -----------------------------------------------------------------------

#[test]
fn init_refuses_to_overwrite_without_force() {
    let ws = Workspace::new();

    let first = ws.advisor(&["init", "--generator", "advisor-llm"]);
    assert!(first.status.success(), "stderr: {}", stderr(&first));
    let written =
        std::fs::read_to_string(ws.home.path().join("advisor").join("config.toml")).unwrap();
    assert!(written.contains("command = \"advisor-llm\""));

    let second = ws.advisor(&["init"]);
    assert!(!second.status.success());
    assert!(stderr(&second).contains("Use --force to overwrite."));

    let forced = ws.advisor(&["init", "--force"]);
    assert!(forced.status.success());
}

#[test]
fn completions_generate_for_bash() {
    let ws = Workspace::new();
    let output = ws.advisor(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("advisor"));
}
