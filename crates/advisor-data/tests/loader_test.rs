//! Integration tests for the JSON loaders against files on disk.

use std::fs;

use advisor_data::config::DataConfig;
use advisor_data::loader::{
    list_degree_files, load_catalog, load_degree, load_transcript, resolve_degree_file,
};

fn write(dir: &std::path::Path, name: &str, contents: &str) {
    if let Some(parent) = dir.join(name).parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn loads_catalog_records() {
    let tmp = tempfile::TempDir::new().unwrap();
    let cfg = DataConfig::new(tmp.path());
    write(
        tmp.path(),
        "courses.json",
        r#"[
            {"CourseCode": "CS 01100", "CourseTitle": "Intro to CS", "Credits": "3",
             "Description": "Fundamentals.", "Prerequisites": null},
            {"CourseCode": "MUS 01200", "CourseTitle": "Ensemble", "Credits": "1 to 3"}
        ]"#,
    );

    let records = load_catalog(&cfg.catalog_path()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].credits.as_deref(), Some("1 to 3"));
    assert!(records[1].description.is_none());
}

#[test]
fn missing_catalog_reports_path() {
    let tmp = tempfile::TempDir::new().unwrap();
    let cfg = DataConfig::new(tmp.path());
    let err = load_catalog(&cfg.catalog_path()).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("failed to read course catalog"), "got: {msg}");
    assert!(msg.contains("courses.json"), "got: {msg}");
}

#[test]
fn malformed_transcript_is_a_parse_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    write(tmp.path(), "t.json", "{ not json");
    let err = load_transcript(&tmp.path().join("t.json")).unwrap_err();
    assert!(
        err.to_string().contains("failed to parse transcript"),
        "got: {err}"
    );
}

#[test]
fn loads_transcript_terms() {
    let tmp = tempfile::TempDir::new().unwrap();
    write(
        tmp.path(),
        "t.json",
        r#"{
            "name": "Sam Student",
            "program": "Bachelor of Science",
            "major": "Computer Science",
            "earned_credits": "45.000",
            "gpa": 3.4,
            "transfer": [
                {"subject": "ENG", "course_number": "01101", "title": "Composition",
                 "credits": 3, "grade": "TR"}
            ],
            "completed": [
                {"term": "Fall 2024", "courses": [
                    {"subject": "CS", "course_number": "01100", "credits": 3, "grade": "A"}
                ]}
            ],
            "inprogress": []
        }"#,
    );

    let t = load_transcript(&tmp.path().join("t.json")).unwrap();
    assert_eq!(t.earned_credits, Some(45.0));
    assert_eq!(t.transfer[0].grade.as_deref(), Some("TR"));
    assert_eq!(t.completed[0].courses[0].code_text(), "CS 01100");
}

#[test]
fn resolves_degree_file_for_abbreviated_program() {
    let tmp = tempfile::TempDir::new().unwrap();
    let cfg = DataConfig::new(tmp.path());
    write(
        tmp.path(),
        "degrees/bachelor_of_science_in_computer_science.json",
        r#"{"name": "Computer Science", "content": {}}"#,
    );
    write(
        tmp.path(),
        "degrees/bachelor_of_arts_in_philosophy.json",
        r#"{"name": "Philosophy", "content": {}}"#,
    );
    write(tmp.path(), "degrees/README.txt", "ignored");

    let files = list_degree_files(&cfg).unwrap();
    assert_eq!(files.len(), 2);

    let path = resolve_degree_file(&cfg, "BS", "Computer Science").unwrap();
    assert!(path.ends_with("bachelor_of_science_in_computer_science.json"));

    let doc = load_degree(&path).unwrap();
    assert_eq!(doc.name.as_deref(), Some("Computer Science"));
}

#[test]
fn resolve_fails_on_empty_degree_dir() {
    let tmp = tempfile::TempDir::new().unwrap();
    let cfg = DataConfig::new(tmp.path());
    fs::create_dir_all(cfg.degrees_dir()).unwrap();

    let err = resolve_degree_file(&cfg, "Bachelor of Science", "Physics").unwrap_err();
    assert!(err.to_string().contains("no degree documents found"), "got: {err}");
}
