//! Small helpers shared across CLI tests.
//!
//! Tests write submission files into temporary directories and point the
//! `graph` command at an in-process scoring service.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use serde_json::{Value, json};
use tempfile::TempDir;

use super::{CliError, GraphCommand};
use super::commands::run_graph;

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

pub(super) fn write_file(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    let mut file = File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    Ok(path)
}

/// JSON record for one submission; an empty `test_id` is omitted.
pub(super) fn record(id: &str, test_id: &str, name: &str, code: &str) -> Value {
    let mut value = json!({ "id": id, "name": name, "code": code });
    if !test_id.is_empty() {
        value["test_id"] = json!(test_id);
    }
    value
}

pub(super) fn write_submissions(dir: &TempDir, records: &[Value]) -> io::Result<PathBuf> {
    write_file(dir, "submissions.json", &Value::from(records.to_vec()).to_string())
}

pub(super) fn graph_command(path: PathBuf, scorer_url: &str) -> GraphCommand {
    GraphCommand {
        path,
        test_id: None,
        scorer_url: scorer_url.to_owned(),
        threshold: 85.0,
        comparison_timeout_secs: 30,
        deadline_secs: None,
        request_timeout_secs: 30,
    }
}

pub(super) fn run_graph_expecting_error(command: GraphCommand, panic_msg: &str) -> CliError {
    match run_graph(command) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}
