//! Unit tests for the CLI commands and submission loading.

use super::commands::{graph_config, load_submissions, run_graph};
use super::test_helpers::{
    graph_command, record, run_graph_expecting_error, temp_dir, write_file, write_submissions,
};
use super::{
    Cli, CliError, Command, ExecutionSummary, NOT_ENOUGH_SUBMISSIONS, OutputFormat,
    SUCCESS_MESSAGE, render_summary, run_cli,
};

use std::time::Duration;

use clap::Parser;
use plagraph_core::{ClusterGraphConfig, GraphError, ScorerErrorCode, Submission};
use plagraph_providers_http::HttpScorerError;
use plagraph_test_support::stub::{StubReply, StubScorer};
use plagraph_test_support::tracing::RecordingLayer;
use rstest::rstest;
use serde_json::Value;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Scores pairs whose code shares its first word at 95, everything else at 10.
fn same_first_word(left: &str, right: &str) -> StubReply {
    let first = |code: &str| code.split_whitespace().next().map(str::to_owned);
    if first(left) == first(right) {
        StubReply::Score(95.0)
    } else {
        StubReply::Score(10.0)
    }
}

fn classroom() -> Vec<Value> {
    vec![
        record("s1", "t1", "Ana", "while x"),
        record("s2", "t1", "Bo", "for y"),
        record("s3", "t1", "Cy", "while z"),
        record("s4", "t2", "Di", "while w"),
    ]
}

#[rstest]
fn load_submissions_keeps_input_order() -> TestResult {
    let dir = temp_dir();
    let path = write_submissions(&dir, &classroom())?;

    let submissions = load_submissions(&path, None)?;

    let ids: Vec<&str> = submissions.iter().map(|s| s.id().as_str()).collect();
    assert_eq!(ids, ["s1", "s2", "s3", "s4"]);
    assert_eq!(submissions[1], Submission::new("s2", "Bo", "for y"));
    Ok(())
}

#[rstest]
#[case::known_test("t1", &["s1", "s2", "s3"])]
#[case::other_test("t2", &["s4"])]
#[case::unknown_test("t9", &[])]
fn load_submissions_filters_by_test(
    #[case] test_id: &str,
    #[case] expected: &[&str],
) -> TestResult {
    let dir = temp_dir();
    let path = write_submissions(&dir, &classroom())?;

    let submissions = load_submissions(&path, Some(test_id))?;

    let ids: Vec<&str> = submissions.iter().map(|s| s.id().as_str()).collect();
    assert_eq!(ids, expected);
    Ok(())
}

#[rstest]
fn load_submissions_skips_untagged_records_when_filtering() -> TestResult {
    let dir = temp_dir();
    let path = write_submissions(
        &dir,
        &[record("s1", "", "Ana", "x"), record("s2", "t1", "Bo", "y")],
    )?;

    let submissions = load_submissions(&path, Some("t1"))?;

    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].id().as_str(), "s2");
    Ok(())
}

#[rstest]
fn load_submissions_accepts_exported_collection_fields() -> TestResult {
    let dir = temp_dir();
    let path = write_file(
        &dir,
        "export.json",
        r#"[
            {"_id": "65f0a1", "testId": "t1", "userName": "Ana", "code": "while x"},
            {"_id": "65f0a2", "testId": "t2", "userName": "Bo", "code": "for y"}
        ]"#,
    )?;

    let submissions = load_submissions(&path, Some("t1"))?;

    assert_eq!(submissions, vec![Submission::new("65f0a1", "Ana", "while x")]);
    Ok(())
}

#[rstest]
fn load_submissions_reports_missing_file() {
    let dir = temp_dir();
    let missing = dir.path().join("missing.json");

    let err = load_submissions(&missing, None).expect_err("missing file must fail");

    match err {
        CliError::Io { path, .. } => assert_eq!(path, missing),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[rstest]
#[case::not_json("this is not json")]
#[case::object_instead_of_array(r#"{"id": "s1"}"#)]
#[case::missing_code(r#"[{"id": "s1", "name": "Ana"}]"#)]
fn load_submissions_reports_malformed_files(#[case] contents: &str) -> TestResult {
    let dir = temp_dir();
    let path = write_file(&dir, "broken.json", contents)?;

    let err = load_submissions(&path, None).expect_err("malformed file must fail");

    assert!(matches!(err, CliError::Decode { .. }), "unexpected error: {err:?}");
    Ok(())
}

#[rstest]
#[case::defaults(30, None, Some(Duration::from_secs(30)), None)]
#[case::zero_disables_timeout(0, None, None, None)]
#[case::with_deadline(5, Some(60), Some(Duration::from_secs(5)), Some(Duration::from_secs(60)))]
fn graph_config_maps_time_limits(
    #[case] comparison_timeout_secs: u64,
    #[case] deadline_secs: Option<u64>,
    #[case] comparison_timeout: Option<Duration>,
    #[case] deadline: Option<Duration>,
) {
    let mut command = graph_command("unused.json".into(), "http://localhost:5001");
    command.comparison_timeout_secs = comparison_timeout_secs;
    command.deadline_secs = deadline_secs;

    let expected = ClusterGraphConfig::new()
        .with_comparison_timeout(comparison_timeout)
        .with_deadline(deadline);
    assert_eq!(graph_config(&command), expected);
}

#[rstest]
fn run_graph_clusters_matching_submissions() -> TestResult {
    let stub = StubScorer::spawn(same_first_word)?;
    let dir = temp_dir();
    let path = write_submissions(&dir, &classroom())?;
    let mut command = graph_command(path, stub.base_url());
    command.test_id = Some("t1".into());

    let summary = run_graph(command)?;

    assert_eq!(summary.message, SUCCESS_MESSAGE);
    assert_eq!(summary.graph.nodes().len(), 3);
    assert_eq!(summary.graph.edges().len(), 1);
    assert_eq!(summary.graph.edges()[0].from.as_str(), "s1");
    assert_eq!(summary.graph.edges()[0].to.as_str(), "s3");
    let clusters: Vec<Vec<&str>> = summary
        .graph
        .clusters()
        .iter()
        .map(|cluster| cluster.iter().map(|member| member.id.as_str()).collect())
        .collect();
    assert_eq!(clusters, vec![vec!["s1", "s3"], vec!["s2"]]);
    assert_eq!(stub.request_count(), 3);
    Ok(())
}

#[rstest]
#[case::unknown_test(Some("t9"), 0)]
#[case::single_submission(Some("t2"), 1)]
fn run_graph_short_circuits_small_inputs(
    #[case] test_id: Option<&str>,
    #[case] nodes: usize,
) -> TestResult {
    let stub = StubScorer::spawn(same_first_word)?;
    let dir = temp_dir();
    let path = write_submissions(&dir, &classroom())?;
    let mut command = graph_command(path, stub.base_url());
    command.test_id = test_id.map(str::to_owned);

    let summary = run_graph(command)?;

    assert_eq!(summary.message, NOT_ENOUGH_SUBMISSIONS);
    assert_eq!(summary.graph.nodes().len(), nodes);
    assert!(summary.graph.edges().is_empty());
    assert!(summary.graph.clusters().is_empty());
    assert_eq!(stub.request_count(), 0);
    Ok(())
}

#[rstest]
fn run_graph_reports_scorer_failures() -> TestResult {
    let stub = StubScorer::spawn(|_, _| StubReply::Status(500))?;
    let dir = temp_dir();
    let path = write_submissions(&dir, &classroom())?;

    let err = run_graph_expecting_error(
        graph_command(path, stub.base_url()),
        "a failing service must abort the build",
    );

    match err {
        CliError::Core(core) => {
            assert_eq!(core.scorer_code(), Some(ScorerErrorCode::Status));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(stub.request_count(), 1);
    Ok(())
}

#[rstest]
fn run_graph_rejects_invalid_threshold() -> TestResult {
    let dir = temp_dir();
    let path = write_submissions(&dir, &classroom())?;
    let mut command = graph_command(path, "http://localhost:5001");
    command.threshold = 150.0;

    let err = run_graph_expecting_error(command, "threshold above 100 must fail");

    assert!(matches!(
        err,
        CliError::Core(GraphError::InvalidThreshold { .. })
    ));
    Ok(())
}

#[rstest]
fn run_graph_rejects_invalid_scorer_url() -> TestResult {
    let dir = temp_dir();
    let path = write_submissions(&dir, &classroom())?;

    let err = run_graph_expecting_error(
        graph_command(path, "not a url"),
        "an unparsable URL must fail",
    );

    assert!(matches!(
        err,
        CliError::Scorer(HttpScorerError::InvalidUrl { .. })
    ));
    Ok(())
}

#[rstest]
fn clap_parses_graph_command() -> TestResult {
    let cli = Cli::try_parse_from([
        "plagraph",
        "graph",
        "subs.json",
        "--test-id",
        "t1",
        "--scorer-url",
        "http://scorer:9000",
        "--threshold",
        "70",
        "--deadline-secs",
        "120",
        "--format",
        "json",
    ])?;

    assert_eq!(cli.format, OutputFormat::Json);
    let Command::Graph(command) = cli.command;
    assert_eq!(command.test_id.as_deref(), Some("t1"));
    assert_eq!(command.scorer_url, "http://scorer:9000");
    assert_eq!(command.threshold, 70.0);
    assert_eq!(command.deadline_secs, Some(120));
    assert_eq!(command.comparison_timeout_secs, 30);
    Ok(())
}

#[rstest]
#[case::unknown_format(&["plagraph", "graph", "subs.json", "--format", "xml"])]
#[case::zero_deadline(&["plagraph", "graph", "subs.json", "--deadline-secs", "0"])]
#[case::missing_path(&["plagraph", "graph"])]
fn clap_rejects_bad_arguments(#[case] args: &[&str]) {
    assert!(Cli::try_parse_from(args).is_err());
}

#[rstest]
fn run_cli_emits_tracing_fields() -> TestResult {
    let stub = StubScorer::spawn(same_first_word)?;
    let dir = temp_dir();
    let path = write_submissions(&dir, &classroom())?;
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let cli = Cli {
        format: OutputFormat::Human,
        command: Command::Graph(graph_command(path, stub.base_url())),
    };

    let summary = tracing::subscriber::with_default(subscriber, || run_cli(cli))?;
    assert_eq!(summary.graph.nodes().len(), 4);

    let run = layer.span_named("cli.run").expect("cli.run span must exist");
    assert_eq!(run.fields.get("command"), Some(&"graph".to_owned()));

    let graph = layer
        .span_named("cli.graph")
        .expect("cli.graph span must exist");
    assert_eq!(graph.fields.get("test_id"), Some(&"<all>".to_owned()));
    assert_eq!(graph.fields.get("threshold"), Some(&"85.0".to_owned()));
    assert_eq!(
        graph.fields.get("scorer_url").map(String::as_str),
        Some(stub.base_url())
    );

    let load = layer
        .span_named("cli.load_submissions")
        .expect("cli.load_submissions span must exist");
    assert_eq!(load.fields.get("loaded"), Some(&"4".to_owned()));
    assert!(
        load.fields
            .get("path")
            .is_some_and(|value| value.ends_with("submissions.json"))
    );

    let build = layer
        .span_named("core.build_graph")
        .expect("core.build_graph span must exist");
    assert_eq!(build.fields.get("scorer"), Some(&"http".to_owned()));

    assert!(layer.events_at(Level::INFO).iter().any(|event| {
        event.message() == Some("command completed")
            && event.fields.get("edges").is_some_and(|value| value == "2")
    }));
    Ok(())
}

#[rstest]
fn render_summary_outputs_json_shape() -> TestResult {
    let stub = StubScorer::spawn(same_first_word)?;
    let dir = temp_dir();
    let path = write_submissions(&dir, &classroom())?;
    let mut command = graph_command(path, stub.base_url());
    command.test_id = Some("t1".into());
    let summary = run_graph(command)?;

    let mut buffer = Vec::new();
    render_summary(&summary, OutputFormat::Json, &mut buffer)?;
    let value: Value = serde_json::from_slice(&buffer)?;

    assert_eq!(value["message"], SUCCESS_MESSAGE);
    assert_eq!(value["nodes"][0]["id"], "s1");
    assert_eq!(value["nodes"][0]["label"], "Ana");
    assert_eq!(value["edges"][0]["from"], "s1");
    assert_eq!(value["edges"][0]["to"], "s3");
    assert_eq!(value["edges"][0]["similarity"], 95.0);
    assert_eq!(value["clusters"][1][0]["name"], "Bo");
    assert!(value.get("stats").is_none());
    Ok(())
}

#[rstest]
fn render_summary_outputs_human_listing() -> TestResult {
    let stub = StubScorer::spawn(same_first_word)?;
    let dir = temp_dir();
    let path = write_submissions(&dir, &classroom())?;
    let mut command = graph_command(path, stub.base_url());
    command.test_id = Some("t1".into());
    let summary = run_graph(command)?;

    let mut buffer = Vec::new();
    render_summary(&summary, OutputFormat::Human, &mut buffer)?;
    let text = String::from_utf8(buffer)?;

    assert!(text.starts_with(SUCCESS_MESSAGE));
    assert!(text.contains("nodes: 3"));
    assert!(text.contains("  s2\tBo"));
    assert!(text.contains("  s1 -- s3\t95.00%"));
    assert!(text.contains("clusters: 2"));
    assert!(text.contains("  0\ts1 (Ana), s3 (Cy)"));
    Ok(())
}

#[rstest]
fn render_summary_reports_short_circuit_in_json() -> TestResult {
    let summary = ExecutionSummary {
        message: NOT_ENOUGH_SUBMISSIONS.to_owned(),
        graph: plagraph_core::Graph::default(),
    };
    let mut buffer = Vec::new();
    render_summary(&summary, OutputFormat::Json, &mut buffer)?;
    let value: Value = serde_json::from_slice(&buffer)?;
    assert_eq!(value["message"], NOT_ENOUGH_SUBMISSIONS);
    assert_eq!(value["clusters"], Value::Array(Vec::new()));
    Ok(())
}
